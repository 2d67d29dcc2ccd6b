// ==========================================
// 配件目录管理系统 - 库存快照读模型
// ==========================================
// 单次请求内取一次，校验引擎与差异引擎共用，避免两阶段读偏差。
// BTreeMap 保证按标识遍历的确定性（差异输出顺序依赖它）。
// ==========================================

use crate::domain::catalog::{CrossReference, Part, VehicleApplication};
use crate::domain::import_record::CatalogSnapshot;
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    pub parts: BTreeMap<String, Part>,                             // part_id → 记录
    pub vehicle_applications: BTreeMap<String, VehicleApplication>, // application_id → 记录
    pub cross_references: BTreeMap<String, CrossReference>,        // cross_reference_id → 记录
    pub part_skus: HashSet<String>,                                // 当前在用 SKU 集（唯一性快查）
    sku_to_part_id: HashMap<String, String>,                       // SKU → part_id（子行自然键解析）
}

impl StoreSnapshot {
    pub fn from_rows(
        parts: Vec<Part>,
        vehicle_applications: Vec<VehicleApplication>,
        cross_references: Vec<CrossReference>,
    ) -> Self {
        let mut snapshot = StoreSnapshot::default();
        for part in parts {
            snapshot.part_skus.insert(part.sku.clone());
            snapshot
                .sku_to_part_id
                .insert(part.sku.clone(), part.part_id.clone());
            snapshot.parts.insert(part.part_id.clone(), part);
        }
        for app in vehicle_applications {
            snapshot
                .vehicle_applications
                .insert(app.application_id.clone(), app);
        }
        for xref in cross_references {
            snapshot
                .cross_references
                .insert(xref.cross_reference_id.clone(), xref);
        }
        snapshot
    }

    /// SKU → part_id 解析（仅库内记录）
    pub fn part_id_for_sku(&self, sku: &str) -> Option<&str> {
        self.sku_to_part_id.get(sku).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
            && self.vehicle_applications.is_empty()
            && self.cross_references.is_empty()
    }

    /// 转为可持久化的快照载荷（按标识序，内容确定）
    pub fn to_catalog_snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot {
            parts: self.parts.values().cloned().collect(),
            vehicle_applications: self.vehicle_applications.values().cloned().collect(),
            cross_references: self.cross_references.values().cloned().collect(),
        }
    }
}
