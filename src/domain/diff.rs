// ==========================================
// 配件目录管理系统 - 差异集结构
// ==========================================
// 全量替换语义: 提交的 sheet 是该实体类型的完整期望状态，
// 快照中未出现在文档标识集内的记录一律视为删除。
// 新增行的标识在执行期分配，差异集内以“待建记录”表达。
// ==========================================

use crate::domain::catalog::{CrossReference, Part, VehicleApplication};
use serde::{Deserialize, Serialize};

// ==========================================
// PartRef - 子记录的所属配件引用
// ==========================================
// 新增子行可能挂在同一文档中新增的配件下（此时还没有 part_id），
// 用 SKU 延迟解析，待执行期配件落库后回填。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartRef {
    /// 已存在的配件标识（库内或文档内已带 _id 的配件行）
    Existing(String),
    /// 同文档新增配件，按 SKU 在执行期解析
    NewBySku(String),
}

// ==========================================
// 待建记录（标识在执行期分配）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPart {
    pub row_number: usize, // 文档行号（保持新增顺序确定性）
    pub sku: String,
    pub part_type: String,
    pub position_type: Option<String>,
    pub abs_type: Option<String>,
    pub bolt_pattern: Option<String>,
    pub drive_type: Option<String>,
    pub specification: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewVehicleApplication {
    pub row_number: usize,
    pub part_ref: PartRef,
    pub make: String,
    pub model: String,
    pub year_start: i32,
    pub year_end: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCrossReference {
    pub row_number: usize,
    pub part_ref: PartRef,
    pub competitor_brand: Option<String>,
    pub competitor_sku: String,
}

// ==========================================
// ChangeSet - 单实体类型的变更集
// ==========================================
// N: 待建记录类型；R: 实体记录类型
// adds 按文档行序；updates/deletes 按快照标识序（输出确定性）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeSet<N, R> {
    pub adds: Vec<N>,
    pub updates: Vec<R>, // 合并后的完整新状态（保留原标识）
    pub deletes: Vec<R>, // 快照原记录
}

impl<N, R> ChangeSet<N, R> {
    pub fn empty() -> Self {
        Self {
            adds: Vec::new(),
            updates: Vec::new(),
            deletes: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.adds.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }
}

// ==========================================
// DiffSummary - 合并计数
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub total_adds: usize,
    pub total_updates: usize,
    pub total_deletes: usize,
}

// ==========================================
// CatalogDiff - 三实体差异集
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogDiff {
    pub parts: ChangeSet<NewPart, Part>,
    pub vehicle_applications: ChangeSet<NewVehicleApplication, VehicleApplication>,
    pub cross_references: ChangeSet<NewCrossReference, CrossReference>,
}

impl CatalogDiff {
    pub fn summary(&self) -> DiffSummary {
        DiffSummary {
            total_adds: self.parts.adds.len()
                + self.vehicle_applications.adds.len()
                + self.cross_references.adds.len(),
            total_updates: self.parts.updates.len()
                + self.vehicle_applications.updates.len()
                + self.cross_references.updates.len(),
            total_deletes: self.parts.deletes.len()
                + self.vehicle_applications.deletes.len()
                + self.cross_references.deletes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
            && self.vehicle_applications.is_empty()
            && self.cross_references.is_empty()
    }
}
