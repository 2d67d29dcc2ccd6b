// ==========================================
// 配件目录管理系统 - 差异引擎
// ==========================================
// 职责: 文档 × 快照 → CatalogDiff（纯计算，不写库）
// 语义: 全量替换——快照中未被文档标识集覆盖的记录视为删除
// 顺序: adds 按文档行序；updates/deletes 按快照标识序
// 前置: 文档已通过校验（valid=true），本层不再复核
// ==========================================

use crate::domain::catalog::{CrossReference, Part, VehicleApplication};
use crate::domain::diff::{
    CatalogDiff, ChangeSet, NewCrossReference, NewPart, NewVehicleApplication, PartRef,
};
use crate::domain::snapshot::StoreSnapshot;
use crate::domain::workbook::{
    ParsedWorkbook, RawCrossReferenceRow, RawPartRow, RawVehicleApplicationRow, RowIdentity,
};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

// ==========================================
// RowDisposition - 行归类
// ==========================================
// 三分支穷尽: 新增 / 命中既有记录 / 带标识但快照无此记录。
// Orphan（导出后记录被他人删除）按新增处理——保住文档数据，
// 执行期分配新标识。
enum RowDisposition<'a, R> {
    Add,
    Update(&'a R),
    Orphan,
}

fn classify<'a, R>(
    identity: &RowIdentity,
    records: &'a BTreeMap<String, R>,
) -> RowDisposition<'a, R> {
    match identity.existing_token() {
        None => RowDisposition::Add,
        Some(token) => match records.get(token) {
            Some(record) => RowDisposition::Update(record),
            None => RowDisposition::Orphan,
        },
    }
}

pub struct DiffEngine;

impl DiffEngine {
    pub fn generate_diff(doc: &ParsedWorkbook, snapshot: &StoreSnapshot) -> CatalogDiff {
        let diff = CatalogDiff {
            parts: diff_parts(&doc.parts.rows, snapshot),
            vehicle_applications: diff_vehicle_applications(
                &doc.vehicle_applications.rows,
                snapshot,
            ),
            cross_references: diff_cross_references(&doc.cross_references.rows, snapshot),
        };

        let summary = diff.summary();
        debug!(
            adds = summary.total_adds,
            updates = summary.total_updates,
            deletes = summary.total_deletes,
            "差异计算完成"
        );
        diff
    }
}

// ==========================================
// Parts
// ==========================================
fn diff_parts(rows: &[RawPartRow], snapshot: &StoreSnapshot) -> ChangeSet<NewPart, Part> {
    let mut change_set = ChangeSet::empty();
    let mut seen_ids: HashSet<&str> = HashSet::new();

    for row in rows {
        match classify(&row.identity, &snapshot.parts) {
            RowDisposition::Add | RowDisposition::Orphan => {
                change_set.adds.push(new_part(row));
            }
            RowDisposition::Update(old) => {
                seen_ids.insert(old.part_id.as_str());
                if let Some(merged) = merge_part(row, old) {
                    change_set.updates.push(merged);
                }
            }
        }
    }

    // updates 按标识序（文档行序不参与输出顺序）
    change_set
        .updates
        .sort_by(|a, b| a.part_id.cmp(&b.part_id));

    // 全量替换: 未被文档覆盖的快照记录即删除（BTreeMap 序）
    for (id, old) in &snapshot.parts {
        if !seen_ids.contains(id.as_str()) {
            change_set.deletes.push(old.clone());
        }
    }
    change_set
}

fn new_part(row: &RawPartRow) -> NewPart {
    // 必填字段由校验保证非空
    NewPart {
        row_number: row.row_number,
        sku: row.sku.clone().unwrap_or_default(),
        part_type: row.part_type.clone().unwrap_or_default(),
        position_type: row.position_type.clone(),
        abs_type: row.abs_type.clone(),
        bolt_pattern: row.bolt_pattern.clone(),
        drive_type: row.drive_type.clone(),
        specification: row.specification.clone(),
    }
}

/// 字段级比对：全部一致 → None（静默 no-op）
fn merge_part(row: &RawPartRow, old: &Part) -> Option<Part> {
    let sku = row.sku.clone().unwrap_or_default();
    let part_type = row.part_type.clone().unwrap_or_default();

    let unchanged = sku == old.sku
        && part_type == old.part_type
        && row.position_type == old.position_type
        && row.abs_type == old.abs_type
        && row.bolt_pattern == old.bolt_pattern
        && row.drive_type == old.drive_type
        && row.specification == old.specification;
    if unchanged {
        return None;
    }

    // 审计字段沿用旧值，updated_at/updated_by 由执行器在落库时盖章
    Some(Part {
        part_id: old.part_id.clone(),
        sku,
        part_type,
        position_type: row.position_type.clone(),
        abs_type: row.abs_type.clone(),
        bolt_pattern: row.bolt_pattern.clone(),
        drive_type: row.drive_type.clone(),
        specification: row.specification.clone(),
        created_at: old.created_at,
        updated_at: old.updated_at,
        updated_by: old.updated_by.clone(),
    })
}

// ==========================================
// VehicleApplications
// ==========================================
fn diff_vehicle_applications(
    rows: &[RawVehicleApplicationRow],
    snapshot: &StoreSnapshot,
) -> ChangeSet<NewVehicleApplication, VehicleApplication> {
    let mut change_set = ChangeSet::empty();
    let mut seen_ids: HashSet<&str> = HashSet::new();

    for row in rows {
        match classify(&row.identity, &snapshot.vehicle_applications) {
            RowDisposition::Add | RowDisposition::Orphan => {
                change_set.adds.push(NewVehicleApplication {
                    row_number: row.row_number,
                    part_ref: resolve_part_ref(
                        row.part_id_ref.as_deref(),
                        row.part_sku_ref.as_deref(),
                        snapshot,
                    ),
                    make: row.make.clone().unwrap_or_default(),
                    model: row.model.clone().unwrap_or_default(),
                    year_start: row.year_start.unwrap_or_default(),
                    year_end: row.year_end.unwrap_or_default(),
                });
            }
            RowDisposition::Update(old) => {
                seen_ids.insert(old.application_id.as_str());
                if let Some(merged) = merge_vehicle_application(row, old, snapshot) {
                    change_set.updates.push(merged);
                }
            }
        }
    }

    change_set
        .updates
        .sort_by(|a, b| a.application_id.cmp(&b.application_id));

    for (id, old) in &snapshot.vehicle_applications {
        if !seen_ids.contains(id.as_str()) {
            change_set.deletes.push(old.clone());
        }
    }
    change_set
}

fn merge_vehicle_application(
    row: &RawVehicleApplicationRow,
    old: &VehicleApplication,
    snapshot: &StoreSnapshot,
) -> Option<VehicleApplication> {
    let make = row.make.clone().unwrap_or_default();
    let model = row.model.clone().unwrap_or_default();
    let year_start = row.year_start.unwrap_or_default();
    let year_end = row.year_end.unwrap_or_default();
    // 改挂到另一个库内配件才算换父，否则保持原归属
    let part_id = row
        .part_id_ref
        .as_deref()
        .filter(|token| snapshot.parts.contains_key(*token))
        .unwrap_or(old.part_id.as_str())
        .to_string();

    let unchanged = make == old.make
        && model == old.model
        && year_start == old.year_start
        && year_end == old.year_end
        && part_id == old.part_id;
    if unchanged {
        return None;
    }

    Some(VehicleApplication {
        application_id: old.application_id.clone(),
        part_id,
        make,
        model,
        year_start,
        year_end,
        created_at: old.created_at,
        updated_at: old.updated_at,
        updated_by: old.updated_by.clone(),
    })
}

// ==========================================
// CrossReferences
// ==========================================
fn diff_cross_references(
    rows: &[RawCrossReferenceRow],
    snapshot: &StoreSnapshot,
) -> ChangeSet<NewCrossReference, CrossReference> {
    let mut change_set = ChangeSet::empty();
    let mut seen_ids: HashSet<&str> = HashSet::new();

    for row in rows {
        match classify(&row.identity, &snapshot.cross_references) {
            RowDisposition::Add | RowDisposition::Orphan => {
                change_set.adds.push(NewCrossReference {
                    row_number: row.row_number,
                    part_ref: resolve_part_ref(
                        row.part_id_ref.as_deref(),
                        row.part_sku_ref.as_deref(),
                        snapshot,
                    ),
                    competitor_brand: row.competitor_brand.clone(),
                    competitor_sku: row.competitor_sku.clone().unwrap_or_default(),
                });
            }
            RowDisposition::Update(old) => {
                seen_ids.insert(old.cross_reference_id.as_str());
                if let Some(merged) = merge_cross_reference(row, old, snapshot) {
                    change_set.updates.push(merged);
                }
            }
        }
    }

    change_set
        .updates
        .sort_by(|a, b| a.cross_reference_id.cmp(&b.cross_reference_id));

    for (id, old) in &snapshot.cross_references {
        if !seen_ids.contains(id.as_str()) {
            change_set.deletes.push(old.clone());
        }
    }
    change_set
}

fn merge_cross_reference(
    row: &RawCrossReferenceRow,
    old: &CrossReference,
    snapshot: &StoreSnapshot,
) -> Option<CrossReference> {
    let competitor_sku = row.competitor_sku.clone().unwrap_or_default();
    let part_id = row
        .part_id_ref
        .as_deref()
        .filter(|token| snapshot.parts.contains_key(*token))
        .unwrap_or(old.part_id.as_str())
        .to_string();

    let unchanged = competitor_sku == old.competitor_sku
        && row.competitor_brand == old.competitor_brand
        && part_id == old.part_id;
    if unchanged {
        return None;
    }

    Some(CrossReference {
        cross_reference_id: old.cross_reference_id.clone(),
        part_id,
        competitor_brand: row.competitor_brand.clone(),
        competitor_sku,
        created_at: old.created_at,
        updated_at: old.updated_at,
        updated_by: old.updated_by.clone(),
    })
}

/// 新增子行的所属配件引用解析
///
/// _part_id 优先，但只认库内仍存在的标识——导出后配件被删时
/// 文档携带的是失效标识，此时退回 _part_sku 路径。
/// SKU 查库不中即指向同文档新增配件，延迟到执行期按 SKU 回填。
fn resolve_part_ref(
    part_id_ref: Option<&str>,
    part_sku_ref: Option<&str>,
    snapshot: &StoreSnapshot,
) -> PartRef {
    if let Some(token) = part_id_ref {
        if snapshot.parts.contains_key(token) {
            return PartRef::Existing(token.to_string());
        }
    }
    let sku = part_sku_ref.unwrap_or_default();
    match snapshot.part_id_for_sku(sku) {
        Some(part_id) => PartRef::Existing(part_id.to_string()),
        None => PartRef::NewBySku(sku.to_string()),
    }
}
