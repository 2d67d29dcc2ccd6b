// ==========================================
// 配件目录管理系统 - 回滚服务
// ==========================================
// 职责: 顺序回滚（只允许回滚最新导入）+ 记录级冲突检测 + 快照恢复
// 红线: 任何冲突都整体拒绝，库保持原样——绝不静默覆盖人工编辑；
//       导入记录本身永不删除（历史始终可查）
// ==========================================

use crate::domain::catalog::EntityType;
use crate::domain::import_record::{
    AffectedIds, CatalogSnapshot, ImportRecord, RollbackConflict, RollbackOutcome,
};
use crate::domain::snapshot::StoreSnapshot;
use crate::importer::error::RollbackError;
use crate::repository::CatalogImportRepository;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{info, warn};

/// 回滚写入的系统操作人标识（冲突检测豁免它自己的写入）
pub const ROLLBACK_ACTOR: &str = "system:rollback";

pub struct RollbackService {
    repo: Arc<dyn CatalogImportRepository>,
}

impl RollbackService {
    pub fn new(repo: Arc<dyn CatalogImportRepository>) -> Self {
        Self { repo }
    }

    /// 回滚到指定导入之前的状态
    ///
    /// 前置条件按序检查，任一不满足立即返回且不触库：
    /// 1. 记录存在（NotFound）
    /// 2. 尚未回滚过（AlreadyRolledBack）
    /// 3. 是最新一条未回滚导入（SequentialRollback）
    /// 4. 触及记录无导入后修改（Conflict）
    pub async fn rollback_to_import(
        &self,
        import_id: &str,
    ) -> Result<RollbackOutcome, RollbackError> {
        let record = self
            .repo
            .find_import(import_id)
            .await
            .map_err(|e| RollbackError::DatabaseError(e.to_string()))?
            .ok_or_else(|| RollbackError::NotFound(import_id.to_string()))?;
        if record.is_rolled_back() {
            return Err(RollbackError::AlreadyRolledBack(record.import_id));
        }

        let latest = self
            .repo
            .find_latest_import()
            .await
            .map_err(|e| RollbackError::DatabaseError(e.to_string()))?
            .ok_or_else(|| RollbackError::NotFound(import_id.to_string()))?;
        if latest.import_id != record.import_id {
            return Err(RollbackError::SequentialRollback {
                requested_id: record.import_id,
                latest_id: latest.import_id,
            });
        }

        let snapshot = record.snapshot()?;
        let affected = record.affected_ids()?;
        let current = self
            .repo
            .load_snapshot()
            .await
            .map_err(|e| RollbackError::DatabaseError(e.to_string()))?;

        let conflicts = detect_conflicts(&record, &snapshot, &affected, &current);
        if !conflicts.is_empty() {
            warn!(
                import_id = %record.import_id,
                conflict_count = conflicts.len(),
                "回滚冲突，库保持原样"
            );
            return Err(RollbackError::Conflict { conflicts });
        }

        let restored = self
            .repo
            .restore_snapshot(&record.import_id, &snapshot)
            .await
            .map_err(|e| RollbackError::DatabaseError(e.to_string()))?;

        info!(
            import_id = %record.import_id,
            parts = restored.parts,
            vehicle_applications = restored.vehicle_applications,
            cross_references = restored.cross_references,
            "回滚完成"
        );
        Ok(RollbackOutcome {
            import_id: record.import_id,
            restored,
        })
    }
}

// ==========================================
// 冲突检测（纯函数）
// ==========================================
// 扫描范围 = 导入前快照的标识集 ∪ 导入触及的标识集。
// 冲突判定: 当前行 updated_at 严格晚于 imported_at，
// 且 updated_by 不是回滚系统操作人。
// 行在导入后被删除不算冲突——恢复本来就会整表重建。
pub fn detect_conflicts(
    record: &ImportRecord,
    prior: &CatalogSnapshot,
    affected: &AffectedIds,
    current: &StoreSnapshot,
) -> Vec<RollbackConflict> {
    let imported_at = record.imported_at;
    let mut conflicts = Vec::new();

    let prior_parts: BTreeMap<&str, _> = prior
        .parts
        .iter()
        .map(|p| (p.part_id.as_str(), p))
        .collect();
    let prior_apps: BTreeMap<&str, _> = prior
        .vehicle_applications
        .iter()
        .map(|a| (a.application_id.as_str(), a))
        .collect();
    let prior_xrefs: BTreeMap<&str, _> = prior
        .cross_references
        .iter()
        .map(|x| (x.cross_reference_id.as_str(), x))
        .collect();

    // BTreeSet: 冲突清单按标识序输出
    let part_ids: BTreeSet<&str> = prior_parts
        .keys()
        .copied()
        .chain(affected.parts.iter().map(String::as_str))
        .collect();
    for id in part_ids {
        let Some(row) = current.parts.get(id) else {
            continue;
        };
        if !modified_after(row.updated_at, row.updated_by.as_deref(), imported_at) {
            continue;
        }
        let changed_fields = prior_parts.get(id).map_or_else(Vec::new, |old| {
            changed(&[
                ("sku", old.sku != row.sku),
                ("part_type", old.part_type != row.part_type),
                ("position_type", old.position_type != row.position_type),
                ("abs_type", old.abs_type != row.abs_type),
                ("bolt_pattern", old.bolt_pattern != row.bolt_pattern),
                ("drive_type", old.drive_type != row.drive_type),
                ("specification", old.specification != row.specification),
            ])
        });
        conflicts.push(RollbackConflict {
            entity: EntityType::Part,
            record_id: id.to_string(),
            sku: Some(row.sku.clone()),
            modified_by: row.updated_by.clone(),
            modified_at: Some(row.updated_at),
            changed_fields,
        });
    }

    let app_ids: BTreeSet<&str> = prior_apps
        .keys()
        .copied()
        .chain(affected.vehicle_applications.iter().map(String::as_str))
        .collect();
    for id in app_ids {
        let Some(row) = current.vehicle_applications.get(id) else {
            continue;
        };
        if !modified_after(row.updated_at, row.updated_by.as_deref(), imported_at) {
            continue;
        }
        let changed_fields = prior_apps.get(id).map_or_else(Vec::new, |old| {
            changed(&[
                ("part_id", old.part_id != row.part_id),
                ("make", old.make != row.make),
                ("model", old.model != row.model),
                ("year_start", old.year_start != row.year_start),
                ("year_end", old.year_end != row.year_end),
            ])
        });
        conflicts.push(RollbackConflict {
            entity: EntityType::VehicleApplication,
            record_id: id.to_string(),
            sku: current.parts.get(&row.part_id).map(|p| p.sku.clone()),
            modified_by: row.updated_by.clone(),
            modified_at: Some(row.updated_at),
            changed_fields,
        });
    }

    let xref_ids: BTreeSet<&str> = prior_xrefs
        .keys()
        .copied()
        .chain(affected.cross_references.iter().map(String::as_str))
        .collect();
    for id in xref_ids {
        let Some(row) = current.cross_references.get(id) else {
            continue;
        };
        if !modified_after(row.updated_at, row.updated_by.as_deref(), imported_at) {
            continue;
        }
        let changed_fields = prior_xrefs.get(id).map_or_else(Vec::new, |old| {
            changed(&[
                ("part_id", old.part_id != row.part_id),
                ("competitor_brand", old.competitor_brand != row.competitor_brand),
                ("competitor_sku", old.competitor_sku != row.competitor_sku),
            ])
        });
        conflicts.push(RollbackConflict {
            entity: EntityType::CrossReference,
            record_id: id.to_string(),
            sku: current.parts.get(&row.part_id).map(|p| p.sku.clone()),
            modified_by: row.updated_by.clone(),
            modified_at: Some(row.updated_at),
            changed_fields,
        });
    }

    conflicts
}

fn modified_after(
    updated_at: DateTime<Utc>,
    updated_by: Option<&str>,
    imported_at: DateTime<Utc>,
) -> bool {
    updated_at > imported_at && updated_by != Some(ROLLBACK_ACTOR)
}

fn changed(pairs: &[(&str, bool)]) -> Vec<String> {
    pairs
        .iter()
        .filter(|(_, differs)| *differs)
        .map(|(name, _)| name.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::Part;
    use chrono::Duration;

    const PART_ID: &str = "6f1f7f4e-9d0a-4b6c-8a6e-000000000001";

    fn part_at(updated_at: DateTime<Utc>, updated_by: Option<&str>) -> Part {
        Part {
            part_id: PART_ID.to_string(),
            sku: "ACR-100".to_string(),
            part_type: "hub assembly".to_string(),
            position_type: Some("front".to_string()),
            abs_type: None,
            bolt_pattern: None,
            drive_type: None,
            specification: None,
            created_at: updated_at,
            updated_at,
            updated_by: updated_by.map(String::from),
        }
    }

    fn record_at(imported_at: DateTime<Utc>, affected: &AffectedIds) -> ImportRecord {
        ImportRecord {
            import_id: "imp-1".to_string(),
            file_name: "catalog.xlsx".to_string(),
            file_size: 0,
            imported_at,
            imported_by: "tester".to_string(),
            total_rows: 0,
            add_count: 0,
            update_count: 1,
            delete_count: 0,
            snapshot_json: String::new(),
            affected_ids_json: serde_json::to_string(affected).unwrap(),
            created_at: imported_at,
            rolled_back_at: None,
        }
    }

    #[test]
    fn test_no_conflict_when_untouched_since_import() {
        let imported_at = Utc::now();
        let prior = CatalogSnapshot {
            parts: vec![part_at(imported_at - Duration::hours(1), None)],
            vehicle_applications: vec![],
            cross_references: vec![],
        };
        let affected = AffectedIds {
            parts: vec![PART_ID.to_string()],
            ..Default::default()
        };
        // 当前行的章就是 imported_at 本身（导入写的）: 不算冲突
        let current =
            StoreSnapshot::from_rows(vec![part_at(imported_at, Some("tester"))], vec![], vec![]);

        let conflicts = detect_conflicts(
            &record_at(imported_at, &affected),
            &prior,
            &affected,
            &current,
        );
        assert!(conflicts.is_empty());
    }

    #[test]
    fn test_conflict_when_modified_after_import() {
        let imported_at = Utc::now();
        let old = part_at(imported_at - Duration::hours(1), None);
        let prior = CatalogSnapshot {
            parts: vec![old],
            vehicle_applications: vec![],
            cross_references: vec![],
        };
        let affected = AffectedIds {
            parts: vec![PART_ID.to_string()],
            ..Default::default()
        };
        let mut edited = part_at(imported_at + Duration::minutes(5), Some("editor"));
        edited.specification = Some("hand-edited".to_string());
        let current = StoreSnapshot::from_rows(vec![edited], vec![], vec![]);

        let conflicts = detect_conflicts(
            &record_at(imported_at, &affected),
            &prior,
            &affected,
            &current,
        );
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].record_id, PART_ID);
        assert_eq!(conflicts[0].modified_by.as_deref(), Some("editor"));
        assert_eq!(conflicts[0].changed_fields, vec!["specification"]);
    }

    #[test]
    fn test_rollback_actor_writes_exempt() {
        let imported_at = Utc::now();
        let prior = CatalogSnapshot {
            parts: vec![part_at(imported_at - Duration::hours(1), None)],
            vehicle_applications: vec![],
            cross_references: vec![],
        };
        let affected = AffectedIds {
            parts: vec![PART_ID.to_string()],
            ..Default::default()
        };
        let current = StoreSnapshot::from_rows(
            vec![part_at(imported_at + Duration::minutes(5), Some(ROLLBACK_ACTOR))],
            vec![],
            vec![],
        );

        let conflicts = detect_conflicts(
            &record_at(imported_at, &affected),
            &prior,
            &affected,
            &current,
        );
        assert!(conflicts.is_empty());
    }

    #[test]
    fn test_deleted_row_is_not_a_conflict() {
        let imported_at = Utc::now();
        let prior = CatalogSnapshot {
            parts: vec![part_at(imported_at - Duration::hours(1), None)],
            vehicle_applications: vec![],
            cross_references: vec![],
        };
        let affected = AffectedIds {
            parts: vec![PART_ID.to_string()],
            ..Default::default()
        };
        let current = StoreSnapshot::default();

        let conflicts = detect_conflicts(
            &record_at(imported_at, &affected),
            &prior,
            &affected,
            &current,
        );
        assert!(conflicts.is_empty(), "导入后被删的行由恢复整表重建，不算冲突");
    }
}
