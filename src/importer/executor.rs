// ==========================================
// 配件目录管理系统 - 导入执行器
// ==========================================
// 职责: 差异集 → 落库（标识/时间戳分配 + 委托仓储单事务执行）
// 红线: 校验未通过（valid=false）绝不进入执行；
//       执行失败时库保持执行前状态（事务由仓储层保证）
// ==========================================

use crate::domain::diff::CatalogDiff;
use crate::domain::import_record::{ImportMeta, PendingImport};
use crate::domain::workbook::ParsedWorkbook;
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::CatalogImportRepository;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

pub struct ImportExecutor {
    repo: Arc<dyn CatalogImportRepository>,
}

impl ImportExecutor {
    pub fn new(repo: Arc<dyn CatalogImportRepository>) -> Self {
        Self { repo }
    }

    /// 执行一次导入，返回新导入记录的标识
    ///
    /// imported_at 在此处统一分配，仓储层以它盖章所有写入行的
    /// updated_at——回滚冲突检测依赖两者严格一致。
    pub async fn execute_import(
        &self,
        doc: &ParsedWorkbook,
        diff: CatalogDiff,
        meta: ImportMeta,
    ) -> ImportResult<String> {
        let pending = PendingImport {
            import_id: Uuid::new_v4().to_string(),
            imported_at: Utc::now(),
            meta,
            total_rows: doc.total_rows() as i32,
        };
        let import_id = pending.import_id.clone();
        let summary = diff.summary();

        info!(
            import_id = %import_id,
            total_rows = pending.total_rows,
            adds = summary.total_adds,
            updates = summary.total_updates,
            deletes = summary.total_deletes,
            "开始执行导入"
        );

        let record = self
            .repo
            .apply_import(pending, &diff)
            .await
            .map_err(|e| {
                warn!(import_id = %import_id, error = %e, "导入执行失败，事务已回滚");
                ImportError::ExecutionError(e.to_string())
            })?;

        Ok(record.import_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, init_schema};
    use crate::domain::diff::{ChangeSet, NewPart};
    use crate::domain::workbook::SheetRows;
    use crate::repository::CatalogImportRepositoryImpl;
    use rusqlite::Connection;

    fn test_executor() -> (ImportExecutor, Arc<dyn CatalogImportRepository>) {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        let repo: Arc<dyn CatalogImportRepository> =
            Arc::new(CatalogImportRepositoryImpl::from_connection(conn));
        (ImportExecutor::new(repo.clone()), repo)
    }

    fn empty_doc() -> ParsedWorkbook {
        ParsedWorkbook {
            parts: SheetRows {
                rows: vec![],
                has_identity_columns: true,
            },
            vehicle_applications: SheetRows {
                rows: vec![],
                has_identity_columns: true,
            },
            cross_references: SheetRows {
                rows: vec![],
                has_identity_columns: true,
            },
        }
    }

    #[tokio::test]
    async fn test_execute_import_creates_record() {
        let (executor, repo) = test_executor();
        let diff = CatalogDiff {
            parts: ChangeSet {
                adds: vec![NewPart {
                    row_number: 2,
                    sku: "ACR-100".to_string(),
                    part_type: "hub assembly".to_string(),
                    position_type: None,
                    abs_type: None,
                    bolt_pattern: None,
                    drive_type: None,
                    specification: None,
                }],
                updates: vec![],
                deletes: vec![],
            },
            vehicle_applications: ChangeSet::empty(),
            cross_references: ChangeSet::empty(),
        };
        let meta = ImportMeta {
            file_name: "catalog.xlsx".to_string(),
            file_size: 512,
            actor: "tester".to_string(),
        };

        let import_id = executor
            .execute_import(&empty_doc(), diff, meta)
            .await
            .unwrap();

        let record = repo.find_import(&import_id).await.unwrap().unwrap();
        assert_eq!(record.add_count, 1);
        assert_eq!(record.imported_by, "tester");
        // 写入行的 updated_at 与导入记录的 imported_at 严格一致
        let snapshot = repo.load_snapshot().await.unwrap();
        let part = snapshot.parts.values().next().unwrap();
        assert_eq!(part.updated_at, record.imported_at);
    }
}
