// ==========================================
// 配件目录管理系统 - 导入 API
// ==========================================
// 职责: 组装解析→校验→差异→执行管道，对外暴露五个操作:
//       预览 / 导入 / 历史 / 回滚 / 导出
// 红线: 校验与差异共用同一次库存快照（避免两阶段读偏差）
// ==========================================

use crate::api::error::ApiError;
use crate::config::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::diff::DiffSummary;
use crate::domain::import_record::{ImportMeta, RollbackOutcome};
use crate::domain::validation::{ValidationIssue, ValidationWarning};
use crate::importer::{
    DiffEngine, ImportExecutor, RollbackService, ValidationEngine, WorkbookExporter,
    WorkbookParser,
};
use crate::repository::{CatalogImportRepository, CatalogImportRepositoryImpl};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

// ==========================================
// DTO
// ==========================================

/// 导入预览（确认页数据）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportPreview {
    pub valid: bool,                      // false 时 summary 为 None
    pub total_rows: usize,                // 文档数据行数
    pub errors: Vec<ValidationIssue>,     // 阻断性错误
    pub warnings: Vec<ValidationWarning>, // 非阻断警告
    pub summary: Option<DiffSummary>,     // 校验通过时的合并计数
}

/// 导入结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub import_id: String,
    pub summary: DiffSummary,
    pub warnings: Vec<ValidationWarning>, // 已确认过的警告，随结果回传留痕
    pub elapsed_ms: u64,                  // 解析到提交的耗时
}

/// 导入历史条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportHistoryEntry {
    pub import_id: String,
    pub file_name: String,
    pub file_size: i64,
    pub imported_at: DateTime<Utc>,
    pub imported_by: String,
    pub total_rows: i32,
    pub add_count: i32,
    pub update_count: i32,
    pub delete_count: i32,
    pub rolled_back_at: Option<DateTime<Utc>>, // 已回滚时的回滚时间
}

// ==========================================
// ImportApi
// ==========================================
pub struct ImportApi {
    repo: Arc<dyn CatalogImportRepository>,
    config: ConfigManager,
}

impl ImportApi {
    /// 打开（必要时初始化）目录数据库并组装管道
    pub fn new(db_path: &str) -> Result<Self, ApiError> {
        {
            let conn = open_sqlite_connection(db_path)
                .map_err(|e| ApiError::InternalError(e.to_string()))?;
            init_schema(&conn).map_err(|e| ApiError::InternalError(e.to_string()))?;
        }

        let repo: Arc<dyn CatalogImportRepository> =
            Arc::new(CatalogImportRepositoryImpl::new(db_path)?);
        let config =
            ConfigManager::new(db_path).map_err(|e| ApiError::InternalError(e.to_string()))?;

        Ok(Self { repo, config })
    }

    /// 预览导入：完整校验报告 + （校验通过时）合并计数
    ///
    /// 纯读操作，不写库。
    pub async fn preview_import(&self, bytes: &[u8]) -> Result<ImportPreview, ApiError> {
        let doc = WorkbookParser::parse_bytes(bytes)?;
        let snapshot = self.repo.load_snapshot().await?;
        let limits = self
            .config
            .load_validation_limits()
            .map_err(|e| ApiError::InternalError(e.to_string()))?;

        let report = ValidationEngine::new(limits).validate(&doc, &snapshot);
        let summary = report
            .valid
            .then(|| DiffEngine::generate_diff(&doc, &snapshot).summary());

        Ok(ImportPreview {
            valid: report.valid,
            total_rows: doc.total_rows(),
            errors: report.errors,
            warnings: report.warnings,
            summary,
        })
    }

    /// 执行导入（调用方已在确认页看过预览）
    ///
    /// 校验在此处重跑一遍——预览与导入之间库可能已变化，
    /// 导入用的快照必须是本次请求内取的。
    pub async fn import_workbook(
        &self,
        bytes: &[u8],
        meta: ImportMeta,
    ) -> Result<ImportOutcome, ApiError> {
        let started = std::time::Instant::now();
        let doc = WorkbookParser::parse_bytes(bytes)?;
        let snapshot = self.repo.load_snapshot().await?;
        let limits = self
            .config
            .load_validation_limits()
            .map_err(|e| ApiError::InternalError(e.to_string()))?;

        let report = ValidationEngine::new(limits).validate(&doc, &snapshot);
        if !report.valid {
            return Err(ApiError::ValidationBlocked {
                errors: report.errors,
            });
        }

        let diff = DiffEngine::generate_diff(&doc, &snapshot);
        let summary = diff.summary();
        let import_id = ImportExecutor::new(self.repo.clone())
            .execute_import(&doc, diff, meta)
            .await?;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        info!(import_id = %import_id, elapsed_ms, "导入完成");
        Ok(ImportOutcome {
            import_id,
            summary,
            warnings: report.warnings,
            elapsed_ms,
        })
    }

    /// 导入历史（按导入时间降序）
    pub async fn list_import_history(
        &self,
        limit: usize,
    ) -> Result<Vec<ImportHistoryEntry>, ApiError> {
        let records = self.repo.list_recent_imports(limit).await?;
        Ok(records
            .into_iter()
            .map(|r| ImportHistoryEntry {
                import_id: r.import_id,
                file_name: r.file_name,
                file_size: r.file_size,
                imported_at: r.imported_at,
                imported_by: r.imported_by,
                total_rows: r.total_rows,
                add_count: r.add_count,
                update_count: r.update_count,
                delete_count: r.delete_count,
                rolled_back_at: r.rolled_back_at,
            })
            .collect())
    }

    /// 回滚指定导入（只允许最新一条，冲突整体拒绝）
    ///
    /// actor 只进审计日志——恢复写回的是快照原值，不盖新章。
    pub async fn rollback_to_import(
        &self,
        import_id: &str,
        actor: &str,
    ) -> Result<RollbackOutcome, ApiError> {
        let outcome = RollbackService::new(self.repo.clone())
            .rollback_to_import(import_id)
            .await?;
        info!(import_id = %outcome.import_id, actor, "回滚已执行");
        Ok(outcome)
    }

    /// 导出当前库存为三 sheet 工作簿（隐藏标识列已填充）
    pub async fn export_workbook(&self) -> Result<Vec<u8>, ApiError> {
        let snapshot = self.repo.load_snapshot().await?;
        Ok(WorkbookExporter::export_snapshot(&snapshot)?)
    }
}
