// ==========================================
// 配件目录管理系统 - API 层错误类型
// ==========================================
// 三个失败族必须可区分（调用方分别渲染）：
// - 执行失败 → ExecutionError
// - 顺序回滚违规 → SequentialRollback
// - 回滚冲突 → RollbackConflict（带冲突清单）
// ==========================================

use crate::domain::import_record::RollbackConflict;
use crate::domain::validation::ValidationIssue;
use crate::importer::error::{ImportError, RollbackError};
use crate::repository::RepositoryError;
use thiserror::Error;

/// API 层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ===== 解析 =====
    #[error("工作簿解析失败: {0}")]
    ParseError(String),

    // ===== 校验阻断 =====
    #[error("校验未通过，拒绝导入（errors={}）", errors.len())]
    ValidationBlocked { errors: Vec<ValidationIssue> },

    // ===== 执行 =====
    #[error("导入执行失败: {0}")]
    ExecutionError(String),

    // ===== 回滚 =====
    #[error("记录未找到: {0}")]
    NotFound(String),

    #[error("导入已回滚过: {0}")]
    AlreadyRolledBack(String),

    #[error("只能回滚最新导入: requested={requested_id}, latest={latest_id}")]
    SequentialRollback {
        requested_id: String,
        latest_id: String,
    },

    #[error("回滚冲突: {} 条记录在导入后被修改", conflicts.len())]
    RollbackConflict { conflicts: Vec<RollbackConflict> },

    // ===== 通用 =====
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::MalformedDocument(msg) => ApiError::ParseError(msg),
            ImportError::MissingSheet(name) => {
                ApiError::ParseError(format!("缺少必需的 sheet: {}", name))
            }
            ImportError::FileNotFound(path) => ApiError::NotFound(path),
            ImportError::ExecutionError(msg) => ApiError::ExecutionError(msg),
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

impl From<RollbackError> for ApiError {
    fn from(err: RollbackError) -> Self {
        match err {
            RollbackError::NotFound(id) => ApiError::NotFound(id),
            RollbackError::AlreadyRolledBack(id) => ApiError::AlreadyRolledBack(id),
            RollbackError::SequentialRollback {
                requested_id,
                latest_id,
            } => ApiError::SequentialRollback {
                requested_id,
                latest_id,
            },
            RollbackError::Conflict { conflicts } => ApiError::RollbackConflict { conflicts },
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        ApiError::InternalError(err.to_string())
    }
}
