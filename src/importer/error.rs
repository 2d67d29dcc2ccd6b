// ==========================================
// 配件目录管理系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 三个错误族分开处理:
// - 结构性解析错误 → ImportError::MalformedDocument/MissingSheet（致命，立即返回）
// - 校验错误/警告 → 永远是数据（ValidationReport），不走异常
// - 执行/回滚错误 → ImportError::ExecutionError / RollbackError（类型化，调用方可分支）
// ==========================================

use crate::domain::import_record::RollbackConflict;
use thiserror::Error;

/// 导入模块错误类型（解析 + 执行）
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 结构性解析错误 =====
    #[error("工作簿格式损坏或不可解析: {0}")]
    MalformedDocument(String),

    #[error("缺少必需的 sheet: {0}")]
    MissingSheet(String),

    #[error("文件不存在: {0}")]
    FileNotFound(String),

    // ===== 执行错误 =====
    #[error("导入执行失败: {0}")]
    ExecutionError(String),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::MalformedDocument(err.to_string())
    }
}

// 实现 From<calamine::XlsxError>
impl From<calamine::XlsxError> for ImportError {
    fn from(err: calamine::XlsxError) -> Self {
        ImportError::MalformedDocument(err.to_string())
    }
}

// 实现 From<rust_xlsxwriter::XlsxError>（导出侧）
impl From<rust_xlsxwriter::XlsxError> for ImportError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        ImportError::InternalError(format!("工作簿生成失败: {}", err))
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

/// 回滚错误类型
///
/// SequentialRollback 与 Conflict 必须可区分：
/// UI 分别渲染“先回滚更新的导入”与冲突清单
#[derive(Error, Debug)]
pub enum RollbackError {
    #[error("导入记录不存在: {0}")]
    NotFound(String),

    #[error("导入已回滚过: {0}")]
    AlreadyRolledBack(String),

    #[error("只能回滚最新导入: requested={requested_id}, latest={latest_id}")]
    SequentialRollback {
        requested_id: String,
        latest_id: String,
    },

    #[error("回滚冲突: {} 条记录在导入后被修改", conflicts.len())]
    Conflict { conflicts: Vec<RollbackConflict> },

    #[error("快照载荷编解码失败: {0}")]
    SnapshotCodecError(String),

    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<serde_json::Error> for RollbackError {
    fn from(err: serde_json::Error) -> Self {
        RollbackError::SnapshotCodecError(err.to_string())
    }
}
