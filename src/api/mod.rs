// ==========================================
// 配件目录管理系统 - API 模块声明
// ==========================================

pub mod error;
pub mod import_api;

pub use error::ApiError;
pub use import_api::{ImportApi, ImportHistoryEntry, ImportOutcome, ImportPreview};
