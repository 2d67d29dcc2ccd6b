// ==========================================
// 配件目录管理系统 - 导入模块声明
// ==========================================
// 管道: workbook_parser → validator → differ → executor
// 逆向: rollback（消费导入记录快照）；exporter 是管道的反函数
// ==========================================

pub mod differ;
pub mod error;
pub mod executor;
pub mod exporter;
pub mod rollback;
pub mod validator;
pub mod workbook_parser;

pub use differ::DiffEngine;
pub use error::{ImportError, ImportResult, RollbackError};
pub use executor::ImportExecutor;
pub use exporter::WorkbookExporter;
pub use rollback::{RollbackService, ROLLBACK_ACTOR};
pub use validator::ValidationEngine;
pub use workbook_parser::WorkbookParser;
