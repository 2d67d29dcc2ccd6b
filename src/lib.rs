// ==========================================
// 配件目录管理系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 配件目录对账与回滚（人工最终控制权）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 解析/校验/差异/执行/回滚/导出
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{
    CatalogDiff, CatalogSnapshot, CrossReference, DiffSummary, EntityType, ImportMeta,
    ImportRecord, ParsedWorkbook, Part, RollbackConflict, RollbackOutcome, StoreSnapshot,
    ValidationReport, VehicleApplication,
};

// 导入管道
pub use importer::{
    DiffEngine, ImportError, ImportExecutor, RollbackError, RollbackService, ValidationEngine,
    WorkbookExporter, WorkbookParser,
};

// API
pub use api::{ApiError, ImportApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "配件目录管理系统";

// ==========================================
// 预编译检查
// ==========================================
