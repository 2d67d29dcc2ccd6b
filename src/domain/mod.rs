// ==========================================
// 配件目录管理系统 - 领域层
// ==========================================
// 职责: 实体、工作簿行结构、校验词汇表、差异集、导入记录
// 红线: 领域层不访问数据库，不依赖上层模块
// ==========================================

pub mod catalog;
pub mod diff;
pub mod import_record;
pub mod snapshot;
pub mod validation;
pub mod workbook;

// 重导出核心类型
pub use catalog::{CrossReference, EntityType, Part, VehicleApplication};
pub use diff::{
    CatalogDiff, ChangeSet, DiffSummary, NewCrossReference, NewPart, NewVehicleApplication,
    PartRef,
};
pub use import_record::{
    AffectedIds, CatalogSnapshot, ImportMeta, ImportRecord, PendingImport, RestoredCounts,
    RollbackConflict, RollbackOutcome,
};
pub use snapshot::StoreSnapshot;
pub use validation::{
    ErrorCode, ValidationIssue, ValidationReport, ValidationWarning, WarningCode,
};
pub use workbook::{
    ParsedWorkbook, RawCrossReferenceRow, RawPartRow, RawVehicleApplicationRow, RowIdentity,
    SheetRows,
};
