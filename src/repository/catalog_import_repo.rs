// ==========================================
// 配件目录管理系统 - 目录导入 Repository Trait
// ==========================================
// 职责: 定义导入/回滚相关数据访问接口（不包含业务逻辑）
// 红线: Repository 不含业务规则，只做数据 CRUD；
//       差异如何算、能否回滚由 importer 层决定
// ==========================================

use crate::domain::diff::CatalogDiff;
use crate::domain::import_record::{
    CatalogSnapshot, ImportRecord, PendingImport, RestoredCounts,
};
use crate::domain::snapshot::StoreSnapshot;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// CatalogImportRepository Trait
// ==========================================
// 实现者: CatalogImportRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait CatalogImportRepository: Send + Sync {
    // ===== 读取 =====

    /// 读取三张实体表的当前全量内容（单次查询窗口，校验与差异共用）
    async fn load_snapshot(&self) -> RepositoryResult<StoreSnapshot>;

    /// 按标识查询导入记录
    async fn find_import(&self, import_id: &str) -> RepositoryResult<Option<ImportRecord>>;

    /// 查询最新一条未回滚的导入记录（按 imported_at 降序）
    ///
    /// 已回滚的记录保留在表里但不再参与“最新”判定，
    /// 顺序回滚才能一步步向更早的导入推进。
    async fn find_latest_import(&self) -> RepositoryResult<Option<ImportRecord>>;

    /// 查询最近的导入记录列表
    async fn list_recent_imports(&self, limit: usize) -> RepositoryResult<Vec<ImportRecord>>;

    // ===== 写入（事务化）=====

    /// 执行一次导入：单事务内完成
    /// 1. 抓取三张实体表全量快照（执行前状态）
    /// 2. 写入导入记录（快照 + 元信息 + 计数 + 触及标识集）
    /// 3. 应用 deletes（子先父后）→ updates → adds（父先子后，
    ///    同文档新增子行按 SKU 回填本次分配的 part_id）
    ///
    /// 写入行盖章 updated_at = imported_at, updated_by = 操作人。
    /// 任一步失败整体回滚。
    async fn apply_import(
        &self,
        pending: PendingImport,
        diff: &CatalogDiff,
    ) -> RepositoryResult<ImportRecord>;

    /// 从快照载荷整体恢复三张实体表：单事务内清空后重建，
    /// 审计字段按快照原值写回（不盖新章）。
    /// 同一事务内给 import_id 对应的导入记录盖 rolled_back_at 章，
    /// 记录本身不删除（历史始终可查）。
    async fn restore_snapshot(
        &self,
        import_id: &str,
        snapshot: &CatalogSnapshot,
    ) -> RepositoryResult<RestoredCounts>;
}
