// ==========================================
// 配件目录管理系统 - 导入记录与回滚结构
// ==========================================
// 导入记录随导入原子创建，之后只读；回滚消费快照但不删除记录
// （历史始终可查）。快照是执行前三张实体表的全量内容，
// 不是差异触及的行——容忍差异计算与落库之间的并发写。
// ==========================================

use crate::domain::catalog::{CrossReference, EntityType, Part, VehicleApplication};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// CatalogSnapshot - 全量快照载荷
// ==========================================
// 独占归属于导入记录，其他组件不读写
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub parts: Vec<Part>,
    pub vehicle_applications: Vec<VehicleApplication>,
    pub cross_references: Vec<CrossReference>,
}

impl CatalogSnapshot {
    pub fn empty() -> Self {
        Self {
            parts: Vec::new(),
            vehicle_applications: Vec::new(),
            cross_references: Vec::new(),
        }
    }
}

// ==========================================
// AffectedIds - 差异触及的标识集
// ==========================================
// 执行期记录（含新增行分配到的标识），回滚冲突检测的扫描范围
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AffectedIds {
    pub parts: Vec<String>,
    pub vehicle_applications: Vec<String>,
    pub cross_references: Vec<String>,
}

// ==========================================
// ImportMeta - 导入请求元信息
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportMeta {
    pub file_name: String, // 源文件名（原样保留，不做长度裁剪）
    pub file_size: i64,    // 源文件字节数
    pub actor: String,     // 操作人标识
}

// ==========================================
// PendingImport - 待落库的导入单
// ==========================================
// 执行器在事务外分配标识与时间戳；快照/触及标识集/计数在事务内补全
#[derive(Debug, Clone, PartialEq)]
pub struct PendingImport {
    pub import_id: String,
    pub imported_at: DateTime<Utc>,
    pub meta: ImportMeta,
    pub total_rows: i32,
}

// ==========================================
// ImportRecord - 导入审计记录
// ==========================================
// 对齐: db.rs import_record 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRecord {
    pub import_id: String,              // 导入记录 ID（UUID）
    pub file_name: String,              // 源文件名
    pub file_size: i64,                 // 源文件字节数
    pub imported_at: DateTime<Utc>,     // 导入时间（写入行的 updated_at 与之对齐）
    pub imported_by: String,            // 操作人
    pub total_rows: i32,                // 文档数据行数
    pub add_count: i32,                 // 合并新增数
    pub update_count: i32,              // 合并更新数
    pub delete_count: i32,              // 合并删除数
    pub snapshot_json: String,          // 全量快照载荷（CatalogSnapshot JSON）
    pub affected_ids_json: String,      // 触及标识集（AffectedIds JSON）
    pub created_at: DateTime<Utc>,      // 记录创建时间
    pub rolled_back_at: Option<DateTime<Utc>>, // 回滚时间（未回滚为 NULL；记录本身保留）
}

impl ImportRecord {
    /// 解析快照载荷
    pub fn snapshot(&self) -> Result<CatalogSnapshot, serde_json::Error> {
        serde_json::from_str(&self.snapshot_json)
    }

    /// 解析触及标识集
    pub fn affected_ids(&self) -> Result<AffectedIds, serde_json::Error> {
        serde_json::from_str(&self.affected_ids_json)
    }

    /// 该导入是否已被回滚（已回滚的导入不再是“最新可回滚”候选）
    pub fn is_rolled_back(&self) -> bool {
        self.rolled_back_at.is_some()
    }
}

// ==========================================
// RollbackConflict - 回滚冲突明细
// ==========================================
// 导入后被他人改动的记录：整条拒绝回滚，而不是静默覆盖人工编辑
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollbackConflict {
    pub entity: EntityType,
    pub record_id: String,
    pub sku: Option<String>,                  // 配件 SKU 上下文
    pub modified_by: Option<String>,          // 改动人（行缺失时为 None）
    pub modified_at: Option<DateTime<Utc>>,   // 改动时间
    pub changed_fields: Vec<String>,          // 与快照先前状态的字段差异（信息性）
}

// ==========================================
// RestoredCounts / RollbackOutcome - 回滚结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoredCounts {
    pub parts: usize,
    pub vehicle_applications: usize,
    pub cross_references: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollbackOutcome {
    pub import_id: String,
    pub restored: RestoredCounts,
}
