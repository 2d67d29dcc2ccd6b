// ==========================================
// 配件目录管理系统 - 目录领域模型
// ==========================================
// 实体层级: Part (根) → VehicleApplication / CrossReference (子)
// 红线: 子实体由所属配件独占，删除配件级联删除子记录
// 对齐: db.rs 建表语句
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Part - 配件主数据
// ==========================================
// 不变量: SKU 全表唯一
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    // ===== 主键 =====
    pub part_id: String, // 配件唯一标识（UUID 文本）

    // ===== 业务字段 =====
    pub sku: String,                      // 配件 SKU（唯一，必填）
    pub part_type: String,                // 配件类型分类（必填）
    pub position_type: Option<String>,    // 安装位置
    pub abs_type: Option<String>,         // ABS 类型
    pub bolt_pattern: Option<String>,     // 螺栓孔距
    pub drive_type: Option<String>,       // 驱动形式
    pub specification: Option<String>,    // 规格说明（自由文本）

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>,        // 记录创建时间
    pub updated_at: DateTime<Utc>,        // 记录更新时间（回滚冲突检测依据）
    pub updated_by: Option<String>,       // 操作人标识
}

// ==========================================
// VehicleApplication - 车型适配记录
// ==========================================
// 不变量: year_start <= year_end，年份在日历界限内
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleApplication {
    // ===== 主键与关联 =====
    pub application_id: String, // 适配记录唯一标识（UUID 文本）
    pub part_id: String,        // 所属配件（FK，级联删除）

    // ===== 业务字段 =====
    pub make: String,     // 车辆品牌（必填）
    pub model: String,    // 车辆型号（必填）
    pub year_start: i32,  // 起始年份（含）
    pub year_end: i32,    // 结束年份（含）

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<String>,
}

// ==========================================
// CrossReference - 竞品交叉引用
// ==========================================
// 不变量: competitor_sku 非空
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossReference {
    // ===== 主键与关联 =====
    pub cross_reference_id: String, // 交叉引用唯一标识（UUID 文本）
    pub part_id: String,            // 所属配件（FK，级联删除）

    // ===== 业务字段 =====
    pub competitor_brand: Option<String>, // 竞品品牌（可选）
    pub competitor_sku: String,           // 竞品 SKU（必填）

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<String>,
}

// ==========================================
// EntityType - 实体类型枚举
// ==========================================
// 用途: 校验问题、冲突清单、差异集中定位实体
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityType {
    Part,
    VehicleApplication,
    CrossReference,
}

impl EntityType {
    /// 对应的工作簿 sheet 名称
    pub fn sheet_name(&self) -> &'static str {
        match self {
            EntityType::Part => "Parts",
            EntityType::VehicleApplication => "VehicleApplications",
            EntityType::CrossReference => "CrossReferences",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.sheet_name())
    }
}
