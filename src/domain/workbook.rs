// ==========================================
// 配件目录管理系统 - 工作簿行结构
// ==========================================
// 用途: 解析管道中间产物（文件解析 → 校验/差异计算）
// 生命周期: 仅在一次导入请求内
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// RowIdentity - 行身份标签
// ==========================================
// 隐藏 _id 列为空 → 新记录；非空 → 引用既有记录。
// token 格式是否合法由校验引擎判定（E4），解析层原样保留。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowIdentity {
    /// 隐藏标识列为空（或整列缺失）：新增候选
    New,
    /// 隐藏标识列非空：既有记录引用
    Existing(String),
}

impl RowIdentity {
    /// 从单元格值构造（已 trim，空串视为 New）
    pub fn from_cell(value: Option<String>) -> Self {
        match value {
            Some(token) if !token.is_empty() => RowIdentity::Existing(token),
            _ => RowIdentity::New,
        }
    }

    /// 既有记录的标识 token（New 返回 None）
    pub fn existing_token(&self) -> Option<&str> {
        match self {
            RowIdentity::Existing(token) => Some(token),
            RowIdentity::New => None,
        }
    }
}

// ==========================================
// RawPartRow - Parts sheet 行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPartRow {
    pub row_number: usize,             // 原始文件行号（表头为 1）
    pub identity: RowIdentity,         // 隐藏 _id 列
    pub sku: Option<String>,           // SKU（必填，E3 判定）
    pub part_type: Option<String>,     // 配件类型（必填）
    pub position_type: Option<String>,
    pub abs_type: Option<String>,
    pub bolt_pattern: Option<String>,
    pub drive_type: Option<String>,
    pub specification: Option<String>,
}

// ==========================================
// RawVehicleApplicationRow - VehicleApplications sheet 行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawVehicleApplicationRow {
    pub row_number: usize,
    pub identity: RowIdentity,          // 隐藏 _id 列
    pub part_id_ref: Option<String>,    // 隐藏 _part_id 列（所属配件标识）
    pub part_sku_ref: Option<String>,   // 隐藏 _part_sku 列（冗余自然键，同文档新增行的关联键）
    pub make: Option<String>,
    pub model: Option<String>,
    pub year_start: Option<i32>,
    pub year_end: Option<i32>,
}

// ==========================================
// RawCrossReferenceRow - CrossReferences sheet 行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCrossReferenceRow {
    pub row_number: usize,
    pub identity: RowIdentity,
    pub part_id_ref: Option<String>,
    pub part_sku_ref: Option<String>,
    pub competitor_brand: Option<String>,
    pub competitor_sku: Option<String>,
}

// ==========================================
// SheetRows - 单 sheet 解析结果
// ==========================================
// has_identity_columns 区分“列整体缺失”与“列存在但值为空”：
// 前者触发 E1（无法区分新增/更新/删除），后者是合法的新增行。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetRows<T> {
    pub rows: Vec<T>,               // 数据行（保留文档顺序）
    pub has_identity_columns: bool, // 表头中是否存在隐藏 _id 列
}

impl<T> SheetRows<T> {
    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            has_identity_columns: false,
        }
    }
}

// ==========================================
// ParsedWorkbook - 工作簿解析结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedWorkbook {
    pub parts: SheetRows<RawPartRow>,
    pub vehicle_applications: SheetRows<RawVehicleApplicationRow>,
    pub cross_references: SheetRows<RawCrossReferenceRow>,
}

impl ParsedWorkbook {
    /// 全部数据行数（三个 sheet 合计）
    pub fn total_rows(&self) -> usize {
        self.parts.rows.len()
            + self.vehicle_applications.rows.len()
            + self.cross_references.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_identity_from_cell() {
        assert_eq!(RowIdentity::from_cell(None), RowIdentity::New);
        assert_eq!(RowIdentity::from_cell(Some(String::new())), RowIdentity::New);
        assert_eq!(
            RowIdentity::from_cell(Some("abc".to_string())),
            RowIdentity::Existing("abc".to_string())
        );
    }

    #[test]
    fn test_existing_token() {
        let id = RowIdentity::Existing("tok-1".to_string());
        assert_eq!(id.existing_token(), Some("tok-1"));
        assert_eq!(RowIdentity::New.existing_token(), None);
    }
}
