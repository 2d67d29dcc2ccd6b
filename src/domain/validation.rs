// ==========================================
// 配件目录管理系统 - 校验词汇表
// ==========================================
// 错误码/警告码是稳定标识符（调用方与测试按码分支），不是文案。
// 错误阻断导入；警告仅供管理员确认，不阻断。
// ==========================================

use crate::domain::catalog::EntityType;
use serde::{Deserialize, Serialize};

// ==========================================
// ErrorCode - 阻断性错误码
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// 被视为含既有记录的 sheet 缺失隐藏标识列（无法追踪更新/删除）
    E1,
    /// 文档内两行及以上配件共用同一 SKU
    E2,
    /// 必填字段为空
    E3,
    /// 非空隐藏标识值不是合法的标识 token
    E4,
    /// 子行外键/自然键引用无法解析到任何配件（文档内或库内）
    E5,
    /// 车型适配起始年份大于结束年份
    E6,
    /// 字符串字段超过最大长度（SKU/品牌/型号上限 50）
    E7,
    /// 年份超出可接受的日历界限
    E8,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E1 => "E1",
            ErrorCode::E2 => "E2",
            ErrorCode::E3 => "E3",
            ErrorCode::E4 => "E4",
            ErrorCode::E5 => "E5",
            ErrorCode::E6 => "E6",
            ErrorCode::E7 => "E7",
            ErrorCode::E8 => "E8",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// WarningCode - 非阻断性警告码
// ==========================================
// W5/W6 为预留空位：源规则只确认了 W1-W4 与 W7-W10 的触发条件，
// 这两个码的业务含义待产品澄清，引擎永不产出。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WarningCode {
    /// 配件 SKU 变更
    W1,
    /// 配件类型变更
    W2,
    /// 安装位置变更
    W3,
    /// 规格说明文本变短
    W4,
    /// 预留（业务含义待产品确认）
    W5,
    /// 预留（业务含义待产品确认）
    W6,
    /// 车辆品牌变更
    W7,
    /// 车辆型号变更
    W8,
    /// 年份区间收窄（新区间是旧区间的真子集）
    W9,
    /// 竞品品牌变更
    W10,
}

impl WarningCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningCode::W1 => "W1",
            WarningCode::W2 => "W2",
            WarningCode::W3 => "W3",
            WarningCode::W4 => "W4",
            WarningCode::W5 => "W5",
            WarningCode::W6 => "W6",
            WarningCode::W7 => "W7",
            WarningCode::W8 => "W8",
            WarningCode::W9 => "W9",
            WarningCode::W10 => "W10",
        }
    }
}

impl std::fmt::Display for WarningCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// ValidationIssue - 校验错误明细
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub code: ErrorCode,            // 稳定错误码
    pub entity: EntityType,         // 所在 sheet
    pub row_number: Option<usize>,  // 原始行号（sheet 级错误为 None）
    pub field: Option<String>,      // 违规字段
    pub message: String,            // 人读描述
}

// ==========================================
// ValidationWarning - 校验警告明细
// ==========================================
// 每条警告指明记录、字段、旧值、新值，供导入前确认页展示
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub code: WarningCode,
    pub entity: EntityType,
    pub record_id: String,          // 受影响记录标识
    pub sku: Option<String>,        // 配件 SKU 上下文（便于定位）
    pub field: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub message: String,
}

// ==========================================
// ValidationReport - 校验结果
// ==========================================
// 以数据而非异常返回：UI 一次性渲染完整报告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool, // errors 非空即 false，调用方不得继续差异/导入
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    pub fn new(errors: Vec<ValidationIssue>, warnings: Vec<ValidationWarning>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// 指定错误码的出现次数（测试与调用方按码分支）
    pub fn count_code(&self, code: ErrorCode) -> usize {
        self.errors.iter().filter(|e| e.code == code).count()
    }
}
