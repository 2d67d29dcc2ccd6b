// ==========================================
// 配件目录管理系统 - 工作簿解析器
// ==========================================
// 职责: 字节流 → 三个 sheet 的类型化行集合
// 约束: 纯转换，无副作用；未知多余列忽略；
//       Unicode/控制字符原样保留，留给校验引擎判定
// ==========================================

use crate::domain::workbook::{
    ParsedWorkbook, RawCrossReferenceRow, RawPartRow, RawVehicleApplicationRow, RowIdentity,
    SheetRows,
};
use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_from_rs, Data, Range, Reader, Xlsx};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

// ===== sheet 名（固定布局）=====
pub const SHEET_PARTS: &str = "Parts";
pub const SHEET_VEHICLE_APPLICATIONS: &str = "VehicleApplications";
pub const SHEET_CROSS_REFERENCES: &str = "CrossReferences";

// ===== 隐藏标识列 =====
pub const COL_ID: &str = "_id";
pub const COL_PART_ID: &str = "_part_id";
pub const COL_PART_SKU: &str = "_part_sku";

// ===== 业务列 =====
pub const COL_SKU: &str = "SKU";
pub const COL_PART_TYPE: &str = "Part Type";
pub const COL_POSITION_TYPE: &str = "Position Type";
pub const COL_ABS_TYPE: &str = "ABS Type";
pub const COL_BOLT_PATTERN: &str = "Bolt Pattern";
pub const COL_DRIVE_TYPE: &str = "Drive Type";
pub const COL_SPECIFICATION: &str = "Specification";
pub const COL_MAKE: &str = "Make";
pub const COL_MODEL: &str = "Model";
pub const COL_YEAR_START: &str = "Year Start";
pub const COL_YEAR_END: &str = "Year End";
pub const COL_COMPETITOR_BRAND: &str = "Competitor Brand";
pub const COL_COMPETITOR_SKU: &str = "Competitor SKU";

// ==========================================
// WorkbookParser
// ==========================================
pub struct WorkbookParser;

impl WorkbookParser {
    /// 解析工作簿字节流
    ///
    /// # 失败模式
    /// - 零字节/非 xlsx 容器/截断压缩包 → MalformedDocument
    /// - 缺少必需 sheet → MissingSheet
    pub fn parse_bytes(bytes: &[u8]) -> ImportResult<ParsedWorkbook> {
        if bytes.is_empty() {
            return Err(ImportError::MalformedDocument("空文件（0 字节）".to_string()));
        }

        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))?;

        let parts_range = required_sheet_range(&mut workbook, SHEET_PARTS)?;
        let apps_range = required_sheet_range(&mut workbook, SHEET_VEHICLE_APPLICATIONS)?;
        let xrefs_range = required_sheet_range(&mut workbook, SHEET_CROSS_REFERENCES)?;

        Ok(ParsedWorkbook {
            parts: parse_parts_sheet(&parts_range),
            vehicle_applications: parse_vehicle_applications_sheet(&apps_range),
            cross_references: parse_cross_references_sheet(&xrefs_range),
        })
    }

    /// 从文件路径解析（二进制/测试便捷入口）
    pub fn parse_file<P: AsRef<Path>>(path: P) -> ImportResult<ParsedWorkbook> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }
        let bytes = std::fs::read(path)?;
        Self::parse_bytes(&bytes)
    }
}

/// 取必需 sheet 的单元格区域（缺失 → MissingSheet）
fn required_sheet_range<RS>(workbook: &mut Xlsx<RS>, name: &str) -> ImportResult<Range<Data>>
where
    RS: std::io::Read + std::io::Seek,
{
    if !workbook.sheet_names().iter().any(|s| s == name) {
        return Err(ImportError::MissingSheet(name.to_string()));
    }
    Ok(workbook.worksheet_range(name)?)
}

// ==========================================
// 表头索引
// ==========================================
// 表头 → 列号映射；未知列留在映射里但没人查它，等价于忽略
struct HeaderIndex {
    columns: HashMap<String, usize>,
}

impl HeaderIndex {
    fn from_row(header_row: &[Data]) -> Self {
        let mut columns = HashMap::new();
        for (idx, cell) in header_row.iter().enumerate() {
            let name = cell.to_string().trim().to_string();
            if !name.is_empty() {
                columns.entry(name).or_insert(idx);
            }
        }
        Self { columns }
    }

    fn has(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// 取字符串单元格（trim 后空串 → None）
    fn string(&self, row: &[Data], name: &str) -> Option<String> {
        let idx = *self.columns.get(name)?;
        cell_to_string(row.get(idx)?)
    }

    /// 取年份单元格（整数/浮点/数字文本，其余 → None）
    fn year(&self, row: &[Data], name: &str) -> Option<i32> {
        let idx = *self.columns.get(name)?;
        cell_to_year(row.get(idx)?)
    }
}

fn cell_to_string(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        other => {
            let s = other.to_string().trim().to_string();
            if s.is_empty() {
                None
            } else {
                Some(s)
            }
        }
    }
}

fn cell_to_year(cell: &Data) -> Option<i32> {
    match cell {
        Data::Int(i) => i32::try_from(*i).ok(),
        // Excel 数字单元格一律是浮点（2019 存为 2019.0）
        Data::Float(f) if f.fract() == 0.0 => i32::try_from(*f as i64).ok(),
        Data::String(s) => s.trim().parse::<i32>().ok(),
        _ => None,
    }
}

/// 整行是否全空（跳过）
fn is_blank_row(row: &[Data]) -> bool {
    row.iter().all(|cell| cell_to_string(cell).is_none())
}

// ==========================================
// 各 sheet 解析
// ==========================================
fn parse_parts_sheet(range: &Range<Data>) -> SheetRows<RawPartRow> {
    let mut rows_iter = range.rows();
    let header = match rows_iter.next() {
        Some(h) => HeaderIndex::from_row(h),
        None => return SheetRows::empty(),
    };
    let has_identity_columns = header.has(COL_ID);

    let mut rows = Vec::new();
    // 数据行从第 2 行开始（表头为第 1 行）
    for (offset, row) in rows_iter.enumerate() {
        if is_blank_row(row) {
            continue;
        }
        rows.push(RawPartRow {
            row_number: offset + 2,
            identity: RowIdentity::from_cell(header.string(row, COL_ID)),
            sku: header.string(row, COL_SKU),
            part_type: header.string(row, COL_PART_TYPE),
            position_type: header.string(row, COL_POSITION_TYPE),
            abs_type: header.string(row, COL_ABS_TYPE),
            bolt_pattern: header.string(row, COL_BOLT_PATTERN),
            drive_type: header.string(row, COL_DRIVE_TYPE),
            specification: header.string(row, COL_SPECIFICATION),
        });
    }

    SheetRows {
        rows,
        has_identity_columns,
    }
}

fn parse_vehicle_applications_sheet(range: &Range<Data>) -> SheetRows<RawVehicleApplicationRow> {
    let mut rows_iter = range.rows();
    let header = match rows_iter.next() {
        Some(h) => HeaderIndex::from_row(h),
        None => return SheetRows::empty(),
    };
    let has_identity_columns = header.has(COL_ID);

    let mut rows = Vec::new();
    for (offset, row) in rows_iter.enumerate() {
        if is_blank_row(row) {
            continue;
        }
        rows.push(RawVehicleApplicationRow {
            row_number: offset + 2,
            identity: RowIdentity::from_cell(header.string(row, COL_ID)),
            part_id_ref: header.string(row, COL_PART_ID),
            part_sku_ref: header.string(row, COL_PART_SKU),
            make: header.string(row, COL_MAKE),
            model: header.string(row, COL_MODEL),
            year_start: header.year(row, COL_YEAR_START),
            year_end: header.year(row, COL_YEAR_END),
        });
    }

    SheetRows {
        rows,
        has_identity_columns,
    }
}

fn parse_cross_references_sheet(range: &Range<Data>) -> SheetRows<RawCrossReferenceRow> {
    let mut rows_iter = range.rows();
    let header = match rows_iter.next() {
        Some(h) => HeaderIndex::from_row(h),
        None => return SheetRows::empty(),
    };
    let has_identity_columns = header.has(COL_ID);

    let mut rows = Vec::new();
    for (offset, row) in rows_iter.enumerate() {
        if is_blank_row(row) {
            continue;
        }
        rows.push(RawCrossReferenceRow {
            row_number: offset + 2,
            identity: RowIdentity::from_cell(header.string(row, COL_ID)),
            part_id_ref: header.string(row, COL_PART_ID),
            part_sku_ref: header.string(row, COL_PART_SKU),
            competitor_brand: header.string(row, COL_COMPETITOR_BRAND),
            competitor_sku: header.string(row, COL_COMPETITOR_SKU),
        });
    }

    SheetRows {
        rows,
        has_identity_columns,
    }
}
