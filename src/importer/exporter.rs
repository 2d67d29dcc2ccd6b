// ==========================================
// 配件目录管理系统 - 工作簿导出
// ==========================================
// 职责: 当前库存 → 三 sheet 工作簿（隐藏标识列已填充）
// 约束: 列布局与解析端常量严格一致——导出再导入必须得到空差异
// ==========================================

use crate::domain::snapshot::StoreSnapshot;
use crate::importer::error::ImportResult;
use crate::importer::workbook_parser::{
    COL_ABS_TYPE, COL_BOLT_PATTERN, COL_COMPETITOR_BRAND, COL_COMPETITOR_SKU, COL_DRIVE_TYPE,
    COL_ID, COL_MAKE, COL_MODEL, COL_PART_ID, COL_PART_SKU, COL_PART_TYPE, COL_POSITION_TYPE,
    COL_SKU, COL_SPECIFICATION, COL_YEAR_END, COL_YEAR_START, SHEET_CROSS_REFERENCES,
    SHEET_PARTS, SHEET_VEHICLE_APPLICATIONS,
};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::path::Path;
use tracing::debug;

pub struct WorkbookExporter;

impl WorkbookExporter {
    /// 导出为内存字节（下载场景）
    pub fn export_snapshot(snapshot: &StoreSnapshot) -> ImportResult<Vec<u8>> {
        let mut workbook = Self::build_workbook(snapshot)?;
        let bytes = workbook.save_to_buffer()?;
        debug!(
            parts = snapshot.parts.len(),
            vehicle_applications = snapshot.vehicle_applications.len(),
            cross_references = snapshot.cross_references.len(),
            bytes = bytes.len(),
            "工作簿导出完成"
        );
        Ok(bytes)
    }

    /// 导出到文件
    pub fn export_file(snapshot: &StoreSnapshot, path: &Path) -> ImportResult<()> {
        let mut workbook = Self::build_workbook(snapshot)?;
        workbook.save(path)?;
        Ok(())
    }

    fn build_workbook(snapshot: &StoreSnapshot) -> ImportResult<Workbook> {
        let mut workbook = Workbook::new();
        let header = Format::new().set_bold();

        Self::write_parts(workbook.add_worksheet(), snapshot, &header)?;
        Self::write_vehicle_applications(workbook.add_worksheet(), snapshot, &header)?;
        Self::write_cross_references(workbook.add_worksheet(), snapshot, &header)?;

        Ok(workbook)
    }

    fn write_parts(
        sheet: &mut Worksheet,
        snapshot: &StoreSnapshot,
        header: &Format,
    ) -> ImportResult<()> {
        sheet.set_name(SHEET_PARTS)?;
        let columns = [
            COL_ID,
            COL_SKU,
            COL_PART_TYPE,
            COL_POSITION_TYPE,
            COL_ABS_TYPE,
            COL_BOLT_PATTERN,
            COL_DRIVE_TYPE,
            COL_SPECIFICATION,
        ];
        for (col, name) in columns.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *name, header)?;
        }
        // 标识列对用户隐藏，往返导入时原样带回
        sheet.set_column_hidden(0)?;

        // BTreeMap 序: 导出内容确定
        for (row, part) in snapshot.parts.values().enumerate() {
            let row = (row + 1) as u32;
            sheet.write_string(row, 0, &part.part_id)?;
            sheet.write_string(row, 1, &part.sku)?;
            sheet.write_string(row, 2, &part.part_type)?;
            write_optional(sheet, row, 3, part.position_type.as_deref())?;
            write_optional(sheet, row, 4, part.abs_type.as_deref())?;
            write_optional(sheet, row, 5, part.bolt_pattern.as_deref())?;
            write_optional(sheet, row, 6, part.drive_type.as_deref())?;
            write_optional(sheet, row, 7, part.specification.as_deref())?;
        }
        Ok(())
    }

    fn write_vehicle_applications(
        sheet: &mut Worksheet,
        snapshot: &StoreSnapshot,
        header: &Format,
    ) -> ImportResult<()> {
        sheet.set_name(SHEET_VEHICLE_APPLICATIONS)?;
        let columns = [
            COL_ID,
            COL_PART_ID,
            COL_PART_SKU,
            COL_MAKE,
            COL_MODEL,
            COL_YEAR_START,
            COL_YEAR_END,
        ];
        for (col, name) in columns.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *name, header)?;
        }
        sheet.set_column_hidden(0)?;
        sheet.set_column_hidden(1)?;
        sheet.set_column_hidden(2)?;

        for (row, app) in snapshot.vehicle_applications.values().enumerate() {
            let row = (row + 1) as u32;
            let part_sku = snapshot.parts.get(&app.part_id).map(|p| p.sku.as_str());
            sheet.write_string(row, 0, &app.application_id)?;
            sheet.write_string(row, 1, &app.part_id)?;
            write_optional(sheet, row, 2, part_sku)?;
            sheet.write_string(row, 3, &app.make)?;
            sheet.write_string(row, 4, &app.model)?;
            sheet.write_number(row, 5, app.year_start as f64)?;
            sheet.write_number(row, 6, app.year_end as f64)?;
        }
        Ok(())
    }

    fn write_cross_references(
        sheet: &mut Worksheet,
        snapshot: &StoreSnapshot,
        header: &Format,
    ) -> ImportResult<()> {
        sheet.set_name(SHEET_CROSS_REFERENCES)?;
        let columns = [
            COL_ID,
            COL_PART_ID,
            COL_PART_SKU,
            COL_COMPETITOR_BRAND,
            COL_COMPETITOR_SKU,
        ];
        for (col, name) in columns.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *name, header)?;
        }
        sheet.set_column_hidden(0)?;
        sheet.set_column_hidden(1)?;
        sheet.set_column_hidden(2)?;

        for (row, xref) in snapshot.cross_references.values().enumerate() {
            let row = (row + 1) as u32;
            let part_sku = snapshot.parts.get(&xref.part_id).map(|p| p.sku.as_str());
            sheet.write_string(row, 0, &xref.cross_reference_id)?;
            sheet.write_string(row, 1, &xref.part_id)?;
            write_optional(sheet, row, 2, part_sku)?;
            write_optional(sheet, row, 3, xref.competitor_brand.as_deref())?;
            sheet.write_string(row, 4, &xref.competitor_sku)?;
        }
        Ok(())
    }
}

fn write_optional(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: Option<&str>,
) -> ImportResult<()> {
    if let Some(value) = value {
        sheet.write_string(row, col, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{CrossReference, Part, VehicleApplication};
    use crate::domain::workbook::RowIdentity;
    use crate::importer::differ::DiffEngine;
    use crate::importer::workbook_parser::WorkbookParser;
    use chrono::Utc;

    const PART_ID: &str = "6f1f7f4e-9d0a-4b6c-8a6e-000000000001";
    const APP_ID: &str = "6f1f7f4e-9d0a-4b6c-8a6e-000000000011";
    const XREF_ID: &str = "6f1f7f4e-9d0a-4b6c-8a6e-000000000021";

    fn sample_snapshot() -> StoreSnapshot {
        let now = Utc::now();
        let part = Part {
            part_id: PART_ID.to_string(),
            sku: "ACR-100".to_string(),
            part_type: "hub assembly".to_string(),
            position_type: Some("front".to_string()),
            abs_type: Some("with ABS".to_string()),
            bolt_pattern: None,
            drive_type: None,
            specification: Some("轮毂单元 规格 v2".to_string()),
            created_at: now,
            updated_at: now,
            updated_by: None,
        };
        let app = VehicleApplication {
            application_id: APP_ID.to_string(),
            part_id: PART_ID.to_string(),
            make: "Toyota".to_string(),
            model: "Camry".to_string(),
            year_start: 2018,
            year_end: 2022,
            created_at: now,
            updated_at: now,
            updated_by: None,
        };
        let xref = CrossReference {
            cross_reference_id: XREF_ID.to_string(),
            part_id: PART_ID.to_string(),
            competitor_brand: Some("Timken".to_string()),
            competitor_sku: "HA590100".to_string(),
            created_at: now,
            updated_at: now,
            updated_by: None,
        };
        StoreSnapshot::from_rows(vec![part], vec![app], vec![xref])
    }

    #[test]
    fn test_export_preserves_identity_columns() {
        let snapshot = sample_snapshot();
        let bytes = WorkbookExporter::export_snapshot(&snapshot).unwrap();
        let doc = WorkbookParser::parse_bytes(&bytes).unwrap();

        assert!(doc.parts.has_identity_columns);
        assert_eq!(
            doc.parts.rows[0].identity,
            RowIdentity::Existing(PART_ID.to_string())
        );
        assert_eq!(
            doc.vehicle_applications.rows[0].part_id_ref.as_deref(),
            Some(PART_ID)
        );
        assert_eq!(
            doc.vehicle_applications.rows[0].part_sku_ref.as_deref(),
            Some("ACR-100")
        );
        assert_eq!(doc.cross_references.rows[0].competitor_sku.as_deref(), Some("HA590100"));
        // Unicode 原样往返
        assert_eq!(
            doc.parts.rows[0].specification.as_deref(),
            Some("轮毂单元 规格 v2")
        );
    }

    #[test]
    fn test_export_file_and_parse_file_round_trip() {
        let snapshot = sample_snapshot();
        let file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        WorkbookExporter::export_file(&snapshot, file.path()).unwrap();

        let doc = WorkbookParser::parse_file(file.path()).unwrap();
        assert_eq!(doc.parts.rows.len(), 1);

        let missing = WorkbookParser::parse_file("/no/such/catalog.xlsx");
        assert!(matches!(
            missing,
            Err(crate::importer::error::ImportError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_round_trip_yields_empty_diff() {
        let snapshot = sample_snapshot();
        let bytes = WorkbookExporter::export_snapshot(&snapshot).unwrap();
        let doc = WorkbookParser::parse_bytes(&bytes).unwrap();

        let diff = DiffEngine::generate_diff(&doc, &snapshot);
        assert!(diff.is_empty(), "导出再导入必须得到空差异: {:?}", diff.summary());
    }
}
