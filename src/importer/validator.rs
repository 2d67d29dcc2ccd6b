// ==========================================
// 配件目录管理系统 - 校验引擎
// ==========================================
// 职责: E1-E8 阻断性规则 + W1-W10 变更警告
// 约束: (文档, 快照, 限值) 的纯函数——不读时钟、不带随机态，
//       同一输入永远得到同一报告（差异引擎与测试依赖这一点）。
//       所有问题累积上报，任何一条都不短路其余检查。
// ==========================================

use crate::config::ValidationLimits;
use crate::domain::catalog::EntityType;
use crate::domain::snapshot::StoreSnapshot;
use crate::domain::validation::{
    ErrorCode, ValidationIssue, ValidationReport, ValidationWarning, WarningCode,
};
use crate::domain::workbook::{ParsedWorkbook, RowIdentity};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

pub struct ValidationEngine {
    limits: ValidationLimits,
}

impl ValidationEngine {
    pub fn new(limits: ValidationLimits) -> Self {
        Self { limits }
    }

    /// 校验入口
    ///
    /// errors 非空 → valid=false，调用方不得进入差异/导入阶段；
    /// warnings 仅供导入前确认，不阻断。
    pub fn validate(&self, doc: &ParsedWorkbook, snapshot: &StoreSnapshot) -> ValidationReport {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        // 子行引用解析需要的文档级索引，建一次
        let doc_part_ids: HashSet<&str> = doc
            .parts
            .rows
            .iter()
            .filter_map(|r| r.identity.existing_token())
            .collect();
        let doc_part_skus: HashSet<&str> = doc
            .parts
            .rows
            .iter()
            .filter_map(|r| r.sku.as_deref())
            .collect();

        self.check_identity_columns(doc, snapshot, &mut errors);
        self.check_parts(doc, snapshot, &mut errors, &mut warnings);
        self.check_vehicle_applications(
            doc,
            snapshot,
            &doc_part_ids,
            &doc_part_skus,
            &mut errors,
            &mut warnings,
        );
        self.check_cross_references(
            doc,
            snapshot,
            &doc_part_ids,
            &doc_part_skus,
            &mut errors,
            &mut warnings,
        );

        ValidationReport::new(errors, warnings)
    }

    // ==========================================
    // E1 - 隐藏标识列缺失
    // ==========================================
    // 库内已有该实体的记录时，sheet 被视为含既有记录；
    // 此时没有标识列就无法区分“新增 / 更新 / 因缺席而删除”。
    fn check_identity_columns(
        &self,
        doc: &ParsedWorkbook,
        snapshot: &StoreSnapshot,
        errors: &mut Vec<ValidationIssue>,
    ) {
        let sheets = [
            (EntityType::Part, doc.parts.has_identity_columns, !snapshot.parts.is_empty()),
            (
                EntityType::VehicleApplication,
                doc.vehicle_applications.has_identity_columns,
                !snapshot.vehicle_applications.is_empty(),
            ),
            (
                EntityType::CrossReference,
                doc.cross_references.has_identity_columns,
                !snapshot.cross_references.is_empty(),
            ),
        ];

        for (entity, has_columns, store_has_records) in sheets {
            if store_has_records && !has_columns {
                errors.push(ValidationIssue {
                    code: ErrorCode::E1,
                    entity,
                    row_number: None,
                    field: Some("_id".to_string()),
                    message: format!(
                        "{} sheet 缺少隐藏标识列，库内已有 {} 记录，无法追踪更新/删除",
                        entity.sheet_name(),
                        entity.sheet_name()
                    ),
                });
            }
        }
    }

    // ==========================================
    // Parts sheet: E2/E3/E4/E7 + W1-W4
    // ==========================================
    fn check_parts(
        &self,
        doc: &ParsedWorkbook,
        snapshot: &StoreSnapshot,
        errors: &mut Vec<ValidationIssue>,
        warnings: &mut Vec<ValidationWarning>,
    ) {
        // E2: 文档内 SKU 重复（每个重复 SKU 报一条）
        let mut sku_rows: HashMap<&str, Vec<usize>> = HashMap::new();
        for row in &doc.parts.rows {
            if let Some(sku) = row.sku.as_deref() {
                sku_rows.entry(sku).or_default().push(row.row_number);
            }
        }
        let mut duplicated: Vec<(&str, &Vec<usize>)> =
            sku_rows.iter().filter(|(_, rows)| rows.len() > 1).map(|(s, r)| (*s, r)).collect();
        duplicated.sort_by_key(|(sku, _)| *sku);
        for (sku, rows) in duplicated {
            errors.push(ValidationIssue {
                code: ErrorCode::E2,
                entity: EntityType::Part,
                row_number: None,
                field: Some("SKU".to_string()),
                message: format!("SKU 重复（文档内）: {} 出现在行 {:?}", sku, rows),
            });
        }

        for row in &doc.parts.rows {
            // E3: 必填字段
            if row.sku.is_none() {
                errors.push(required_field(EntityType::Part, row.row_number, "SKU"));
            }
            if row.part_type.is_none() {
                errors.push(required_field(EntityType::Part, row.row_number, "Part Type"));
            }

            // E4: 标识 token 格式
            if let Some(token) = row.identity.existing_token() {
                if Uuid::parse_str(token).is_err() {
                    errors.push(malformed_token(EntityType::Part, row.row_number, "_id", token));
                }
            }

            // E7: 长度上限
            if let Some(sku) = row.sku.as_deref() {
                self.check_length(EntityType::Part, row.row_number, "SKU", sku, errors);
            }

            // W1-W4: 与快照比对（仅已识别且命中的行）
            let existing = row
                .identity
                .existing_token()
                .and_then(|token| snapshot.parts.get(token));
            if let Some(old) = existing {
                if let Some(new_sku) = row.sku.as_deref() {
                    if new_sku != old.sku {
                        warnings.push(field_changed(
                            WarningCode::W1,
                            EntityType::Part,
                            &old.part_id,
                            Some(&old.sku),
                            "SKU",
                            Some(old.sku.clone()),
                            Some(new_sku.to_string()),
                        ));
                    }
                }
                if let Some(new_type) = row.part_type.as_deref() {
                    if new_type != old.part_type {
                        warnings.push(field_changed(
                            WarningCode::W2,
                            EntityType::Part,
                            &old.part_id,
                            Some(&old.sku),
                            "Part Type",
                            Some(old.part_type.clone()),
                            Some(new_type.to_string()),
                        ));
                    }
                }
                if row.position_type != old.position_type {
                    warnings.push(field_changed(
                        WarningCode::W3,
                        EntityType::Part,
                        &old.part_id,
                        Some(&old.sku),
                        "Position Type",
                        old.position_type.clone(),
                        row.position_type.clone(),
                    ));
                }
                // W4: 规格文本变短（含清空）
                let old_len = old.specification.as_deref().map_or(0, |s| s.chars().count());
                let new_len = row.specification.as_deref().map_or(0, |s| s.chars().count());
                if old_len > 0 && new_len < old_len {
                    warnings.push(field_changed(
                        WarningCode::W4,
                        EntityType::Part,
                        &old.part_id,
                        Some(&old.sku),
                        "Specification",
                        old.specification.clone(),
                        row.specification.clone(),
                    ));
                }
            }
        }
    }

    // ==========================================
    // VehicleApplications sheet: E3/E4/E5/E6/E7/E8 + W7-W9
    // ==========================================
    fn check_vehicle_applications(
        &self,
        doc: &ParsedWorkbook,
        snapshot: &StoreSnapshot,
        doc_part_ids: &HashSet<&str>,
        doc_part_skus: &HashSet<&str>,
        errors: &mut Vec<ValidationIssue>,
        warnings: &mut Vec<ValidationWarning>,
    ) {
        for row in &doc.vehicle_applications.rows {
            let entity = EntityType::VehicleApplication;

            if row.make.is_none() {
                errors.push(required_field(entity, row.row_number, "Make"));
            }
            if row.model.is_none() {
                errors.push(required_field(entity, row.row_number, "Model"));
            }
            if row.year_start.is_none() {
                errors.push(required_field(entity, row.row_number, "Year Start"));
            }
            if row.year_end.is_none() {
                errors.push(required_field(entity, row.row_number, "Year End"));
            }

            if let Some(token) = row.identity.existing_token() {
                if Uuid::parse_str(token).is_err() {
                    errors.push(malformed_token(entity, row.row_number, "_id", token));
                }
            }
            if let Some(token) = row.part_id_ref.as_deref() {
                if Uuid::parse_str(token).is_err() {
                    errors.push(malformed_token(entity, row.row_number, "_part_id", token));
                }
            }

            // E5: 所属配件引用必须能落到文档或库内的某个配件
            if !resolves_to_part(
                row.part_id_ref.as_deref(),
                row.part_sku_ref.as_deref(),
                snapshot,
                doc_part_ids,
                doc_part_skus,
            ) {
                errors.push(orphan_reference(
                    entity,
                    row.row_number,
                    row.part_id_ref.as_deref(),
                    row.part_sku_ref.as_deref(),
                ));
            }

            // E6: 年份区间倒置
            if let (Some(start), Some(end)) = (row.year_start, row.year_end) {
                if start > end {
                    errors.push(ValidationIssue {
                        code: ErrorCode::E6,
                        entity,
                        row_number: Some(row.row_number),
                        field: Some("Year Start".to_string()),
                        message: format!("起始年份 {} 大于结束年份 {}", start, end),
                    });
                }
            }

            // E7: 长度上限
            if let Some(make) = row.make.as_deref() {
                self.check_length(entity, row.row_number, "Make", make, errors);
            }
            if let Some(model) = row.model.as_deref() {
                self.check_length(entity, row.row_number, "Model", model, errors);
            }

            // E8: 日历界限
            for (field, year) in [("Year Start", row.year_start), ("Year End", row.year_end)] {
                if let Some(y) = year {
                    if y < self.limits.min_year || y > self.limits.max_year {
                        errors.push(ValidationIssue {
                            code: ErrorCode::E8,
                            entity,
                            row_number: Some(row.row_number),
                            field: Some(field.to_string()),
                            message: format!(
                                "年份 {} 超出界限 [{}, {}]",
                                y, self.limits.min_year, self.limits.max_year
                            ),
                        });
                    }
                }
            }

            // W7-W9: 与快照比对
            let existing = row
                .identity
                .existing_token()
                .and_then(|token| snapshot.vehicle_applications.get(token));
            if let Some(old) = existing {
                let sku = snapshot.parts.get(&old.part_id).map(|p| p.sku.clone());
                if let Some(new_make) = row.make.as_deref() {
                    if new_make != old.make {
                        warnings.push(field_changed(
                            WarningCode::W7,
                            entity,
                            &old.application_id,
                            sku.as_deref(),
                            "Make",
                            Some(old.make.clone()),
                            Some(new_make.to_string()),
                        ));
                    }
                }
                if let Some(new_model) = row.model.as_deref() {
                    if new_model != old.model {
                        warnings.push(field_changed(
                            WarningCode::W8,
                            entity,
                            &old.application_id,
                            sku.as_deref(),
                            "Model",
                            Some(old.model.clone()),
                            Some(new_model.to_string()),
                        ));
                    }
                }
                // W9: 新区间是旧区间的真子集
                if let (Some(new_start), Some(new_end)) = (row.year_start, row.year_end) {
                    let shrunk = new_start >= old.year_start
                        && new_end <= old.year_end
                        && (new_start > old.year_start || new_end < old.year_end);
                    if shrunk {
                        warnings.push(field_changed(
                            WarningCode::W9,
                            entity,
                            &old.application_id,
                            sku.as_deref(),
                            "Year Range",
                            Some(format!("{}-{}", old.year_start, old.year_end)),
                            Some(format!("{}-{}", new_start, new_end)),
                        ));
                    }
                }
            }
        }
    }

    // ==========================================
    // CrossReferences sheet: E3/E4/E5 + W10
    // ==========================================
    fn check_cross_references(
        &self,
        doc: &ParsedWorkbook,
        snapshot: &StoreSnapshot,
        doc_part_ids: &HashSet<&str>,
        doc_part_skus: &HashSet<&str>,
        errors: &mut Vec<ValidationIssue>,
        warnings: &mut Vec<ValidationWarning>,
    ) {
        for row in &doc.cross_references.rows {
            let entity = EntityType::CrossReference;

            if row.competitor_sku.is_none() {
                errors.push(required_field(entity, row.row_number, "Competitor SKU"));
            }

            if let Some(token) = row.identity.existing_token() {
                if Uuid::parse_str(token).is_err() {
                    errors.push(malformed_token(entity, row.row_number, "_id", token));
                }
            }
            if let Some(token) = row.part_id_ref.as_deref() {
                if Uuid::parse_str(token).is_err() {
                    errors.push(malformed_token(entity, row.row_number, "_part_id", token));
                }
            }

            if !resolves_to_part(
                row.part_id_ref.as_deref(),
                row.part_sku_ref.as_deref(),
                snapshot,
                doc_part_ids,
                doc_part_skus,
            ) {
                errors.push(orphan_reference(
                    entity,
                    row.row_number,
                    row.part_id_ref.as_deref(),
                    row.part_sku_ref.as_deref(),
                ));
            }

            // W10: 竞品品牌变更
            let existing = row
                .identity
                .existing_token()
                .and_then(|token| snapshot.cross_references.get(token));
            if let Some(old) = existing {
                if row.competitor_brand != old.competitor_brand {
                    let sku = snapshot.parts.get(&old.part_id).map(|p| p.sku.clone());
                    warnings.push(field_changed(
                        WarningCode::W10,
                        entity,
                        &old.cross_reference_id,
                        sku.as_deref(),
                        "Competitor Brand",
                        old.competitor_brand.clone(),
                        row.competitor_brand.clone(),
                    ));
                }
            }
        }
    }

    fn check_length(
        &self,
        entity: EntityType,
        row_number: usize,
        field: &str,
        value: &str,
        errors: &mut Vec<ValidationIssue>,
    ) {
        let len = value.chars().count();
        if len > self.limits.max_text_length {
            errors.push(ValidationIssue {
                code: ErrorCode::E7,
                entity,
                row_number: Some(row_number),
                field: Some(field.to_string()),
                message: format!(
                    "{} 长度 {} 超过上限 {}",
                    field, len, self.limits.max_text_length
                ),
            });
        }
    }
}

/// 子行引用解析：_part_id 优先，其次 _part_sku；文档内新配件与库内配件都算命中
fn resolves_to_part(
    part_id_ref: Option<&str>,
    part_sku_ref: Option<&str>,
    snapshot: &StoreSnapshot,
    doc_part_ids: &HashSet<&str>,
    doc_part_skus: &HashSet<&str>,
) -> bool {
    if let Some(token) = part_id_ref {
        return snapshot.parts.contains_key(token) || doc_part_ids.contains(token);
    }
    if let Some(sku) = part_sku_ref {
        return doc_part_skus.contains(sku) || snapshot.part_skus.contains(sku);
    }
    false
}

fn required_field(entity: EntityType, row_number: usize, field: &str) -> ValidationIssue {
    ValidationIssue {
        code: ErrorCode::E3,
        entity,
        row_number: Some(row_number),
        field: Some(field.to_string()),
        message: format!("必填字段为空: {}", field),
    }
}

fn malformed_token(entity: EntityType, row_number: usize, field: &str, token: &str) -> ValidationIssue {
    ValidationIssue {
        code: ErrorCode::E4,
        entity,
        row_number: Some(row_number),
        field: Some(field.to_string()),
        message: format!("标识 token 格式非法: {}", token),
    }
}

fn orphan_reference(
    entity: EntityType,
    row_number: usize,
    part_id_ref: Option<&str>,
    part_sku_ref: Option<&str>,
) -> ValidationIssue {
    let reference = part_id_ref
        .map(|t| format!("_part_id={}", t))
        .or_else(|| part_sku_ref.map(|s| format!("_part_sku={}", s)))
        .unwrap_or_else(|| "（引用为空）".to_string());
    ValidationIssue {
        code: ErrorCode::E5,
        entity,
        row_number: Some(row_number),
        field: Some("_part_sku".to_string()),
        message: format!("所属配件引用无法解析: {}", reference),
    }
}

#[allow(clippy::too_many_arguments)]
fn field_changed(
    code: WarningCode,
    entity: EntityType,
    record_id: &str,
    sku: Option<&str>,
    field: &str,
    old_value: Option<String>,
    new_value: Option<String>,
) -> ValidationWarning {
    let message = format!(
        "{} 变更: {:?} → {:?}",
        field,
        old_value.as_deref().unwrap_or(""),
        new_value.as_deref().unwrap_or("")
    );
    ValidationWarning {
        code,
        entity,
        record_id: record_id.to_string(),
        sku: sku.map(String::from),
        field: field.to_string(),
        old_value,
        new_value,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{Part, VehicleApplication};
    use crate::domain::workbook::{
        RawPartRow, RawVehicleApplicationRow, SheetRows,
    };
    use chrono::Utc;

    fn limits() -> ValidationLimits {
        ValidationLimits {
            max_text_length: 50,
            min_year: 1900,
            max_year: 2028,
        }
    }

    fn part_row(row_number: usize, sku: &str) -> RawPartRow {
        RawPartRow {
            row_number,
            identity: RowIdentity::New,
            sku: Some(sku.to_string()),
            part_type: Some("hub assembly".to_string()),
            position_type: None,
            abs_type: None,
            bolt_pattern: None,
            drive_type: None,
            specification: None,
        }
    }

    fn app_row(row_number: usize, sku_ref: &str, start: i32, end: i32) -> RawVehicleApplicationRow {
        RawVehicleApplicationRow {
            row_number,
            identity: RowIdentity::New,
            part_id_ref: None,
            part_sku_ref: Some(sku_ref.to_string()),
            make: Some("Toyota".to_string()),
            model: Some("Camry".to_string()),
            year_start: Some(start),
            year_end: Some(end),
        }
    }

    fn doc_with(
        parts: Vec<RawPartRow>,
        apps: Vec<RawVehicleApplicationRow>,
    ) -> ParsedWorkbook {
        ParsedWorkbook {
            parts: SheetRows {
                rows: parts,
                has_identity_columns: true,
            },
            vehicle_applications: SheetRows {
                rows: apps,
                has_identity_columns: true,
            },
            cross_references: SheetRows {
                rows: vec![],
                has_identity_columns: true,
            },
        }
    }

    fn stored_part(part_id: &str, sku: &str) -> Part {
        let now = Utc::now();
        Part {
            part_id: part_id.to_string(),
            sku: sku.to_string(),
            part_type: "hub assembly".to_string(),
            position_type: Some("front".to_string()),
            abs_type: None,
            bolt_pattern: None,
            drive_type: None,
            specification: Some("long specification text".to_string()),
            created_at: now,
            updated_at: now,
            updated_by: None,
        }
    }

    const PART_ID: &str = "6f1f7f4e-9d0a-4b6c-8a6e-000000000001";
    const APP_ID: &str = "6f1f7f4e-9d0a-4b6c-8a6e-000000000002";

    #[test]
    fn test_duplicate_sku_single_e2() {
        let doc = doc_with(
            vec![part_row(2, "ACR-200"), part_row(3, "ACR-200")],
            vec![],
        );
        let report = ValidationEngine::new(limits()).validate(&doc, &StoreSnapshot::default());

        assert!(!report.valid);
        assert_eq!(report.count_code(ErrorCode::E2), 1, "同一重复 SKU 只报一条 E2");
    }

    #[test]
    fn test_errors_accumulate() {
        // 年份倒置 + 品牌缺失：两条错误都要出现
        let mut app = app_row(2, "ACR-100", 2024, 2019);
        app.make = None;
        let doc = doc_with(vec![part_row(2, "ACR-100")], vec![app]);

        let report = ValidationEngine::new(limits()).validate(&doc, &StoreSnapshot::default());

        assert_eq!(report.count_code(ErrorCode::E6), 1);
        assert_eq!(report.count_code(ErrorCode::E3), 1);
    }

    #[test]
    fn test_e1_identity_columns_missing() {
        let mut doc = doc_with(vec![part_row(2, "ACR-100")], vec![]);
        doc.parts.has_identity_columns = false;

        let snapshot = StoreSnapshot::from_rows(vec![stored_part(PART_ID, "OLD-1")], vec![], vec![]);
        let report = ValidationEngine::new(limits()).validate(&doc, &snapshot);

        assert_eq!(report.count_code(ErrorCode::E1), 1);

        // 库为空时同样的文档合法（首次导入）
        let report = ValidationEngine::new(limits()).validate(&doc, &StoreSnapshot::default());
        assert!(report.valid);
    }

    #[test]
    fn test_e4_malformed_identity_token() {
        let mut row = part_row(2, "ACR-100");
        row.identity = RowIdentity::Existing("not-a-uuid".to_string());
        let doc = doc_with(vec![row], vec![]);

        let report = ValidationEngine::new(limits()).validate(&doc, &StoreSnapshot::default());
        assert_eq!(report.count_code(ErrorCode::E4), 1);
    }

    #[test]
    fn test_e5_orphan_reference() {
        let doc = doc_with(vec![], vec![app_row(2, "NOPE-999", 2018, 2022)]);
        let report = ValidationEngine::new(limits()).validate(&doc, &StoreSnapshot::default());
        assert_eq!(report.count_code(ErrorCode::E5), 1);
    }

    #[test]
    fn test_e5_resolves_to_document_part() {
        let doc = doc_with(
            vec![part_row(2, "ACR-100")],
            vec![app_row(2, "ACR-100", 2018, 2022)],
        );
        let report = ValidationEngine::new(limits()).validate(&doc, &StoreSnapshot::default());
        assert!(report.valid, "同文档新增配件的 SKU 引用应解析成功: {:?}", report.errors);
    }

    #[test]
    fn test_e7_length_cap() {
        let doc = doc_with(vec![part_row(2, &"X".repeat(51))], vec![]);
        let report = ValidationEngine::new(limits()).validate(&doc, &StoreSnapshot::default());
        assert_eq!(report.count_code(ErrorCode::E7), 1);
    }

    #[test]
    fn test_e8_year_out_of_bounds() {
        let doc = doc_with(
            vec![part_row(2, "ACR-100")],
            vec![app_row(2, "ACR-100", 1899, 2031)],
        );
        let report = ValidationEngine::new(limits()).validate(&doc, &StoreSnapshot::default());
        assert_eq!(report.count_code(ErrorCode::E8), 2);
    }

    #[test]
    fn test_w9_year_range_narrowed() {
        let part = stored_part(PART_ID, "ACR-100");
        let now = Utc::now();
        let app = VehicleApplication {
            application_id: APP_ID.to_string(),
            part_id: PART_ID.to_string(),
            make: "Toyota".to_string(),
            model: "Camry".to_string(),
            year_start: 2015,
            year_end: 2022,
            created_at: now,
            updated_at: now,
            updated_by: None,
        };
        let snapshot = StoreSnapshot::from_rows(vec![part], vec![app], vec![]);

        let mut row = app_row(2, "ACR-100", 2016, 2022);
        row.identity = RowIdentity::Existing(APP_ID.to_string());
        row.part_id_ref = Some(PART_ID.to_string());
        let doc = doc_with(vec![], vec![row]);

        let report = ValidationEngine::new(limits()).validate(&doc, &snapshot);
        assert!(report.valid);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].code, WarningCode::W9);
        assert_eq!(report.warnings[0].old_value.as_deref(), Some("2015-2022"));
        assert_eq!(report.warnings[0].new_value.as_deref(), Some("2016-2022"));
    }

    #[test]
    fn test_w4_specification_shortened() {
        let snapshot = StoreSnapshot::from_rows(vec![stored_part(PART_ID, "ACR-100")], vec![], vec![]);

        let mut row = part_row(2, "ACR-100");
        row.identity = RowIdentity::Existing(PART_ID.to_string());
        row.position_type = Some("front".to_string()); // 与快照一致
        row.specification = Some("short".to_string());
        let doc = doc_with(vec![row], vec![]);

        let report = ValidationEngine::new(limits()).validate(&doc, &snapshot);
        assert!(report.valid);
        assert!(report.warnings.iter().any(|w| w.code == WarningCode::W4));
    }

    #[test]
    fn test_identical_row_no_warnings() {
        let snapshot = StoreSnapshot::from_rows(vec![stored_part(PART_ID, "ACR-100")], vec![], vec![]);

        let mut row = part_row(2, "ACR-100");
        row.identity = RowIdentity::Existing(PART_ID.to_string());
        row.position_type = Some("front".to_string());
        row.specification = Some("long specification text".to_string());
        let doc = doc_with(vec![row], vec![]);

        let report = ValidationEngine::new(limits()).validate(&doc, &snapshot);
        assert!(report.valid);
        assert!(report.warnings.is_empty());
    }
}
