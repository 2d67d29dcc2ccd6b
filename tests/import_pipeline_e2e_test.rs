// ==========================================
// 导入管道集成测试
// ==========================================
// 测试目标: 解析 → 校验 → 差异 → 执行 → 导出 全链路
// ==========================================


use parts_catalog_aps::api::{ApiError, ImportApi};
use parts_catalog_aps::db::open_sqlite_connection;
use parts_catalog_aps::domain::{ErrorCode, ImportMeta};
use parts_catalog_aps::importer::WorkbookParser;
use parts_catalog_aps::logging;
use test_helpers::{
    build_workbook, build_workbook_opts, create_test_db, AppRowSpec, PartRowSpec, XrefRowSpec,
};

fn meta(file_name: &str) -> ImportMeta {
    ImportMeta {
        file_name: file_name.to_string(),
        file_size: 0,
        actor: "tester".to_string(),
    }
}

#[tokio::test]
async fn test_first_import_without_identity_columns() {
    logging::init_test();
    let (_db_file, db_path) = create_test_db().unwrap();
    let api = ImportApi::new(&db_path).unwrap();

    // 首次导入（库为空）: 没有隐藏标识列也合法
    let bytes = build_workbook_opts(
        &[
            PartRowSpec::new("ACR-100", "hub assembly"),
            PartRowSpec::new("ACR-200", "hub assembly"),
        ],
        &[AppRowSpec::new("ACR-100", "Toyota", "Camry", 2018, 2022)],
        &[XrefRowSpec::new("ACR-100", "HA590100")],
        false,
    );

    let outcome = api.import_workbook(&bytes, meta("initial.xlsx")).await.unwrap();
    assert_eq!(outcome.summary.total_adds, 4);
    assert_eq!(outcome.summary.total_updates, 0);
    assert_eq!(outcome.summary.total_deletes, 0);
    assert!(outcome.warnings.is_empty());

    // 子行挂到了正确的配件下
    let exported = api.export_workbook().await.unwrap();
    let doc = WorkbookParser::parse_bytes(&exported).unwrap();
    assert_eq!(doc.parts.rows.len(), 2);
    let acr100_id = doc
        .parts
        .rows
        .iter()
        .find(|r| r.sku.as_deref() == Some("ACR-100"))
        .and_then(|r| r.identity.existing_token())
        .unwrap();
    assert_eq!(
        doc.vehicle_applications.rows[0].part_id_ref.as_deref(),
        Some(acr100_id)
    );
}

#[tokio::test]
async fn test_round_trip_yields_empty_diff() {
    logging::init_test();
    let (_db_file, db_path) = create_test_db().unwrap();
    let api = ImportApi::new(&db_path).unwrap();

    let bytes = build_workbook(
        &[PartRowSpec {
            specification: Some("轮毂单元 前轴 规格A".to_string()),
            ..PartRowSpec::new("ACR-100", "hub assembly")
        }],
        &[AppRowSpec::new("ACR-100", "Toyota", "Camry", 2018, 2022)],
        &[XrefRowSpec {
            competitor_brand: Some("Timken".to_string()),
            ..XrefRowSpec::new("ACR-100", "HA590100")
        }],
    );
    api.import_workbook(&bytes, meta("initial.xlsx")).await.unwrap();

    // 导出再预览: 空差异、零警告
    let exported = api.export_workbook().await.unwrap();
    let preview = api.preview_import(&exported).await.unwrap();
    assert!(preview.valid);
    assert!(preview.warnings.is_empty());
    let summary = preview.summary.unwrap();
    assert_eq!(summary.total_adds, 0);
    assert_eq!(summary.total_updates, 0);
    assert_eq!(summary.total_deletes, 0);
}

#[tokio::test]
async fn test_duplicate_sku_blocks_with_single_e2() {
    logging::init_test();
    let (_db_file, db_path) = create_test_db().unwrap();
    let api = ImportApi::new(&db_path).unwrap();

    let bytes = build_workbook(
        &[
            PartRowSpec::new("ACR-100", "hub assembly"),
            PartRowSpec::new("ACR-100", "hub assembly"),
        ],
        &[],
        &[],
    );

    let preview = api.preview_import(&bytes).await.unwrap();
    assert!(!preview.valid);
    assert_eq!(
        preview.errors.iter().filter(|e| e.code == ErrorCode::E2).count(),
        1,
        "同一重复 SKU 只报一条 E2"
    );
    assert!(preview.summary.is_none(), "校验未通过时不计算差异");

    // 导入同样被拒绝
    let result = api.import_workbook(&bytes, meta("dup.xlsx")).await;
    assert!(matches!(result, Err(ApiError::ValidationBlocked { .. })));
}

#[tokio::test]
async fn test_omission_means_deletion() {
    logging::init_test();
    let (_db_file, db_path) = create_test_db().unwrap();
    let api = ImportApi::new(&db_path).unwrap();

    let bytes = build_workbook(
        &[
            PartRowSpec::new("ACR-100", "hub assembly"),
            PartRowSpec::new("ACR-200", "hub assembly"),
        ],
        &[],
        &[],
    );
    api.import_workbook(&bytes, meta("initial.xlsx")).await.unwrap();

    // 导出后删掉 ACR-200 行再导回: 全量替换语义 ⇒ 删除
    let exported = api.export_workbook().await.unwrap();
    let doc = WorkbookParser::parse_bytes(&exported).unwrap();
    let keep = doc
        .parts
        .rows
        .iter()
        .find(|r| r.sku.as_deref() == Some("ACR-100"))
        .unwrap();
    let second = build_workbook(
        &[PartRowSpec {
            id: keep.identity.existing_token().map(String::from),
            ..PartRowSpec::new("ACR-100", "hub assembly")
        }],
        &[],
        &[],
    );

    let outcome = api.import_workbook(&second, meta("trimmed.xlsx")).await.unwrap();
    assert_eq!(outcome.summary.total_deletes, 1);
    assert_eq!(outcome.summary.total_adds, 0);
    assert_eq!(outcome.summary.total_updates, 0);

    let after = WorkbookParser::parse_bytes(&api.export_workbook().await.unwrap()).unwrap();
    assert_eq!(after.parts.rows.len(), 1);
    assert_eq!(after.parts.rows[0].sku.as_deref(), Some("ACR-100"));
}

#[tokio::test]
async fn test_e1_blocks_when_store_has_records() {
    logging::init_test();
    let (_db_file, db_path) = create_test_db().unwrap();
    let api = ImportApi::new(&db_path).unwrap();

    let bytes = build_workbook(&[PartRowSpec::new("ACR-100", "hub assembly")], &[], &[]);
    api.import_workbook(&bytes, meta("initial.xlsx")).await.unwrap();

    // 库已非空: 缺失标识列的 Parts sheet 阻断
    let no_identity =
        build_workbook_opts(&[PartRowSpec::new("ACR-100", "hub assembly")], &[], &[], false);
    let preview = api.preview_import(&no_identity).await.unwrap();
    assert!(!preview.valid);
    assert!(preview.errors.iter().any(|e| e.code == ErrorCode::E1));
}

#[tokio::test]
async fn test_update_emits_change_warnings() {
    logging::init_test();
    let (_db_file, db_path) = create_test_db().unwrap();
    let api = ImportApi::new(&db_path).unwrap();

    let bytes = build_workbook(
        &[PartRowSpec::new("ACR-100", "hub assembly")],
        &[AppRowSpec::new("ACR-100", "Toyota", "Camry", 2015, 2022)],
        &[],
    );
    api.import_workbook(&bytes, meta("initial.xlsx")).await.unwrap();

    // 导出、收窄年份区间、改回导入: W9 警告但不阻断
    let doc = WorkbookParser::parse_bytes(&api.export_workbook().await.unwrap()).unwrap();
    let part = &doc.parts.rows[0];
    let app = &doc.vehicle_applications.rows[0];
    let second = build_workbook(
        &[PartRowSpec {
            id: part.identity.existing_token().map(String::from),
            ..PartRowSpec::new("ACR-100", "hub assembly")
        }],
        &[AppRowSpec {
            id: app.identity.existing_token().map(String::from),
            part_id: app.part_id_ref.clone(),
            ..AppRowSpec::new("ACR-100", "Toyota", "Camry", 2016, 2022)
        }],
        &[],
    );

    let outcome = api.import_workbook(&second, meta("narrowed.xlsx")).await.unwrap();
    assert_eq!(outcome.summary.total_updates, 1);
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].old_value.as_deref(), Some("2015-2022"));
    assert_eq!(outcome.warnings[0].new_value.as_deref(), Some("2016-2022"));
}

#[tokio::test]
async fn test_reimport_after_family_deleted_rebuilds_with_fresh_identity() {
    logging::init_test();
    let (_db_file, db_path) = create_test_db().unwrap();
    let api = ImportApi::new(&db_path).unwrap();

    let bytes = build_workbook(
        &[PartRowSpec::new("ACR-100", "hub assembly")],
        &[AppRowSpec::new("ACR-100", "Toyota", "Camry", 2018, 2022)],
        &[XrefRowSpec::new("ACR-100", "HA590100")],
    );
    api.import_workbook(&bytes, meta("initial.xlsx")).await.unwrap();
    let exported = api.export_workbook().await.unwrap();
    let old_doc = WorkbookParser::parse_bytes(&exported).unwrap();
    let old_part_id = old_doc.parts.rows[0]
        .identity
        .existing_token()
        .map(String::from)
        .unwrap();

    // 导出后配件被删（级联带走子行）: 导出文档里的标识全部失效
    {
        let conn = open_sqlite_connection(&db_path).unwrap();
        conn.execute("DELETE FROM part WHERE sku = 'ACR-100'", []).unwrap();
    }

    // 同一份导出文档导回: 不阻断，整个家族按新增重建
    let preview = api.preview_import(&exported).await.unwrap();
    assert!(preview.valid);
    assert_eq!(preview.summary.as_ref().unwrap().total_adds, 3);

    let outcome = api.import_workbook(&exported, meta("reimport.xlsx")).await.unwrap();
    assert_eq!(outcome.summary.total_adds, 3);

    // 子行跟着重建的配件走新标识，不再指向失效的旧标识
    let after = WorkbookParser::parse_bytes(&api.export_workbook().await.unwrap()).unwrap();
    let new_part_id = after.parts.rows[0].identity.existing_token().unwrap();
    assert_ne!(new_part_id, old_part_id);
    assert_eq!(
        after.vehicle_applications.rows[0].part_id_ref.as_deref(),
        Some(new_part_id)
    );
    assert_eq!(
        after.cross_references.rows[0].part_id_ref.as_deref(),
        Some(new_part_id)
    );
}

#[tokio::test]
async fn test_malformed_workbook_rejected() {
    logging::init_test();
    let (_db_file, db_path) = create_test_db().unwrap();
    let api = ImportApi::new(&db_path).unwrap();

    let result = api.preview_import(b"definitely not a workbook").await;
    assert!(matches!(result, Err(ApiError::ParseError(_))));
}
