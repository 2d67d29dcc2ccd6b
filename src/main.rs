// 配件目录管理系统 - 命令行入口
//
// Usage:
//   parts-catalog-aps preview  <db_path> <xlsx_path>
//   parts-catalog-aps import   <db_path> <xlsx_path> [actor]
//   parts-catalog-aps export   <db_path> <xlsx_path>
//   parts-catalog-aps history  <db_path> [limit]
//   parts-catalog-aps rollback <db_path> <import_id> [actor]

use parts_catalog_aps::api::{ApiError, ImportApi};
use parts_catalog_aps::domain::ImportMeta;
use parts_catalog_aps::logging;
use std::path::Path;

const USAGE: &str = "\
用法:
  parts-catalog-aps preview  <db_path> <xlsx_path>
  parts-catalog-aps import   <db_path> <xlsx_path> [actor]
  parts-catalog-aps export   <db_path> <xlsx_path>
  parts-catalog-aps history  <db_path> [limit]
  parts-catalog-aps rollback <db_path> <import_id> [actor]";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_default();
    let db_path = match args.next() {
        Some(path) => path,
        None => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    };

    let api = ImportApi::new(&db_path)?;

    match command.as_str() {
        "preview" => {
            let xlsx_path = args.next().ok_or(USAGE)?;
            let bytes = std::fs::read(&xlsx_path)?;
            let preview = api.preview_import(&bytes).await?;

            println!(
                "valid={} total_rows={}",
                preview.valid, preview.total_rows
            );
            for error in &preview.errors {
                println!(
                    "  [{}] {} 行{}: {}",
                    error.code,
                    error.entity,
                    error
                        .row_number
                        .map_or("-".to_string(), |n| n.to_string()),
                    error.message
                );
            }
            for warning in &preview.warnings {
                println!("  [{}] {}: {}", warning.code, warning.entity, warning.message);
            }
            if let Some(summary) = preview.summary {
                println!(
                    "adds={} updates={} deletes={}",
                    summary.total_adds, summary.total_updates, summary.total_deletes
                );
            }
        }
        "import" => {
            let xlsx_path = args.next().ok_or(USAGE)?;
            let actor = args.next().unwrap_or_else(|| "cli".to_string());
            let bytes = std::fs::read(&xlsx_path)?;
            let file_name = Path::new(&xlsx_path)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| xlsx_path.clone());
            let meta = ImportMeta {
                file_name,
                file_size: bytes.len() as i64,
                actor,
            };

            match api.import_workbook(&bytes, meta).await {
                Ok(outcome) => {
                    println!(
                        "import_id={} adds={} updates={} deletes={} warnings={}",
                        outcome.import_id,
                        outcome.summary.total_adds,
                        outcome.summary.total_updates,
                        outcome.summary.total_deletes,
                        outcome.warnings.len()
                    );
                }
                Err(ApiError::ValidationBlocked { errors }) => {
                    eprintln!("校验未通过，拒绝导入:");
                    for error in &errors {
                        eprintln!("  [{}] {}", error.code, error.message);
                    }
                    std::process::exit(1);
                }
                Err(e) => return Err(e.into()),
            }
        }
        "export" => {
            let xlsx_path = args.next().ok_or(USAGE)?;
            let bytes = api.export_workbook().await?;
            std::fs::write(&xlsx_path, &bytes)?;
            println!("exported={} bytes={}", xlsx_path, bytes.len());
        }
        "history" => {
            let limit = args
                .next()
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(20);
            for entry in api.list_import_history(limit).await? {
                let marker = if entry.rolled_back_at.is_some() {
                    " [已回滚]"
                } else {
                    ""
                };
                println!(
                    "{} {} {} by {} (+{} ~{} -{}){}",
                    entry.import_id,
                    entry.imported_at.to_rfc3339(),
                    entry.file_name,
                    entry.imported_by,
                    entry.add_count,
                    entry.update_count,
                    entry.delete_count,
                    marker
                );
            }
        }
        "rollback" => {
            let import_id = args.next().ok_or(USAGE)?;
            let actor = args.next().unwrap_or_else(|| "cli".to_string());
            match api.rollback_to_import(&import_id, &actor).await {
                Ok(outcome) => {
                    println!(
                        "rolled_back={} parts={} vehicle_applications={} cross_references={}",
                        outcome.import_id,
                        outcome.restored.parts,
                        outcome.restored.vehicle_applications,
                        outcome.restored.cross_references
                    );
                }
                Err(ApiError::SequentialRollback {
                    requested_id,
                    latest_id,
                }) => {
                    eprintln!(
                        "只能回滚最新导入: requested={} latest={}（请先回滚更新的导入）",
                        requested_id, latest_id
                    );
                    std::process::exit(1);
                }
                Err(ApiError::RollbackConflict { conflicts }) => {
                    eprintln!("回滚冲突，库保持原样:");
                    for conflict in &conflicts {
                        eprintln!(
                            "  {} {} 被 {} 于 {} 修改: {:?}",
                            conflict.entity,
                            conflict.record_id,
                            conflict.modified_by.as_deref().unwrap_or("?"),
                            conflict
                                .modified_at
                                .map_or("?".to_string(), |t| t.to_rfc3339()),
                            conflict.changed_fields
                        );
                    }
                    std::process::exit(1);
                }
                Err(e) => return Err(e.into()),
            }
        }
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }

    Ok(())
}
