// ==========================================
// 配件目录管理系统 - 目录导入 Repository 实现
// ==========================================
// 存储: rusqlite（单连接 + Mutex），时间戳以 RFC3339 文本落库
// 事务: apply_import / restore_snapshot 各自一个事务，
//       任一步失败整体回滚
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::catalog::{CrossReference, Part, VehicleApplication};
use crate::domain::diff::{CatalogDiff, PartRef};
use crate::domain::import_record::{
    AffectedIds, CatalogSnapshot, ImportRecord, PendingImport, RestoredCounts,
};
use crate::domain::snapshot::StoreSnapshot;
use crate::repository::catalog_import_repo::CatalogImportRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, Row};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::info;
use uuid::Uuid;

// ==========================================
// CatalogImportRepositoryImpl
// ==========================================
pub struct CatalogImportRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl CatalogImportRepositoryImpl {
    /// 创建新的 Repository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self::from_connection(conn))
    }

    /// 复用已打开的连接（测试与内存库场景）
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    // ===== 行映射 =====

    fn map_part(row: &Row) -> rusqlite::Result<Part> {
        Ok(Part {
            part_id: row.get(0)?,
            sku: row.get(1)?,
            part_type: row.get(2)?,
            position_type: row.get(3)?,
            abs_type: row.get(4)?,
            bolt_pattern: row.get(5)?,
            drive_type: row.get(6)?,
            specification: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
            updated_by: row.get(10)?,
        })
    }

    fn map_vehicle_application(row: &Row) -> rusqlite::Result<VehicleApplication> {
        Ok(VehicleApplication {
            application_id: row.get(0)?,
            part_id: row.get(1)?,
            make: row.get(2)?,
            model: row.get(3)?,
            year_start: row.get(4)?,
            year_end: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
            updated_by: row.get(8)?,
        })
    }

    fn map_cross_reference(row: &Row) -> rusqlite::Result<CrossReference> {
        Ok(CrossReference {
            cross_reference_id: row.get(0)?,
            part_id: row.get(1)?,
            competitor_brand: row.get(2)?,
            competitor_sku: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
            updated_by: row.get(6)?,
        })
    }

    fn map_import_record(row: &Row) -> rusqlite::Result<ImportRecord> {
        Ok(ImportRecord {
            import_id: row.get(0)?,
            file_name: row.get(1)?,
            file_size: row.get(2)?,
            imported_at: row.get(3)?,
            imported_by: row.get(4)?,
            total_rows: row.get(5)?,
            add_count: row.get(6)?,
            update_count: row.get(7)?,
            delete_count: row.get(8)?,
            snapshot_json: row.get(9)?,
            affected_ids_json: row.get(10)?,
            created_at: row.get(11)?,
            rolled_back_at: row.get(12)?,
        })
    }

    // ===== 全量查询（Transaction Deref 到 Connection，事务内外通用）=====

    const PART_COLS: &'static str = "part_id, sku, part_type, position_type, abs_type, \
         bolt_pattern, drive_type, specification, created_at, updated_at, updated_by";
    const APP_COLS: &'static str = "application_id, part_id, make, model, year_start, \
         year_end, created_at, updated_at, updated_by";
    const XREF_COLS: &'static str = "cross_reference_id, part_id, competitor_brand, \
         competitor_sku, created_at, updated_at, updated_by";
    const IMPORT_COLS: &'static str = "import_id, file_name, file_size, imported_at, \
         imported_by, total_rows, add_count, update_count, delete_count, \
         snapshot_json, affected_ids_json, created_at, rolled_back_at";

    fn query_all_parts(conn: &Connection) -> RepositoryResult<Vec<Part>> {
        let sql = format!("SELECT {} FROM part ORDER BY part_id", Self::PART_COLS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], Self::map_part)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn query_all_vehicle_applications(
        conn: &Connection,
    ) -> RepositoryResult<Vec<VehicleApplication>> {
        let sql = format!(
            "SELECT {} FROM vehicle_application ORDER BY application_id",
            Self::APP_COLS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], Self::map_vehicle_application)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn query_all_cross_references(conn: &Connection) -> RepositoryResult<Vec<CrossReference>> {
        let sql = format!(
            "SELECT {} FROM cross_reference ORDER BY cross_reference_id",
            Self::XREF_COLS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], Self::map_cross_reference)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    // ===== 事务内写入 =====

    fn insert_part_tx(conn: &Connection, part: &Part) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO part (
                part_id, sku, part_type, position_type, abs_type,
                bolt_pattern, drive_type, specification,
                created_at, updated_at, updated_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                part.part_id,
                part.sku,
                part.part_type,
                part.position_type,
                part.abs_type,
                part.bolt_pattern,
                part.drive_type,
                part.specification,
                part.created_at,
                part.updated_at,
                part.updated_by,
            ],
        )?;
        Ok(())
    }

    fn update_part_tx(conn: &Connection, part: &Part) -> RepositoryResult<()> {
        conn.execute(
            r#"
            UPDATE part SET
                sku = ?2, part_type = ?3, position_type = ?4, abs_type = ?5,
                bolt_pattern = ?6, drive_type = ?7, specification = ?8,
                updated_at = ?9, updated_by = ?10
            WHERE part_id = ?1
            "#,
            params![
                part.part_id,
                part.sku,
                part.part_type,
                part.position_type,
                part.abs_type,
                part.bolt_pattern,
                part.drive_type,
                part.specification,
                part.updated_at,
                part.updated_by,
            ],
        )?;
        Ok(())
    }

    fn insert_vehicle_application_tx(
        conn: &Connection,
        app: &VehicleApplication,
    ) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO vehicle_application (
                application_id, part_id, make, model, year_start, year_end,
                created_at, updated_at, updated_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                app.application_id,
                app.part_id,
                app.make,
                app.model,
                app.year_start,
                app.year_end,
                app.created_at,
                app.updated_at,
                app.updated_by,
            ],
        )?;
        Ok(())
    }

    fn update_vehicle_application_tx(
        conn: &Connection,
        app: &VehicleApplication,
    ) -> RepositoryResult<()> {
        conn.execute(
            r#"
            UPDATE vehicle_application SET
                part_id = ?2, make = ?3, model = ?4,
                year_start = ?5, year_end = ?6,
                updated_at = ?7, updated_by = ?8
            WHERE application_id = ?1
            "#,
            params![
                app.application_id,
                app.part_id,
                app.make,
                app.model,
                app.year_start,
                app.year_end,
                app.updated_at,
                app.updated_by,
            ],
        )?;
        Ok(())
    }

    fn insert_cross_reference_tx(
        conn: &Connection,
        xref: &CrossReference,
    ) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO cross_reference (
                cross_reference_id, part_id, competitor_brand, competitor_sku,
                created_at, updated_at, updated_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                xref.cross_reference_id,
                xref.part_id,
                xref.competitor_brand,
                xref.competitor_sku,
                xref.created_at,
                xref.updated_at,
                xref.updated_by,
            ],
        )?;
        Ok(())
    }

    fn update_cross_reference_tx(
        conn: &Connection,
        xref: &CrossReference,
    ) -> RepositoryResult<()> {
        conn.execute(
            r#"
            UPDATE cross_reference SET
                part_id = ?2, competitor_brand = ?3, competitor_sku = ?4,
                updated_at = ?5, updated_by = ?6
            WHERE cross_reference_id = ?1
            "#,
            params![
                xref.cross_reference_id,
                xref.part_id,
                xref.competitor_brand,
                xref.competitor_sku,
                xref.updated_at,
                xref.updated_by,
            ],
        )?;
        Ok(())
    }

    fn insert_import_record_tx(conn: &Connection, record: &ImportRecord) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO import_record (
                import_id, file_name, file_size, imported_at, imported_by,
                total_rows, add_count, update_count, delete_count,
                snapshot_json, affected_ids_json, created_at, rolled_back_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
            params![
                record.import_id,
                record.file_name,
                record.file_size,
                record.imported_at,
                record.imported_by,
                record.total_rows,
                record.add_count,
                record.update_count,
                record.delete_count,
                record.snapshot_json,
                record.affected_ids_json,
                record.created_at,
                record.rolled_back_at,
            ],
        )?;
        Ok(())
    }

    /// 新增子行的所属配件标识解析（本次分配的标识按 SKU 回填）
    fn resolve_part_id(
        part_ref: &PartRef,
        sku_to_new_id: &HashMap<String, String>,
    ) -> RepositoryResult<String> {
        match part_ref {
            PartRef::Existing(part_id) => Ok(part_id.clone()),
            PartRef::NewBySku(sku) => sku_to_new_id
                .get(sku)
                .cloned()
                .ok_or_else(|| RepositoryError::UnresolvedPartRef(sku.clone())),
        }
    }
}

#[async_trait]
impl CatalogImportRepository for CatalogImportRepositoryImpl {
    async fn load_snapshot(&self) -> RepositoryResult<StoreSnapshot> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        // 单事务读，三张表取自同一视图
        let tx = conn.unchecked_transaction()?;
        let parts = Self::query_all_parts(&tx)?;
        let apps = Self::query_all_vehicle_applications(&tx)?;
        let xrefs = Self::query_all_cross_references(&tx)?;
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(StoreSnapshot::from_rows(parts, apps, xrefs))
    }

    async fn find_import(&self, import_id: &str) -> RepositoryResult<Option<ImportRecord>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let sql = format!(
            "SELECT {} FROM import_record WHERE import_id = ?1",
            Self::IMPORT_COLS
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query_map(params![import_id], Self::map_import_record)?;
        match rows.next() {
            Some(record) => Ok(Some(record?)),
            None => Ok(None),
        }
    }

    async fn find_latest_import(&self) -> RepositoryResult<Option<ImportRecord>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        // 已回滚的记录不再是“最新”候选，顺序回滚才能向更早的导入推进
        let sql = format!(
            "SELECT {} FROM import_record WHERE rolled_back_at IS NULL \
             ORDER BY imported_at DESC, created_at DESC LIMIT 1",
            Self::IMPORT_COLS
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query_map([], Self::map_import_record)?;
        match rows.next() {
            Some(record) => Ok(Some(record?)),
            None => Ok(None),
        }
    }

    async fn list_recent_imports(&self, limit: usize) -> RepositoryResult<Vec<ImportRecord>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let sql = format!(
            "SELECT {} FROM import_record ORDER BY imported_at DESC, created_at DESC LIMIT ?1",
            Self::IMPORT_COLS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![limit as i64], Self::map_import_record)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    async fn apply_import(
        &self,
        pending: PendingImport,
        diff: &CatalogDiff,
    ) -> RepositoryResult<ImportRecord> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let tx = conn.unchecked_transaction()?;

        // 1. 执行前全量快照（不是差异触及的行——回滚的唯一依据）
        let snapshot = CatalogSnapshot {
            parts: Self::query_all_parts(&tx)?,
            vehicle_applications: Self::query_all_vehicle_applications(&tx)?,
            cross_references: Self::query_all_cross_references(&tx)?,
        };

        let stamp_at = pending.imported_at;
        let actor = Some(pending.meta.actor.clone());
        let mut affected = AffectedIds::default();

        // 2. deletes: 子先父后
        for xref in &diff.cross_references.deletes {
            tx.execute(
                "DELETE FROM cross_reference WHERE cross_reference_id = ?1",
                params![xref.cross_reference_id],
            )?;
            affected.cross_references.push(xref.cross_reference_id.clone());
        }
        for app in &diff.vehicle_applications.deletes {
            tx.execute(
                "DELETE FROM vehicle_application WHERE application_id = ?1",
                params![app.application_id],
            )?;
            affected.vehicle_applications.push(app.application_id.clone());
        }
        for part in &diff.parts.deletes {
            tx.execute("DELETE FROM part WHERE part_id = ?1", params![part.part_id])?;
            affected.parts.push(part.part_id.clone());
        }

        // 3. updates: 盖章 updated_at = imported_at
        for part in &diff.parts.updates {
            let mut merged = part.clone();
            merged.updated_at = stamp_at;
            merged.updated_by = actor.clone();
            Self::update_part_tx(&tx, &merged)?;
            affected.parts.push(merged.part_id);
        }
        for app in &diff.vehicle_applications.updates {
            let mut merged = app.clone();
            merged.updated_at = stamp_at;
            merged.updated_by = actor.clone();
            Self::update_vehicle_application_tx(&tx, &merged)?;
            affected.vehicle_applications.push(merged.application_id);
        }
        for xref in &diff.cross_references.updates {
            let mut merged = xref.clone();
            merged.updated_at = stamp_at;
            merged.updated_by = actor.clone();
            Self::update_cross_reference_tx(&tx, &merged)?;
            affected.cross_references.push(merged.cross_reference_id);
        }

        // 4. adds: 父先子后，SKU → 本次分配标识 的回填表
        let mut sku_to_new_id: HashMap<String, String> = HashMap::new();
        for new_part in &diff.parts.adds {
            let part = Part {
                part_id: Uuid::new_v4().to_string(),
                sku: new_part.sku.clone(),
                part_type: new_part.part_type.clone(),
                position_type: new_part.position_type.clone(),
                abs_type: new_part.abs_type.clone(),
                bolt_pattern: new_part.bolt_pattern.clone(),
                drive_type: new_part.drive_type.clone(),
                specification: new_part.specification.clone(),
                created_at: stamp_at,
                updated_at: stamp_at,
                updated_by: actor.clone(),
            };
            Self::insert_part_tx(&tx, &part)?;
            sku_to_new_id.insert(part.sku.clone(), part.part_id.clone());
            affected.parts.push(part.part_id);
        }
        for new_app in &diff.vehicle_applications.adds {
            let app = VehicleApplication {
                application_id: Uuid::new_v4().to_string(),
                part_id: Self::resolve_part_id(&new_app.part_ref, &sku_to_new_id)?,
                make: new_app.make.clone(),
                model: new_app.model.clone(),
                year_start: new_app.year_start,
                year_end: new_app.year_end,
                created_at: stamp_at,
                updated_at: stamp_at,
                updated_by: actor.clone(),
            };
            Self::insert_vehicle_application_tx(&tx, &app)?;
            affected.vehicle_applications.push(app.application_id);
        }
        for new_xref in &diff.cross_references.adds {
            let xref = CrossReference {
                cross_reference_id: Uuid::new_v4().to_string(),
                part_id: Self::resolve_part_id(&new_xref.part_ref, &sku_to_new_id)?,
                competitor_brand: new_xref.competitor_brand.clone(),
                competitor_sku: new_xref.competitor_sku.clone(),
                created_at: stamp_at,
                updated_at: stamp_at,
                updated_by: actor.clone(),
            };
            Self::insert_cross_reference_tx(&tx, &xref)?;
            affected.cross_references.push(xref.cross_reference_id);
        }

        // 5. 导入记录与变更同事务落库
        let summary = diff.summary();
        let record = ImportRecord {
            import_id: pending.import_id,
            file_name: pending.meta.file_name,
            file_size: pending.meta.file_size,
            imported_at: stamp_at,
            imported_by: pending.meta.actor,
            total_rows: pending.total_rows,
            add_count: summary.total_adds as i32,
            update_count: summary.total_updates as i32,
            delete_count: summary.total_deletes as i32,
            snapshot_json: serde_json::to_string(&snapshot)?,
            affected_ids_json: serde_json::to_string(&affected)?,
            created_at: Utc::now(),
            rolled_back_at: None,
        };
        Self::insert_import_record_tx(&tx, &record)?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        info!(
            import_id = %record.import_id,
            adds = record.add_count,
            updates = record.update_count,
            deletes = record.delete_count,
            "导入事务提交"
        );
        Ok(record)
    }

    async fn restore_snapshot(
        &self,
        import_id: &str,
        snapshot: &CatalogSnapshot,
    ) -> RepositoryResult<RestoredCounts> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let tx = conn.unchecked_transaction()?;

        // 清空（子先父后）再按快照原值重建（父先子后），审计字段不盖新章
        tx.execute("DELETE FROM cross_reference", [])?;
        tx.execute("DELETE FROM vehicle_application", [])?;
        tx.execute("DELETE FROM part", [])?;

        for part in &snapshot.parts {
            Self::insert_part_tx(&tx, part)?;
        }
        for app in &snapshot.vehicle_applications {
            Self::insert_vehicle_application_tx(&tx, app)?;
        }
        for xref in &snapshot.cross_references {
            Self::insert_cross_reference_tx(&tx, xref)?;
        }

        // 同事务内给导入记录盖回滚章；记录保留，不再参与“最新”判定
        tx.execute(
            "UPDATE import_record SET rolled_back_at = ?2 WHERE import_id = ?1",
            params![import_id, Utc::now()],
        )?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(RestoredCounts {
            parts: snapshot.parts.len(),
            vehicle_applications: snapshot.vehicle_applications.len(),
            cross_references: snapshot.cross_references.len(),
        })
    }
}
