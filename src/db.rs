// ==========================================
// 配件目录管理系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，避免“部分模块外键开启/部分不开启”
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 提供幂等建表入口，供二进制与测试共用
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启（级联删除依赖它）
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化目录数据库 schema（幂等）
///
/// 表结构：
/// - part / vehicle_application / cross_reference: 三张实体表（两级所有权）
/// - import_record: 导入审计记录（含全量快照 JSON，回滚唯一依据）
/// - config_kv: 全局配置键值表
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS part (
            part_id        TEXT PRIMARY KEY,
            sku            TEXT NOT NULL UNIQUE,
            part_type      TEXT NOT NULL,
            position_type  TEXT,
            abs_type       TEXT,
            bolt_pattern   TEXT,
            drive_type     TEXT,
            specification  TEXT,
            created_at     TEXT NOT NULL,
            updated_at     TEXT NOT NULL,
            updated_by     TEXT
        );

        CREATE TABLE IF NOT EXISTS vehicle_application (
            application_id TEXT PRIMARY KEY,
            part_id        TEXT NOT NULL REFERENCES part(part_id) ON DELETE CASCADE,
            make           TEXT NOT NULL,
            model          TEXT NOT NULL,
            year_start     INTEGER NOT NULL,
            year_end       INTEGER NOT NULL,
            created_at     TEXT NOT NULL,
            updated_at     TEXT NOT NULL,
            updated_by     TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_vehicle_application_part
            ON vehicle_application(part_id);

        CREATE TABLE IF NOT EXISTS cross_reference (
            cross_reference_id TEXT PRIMARY KEY,
            part_id            TEXT NOT NULL REFERENCES part(part_id) ON DELETE CASCADE,
            competitor_brand   TEXT,
            competitor_sku     TEXT NOT NULL,
            created_at         TEXT NOT NULL,
            updated_at         TEXT NOT NULL,
            updated_by         TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_cross_reference_part
            ON cross_reference(part_id);

        CREATE TABLE IF NOT EXISTS import_record (
            import_id         TEXT PRIMARY KEY,
            file_name         TEXT NOT NULL,
            file_size         INTEGER NOT NULL,
            imported_at       TEXT NOT NULL,
            imported_by       TEXT NOT NULL,
            total_rows        INTEGER NOT NULL,
            add_count         INTEGER NOT NULL DEFAULT 0,
            update_count      INTEGER NOT NULL DEFAULT 0,
            delete_count      INTEGER NOT NULL DEFAULT 0,
            snapshot_json     TEXT NOT NULL,
            affected_ids_json TEXT NOT NULL DEFAULT '{}',
            created_at        TEXT NOT NULL,
            rolled_back_at    TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_import_record_imported_at
            ON import_record(imported_at);

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id   TEXT NOT NULL DEFAULT 'global',
            key        TEXT NOT NULL,
            value      TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );
        "#,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        // 重复执行不应报错
        init_schema(&conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM part", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_foreign_key_cascade() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();

        conn.execute(
            "INSERT INTO part (part_id, sku, part_type, created_at, updated_at)
             VALUES ('p1', 'SKU-1', 'hub', '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO vehicle_application
             (application_id, part_id, make, model, year_start, year_end, created_at, updated_at)
             VALUES ('a1', 'p1', 'Toyota', 'Camry', 2018, 2022,
                     '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')",
            [],
        )
        .unwrap();

        conn.execute("DELETE FROM part WHERE part_id = 'p1'", []).unwrap();

        let remaining: i64 = conn
            .query_row("SELECT COUNT(*) FROM vehicle_application", [], |row| row.get(0))
            .unwrap();
        assert_eq!(remaining, 0, "删除配件应级联删除车型适配");
    }
}
