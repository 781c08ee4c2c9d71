//! Schema 初始化子模块
//!
//! ## 职责
//! - 创建键值表 `kv_store`
//! - 设置 SQLite 运行参数（WAL）
//! - 通过 `user_version` 记录表结构版本
//!
//! ## 错误语义
//! - DDL 失败统一映射为 `StoreError::Database`

use rusqlite::Connection;

use crate::storage::StoreError;

const SCHEMA_VERSION: i64 = 1;

fn get_user_version(conn: &Connection) -> Result<i64, StoreError> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| StoreError::Database(format!("读取数据库版本失败: {}", e)))
}

fn set_user_version(conn: &Connection, version: i64) -> Result<(), StoreError> {
    conn.execute_batch(&format!("PRAGMA user_version = {version};"))
        .map_err(|e| StoreError::Database(format!("写入数据库版本失败: {}", e)))
}

fn create_kv_table(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL
        );",
    )
    .map_err(|e| StoreError::Database(format!("创建键值表失败: {}", e)))
}

pub(super) fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch("PRAGMA journal_mode=WAL;").ok();

    create_kv_table(conn)?;

    let mut version = get_user_version(conn)?;
    if version < 1 {
        set_user_version(conn, 1)?;
        version = 1;
    }

    if version != SCHEMA_VERSION {
        return Err(StoreError::Database(format!(
            "数据库版本不匹配: current={}, expected={}",
            version, SCHEMA_VERSION
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::initialize_schema;

    #[test]
    fn initialize_schema_is_idempotent() {
        let conn = Connection::open_in_memory().expect("create memory db");

        initialize_schema(&conn).expect("first init should succeed");
        initialize_schema(&conn).expect("second init should succeed");

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='kv_store'",
                [],
                |row| row.get(0),
            )
            .expect("query table count");

        assert_eq!(count, 1, "kv_store table should exist exactly once");
    }

    #[test]
    fn initialize_schema_rejects_newer_version() {
        let conn = Connection::open_in_memory().expect("create memory db");
        conn.execute_batch("PRAGMA user_version = 7;").expect("set version");

        assert!(initialize_schema(&conn).is_err());
    }
}
