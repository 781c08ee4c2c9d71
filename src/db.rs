//! 数据库模块
//!
//! # 设计思路
//!
//! 以 SQLite 作为页面 logo 的持久化后端，对外表现为简单的键值存储
//! （语义对齐浏览器本地存储：字符串键、字符串值、整体容量受限）。
//! 使用 `rusqlite` 直接操作，多条记录的写入放在同一事务中，保证原子性。

use std::fs;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use crate::storage::{LogoStore, StoreError};

mod schema;

/// SQLite 键值存储
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// 打开（必要时创建）数据库文件并初始化表结构。
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| StoreError::Database(format!("创建数据库目录失败: {}", e)))?;
            }
        }
        log::info!("数据库路径: {}", path.display());

        let conn = Connection::open(path)
            .map_err(|e| StoreError::Database(format!("打开数据库失败: {}", e)))?;
        schema::initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// 内存数据库，主要用于测试。
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::Database(format!("打开内存数据库失败: {}", e)))?;
        schema::initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl LogoStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(|e| StoreError::Database(format!("读取记录 {} 失败: {}", key, e)))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map_err(|e| StoreError::Database(format!("写入记录 {} 失败: {}", key, e)))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM kv_store WHERE key = ?1", params![key])
            .map_err(|e| StoreError::Database(format!("删除记录 {} 失败: {}", key, e)))?;
        Ok(())
    }

    fn entries(&self) -> Result<Vec<(String, String)>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, value FROM kv_store ORDER BY key")
            .map_err(|e| StoreError::Database(format!("查询记录失败: {}", e)))?;

        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
            .map_err(|e| StoreError::Database(format!("查询记录失败: {}", e)))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Database(format!("读取记录失败: {}", e)))
    }

    fn set_entries(&mut self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| StoreError::Database(format!("开启事务失败: {}", e)))?;

        for (key, value) in entries {
            tx.execute(
                "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map_err(|e| StoreError::Database(format!("写入记录 {} 失败: {}", key, e)))?;
        }

        tx.commit()
            .map_err(|e| StoreError::Database(format!("提交事务失败: {}", e)))
    }
}
