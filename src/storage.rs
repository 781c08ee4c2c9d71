//! 键值存储模块
//!
//! # 设计思路
//!
//! 页面 logo 以两条独立记录持久化（图片 Data URL 与显示高度），
//! 存储后端抽象为 `LogoStore` trait：生产环境使用 SQLite（见 [`crate::db`]），
//! 测试与无盘场景使用 `MemoryStore`。
//!
//! # 实现思路
//!
//! - 容量估算沿用浏览器本地存储的口径：每个 UTF-16 码元按 2 字节计，
//!   键和值都计入，是保守估计而非真实二进制大小。
//! - `set_entries` 默认实现为“逐条写入 + 失败回滚”，
//!   支持事务的后端应覆盖为真正的原子写入。
//! - 所有可能失败的操作均返回 `Result`。

use std::collections::BTreeMap;

/// 存储层错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("数据库错误: {0}")]
    Database(String),

    #[error("超出存储配额: 需要 {needed} 字节，配额 {quota} 字节")]
    QuotaExceeded { needed: u64, quota: u64 },
}

/// 持久化键值存储
pub trait LogoStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&mut self, key: &str) -> Result<(), StoreError>;

    /// 返回全部记录，用于容量估算。
    fn entries(&self) -> Result<Vec<(String, String)>, StoreError>;

    /// 原子写入多条记录：要么全部生效，要么保持写入前的状态。
    fn set_entries(&mut self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        let mut previous = Vec::with_capacity(entries.len());
        for (key, _) in entries {
            previous.push(self.get(key)?);
        }

        for (index, (key, value)) in entries.iter().enumerate() {
            if let Err(err) = self.set(key, value) {
                for ((rollback_key, _), old_value) in entries[..index].iter().zip(&previous) {
                    let restored = match old_value {
                        Some(old) => self.set(rollback_key, old),
                        None => self.remove(rollback_key),
                    };
                    if let Err(rollback_err) = restored {
                        log::error!("回滚记录 {} 失败: {}", rollback_key, rollback_err);
                    }
                }
                return Err(err);
            }
        }

        Ok(())
    }
}

/// 估算字符串在本地存储中的占用（UTF-16 码元 × 2）。
pub fn estimate_storage_bytes(value: &str) -> u64 {
    value.encode_utf16().count() as u64 * 2
}

/// 统计存储中全部键值的估算占用。
pub fn usage_bytes<S: LogoStore + ?Sized>(store: &S) -> Result<u64, StoreError> {
    let total = store
        .entries()?
        .iter()
        .map(|(key, value)| estimate_storage_bytes(key) + estimate_storage_bytes(value))
        .sum();
    Ok(total)
}

/// 内存键值存储
///
/// 可选配额用于模拟浏览器的写入拒绝（配额或策略限制）。
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: BTreeMap<String, String>,
    quota_bytes: Option<u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建带写入配额的存储，超出配额的写入返回 `QuotaExceeded`。
    pub fn with_quota(quota_bytes: u64) -> Self {
        Self {
            items: BTreeMap::new(),
            quota_bytes: Some(quota_bytes),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl LogoStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.items.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if let Some(quota) = self.quota_bytes {
            let current = usage_bytes(self)?;
            let replaced = self
                .items
                .get(key)
                .map(|old| estimate_storage_bytes(key) + estimate_storage_bytes(old))
                .unwrap_or(0);
            let needed = current - replaced + estimate_storage_bytes(key) + estimate_storage_bytes(value);
            if needed > quota {
                return Err(StoreError::QuotaExceeded { needed, quota });
            }
        }

        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.items.remove(key);
        Ok(())
    }

    fn entries(&self) -> Result<Vec<(String, String)>, StoreError> {
        Ok(self
            .items
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }
}
