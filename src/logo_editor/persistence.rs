//! # 持久化闸门模块
//!
//! ## 设计思路
//!
//! 写入前先估算占用，超出上限直接拒绝，避免把存储写满后才失败。
//! 图片与高度是两条独立记录，但对调用方而言必须“同时生效或同时不生效”。
//!
//! ## 存储布局
//!
//! | 键 | 值 |
//! |----|----|
//! | `customPageLogo` | 图片 Data URL（`data:image/...`） |
//! | `customPageLogoHeight` | 十进制正整数字符串 |
//!
//! 第一条记录缺失或不是 `data:image/` 前缀时，视为没有自定义 logo。

use serde::Serialize;

use crate::storage::{estimate_storage_bytes, usage_bytes, LogoStore, StoreError};

use super::loader::is_image_data_url;
use super::EditorError;

pub const CUSTOM_PAGE_LOGO_KEY: &str = "customPageLogo";
pub const CUSTOM_PAGE_LOGO_HEIGHT_KEY: &str = "customPageLogoHeight";

/// 已持久化的页面 logo
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersistedLogo {
    pub data_url: String,
    pub display_height_px: u32,
}

/// 按 `parseInt(value, 10)` 的规则解析前导整数。
///
/// 跳过前导空白，可带一个正负号，读取连续数字，其余字符忽略；
/// 没有数字时返回 `None`（对应 NaN）。
pub fn parse_leading_int(value: &str) -> Option<i64> {
    let trimmed = value.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude: i64 = digits[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// 解析高度输入；缺失、非数字或非正数时回退到 `fallback`。
pub fn resolve_display_height(input: &str, fallback: u32) -> u32 {
    match parse_leading_int(input) {
        Some(height) if height > 0 => u32::try_from(height).unwrap_or(fallback),
        _ => fallback,
    }
}

/// 读取已保存的高度，无法解析时回退到 `fallback`。
pub fn stored_height<S: LogoStore + ?Sized>(store: &S, fallback: u32) -> Result<u32, StoreError> {
    let stored = store.get(CUSTOM_PAGE_LOGO_HEIGHT_KEY)?;
    Ok(stored
        .as_deref()
        .map(|value| resolve_display_height(value, fallback))
        .unwrap_or(fallback))
}

/// 读取有效的自定义 logo；没有或无效时返回 `None`。
pub fn load_persisted_logo<S: LogoStore + ?Sized>(
    store: &S,
    fallback_height: u32,
) -> Result<Option<PersistedLogo>, StoreError> {
    let Some(data_url) = store.get(CUSTOM_PAGE_LOGO_KEY)? else {
        return Ok(None);
    };
    if !is_image_data_url(&data_url) {
        log::debug!("已保存的 logo 不是图片 Data URL，视为未设置");
        return Ok(None);
    }

    let display_height_px = stored_height(store, fallback_height)?;
    Ok(Some(PersistedLogo {
        data_url,
        display_height_px,
    }))
}

/// 计算写入候选图片后的预计总占用。
pub fn projected_usage(current_usage: u64, previous_logo_bytes: u64, candidate_bytes: u64) -> u64 {
    current_usage.saturating_sub(previous_logo_bytes) + candidate_bytes
}

/// 写入前的容量检查：预计占用超过 `limit` 时返回 `TooLarge`。
pub fn check_quota<S: LogoStore + ?Sized>(
    store: &S,
    candidate_data_url: &str,
    limit: u64,
) -> Result<u64, EditorError> {
    let candidate_bytes = estimate_storage_bytes(candidate_data_url);
    let current_usage = usage_bytes(store)?;
    let previous_logo = store.get(CUSTOM_PAGE_LOGO_KEY)?.unwrap_or_default();
    let previous_bytes = estimate_storage_bytes(&previous_logo);

    let projected = projected_usage(current_usage, previous_bytes, candidate_bytes);
    if projected > limit {
        log::warn!(
            "🚫 logo 超出存储上限：预计 {} 字节（上限 {} 字节）",
            projected,
            limit
        );
        return Err(EditorError::TooLarge { projected, limit });
    }
    Ok(projected)
}

/// 原子写入图片与高度。
pub fn commit_logo<S: LogoStore + ?Sized>(store: &mut S, logo: &PersistedLogo) -> Result<(), StoreError> {
    let height = logo.display_height_px.to_string();
    store.set_entries(&[
        (CUSTOM_PAGE_LOGO_KEY, logo.data_url.as_str()),
        (CUSTOM_PAGE_LOGO_HEIGHT_KEY, height.as_str()),
    ])
}

/// 删除自定义 logo 的两条记录。
pub fn clear_logo<S: LogoStore + ?Sized>(store: &mut S) -> Result<(), StoreError> {
    store.remove(CUSTOM_PAGE_LOGO_KEY)?;
    store.remove(CUSTOM_PAGE_LOGO_HEIGHT_KEY)
}
