//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载编辑器链路中的所有错误来源，调用侧可按分支匹配。
//! 错误分为三类：
//! - 用户可见的校验错误（未选择图片、图片过大）：弹出阻塞提示，编辑状态不变
//! - 存储写入失败：统一提示“保存失败”，不留下部分提交
//! - 解码失败 / 超时：结束加载态，保留之前的编辑状态

use crate::storage::StoreError;
use crate::text::LogoText;

/// 编辑器统一错误类型。
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("尚未选择图片")]
    NoImage,

    #[error("图片过大：预计占用 {projected} 字节（上限 {limit} 字节）")]
    TooLarge { projected: u64, limit: u64 },

    #[error("保存失败：{0}")]
    SaveFailed(String),

    #[error("解码错误：{0}")]
    Decode(String),

    #[error("格式错误：{0}")]
    InvalidFormat(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    #[error("超时错误：{0}")]
    Timeout(String),

    #[error("存储错误：{0}")]
    Storage(#[from] StoreError),
}

impl EditorError {
    /// 稳定错误码，供命令层与前端判断分支。
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoImage => "E_NO_IMAGE",
            Self::TooLarge { .. } => "E_TOO_LARGE",
            Self::SaveFailed(_) => "E_SAVE_FAILED",
            Self::Decode(_) => "E_DECODE",
            Self::InvalidFormat(_) => "E_INVALID_FORMAT",
            Self::ResourceLimit(_) => "E_RESOURCE_LIMIT",
            Self::Timeout(_) => "E_TIMEOUT",
            Self::Storage(_) => "E_STORAGE",
        }
    }

    /// 生成面向用户的提示文案。
    pub fn user_message(&self, text: &LogoText) -> String {
        match self {
            Self::NoImage => text.alert_no_image.clone(),
            Self::TooLarge { limit, .. } => text.too_large_message(*limit),
            Self::SaveFailed(_) | Self::Storage(_) => text.alert_save_fail.clone(),
            other => other.to_string(),
        }
    }
}
