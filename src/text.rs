//! 文案表模块
//!
//! # 设计思路
//!
//! 语言检测与回退由外部 i18n 模块负责，这里只定义编辑器需要的文案键，
//! 每个键都带英文兜底，缺失的键不会让提示变成空字符串。
//!
//! # 实现思路
//!
//! - 字段名与前端消息表一致（`ntLogo*`），通过 serde 重命名直接反序列化。
//! - `ntLogoAlertTooLarge` 允许缺省，缺省时按存储上限动态生成英文提示。

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// 编辑器文案表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogoText {
    #[serde(rename = "ntLogoDropHint")]
    pub drop_hint: String,
    #[serde(rename = "ntLogoHeightLabel")]
    pub height_label: String,
    #[serde(rename = "ntLogoHeightDefault")]
    pub height_default: String,
    #[serde(rename = "ntLogoCrop")]
    pub crop: String,
    #[serde(rename = "ntLogoCropConfirm")]
    pub crop_confirm: String,
    #[serde(rename = "ntLogoReset")]
    pub reset: String,
    #[serde(rename = "ntLogoClear")]
    pub clear: String,
    #[serde(rename = "ntLogoConfirm")]
    pub confirm: String,
    #[serde(rename = "ntLogoCancel")]
    pub cancel: String,
    #[serde(rename = "ntLogoAlertNoImage")]
    pub alert_no_image: String,
    #[serde(rename = "ntLogoAlertTooLarge")]
    pub alert_too_large: Option<String>,
    #[serde(rename = "ntLogoAlertSaveFail")]
    pub alert_save_fail: String,
}

impl Default for LogoText {
    fn default() -> Self {
        Self {
            drop_hint: "Double-click or drag image here".to_string(),
            height_label: "Logo Height".to_string(),
            height_default: "Default".to_string(),
            crop: "Crop".to_string(),
            crop_confirm: "Confirm Crop".to_string(),
            reset: "Reset".to_string(),
            clear: "Clear".to_string(),
            confirm: "Confirm".to_string(),
            cancel: "Cancel".to_string(),
            alert_no_image: "Please choose an image first.".to_string(),
            alert_too_large: None,
            alert_save_fail: "Unable to save logo.".to_string(),
        }
    }
}

impl LogoText {
    /// 从 JSON 消息表解析，缺失的键使用英文兜底。
    pub fn from_json_str(content: &str) -> Result<Self, AppError> {
        serde_json::from_str(content).map_err(|e| AppError::Config(format!("解析文案表失败: {}", e)))
    }

    /// 图片过大提示；未提供本地化文案时按上限生成。
    pub fn too_large_message(&self, limit_bytes: u64) -> String {
        match self.alert_too_large.as_deref() {
            Some(message) if !message.is_empty() => message.to_string(),
            _ => format!(
                "Image too large, please choose an image smaller than {}MB.",
                format_megabytes(limit_bytes)
            ),
        }
    }

    /// 高度输入框旁的默认值标签，例如 `Default: 90px`。
    pub fn height_default_label(&self, height: u32) -> String {
        format!("{}: {}px", self.height_default, height)
    }
}

/// 保留一位小数并去掉多余的 `.0`（5242880 → `5`，1572864 → `1.5`）。
fn format_megabytes(bytes: u64) -> String {
    let formatted = format!("{:.1}", bytes as f64 / (1024.0 * 1024.0));
    match formatted.strip_suffix(".0") {
        Some(trimmed) => trimmed.to_string(),
        None => formatted,
    }
}
