//! 设置文件模块
//!
//! `settings.json` 只保存可调参数，读取失败（文件缺失、JSON 损坏、档位未知）
//! 一律回退默认值，不阻断启动。

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::logo_editor::{EditorConfig, PageLogo, PreviewQuality};

/// 页面 logo 原本的显示高度，高度输入无效时以此回退。
const DEFAULT_PAGE_LOGO_HEIGHT: u32 = 120;

/// 设置文件内容，缺省字段取默认值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorSettings {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub storage_limit_bytes: u64,
    pub default_page_logo_height: u32,
    pub default_logo_src: String,
    pub decode_timeout_ms: u64,
    pub max_file_size: u64,
    pub max_decoded_pixels: u64,
    pub preview_quality: String,
    pub dark_mode: bool,
}

impl Default for EditorSettings {
    fn default() -> Self {
        let config = EditorConfig::default();
        Self {
            canvas_width: config.canvas_width,
            canvas_height: config.canvas_height,
            storage_limit_bytes: config.storage_limit_bytes,
            default_page_logo_height: DEFAULT_PAGE_LOGO_HEIGHT,
            default_logo_src: "icons/logo.png".to_string(),
            decode_timeout_ms: config.decode_timeout_ms,
            max_file_size: config.max_file_size,
            max_decoded_pixels: config.max_decoded_pixels,
            preview_quality: config.preview_quality.as_str().to_string(),
            dark_mode: config.dark_mode,
        }
    }
}

impl EditorSettings {
    /// 页面自带 logo 的模型，高度输入的回退值只来自这里。
    pub fn page_logo(&self) -> PageLogo {
        PageLogo::new(self.default_logo_src.clone(), self.default_page_logo_height)
    }

    /// 转换为运行时配置；未知的预览档位回退为默认档位。
    pub fn into_config(self) -> EditorConfig {
        let defaults = EditorConfig::default();
        let preview_quality = match PreviewQuality::parse(&self.preview_quality) {
            Ok(quality) => quality,
            Err(err) => {
                log::warn!("⚠️ {}，使用默认档位 {}", err, defaults.preview_quality.as_str());
                defaults.preview_quality
            }
        };

        EditorConfig {
            canvas_width: self.canvas_width,
            canvas_height: self.canvas_height,
            storage_limit_bytes: self.storage_limit_bytes,
            decode_timeout_ms: self.decode_timeout_ms,
            max_file_size: self.max_file_size,
            max_decoded_pixels: self.max_decoded_pixels,
            preview_quality,
            dark_mode: self.dark_mode,
            ..defaults
        }
    }
}

/// 读取设置文件，任何失败都回退默认值。
pub fn load_settings_from_path(path: &Path) -> EditorSettings {
    if path.exists() {
        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(settings) => return settings,
                Err(e) => log::warn!("⚠️ 解析设置文件失败，使用默认设置: {}", e),
            },
            Err(e) => log::warn!("⚠️ 读取设置文件失败，使用默认设置: {}", e),
        }
    }
    EditorSettings::default()
}

pub fn save_settings_to_path(path: &Path, settings: &EditorSettings) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(settings)
        .map_err(|e| AppError::Config(format!("序列化设置失败: {}", e)))?;
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    fn unique_temp_dir() -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock error")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("newtab-logo-settings-test-{nanos}"));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    #[test]
    fn save_and_load_settings_roundtrip() {
        let dir = unique_temp_dir();
        let path = dir.join("settings.json");
        let settings = EditorSettings {
            canvas_width: 480,
            dark_mode: true,
            preview_quality: "speed".to_string(),
            ..EditorSettings::default()
        };

        save_settings_to_path(&path, &settings).expect("save settings");
        let loaded = load_settings_from_path(&path);

        assert_eq!(loaded, settings);
        let config = loaded.into_config();
        assert_eq!(config.canvas_width, 480);
        assert_eq!(config.preview_quality, PreviewQuality::Speed);
        assert!(config.dark_mode);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn load_bad_settings_falls_back_to_default() {
        let dir = unique_temp_dir();
        let path = dir.join("settings.json");
        std::fs::write(&path, "not-json").expect("write invalid settings");

        assert_eq!(load_settings_from_path(&path), EditorSettings::default());
        assert_eq!(load_settings_from_path(&dir.join("missing.json")), EditorSettings::default());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn partial_settings_keep_defaults_and_unknown_quality_falls_back() {
        let settings: EditorSettings =
            serde_json::from_str(r#"{"storageLimitBytes": 1024, "previewQuality": "ultra"}"#).expect("parse");

        let config = settings.into_config();
        assert_eq!(config.storage_limit_bytes, 1024);
        assert_eq!(config.canvas_height, 300);
        assert_eq!(config.preview_quality, PreviewQuality::Balanced);
        assert_eq!(config.min_crop_size, 40.0);
    }

    #[test]
    fn page_logo_carries_configured_fallback_height() {
        let settings: EditorSettings =
            serde_json::from_str(r#"{"defaultPageLogoHeight": 50, "defaultLogoSrc": "img/brand.svg"}"#)
                .expect("parse");

        let logo = settings.page_logo();
        assert_eq!(logo.default_height(), 50);
        assert_eq!(logo.src(), "img/brand.svg");
        assert_eq!(EditorSettings::default().page_logo().default_height(), 120);
    }
}
