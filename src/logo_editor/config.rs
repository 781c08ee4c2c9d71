//! # 配置模块
//!
//! ## 设计思路
//!
//! 将编辑器的所有可调参数集中到 `EditorConfig`，保证行为可观测、可调整、可测试。
//! 预览质量档位（quality / balanced / speed）作为高层语义，映射到底层缩放滤镜。
//!
//! ## 实现思路
//!
//! - `Default` 提供产品默认值（5MB 存储上限、40px 最小裁剪、90px 弹窗默认高度等）。
//! - `PreviewQuality` 负责档位字符串解析与反向输出。
//! - 配置文件的读写在 `crate::settings`，这里只定义运行时结构。

use std::time::Duration;

use image::imageops::FilterType;

use super::EditorError;

/// 编辑器运行时配置。
#[derive(Debug, Clone)]
pub struct EditorConfig {
    /// 预览画布的客户区宽度（CSS 像素）。
    pub canvas_width: u32,
    /// 预览画布的客户区高度（CSS 像素）。
    pub canvas_height: u32,
    /// 画布单边上限（像素），超出的尺寸在分配位图前拒绝。
    pub max_canvas_side: u32,
    /// 裁剪框最小边长。
    pub min_crop_size: f64,
    /// 重置裁剪框时占绘制区域的比例。
    pub crop_reset_ratio: f64,
    /// 持久化存储总量上限（按 UTF-16 估算，字节）。
    pub storage_limit_bytes: u64,
    /// 每次打开弹窗时高度输入框的默认显示值。
    pub default_modal_height: u32,
    /// 单次图片解码允许的最长时间（毫秒）。
    pub decode_timeout_ms: u64,
    /// 读取的原始文件体积上限（字节）。
    pub max_file_size: u64,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 预览缩放质量档位。
    pub preview_quality: PreviewQuality,
    /// 深色主题（影响画布背景色）。
    pub dark_mode: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas_width: 400,
            canvas_height: 300,
            max_canvas_side: 4096,
            min_crop_size: 40.0,
            crop_reset_ratio: 0.6,
            storage_limit_bytes: 5 * 1024 * 1024,
            default_modal_height: 90,
            decode_timeout_ms: 10_000,
            max_file_size: 20 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
            preview_quality: PreviewQuality::Balanced,
            dark_mode: false,
        }
    }
}

impl EditorConfig {
    pub fn decode_timeout(&self) -> Duration {
        Duration::from_millis(self.decode_timeout_ms)
    }

    pub(crate) fn resize_filter(&self) -> FilterType {
        self.preview_quality.resize_filter()
    }
}

/// 预览缩放质量档位。
///
/// - `Quality`：CatmullRom，最清晰
/// - `Balanced`：Triangle（双线性）
/// - `Speed`：Nearest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewQuality {
    Quality,
    Balanced,
    Speed,
}

impl PreviewQuality {
    /// 从外部字符串解析档位。
    ///
    /// # 示例
    /// ```rust
    /// use newtab_logo::logo_editor::PreviewQuality;
    ///
    /// let quality = PreviewQuality::parse("speed")?;
    /// assert_eq!(quality.as_str(), "speed");
    /// # Ok::<(), newtab_logo::logo_editor::EditorError>(())
    /// ```
    pub fn parse(value: &str) -> Result<Self, EditorError> {
        match value.trim().to_lowercase().as_str() {
            "quality" => Ok(Self::Quality),
            "balanced" => Ok(Self::Balanced),
            "speed" => Ok(Self::Speed),
            other => Err(EditorError::InvalidFormat(format!(
                "未知预览质量档位：{}（可选：quality / balanced / speed）",
                other
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quality => "quality",
            Self::Balanced => "balanced",
            Self::Speed => "speed",
        }
    }

    pub(crate) fn resize_filter(self) -> FilterType {
        match self {
            Self::Quality => FilterType::CatmullRom,
            Self::Balanced => FilterType::Triangle,
            Self::Speed => FilterType::Nearest,
        }
    }
}
