//! # 页面 logo 渲染模块
//!
//! ## 设计思路
//!
//! 用一个纯数据模型表示页面上的 logo 元素（`src` + 内联样式 + 自然尺寸），
//! 宿主负责把模型同步到真实元素，并在图片解码完成时回调 [`PageLogo::on_load`]。
//!
//! ## 实现思路
//!
//! - 应用自定义 logo：设置 `src`，按目标高度等比计算宽度
//!   （`round(naturalWidth * targetHeight / naturalHeight)`）。
//! - 自然尺寸未知（仍在解码）时先按 `width: auto` 设置高度，
//!   并登记一次性的待定高度，解码完成时只补算一次。
//! - 恢复默认 logo 时清空全部内联尺寸覆盖。

use std::fmt;

use serde::Serialize;

/// logo 宽度样式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogoWidth {
    Auto,
    Px(u32),
}

impl fmt::Display for LogoWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Px(px) => write!(f, "{}px", px),
        }
    }
}

/// logo 元素的内联样式覆盖；`None` 表示未覆盖。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LogoStyle {
    pub width: Option<LogoWidth>,
    pub height_px: Option<u32>,
    /// `max-width: none`
    pub max_width_none: bool,
    /// `object-fit: contain`
    pub object_fit_contain: bool,
}

impl LogoStyle {
    /// 渲染为内联样式文本，未覆盖的属性不输出。
    pub fn css_text(&self) -> String {
        let mut parts = Vec::new();
        if let Some(width) = self.width {
            parts.push(format!("width: {};", width));
        }
        if let Some(height) = self.height_px {
            parts.push(format!("height: {}px;", height));
        }
        if self.max_width_none {
            parts.push("max-width: none;".to_string());
        }
        if self.object_fit_contain {
            parts.push("object-fit: contain;".to_string());
        }
        parts.join(" ")
    }
}

/// 页面 logo 元素模型
#[derive(Debug, Clone, Serialize)]
pub struct PageLogo {
    default_src: String,
    default_height: u32,
    src: String,
    natural_size: Option<(u32, u32)>,
    style: LogoStyle,
    #[serde(skip)]
    pending_height: Option<u32>,
}

impl PageLogo {
    /// 以页面自带的 logo 初始化。
    ///
    /// `default_height` 为页面 logo 原本的显示高度，为 0 时按 120px 处理。
    pub fn new(default_src: impl Into<String>, default_height: u32) -> Self {
        let default_src = default_src.into();
        Self {
            src: default_src.clone(),
            default_src,
            default_height: if default_height > 0 { default_height } else { 120 },
            natural_size: None,
            style: LogoStyle::default(),
            pending_height: None,
        }
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn style(&self) -> &LogoStyle {
        &self.style
    }

    pub fn default_height(&self) -> u32 {
        self.default_height
    }

    pub fn natural_size(&self) -> Option<(u32, u32)> {
        self.natural_size
    }

    pub fn is_default(&self) -> bool {
        self.src == self.default_src
    }

    pub fn has_pending_resize(&self) -> bool {
        self.pending_height.is_some()
    }

    /// 应用 logo 与目标显示高度。
    ///
    /// 更换 `src` 会使之前的自然尺寸失效；尺寸未知时登记待定高度。
    pub fn apply(&mut self, data_url: &str, height: u32) {
        if self.src != data_url {
            self.src = data_url.to_string();
            self.natural_size = None;
        }

        let target = self.target_height(height);
        self.apply_display_height(target);

        self.pending_height = match self.natural_size {
            Some(_) => None,
            None => Some(target),
        };
    }

    /// 宿主在图片解码完成时回调，补算一次等比宽度。
    pub fn on_load(&mut self, natural_width: u32, natural_height: u32) {
        self.natural_size = Some((natural_width, natural_height));
        if let Some(height) = self.pending_height.take() {
            self.apply_display_height(height);
        }
    }

    /// 恢复页面自带 logo，并清空全部内联尺寸覆盖。
    pub fn restore_default(&mut self) {
        self.src = self.default_src.clone();
        self.natural_size = None;
        self.pending_height = None;
        self.style = LogoStyle::default();
    }

    fn target_height(&self, height: u32) -> u32 {
        if height > 0 { height } else { self.default_height }
    }

    fn apply_display_height(&mut self, height: u32) {
        let width = match self.natural_size {
            Some((natural_width, natural_height)) if natural_width > 0 && natural_height > 0 => {
                let scale = height as f64 / natural_height as f64;
                LogoWidth::Px((natural_width as f64 * scale).round() as u32)
            }
            _ => LogoWidth::Auto,
        };

        self.style = LogoStyle {
            width: Some(width),
            height_px: Some(height),
            max_width_none: true,
            object_fit_contain: true,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_with_known_size_preserves_ratio() {
        let mut logo = PageLogo::new("logo.png", 120);
        logo.apply("data:image/png;base64,AAAA", 90);
        logo.on_load(300, 200);

        assert_eq!(logo.style().width, Some(LogoWidth::Px(135)));
        assert_eq!(logo.style().height_px, Some(90));
        assert_eq!(
            logo.style().css_text(),
            "width: 135px; height: 90px; max-width: none; object-fit: contain;"
        );
    }

    #[test]
    fn deferred_resize_is_applied_exactly_once() {
        let mut logo = PageLogo::new("logo.png", 120);
        logo.apply("data:image/png;base64,AAAA", 50);

        assert_eq!(logo.style().width, Some(LogoWidth::Auto));
        assert!(logo.has_pending_resize());

        logo.on_load(100, 100);
        assert_eq!(logo.style().width, Some(LogoWidth::Px(50)));
        assert!(!logo.has_pending_resize());

        // 再次 load 事件不会重复改写样式
        logo.style = LogoStyle::default();
        logo.on_load(100, 100);
        assert_eq!(logo.style(), &LogoStyle::default());
    }

    #[test]
    fn reapplying_same_src_uses_known_size() {
        let mut logo = PageLogo::new("logo.png", 120);
        logo.apply("data:image/png;base64,AAAA", 50);
        logo.on_load(200, 100);

        logo.apply("data:image/png;base64,AAAA", 30);
        assert_eq!(logo.style().width, Some(LogoWidth::Px(60)));
        assert!(!logo.has_pending_resize());
    }

    #[test]
    fn non_positive_height_uses_default() {
        let mut logo = PageLogo::new("logo.png", 0);
        logo.apply("data:image/png;base64,AAAA", 0);
        assert_eq!(logo.style().height_px, Some(120));
    }

    #[test]
    fn restore_default_clears_overrides() {
        let mut logo = PageLogo::new("logo.png", 120);
        logo.apply("data:image/png;base64,AAAA", 90);
        logo.restore_default();

        assert!(logo.is_default());
        assert_eq!(logo.style(), &LogoStyle::default());
        assert_eq!(logo.style().css_text(), "");
        assert!(!logo.has_pending_resize());
    }
}
