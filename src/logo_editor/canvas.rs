//! # 预览画布模块
//!
//! ## 设计思路
//!
//! 画布持有一块与客户区等大的 RGBA 位图，每次绘制都从背景色开始重画，
//! 因此 `draw` 可重复调用且结果只取决于当前源图与画布尺寸。
//! 绘制返回的 `ImageDrawRect` 是后续裁剪坐标换算的唯一依据。
//!
//! ## 实现思路
//!
//! 1. 按主题清空背景（深色 `#232323`，浅色 `#f5f5f5`）
//! 2. 计算信箱式绘制区域（见 [`fit_image_rect`]）
//! 3. 缩放源图并贴到绘制区域
//! 4. 叠加白色实线边框与 `#2f3a55` 虚线边框（仅视觉，不影响状态）

use image::imageops::FilterType;
use image::{Rgba, RgbaImage};

use super::geometry::{fit_image_rect, Rect};
use super::pipeline;
use super::source::SourceImage;
use super::EditorError;

const DARK_BACKGROUND: Rgba<u8> = Rgba([0x23, 0x23, 0x23, 0xff]);
const LIGHT_BACKGROUND: Rgba<u8> = Rgba([0xf5, 0xf5, 0xf5, 0xff]);
const BORDER_SOLID: Rgba<u8> = Rgba([0xff, 0xff, 0xff, 0xff]);
const BORDER_DASH: Rgba<u8> = Rgba([0x2f, 0x3a, 0x55, 0xff]);
/// 虚线样式：实 5px，空 4px
const DASH_ON: u32 = 5;
const DASH_OFF: u32 = 4;

/// 预览画布
#[derive(Debug, Clone)]
pub struct PreviewCanvas {
    width: u32,
    height: u32,
    dark_mode: bool,
    pixels: RgbaImage,
}

impl PreviewCanvas {
    pub fn new(width: u32, height: u32, dark_mode: bool) -> Self {
        let mut canvas = Self {
            width,
            height,
            dark_mode,
            pixels: RgbaImage::new(width, height),
        };
        canvas.clear();
        canvas
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn set_dark_mode(&mut self, dark_mode: bool) {
        self.dark_mode = dark_mode;
    }

    /// 同步客户区尺寸（调用方随后应重新 `draw`）。
    ///
    /// 任一边超过 `max_side` 时拒绝，画布保持原尺寸。
    pub fn resize(&mut self, width: u32, height: u32, max_side: u32) -> Result<(), EditorError> {
        validate_canvas_size(width, height, max_side)?;
        self.width = width;
        self.height = height;
        self.pixels = RgbaImage::new(width, height);
        self.clear();
        Ok(())
    }

    pub fn background(&self) -> Rgba<u8> {
        if self.dark_mode {
            DARK_BACKGROUND
        } else {
            LIGHT_BACKGROUND
        }
    }

    /// 以主题背景色清空画布。
    pub fn clear(&mut self) {
        let background = self.background();
        for pixel in self.pixels.pixels_mut() {
            *pixel = background;
        }
    }

    /// 绘制源图并返回绘制区域；没有源图时只清空画布并返回 `None`。
    pub fn draw(&mut self, source: Option<&SourceImage>, filter: FilterType) -> Option<Rect> {
        self.clear();
        let source = source?;

        let draw_rect = fit_image_rect(
            self.width as f64,
            self.height as f64,
            source.natural_width(),
            source.natural_height(),
        )?;

        let left = draw_rect.x.round() as u32;
        let top = draw_rect.y.round() as u32;
        let draw_width = (draw_rect.width.round() as u32).clamp(1, self.width.saturating_sub(left).max(1));
        let draw_height = (draw_rect.height.round() as u32).clamp(1, self.height.saturating_sub(top).max(1));

        let scaled = pipeline::resize_for_preview(source.image(), draw_width, draw_height, filter);
        image::imageops::overlay(&mut self.pixels, &scaled, left as i64, top as i64);

        self.stroke_border(left, top, draw_width, draw_height);
        Some(draw_rect)
    }

    fn stroke_border(&mut self, left: u32, top: u32, width: u32, height: u32) {
        let right = left + width - 1;
        let bottom = top + height - 1;

        let perimeter = border_pixels(left, top, right, bottom);
        for &(x, y) in &perimeter {
            self.put(x, y, BORDER_SOLID);
        }
        for (step, &(x, y)) in perimeter.iter().enumerate() {
            if (step as u32) % (DASH_ON + DASH_OFF) < DASH_ON {
                self.put(x, y, BORDER_DASH);
            }
        }
    }

    fn put(&mut self, x: u32, y: u32, color: Rgba<u8>) {
        if x < self.width && y < self.height {
            self.pixels.put_pixel(x, y, color);
        }
    }
}

/// 分配位图前的尺寸检查。
pub(crate) fn validate_canvas_size(width: u32, height: u32, max_side: u32) -> Result<(), EditorError> {
    if width > max_side || height > max_side {
        return Err(EditorError::ResourceLimit(format!(
            "画布尺寸过大：{}x{}（单边限制：{} 像素）",
            width, height, max_side
        )));
    }
    Ok(())
}

/// 沿矩形边框顺时针列出像素坐标（上 → 右 → 下 → 左），虚线节奏跨角连续。
fn border_pixels(left: u32, top: u32, right: u32, bottom: u32) -> Vec<(u32, u32)> {
    let mut points = Vec::new();
    for x in left..=right {
        points.push((x, top));
    }
    for y in top + 1..=bottom {
        points.push((right, y));
    }
    if bottom > top {
        for x in (left..right).rev() {
            points.push((x, bottom));
        }
    }
    if right > left {
        for y in (top + 1..bottom).rev() {
            points.push((left, y));
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logo_editor::EditorConfig;
    use crate::logo_editor::pipeline::{decode_source_image, tests::png_bytes};

    #[test]
    fn empty_canvas_is_cleared_to_theme_color() {
        let mut canvas = PreviewCanvas::new(10, 8, true);
        assert!(canvas.draw(None, FilterType::Triangle).is_none());
        assert!(canvas.pixels().pixels().all(|p| *p == DARK_BACKGROUND));

        canvas.set_dark_mode(false);
        canvas.clear();
        assert!(canvas.pixels().pixels().all(|p| *p == LIGHT_BACKGROUND));
    }

    #[test]
    fn draw_letterboxes_wide_image() {
        let source = decode_source_image(&png_bytes(800, 400), &EditorConfig::default()).expect("decode");
        let mut canvas = PreviewCanvas::new(400, 300, false);

        let rect = canvas.draw(Some(&source), FilterType::Nearest).expect("draw rect");

        assert_eq!(rect, Rect::new(0.0, 50.0, 400.0, 200.0));
        // 信箱区域保持背景色，图片区域内部为源图像素
        assert_eq!(canvas.pixels().get_pixel(200, 10), &LIGHT_BACKGROUND);
        assert_eq!(canvas.pixels().get_pixel(50, 150), &Rgba([255, 0, 0, 255]));
        assert_eq!(canvas.pixels().get_pixel(350, 150), &Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn border_starts_with_dash_color() {
        let source = decode_source_image(&png_bytes(40, 40), &EditorConfig::default()).expect("decode");
        let mut canvas = PreviewCanvas::new(40, 40, false);
        canvas.draw(Some(&source), FilterType::Nearest).expect("draw rect");

        assert_eq!(canvas.pixels().get_pixel(0, 0), &BORDER_DASH);
        assert_eq!(canvas.pixels().get_pixel(6, 0), &BORDER_SOLID);
    }

    #[test]
    fn oversize_resize_is_rejected_before_allocation() {
        let mut canvas = PreviewCanvas::new(40, 30, false);

        let result = canvas.resize(u32::MAX, u32::MAX, 4096);

        assert!(matches!(result, Err(EditorError::ResourceLimit(_))));
        assert_eq!((canvas.width(), canvas.height()), (40, 30));
        assert_eq!(canvas.pixels().dimensions(), (40, 30));

        canvas.resize(4096, 1, 4096).expect("limit itself is allowed");
        assert_eq!(canvas.pixels().dimensions(), (4096, 1));
    }

    #[test]
    fn border_walk_covers_perimeter_once() {
        let points = border_pixels(0, 0, 3, 2);
        assert_eq!(points.len(), 2 * 4 + 2 * 3 - 4);
    }
}
