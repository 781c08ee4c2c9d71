//! # 几何计算模块
//!
//! 预览画布与裁剪框的全部坐标运算，均为纯函数，便于测试。
//!
//! # 设计思路
//!
//! - 画布坐标（CSS 像素，浮点）与原图像素坐标（整数）严格区分：
//!   `Rect` 只出现在画布空间，`PixelRect` 只出现在原图空间。
//! - 先算理想结果，再做边界收敛（与窗口定位算法同一思路），
//!   保证裁剪框永远不会越出图片绘制区域。
//!
//! # 坐标空间
//!
//! ```text
//! 视口 (clientX/clientY) ──减去拖放区原点──▶ 拖放区本地坐标 (= 画布坐标)
//!                                              │
//!                          ImageDrawRect / CropRect 均在此空间
//!                                              │
//!                       × (naturalWidth / drawWidth) 映射
//!                                              ▼
//!                                        原图像素坐标 PixelRect
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 画布空间中的点（拖放区本地坐标）。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// 将视口坐标转换为拖放区本地坐标。
    ///
    /// # 参数
    /// * `client_x` / `client_y` - 指针在视口中的位置
    /// * `zone_left` / `zone_top` - 拖放区在视口中的左上角
    pub fn from_viewport(client_x: f64, client_y: f64, zone_left: f64, zone_top: f64) -> Self {
        Self {
            x: client_x - zone_left,
            y: client_y - zone_top,
        }
    }
}

/// 画布空间中的矩形（`ImageDrawRect` 与 `CropRect` 共用）。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// 判断 `other` 是否完全位于当前矩形内（允许 `epsilon` 的浮点误差）。
    pub fn contains_rect(&self, other: &Rect, epsilon: f64) -> bool {
        other.x >= self.x - epsilon
            && other.y >= self.y - epsilon
            && other.right() <= self.right() + epsilon
            && other.bottom() <= self.bottom() + epsilon
    }
}

/// 原图像素空间中的矩形（裁剪输出区域）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// 拖拽手柄：整体移动或四个角之一。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragHandle {
    Move,
    Nw,
    Ne,
    Sw,
    Se,
}

impl DragHandle {
    /// 根据被点击元素的 `data-handle` 属性确定手柄。
    ///
    /// 非角手柄（裁剪框本体、缺失或未知属性）一律视为整体移动。
    pub fn from_element(data_handle: Option<&str>) -> Self {
        match data_handle {
            Some(value) => value.parse().unwrap_or_else(|_| {
                log::debug!("未知裁剪手柄 {:?}，按整体移动处理", value);
                Self::Move
            }),
            None => Self::Move,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Move => "move",
            Self::Nw => "nw",
            Self::Ne => "ne",
            Self::Sw => "sw",
            Self::Se => "se",
        }
    }

    /// 将手柄变换应用到拖拽起始时的矩形快照上。
    ///
    /// 结果尚未做边界与最小尺寸修正，调用方需再经过 [`keep_crop_rect_in_image`]。
    pub fn apply(self, start: Rect, delta_x: f64, delta_y: f64) -> Rect {
        let mut next = start;
        match self {
            Self::Move => {
                next.x += delta_x;
                next.y += delta_y;
            }
            Self::Nw => {
                next.x += delta_x;
                next.y += delta_y;
                next.width -= delta_x;
                next.height -= delta_y;
            }
            Self::Ne => {
                next.y += delta_y;
                next.width += delta_x;
                next.height -= delta_y;
            }
            Self::Sw => {
                next.x += delta_x;
                next.width -= delta_x;
                next.height += delta_y;
            }
            Self::Se => {
                next.width += delta_x;
                next.height += delta_y;
            }
        }
        next
    }
}

impl FromStr for DragHandle {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "move" => Ok(Self::Move),
            "nw" => Ok(Self::Nw),
            "ne" => Ok(Self::Ne),
            "sw" => Ok(Self::Sw),
            "se" => Ok(Self::Se),
            other => Err(format!("未知裁剪手柄：{}", other)),
        }
    }
}

impl fmt::Display for DragHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 计算图片在画布中的信箱式（letterbox）绘制区域。
///
/// 图片宽高比大于画布时横向撑满、纵向收缩，否则纵向撑满、横向收缩，
/// 结果在画布内居中。
///
/// 任一尺寸为 0 时返回 `None`，上层据此让所有裁剪操作失效。
pub fn fit_image_rect(
    canvas_width: f64,
    canvas_height: f64,
    natural_width: u32,
    natural_height: u32,
) -> Option<Rect> {
    if canvas_width <= 0.0 || canvas_height <= 0.0 || natural_width == 0 || natural_height == 0 {
        return None;
    }

    let image_ratio = natural_width as f64 / natural_height as f64;
    let canvas_ratio = canvas_width / canvas_height;

    let mut draw_width = canvas_width;
    let mut draw_height = canvas_height;
    if image_ratio > canvas_ratio {
        draw_height = canvas_width / image_ratio;
    } else {
        draw_width = canvas_height * image_ratio;
    }

    Some(Rect {
        x: (canvas_width - draw_width) / 2.0,
        y: (canvas_height - draw_height) / 2.0,
        width: draw_width,
        height: draw_height,
    })
}

/// 在绘制区域内生成居中的初始裁剪框（宽高各占 `ratio`）。
pub fn centered_crop_rect(draw_rect: &Rect, ratio: f64) -> Rect {
    let width = draw_rect.width * ratio;
    let height = draw_rect.height * ratio;
    Rect {
        x: draw_rect.x + (draw_rect.width - width) / 2.0,
        y: draw_rect.y + (draw_rect.height - height) / 2.0,
        width,
        height,
    }
}

/// 将裁剪框修正到图片绘制区域内，并保证不小于最小尺寸。
///
/// # 修正顺序
/// 1. 宽高下限取 `min_size`
/// 2. 宽高上限取绘制区域尺寸（绘制区域比 `min_size` 还小时以包含关系优先）
/// 3. 先平移位置回到区域内，尽量保留尺寸
///
/// # 后置条件
/// - 结果完全位于 `bounds` 内
/// - `bounds` 足够大时，结果宽高均 `>= min_size`
pub fn keep_crop_rect_in_image(rect: Rect, bounds: &Rect, min_size: f64) -> Rect {
    let mut width = rect.width.max(min_size);
    let mut height = rect.height.max(min_size);
    let mut x = rect.x;
    let mut y = rect.y;

    if width > bounds.width {
        width = bounds.width;
    }
    if height > bounds.height {
        height = bounds.height;
    }

    if x < bounds.x {
        x = bounds.x;
    }
    if y < bounds.y {
        y = bounds.y;
    }
    if x + width > bounds.right() {
        x = bounds.right() - width;
    }
    if y + height > bounds.bottom() {
        y = bounds.bottom() - height;
    }

    Rect { x, y, width, height }
}

/// 将画布空间的裁剪框映射为原图像素区域。
///
/// 缩放系数为 `natural / draw`，四个分量各自四舍五入，
/// 再收敛到原图范围内，输出至少 1×1 像素。
pub fn crop_rect_to_source_pixels(
    crop_rect: &Rect,
    draw_rect: &Rect,
    natural_width: u32,
    natural_height: u32,
) -> Option<PixelRect> {
    if draw_rect.width <= 0.0 || draw_rect.height <= 0.0 || natural_width == 0 || natural_height == 0 {
        return None;
    }

    let scale_x = natural_width as f64 / draw_rect.width;
    let scale_y = natural_height as f64 / draw_rect.height;

    let source_x = ((crop_rect.x - draw_rect.x) * scale_x).round() as i64;
    let source_y = ((crop_rect.y - draw_rect.y) * scale_y).round() as i64;
    let source_width = (crop_rect.width * scale_x).round() as i64;
    let source_height = (crop_rect.height * scale_y).round() as i64;

    let (x, width) = clamp_span(source_x, source_width, natural_width);
    let (y, height) = clamp_span(source_y, source_height, natural_height);

    Some(PixelRect { x, y, width, height })
}

fn clamp_span(start: i64, length: i64, limit: u32) -> (u32, u32) {
    let limit = limit as i64;
    let start = start.clamp(0, limit - 1);
    let length = length.clamp(1, limit - start);
    (start as u32, length as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_wide_image_fills_width_and_centers_vertically() {
        let rect = fit_image_rect(400.0, 300.0, 800, 400).expect("rect expected");
        assert_eq!(rect, Rect::new(0.0, 50.0, 400.0, 200.0));
    }

    #[test]
    fn fit_tall_image_fills_height_and_centers_horizontally() {
        let rect = fit_image_rect(400.0, 300.0, 300, 600).expect("rect expected");
        assert_eq!(rect, Rect::new(125.0, 0.0, 150.0, 300.0));
    }

    #[test]
    fn fit_rejects_zero_sizes() {
        assert!(fit_image_rect(0.0, 300.0, 10, 10).is_none());
        assert!(fit_image_rect(400.0, 300.0, 0, 10).is_none());
    }

    #[test]
    fn centered_crop_is_sixty_percent_and_centered() {
        let draw = Rect::new(0.0, 50.0, 400.0, 200.0);
        let crop = centered_crop_rect(&draw, 0.6);
        assert_eq!(crop, Rect::new(80.0, 90.0, 240.0, 120.0));
    }

    #[test]
    fn se_handle_grows_width_and_shrinks_height() {
        let start = Rect::new(10.0, 10.0, 100.0, 100.0);
        let moved = DragHandle::Se.apply(start, 50.0, -20.0);
        assert_eq!(moved, Rect::new(10.0, 10.0, 150.0, 80.0));

        let bounds = Rect::new(0.0, 0.0, 400.0, 400.0);
        let corrected = keep_crop_rect_in_image(moved, &bounds, 40.0);
        assert_eq!(corrected, Rect::new(10.0, 10.0, 150.0, 80.0));
    }

    #[test]
    fn nw_handle_moves_origin_and_shrinks() {
        let start = Rect::new(100.0, 100.0, 100.0, 100.0);
        let moved = DragHandle::Nw.apply(start, 20.0, 30.0);
        assert_eq!(moved, Rect::new(120.0, 130.0, 80.0, 70.0));
    }

    #[test]
    fn ne_and_sw_handles_mirror_each_other() {
        let start = Rect::new(100.0, 100.0, 100.0, 100.0);
        assert_eq!(
            DragHandle::Ne.apply(start, 10.0, 10.0),
            Rect::new(100.0, 110.0, 110.0, 90.0)
        );
        assert_eq!(
            DragHandle::Sw.apply(start, 10.0, 10.0),
            Rect::new(110.0, 100.0, 90.0, 110.0)
        );
    }

    #[test]
    fn keep_in_image_enforces_min_size() {
        let bounds = Rect::new(0.0, 0.0, 400.0, 400.0);
        let corrected = keep_crop_rect_in_image(Rect::new(50.0, 50.0, 5.0, -30.0), &bounds, 40.0);
        assert_eq!(corrected, Rect::new(50.0, 50.0, 40.0, 40.0));
    }

    #[test]
    fn keep_in_image_slides_position_before_shrinking() {
        let bounds = Rect::new(0.0, 50.0, 400.0, 200.0);
        let corrected = keep_crop_rect_in_image(Rect::new(350.0, 220.0, 100.0, 100.0), &bounds, 40.0);
        assert_eq!(corrected, Rect::new(300.0, 150.0, 100.0, 100.0));
    }

    #[test]
    fn keep_in_image_caps_size_to_bounds() {
        let bounds = Rect::new(0.0, 50.0, 400.0, 200.0);
        let corrected = keep_crop_rect_in_image(Rect::new(-20.0, 0.0, 900.0, 900.0), &bounds, 40.0);
        assert_eq!(corrected, bounds);
    }

    #[test]
    fn source_mapping_scales_and_rounds() {
        let draw = Rect::new(0.0, 50.0, 400.0, 200.0);
        let crop = Rect::new(80.0, 90.0, 240.0, 120.0);
        let pixels = crop_rect_to_source_pixels(&crop, &draw, 800, 400).expect("mapping expected");
        assert_eq!(pixels, PixelRect { x: 160, y: 80, width: 480, height: 240 });
    }

    #[test]
    fn source_mapping_of_full_draw_rect_covers_whole_image() {
        let draw = fit_image_rect(400.0, 300.0, 1023, 577).expect("rect expected");
        let pixels = crop_rect_to_source_pixels(&draw, &draw, 1023, 577).expect("mapping expected");
        assert_eq!(pixels, PixelRect { x: 0, y: 0, width: 1023, height: 577 });
    }

    #[test]
    fn handle_parsing_falls_back_to_move() {
        assert_eq!(DragHandle::from_element(Some("se")), DragHandle::Se);
        assert_eq!(DragHandle::from_element(Some("NW")), DragHandle::Nw);
        assert_eq!(DragHandle::from_element(Some("center")), DragHandle::Move);
        assert_eq!(DragHandle::from_element(None), DragHandle::Move);
    }

    #[test]
    fn viewport_point_is_made_local_to_drop_zone() {
        let point = Point::from_viewport(150.0, 220.0, 100.0, 200.0);
        assert_eq!(point, Point::new(50.0, 20.0));
    }
}
