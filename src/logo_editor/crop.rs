//! # 裁剪交互状态机
//!
//! ## 状态
//!
//! ```text
//!            begin_drag (裁剪模式 + 裁剪框 + 绘制区域)
//!   idle ───────────────────────────────────────────▶ dragging
//!    ▲                                                   │ update_drag：基于起始快照 + 位移重算
//!    └──────────────── end_drag / cancel ────────────────┘
//! ```
//!
//! ## 设计思路
//!
//! - 拖拽中的每次更新都基于“按下时的矩形快照 + 总位移”计算，不累积误差。
//! - 每次写回裁剪框前都经过 [`keep_crop_rect_in_image`] 修正，
//!   因此任何时刻可见的裁剪框都满足包含与最小尺寸约束。
//! - 没有 `DragState` 时 `update_drag` 直接返回，窗口级指针事件可常驻注册。
//! - 取消拖拽只需清空 `DragState`，不会产生矩形写入。

use serde::Serialize;

use super::geometry::{centered_crop_rect, keep_crop_rect_in_image, DragHandle, Point, Rect};

/// 拖拽中的临时状态（按下到抬起之间有效）。
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DragState {
    pub mode: DragHandle,
    pub start_x: f64,
    pub start_y: f64,
    pub rect: Rect,
}

/// 裁剪框与拖拽状态
#[derive(Debug, Clone, Default)]
pub struct CropEngine {
    active: bool,
    crop_rect: Option<Rect>,
    drag: Option<DragState>,
}

impl CropEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn crop_rect(&self) -> Option<Rect> {
        self.crop_rect
    }

    pub fn drag_state(&self) -> Option<&DragState> {
        self.drag.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// 切换裁剪模式；退出时顺带结束未完成的拖拽。
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        if !active {
            self.drag = None;
        }
    }

    /// 将裁剪框重置为绘制区域内居中的 `ratio` 比例矩形。
    pub fn reset_to_center(&mut self, draw_rect: Option<&Rect>, ratio: f64, min_size: f64) {
        let Some(draw_rect) = draw_rect else {
            return;
        };
        let rect = centered_crop_rect(draw_rect, ratio);
        self.crop_rect = Some(keep_crop_rect_in_image(rect, draw_rect, min_size));
    }

    /// 按下指针开始拖拽。
    ///
    /// 需同时满足：裁剪模式开启、裁剪框存在、绘制区域存在；否则返回 `false`。
    pub fn begin_drag(&mut self, point: Point, handle: DragHandle, draw_rect: Option<&Rect>) -> bool {
        if !self.active || draw_rect.is_none() {
            return false;
        }
        let Some(rect) = self.crop_rect else {
            return false;
        };

        self.drag = Some(DragState {
            mode: handle,
            start_x: point.x,
            start_y: point.y,
            rect,
        });
        true
    }

    /// 指针移动：按手柄变换起始快照，修正后写回裁剪框。
    pub fn update_drag(&mut self, point: Point, draw_rect: Option<&Rect>, min_size: f64) -> Option<Rect> {
        let drag = self.drag?;
        let delta_x = point.x - drag.start_x;
        let delta_y = point.y - drag.start_y;

        let proposed = drag.mode.apply(drag.rect, delta_x, delta_y);
        let next = match draw_rect {
            Some(bounds) => keep_crop_rect_in_image(proposed, bounds, min_size),
            None => proposed,
        };

        self.crop_rect = Some(next);
        Some(next)
    }

    /// 指针抬起或取消：仅清空拖拽状态。
    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    /// 完全复位（清空图片或关闭弹窗时调用）。
    pub fn reset(&mut self) {
        self.active = false;
        self.crop_rect = None;
        self.drag = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with_rect(rect: Rect) -> CropEngine {
        CropEngine {
            active: true,
            crop_rect: Some(rect),
            drag: None,
        }
    }

    #[test]
    fn drag_requires_active_mode_and_draw_rect() {
        let bounds = Rect::new(0.0, 0.0, 400.0, 400.0);
        let mut engine = engine_with_rect(Rect::new(10.0, 10.0, 100.0, 100.0));

        assert!(!engine.begin_drag(Point::new(0.0, 0.0), DragHandle::Move, None));

        engine.set_active(false);
        assert!(!engine.begin_drag(Point::new(0.0, 0.0), DragHandle::Move, Some(&bounds)));

        engine.set_active(true);
        assert!(engine.begin_drag(Point::new(0.0, 0.0), DragHandle::Move, Some(&bounds)));
    }

    #[test]
    fn se_drag_scenario_resizes_from_snapshot() {
        let bounds = Rect::new(0.0, 0.0, 400.0, 400.0);
        let mut engine = engine_with_rect(Rect::new(10.0, 10.0, 100.0, 100.0));

        assert!(engine.begin_drag(Point::new(110.0, 110.0), DragHandle::Se, Some(&bounds)));
        engine.update_drag(Point::new(130.0, 100.0), Some(&bounds), 40.0);
        let rect = engine
            .update_drag(Point::new(160.0, 90.0), Some(&bounds), 40.0)
            .expect("rect updated");

        assert_eq!(rect, Rect::new(10.0, 10.0, 150.0, 80.0));
    }

    #[test]
    fn update_without_drag_is_noop() {
        let bounds = Rect::new(0.0, 0.0, 400.0, 400.0);
        let original = Rect::new(10.0, 10.0, 100.0, 100.0);
        let mut engine = engine_with_rect(original);

        assert!(engine.update_drag(Point::new(300.0, 300.0), Some(&bounds), 40.0).is_none());
        assert_eq!(engine.crop_rect(), Some(original));
    }

    #[test]
    fn move_drag_is_clamped_inside_bounds() {
        let bounds = Rect::new(0.0, 50.0, 400.0, 200.0);
        let mut engine = engine_with_rect(Rect::new(80.0, 90.0, 240.0, 120.0));

        engine.begin_drag(Point::new(100.0, 100.0), DragHandle::Move, Some(&bounds));
        let rect = engine
            .update_drag(Point::new(-500.0, 900.0), Some(&bounds), 40.0)
            .expect("rect updated");

        assert_eq!(rect, Rect::new(0.0, 130.0, 240.0, 120.0));
    }

    #[test]
    fn end_drag_keeps_rect() {
        let bounds = Rect::new(0.0, 0.0, 400.0, 400.0);
        let mut engine = engine_with_rect(Rect::new(10.0, 10.0, 100.0, 100.0));

        engine.begin_drag(Point::new(0.0, 0.0), DragHandle::Move, Some(&bounds));
        engine.update_drag(Point::new(5.0, 5.0), Some(&bounds), 40.0);
        engine.end_drag();

        assert!(!engine.is_dragging());
        assert_eq!(engine.crop_rect(), Some(Rect::new(15.0, 15.0, 100.0, 100.0)));
    }

    #[test]
    fn reset_to_center_uses_ratio() {
        let mut engine = CropEngine::new();
        engine.reset_to_center(Some(&Rect::new(0.0, 50.0, 400.0, 200.0)), 0.6, 40.0);
        assert_eq!(engine.crop_rect(), Some(Rect::new(80.0, 90.0, 240.0, 120.0)));

        let mut empty = CropEngine::new();
        empty.reset_to_center(None, 0.6, 40.0);
        assert!(empty.crop_rect().is_none());
    }
}
