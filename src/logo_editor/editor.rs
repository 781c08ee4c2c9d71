//! # 编辑会话模块
//!
//! ## 设计思路
//!
//! 所有编辑状态（源图、绘制区域、裁剪框、候选 Data URL、待处理解码）集中在
//! 一个 `LogoEditor` 实例中，由 UI 层逐条调用命令方法驱动，不使用任何全局变量。
//!
//! ## 弹窗生命周期
//!
//! ```text
//! closed ──open──▶ open(editing) ──close / escape / confirm 成功 / reset──▶ closed
//! ```
//!
//! - `open`：总是从干净的编辑状态开始，高度输入重置为 90
//! - `close`：重新应用已持久化的 logo，丢弃未确认的修改
//! - `reset`：删除持久化记录并恢复页面自带 logo
//! - `clear`：只清空编辑中的图片与裁剪，不动存储
//!
//! ## 异步解码
//!
//! 每次载入分配单调递增的令牌。完成时令牌必须与当前待处理令牌一致，
//! 否则视为过期结果直接丢弃。关闭、清空都会作废待处理令牌。

use serde::Serialize;

use crate::storage::LogoStore;
use crate::text::LogoText;

use super::canvas::PreviewCanvas;
use super::crop::CropEngine;
use super::geometry::{crop_rect_to_source_pixels, DragHandle, Point, Rect};
use super::loader;
use super::page_logo::PageLogo;
use super::persistence::{self, PersistedLogo};
use super::pipeline;
use super::source::{DecodeTicket, LogoFile, SourceImage};
use super::{EditorConfig, EditorError};

/// 一次载入请求的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadOutcome {
    /// 非图片文件，静默忽略
    Ignored,
    /// 新图片已成为当前源图
    Applied,
    /// 解码完成时已有更新的请求，结果被丢弃
    Stale,
}

/// 确认保存的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SaveOutcome {
    /// 没有候选图片或确认按钮不可用
    Skipped,
    Saved { height: u32 },
}

/// 编辑器的可观察快照，供 UI 层同步界面。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorView {
    pub modal_open: bool,
    pub loading: bool,
    pub hint_visible: bool,
    pub natural_size: Option<(u32, u32)>,
    pub draw_rect: Option<Rect>,
    pub crop_active: bool,
    pub crop_rect: Option<Rect>,
    pub dragging: bool,
    pub confirm_enabled: bool,
    pub height_input: String,
    pub height_label: String,
    pub crop_button_label: String,
    pub page_logo_src: String,
    pub page_logo_custom: bool,
    pub page_logo_style: String,
}

/// logo 编辑器
pub struct LogoEditor<S: LogoStore> {
    config: EditorConfig,
    text: LogoText,
    store: S,
    page_logo: PageLogo,
    canvas: PreviewCanvas,
    crop: CropEngine,
    source: Option<SourceImage>,
    draw_rect: Option<Rect>,
    data_url: Option<String>,
    next_token: u64,
    pending_token: Option<u64>,
    modal_open: bool,
    height_input: String,
    confirm_enabled: bool,
}

impl<S: LogoStore> LogoEditor<S> {
    /// 创建编辑器，并立即把已保存的自定义 logo 应用到页面。
    pub fn new(store: S, page_logo: PageLogo, config: EditorConfig, text: LogoText) -> Self {
        let canvas_width = config.canvas_width.min(config.max_canvas_side);
        let canvas_height = config.canvas_height.min(config.max_canvas_side);
        if (canvas_width, canvas_height) != (config.canvas_width, config.canvas_height) {
            log::warn!(
                "⚠️ 画布尺寸 {}x{} 超出单边限制 {}，已收敛为 {}x{}",
                config.canvas_width,
                config.canvas_height,
                config.max_canvas_side,
                canvas_width,
                canvas_height
            );
        }
        let canvas = PreviewCanvas::new(canvas_width, canvas_height, config.dark_mode);
        let height_input = config.default_modal_height.to_string();

        let mut editor = Self {
            config,
            text,
            store,
            page_logo,
            canvas,
            crop: CropEngine::new(),
            source: None,
            draw_rect: None,
            data_url: None,
            next_token: 0,
            pending_token: None,
            modal_open: false,
            height_input,
            confirm_enabled: false,
        };
        editor.restore_custom_page_logo();
        editor
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn text(&self) -> &LogoText {
        &self.text
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn page_logo(&self) -> &PageLogo {
        &self.page_logo
    }

    pub fn canvas(&self) -> &PreviewCanvas {
        &self.canvas
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    pub fn draw_rect(&self) -> Option<Rect> {
        self.draw_rect
    }

    pub fn crop_rect(&self) -> Option<Rect> {
        self.crop.crop_rect()
    }

    pub fn candidate_data_url(&self) -> Option<&str> {
        self.data_url.as_deref()
    }

    pub fn is_modal_open(&self) -> bool {
        self.modal_open
    }

    pub fn is_loading(&self) -> bool {
        self.pending_token.is_some()
    }

    pub fn is_crop_active(&self) -> bool {
        self.crop.is_active()
    }

    pub fn height_input(&self) -> &str {
        &self.height_input
    }

    pub fn is_confirm_enabled(&self) -> bool {
        self.confirm_enabled
    }

    // ------------------------------------------------------------------
    // 弹窗
    // ------------------------------------------------------------------

    /// 打开弹窗；可重复调用，每次都从干净状态开始。
    pub fn open_logo_modal(&mut self) {
        self.reset_session();
        self.modal_open = true;
        self.height_input = self.config.default_modal_height.to_string();
        log::debug!("打开 logo 弹窗");
    }

    /// 关闭弹窗：丢弃未确认的编辑，重新应用已保存的 logo。
    pub fn close_logo_modal(&mut self) {
        self.restore_custom_page_logo();
        self.modal_open = false;
        self.reset_session();
        self.height_input = self.config.default_modal_height.to_string();
        log::debug!("关闭 logo 弹窗");
    }

    /// Escape 键：仅在弹窗打开时关闭，返回是否处理。
    pub fn handle_escape(&mut self) -> bool {
        if !self.modal_open {
            return false;
        }
        self.close_logo_modal();
        true
    }

    /// 删除已保存的 logo，恢复页面自带 logo 并关闭弹窗。
    pub fn reset_logo(&mut self) -> Result<(), EditorError> {
        persistence::clear_logo(&mut self.store)?;
        log::info!("🗑️ 已删除自定义 logo");
        self.close_logo_modal();
        Ok(())
    }

    /// 清空编辑中的图片与裁剪状态，不触碰存储。
    pub fn clear_editor(&mut self) {
        self.reset_session();
    }

    // ------------------------------------------------------------------
    // 载入
    // ------------------------------------------------------------------

    /// 载入文件：非图片静默忽略，图片异步解码后成为当前源图。
    pub async fn load_file(&mut self, file: LogoFile) -> Result<LoadOutcome, EditorError> {
        let Some(mime_type) = loader::accepted_mime_type(&file) else {
            log::debug!("忽略非图片文件: {}", file.name);
            return Ok(LoadOutcome::Ignored);
        };

        log::info!("📥 载入图片 {} ({}，{} 字节)", file.name, mime_type, file.bytes.len());
        let ticket = self.begin_load(loader::encode_data_url(&mime_type, &file.bytes));
        let result = loader::decode_data_url(ticket.data_url(), &self.config).await;
        self.finish_load(ticket, result)
    }

    /// 登记一次解码请求，此后更早的请求全部过期。
    pub fn begin_load(&mut self, data_url: String) -> DecodeTicket {
        self.next_token += 1;
        self.pending_token = Some(self.next_token);
        DecodeTicket {
            token: self.next_token,
            data_url,
        }
    }

    /// 处理解码完成。
    ///
    /// 过期结果返回 `Stale` 且不改动任何状态；解码失败结束加载态，
    /// 之前的图片与裁剪状态保持不变。
    pub fn finish_load(
        &mut self,
        ticket: DecodeTicket,
        result: Result<SourceImage, EditorError>,
    ) -> Result<LoadOutcome, EditorError> {
        if self.pending_token != Some(ticket.token) {
            log::debug!("丢弃过期的解码结果 (令牌 {})", ticket.token);
            return Ok(LoadOutcome::Stale);
        }
        self.pending_token = None;

        let source = result.map_err(|err| {
            log::warn!("⚠️ 图片解码失败，保留之前的编辑状态: {}", err);
            err
        })?;

        self.crop.reset();
        self.source = Some(source);
        self.data_url = Some(ticket.data_url);
        self.redraw();
        self.confirm_enabled = true;
        Ok(LoadOutcome::Applied)
    }

    // ------------------------------------------------------------------
    // 裁剪
    // ------------------------------------------------------------------

    /// 进入裁剪模式，裁剪框重置为居中矩形。
    pub fn begin_crop(&mut self) -> Result<(), EditorError> {
        if self.source.is_none() || self.draw_rect.is_none() {
            return Err(EditorError::NoImage);
        }
        self.crop.set_active(true);
        self.reset_crop_box();
        Ok(())
    }

    /// 在裁剪框上按下指针（画布局部坐标）。
    pub fn begin_drag(&mut self, point: Point, handle: DragHandle) -> bool {
        self.crop.begin_drag(point, handle, self.draw_rect.as_ref())
    }

    pub fn update_drag(&mut self, point: Point) -> Option<Rect> {
        self.crop
            .update_drag(point, self.draw_rect.as_ref(), self.config.min_crop_size)
    }

    pub fn end_drag(&mut self) {
        self.crop.end_drag();
    }

    /// 确认裁剪：用裁剪结果替换源图与候选 Data URL，并退出裁剪模式。
    pub fn confirm_crop(&mut self) -> Result<(), EditorError> {
        let Some(source) = self.source.as_ref() else {
            return Err(EditorError::NoImage);
        };
        let (Some(crop_rect), Some(draw_rect)) = (self.crop.crop_rect(), self.draw_rect) else {
            return Ok(());
        };
        if !self.crop.is_active() {
            return Ok(());
        }

        let Some(region) = crop_rect_to_source_pixels(
            &crop_rect,
            &draw_rect,
            source.natural_width(),
            source.natural_height(),
        ) else {
            return Ok(());
        };

        log::debug!(
            "裁剪映射: 画布 ({:.1}, {:.1}, {:.1}x{:.1}) → 像素 ({}, {}, {}x{})",
            crop_rect.x,
            crop_rect.y,
            crop_rect.width,
            crop_rect.height,
            region.x,
            region.y,
            region.width,
            region.height
        );

        let (cropped, data_url) = pipeline::crop_source(source, region)?;
        self.source = Some(cropped);
        self.data_url = Some(data_url);
        self.redraw();
        self.reset_crop_box();
        self.crop.set_active(false);
        log::info!("✂️ 裁剪完成 - 尺寸: {}x{}", region.width, region.height);
        Ok(())
    }

    // ------------------------------------------------------------------
    // 保存
    // ------------------------------------------------------------------

    pub fn set_height_input(&mut self, value: impl Into<String>) {
        self.height_input = value.into();
    }

    /// 确认保存：容量检查 → 原子写入 → 应用到页面 → 关闭弹窗。
    ///
    /// 超限或写入失败时弹窗保持打开，存储保持写入前的状态。
    pub fn confirm_logo(&mut self) -> Result<SaveOutcome, EditorError> {
        if !self.confirm_enabled {
            return Ok(SaveOutcome::Skipped);
        }
        let Some(data_url) = self.data_url.clone() else {
            return Ok(SaveOutcome::Skipped);
        };

        persistence::check_quota(&self.store, &data_url, self.config.storage_limit_bytes)?;

        let height = persistence::resolve_display_height(&self.height_input, self.page_logo.default_height());
        self.height_input = height.to_string();

        let logo = PersistedLogo {
            data_url,
            display_height_px: height,
        };
        persistence::commit_logo(&mut self.store, &logo).map_err(|err| {
            log::error!("❌ 保存 logo 失败: {}", err);
            EditorError::SaveFailed(err.to_string())
        })?;

        self.page_logo.apply(&logo.data_url, height);
        if let Some(source) = self.source.as_ref() {
            self.page_logo.on_load(source.natural_width(), source.natural_height());
        }
        log::info!("✅ 自定义 logo 已保存 - 高度: {}px", height);

        self.modal_open = false;
        self.reset_session();
        self.height_input = self.config.default_modal_height.to_string();
        Ok(SaveOutcome::Saved { height })
    }

    // ------------------------------------------------------------------
    // 画布
    // ------------------------------------------------------------------

    /// 同步画布客户区尺寸并重绘；裁剪框按新的绘制区域重新居中。
    ///
    /// 超出单边限制时返回 `ResourceLimit`，画布与裁剪状态不变。
    pub fn set_canvas_size(&mut self, width: u32, height: u32) -> Result<(), EditorError> {
        self.canvas.resize(width, height, self.config.max_canvas_side)?;
        self.redraw();
        if self.draw_rect.is_none() {
            self.crop.set_active(false);
        } else if self.crop.crop_rect().is_some() {
            self.reset_crop_box();
        }
        Ok(())
    }

    /// 宿主在页面 logo 解码完成时回调。
    pub fn on_page_logo_load(&mut self, natural_width: u32, natural_height: u32) {
        self.page_logo.on_load(natural_width, natural_height);
    }

    pub fn set_dark_mode(&mut self, dark_mode: bool) {
        self.canvas.set_dark_mode(dark_mode);
        self.redraw();
    }

    /// 当前状态快照
    pub fn view(&self) -> EditorView {
        let has_image = self.source.is_some();
        EditorView {
            modal_open: self.modal_open,
            loading: self.is_loading(),
            hint_visible: !has_image && !self.is_loading(),
            natural_size: self
                .source
                .as_ref()
                .map(|source| (source.natural_width(), source.natural_height())),
            draw_rect: self.draw_rect,
            crop_active: self.crop.is_active(),
            crop_rect: self.crop.crop_rect(),
            dragging: self.crop.is_dragging(),
            confirm_enabled: self.confirm_enabled,
            height_input: self.height_input.clone(),
            height_label: self.text.height_default_label(self.config.default_modal_height),
            crop_button_label: if self.crop.is_active() {
                self.text.crop_confirm.clone()
            } else {
                self.text.crop.clone()
            },
            page_logo_src: self.page_logo.src().to_string(),
            page_logo_custom: !self.page_logo.is_default(),
            page_logo_style: self.page_logo.style().css_text(),
        }
    }

    // ------------------------------------------------------------------
    // 内部
    // ------------------------------------------------------------------

    fn redraw(&mut self) {
        self.draw_rect = self.canvas.draw(self.source.as_ref(), self.config.resize_filter());
    }

    fn reset_crop_box(&mut self) {
        self.crop.reset_to_center(
            self.draw_rect.as_ref(),
            self.config.crop_reset_ratio,
            self.config.min_crop_size,
        );
    }

    /// 清空编辑状态并作废待处理的解码。
    fn reset_session(&mut self) {
        self.crop.reset();
        self.source = None;
        self.data_url = None;
        self.pending_token = None;
        self.confirm_enabled = false;
        self.redraw();
    }

    /// 应用已保存的自定义 logo；没有或无效时恢复页面自带 logo。
    fn restore_custom_page_logo(&mut self) {
        let fallback_height = self.page_logo.default_height();
        let persisted = match persistence::load_persisted_logo(&self.store, fallback_height) {
            Ok(persisted) => persisted,
            Err(err) => {
                log::error!("❌ 读取自定义 logo 失败: {}", err);
                None
            }
        };

        let Some(logo) = persisted else {
            self.page_logo.restore_default();
            return;
        };

        self.page_logo.apply(&logo.data_url, logo.display_height_px);
        if self.page_logo.natural_size().is_some() {
            // 同一张图的尺寸已知，无需再次解析 Data URL
            return;
        }
        match read_natural_size(&logo.data_url, &self.config) {
            Ok((width, height)) => self.page_logo.on_load(width, height),
            Err(err) => log::warn!("⚠️ 无法读取已保存 logo 的尺寸，宽度保持 auto: {}", err),
        }
    }
}

/// 读取 Data URL 图片的自然尺寸（只解析 header）。
fn read_natural_size(data_url: &str, config: &EditorConfig) -> Result<(u32, u32), EditorError> {
    let bytes = loader::parse_data_url(data_url, config.max_file_size)?;
    pipeline::inspect_dimensions(&bytes)
}
