//! # logo 编辑器模块（logo_editor）
//!
//! ## 设计思路
//!
//! 新标签页自定义 logo 的完整链路：“选择/拖放图片 → 预览 → 裁剪 → 设定高度 → 持久化 → 应用到页面”。
//! 按职责拆分为多个子模块，编辑会话本身是一个显式的状态对象，由命令驱动。
//!
//! - `commands`：JSON 命令适配（薄封装）
//! - `editor`：编辑会话，编排整条流程与弹窗生命周期
//! - `loader`：MIME 判定、Data URL 编解码、异步解码（带超时与令牌）
//! - `pipeline`：签名校验、像素限制、裁剪与 PNG 重新编码、预览缩放
//! - `canvas`：预览画布与信箱式绘制
//! - `crop`：裁剪框拖拽状态机
//! - `geometry`：纯几何计算（绘制区域、裁剪框修正、坐标映射）
//! - `persistence`：容量闸门与两条记录的原子写入
//! - `page_logo`：页面 logo 元素的尺寸与样式
//! - `config/error/source`：配置、错误、中间数据模型
//!
//! ## 新同事快速上手
//!
//! ```text
//! LogoCommand (JSON)
//!    ↓
//! commands.rs（参数适配 + 错误本地化）
//!    ↓
//! editor.rs（状态机 + 编排）
//!    ├─ loader.rs → pipeline.rs（解码）
//!    ├─ canvas.rs + crop.rs + geometry.rs（预览与裁剪）
//!    ├─ persistence.rs → storage / db（写入）
//!    └─ page_logo.rs（应用到页面）
//!    ↓
//! EditorView / CommandError
//! ```

pub mod commands;
mod canvas;
mod config;
mod crop;
mod editor;
mod error;
pub mod geometry;
pub mod loader;
pub mod page_logo;
pub mod persistence;
pub mod pipeline;
mod source;

pub use canvas::PreviewCanvas;
pub use commands::{dispatch, CommandError, LogoCommand};
pub use config::{EditorConfig, PreviewQuality};
pub use crop::{CropEngine, DragState};
pub use editor::{EditorView, LoadOutcome, LogoEditor, SaveOutcome};
pub use error::EditorError;
pub use geometry::{DragHandle, PixelRect, Point, Rect};
pub use page_logo::{LogoStyle, LogoWidth, PageLogo};
pub use persistence::PersistedLogo;
pub use source::{DecodeTicket, LogoFile, SourceImage};
