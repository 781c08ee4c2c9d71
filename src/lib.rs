//! # 新标签页自定义 logo — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │              UI 层 / 脚本回放 (src/main.rs)               │
//! │                                                          │
//! │   拖放区 ── 预览画布 ── 裁剪框 ── 高度输入 ── 按钮       │
//! │       │  (LogoCommand JSON)                              │
//! └───────┼──────────────────────────────────────────────────┘
//!         ↕ dispatch → Result<EditorView, CommandError>
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕              核心 (Rust)                          │
//! │                                                          │
//! │  ┌─ error ────── AppError (统一错误类型)                  │
//! │  │                                                       │
//! │  ├─ logo_editor ─ 编辑会话 + 裁剪状态机 + 页面 logo       │
//! │  │   ├─ loader / pipeline   解码·校验·裁剪·缩放           │
//! │  │   └─ persistence         容量闸门·原子写入             │
//! │  │                                                       │
//! │  ├─ storage ──── LogoStore trait + 内存实现 + 容量估算     │
//! │  ├─ db ───────── SQLite (rusqlite) 键值存储               │
//! │  ├─ settings ─── settings.json → EditorConfig            │
//! │  └─ text ─────── 本地化文案表（英文兜底）                 │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError` |
//! | [`logo_editor`] | 上传、预览、裁剪、保存、应用页面 logo 的完整编辑流程 |
//! | [`storage`] | 持久化键值存储抽象与 UTF-16 容量估算 |
//! | [`db`] | 基于 SQLite 的持久化键值存储 |
//! | [`settings`] | 设置文件读写，失败回退默认值 |
//! | [`text`] | 编辑器文案表 |

pub mod error;
pub mod db;
pub mod logo_editor;
pub mod settings;
pub mod storage;
pub mod text;
