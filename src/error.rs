//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `AppError` 枚举，承接编辑器、存储、配置与文件 I/O 的错误，
//! 替代分散的 `.map_err(|e| e.to_string())` 与 `expect()`。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `EditorError` / `StoreError` 提供 `From` 转换，调用侧直接 `?`。
//! - 实现 `Serialize` 将错误序列化为字符串，便于命令回执输出。

use serde::Serialize;

use crate::logo_editor::EditorError;
use crate::storage::StoreError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 编辑器流程错误（加载 / 裁剪 / 保存）
    #[error("{0}")]
    Editor(#[from] EditorError),

    /// 键值存储读写失败
    #[error("存储错误: {0}")]
    Store(#[from] StoreError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 配置或文案文件无效
    #[error("配置错误: {0}")]
    Config(String),
}

/// 将错误序列化为人类可读的字符串。
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
