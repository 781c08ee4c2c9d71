//! # 命令层
//!
//! UI 层（或脚本回放）以 JSON 命令驱动编辑器，每条命令返回最新的 [`EditorView`]；
//! 失败时返回带稳定错误码与本地化提示的 [`CommandError`]。

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::storage::LogoStore;

use super::editor::{EditorView, LogoEditor};
use super::geometry::{DragHandle, Point};
use super::source::LogoFile;
use super::EditorError;

/// 编辑器命令
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum LogoCommand {
    Open,
    Close,
    Escape,
    Reset,
    Clear,
    /// 从磁盘读取文件，模拟文件选择器 / 拖放
    LoadFile {
        path: PathBuf,
        #[serde(default)]
        mime: Option<String>,
    },
    BeginCrop,
    /// 坐标为视口坐标；`zone_left` / `zone_top` 为拖放区域左上角
    BeginDrag {
        x: f64,
        y: f64,
        #[serde(default)]
        handle: Option<String>,
        #[serde(default)]
        zone_left: f64,
        #[serde(default)]
        zone_top: f64,
    },
    UpdateDrag {
        x: f64,
        y: f64,
        #[serde(default)]
        zone_left: f64,
        #[serde(default)]
        zone_top: f64,
    },
    EndDrag,
    ConfirmCrop,
    SetHeight { value: String },
    SetCanvasSize { width: u32, height: u32 },
    SetDarkMode { enabled: bool },
    Confirm,
}

/// 命令失败时返回给 UI 的错误
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandError {
    pub code: String,
    pub message: String,
}

impl CommandError {
    fn from_editor<S: LogoStore>(editor: &LogoEditor<S>, err: &EditorError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.user_message(editor.text()),
        }
    }

    fn io(err: std::io::Error) -> Self {
        Self {
            code: "E_IO".to_string(),
            message: err.to_string(),
        }
    }
}

/// 执行一条命令并返回最新快照。
pub async fn dispatch<S: LogoStore>(
    editor: &mut LogoEditor<S>,
    command: LogoCommand,
) -> Result<EditorView, CommandError> {
    let result = match command {
        LogoCommand::Open => {
            editor.open_logo_modal();
            Ok(())
        }
        LogoCommand::Close => {
            editor.close_logo_modal();
            Ok(())
        }
        LogoCommand::Escape => {
            editor.handle_escape();
            Ok(())
        }
        LogoCommand::Reset => editor.reset_logo(),
        LogoCommand::Clear => {
            editor.clear_editor();
            Ok(())
        }
        LogoCommand::LoadFile { path, mime } => {
            let bytes = tokio::fs::read(&path).await.map_err(CommandError::io)?;
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            editor
                .load_file(LogoFile::new(name, mime.as_deref(), bytes))
                .await
                .map(|_| ())
        }
        LogoCommand::BeginCrop => editor.begin_crop(),
        LogoCommand::BeginDrag {
            x,
            y,
            handle,
            zone_left,
            zone_top,
        } => {
            let point = Point::from_viewport(x, y, zone_left, zone_top);
            editor.begin_drag(point, DragHandle::from_element(handle.as_deref()));
            Ok(())
        }
        LogoCommand::UpdateDrag {
            x,
            y,
            zone_left,
            zone_top,
        } => {
            editor.update_drag(Point::from_viewport(x, y, zone_left, zone_top));
            Ok(())
        }
        LogoCommand::EndDrag => {
            editor.end_drag();
            Ok(())
        }
        LogoCommand::ConfirmCrop => editor.confirm_crop(),
        LogoCommand::SetHeight { value } => {
            editor.set_height_input(value);
            Ok(())
        }
        LogoCommand::SetCanvasSize { width, height } => editor.set_canvas_size(width, height),
        LogoCommand::SetDarkMode { enabled } => {
            editor.set_dark_mode(enabled);
            Ok(())
        }
        LogoCommand::Confirm => editor.confirm_logo().map(|_| ()),
    };

    match result {
        Ok(()) => Ok(editor.view()),
        Err(err) => Err(CommandError::from_editor(editor, &err)),
    }
}
