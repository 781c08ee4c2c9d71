//! # 新标签页自定义 logo — 命令回放入口
//!
//! 用法：`newtab-logo <store.db> <script.json> [settings.json] [messages.json]`
//!
//! `script.json` 为 `LogoCommand` 数组，逐条执行并把每条结果以一行 JSON 输出。
//! 命令失败不会中断回放，与页面上“弹出提示后继续操作”的行为一致。

use std::path::{Path, PathBuf};

use newtab_logo::db::SqliteStore;
use newtab_logo::error::AppError;
use newtab_logo::logo_editor::{dispatch, LogoCommand, LogoEditor};
use newtab_logo::settings;
use newtab_logo::text::LogoText;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run(std::env::args().skip(1).collect()).await {
        log::error!("❌ {}", err);
        std::process::exit(1);
    }
}

async fn run(args: Vec<String>) -> Result<(), AppError> {
    let [store_path, script_path, rest @ ..] = args.as_slice() else {
        return Err(AppError::Config(
            "用法: newtab-logo <store.db> <script.json> [settings.json] [messages.json]".to_string(),
        ));
    };

    let editor_settings = match rest.first() {
        Some(path) => settings::load_settings_from_path(Path::new(path)),
        None => settings::EditorSettings::default(),
    };
    let text = match rest.get(1) {
        Some(path) => LogoText::from_json_str(&tokio::fs::read_to_string(path).await?)?,
        None => LogoText::default(),
    };

    let store = SqliteStore::open(&PathBuf::from(store_path))?;
    let page_logo = editor_settings.page_logo();
    let mut editor = LogoEditor::new(store, page_logo, editor_settings.into_config(), text);
    log::info!("✅ 编辑器初始化完成 - 存储: {}", store_path);

    let script = tokio::fs::read_to_string(script_path).await?;
    let commands: Vec<LogoCommand> = serde_json::from_str(&script)
        .map_err(|e| AppError::Config(format!("解析命令脚本失败: {}", e)))?;

    for (index, command) in commands.into_iter().enumerate() {
        log::debug!("执行命令 #{}: {:?}", index, command);
        let reply = match dispatch(&mut editor, command).await {
            Ok(view) => serde_json::json!({ "index": index, "ok": true, "view": view }),
            Err(err) => {
                log::warn!("⚠️ 命令 #{} 失败: {} ({})", index, err.message, err.code);
                serde_json::json!({ "index": index, "ok": false, "error": err })
            }
        };
        println!("{}", reply);
    }

    Ok(())
}
