//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部输入”和“编辑会话内的中间结果”解耦：
//! - `LogoFile` 表示文件选择器或拖放得到的原始文件
//! - `DecodeTicket` 表示一次尚未完成的解码请求（带单调递增令牌）
//! - `SourceImage` 表示已解码的位图，由编辑会话独占

use image::DynamicImage;

/// 文件选择器 / 拖放事件交付的文件。
#[derive(Debug, Clone)]
pub struct LogoFile {
    /// 文件名（仅用于日志）。
    pub name: String,
    /// 浏览器声明的 MIME 类型；为空时按文件签名嗅探。
    pub mime_type: Option<String>,
    /// 文件内容。
    pub bytes: Vec<u8>,
}

impl LogoFile {
    pub fn new(name: impl Into<String>, mime_type: Option<&str>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.map(str::to_string),
            bytes,
        }
    }
}

/// 解码请求凭据。
///
/// 完成回调必须携带同一令牌，令牌与当前待处理请求不一致即视为过期结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeTicket {
    pub(crate) token: u64,
    pub(crate) data_url: String,
}

impl DecodeTicket {
    pub fn data_url(&self) -> &str {
        &self.data_url
    }
}

/// 已解码的源图。
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub(crate) image: DynamicImage,
}

impl SourceImage {
    pub fn new(image: DynamicImage) -> Self {
        Self { image }
    }

    pub fn natural_width(&self) -> u32 {
        self.image.width()
    }

    pub fn natural_height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }
}
