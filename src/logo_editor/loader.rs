//! # 加载与校验模块
//!
//! ## 设计思路
//!
//! 统一处理文件选择器与拖放两种来源：先判定是否为图片，再编码为 Data URL，
//! 最后异步解码。目标是尽快失败，减少不必要的内存与 CPU 消耗。
//!
//! ## 实现思路
//!
//! - MIME 判定：有声明类型时只接受 `image/` 前缀；没有声明时用 `infer` 嗅探文件签名。
//!   非图片文件静默忽略（返回 `None`），不产生错误。
//! - Data URL：`data:<mime>;base64,<payload>`，解析时先估算解码后体积再真正解码。
//! - 解码：放到阻塞线程池执行，并套上超时。损坏的图片得到明确的错误或超时，
//!   不会让界面卡在“加载中”。

use base64::{Engine as _, engine::general_purpose};

use super::pipeline;
use super::source::{LogoFile, SourceImage};
use super::{EditorConfig, EditorError};

const DATA_URL_PREFIX: &str = "data:";
const IMAGE_DATA_URL_PREFIX: &str = "data:image/";
const BASE64_MARKER: &str = ";base64,";

/// 判定文件是否可作为 logo 载入，返回其 MIME 类型。
///
/// - 声明类型以 `image/` 开头：接受
/// - 声明了其他类型：忽略
/// - 未声明类型：按文件签名嗅探，仅接受图片签名
pub fn accepted_mime_type(file: &LogoFile) -> Option<String> {
    match file.mime_type.as_deref().map(str::trim) {
        Some(declared) if !declared.is_empty() => {
            let declared = declared.to_ascii_lowercase();
            declared.starts_with("image/").then_some(declared)
        }
        _ => {
            let kind = infer::get(&file.bytes)?;
            if kind.matcher_type() != infer::MatcherType::Image {
                return None;
            }
            log::debug!("🔍 文件 {} 未声明类型，按签名识别为 {}", file.name, kind.mime_type());
            Some(kind.mime_type().to_string())
        }
    }
}

/// 将原始字节编码为 Data URL。
pub fn encode_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!(
        "{}{}{}{}",
        DATA_URL_PREFIX,
        mime_type,
        BASE64_MARKER,
        general_purpose::STANDARD.encode(bytes)
    )
}

/// 是否为可作为页面 logo 的图片 Data URL。
pub fn is_image_data_url(value: &str) -> bool {
    value.starts_with(IMAGE_DATA_URL_PREFIX)
}

/// 解析 Data URL 中的 base64 负载，超过 `max_size` 时在解码前拒绝。
pub fn parse_data_url(data_url: &str, max_size: u64) -> Result<Vec<u8>, EditorError> {
    let normalized = data_url.trim();
    if !normalized.starts_with(DATA_URL_PREFIX) {
        return Err(EditorError::InvalidFormat("不是 Data URL".to_string()));
    }

    let base64_start = normalized
        .find(BASE64_MARKER)
        .ok_or_else(|| EditorError::InvalidFormat("缺少 base64 标记".to_string()))?;
    let payload = &normalized[base64_start + BASE64_MARKER.len()..];

    let estimated_len = estimate_base64_decoded_upper_bound_len(payload)?;
    if estimated_len > max_size {
        return Err(EditorError::ResourceLimit(format!(
            "图片预计解码体积过大：{:.2} MB（限制：{:.2} MB）",
            estimated_len as f64 / 1024.0 / 1024.0,
            max_size as f64 / 1024.0 / 1024.0
        )));
    }

    general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| EditorError::Decode(format!("Base64 解码失败：{}", e)))
}

fn estimate_base64_decoded_upper_bound_len(payload: &str) -> Result<u64, EditorError> {
    let len = payload.trim().len() as u64;
    let groups = len
        .checked_add(3)
        .ok_or_else(|| EditorError::ResourceLimit("Base64 输入长度溢出".to_string()))?
        / 4;

    groups
        .checked_mul(3)
        .ok_or_else(|| EditorError::ResourceLimit("Base64 解码体积估算溢出".to_string()))
}

/// 异步解码 Data URL。
///
/// 解码在阻塞线程池中进行；超过 `decode_timeout_ms` 返回 `Timeout`，
/// 后台任务继续运行但其结果被丢弃。
pub async fn decode_data_url(data_url: &str, config: &EditorConfig) -> Result<SourceImage, EditorError> {
    let data_url = data_url.to_string();
    let limits = config.clone();
    let timeout = config.decode_timeout();

    let task = tokio::task::spawn_blocking(move || {
        let bytes = parse_data_url(&data_url, limits.max_file_size)?;
        pipeline::decode_source_image(&bytes, &limits)
    });

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(EditorError::Decode(format!("解码任务异常退出：{}", join_err))),
        Err(_) => Err(EditorError::Timeout(format!(
            "图片解码超时（{} 毫秒）",
            timeout.as_millis()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logo_editor::pipeline::tests::png_bytes;

    #[test]
    fn declared_image_type_is_accepted() {
        let file = LogoFile::new("a.png", Some("image/PNG"), vec![1, 2, 3]);
        assert_eq!(accepted_mime_type(&file).as_deref(), Some("image/png"));
    }

    #[test]
    fn declared_non_image_type_is_ignored() {
        let file = LogoFile::new("a.txt", Some("text/plain"), png_bytes(4, 4));
        assert_eq!(accepted_mime_type(&file), None);
    }

    #[test]
    fn missing_type_is_sniffed_from_signature() {
        let png = LogoFile::new("blob", None, png_bytes(4, 4));
        assert_eq!(accepted_mime_type(&png).as_deref(), Some("image/png"));

        let html = LogoFile::new("blob", Some(""), b"<html><body>nope</body></html>".to_vec());
        assert_eq!(accepted_mime_type(&html), None);
    }

    #[test]
    fn data_url_encode_then_parse() {
        let bytes = png_bytes(3, 2);
        let url = encode_data_url("image/png", &bytes);

        assert!(url.starts_with("data:image/png;base64,"));
        assert!(is_image_data_url(&url));
        assert_eq!(parse_data_url(&url, u64::MAX).expect("parse"), bytes);
    }

    #[test]
    fn parse_rejects_large_payload_before_decode() {
        let url = format!("data:image/png;base64,{}", "A".repeat(1024 * 1024));
        assert!(matches!(parse_data_url(&url, 32), Err(EditorError::ResourceLimit(_))));
    }

    #[test]
    fn parse_rejects_missing_marker() {
        assert!(matches!(
            parse_data_url("data:image/png,AAAA", u64::MAX),
            Err(EditorError::InvalidFormat(_))
        ));
        assert!(!is_image_data_url("not-a-data-url"));
    }

    #[tokio::test]
    async fn decode_data_url_returns_natural_size() {
        let url = encode_data_url("image/png", &png_bytes(12, 7));
        let image = decode_data_url(&url, &EditorConfig::default()).await.expect("decode");

        assert_eq!((image.natural_width(), image.natural_height()), (12, 7));
    }

    #[tokio::test]
    async fn decode_data_url_reports_corrupt_image() {
        let mut bytes = png_bytes(12, 7);
        bytes.truncate(20);
        let url = encode_data_url("image/png", &bytes);

        let result = decode_data_url(&url, &EditorConfig::default()).await;
        assert!(result.is_err());
    }
}
