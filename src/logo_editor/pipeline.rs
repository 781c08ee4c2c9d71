//! # 解码与变换流水线模块
//!
//! ## 设计思路
//!
//! 将“字节 → 位图 → 裁剪 → PNG Data URL”的过程集中管理，并在关键节点增加资源上限控制。
//! 优先读 header 做尺寸检查，再完整解码，降低恶意输入触发高内存开销的风险。
//!
//! ## 实现思路
//!
//! 1. 文件签名校验（`infer`）
//! 2. 读取 header 尺寸并按像素上限快速拒绝
//! 3. 完整解码
//! 4. 裁剪时按原图像素区域取子图，重新编码为 PNG
//! 5. 预览缩放优先走 `fast_image_resize`，失败回退 `image::resize_exact`

use std::io::Cursor;

use base64::{Engine as _, engine::general_purpose};
use fast_image_resize as fr;
use image::imageops::FilterType;
use image::{DynamicImage, ImageBuffer, ImageFormat, ImageReader, Rgba, RgbaImage};

use super::geometry::PixelRect;
use super::source::SourceImage;
use super::{EditorConfig, EditorError};

/// 校验字节并解码为源图。
pub(crate) fn decode_source_image(bytes: &[u8], config: &EditorConfig) -> Result<SourceImage, EditorError> {
    validate_image_signature(bytes)?;

    if bytes.len() as u64 > config.max_file_size {
        return Err(EditorError::ResourceLimit(format!(
            "文件过大：{:.2} MB（限制：{:.2} MB）",
            bytes.len() as f64 / 1024.0 / 1024.0,
            config.max_file_size as f64 / 1024.0 / 1024.0
        )));
    }

    let (header_width, header_height) = inspect_dimensions(bytes)?;
    validate_pixel_limits(config, header_width, header_height)?;

    let decoded = image::load_from_memory(bytes)
        .map_err(|e| EditorError::Decode(format!("图片解码失败：{}", e)))?;

    if decoded.width() == 0 || decoded.height() == 0 {
        return Err(EditorError::Decode("图片尺寸为 0".to_string()));
    }
    validate_pixel_limits(config, decoded.width(), decoded.height())?;

    log::info!(
        "✅ 图片解码成功 - 尺寸: {}x{}",
        decoded.width(),
        decoded.height()
    );

    Ok(SourceImage::new(decoded))
}

/// 仅通过图片头信息读取宽高。
pub fn inspect_dimensions(bytes: &[u8]) -> Result<(u32, u32), EditorError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| EditorError::InvalidFormat(format!("无法识别图片格式：{}", e)))?;

    reader
        .into_dimensions()
        .map_err(|e| EditorError::InvalidFormat(format!("无法读取图片尺寸：{}", e)))
}

fn validate_pixel_limits(config: &EditorConfig, width: u32, height: u32) -> Result<(), EditorError> {
    let pixels = (width as u64)
        .checked_mul(height as u64)
        .ok_or_else(|| EditorError::ResourceLimit("图片像素数溢出".to_string()))?;

    if pixels > config.max_decoded_pixels {
        return Err(EditorError::ResourceLimit(format!(
            "图片像素过大：{} 像素（限制：{} 像素）",
            pixels, config.max_decoded_pixels
        )));
    }

    Ok(())
}

/// 通过文件签名（magic bytes）校验输入是否为图片。
fn validate_image_signature(bytes: &[u8]) -> Result<(), EditorError> {
    if bytes.is_empty() {
        return Err(EditorError::InvalidFormat("图片内容为空".to_string()));
    }

    let kind = infer::get(bytes)
        .ok_or_else(|| EditorError::InvalidFormat("无法识别图片类型".to_string()))?;

    if kind.matcher_type() != infer::MatcherType::Image {
        return Err(EditorError::InvalidFormat(format!(
            "文件签名不是图片类型：{}",
            kind.mime_type()
        )));
    }

    Ok(())
}

/// 按原图像素区域裁剪，返回新源图及其 PNG Data URL。
pub(crate) fn crop_source(source: &SourceImage, region: PixelRect) -> Result<(SourceImage, String), EditorError> {
    let cropped = source
        .image()
        .crop_imm(region.x, region.y, region.width, region.height);

    if cropped.width() == 0 || cropped.height() == 0 {
        return Err(EditorError::Decode("裁剪结果为空".to_string()));
    }

    let data_url = encode_png_data_url(&cropped)?;
    Ok((SourceImage::new(cropped), data_url))
}

/// 将位图编码为 PNG Data URL。
pub fn encode_png_data_url(image: &DynamicImage) -> Result<String, EditorError> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| EditorError::Decode(format!("PNG 编码失败：{}", e)))?;

    Ok(format!(
        "data:image/png;base64,{}",
        general_purpose::STANDARD.encode(buffer.into_inner())
    ))
}

/// 将源图缩放到指定尺寸（预览绘制用）。
pub(crate) fn resize_for_preview(
    image: &DynamicImage,
    target_width: u32,
    target_height: u32,
    filter: FilterType,
) -> RgbaImage {
    let target_width = target_width.max(1);
    let target_height = target_height.max(1);

    match resize_with_fast_image_resize(image, target_width, target_height, filter) {
        Ok(resized) => resized,
        Err(err) => {
            log::warn!("⚠️ fast_image_resize 缩放失败，回退 image::resize_exact：{}", err);
            image
                .resize_exact(target_width, target_height, filter)
                .to_rgba8()
        }
    }
}

fn resize_with_fast_image_resize(
    image: &DynamicImage,
    target_width: u32,
    target_height: u32,
    filter: FilterType,
) -> Result<RgbaImage, EditorError> {
    let src = image.to_rgba8();
    let (src_width, src_height) = src.dimensions();

    let src_image = fr::images::Image::from_vec_u8(src_width, src_height, src.into_raw(), fr::PixelType::U8x4)
        .map_err(|e| EditorError::Decode(format!("构建源图像缓冲失败：{}", e)))?;

    let mut dst_image = fr::images::Image::new(target_width, target_height, fr::PixelType::U8x4);

    let mut resizer = fr::Resizer::new();
    let options = fr::ResizeOptions::new().resize_alg(fr::ResizeAlg::Convolution(to_fast_filter(filter)));

    resizer
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| EditorError::Decode(format!("fast_image_resize 执行失败：{}", e)))?;

    ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(target_width, target_height, dst_image.into_vec())
        .ok_or_else(|| EditorError::Decode("fast_image_resize 输出缓冲长度异常".to_string()))
}

fn to_fast_filter(filter: FilterType) -> fr::FilterType {
    match filter {
        FilterType::Nearest => fr::FilterType::Box,
        FilterType::Triangle => fr::FilterType::Bilinear,
        FilterType::CatmullRom => fr::FilterType::CatmullRom,
        FilterType::Gaussian => fr::FilterType::Mitchell,
        FilterType::Lanczos3 => fr::FilterType::Lanczos3,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// 生成左半红、右半蓝的 PNG 字节，便于校验裁剪区域。
    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_fn(width, height, |x, _| {
            if x < width / 2 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        });
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(image)
            .write_to(&mut buffer, ImageFormat::Png)
            .expect("encode test png");
        buffer.into_inner()
    }

    #[test]
    fn decode_reads_natural_dimensions() {
        let source = decode_source_image(&png_bytes(20, 10), &EditorConfig::default()).expect("decode");
        assert_eq!((source.natural_width(), source.natural_height()), (20, 10));
    }

    #[test]
    fn decode_rejects_non_image_payload() {
        let result = decode_source_image(b"hello world", &EditorConfig::default());
        assert!(matches!(result, Err(EditorError::InvalidFormat(_))));
    }

    #[test]
    fn decode_rejects_too_many_pixels_from_header() {
        let config = EditorConfig {
            max_decoded_pixels: 100,
            ..EditorConfig::default()
        };
        let result = decode_source_image(&png_bytes(20, 10), &config);
        assert!(matches!(result, Err(EditorError::ResourceLimit(_))));
    }

    #[test]
    fn crop_keeps_selected_region_and_encodes_png() {
        let source = decode_source_image(&png_bytes(20, 10), &EditorConfig::default()).expect("decode");
        let (cropped, data_url) = crop_source(&source, PixelRect { x: 12, y: 2, width: 6, height: 5 })
            .expect("crop");

        assert_eq!((cropped.natural_width(), cropped.natural_height()), (6, 5));
        assert_eq!(cropped.image().to_rgba8().get_pixel(0, 0), &Rgba([0, 0, 255, 255]));
        assert!(data_url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn preview_resize_produces_requested_size() {
        let source = decode_source_image(&png_bytes(20, 10), &EditorConfig::default()).expect("decode");
        let resized = resize_for_preview(source.image(), 8, 4, FilterType::Triangle);
        assert_eq!(resized.dimensions(), (8, 4));
    }
}
