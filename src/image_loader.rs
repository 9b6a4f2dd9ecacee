//! # Chart Fetching and Decoding
//!
//! Chart images reach the compositor through the [`ChartFetcher`] seam: the
//! engine asks for raw bytes by source string and decodes whatever comes back
//! by magic bytes. JPEG bytes pass through to the PDF untouched (DCTDecode is
//! native); PNG decodes to RGB pixels with a separate alpha plane for SMask
//! transparency.

use std::io::Cursor;

/// Resolves a chart source string to raw image bytes.
///
/// Injected into composition so transports stay out of the engine: the
/// default [`FileFetcher`] resolves data URIs, file paths, and raw base64,
/// while a service wraps its own HTTP client. Errors are plain strings; a
/// failed fetch costs that chart, never the page.
pub trait ChartFetcher {
    fn fetch(&self, src: &str) -> Result<Vec<u8>, String>;
}

/// A decoded chart ready for placement.
#[derive(Debug, Clone)]
pub struct ChartImage {
    pub pixels: ChartPixelData,
    pub width_px: u32,
    pub height_px: u32,
}

/// Pixel data in a form the PDF writer embeds directly.
#[derive(Debug, Clone)]
pub enum ChartPixelData {
    /// Raw JPEG bytes for DCTDecode passthrough.
    Jpeg {
        data: Vec<u8>,
        color_space: JpegColorSpace,
    },
    /// Decoded pixels: width * height * 3 RGB bytes, plus a width * height
    /// alpha plane when any pixel is not fully opaque.
    Rgb {
        data: Vec<u8>,
        alpha: Option<Vec<u8>>,
    },
}

/// JPEG color space for the PDF /ColorSpace entry.
#[derive(Debug, Clone, Copy)]
pub enum JpegColorSpace {
    DeviceRGB,
    DeviceGray,
}

/// Fetches and decodes one chart.
pub fn fetch_chart(fetcher: &dyn ChartFetcher, src: &str) -> Result<ChartImage, String> {
    let raw_bytes = fetcher.fetch(src)?;
    decode_chart(&raw_bytes)
}

/// Detect the image format from magic bytes and decode accordingly.
pub fn decode_chart(data: &[u8]) -> Result<ChartImage, String> {
    if data.len() < 4 {
        return Err("Image data too short".to_string());
    }

    if is_jpeg(data) {
        decode_jpeg(data)
    } else if is_png(data) {
        decode_png(data)
    } else {
        Err("Unsupported image format (expected JPEG or PNG)".to_string())
    }
}

fn is_jpeg(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8
}

fn is_png(data: &[u8]) -> bool {
    data.len() >= 4 && data[0] == 0x89 && data[1] == 0x50 && data[2] == 0x4E && data[3] == 0x47
}

/// JPEG: read dimensions and color space without decoding pixels; the raw
/// bytes are what the PDF embeds.
fn decode_jpeg(data: &[u8]) -> Result<ChartImage, String> {
    let reader = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| format!("JPEG format detection error: {}", e))?;

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| format!("Failed to read JPEG dimensions: {}", e))?;

    let color_space = detect_jpeg_color_space(data);

    Ok(ChartImage {
        pixels: ChartPixelData::Jpeg {
            data: data.to_vec(),
            color_space,
        },
        width_px: width,
        height_px: height,
    })
}

/// Scan the marker stream for the SOF segment; its component count decides
/// the color space (1 = grayscale, otherwise RGB).
fn detect_jpeg_color_space(data: &[u8]) -> JpegColorSpace {
    let mut i = 2; // past the SOI marker
    while i + 1 < data.len() {
        if data[i] != 0xFF {
            break;
        }
        let marker = data[i + 1];
        // SOF markers: C0-C3, C5-C7, C9-CB, CD-CF
        let is_sof = matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF);
        if is_sof {
            // SOF layout: length(2) precision(1) height(2) width(2) components(1)
            if i + 9 < data.len() {
                return if data[i + 9] == 1 {
                    JpegColorSpace::DeviceGray
                } else {
                    JpegColorSpace::DeviceRGB
                };
            }
        }
        if i + 3 < data.len() {
            let seg_len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
            i += 2 + seg_len;
        } else {
            break;
        }
    }
    JpegColorSpace::DeviceRGB
}

/// PNG: decode to RGBA, split into RGB + alpha.
fn decode_png(data: &[u8]) -> Result<ChartImage, String> {
    let reader = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| format!("PNG format detection error: {}", e))?;

    let img = reader
        .decode()
        .map_err(|e| format!("Failed to decode PNG: {}", e))?;

    let rgba = img.to_rgba8();
    let width = rgba.width();
    let height = rgba.height();

    let pixel_count = (width * height) as usize;
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);
    let mut has_transparency = false;

    for pixel in rgba.pixels() {
        rgb.push(pixel[0]);
        rgb.push(pixel[1]);
        rgb.push(pixel[2]);
        let a = pixel[3];
        alpha.push(a);
        if a != 255 {
            has_transparency = true;
        }
    }

    Ok(ChartImage {
        pixels: ChartPixelData::Rgb {
            data: rgb,
            alpha: if has_transparency { Some(alpha) } else { None },
        },
        width_px: width,
        height_px: height,
    })
}

/// The default fetcher for local sources.
///
/// Supported `src` shapes:
/// - `data:image/...;base64,...` data URI
/// - explicit file path (`/`, `./`, `../` prefixed; unavailable in WASM)
/// - raw base64 image data
pub struct FileFetcher;

impl ChartFetcher for FileFetcher {
    fn fetch(&self, src: &str) -> Result<Vec<u8>, String> {
        if src.starts_with("data:image/") {
            let comma_pos = src
                .find(',')
                .ok_or_else(|| "Invalid data URI: missing comma".to_string())?;
            return base64_decode(&src[comma_pos + 1..]);
        }

        // Only explicit path prefixes count as paths: base64 payloads also
        // contain '/'.
        if src.starts_with('/') || src.starts_with("./") || src.starts_with("../") {
            #[cfg(not(target_arch = "wasm32"))]
            {
                return std::fs::read(src)
                    .map_err(|e| format!("Failed to read image file '{}': {}", src, e));
            }
            #[cfg(target_arch = "wasm32")]
            {
                return Err(format!(
                    "File path images not supported in WASM: '{}'. Use data URIs or base64.",
                    src
                ));
            }
        }

        base64_decode(src)
    }
}

pub(crate) fn base64_decode(input: &str) -> Result<Vec<u8>, String> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(input)
        .map_err(|e| format!("Base64 decode error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(rgba: [u8; 4]) -> Vec<u8> {
        let mut img = image::RgbaImage::new(1, 1);
        img.put_pixel(0, 0, image::Rgba(rgba));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, img.as_raw(), 1, 1, image::ColorType::Rgba8)
            .unwrap();
        buf
    }

    #[test]
    fn test_is_jpeg() {
        assert!(is_jpeg(&[0xFF, 0xD8, 0xFF, 0xE0]));
        assert!(!is_jpeg(&[0x89, 0x50, 0x4E, 0x47]));
        assert!(!is_jpeg(&[0xFF]));
    }

    #[test]
    fn test_is_png() {
        assert!(is_png(&[0x89, 0x50, 0x4E, 0x47]));
        assert!(!is_png(&[0xFF, 0xD8, 0xFF, 0xE0]));
        assert!(!is_png(&[0x89, 0x50]));
    }

    #[test]
    fn test_invalid_data_uri() {
        let result = FileFetcher.fetch("data:image/png;base64");
        assert!(result.is_err());
    }

    #[test]
    fn test_too_short_data() {
        assert!(decode_chart(&[0x00, 0x01]).is_err());
    }

    #[test]
    fn test_unsupported_format() {
        assert!(decode_chart(&[0x00, 0x01, 0x02, 0x03, 0x04]).is_err());
    }

    #[test]
    fn test_decode_minimal_png() {
        let chart = decode_chart(&png_bytes([255, 0, 0, 255])).unwrap();
        assert_eq!(chart.width_px, 1);
        assert_eq!(chart.height_px, 1);
        match &chart.pixels {
            ChartPixelData::Rgb { data, alpha } => {
                assert_eq!(data, &[255, 0, 0]);
                assert!(alpha.is_none(), "Fully opaque should have no alpha plane");
            }
            _ => panic!("PNG should decode to Rgb variant"),
        }
    }

    #[test]
    fn test_decode_png_with_alpha() {
        let chart = decode_chart(&png_bytes([255, 0, 0, 128])).unwrap();
        match &chart.pixels {
            ChartPixelData::Rgb { data, alpha } => {
                assert_eq!(data, &[255, 0, 0]);
                assert_eq!(alpha.as_ref().unwrap(), &[128]);
            }
            _ => panic!("PNG should decode to Rgb variant"),
        }
    }

    #[test]
    fn test_decode_minimal_jpeg() {
        let img = image::RgbImage::from_fn(2, 2, |_, _| image::Rgb([0, 128, 255]));
        let mut buf = Vec::new();
        let encoder = image::codecs::jpeg::JpegEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, img.as_raw(), 2, 2, image::ColorType::Rgb8)
            .unwrap();

        let chart = decode_chart(&buf).unwrap();
        assert_eq!(chart.width_px, 2);
        assert_eq!(chart.height_px, 2);
        match &chart.pixels {
            ChartPixelData::Jpeg { data, color_space } => {
                assert!(data.starts_with(&[0xFF, 0xD8]));
                assert!(matches!(color_space, JpegColorSpace::DeviceRGB));
            }
            _ => panic!("JPEG should stay as Jpeg variant"),
        }
    }

    #[test]
    fn test_grayscale_jpeg_detected() {
        let img = image::GrayImage::from_fn(2, 2, |_, _| image::Luma([90]));
        let mut buf = Vec::new();
        let encoder = image::codecs::jpeg::JpegEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, img.as_raw(), 2, 2, image::ColorType::L8)
            .unwrap();

        let chart = decode_chart(&buf).unwrap();
        match &chart.pixels {
            ChartPixelData::Jpeg { color_space, .. } => {
                assert!(matches!(color_space, JpegColorSpace::DeviceGray));
            }
            _ => panic!("JPEG should stay as Jpeg variant"),
        }
    }

    #[test]
    fn test_fetch_chart_via_data_uri() {
        use base64::Engine;
        let b64 = base64::engine::general_purpose::STANDARD.encode(png_bytes([0, 255, 0, 255]));
        let data_uri = format!("data:image/png;base64,{}", b64);

        let chart = fetch_chart(&FileFetcher, &data_uri).unwrap();
        assert_eq!(chart.width_px, 1);
        assert_eq!(chart.height_px, 1);
    }

    #[test]
    fn test_fetch_chart_propagates_fetcher_errors() {
        struct Down;
        impl ChartFetcher for Down {
            fn fetch(&self, _src: &str) -> Result<Vec<u8>, String> {
                Err("connection refused".to_string())
            }
        }
        let err = fetch_chart(&Down, "https://charts.example/1.png").unwrap_err();
        assert!(err.contains("connection refused"));
    }
}
