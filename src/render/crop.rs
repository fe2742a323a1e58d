//! 截图裁剪：去掉内容右侧和下方的空白

use std::io::Cursor;

use image::{DynamicImage, GenericImageView, ImageFormat, Rgba};

use crate::error::AppResult;

/// 内容边界（不含右/下边界）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentBounds {
    pub right: u32,
    pub bottom: u32,
}

/// 查找非白色像素的范围，全白时返回 None
pub fn content_bounds(image: &DynamicImage) -> Option<ContentBounds> {
    let mut bounds: Option<ContentBounds> = None;
    for (x, y, pixel) in image.pixels() {
        if is_blank(pixel) {
            continue;
        }
        let b = bounds.get_or_insert(ContentBounds { right: 0, bottom: 0 });
        b.right = b.right.max(x + 1);
        b.bottom = b.bottom.max(y + 1);
    }
    bounds
}

/// 白色或完全透明都算空白
fn is_blank(Rgba([r, g, b, a]): Rgba<u8>) -> bool {
    a == 0 || (r == 255 && g == 255 && b == 255)
}

/// 裁剪 PNG 截图
///
/// 保留左上角，右侧和下方在内容之外留 `margin` 像素（不超过原图）。
/// 全白图片原样返回。
pub fn crop_to_content(png: &[u8], margin: u32) -> AppResult<Vec<u8>> {
    let image = image::load_from_memory(png)?;
    let Some(bounds) = content_bounds(&image) else {
        return Ok(png.to_vec());
    };

    let width = (bounds.right + margin).min(image.width());
    let height = (bounds.bottom + margin).min(image.height());
    if width == image.width() && height == image.height() {
        return Ok(png.to_vec());
    }

    let cropped = image.crop_imm(0, 0, width, height);
    let mut out = Cursor::new(Vec::new());
    cropped.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn png_with_box(width: u32, height: u32, boxed: Option<(u32, u32, u32, u32)>) -> Vec<u8> {
        let mut img = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
        if let Some((x0, y0, x1, y1)) = boxed {
            for x in x0..x1 {
                for y in y0..y1 {
                    img.put_pixel(x, y, Rgba([0, 0, 0, 255]));
                }
            }
        }
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn test_crop_keeps_margin() {
        let png = png_with_box(200, 300, Some((20, 20, 60, 40)));
        let cropped = image::load_from_memory(&crop_to_content(&png, 8).unwrap()).unwrap();

        assert_eq!(cropped.width(), 68);
        assert_eq!(cropped.height(), 48);
    }

    #[test]
    fn test_margin_clamped_to_image() {
        let png = png_with_box(50, 300, Some((10, 10, 48, 20)));
        let cropped = image::load_from_memory(&crop_to_content(&png, 8).unwrap()).unwrap();

        assert_eq!(cropped.width(), 50);
        assert_eq!(cropped.height(), 28);
    }

    #[test]
    fn test_blank_image_untouched() {
        let png = png_with_box(40, 40, None);
        assert_eq!(crop_to_content(&png, 8).unwrap(), png);
    }

    #[test]
    fn test_invalid_png_is_error() {
        assert!(crop_to_content(b"not a png", 8).is_err());
    }
}
