use std::io::Cursor;
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::core::{Size, TintColor};
use crate::foundation::error::{BakeError, BakeResult};
use crate::foundation::math::{mul_div255_u8, unit_to_u8};

/// Premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Raster image in premultiplied RGBA8 form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BakeImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl BakeImage {
    /// Fully transparent image of `size`.
    pub fn transparent(size: Size) -> BakeResult<Self> {
        Ok(Self {
            width: size.width,
            height: size.height,
            rgba8_premul: Arc::new(vec![0u8; size.rgba8_len()?]),
        })
    }

    /// Image of `size` filled with a straight-alpha color.
    pub fn solid(size: Size, straight_rgba: [u8; 4]) -> BakeResult<Self> {
        let px = premultiply(straight_rgba);
        let len = size.rgba8_len()?;
        let mut data = Vec::with_capacity(len);
        for _ in 0..len / 4 {
            data.extend_from_slice(&px);
        }
        Ok(Self {
            width: size.width,
            height: size.height,
            rgba8_premul: Arc::new(data),
        })
    }

    /// Wrap an existing premultiplied buffer, checking its length against `size`.
    pub fn from_premul(size: Size, rgba8_premul: Vec<u8>) -> BakeResult<Self> {
        if rgba8_premul.len() != size.rgba8_len()? {
            return Err(BakeError::validation(
                "premultiplied buffer does not match width*height*4",
            ));
        }
        Ok(Self {
            width: size.width,
            height: size.height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }

    /// Pixel dimensions.
    pub fn size(&self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }

    /// Pixel at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<PremulRgba8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let d = self.rgba8_premul.get(idx..idx + 4)?;
        Some([d[0], d[1], d[2], d[3]])
    }

    /// Return `true` when every pixel has zero alpha.
    pub fn is_fully_transparent(&self) -> bool {
        self.rgba8_premul.chunks_exact(4).all(|px| px[3] == 0)
    }
}

/// Source-over of premultiplied `src` onto `dst`.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    let sa = src[3];
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return src;
    }

    let inv = 255u16 - u16::from(sa);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = src[i].saturating_add(mul_div255_u8(u16::from(dst[i]), inv));
    }
    out
}

/// Source-over `src` onto `dst`, both tightly packed premultiplied RGBA8 of equal length.
pub fn over_in_place(dst: &mut [u8], src: &[u8]) -> BakeResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(BakeError::validation(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Multiply the color channels of a premultiplied buffer by `tint`; alpha is untouched.
pub fn multiply_in_place(dst: &mut [u8], tint: TintColor) {
    if tint.is_identity() {
        return;
    }
    let factors = [
        u16::from(unit_to_u8(tint.r)),
        u16::from(unit_to_u8(tint.g)),
        u16::from(unit_to_u8(tint.b)),
    ];
    for px in dst.chunks_exact_mut(4) {
        for i in 0..3 {
            px[i] = mul_div255_u8(u16::from(px[i]), factors[i]);
        }
    }
}

/// Decode encoded texture bytes, resample to `size`, and convert to premultiplied RGBA8.
pub fn decode_texture(bytes: &[u8], size: Size) -> BakeResult<BakeImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode texture from memory")?;
    let mut rgba = dyn_img.to_rgba8();
    if rgba.dimensions() != (size.width, size.height) {
        rgba = image::imageops::resize(
            &rgba,
            size.width,
            size.height,
            image::imageops::FilterType::Triangle,
        );
    }

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);
    BakeImage::from_premul(size, rgba8_premul)
}

/// Encode a baked image as PNG (straight alpha).
pub fn encode_png(img: &BakeImage) -> BakeResult<Vec<u8>> {
    let mut straight = img.rgba8_premul.as_ref().clone();
    unpremultiply_rgba8_in_place(&mut straight);
    let rgba = image::RgbaImage::from_raw(img.width, img.height, straight)
        .ok_or_else(|| BakeError::validation("baked image buffer does not match its size"))?;

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(rgba)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .context("encode baked texture as png")?;
    Ok(buf)
}

fn premultiply(px: [u8; 4]) -> PremulRgba8 {
    let a = u16::from(px[3]);
    [
        mul_div255_u8(u16::from(px[0]), a),
        mul_div255_u8(u16::from(px[1]), a),
        mul_div255_u8(u16::from(px[2]), a),
        px[3],
    ]
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let out = premultiply([px[0], px[1], px[2], px[3]]);
        px.copy_from_slice(&out);
    }
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u32::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bake/image.rs"]
mod tests;
