use crate::domain::ports::{FaceLoader, GlyphFace};
use crate::utils::error::{CardError, Result};
use ab_glyph::{point, Font, FontVec, GlyphId, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};

/// 從 TTF/OTF 檔案載入字型，每次渲染都重新讀檔
#[derive(Debug, Clone, Copy, Default)]
pub struct FontFileLoader;

impl FaceLoader for FontFileLoader {
    fn load(&self, path: &str, size: f32) -> Result<Box<dyn GlyphFace>> {
        let bytes = std::fs::read(path).map_err(|e| CardError::FontLoad {
            message: format!("{}: {}", path, e),
        })?;
        let face = TrueTypeFace::from_bytes(bytes, size)?;
        tracing::debug!("Loaded font face {} at {}pt", path, size);
        Ok(Box::new(face))
    }
}

pub struct TrueTypeFace {
    font: FontVec,
    scale: PxScale,
}

impl TrueTypeFace {
    /// `point_size` 以 72 DPI 換算，1pt 等於 1 個 em 像素
    pub fn from_bytes(bytes: Vec<u8>, point_size: f32) -> Result<Self> {
        let font = FontVec::try_from_vec(bytes).map_err(|e| CardError::FontLoad {
            message: e.to_string(),
        })?;
        let units_per_em = font.units_per_em().ok_or_else(|| CardError::FontLoad {
            message: "font has no units-per-em".to_string(),
        })?;
        let scale = PxScale::from(point_size * font.height_unscaled() / units_per_em);

        Ok(Self { font, scale })
    }

    fn advance_layout(&self, text: &str, mut each: impl FnMut(GlyphId, f32)) -> f32 {
        let font = self.font.as_scaled(self.scale);
        let mut caret = 0.0f32;
        let mut last: Option<GlyphId> = None;

        for c in text.chars() {
            let id = font.glyph_id(c);
            if let Some(prev) = last {
                caret += font.kern(prev, id);
            }
            each(id, caret);
            caret += font.h_advance(id);
            last = Some(id);
        }

        caret
    }
}

impl GlyphFace for TrueTypeFace {
    fn measure(&self, text: &str) -> f32 {
        self.advance_layout(text, |_, _| {})
    }

    fn draw(&self, canvas: &mut RgbaImage, text: &str, x: f32, baseline: f32, color: Rgba<u8>) {
        let font = self.font.as_scaled(self.scale);
        let mut glyphs = Vec::new();
        self.advance_layout(text, |id, offset| {
            glyphs.push(id.with_scale_and_position(self.scale, point(x + offset, baseline)));
        });

        for glyph in glyphs {
            if let Some(outlined) = font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|gx, gy, coverage| {
                    blend_pixel(
                        canvas,
                        bounds.min.x as i64 + i64::from(gx),
                        bounds.min.y as i64 + i64::from(gy),
                        color,
                        coverage,
                    );
                });
            }
        }
    }
}

/// 依覆蓋率把顏色混到不透明的畫布上，超出範圍的像素直接略過
pub fn blend_pixel(canvas: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>, coverage: f32) {
    if x < 0 || y < 0 || x >= i64::from(canvas.width()) || y >= i64::from(canvas.height()) {
        return;
    }

    let alpha = coverage.clamp(0.0, 1.0);
    let pixel = canvas.get_pixel_mut(x as u32, y as u32);
    for channel in 0..3 {
        let blended = f32::from(pixel.0[channel]) * (1.0 - alpha) + f32::from(color.0[channel]) * alpha;
        pixel.0[channel] = blended.round() as u8;
    }
    pixel.0[3] = 255;
}
