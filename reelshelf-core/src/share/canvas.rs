use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};

use super::card::ShareCard;
use super::glyphs::GlyphRasterizer;
use super::layout::{DrawCommand, ShareLayout, TextRun};
use crate::error::{CoreError, Result};

/// Paint phase: replay the layout's commands onto a fresh canvas.
pub fn paint(layout: &ShareLayout, glyphs: &dyn GlyphRasterizer) -> RgbaImage {
    let mut canvas = RgbaImage::new(layout.width, layout.height);

    for command in layout.commands() {
        match command {
            DrawCommand::Fill(color) => {
                for pixel in canvas.pixels_mut() {
                    *pixel = color;
                }
            }
            DrawCommand::Rect {
                x,
                y,
                width,
                height,
                color,
            } => fill_rect(&mut canvas, x, y, width, height, color),
            DrawCommand::Text(run) => draw_text(&mut canvas, &run, glyphs),
        }
    }

    canvas
}

pub fn encode_png(canvas: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Cursor::new(Vec::new());
    canvas
        .write_to(&mut bytes, ImageFormat::Png)
        .map_err(|e| CoreError::Render(format!("Failed to encode PNG: {e}")))?;
    Ok(bytes.into_inner())
}

/// Measure, paint and encode in one call. CPU bound; callers on the async
/// runtime should run it on a blocking thread.
pub fn render_png(
    card: &ShareCard,
    glyphs: &dyn GlyphRasterizer,
) -> Result<Vec<u8>> {
    let layout = ShareLayout::measure(card, glyphs);
    encode_png(&paint(&layout, glyphs))
}

fn fill_rect(
    canvas: &mut RgbaImage,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    color: Rgba<u8>,
) {
    let x0 = x.max(0) as u32;
    let y0 = y.max(0) as u32;
    let x1 = (x + width as i32).clamp(0, canvas.width() as i32) as u32;
    let y1 = (y + height as i32).clamp(0, canvas.height() as i32) as u32;

    for py in y0..y1 {
        for px in x0..x1 {
            canvas.put_pixel(px, py, color);
        }
    }
}

fn draw_text(canvas: &mut RgbaImage, run: &TextRun, glyphs: &dyn GlyphRasterizer) {
    let mut pen_x = run.x as f32;

    for ch in run.text.chars() {
        let glyph = glyphs.rasterize(ch, run.px);
        let left = pen_x.round() as i32 + glyph.xmin;
        let top = run.baseline - glyph.height as i32 - glyph.ymin;

        for row in 0..glyph.height {
            for col in 0..glyph.width {
                let coverage = glyph.coverage[row * glyph.width + col];
                if coverage == 0 {
                    continue;
                }
                let (px, py) = (left + col as i32, top + row as i32);
                if px < 0
                    || py < 0
                    || px >= canvas.width() as i32
                    || py >= canvas.height() as i32
                {
                    continue;
                }
                let dst = canvas.get_pixel_mut(px as u32, py as u32);
                *dst = blend(*dst, run.color, coverage);
            }
        }

        pen_x += glyph.advance;
    }
}

fn blend(dst: Rgba<u8>, src: Rgba<u8>, coverage: u8) -> Rgba<u8> {
    let alpha = u16::from(coverage);
    let mix = |d: u8, s: u8| {
        ((u16::from(s) * alpha + u16::from(d) * (255 - alpha) + 127) / 255) as u8
    };
    Rgba([mix(dst[0], src[0]), mix(dst[1], src[1]), mix(dst[2], src[2]), 0xff])
}
