use glam::Vec2;
use waypoints_common::unpack_rgb;

use crate::device::{DeviceError, GraphicsDevice, TextureId, TexturedVertex};

/// Text measurement and drawing supplied by the host.
pub trait TextRenderer {
    /// Width of `text` in label-space units.
    fn string_width(&self, text: &str) -> f32;

    /// Draw `text` left-anchored at `origin` in the device's current local space.
    fn draw_string(
        &self,
        device: &mut dyn GraphicsDevice,
        text: &str,
        origin: Vec2,
        color_rgb: u32,
    ) -> Result<(), DeviceError>;
}

pub const ASCII_FONT_TEXTURE: TextureId = TextureId::from_static("font:ascii.png");

/// Fixed-advance font backed by a 16x16 ASCII glyph atlas.
///
/// Characters outside the atlas render as `?`. Whitespace advances without
/// emitting geometry.
#[derive(Debug, Clone)]
pub struct FixedWidthFont {
    pub texture: TextureId,
    pub advance: f32,
    pub glyph_height: f32,
}

impl Default for FixedWidthFont {
    fn default() -> Self {
        Self {
            texture: ASCII_FONT_TEXTURE,
            advance: 6.0,
            glyph_height: 8.0,
        }
    }
}

impl FixedWidthFont {
    fn glyph_quad(&self, c: char, x: f32, y: f32) -> [TexturedVertex; 6] {
        let code = if (c as u32) < 256 { c as u32 } else { '?' as u32 };
        let cell = 1.0 / 16.0;
        let u0 = (code % 16) as f32 * cell;
        let v0 = (code / 16) as f32 * cell;
        let (u1, v1) = (u0 + cell, v0 + cell);
        let (x1, y1) = (x + self.advance, y + self.glyph_height);
        [
            TexturedVertex::new([x, y, 0.0], [u0, v0]),
            TexturedVertex::new([x, y1, 0.0], [u0, v1]),
            TexturedVertex::new([x1, y1, 0.0], [u1, v1]),
            TexturedVertex::new([x, y, 0.0], [u0, v0]),
            TexturedVertex::new([x1, y1, 0.0], [u1, v1]),
            TexturedVertex::new([x1, y, 0.0], [u1, v0]),
        ]
    }
}

impl TextRenderer for FixedWidthFont {
    fn string_width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.advance
    }

    fn draw_string(
        &self,
        device: &mut dyn GraphicsDevice,
        text: &str,
        origin: Vec2,
        color_rgb: u32,
    ) -> Result<(), DeviceError> {
        let mut vertices = Vec::with_capacity(text.len() * 6);
        let mut x = origin.x;
        for c in text.chars() {
            if !c.is_whitespace() {
                vertices.extend_from_slice(&self.glyph_quad(c, x, origin.y));
            }
            x += self.advance;
        }
        if vertices.is_empty() {
            return Ok(());
        }

        device.set_color(unpack_rgb(color_rgb).extend(1.0).to_array());
        device.bind_texture(&self.texture);
        device.draw_triangles(&vertices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{DeviceCommand, RecordingDevice};

    #[test]
    fn width_is_advance_per_char() {
        let font = FixedWidthFont::default();
        assert_eq!(font.string_width(""), 0.0);
        assert_eq!(font.string_width("Home (5m)"), 9.0 * 6.0);
    }

    #[test]
    fn draws_one_quad_per_visible_glyph() {
        let font = FixedWidthFont::default();
        let mut device = RecordingDevice::new();
        font.draw_string(&mut device, "a b", Vec2::new(-9.0, -16.0), 0xFF0000)
            .unwrap();

        let draws = device.draw_calls();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].vertices.len(), 12);
        assert_eq!(draws[0].texture, Some(ASCII_FONT_TEXTURE));
        assert_eq!(draws[0].color, [1.0, 0.0, 0.0, 1.0]);
        // 'b' starts two advances in.
        assert_eq!(draws[0].vertices[6].position, [3.0, -16.0, 0.0]);
    }

    #[test]
    fn whitespace_only_draws_nothing() {
        let font = FixedWidthFont::default();
        let mut device = RecordingDevice::new();
        font.draw_string(&mut device, "   ", Vec2::ZERO, 0xFFFFFF)
            .unwrap();
        assert!(device.commands().is_empty());
    }

    #[test]
    fn glyph_uv_maps_into_atlas_cell() {
        let font = FixedWidthFont::default();
        // 'A' = 65 -> column 1, row 4.
        let quad = font.glyph_quad('A', 0.0, 0.0);
        assert_eq!(quad[0].uv, [1.0 / 16.0, 4.0 / 16.0]);
        assert_eq!(quad[2].uv, [2.0 / 16.0, 5.0 / 16.0]);
        // Outside the atlas falls back to '?'.
        assert_eq!(font.glyph_quad('\u{263A}', 0.0, 0.0), font.glyph_quad('?', 0.0, 0.0));
    }

    #[test]
    fn bind_happens_before_draw() {
        let font = FixedWidthFont::default();
        let mut device = RecordingDevice::new();
        font.draw_string(&mut device, "x", Vec2::ZERO, 0).unwrap();
        let cmds = device.commands();
        let bind = cmds
            .iter()
            .position(|c| matches!(c, DeviceCommand::BindTexture(_)))
            .unwrap();
        let draw = cmds
            .iter()
            .position(|c| matches!(c, DeviceCommand::DrawTriangles(_)))
            .unwrap();
        assert!(bind < draw);
    }
}
