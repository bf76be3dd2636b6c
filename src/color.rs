use anyhow::{bail, Context};
use glam::Vec3;

/// A linear RGB color.
///
/// Colors are authored as sRGB hex values and converted to linear on
/// construction, so lighting math can use them directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color(pub Vec3);

impl Color {
    pub const BLACK: Color = Color(Vec3::ZERO);
    pub const WHITE: Color = Color(Vec3::ONE);

    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xff) as f32 / 255.0;
        let g = ((hex >> 8) & 0xff) as f32 / 255.0;
        let b = (hex & 0xff) as f32 / 255.0;

        Self::from_srgb(Vec3::new(r, g, b))
    }

    /// Parses `#rrggbb` or `#rgb`. The leading `#` is optional.
    pub fn from_hex_str(hex: &str) -> anyhow::Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);

        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            bail!("Invalid color {:?}: expected hex digits", hex);
        }

        let expanded = match digits.len() {
            6 => digits.to_string(),
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            _ => bail!("Invalid color {:?}: expected 3 or 6 hex digits", hex),
        };

        let value = u32::from_str_radix(&expanded, 16)
            .with_context(|| format!("Invalid color {:?}", hex))?;

        Ok(Self::from_hex(value))
    }

    pub fn from_srgb(srgb: Vec3) -> Self {
        Color(Vec3::new(
            srgb_to_linear(srgb.x),
            srgb_to_linear(srgb.y),
            srgb_to_linear(srgb.z),
        ))
    }

    pub fn to_srgb(self) -> Vec3 {
        Vec3::new(
            linear_to_srgb(self.0.x),
            linear_to_srgb(self.0.y),
            linear_to_srgb(self.0.z),
        )
    }

    pub fn linear(self) -> Vec3 {
        self.0
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c < 0.04045 {
        c * 0.0773993808
    } else {
        (c * 0.9478672986 + 0.0521327014).powf(2.4)
    }
}

fn linear_to_srgb(c: f32) -> f32 {
    if c < 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(0.41666) - 0.055
    }
}
