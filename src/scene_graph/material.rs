use id_arena::Id;

use crate::color::Color;

pub type MaterialId = Id<Material>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Front,
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFilter {
    Nearest,
    Linear,
}

/// An image file the renderer loads on demand, keyed by path and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle {
    pub path: &'static str,
    pub mag_filter: TextureFilter,
}

/// Unlit surface: `color * map`.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicMaterial {
    pub color: Color,
    pub map: Option<TextureHandle>,
    pub side: Side,
}

impl Default for BasicMaterial {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            map: None,
            side: Side::Front,
        }
    }
}

/// Lit, transmissive surface used for the glass model.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalMaterial {
    pub color: Color,
    pub transmission: f32,
    pub opacity: f32,
    pub metalness: f32,
    pub roughness: f32,
    pub ior: f32,
    pub thickness: f32,
    pub specular_intensity: f32,
    pub env_map_intensity: f32,
    pub clearcoat: f32,
    pub clearcoat_roughness: f32,
    pub side: Side,
}

impl PhysicalMaterial {
    pub fn glass() -> Self {
        Self {
            color: Color::WHITE,
            transmission: 1.0,
            opacity: 0.1,
            metalness: 0.0,
            roughness: 0.0,
            ior: 1.45,
            thickness: 0.5,
            specular_intensity: 10.0,
            env_map_intensity: 1.0,
            clearcoat: 1.0,
            clearcoat_roughness: 0.1,
            side: Side::Double,
        }
    }

    /// Normal-incidence reflectance for a dielectric with this IOR.
    pub fn f0(&self) -> f32 {
        let r = (self.ior - 1.0) / (self.ior + 1.0);
        (r * r).min(1.0) * self.specular_intensity
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    Basic(BasicMaterial),
    Physical(PhysicalMaterial),
}

impl Material {
    pub fn side(&self) -> Side {
        match self {
            Material::Basic(material) => material.side,
            Material::Physical(material) => material.side,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Material::Basic(material) => material.color,
            Material::Physical(material) => material.color,
        }
    }

    pub fn set_color(&mut self, color: Color) {
        match self {
            Material::Basic(material) => material.color = color,
            Material::Physical(material) => material.color = color,
        }
    }
}
