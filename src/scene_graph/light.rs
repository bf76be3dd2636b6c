use crate::color::Color;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Ambient {
        color: Color,
        intensity: f32,
    },
    /// Shines from the node's world position toward the origin.
    Directional {
        color: Color,
        intensity: f32,
    },
    Point {
        color: Color,
        intensity: f32,
        /// Cutoff distance. Zero means unlimited.
        distance: f32,
        decay: f32,
    },
}

impl Light {
    pub fn radiance(&self) -> glam::Vec3 {
        match *self {
            Light::Ambient { color, intensity }
            | Light::Directional { color, intensity }
            | Light::Point {
                color, intensity, ..
            } => color.linear() * intensity,
        }
    }
}

/// Attenuation of a point light at `distance` from the surface.
///
/// Inverse power falloff, windowed so it reaches zero at `cutoff`.
pub fn distance_attenuation(distance: f32, cutoff: f32, decay: f32) -> f32 {
    let mut falloff = 1.0 / distance.powf(decay).max(0.01);

    if cutoff > 0.0 {
        let window = (1.0 - (distance / cutoff).powi(4)).clamp(0.0, 1.0);
        falloff *= window * window;
    }

    falloff
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attenuation_reaches_zero_at_cutoff() {
        assert_eq!(distance_attenuation(10.0, 10.0, 2.0), 0.0);
        assert_eq!(distance_attenuation(12.0, 10.0, 2.0), 0.0);
    }

    #[test]
    fn attenuation_is_capped_near_the_light() {
        assert_eq!(distance_attenuation(0.0, 10.0, 2.0), 100.0);
    }

    #[test]
    fn attenuation_decreases_with_distance() {
        let near = distance_attenuation(1.0, 10.0, 2.0);
        let far = distance_attenuation(5.0, 10.0, 2.0);
        assert!(near > far && far > 0.0);
    }

    #[test]
    fn unlimited_distance_is_pure_inverse_square() {
        assert!((distance_attenuation(4.0, 0.0, 2.0) - 1.0 / 16.0).abs() < 1e-6);
    }

    #[test]
    fn radiance_scales_with_intensity() {
        let light = Light::Point {
            color: Color::WHITE,
            intensity: 2.0,
            distance: 10.0,
            decay: 2.0,
        };
        assert_eq!(light.radiance(), glam::Vec3::splat(2.0));
    }
}
