use glam::Vec3;

/// Scene layout and interaction tuning for the demo.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub gradient_texture_path: &'static str,
    pub model_path: &'static str,

    pub background_color: &'static str,
    pub plane_color: &'static str,
    pub plane_size: f32,
    pub plane_position: Vec3,

    pub model_position: Vec3,
    pub model_light_color: u32,
    pub model_light_intensity: f32,

    pub ambient_color: &'static str,
    pub ambient_intensity: f32,
    pub key_light_color: &'static str,
    pub key_light_intensity: f32,
    pub key_light_position: Vec3,

    pub point_light_count: usize,
    pub point_light_column_height: f32,
    pub point_light_color: u32,
    pub point_light_intensity: f32,
    pub point_light_distance: f32,
    pub point_light_decay: f32,

    pub camera_fov_y_degrees: f32,
    pub camera_near: f32,
    pub camera_far: f32,
    pub camera_position: Vec3,

    /// Rate of the exponential damping applied to the camera rig.
    pub parallax_rate: f32,

    /// Height of the scrollable document in multiples of the viewport height.
    pub document_height_viewports: f32,
    /// Logical pixels scrolled per wheel line or arrow key press.
    pub scroll_line_height: f32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            gradient_texture_path: "assets/textures/gradients/3.png",
            model_path: "assets/gltf/dbzw.glb",

            background_color: "#000000",
            plane_color: "#000000",
            plane_size: 20.0,
            plane_position: Vec3::new(0.0, 0.0, -10.0),

            model_position: Vec3::new(-3.6, 0.0, -5.0),
            model_light_color: 0xfff0dd,
            model_light_intensity: 20.0,

            ambient_color: "#ffffff",
            ambient_intensity: 10.5,
            key_light_color: "#ffffff",
            key_light_intensity: 10.0,
            key_light_position: Vec3::new(5.0, 5.0, 5.0),

            point_light_count: 50,
            point_light_column_height: 20.0,
            point_light_color: 0xffffff,
            point_light_intensity: 1.0,
            point_light_distance: 10.0,
            point_light_decay: 2.0,

            camera_fov_y_degrees: 35.0,
            camera_near: 0.1,
            camera_far: 100.0,
            camera_position: Vec3::new(0.0, 3.0, 15.0),

            parallax_rate: 5.0,

            document_height_viewports: 3.0,
            scroll_line_height: 40.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    #[test]
    fn default_colors_parse() {
        let config = DemoConfig::default();

        for hex in [
            config.background_color,
            config.plane_color,
            config.ambient_color,
            config.key_light_color,
        ] {
            assert!(Color::from_hex_str(hex).is_ok(), "{hex}");
        }
    }

    #[test]
    fn default_light_column() {
        let config = DemoConfig::default();
        assert_eq!(config.point_light_count, 50);
        assert_eq!(config.point_light_column_height, 20.0);
        assert!(config.document_height_viewports >= 1.0);
    }
}
