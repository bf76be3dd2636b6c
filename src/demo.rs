use std::time::Instant;

use glam::{Vec2, Vec3};

use crate::{
    camera::PerspectiveCamera,
    color::Color,
    config::DemoConfig,
    input::InputState,
    model::Model,
    model_loader::{GltfAsset, ModelLoader},
    parallax,
    scene_graph::{
        layers::{Layers, BACKGROUND_LAYER, GLASS_LAYER},
        light::Light,
        material::{
            BasicMaterial, Material, MaterialId, PhysicalMaterial, Side, TextureFilter,
            TextureHandle,
        },
        object3d::{Object3D, ObjectId},
        scene::Scene,
        scene_model::SceneModel,
    },
};

/// Monotonic frame clock. The first tick has a delta of zero.
pub struct Clock {
    start: Option<Instant>,
    previous_elapsed: f32,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            start: None,
            previous_elapsed: 0.0,
        }
    }

    /// Returns `(elapsed, delta)` in seconds.
    pub fn tick(&mut self) -> (f32, f32) {
        let Some(start) = self.start else {
            self.start = Some(Instant::now());
            return (0.0, 0.0);
        };

        let elapsed = start.elapsed().as_secs_f32();
        let delta = elapsed - self.previous_elapsed;
        self.previous_elapsed = elapsed;
        (elapsed, delta)
    }

    pub fn elapsed(&self) -> f32 {
        self.previous_elapsed
    }
}

/// Values computed by the last frame update, shown in the debug window.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameStats {
    pub delta_time: f32,
    pub scroll_percentage: f32,
    pub light_x: f32,
    pub camera_y: f32,
    pub rig_position: Vec2,
}

pub struct DemoState {
    pub config: DemoConfig,
    pub scene: Scene,
    pub camera: PerspectiveCamera,
    pub camera_rig: ObjectId,
    pub point_lights: Vec<ObjectId>,
    pub background_color: Color,
    pub plane_material: MaterialId,
    pub glass_material: MaterialId,
    pub glass_model: Option<ObjectId>,
    pub stats: FrameStats,
    clock: Clock,
    model_loader: Option<ModelLoader>,
}

impl DemoState {
    pub fn new(config: DemoConfig, aspect: f32) -> anyhow::Result<Self> {
        let mut state = Self::build_scene(config, aspect)?;
        state.model_loader = Some(ModelLoader::spawn(state.config.model_path));
        Ok(state)
    }

    fn build_scene(config: DemoConfig, aspect: f32) -> anyhow::Result<Self> {
        let mut scene = Scene::new();

        let background_color = Color::from_hex_str(config.background_color)?;

        let plane_material = scene.add_material(Material::Basic(BasicMaterial {
            color: Color::from_hex_str(config.plane_color)?,
            map: Some(TextureHandle {
                path: config.gradient_texture_path,
                mag_filter: TextureFilter::Nearest,
            }),
            side: Side::Front,
        }));
        let plane_model = scene.add_model(SceneModel::new(Model::plane(
            "Background plane",
            config.plane_size,
            config.plane_size,
        )));
        let mut plane_layers = Layers::default();
        plane_layers.set(BACKGROUND_LAYER);
        scene.add_object(
            Object3D::new("Background plane")
                .with_translation(config.plane_position)
                .with_mesh(plane_model, plane_material)
                .with_layers(plane_layers),
        );

        let glass_material = scene.add_material(Material::Physical(PhysicalMaterial::glass()));

        let glass_lights = Layers::default().with(GLASS_LAYER);

        scene.add_object(
            Object3D::new("Ambient light")
                .with_light(Light::Ambient {
                    color: Color::from_hex_str(config.ambient_color)?,
                    intensity: config.ambient_intensity,
                })
                .with_layers(glass_lights),
        );

        scene.add_object(
            Object3D::new("Key light")
                .with_translation(config.key_light_position)
                .with_light(Light::Directional {
                    color: Color::from_hex_str(config.key_light_color)?,
                    intensity: config.key_light_intensity,
                })
                .with_layers(glass_lights),
        );

        let point_lights = light_column_positions(
            config.point_light_count,
            config.point_light_column_height,
            parallax::LIGHT_X_START,
        )
        .into_iter()
        .enumerate()
        .map(|(i, position)| {
            scene.add_object(
                Object3D::new(format!("Point light {}", i))
                    .with_translation(position)
                    .with_light(Light::Point {
                        color: Color::from_hex(config.point_light_color),
                        intensity: config.point_light_intensity,
                        distance: config.point_light_distance,
                        decay: config.point_light_decay,
                    })
                    .with_layers(glass_lights),
            )
        })
        .collect();

        let camera_rig = scene.add_object(Object3D::new("Camera rig"));
        let camera_node = scene.add_child(
            camera_rig,
            Object3D::new("Camera").with_translation(config.camera_position),
        );

        let camera = PerspectiveCamera {
            node: camera_node,
            fov_y_degrees: config.camera_fov_y_degrees,
            aspect,
            near: config.camera_near,
            far: config.camera_far,
            layers: Layers::default().with(GLASS_LAYER).with(BACKGROUND_LAYER),
        };

        scene.late_update();

        Ok(Self {
            config,
            scene,
            camera,
            camera_rig,
            point_lights,
            background_color,
            plane_material,
            glass_material,
            glass_model: None,
            stats: FrameStats::default(),
            clock: Clock::new(),
            model_loader: None,
        })
    }

    pub fn elapsed(&self) -> f32 {
        self.clock.elapsed()
    }

    pub fn update(&mut self, input: &InputState) {
        let (_elapsed, delta_time) = self.clock.tick();
        self.apply_input(input, delta_time);
        self.poll_model_loader();
    }

    /// Writes the scroll and cursor derived values into the scene.
    pub fn apply_input(&mut self, input: &InputState, delta_time: f32) {
        let scroll = &input.scroll;
        let scroll_percentage = scroll.percentage();

        let light_x = parallax::light_x(scroll_percentage);
        for &light in &self.point_lights {
            self.scene.update_object_translation(light, |t| t.x = light_x);
        }

        let camera_y = parallax::camera_y(scroll.scroll_y, scroll.viewport_height);
        self.scene
            .update_object_translation(self.camera.node, |t| t.y = camera_y);

        let rig_position = self.rig_position();
        let target = parallax::parallax_target(input.cursor);
        let rig_position = parallax::damp(
            rig_position,
            target,
            self.config.parallax_rate,
            delta_time,
        );
        self.scene.update_object_translation(self.camera_rig, |t| {
            t.x = rig_position.x;
            t.y = rig_position.y;
        });

        self.stats = FrameStats {
            delta_time,
            scroll_percentage,
            light_x,
            camera_y,
            rig_position,
        };
    }

    pub fn rig_position(&self) -> Vec2 {
        self.scene
            .get_object_transform(self.camera_rig)
            .map(|transform| transform.translation().truncate())
            .unwrap_or(Vec2::ZERO)
    }

    pub fn on_resize(&mut self, input: &InputState) {
        let size = input.window_size();
        self.camera.set_aspect(size.x, size.y);
    }

    fn poll_model_loader(&mut self) {
        let Some(loader) = self.model_loader.as_mut() else {
            return;
        };

        let Some(result) = loader.poll() else {
            return;
        };

        self.model_loader = None;

        match result.and_then(|asset| self.attach_glass_model(&asset)) {
            Ok(root) => log::info!(
                "Glass model attached ({} objects)",
                self.scene.descendants(root).len()
            ),
            Err(e) => log::error!("Failed to load glass model: {:#}", e),
        }
    }

    /// Spawns the loaded model, turns it into glass and lights it.
    pub fn attach_glass_model(&mut self, asset: &GltfAsset) -> anyhow::Result<ObjectId> {
        let gltf_scene = asset.default_scene()?;
        let name = asset.path.display().to_string();

        let root = self.scene.spawn_gltf_scene(
            &name,
            &asset.buffers,
            &gltf_scene,
            self.glass_material,
        )?;

        self.configure_glass_model(root);
        Ok(root)
    }

    fn configure_glass_model(&mut self, root: ObjectId) {
        self.scene
            .set_object_translation(root, self.config.model_position);
        self.scene
            .override_meshes(root, self.glass_material, Layers::only(GLASS_LAYER));

        self.scene.add_object(
            Object3D::new("Model light")
                .with_translation(self.config.model_position)
                .with_light(Light::Directional {
                    color: Color::from_hex(self.config.model_light_color),
                    intensity: self.config.model_light_intensity,
                })
                .with_layers(Layers::default().with(GLASS_LAYER)),
        );

        self.glass_model = Some(root);
    }
}

/// Evenly spaced positions for a vertical column of lights centered on y = 0.
pub fn light_column_positions(count: usize, height: f32, x: f32) -> Vec<Vec3> {
    if count == 0 {
        return Vec::new();
    }

    if count == 1 {
        return vec![Vec3::new(x, 0.0, 0.0)];
    }

    (0..count)
        .map(|i| {
            let t = i as f32 / (count - 1) as f32;
            Vec3::new(x, (t - 0.5) * height, 0.0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo() -> DemoState {
        DemoState::build_scene(DemoConfig::default(), 1.5).unwrap()
    }

    fn input(cursor: Vec2, scroll_y: f32) -> InputState {
        let mut input = InputState::new(Vec2::new(1200.0, 800.0), 1.0, 2.0, 40.0);
        input.cursor = cursor;
        input.scroll.scroll_to(scroll_y);
        input
    }

    fn translation(state: &DemoState, id: ObjectId) -> Vec3 {
        state.scene.get_object_transform(id).unwrap().translation()
    }

    #[test]
    fn light_column_spans_height() {
        let positions = light_column_positions(50, 20.0, -5.0);

        assert_eq!(positions.len(), 50);
        assert_eq!(positions[0], Vec3::new(-5.0, -10.0, 0.0));
        assert_eq!(positions[49], Vec3::new(-5.0, 10.0, 0.0));

        let step = positions[1].y - positions[0].y;
        for pair in positions.windows(2) {
            assert!((pair[1].y - pair[0].y - step).abs() < 1e-4);
        }
    }

    #[test]
    fn light_column_edge_counts() {
        assert!(light_column_positions(0, 20.0, 0.0).is_empty());
        assert_eq!(
            light_column_positions(1, 20.0, 1.0),
            vec![Vec3::new(1.0, 0.0, 0.0)]
        );
    }

    #[test]
    fn bootstrap_builds_scene() {
        let state = demo();

        assert_eq!(state.point_lights.len(), 50);
        assert!(state.glass_model.is_none());

        let plane = state.scene.get_object_by_name("Background plane").unwrap();
        let plane = state.scene.get_object(plane).unwrap();
        assert_eq!(plane.layers, Layers::only(BACKGROUND_LAYER));
        assert_eq!(plane.transform.translation(), Vec3::new(0.0, 0.0, -10.0));

        let camera = state.scene.get_object(state.camera.node).unwrap();
        assert_eq!(camera.parent_id, Some(state.camera_rig));
        assert_eq!(camera.transform.translation(), Vec3::new(0.0, 3.0, 15.0));
    }

    #[test]
    fn no_light_reaches_the_background_plane() {
        let state = demo();
        let plane = state.scene.get_object_by_name("Background plane").unwrap();
        let plane_layers = state.scene.get_object(plane).unwrap().layers;

        assert!(state.scene.lights().count() >= 52);
        for (object, _) in state.scene.lights() {
            assert!(!object.layers.test(plane_layers), "{}", object.name);
            assert!(object.layers.is_enabled(GLASS_LAYER), "{}", object.name);
        }
    }

    #[test]
    fn camera_sees_all_layers() {
        let state = demo();
        assert!(state.camera.layers.is_enabled(GLASS_LAYER));
        assert!(state.camera.layers.is_enabled(BACKGROUND_LAYER));
    }

    #[test]
    fn scrolling_moves_lights_and_camera() {
        let mut state = demo();

        state.apply_input(&input(Vec2::ZERO, 0.0), 0.0);
        for &light in &state.point_lights {
            assert_eq!(translation(&state, light).x, -5.0);
        }
        assert_eq!(translation(&state, state.camera.node).y, 3.0);

        // 1600px document, 800px viewport: fully scrolled
        state.apply_input(&input(Vec2::ZERO, 800.0), 0.0);
        assert_eq!(state.stats.scroll_percentage, 1.0);
        for &light in &state.point_lights {
            assert_eq!(translation(&state, light).x, 5.0);
        }
        assert!((translation(&state, state.camera.node).y - 2.0).abs() < 1e-6);
    }

    #[test]
    fn lights_keep_their_column_height() {
        let mut state = demo();
        let before: Vec<f32> = state
            .point_lights
            .iter()
            .map(|&id| translation(&state, id).y)
            .collect();

        state.apply_input(&input(Vec2::ZERO, 400.0), 0.0);

        let after: Vec<f32> = state
            .point_lights
            .iter()
            .map(|&id| translation(&state, id).y)
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn rig_converges_on_cursor() {
        let mut state = demo();
        let input = input(Vec2::new(0.3, 0.2), 0.0);

        for _ in 0..300 {
            state.apply_input(&input, 1.0 / 60.0);
        }

        let rig = state.rig_position();
        assert!((rig - Vec2::new(0.3, -0.2)).length() < 1e-3);
    }

    #[test]
    fn centered_cursor_keeps_rig_at_origin() {
        let mut state = demo();
        state.apply_input(&input(Vec2::ZERO, 0.0), 1.0 / 60.0);
        assert_eq!(state.rig_position(), Vec2::ZERO);
    }

    #[test]
    fn resize_updates_camera_aspect() {
        let mut state = demo();
        let mut input = input(Vec2::ZERO, 0.0);

        input.on_resize(Vec2::new(1000.0, 500.0), 1.0);
        state.on_resize(&input);

        assert_eq!(state.camera.aspect, 2.0);
    }

    #[test]
    fn configured_model_becomes_glass() {
        let mut state = demo();
        let model = state
            .scene
            .add_model(SceneModel::new(Model::plane("Mesh", 1.0, 1.0)));
        let root = state.scene.add_object(Object3D::new("Model"));
        let mesh = state
            .scene
            .add_child(root, Object3D::new("Mesh").with_mesh(model, state.plane_material));
        let lights_before = state.scene.lights().count();

        state.configure_glass_model(root);

        assert_eq!(state.glass_model, Some(root));
        assert_eq!(translation(&state, root), Vec3::new(-3.6, 0.0, -5.0));

        let mesh = state.scene.get_object(mesh).unwrap();
        assert_eq!(mesh.material_id, Some(state.glass_material));
        assert_eq!(mesh.layers, Layers::only(GLASS_LAYER));
        assert_eq!(state.scene.lights().count(), lights_before + 1);
    }

    #[test]
    fn bundled_model_attaches_as_glass() {
        let mut state = demo();
        let asset = GltfAsset::import(state.config.model_path.into()).unwrap();
        let lights_before = state.scene.lights().count();

        let root = state.attach_glass_model(&asset).unwrap();
        state.scene.late_update();

        assert_eq!(state.glass_model, Some(root));
        assert_eq!(translation(&state, root), Vec3::new(-3.6, 0.0, -5.0));
        assert_eq!(state.scene.lights().count(), lights_before + 1);

        let meshes: Vec<&Object3D> = state
            .scene
            .descendants(root)
            .into_iter()
            .filter_map(|id| state.scene.get_object(id))
            .filter(|object| object.is_mesh())
            .collect();

        assert!(!meshes.is_empty());
        for mesh in meshes {
            assert_eq!(mesh.material_id, Some(state.glass_material), "{}", mesh.name);
            assert_eq!(mesh.layers, Layers::only(GLASS_LAYER), "{}", mesh.name);
        }
    }

    #[test]
    fn clock_starts_at_zero() {
        let mut clock = Clock::new();
        assert_eq!(clock.tick(), (0.0, 0.0));

        let (_, delta) = clock.tick();
        assert!(delta >= 0.0);
    }
}
