use glam::{Mat4, Vec4};
use wgpu::util::DeviceExt;

use crate::scene_graph::{layers::Layers, object3d::ObjectId, scene::Scene};

/// Perspective camera attached to a scene node. It looks down the node's -Z.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub node: ObjectId,
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub layers: Layers,
}

impl PerspectiveCamera {
    pub fn set_aspect(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_degrees.to_radians(),
            self.aspect,
            self.near,
            self.far,
        )
    }

    pub fn world_matrix(&self, scene: &Scene) -> Mat4 {
        scene.world_matrix(self.node).unwrap_or(Mat4::IDENTITY)
    }

    pub fn view_matrix(&self, scene: &Scene) -> Mat4 {
        self.world_matrix(scene).inverse()
    }

    pub fn get_vp_matrix(&self, scene: &Scene) -> Mat4 {
        self.projection_matrix() * self.view_matrix(scene)
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Default)]
pub struct CameraUniform {
    view_proj: Mat4,
    position: Vec4,
}

impl CameraUniform {
    pub fn update(&mut self, camera: &PerspectiveCamera, scene: &Scene) {
        self.view_proj = camera.get_vp_matrix(scene);
        self.position = camera.world_matrix(scene).w_axis;
    }

    pub fn create_buffer(&self, device: &wgpu::Device) -> wgpu::Buffer {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Uniform Buffer"),
            contents: bytemuck::cast_slice(&[*self]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        })
    }

    pub fn update_buffer(&self, queue: &wgpu::Queue, buffer: &wgpu::Buffer) {
        queue.write_buffer(buffer, 0, bytemuck::cast_slice(&[*self]));
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::scene_graph::object3d::Object3D;

    fn camera(scene: &mut Scene) -> PerspectiveCamera {
        let node = scene
            .add_object(Object3D::new("Camera").with_translation(Vec3::new(0.0, 3.0, 15.0)));

        PerspectiveCamera {
            node,
            fov_y_degrees: 35.0,
            aspect: 1.0,
            near: 0.1,
            far: 100.0,
            layers: Layers::default(),
        }
    }

    #[test]
    fn resize_sets_aspect() {
        let mut scene = Scene::new();
        let mut camera = camera(&mut scene);

        camera.set_aspect(1920.0, 1080.0);
        assert!((camera.aspect - 16.0 / 9.0).abs() < 1e-6);

        camera.set_aspect(0.0, 0.0);
        assert!((camera.aspect - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn view_moves_world_opposite_to_camera() {
        let mut scene = Scene::new();
        let camera = camera(&mut scene);
        scene.late_update();

        let view = camera.view_matrix(&scene);
        let origin_in_view = view.transform_point3(Vec3::ZERO);
        assert!((origin_in_view - Vec3::new(0.0, -3.0, -15.0)).length() < 1e-5);
    }

    #[test]
    fn point_in_front_projects_inside_clip_volume() {
        let mut scene = Scene::new();
        let camera = camera(&mut scene);
        scene.late_update();

        let clip = camera.get_vp_matrix(&scene) * Vec3::new(0.0, 3.0, 0.0).extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn uniform_tracks_camera_position() {
        let mut scene = Scene::new();
        let camera = camera(&mut scene);
        scene.late_update();

        let mut uniform = CameraUniform::default();
        uniform.update(&camera, &scene);
        assert_eq!(uniform.position, Vec4::new(0.0, 3.0, 15.0, 1.0));
    }
}
