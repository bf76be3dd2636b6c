use std::ops::Range;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::BufferUsages;

use crate::scene_graph::{
    layers::Layers, material::MaterialId, scene::Scene, scene_model::SceneModelId,
};

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable, PartialEq)]
pub struct Instance {
    pub model: Mat4,
    pub normal: Mat4,
    pub layers: u32,
    _padding: [u32; 3],
}

impl Instance {
    const ATTRIBUTES: [wgpu::VertexAttribute; 9] = wgpu::vertex_attr_array![
        5 => Float32x4,
        6 => Float32x4,
        7 => Float32x4,
        8 => Float32x4,
        9 => Float32x4,
        10 => Float32x4,
        11 => Float32x4,
        12 => Float32x4,
        13 => Uint32,
    ];

    pub fn new(world: Mat4, layers: Layers) -> Self {
        Self {
            model: world,
            normal: world.inverse().transpose(),
            layers: layers.mask(),
            _padding: [0; 3],
        }
    }

    pub fn descriptor() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Instance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// A run of instances sharing one model and one material.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawBatch {
    pub model_id: SceneModelId,
    pub material_id: MaterialId,
    pub instances: Range<u32>,
}

#[derive(Debug, Default)]
pub struct FrameInstances {
    pub instances: Vec<Instance>,
    pub batches: Vec<DrawBatch>,
}

/// Collects every mesh the camera can see, grouped by model and material.
pub fn gather_instances(scene: &Scene, camera_layers: Layers) -> FrameInstances {
    let mut groups: Vec<((SceneModelId, MaterialId), Vec<Instance>)> = Vec::new();

    for (_, object) in scene.objects.iter() {
        let (Some(model_id), Some(material_id)) = (object.model_id, object.material_id) else {
            continue;
        };

        if !camera_layers.test(object.layers) {
            continue;
        }

        let instance = Instance::new(*object.transform.get_world_matrix(), object.layers);
        let key = (model_id, material_id);

        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, instances)) => instances.push(instance),
            None => groups.push((key, vec![instance])),
        }
    }

    let mut frame = FrameInstances::default();

    for ((model_id, material_id), instances) in groups {
        let start = frame.instances.len() as u32;
        frame.instances.extend(instances);
        frame.batches.push(DrawBatch {
            model_id,
            material_id,
            instances: start..frame.instances.len() as u32,
        });
    }

    frame
}

pub struct InstanceBuffer {
    buffer: wgpu::Buffer,
    capacity: u64,
}

impl InstanceBuffer {
    pub fn new(device: &wgpu::Device, capacity: u64) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Instance buffer"),
            size: size_of::<Instance>() as u64 * capacity,
            usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self { buffer, capacity }
    }

    /// Uploads as many instances as fit and returns how many were written.
    pub fn write(&self, queue: &wgpu::Queue, instances: &[Instance]) -> u32 {
        let count = instances.len().min(self.capacity as usize);

        if count < instances.len() {
            log::warn!(
                "Instance buffer full, dropping {} instances",
                instances.len() - count
            );
        }

        if count > 0 {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&instances[..count]));
        }

        count as u32
    }

    pub fn bind(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(1, self.buffer.slice(..));
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::model::Model;
    use crate::scene_graph::{
        layers::{BACKGROUND_LAYER, GLASS_LAYER},
        material::{BasicMaterial, Material, PhysicalMaterial},
        object3d::Object3D,
        scene_model::SceneModel,
    };

    #[test]
    fn instance_layout_matches_shader() {
        assert_eq!(size_of::<Instance>(), 144);
        let stride = Instance::descriptor().array_stride;
        assert_eq!(stride, 144);
    }

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let world = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let instance = Instance::new(world, Layers::default());
        let normal = instance.normal.transform_vector3(Vec3::X);
        assert!((normal - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn groups_by_model_and_material() {
        let mut scene = Scene::new();
        let quad = scene.add_model(SceneModel::new(Model::plane("Quad", 1.0, 1.0)));
        let basic = scene.add_material(Material::Basic(BasicMaterial::default()));
        let glass = scene.add_material(Material::Physical(PhysicalMaterial::glass()));

        for name in ["A", "B", "C"] {
            scene.add_object(Object3D::new(name).with_mesh(quad, glass));
        }
        scene.add_object(Object3D::new("D").with_mesh(quad, basic));
        scene.add_object(Object3D::new("Group"));
        scene.late_update();

        let frame = gather_instances(&scene, Layers::default());

        assert_eq!(frame.instances.len(), 4);
        assert_eq!(frame.batches.len(), 2);
        assert_eq!(frame.batches[0].material_id, glass);
        assert_eq!(frame.batches[0].instances, 0..3);
        assert_eq!(frame.batches[1].material_id, basic);
        assert_eq!(frame.batches[1].instances, 3..4);
    }

    #[test]
    fn camera_layers_filter_objects() {
        let mut scene = Scene::new();
        let quad = scene.add_model(SceneModel::new(Model::plane("Quad", 1.0, 1.0)));
        let basic = scene.add_material(Material::Basic(BasicMaterial::default()));

        scene.add_object(
            Object3D::new("Background")
                .with_mesh(quad, basic)
                .with_layers(Layers::only(BACKGROUND_LAYER)),
        );
        scene.add_object(
            Object3D::new("Glass")
                .with_mesh(quad, basic)
                .with_layers(Layers::only(GLASS_LAYER)),
        );
        scene.late_update();

        let glass_only = gather_instances(&scene, Layers::only(GLASS_LAYER));
        assert_eq!(glass_only.instances.len(), 1);
        assert_eq!(glass_only.instances[0].layers, 1 << GLASS_LAYER);

        let everything = gather_instances(
            &scene,
            Layers::default().with(GLASS_LAYER).with(BACKGROUND_LAYER),
        );
        assert_eq!(everything.instances.len(), 2);
    }
}
