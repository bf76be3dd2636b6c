use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use wgpu::util::DeviceExt;

use crate::scene_graph::{light::Light, scene::Scene};

pub const MAX_AMBIENT_LIGHTS: usize = 4;
pub const MAX_DIRECTIONAL_LIGHTS: usize = 4;
pub const MAX_POINT_LIGHTS: usize = 64;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable, PartialEq)]
pub struct AmbientLightData {
    pub color: [f32; 3],
    pub layers: u32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable, PartialEq)]
pub struct DirectionalLightData {
    /// Unit vector pointing toward the light.
    pub direction: [f32; 3],
    pub layers: u32,
    pub color: [f32; 3],
    _padding: f32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable, PartialEq)]
pub struct PointLightData {
    pub position: [f32; 3],
    pub layers: u32,
    pub color: [f32; 3],
    pub distance: f32,
    pub decay: f32,
    _padding: [f32; 3],
}

/// Mirrors `Lights` in `shared/common.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct LightUniform {
    pub ambient: [AmbientLightData; MAX_AMBIENT_LIGHTS],
    pub directional: [DirectionalLightData; MAX_DIRECTIONAL_LIGHTS],
    pub point: [PointLightData; MAX_POINT_LIGHTS],
    /// Ambient, directional and point counts. The last lane is unused.
    pub counts: [u32; 4],
}

impl LightUniform {
    /// Packs every light in the scene. Lights past a kind's capacity are dropped.
    pub fn from_scene(scene: &Scene) -> Self {
        let mut uniform = Self::zeroed();

        for (object, light) in scene.lights() {
            let layers = object.layers.mask();
            let radiance = light.radiance().to_array();
            let position = object.transform.world_position();

            match *light {
                Light::Ambient { .. } => {
                    let count = &mut uniform.counts[0];
                    if let Some(slot) = uniform.ambient.get_mut(*count as usize) {
                        *slot = AmbientLightData {
                            color: radiance,
                            layers,
                        };
                        *count += 1;
                    }
                }
                Light::Directional { .. } => {
                    let count = &mut uniform.counts[1];
                    if let Some(slot) = uniform.directional.get_mut(*count as usize) {
                        *slot = DirectionalLightData {
                            direction: position.try_normalize().unwrap_or(Vec3::Y).to_array(),
                            layers,
                            color: radiance,
                            _padding: 0.0,
                        };
                        *count += 1;
                    }
                }
                Light::Point {
                    distance, decay, ..
                } => {
                    let count = &mut uniform.counts[2];
                    if let Some(slot) = uniform.point.get_mut(*count as usize) {
                        *slot = PointLightData {
                            position: position.to_array(),
                            layers,
                            color: radiance,
                            distance,
                            decay,
                            _padding: [0.0; 3],
                        };
                        *count += 1;
                    }
                }
            }
        }

        uniform
    }

    pub fn create_buffer(&self, device: &wgpu::Device) -> wgpu::Buffer {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Uniform Buffer"),
            contents: bytemuck::bytes_of(self),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        })
    }

    pub fn update_buffer(&self, queue: &wgpu::Queue, buffer: &wgpu::Buffer) {
        queue.write_buffer(buffer, 0, bytemuck::bytes_of(self));
    }
}
