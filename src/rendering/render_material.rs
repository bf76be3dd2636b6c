use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::{
    rendering::{bind_group_builder::BindGroupBuilder, texture::Texture},
    scene_graph::{
        material::{BasicMaterial, Material, MaterialId, PhysicalMaterial, Side, TextureHandle},
        scene::Scene,
    },
};

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable, PartialEq)]
pub struct BasicMaterialUniform {
    pub color: [f32; 4],
}

impl From<&BasicMaterial> for BasicMaterialUniform {
    fn from(material: &BasicMaterial) -> Self {
        Self {
            color: material.color.linear().extend(1.0).to_array(),
        }
    }
}

/// Mirrors `PhysicalMaterial` in `glass.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable, PartialEq)]
pub struct PhysicalMaterialUniform {
    pub color: [f32; 3],
    pub opacity: f32,
    pub transmission: f32,
    pub metalness: f32,
    pub roughness: f32,
    pub ior: f32,
    pub f0: f32,
    pub thickness: f32,
    pub clearcoat: f32,
    pub clearcoat_roughness: f32,
    pub env_map_intensity: f32,
    _padding: [f32; 3],
}

impl From<&PhysicalMaterial> for PhysicalMaterialUniform {
    fn from(material: &PhysicalMaterial) -> Self {
        Self {
            color: material.color.linear().to_array(),
            opacity: material.opacity,
            transmission: material.transmission,
            metalness: material.metalness,
            roughness: material.roughness,
            ior: material.ior,
            f0: material.f0(),
            thickness: material.thickness,
            clearcoat: material.clearcoat,
            clearcoat_roughness: material.clearcoat_roughness,
            env_map_intensity: material.env_map_intensity,
            _padding: [0.0; 3],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialKind {
    Basic,
    Physical,
}

pub struct RenderMaterial {
    pub kind: MaterialKind,
    pub side: Side,
    pub bind_group: wgpu::BindGroup,
    buffer: wgpu::Buffer,
}

/// GPU side of the scene's materials. Uniforms are rewritten every frame so
/// edits to scene materials show up immediately.
pub struct RenderMaterialManager {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub basic_layout: wgpu::BindGroupLayout,
    pub physical_layout: wgpu::BindGroupLayout,
    white: Texture,
    textures: HashMap<TextureHandle, Texture>,
    materials: HashMap<MaterialId, RenderMaterial>,
}

impl RenderMaterialManager {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let white = Texture::white(device, queue);

        let placeholder = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Material layout placeholder"),
            size: size_of::<PhysicalMaterialUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM,
            mapped_at_creation: false,
        });

        let basic_layout = Self::basic_bindings(&placeholder, &white).build_layout(device);
        let physical_layout = Self::physical_bindings(&placeholder).build_layout(device);

        Self {
            device: device.clone(),
            queue: queue.clone(),
            basic_layout,
            physical_layout,
            white,
            textures: HashMap::new(),
            materials: HashMap::new(),
        }
    }

    fn basic_bindings<'a>(buffer: &'a wgpu::Buffer, map: &'a Texture) -> BindGroupBuilder<'a> {
        BindGroupBuilder::new("Basic material", wgpu::ShaderStages::VERTEX_FRAGMENT)
            .uniform(0, buffer)
            .texture(1, &map.view)
            .sampler(2, &map.sampler)
    }

    fn physical_bindings(buffer: &wgpu::Buffer) -> BindGroupBuilder<'_> {
        BindGroupBuilder::new("Physical material", wgpu::ShaderStages::VERTEX_FRAGMENT)
            .uniform(0, buffer)
    }

    pub fn get(&self, id: MaterialId) -> Option<&RenderMaterial> {
        self.materials.get(&id)
    }

    /// Creates GPU resources for new materials and rewrites every uniform.
    pub fn sync(&mut self, scene: &Scene) -> anyhow::Result<()> {
        for (id, material) in scene.materials.iter() {
            if !self.materials.contains_key(&id) {
                let render_material = self.create(material)?;
                self.materials.insert(id, render_material);
            }

            if let Some(render_material) = self.materials.get(&id) {
                match material {
                    Material::Basic(basic) => self.queue.write_buffer(
                        &render_material.buffer,
                        0,
                        bytemuck::bytes_of(&BasicMaterialUniform::from(basic)),
                    ),
                    Material::Physical(physical) => self.queue.write_buffer(
                        &render_material.buffer,
                        0,
                        bytemuck::bytes_of(&PhysicalMaterialUniform::from(physical)),
                    ),
                }
            }
        }

        Ok(())
    }

    fn create(&mut self, material: &Material) -> anyhow::Result<RenderMaterial> {
        match material {
            Material::Basic(basic) => {
                if let Some(handle) = basic.map {
                    self.load_texture(handle)?;
                }

                let buffer = self.create_buffer(
                    "Basic material uniform",
                    bytemuck::bytes_of(&BasicMaterialUniform::from(basic)),
                );
                let map = basic
                    .map
                    .and_then(|handle| self.textures.get(&handle))
                    .unwrap_or(&self.white);
                let bind_group = Self::basic_bindings(&buffer, map)
                    .build_group(&self.device, &self.basic_layout);

                Ok(RenderMaterial {
                    kind: MaterialKind::Basic,
                    side: basic.side,
                    bind_group,
                    buffer,
                })
            }
            Material::Physical(physical) => {
                let buffer = self.create_buffer(
                    "Physical material uniform",
                    bytemuck::bytes_of(&PhysicalMaterialUniform::from(physical)),
                );
                let bind_group = Self::physical_bindings(&buffer)
                    .build_group(&self.device, &self.physical_layout);

                Ok(RenderMaterial {
                    kind: MaterialKind::Physical,
                    side: physical.side,
                    bind_group,
                    buffer,
                })
            }
        }
    }

    fn create_buffer(&self, label: &str, contents: &[u8]) -> wgpu::Buffer {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            })
    }

    fn load_texture(&mut self, handle: TextureHandle) -> anyhow::Result<()> {
        if !self.textures.contains_key(&handle) {
            let texture = Texture::load(&self.device, &self.queue, handle.path, handle.mag_filter)?;
            self.textures.insert(handle, texture);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    #[test]
    fn uniform_sizes_match_wgsl() {
        assert_eq!(size_of::<BasicMaterialUniform>(), 16);
        assert_eq!(size_of::<PhysicalMaterialUniform>(), 64);
    }

    #[test]
    fn glass_uniform_carries_parameters() {
        let glass = PhysicalMaterial::glass();
        let uniform = PhysicalMaterialUniform::from(&glass);

        assert_eq!(uniform.color, [1.0, 1.0, 1.0]);
        assert_eq!(uniform.opacity, 0.1);
        assert_eq!(uniform.transmission, 1.0);
        assert_eq!(uniform.ior, 1.45);
        assert_eq!(uniform.f0, glass.f0());
        assert_eq!(uniform.clearcoat_roughness, 0.1);
    }

    #[test]
    fn basic_uniform_is_opaque() {
        let material = BasicMaterial {
            color: Color::BLACK,
            ..Default::default()
        };
        assert_eq!(
            BasicMaterialUniform::from(&material).color,
            [0.0, 0.0, 0.0, 1.0]
        );
    }
}
