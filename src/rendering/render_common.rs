use std::sync::RwLock;

use wgpu::SurfaceConfiguration;
use winit::dpi::PhysicalSize;

use crate::rendering::{bind_group_builder::BindGroupBuilder, config::RenderConfig};

/// State shared by every pass: the output surface format and the per-frame
/// bind group (camera and lights, group 0).
pub struct RenderCommon {
    pub output_surface_config: RwLock<SurfaceConfiguration>,
    pub frame_bind_group_layout: wgpu::BindGroupLayout,
    pub frame_bind_group: wgpu::BindGroup,
    pub material_layouts: MaterialLayouts,
}

pub struct MaterialLayouts {
    pub basic: wgpu::BindGroupLayout,
    pub physical: wgpu::BindGroupLayout,
}

impl RenderCommon {
    pub fn new(
        device: &wgpu::Device,
        adapter: &wgpu::Adapter,
        surface: &wgpu::Surface,
        size: PhysicalSize<u32>,
        config: &RenderConfig,
        camera_uniform_buffer: &wgpu::Buffer,
        light_uniform_buffer: &wgpu::Buffer,
        material_layouts: MaterialLayouts,
    ) -> Self {
        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let output_surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: config.present_mode(),
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(device, &output_surface_config);

        let (frame_bind_group_layout, frame_bind_group) =
            BindGroupBuilder::new("Frame", wgpu::ShaderStages::VERTEX_FRAGMENT)
                .uniform(0, camera_uniform_buffer)
                .uniform(1, light_uniform_buffer)
                .build(device);

        Self {
            output_surface_config: RwLock::new(output_surface_config),
            frame_bind_group_layout,
            frame_bind_group,
            material_layouts,
        }
    }

    pub fn output_format(&self) -> wgpu::TextureFormat {
        match self.output_surface_config.read() {
            Ok(config) => config.format,
            Err(poisoned) => poisoned.into_inner().format,
        }
    }
}
