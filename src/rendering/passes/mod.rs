pub mod background_pass;
pub mod glass_pass;
pub mod render_pass_context;

use wgpu::{
    DepthBiasState, MultisampleState, PipelineCompilationOptions, ShaderSource, StencilState,
};

use crate::{
    model::MODEL_VBL,
    rendering::{
        instance::Instance,
        passes::render_pass_context::SidePipelines,
        shader_loader::{PipelineCacheBuilder, ShaderDefinition},
        texture::DepthTexture,
    },
    scene_graph::material::Side,
};

/// Fixed-function state of a scene pipeline. The shader decides the rest.
#[derive(Clone)]
pub(crate) struct ScenePipelineDesc {
    pub label: &'static str,
    pub layout: wgpu::PipelineLayout,
    pub format: wgpu::TextureFormat,
    pub blend: wgpu::BlendState,
    pub depth_write: bool,
}

pub(crate) fn primitive_state(side: Side) -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleList,
        strip_index_format: None,
        front_face: wgpu::FrontFace::Ccw,
        cull_mode: match side {
            Side::Front => Some(wgpu::Face::Back),
            Side::Double => None,
        },
        polygon_mode: wgpu::PolygonMode::Fill,
        unclipped_depth: false,
        conservative: false,
    }
}

fn create_scene_pipeline(
    device: &wgpu::Device,
    shader_def: &ShaderDefinition,
    source: &str,
    desc: &ScenePipelineDesc,
    side: Side,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(shader_def.name),
        source: ShaderSource::Wgsl(source.into()),
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(&desc.layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[MODEL_VBL, Instance::descriptor()],
            compilation_options: PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: desc.format,
                blend: Some(desc.blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: PipelineCompilationOptions::default(),
        }),
        primitive: primitive_state(side),
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DepthTexture::DEPTH_FORMAT,
            depth_write_enabled: desc.depth_write,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        }),
        multisample: MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

/// Registers the front-only and double-sided variants of one shader.
pub(crate) fn add_scene_pipelines(
    cache_builder: &mut PipelineCacheBuilder,
    shader_def: ShaderDefinition,
    desc: ScenePipelineDesc,
) -> SidePipelines {
    let mut add = |side: Side| {
        let desc = desc.clone();
        cache_builder.add_shader(
            shader_def.clone(),
            Box::new(
                move |device: &wgpu::Device, shader_def: &ShaderDefinition, source: &str| {
                    Ok(create_scene_pipeline(device, shader_def, source, &desc, side))
                },
            ),
        )
    };

    SidePipelines {
        front: add(Side::Front),
        double: add(Side::Double),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn culling_follows_side() {
        assert_eq!(primitive_state(Side::Front).cull_mode, Some(wgpu::Face::Back));
        assert_eq!(primitive_state(Side::Double).cull_mode, None);
        assert_eq!(primitive_state(Side::Front).front_face, wgpu::FrontFace::Ccw);
    }
}
