use std::sync::Arc;

use wgpu::RenderPassDescriptor;

use crate::rendering::{
    passes::{
        add_scene_pipelines,
        render_pass_context::{RenderPassContext, SidePipelines},
        ScenePipelineDesc,
    },
    render_common::RenderCommon,
    render_material::MaterialKind,
    shader_loader::{PipelineCacheBuilder, ShaderDefinition},
};

const GLASS_SHADER: ShaderDefinition = ShaderDefinition {
    name: "Glass shader",
    path: "glass.wgsl",
};

/// Blends the lit, transmissive (physical material) meshes over the background.
/// Depth is tested but not written so overlapping glass surfaces all show.
pub struct GlassPass {
    pipelines: SidePipelines,
}

pub struct GlassPassTextureViews<'a> {
    pub color: &'a wgpu::TextureView,
    pub depth: &'a wgpu::TextureView,
}

impl GlassPass {
    pub fn create(
        device: &wgpu::Device,
        common: Arc<RenderCommon>,
        cache_builder: &mut PipelineCacheBuilder,
    ) -> anyhow::Result<Self> {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Glass pipeline layout"),
            bind_group_layouts: &[
                &common.frame_bind_group_layout,
                &common.material_layouts.physical,
            ],
            push_constant_ranges: &[],
        });

        let pipelines = add_scene_pipelines(
            cache_builder,
            GLASS_SHADER,
            ScenePipelineDesc {
                label: "Glass pipeline",
                layout,
                format: common.output_format(),
                blend: wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING,
                depth_write: false,
            },
        );

        Ok(Self { pipelines })
    }

    pub fn render(&self, texture_views: &GlassPassTextureViews, context: &mut RenderPassContext) {
        let mut render_pass = context.encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some("Glass pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: texture_views.color,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: texture_views.depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        render_pass.set_bind_group(0, &context.common.frame_bind_group, &[]);
        context.draw_list.draw(
            &mut render_pass,
            MaterialKind::Physical,
            context.pipeline_cache,
            self.pipelines,
        );
    }
}
