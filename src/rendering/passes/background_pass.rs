use std::sync::Arc;

use wgpu::RenderPassDescriptor;

use crate::{
    color::Color,
    rendering::{
        passes::{
            add_scene_pipelines,
            render_pass_context::{RenderPassContext, SidePipelines},
            ScenePipelineDesc,
        },
        render_common::RenderCommon,
        render_material::MaterialKind,
        shader_loader::{PipelineCacheBuilder, ShaderDefinition},
    },
};

const BACKGROUND_SHADER: ShaderDefinition = ShaderDefinition {
    name: "Background shader",
    path: "background.wgsl",
};

/// Clears the frame and draws the unlit (basic material) meshes.
pub struct BackgroundPass {
    pipelines: SidePipelines,
}

pub struct BackgroundPassTextureViews<'a> {
    pub color: &'a wgpu::TextureView,
    pub depth: &'a wgpu::TextureView,
}

impl BackgroundPass {
    pub fn create(
        device: &wgpu::Device,
        common: Arc<RenderCommon>,
        cache_builder: &mut PipelineCacheBuilder,
    ) -> anyhow::Result<Self> {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Background pipeline layout"),
            bind_group_layouts: &[
                &common.frame_bind_group_layout,
                &common.material_layouts.basic,
            ],
            push_constant_ranges: &[],
        });

        let pipelines = add_scene_pipelines(
            cache_builder,
            BACKGROUND_SHADER,
            ScenePipelineDesc {
                label: "Background pipeline",
                layout,
                format: common.output_format(),
                blend: wgpu::BlendState::REPLACE,
                depth_write: true,
            },
        );

        Ok(Self { pipelines })
    }

    pub fn render(
        &self,
        texture_views: &BackgroundPassTextureViews,
        clear_color: Color,
        context: &mut RenderPassContext,
    ) {
        let clear = clear_color.linear();

        let mut render_pass = context.encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some("Background pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: texture_views.color,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: clear.x as f64,
                        g: clear.y as f64,
                        b: clear.z as f64,
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: texture_views.depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
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
            MaterialKind::Basic,
            context.pipeline_cache,
            self.pipelines,
        );
    }
}
