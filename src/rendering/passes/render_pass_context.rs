use id_arena::Arena;

use crate::{
    rendering::{
        instance::{DrawBatch, InstanceBuffer},
        render_common::RenderCommon,
        render_material::{MaterialKind, RenderMaterialManager},
        render_model::RenderModel,
        shader_loader::{PipelineCache, PipelineId},
    },
    scene_graph::{material::Side, scene::Scene},
};

pub struct RenderPassContext<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub pipeline_cache: &'a PipelineCache,
    pub common: &'a RenderCommon,
    pub draw_list: &'a DrawList<'a>,
}

/// One pipeline per face culling mode.
#[derive(Debug, Clone, Copy)]
pub struct SidePipelines {
    pub front: PipelineId,
    pub double: PipelineId,
}

impl SidePipelines {
    pub fn get(&self, side: Side) -> PipelineId {
        match side {
            Side::Front => self.front,
            Side::Double => self.double,
        }
    }
}

/// Everything needed to issue this frame's draws.
pub struct DrawList<'a> {
    pub scene: &'a Scene,
    pub batches: &'a [DrawBatch],
    /// Instances actually uploaded. Batches past this are skipped.
    pub instance_count: u32,
    pub instance_buffer: &'a InstanceBuffer,
    pub render_models: &'a Arena<RenderModel>,
    pub materials: &'a RenderMaterialManager,
}

impl DrawList<'_> {
    /// Draws every batch whose material is of `kind`. Group 0 must already be bound.
    pub fn draw(
        &self,
        render_pass: &mut wgpu::RenderPass<'_>,
        kind: MaterialKind,
        pipeline_cache: &PipelineCache,
        pipelines: SidePipelines,
    ) {
        self.instance_buffer.bind(render_pass);

        for batch in self.batches {
            let Some(material) = self.materials.get(batch.material_id) else {
                continue;
            };

            if material.kind != kind {
                continue;
            }

            let end = batch.instances.end.min(self.instance_count);
            if batch.instances.start >= end {
                continue;
            }

            let Some(render_model) = self
                .scene
                .models
                .get(batch.model_id)
                .and_then(|model| model.render_model)
                .and_then(|id| self.render_models.get(id))
            else {
                continue;
            };

            let Some(pipeline) = pipeline_cache.get(pipelines.get(material.side)) else {
                continue;
            };

            render_pass.set_pipeline(pipeline);
            render_pass.set_bind_group(1, &material.bind_group, &[]);
            render_model.draw(render_pass, batch.instances.start..end);
        }
    }
}
