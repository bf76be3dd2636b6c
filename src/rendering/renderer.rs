use std::sync::Arc;

use anyhow::Context;
use id_arena::Arena;
use wgpu::CommandEncoderDescriptor;
use winit::{dpi::PhysicalSize, window::Window};

use crate::{
    camera::CameraUniform,
    demo::DemoState,
    rendering::{
        config::RenderConfig,
        imgui_renderer::ImguiRendererState,
        instance::{gather_instances, InstanceBuffer},
        light_uniform::LightUniform,
        passes::{
            background_pass::{BackgroundPass, BackgroundPassTextureViews},
            glass_pass::{GlassPass, GlassPassTextureViews},
            render_pass_context::{DrawList, RenderPassContext},
        },
        render_common::{MaterialLayouts, RenderCommon},
        render_material::RenderMaterialManager,
        render_model::RenderModel,
        shader_loader::{PipelineCacheBuilder, ShaderLoader},
        texture::DepthTexture,
    },
    scene_graph::scene::Scene,
};

/// A frame whose scene passes are recorded but not yet submitted.
pub struct Frame {
    output: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
    encoder: wgpu::CommandEncoder,
}

pub struct Renderer {
    pub window: Arc<Window>,
    pub size: PhysicalSize<u32>,

    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,

    common: Arc<RenderCommon>,
    depth_texture: DepthTexture,
    render_models: Arena<RenderModel>,
    materials: RenderMaterialManager,
    instance_buffer: InstanceBuffer,

    camera_uniform: CameraUniform,
    camera_buffer: wgpu::Buffer,
    light_buffer: wgpu::Buffer,

    shader_loader: ShaderLoader,

    background_pass: BackgroundPass,
    glass_pass: GlassPass,
    imgui_renderer: ImguiRendererState,
}

impl Renderer {
    pub async fn new(
        window: Arc<Window>,
        demo_state: &mut DemoState,
        imgui_context: &mut imgui::Context,
        config: RenderConfig,
    ) -> anyhow::Result<Renderer> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No suitable GPU adapter")?;

        log::info!("Using adapter {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                label: None,
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("Failed to create device")?;

        let mut camera_uniform = CameraUniform::default();
        camera_uniform.update(&demo_state.camera, &demo_state.scene);
        let camera_buffer = camera_uniform.create_buffer(&device);
        let light_buffer = LightUniform::from_scene(&demo_state.scene).create_buffer(&device);

        let mut materials = RenderMaterialManager::new(&device, &queue);
        // Fails on a missing texture, which is fatal at startup.
        materials.sync(&demo_state.scene)?;

        let common = Arc::new(RenderCommon::new(
            &device,
            &adapter,
            &surface,
            size,
            &config,
            &camera_buffer,
            &light_buffer,
            MaterialLayouts {
                basic: materials.basic_layout.clone(),
                physical: materials.physical_layout.clone(),
            },
        ));

        let depth_texture = {
            let surface_config = common
                .output_surface_config
                .read()
                .map_err(|_| anyhow::anyhow!("Surface config lock poisoned"))?;
            DepthTexture::new(&device, &surface_config, "Depth texture")
        };

        let mut cache_builder = PipelineCacheBuilder::new();
        let background_pass = BackgroundPass::create(&device, common.clone(), &mut cache_builder)?;
        let glass_pass = GlassPass::create(&device, common.clone(), &mut cache_builder)?;
        let shader_loader = ShaderLoader::new(device.clone(), cache_builder)?;

        let imgui_renderer =
            ImguiRendererState::new(&device, &queue, common.output_format(), imgui_context);

        let instance_buffer = InstanceBuffer::new(&device, config.max_instances);

        let mut renderer = Self {
            window,
            size,
            surface,
            device,
            queue,
            common,
            depth_texture,
            render_models: Arena::new(),
            materials,
            instance_buffer,
            camera_uniform,
            camera_buffer,
            light_buffer,
            shader_loader,
            background_pass,
            glass_pass,
            imgui_renderer,
        };

        renderer.upload_models(&mut demo_state.scene);

        Ok(renderer)
    }

    /// Uploads every scene model that has no GPU buffers yet.
    pub fn upload_models(&mut self, scene: &mut Scene) {
        for (_id, scene_model) in scene.models.iter_mut() {
            if scene_model.render_model.is_some() {
                continue;
            }

            let render_model = RenderModel::from_model(&self.device, &scene_model.model);
            scene_model.render_model = Some(self.render_models.alloc(render_model));

            log::info!(
                "Uploaded model {} with {} primitives",
                scene_model.model.name,
                scene_model.model.primitives.len()
            );
        }
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        let mut config = match self.common.output_surface_config.write() {
            Ok(config) => config,
            Err(poisoned) => poisoned.into_inner(),
        };

        self.size = new_size;
        config.width = new_size.width;
        config.height = new_size.height;
        self.surface.configure(&self.device, &config);
        self.depth_texture.resize(&self.device, &config);
    }

    /// Records the scene passes. The debug UI is added by `finish_frame`.
    pub fn render(&mut self, demo_state: &mut DemoState) -> Result<Frame, wgpu::SurfaceError> {
        self.shader_loader.load_pending_shaders();
        self.upload_models(&mut demo_state.scene);

        if let Err(e) = self.materials.sync(&demo_state.scene) {
            log::error!("Failed to update materials: {:#}", e);
        }

        let scene = &demo_state.scene;

        self.camera_uniform.update(&demo_state.camera, scene);
        self.camera_uniform
            .update_buffer(&self.queue, &self.camera_buffer);
        LightUniform::from_scene(scene).update_buffer(&self.queue, &self.light_buffer);

        let frame_instances = gather_instances(scene, demo_state.camera.layers);
        let instance_count = self
            .instance_buffer
            .write(&self.queue, &frame_instances.instances);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let draw_list = DrawList {
            scene,
            batches: &frame_instances.batches,
            instance_count,
            instance_buffer: &self.instance_buffer,
            render_models: &self.render_models,
            materials: &self.materials,
        };

        let mut context = RenderPassContext {
            encoder: &mut encoder,
            pipeline_cache: &self.shader_loader.cache,
            common: &self.common,
            draw_list: &draw_list,
        };

        self.background_pass.render(
            &BackgroundPassTextureViews {
                color: &view,
                depth: self.depth_texture.view(),
            },
            demo_state.background_color,
            &mut context,
        );

        self.glass_pass.render(
            &GlassPassTextureViews {
                color: &view,
                depth: self.depth_texture.view(),
            },
            &mut context,
        );

        Ok(Frame {
            output,
            view,
            encoder,
        })
    }

    /// Draws the debug UI over the frame, then submits and presents it.
    pub fn finish_frame(&mut self, frame: Frame, imgui_context: &mut imgui::Context) {
        let Frame {
            output,
            view,
            mut encoder,
        } = frame;

        if let Err(e) = self.imgui_renderer.render(
            &view,
            imgui_context,
            &self.device,
            &self.queue,
            &mut encoder,
        ) {
            log::error!("{:#}", e);
        }

        self.queue.submit([encoder.finish()]);
        self.window.pre_present_notify();
        output.present();
    }
}
