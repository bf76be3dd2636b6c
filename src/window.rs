use std::{sync::Arc, time::Instant};

use anyhow::Context;
use glam::Vec2;
use imgui::{FontConfig, FontSource};
use imgui_winit_support::WinitPlatform;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{ElementState, Event, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

use crate::{
    config::DemoConfig,
    demo::DemoState,
    engine,
    input::{InputState, ScrollCommand},
    rendering::{config::RenderConfig, renderer::Renderer},
};

struct ImguiState {
    context: imgui::Context,
    platform: WinitPlatform,
}

/// Everything that exists once the window does.
struct Running {
    renderer: Renderer,
    demo_state: DemoState,
    input: InputState,
    imgui: ImguiState,
}

struct App {
    config: DemoConfig,
    render_config: RenderConfig,
    running: Option<Running>,
    last_frame: Instant,
    error: Option<anyhow::Error>,
}

fn window_size(size: PhysicalSize<u32>) -> Vec2 {
    Vec2::new(size.width as f32, size.height as f32)
}

impl App {
    fn new(config: DemoConfig, render_config: RenderConfig) -> Self {
        Self {
            config,
            render_config,
            running: None,
            last_frame: Instant::now(),
            error: None,
        }
    }

    fn setup_imgui(window: &Window) -> ImguiState {
        let mut context = imgui::Context::create();
        let mut platform = WinitPlatform::new(&mut context);
        platform.attach_window(
            context.io_mut(),
            window,
            imgui_winit_support::HiDpiMode::Default,
        );

        let font_size = 14.0;
        context.fonts().add_font(&[FontSource::DefaultFontData {
            config: Some(FontConfig {
                oversample_h: 1,
                pixel_snap_h: true,
                size_pixels: font_size,
                ..Default::default()
            }),
        }]);

        // Disable INI support because it's broken in the published version of imgui
        context.set_ini_filename(None);

        ImguiState { context, platform }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<Running> {
        let window_attributes = Window::default_attributes()
            .with_title("Glassfall")
            .with_inner_size(LogicalSize::new(1280.0, 800.0));
        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .context("Failed to create window")?,
        );

        let input = InputState::new(
            window_size(window.inner_size()),
            window.scale_factor() as f32,
            self.config.document_height_viewports,
            self.config.scroll_line_height,
        );

        let mut demo_state = DemoState::new(self.config.clone(), input.aspect_ratio())
            .context("Failed to create demo state")?;

        let mut imgui = Self::setup_imgui(&window);

        let renderer = pollster::block_on(Renderer::new(
            window.clone(),
            &mut demo_state,
            &mut imgui.context,
            self.render_config.clone(),
        ))
        .context("Failed to create renderer")?;

        window.request_redraw();

        Ok(Running {
            renderer,
            demo_state,
            input,
            imgui,
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{:#}", error);
        self.error = Some(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }

        match self.start(event_loop) {
            Ok(running) => self.running = Some(running),
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(running) = self.running.as_mut() else {
            return;
        };

        let Running {
            renderer,
            demo_state,
            input,
            imgui,
        } = running;

        match &event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                input.on_resize(window_size(*new_size), renderer.window.scale_factor() as f32);
                demo_state.on_resize(input);
                renderer.resize(*new_size);
            }
            WindowEvent::CursorMoved { position, .. } => {
                input.on_cursor_moved(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if !imgui.context.io().want_capture_mouse {
                    match delta {
                        MouseScrollDelta::LineDelta(_, lines) => input.on_wheel_lines(*lines),
                        MouseScrollDelta::PixelDelta(position) => {
                            input.on_wheel_pixels(position.y as f32)
                        }
                    }
                }
            }
            WindowEvent::KeyboardInput { event: key, .. }
                if key.state == ElementState::Pressed
                    && !imgui.context.io().want_capture_keyboard =>
            {
                if key.logical_key == Key::Named(NamedKey::Escape) {
                    event_loop.exit();
                } else if let Some(command) = ScrollCommand::from_key(&key.logical_key) {
                    input.apply(command);
                }
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                imgui
                    .context
                    .io_mut()
                    .update_delta_time(now - self.last_frame);
                self.last_frame = now;

                renderer.window.request_redraw();

                if let Err(e) = imgui
                    .platform
                    .prepare_frame(imgui.context.io_mut(), &renderer.window)
                {
                    log::error!("Failed to prepare Imgui frame: {}", e);
                    return;
                }

                let ui = imgui.context.new_frame();

                if let Err(e) = engine::update(demo_state, input, ui) {
                    log::error!("Error during engine::update: {:#}", e);
                }

                imgui.platform.prepare_render(ui, &renderer.window);

                match renderer.render(demo_state) {
                    Ok(frame) => {
                        renderer.finish_frame(frame, &mut imgui.context);
                    }
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        renderer.resize(renderer.size);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory");
                        event_loop.exit();
                    }
                    Err(wgpu::SurfaceError::Timeout) => {
                        log::warn!("Timeout");
                    }
                    Err(other) => {
                        log::error!("Unexpected error: {:?}", other);
                    }
                }
            }
            _ => (),
        }

        imgui.platform.handle_event::<()>(
            imgui.context.io_mut(),
            &renderer.window,
            &Event::WindowEvent { window_id, event },
        );
    }
}

pub async fn run() -> anyhow::Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    let mut app = App::new(DemoConfig::default(), RenderConfig::default());
    event_loop.run_app(&mut app)?;

    match app.error {
        Some(error) => Err(error),
        None => Ok(()),
    }
}
