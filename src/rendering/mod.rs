pub mod bind_group_builder;
pub mod config;
pub mod imgui_renderer;
pub mod instance;
pub mod light_uniform;
pub mod passes;
pub mod render_common;
pub mod render_material;
pub mod render_model;
pub mod renderer;
pub mod shader_loader;
pub mod texture;
