use anyhow::Result;

mod camera;
mod color;
mod config;
mod debug_ui;
mod demo;
mod engine;
mod input;
mod model;
mod model_loader;
mod parallax;
mod rendering;
mod scene_graph;
mod window;

fn main() -> Result<()> {
    pretty_env_logger::init();

    pollster::block_on(window::run())?;

    Ok(())
}
