#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub vsync: bool,
    /// Capacity of the per-frame instance buffer.
    pub max_instances: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            vsync: true,
            max_instances: 256,
        }
    }
}

impl RenderConfig {
    pub fn present_mode(&self) -> wgpu::PresentMode {
        if self.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        }
    }
}
