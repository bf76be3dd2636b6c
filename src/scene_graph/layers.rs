/// Visibility layer mask.
///
/// Cameras draw an object when their masks share a layer. Lights only
/// affect objects that share a layer with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Layers(u32);

pub const DEFAULT_LAYER: u32 = 0;
pub const GLASS_LAYER: u32 = 1;
pub const BACKGROUND_LAYER: u32 = 2;

fn bit(layer: u32) -> u32 {
    debug_assert!(layer < 32, "layer {} out of range", layer);
    1 << layer
}

impl Layers {
    #[cfg(test)]
    pub const NONE: Layers = Layers(0);

    pub fn only(layer: u32) -> Self {
        Layers(bit(layer))
    }

    pub fn set(&mut self, layer: u32) {
        self.0 = bit(layer);
    }

    pub fn enable(&mut self, layer: u32) {
        self.0 |= bit(layer);
    }

    #[cfg(test)]
    pub fn disable(&mut self, layer: u32) {
        self.0 &= !bit(layer);
    }

    pub fn with(mut self, layer: u32) -> Self {
        self.enable(layer);
        self
    }

    pub fn is_enabled(&self, layer: u32) -> bool {
        self.0 & bit(layer) != 0
    }

    pub fn test(&self, other: Layers) -> bool {
        self.0 & other.0 != 0
    }

    pub fn mask(&self) -> u32 {
        self.0
    }
}

impl Default for Layers {
    fn default() -> Self {
        Layers::only(DEFAULT_LAYER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_layer_zero() {
        let layers = Layers::default();
        assert!(layers.is_enabled(DEFAULT_LAYER));
        assert!(!layers.is_enabled(GLASS_LAYER));
        assert_eq!(layers.mask(), 1);
    }

    #[test]
    fn set_replaces_enable_adds() {
        let mut layers = Layers::default();
        layers.enable(GLASS_LAYER);
        assert_eq!(layers.mask(), 0b011);

        layers.set(BACKGROUND_LAYER);
        assert_eq!(layers.mask(), 0b100);

        layers.disable(BACKGROUND_LAYER);
        assert_eq!(layers, Layers::NONE);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "out of range")]
    fn layer_past_mask_width_is_rejected() {
        Layers::only(32);
    }

    #[test]
    fn glass_lights_skip_background() {
        let light = Layers::default().with(GLASS_LAYER);
        let glass = Layers::only(GLASS_LAYER);
        let background = Layers::only(BACKGROUND_LAYER);

        assert!(light.test(glass));
        assert!(!light.test(background));
    }

    #[test]
    fn camera_sees_every_scene_layer() {
        let camera = Layers::default()
            .with(GLASS_LAYER)
            .with(BACKGROUND_LAYER);

        assert!(camera.test(Layers::only(GLASS_LAYER)));
        assert!(camera.test(Layers::only(BACKGROUND_LAYER)));
        assert!(!camera.test(Layers::NONE));
    }
}
