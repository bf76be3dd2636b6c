use glam::Vec3;
use imgui::Condition;

use crate::{color::Color, demo::DemoState, scene_graph::material::MaterialId};

pub fn draw(state: &mut DemoState, ui: &imgui::Ui) {
    let stats = state.stats;
    let elapsed = state.elapsed();

    ui.window("Debug")
        .size([320.0, 240.0], Condition::FirstUseEver)
        .position([10.0, 10.0], Condition::FirstUseEver)
        .build(|| {
            ui.text(format!(
                "Frame time: {:.2} ms ({:.0} fps)",
                stats.delta_time * 1000.0,
                ui.io().framerate
            ));
            ui.text(format!("Elapsed: {:.1} s", elapsed));
            ui.separator();
            ui.text(format!("Scroll: {:.1} %", stats.scroll_percentage * 100.0));
            ui.text(format!("Light X: {:.3}", stats.light_x));
            ui.text(format!("Camera Y: {:.3}", stats.camera_y));
            ui.text(format!(
                "Rig: ({:.3}, {:.3})",
                stats.rig_position.x, stats.rig_position.y
            ));
            ui.separator();

            let glass_material = state.glass_material;
            let plane_material = state.plane_material;
            color_editor(ui, state, "Glass color", glass_material);
            color_editor(ui, state, "Plane color", plane_material);

            if state.glass_model.is_none() {
                ui.text_disabled("Model not loaded");
            }
        });
}

/// Edits a material color in sRGB space.
fn color_editor(ui: &imgui::Ui, state: &mut DemoState, label: &str, material_id: MaterialId) {
    let Some(material) = state.scene.get_material_mut(material_id) else {
        return;
    };

    let mut srgb = material.color().to_srgb().to_array();
    if ui.color_edit3(label, &mut srgb) {
        material.set_color(Color::from_srgb(Vec3::from(srgb)));
    }
}
