use crate::{debug_ui, demo::DemoState, input::InputState};

pub fn update(state: &mut DemoState, input: &InputState, ui: &imgui::Ui) -> anyhow::Result<()> {
    state.update(input);
    debug_ui::draw(state, ui);
    state.scene.late_update();

    Ok(())
}
