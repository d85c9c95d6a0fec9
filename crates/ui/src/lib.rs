use bevy::prelude::*;
use bevy_egui::EguiPlugin;

use location::SimulatorLink;

pub mod permission_dialog;
pub mod simulator_panel;
pub mod theme;
pub mod toasts;
pub mod toolbar;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin)
            .init_resource::<simulator_panel::SimulatorPanelVisible>()
            .add_systems(Startup, theme::apply_night_theme)
            .add_systems(
                Update,
                (
                    toolbar::toolbar_ui,
                    toasts::toasts_ui,
                    simulator_panel::simulator_panel_keybind,
                    simulator_panel::simulator_panel_ui.run_if(resource_exists::<SimulatorLink>),
                ),
            )
            .add_plugins(permission_dialog::PermissionDialogPlugin);
    }
}
