//! Keyboard shortcut handling

use eframe::egui;

use crate::state::scene::NodeKind;
use crate::state::AppState;
use crate::viewport::ViewportPanel;

/// Handle keyboard shortcuts for the application
pub fn handle_keyboard(
    ctx: &egui::Context,
    state: &mut AppState,
    viewport: &mut ViewportPanel,
) {
    // Don't handle shortcuts when a text field is focused
    if ctx.memory(|m| m.focused().is_some()) {
        return;
    }

    let (escape, frame, gizmo) = ctx.input(|i| {
        (
            i.key_pressed(egui::Key::Escape),
            i.key_pressed(egui::Key::F) && !i.modifiers.command,
            i.key_pressed(egui::Key::G) && !i.modifiers.command,
        )
    });

    // Escape: drop highlight and selection
    if escape {
        state.clear_selection();
    }
    // F: frame everything visible
    if frame {
        viewport.frame_scene(state);
    }
    // G: show/hide the transform control
    if gizmo {
        toggle_gizmo(state);
    }
}

fn toggle_gizmo(state: &mut AppState) {
    let Some((id, visible)) = state
        .scene
        .nodes()
        .iter()
        .find(|n| matches!(n.kind, NodeKind::TransformControl(_)))
        .map(|n| (n.id.clone(), n.visible))
    else {
        return;
    };
    // Never hide the gizmo in the middle of a drag
    if state.scene.transform_control(&id).is_some_and(|c| c.is_dragging()) {
        return;
    }
    state.set_visible(&id, !visible);
}
