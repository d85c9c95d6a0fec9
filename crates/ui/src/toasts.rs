//! Toast notifications.
//!
//! Renders the active [`NotificationLog`] entries as a stack of toasts in
//! the lower-right corner, just above the action bar. Collection and expiry
//! live in the `location` crate; this module only draws.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use location::notifications::NotificationLog;
use location::NotificationSeverity;

// =============================================================================
// Constants
// =============================================================================

/// Offset of the stack from the lower-right corner, clearing the action bar.
const STACK_OFFSET: egui::Vec2 = egui::Vec2::new(-10.0, -58.0);

// =============================================================================
// Severity mapping
// =============================================================================

fn severity_color(severity: NotificationSeverity) -> egui::Color32 {
    match severity {
        NotificationSeverity::Warning => egui::Color32::from_rgb(255, 165, 0),
        NotificationSeverity::Info => egui::Color32::from_rgb(220, 220, 220),
        NotificationSeverity::Positive => egui::Color32::from_rgb(80, 220, 80),
    }
}

fn severity_icon(severity: NotificationSeverity) -> &'static str {
    match severity {
        NotificationSeverity::Warning => "[W]",
        NotificationSeverity::Info => "[i]",
        NotificationSeverity::Positive => "[+]",
    }
}

// =============================================================================
// System
// =============================================================================

/// Renders active notifications as toasts, newest nearest the action bar.
pub fn toasts_ui(mut contexts: EguiContexts, log: Res<NotificationLog>) {
    if log.active.is_empty() {
        return;
    }

    egui::Area::new(egui::Id::new("toast_stack"))
        .anchor(egui::Align2::RIGHT_BOTTOM, STACK_OFFSET)
        .order(egui::Order::Middle)
        .show(contexts.ctx_mut(), |ui| {
            ui.with_layout(egui::Layout::bottom_up(egui::Align::Max), |ui| {
                ui.spacing_mut().item_spacing.y = 6.0;

                for notification in log.active.iter().rev() {
                    let color = severity_color(notification.severity);
                    let icon = severity_icon(notification.severity);

                    egui::Frame::popup(ui.style())
                        .fill(egui::Color32::from_rgba_premultiplied(20, 24, 32, 230))
                        .show(ui, |ui| {
                            ui.horizontal(|ui| {
                                ui.label(egui::RichText::new(icon).color(color).strong());
                                ui.label(egui::RichText::new(&notification.text).color(color));
                            });
                        });
                }
            });
        });
}

// =============================================================================
// Tests
// =============================================================================
