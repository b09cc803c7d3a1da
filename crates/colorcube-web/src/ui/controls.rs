use colorcube_core::config::CameraPreset;
use colorcube_core::state::CubeState;
use colorcube_core::types::Axis;

/// Slider values shown in the controls window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlValues {
    pub segments: u32,
    pub thresholds: [u32; 3],
}

impl ControlValues {
    pub fn from_state(state: &CubeState) -> Self {
        Self {
            segments: state.segments(),
            thresholds: Axis::ALL.map(|axis| state.threshold(axis)),
        }
    }
}

/// A change requested through the controls window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    SetSegments(u32),
    SetTransparentRows(Axis, u32),
    /// Index into the configured presets.
    FlyTo(usize),
}

/// Actions needed to go from `before` to `after`. Segment changes come first.
pub fn changes(before: &ControlValues, after: &ControlValues) -> Vec<ControlAction> {
    let mut actions = Vec::new();
    if after.segments != before.segments {
        actions.push(ControlAction::SetSegments(after.segments));
    }
    for axis in Axis::ALL {
        let i = axis.index();
        if after.thresholds[i] != before.thresholds[i] {
            actions.push(ControlAction::SetTransparentRows(axis, after.thresholds[i]));
        }
    }
    actions
}

/// Highest threshold a slider may reach for `segments`.
pub fn threshold_max(segments: u32) -> u32 {
    segments.saturating_sub(1)
}

/// Controls window: segment count, per-axis transparent rows and camera presets.
pub fn show(
    ctx: &egui::Context,
    current: ControlValues,
    segment_range: (u32, u32),
    presets: &[CameraPreset],
    flying: bool,
) -> Vec<ControlAction> {
    let mut edited = current;
    let mut fly_to = None;

    egui::Window::new("Color Cube")
        .anchor(egui::Align2::LEFT_TOP, egui::vec2(8.0, 8.0))
        .resizable(false)
        .collapsible(true)
        .show(ctx, |ui| {
            ui.label("Segments");
            ui.add(egui::Slider::new(
                &mut edited.segments,
                segment_range.0..=segment_range.1,
            ));

            ui.separator();

            ui.label("Transparent Rows");
            let max = threshold_max(current.segments);
            for axis in Axis::ALL {
                ui.add(
                    egui::Slider::new(&mut edited.thresholds[axis.index()], 0..=max)
                        .text(axis.label()),
                );
            }

            ui.separator();

            ui.label("Camera");
            ui.horizontal(|ui| {
                for (i, preset) in presets.iter().enumerate() {
                    if ui
                        .add_enabled(!flying, egui::Button::new(&preset.name))
                        .clicked()
                    {
                        fly_to = Some(i);
                    }
                }
            });
        });

    let mut actions = changes(&current, &edited);
    if let Some(i) = fly_to {
        actions.push(ControlAction::FlyTo(i));
    }
    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use colorcube_core::config::ViewerConfig;

    fn values(segments: u32, thresholds: [u32; 3]) -> ControlValues {
        ControlValues {
            segments,
            thresholds,
        }
    }

    #[test]
    fn test_no_changes_no_actions() {
        let v = values(5, [1, 0, 2]);
        assert!(changes(&v, &v).is_empty());
    }

    #[test]
    fn test_segments_before_thresholds() {
        let actions = changes(&values(5, [0, 0, 0]), &values(4, [0, 3, 0]));
        assert_eq!(
            actions,
            vec![
                ControlAction::SetSegments(4),
                ControlAction::SetTransparentRows(Axis::Y, 3),
            ]
        );
    }

    #[test]
    fn test_threshold_max() {
        assert_eq!(threshold_max(5), 4);
        assert_eq!(threshold_max(1), 0);
        assert_eq!(threshold_max(0), 0);
    }

    #[test]
    fn test_values_follow_state() {
        let mut state = CubeState::new(&ViewerConfig::default()).expect("default config is valid");
        state
            .set_transparent_rows(Axis::Z, 3)
            .expect("rebuild succeeds");
        assert_eq!(ControlValues::from_state(&state), values(5, [0, 0, 3]));
    }

    #[test]
    fn test_idle_frame_requests_nothing() {
        let config = ViewerConfig::default();
        let ctx = egui::Context::default();
        let mut actions = vec![ControlAction::FlyTo(99)];
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            actions = show(ctx, values(5, [0, 0, 0]), (2, 12), &config.presets, false);
        });
        assert!(actions.is_empty());
    }
}
