use colorcube_core::pick::PickHit;
use colorcube_core::types::Rgb;
use glam::Vec2;

/// Tooltip offset from the cursor, in points.
const TOOLTIP_OFFSET: Vec2 = Vec2::new(10.0, 10.0);

/// What the tooltip shows for the voxel under the cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverInfo {
    pub hex: String,
    pub color: Rgb,
    /// Cursor position in CSS pixels.
    pub cursor: Vec2,
}

impl HoverInfo {
    pub fn from_hit(hit: &PickHit, cursor: Vec2) -> Self {
        Self {
            hex: hit.color.to_hex_string(),
            color: hit.color,
            cursor,
        }
    }

    pub fn tooltip_pos(&self) -> egui::Pos2 {
        let p = self.cursor + TOOLTIP_OFFSET;
        egui::pos2(p.x, p.y)
    }
}

/// Hover tooltip next to the cursor.
pub fn show(ctx: &egui::Context, info: &HoverInfo) {
    let [r, g, b] = info.color.to_u8();
    egui::Area::new(egui::Id::new("hover-tooltip"))
        .fixed_pos(info.tooltip_pos())
        .order(egui::Order::Tooltip)
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.horizontal(|ui| {
                    let (rect, _) =
                        ui.allocate_exact_size(egui::vec2(14.0, 14.0), egui::Sense::hover());
                    ui.painter()
                        .rect_filled(rect, 2.0, egui::Color32::from_rgb(r, g, b));
                    ui.monospace(&info.hex);
                });
                ui.label(format!(
                    "Pixel: ({}, {})",
                    info.cursor.x as i32, info.cursor.y as i32
                ));
            });
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::UVec3;

    fn hit(color: Rgb) -> PickHit {
        PickHit {
            coord: UVec3::ZERO,
            color,
            opacity: 1.0,
            distance: 1.0,
        }
    }

    #[test]
    fn test_hex_from_hit() {
        let info = HoverInfo::from_hit(&hit(Rgb::new(1.0, 0.0, 0.5)), Vec2::new(3.0, 4.0));
        assert_eq!(info.hex, "#ff007f");
    }

    #[test]
    fn test_tooltip_offset() {
        let info = HoverInfo::from_hit(&hit(Rgb::new(0.0, 0.0, 0.0)), Vec2::new(100.0, 50.0));
        assert_eq!(info.tooltip_pos(), egui::pos2(110.0, 60.0));
    }
}
