use glam::UVec3;

/// Integer voxel coordinate inside a grid, each component in `[0, segments)`.
pub type VoxelCoord = UVec3;

/// One of the three grid axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    /// All three axes, in slider order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        }
    }

    /// The component of `coord` along this axis.
    pub fn component(self, coord: VoxelCoord) -> u32 {
        match self {
            Axis::X => coord.x,
            Axis::Y => coord.y,
            Axis::Z => coord.z,
        }
    }
}

/// Linear RGB color with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Channels as 8-bit values. Truncates after scaling, so 0.25 maps to 63.
    pub fn to_u8(self) -> [u8; 3] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0) as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    /// Packed `0xRRGGBB` value.
    pub fn to_hex(self) -> u32 {
        let [r, g, b] = self.to_u8();
        (r as u32) << 16 | (g as u32) << 8 | b as u32
    }

    /// Lowercase `#rrggbb` string for display.
    pub fn to_hex_string(self) -> String {
        format!("#{:06x}", self.to_hex())
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_component() {
        let c = UVec3::new(1, 2, 3);
        assert_eq!(Axis::X.component(c), 1);
        assert_eq!(Axis::Y.component(c), 2);
        assert_eq!(Axis::Z.component(c), 3);
    }

    #[test]
    fn test_axis_indices_match_order() {
        for (i, axis) in Axis::ALL.iter().enumerate() {
            assert_eq!(axis.index(), i);
        }
    }

    #[test]
    fn test_hex_extremes() {
        assert_eq!(Rgb::new(0.0, 0.0, 0.0).to_hex_string(), "#000000");
        assert_eq!(Rgb::new(1.0, 1.0, 1.0).to_hex_string(), "#ffffff");
        assert_eq!(Rgb::new(1.0, 0.0, 0.0).to_hex(), 0xFF0000);
    }

    #[test]
    fn test_hex_truncates() {
        // 0.25 * 255 = 63.75 -> 63 (0x3f), 0.5 * 255 = 127.5 -> 127 (0x7f)
        assert_eq!(Rgb::new(0.25, 0.5, 0.75).to_hex_string(), "#3f7fbf");
    }

    #[test]
    fn test_hex_clamps_out_of_range() {
        assert_eq!(Rgb::new(-1.0, 2.0, 0.0).to_u8(), [0, 255, 0]);
    }
}
