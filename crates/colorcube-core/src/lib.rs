pub mod config;
pub mod constants;
pub mod error;
pub mod grid;
pub mod pick;
pub mod rows;
pub mod state;
pub mod types;

pub use config::ViewerConfig;
pub use error::ColorCubeError;
pub use grid::{GridConfig, Voxel, VoxelGrid};
pub use pick::{PickHit, Ray};
pub use rows::TransparentRows;
pub use state::CubeState;
pub use types::{Axis, Rgb, VoxelCoord};
