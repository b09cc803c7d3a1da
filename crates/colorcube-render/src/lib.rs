pub mod instance;
pub mod renderer;

pub use instance::{unit_cube_vertices, CubeVertex, VoxelInstance};
pub use renderer::{CameraUniforms, Renderer};
