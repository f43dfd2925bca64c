mod cube;
pub use cube::{build_cube, CubeMesh, CUBE_SIDE_LENGTH, DEFAULT_PALETTE};

mod spin;
pub use spin::Spin;

/// Linear RGB color, each channel in `[0, 1]`.
pub type Rgb = [f32; 3];

/// Interleaved vertex as laid out in the vertex buffer: position then color.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub color: Rgb,
}

impl Vertex {
    /// Number of `f32` components per vertex.
    pub const FLOATS: usize = 6;
}
