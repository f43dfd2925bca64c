//! Flat-colored cube geometry.
//!
//! Every face owns its four corners so that colors are never shared across
//! faces. Colors are handed out per emitted vertex, cycling through the
//! palette without resetting at face boundaries.

use super::{Rgb, Vertex};
use crate::error::RenderError;

pub const CUBE_SIDE_LENGTH: f32 = 2.0;

pub const DEFAULT_PALETTE: [Rgb; 6] = [
    [0.7, 0.7, 0.7],    // Top
    [0.75, 0.25, 0.5],  // Left
    [0.25, 0.25, 0.75], // Right
    [1.0, 0.0, 0.15],   // Front
    [0.0, 1.0, 0.15],   // Back
    [0.0, 0.0, 0.0],    // Bottom
];

/// Unit corner signs; scaled by half the side length.
#[cfg_attr(rustfmt, rustfmt_skip)]
const CORNERS: [[f32; 3]; 8] = [
    [-1.0,  1.0, -1.0],
    [-1.0,  1.0,  1.0],
    [ 1.0,  1.0,  1.0],
    [ 1.0,  1.0, -1.0],
    [-1.0, -1.0, -1.0],
    [-1.0, -1.0,  1.0],
    [ 1.0, -1.0,  1.0],
    [ 1.0, -1.0, -1.0],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Top,
    Left,
    Right,
    Front,
    Back,
    Bottom,
}

impl Face {
    /// Emission order.
    pub const ALL: [Face; 6] = [
        Face::Top,
        Face::Left,
        Face::Right,
        Face::Front,
        Face::Back,
        Face::Bottom,
    ];

    /// Indices into the corner table, in the order the face's vertices are emitted.
    pub fn corners(self) -> [usize; 4] {
        match self {
            Face::Top => [0, 3, 2, 1],
            Face::Left => [1, 5, 4, 0],
            Face::Right => [2, 6, 7, 3],
            Face::Front => [2, 6, 5, 1],
            Face::Back => [3, 7, 4, 0],
            Face::Bottom => [4, 7, 6, 5],
        }
    }

    /// Two triangles over the face's own 4 vertices, before offsetting.
    pub fn quad_indices(self) -> [u16; 6] {
        match self {
            Face::Left => [0, 1, 2, 2, 3, 0],
            _ => [0, 1, 2, 0, 2, 3],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CubeMesh {
    vertices: Vec<Vertex>,
    indices: Vec<u16>,
}

impl CubeMesh {
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Flat `x, y, z, r, g, b` stream, the exact contents of the vertex buffer.
    pub fn interleaved(&self) -> Vec<f32> {
        let mut flat = Vec::with_capacity(self.vertices.len() * Vertex::FLOATS);
        for v in &self.vertices {
            flat.extend_from_slice(&v.pos);
            flat.extend_from_slice(&v.color);
        }
        flat
    }
}

/// Builds 24 vertices and 36 indices for a cube centred on the origin.
pub fn build_cube(side_length: f32, palette: &[Rgb]) -> Result<CubeMesh, RenderError> {
    if !(side_length > 0.0) {
        return Err(RenderError::InvalidArgument(format!(
            "cube side length must be positive, got {}",
            side_length
        )));
    }
    if palette.is_empty() {
        return Err(RenderError::InvalidArgument("cube palette is empty".into()));
    }

    let half = side_length / 2.0;
    let mut vertices = Vec::with_capacity(Face::ALL.len() * 4);
    let mut indices = Vec::with_capacity(Face::ALL.len() * 6);

    for (face_index, face) in Face::ALL.iter().enumerate() {
        for &corner in face.corners().iter() {
            let [x, y, z] = CORNERS[corner];
            let color = palette[vertices.len() % palette.len()];
            vertices.push(Vertex {
                pos: [x * half, y * half, z * half],
                color,
            });
        }

        let base = (face_index * 4) as u16;
        indices.extend(face.quad_indices().iter().map(|i| base + i));
    }

    Ok(CubeMesh { vertices, indices })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_cube() -> CubeMesh {
        build_cube(CUBE_SIDE_LENGTH, &DEFAULT_PALETTE).unwrap()
    }

    #[test]
    fn counts_and_index_bounds() {
        for &side in &[0.001, 1.0, 2.0, 37.5] {
            for k in 1..=6 {
                let mesh = build_cube(side, &DEFAULT_PALETTE[..k]).unwrap();
                assert_eq!(mesh.vertices().len(), 24);
                assert_eq!(mesh.interleaved().len(), 24 * Vertex::FLOATS);
                assert_eq!(mesh.indices().len(), 36);
                assert_eq!(mesh.index_count(), 36);
                assert!(mesh.indices().iter().all(|&i| i < 24));
            }
        }
    }

    #[test]
    fn indices_stay_within_their_face() {
        let mesh = default_cube();
        for (face_index, chunk) in mesh.indices().chunks(6).enumerate() {
            let lo = (face_index * 4) as u16;
            assert!(chunk.iter().all(|&i| i >= lo && i < lo + 4), "face {}", face_index);
        }
    }

    #[test]
    fn triangle_split_per_face() {
        let mesh = default_cube();
        assert_eq!(&mesh.indices()[0..6], &[0, 1, 2, 0, 2, 3]);
        assert_eq!(&mesh.indices()[6..12], &[4, 5, 6, 6, 7, 4]);
        assert_eq!(&mesh.indices()[30..36], &[20, 21, 22, 20, 22, 23]);
    }

    /// Positions for side 2, face by face, in emission order.
    #[cfg_attr(rustfmt, rustfmt_skip)]
    const UNIT_POSITIONS: [[f32; 3]; 24] = [
        // Top
        [-1.0,  1.0, -1.0], [ 1.0,  1.0, -1.0], [ 1.0,  1.0,  1.0], [-1.0,  1.0,  1.0],
        // Left
        [-1.0,  1.0,  1.0], [-1.0, -1.0,  1.0], [-1.0, -1.0, -1.0], [-1.0,  1.0, -1.0],
        // Right
        [ 1.0,  1.0,  1.0], [ 1.0, -1.0,  1.0], [ 1.0, -1.0, -1.0], [ 1.0,  1.0, -1.0],
        // Front
        [ 1.0,  1.0,  1.0], [ 1.0, -1.0,  1.0], [-1.0, -1.0,  1.0], [-1.0,  1.0,  1.0],
        // Back
        [ 1.0,  1.0, -1.0], [ 1.0, -1.0, -1.0], [-1.0, -1.0, -1.0], [-1.0,  1.0, -1.0],
        // Bottom
        [-1.0, -1.0, -1.0], [ 1.0, -1.0, -1.0], [ 1.0, -1.0,  1.0], [-1.0, -1.0,  1.0],
    ];

    #[cfg_attr(rustfmt, rustfmt_skip)]
    const INDICES: [u16; 36] = [
        0, 1, 2,    0, 2, 3,    // Top
        4, 5, 6,    6, 7, 4,    // Left
        8, 9, 10,   8, 10, 11,  // Right
        12, 13, 14, 12, 14, 15, // Front
        16, 17, 18, 16, 18, 19, // Back
        20, 21, 22, 20, 22, 23, // Bottom
    ];

    #[test]
    fn emits_the_full_vertex_and_index_tables() {
        let mesh = default_cube();
        let positions: Vec<f32> = mesh
            .interleaved()
            .chunks(Vertex::FLOATS)
            .flat_map(|v| v[..3].to_vec())
            .collect();
        let expected: Vec<f32> = UNIT_POSITIONS.iter().flatten().copied().collect();
        assert_eq!(positions.len(), 72);
        assert_eq!(positions, expected);
        assert_eq!(mesh.indices(), &INDICES[..]);
    }

    #[test]
    fn corners_scale_with_half_side() {
        let mesh = build_cube(3.0, &[[1.0, 1.0, 1.0]]).unwrap();
        for (v, unit) in mesh.vertices().iter().zip(UNIT_POSITIONS.iter()) {
            for axis in 0..3 {
                assert_eq!(v.pos[axis], unit[axis] * 1.5);
            }
        }
    }

    #[test]
    fn every_face_lies_on_its_plane() {
        let mesh = default_cube();
        let plane = |face: Face| -> (usize, f32) {
            match face {
                Face::Top => (1, 1.0),
                Face::Bottom => (1, -1.0),
                Face::Left => (0, -1.0),
                Face::Right => (0, 1.0),
                Face::Front => (2, 1.0),
                Face::Back => (2, -1.0),
            }
        };
        for (i, &face) in Face::ALL.iter().enumerate() {
            let (axis, value) = plane(face);
            for v in &mesh.vertices()[i * 4..i * 4 + 4] {
                assert_eq!(v.pos[axis], value, "{:?}", face);
            }
        }
    }

    #[test]
    fn single_color_palette_paints_everything() {
        let grey = [0.3, 0.3, 0.3];
        let mesh = build_cube(1.0, &[grey]).unwrap();
        assert!(mesh.vertices().iter().all(|v| v.color == grey));
    }

    #[test]
    fn colors_cycle_by_emitted_vertex_not_by_face() {
        let mesh = default_cube();
        for (i, v) in mesh.vertices().iter().enumerate() {
            assert_eq!(v.color, DEFAULT_PALETTE[i % 6]);
        }
        // The Left face starts at vertex 4, which wraps to palette[4], not palette[1].
        assert_eq!(mesh.vertices()[4].color, DEFAULT_PALETTE[4]);
        assert_eq!(mesh.vertices()[6].color, DEFAULT_PALETTE[0]);
    }

    #[test]
    fn top_face_scenario() {
        let mesh = default_cube();
        let top: Vec<[f32; 3]> = mesh.vertices()[..4].iter().map(|v| v.pos).collect();
        assert_eq!(
            top,
            vec![
                [-1.0, 1.0, -1.0],
                [1.0, 1.0, -1.0],
                [1.0, 1.0, 1.0],
                [-1.0, 1.0, 1.0],
            ]
        );
        for i in 0..4 {
            assert_eq!(mesh.vertices()[i].color, DEFAULT_PALETTE[i]);
        }
    }

    #[test]
    fn interleaving_puts_color_after_position() {
        let mesh = default_cube();
        let flat = mesh.interleaved();
        assert_eq!(&flat[0..6], &[-1.0, 1.0, -1.0, 0.7, 0.7, 0.7]);
        assert_eq!(&flat[138..144], &[-1.0, -1.0, 1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn building_twice_is_identical() {
        assert_eq!(default_cube(), default_cube());
    }

    #[test]
    fn rejects_bad_arguments() {
        for &side in &[0.0, -1.0, f32::NAN] {
            match build_cube(side, &DEFAULT_PALETTE) {
                Err(RenderError::InvalidArgument(_)) => {}
                other => panic!("side {} gave {:?}", side, other),
            }
        }
        assert!(matches!(
            build_cube(1.0, &[]),
            Err(RenderError::InvalidArgument(_))
        ));
    }
}
