mod camera_look_at;
pub use camera_look_at::LookAtCamera;

extern crate nalgebra as na;

pub trait Camera {
    fn view(&self) -> na::Matrix4<f32>;
    fn projection(&self) -> na::Matrix4<f32>;
}

/// Maps GL clip space (y up, z in [-1, 1]) onto the gfx-hal convention
/// (y down, z in [0, 1]).
#[cfg_attr(rustfmt, rustfmt_skip)]
pub fn clip_correction() -> na::Matrix4<f32> {
    na::Matrix4::new(
        1.0,  0.0, 0.0, 0.0,
        0.0, -1.0, 0.0, 0.0,
        0.0,  0.0, 0.5, 0.5,
        0.0,  0.0, 0.0, 1.0,
    )
}

#[cfg(test)]
mod tests {
    use super::na;
    use super::*;

    #[test]
    fn clip_correction_flips_y_and_halves_depth() {
        let c = clip_correction();
        let near = c * na::Vector4::new(0.5, 0.5, -1.0, 1.0);
        let far = c * na::Vector4::new(0.5, 0.5, 1.0, 1.0);
        assert_eq!(near, na::Vector4::new(0.5, -0.5, 0.0, 1.0));
        assert_eq!(far, na::Vector4::new(0.5, -0.5, 1.0, 1.0));
    }
}
