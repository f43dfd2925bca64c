extern crate nalgebra as na;

pub const EYE: [f32; 3] = [0.0, 0.0, -6.0];
pub const TARGET: [f32; 3] = [0.0, 0.0, 0.0];
pub const UP: [f32; 3] = [0.0, 1.0, 0.0];

pub const FOVY_DEGREES: f32 = 45.0;
pub const ZNEAR: f32 = 0.1;
pub const ZFAR: f32 = 1000.0;

/// Stationary camera looking at the origin.
///
/// Both matrices are computed once; nothing moves the camera afterwards.
#[derive(Debug, Clone)]
pub struct LookAtCamera {
    aspect: f32,
    view: na::Matrix4<f32>,
    proj: na::Matrix4<f32>,
}

impl LookAtCamera {
    pub fn new(aspect: f32) -> Self {
        let view = na::Isometry3::look_at_rh(
            &na::Point3::from(EYE),
            &na::Point3::from(TARGET),
            &na::Vector3::from(UP),
        )
        .to_homogeneous();

        let proj = na::Perspective3::new(aspect, FOVY_DEGREES.to_radians(), ZNEAR, ZFAR)
            .to_homogeneous();

        log::debug!("projection: {:?}", proj);

        Self { aspect, view, proj }
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }
}

impl super::Camera for LookAtCamera {
    fn view(&self) -> na::Matrix4<f32> {
        self.view
    }

    fn projection(&self) -> na::Matrix4<f32> {
        self.proj
    }
}

#[cfg(test)]
mod tests {
    use super::na;
    use super::*;
    use crate::cameras::Camera;

    #[test]
    fn origin_sits_six_units_ahead() {
        let camera = LookAtCamera::new(16.0 / 9.0);
        let p = camera.view() * na::Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert!((p - na::Vector4::new(0.0, 0.0, -6.0, 1.0)).norm() < 1e-5);
    }

    #[test]
    fn up_stays_up() {
        let camera = LookAtCamera::new(1.0);
        let up = camera.view() * na::Vector4::new(0.0, 1.0, 0.0, 0.0);
        assert!((up - na::Vector4::new(0.0, 1.0, 0.0, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn perspective_terms() {
        let aspect = 960.0 / 540.0;
        let camera = LookAtCamera::new(aspect);
        let proj = camera.projection();
        let f = 1.0 / (FOVY_DEGREES.to_radians() / 2.0).tan();
        assert!((proj[(0, 0)] - f / aspect).abs() < 1e-5);
        assert!((proj[(1, 1)] - f).abs() < 1e-5);
        assert!((proj[(2, 2)] - (ZFAR + ZNEAR) / (ZNEAR - ZFAR)).abs() < 1e-5);
        assert!((proj[(2, 3)] - 2.0 * ZFAR * ZNEAR / (ZNEAR - ZFAR)).abs() < 1e-4);
        assert_eq!(proj[(3, 2)], -1.0);
        assert_eq!(proj[(3, 3)], 0.0);
        assert_eq!(camera.aspect(), aspect);
    }

    #[test]
    fn cube_lands_inside_the_depth_range() {
        let camera = LookAtCamera::new(1.0);
        let clip = crate::cameras::clip_correction()
            * camera.projection()
            * camera.view()
            * na::Vector4::new(1.0, 1.0, 1.0, 1.0);
        let depth = clip.z / clip.w;
        assert!(depth > 0.0 && depth < 1.0, "depth {}", depth);
    }
}
