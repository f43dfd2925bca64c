extern crate nalgebra as na;

use std::f64::consts::TAU;
use std::time::Instant;

/// One full turn every 8 seconds.
pub const SECONDS_PER_TURN: f64 = 8.0;

/// Rotation axis as authored. Not unit length; normalized when the rotation is built.
pub const SPIN_AXIS: [f32; 3] = [2.0, 1.0, 0.0];

/// Drives the cube's world matrix from wall-clock time.
///
/// The angle is an absolute function of the time elapsed since `started`, so
/// a stalled frame changes the phase of the rotation, never its rate.
#[derive(Debug, Clone)]
pub struct Spin {
    started: Instant,
    axis: na::Vector3<f32>,
}

impl Spin {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(started: Instant) -> Self {
        Self {
            started,
            axis: na::Vector3::from(SPIN_AXIS),
        }
    }

    /// `(t / 8) * 2π` for `t` seconds of elapsed time.
    pub fn angle_at(elapsed_secs: f64) -> f64 {
        elapsed_secs / SECONDS_PER_TURN * TAU
    }

    /// Rotation by `angle` radians about the spin axis, applied to identity.
    pub fn world_matrix(&self, angle: f64) -> na::Matrix4<f32> {
        // Reduce in f64 first so long sessions don't lose precision in f32.
        let angle = (angle % TAU) as f32;
        let axis = na::Unit::new_normalize(self.axis);
        na::Rotation3::from_axis_angle(&axis, angle).to_homogeneous()
    }

    pub fn transform(&self, now: Instant) -> na::Matrix4<f32> {
        let elapsed = now.saturating_duration_since(self.started);
        self.world_matrix(Self::angle_at(elapsed.as_secs_f64()))
    }
}

impl Default for Spin {
    fn default() -> Self {
        Self::new()
    }
}
