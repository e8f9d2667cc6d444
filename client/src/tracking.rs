//! Tracking input sources.
//!
//! The core consumes one opaque pose sample per frame and never sees the
//! driver-level polling protocol. [`OrbitTracking`] is a scripted stand-in
//! for the HMD/hand-sensor hardware so the client runs headless end to end.

use glam::{Quat, Vec3};

use shared::Pose;

pub trait TrackingSource {
    /// One raw positional + orientation sample for this frame.
    fn sample(&mut self, delta_time: f32) -> Pose;
}

/// Sweeps a pose along a horizontal arc, facing the arena center. Roughly
/// the motion of a player waving a paddle in front of themselves.
pub struct OrbitTracking {
    center: Vec3,
    radius: f32,
    angular_speed: f32,
    angle: f32,
}

impl OrbitTracking {
    pub fn new(center: Vec3, radius: f32, angular_speed: f32) -> Self {
        Self { center, radius, angular_speed, angle: 0.0 }
    }
}

impl TrackingSource for OrbitTracking {
    fn sample(&mut self, delta_time: f32) -> Pose {
        self.angle += self.angular_speed * delta_time;
        let offset = Vec3::new(self.angle.sin(), 0.0, self.angle.cos()) * self.radius;
        Pose::new(self.center + offset, Quat::from_rotation_y(self.angle))
    }
}

/// A source pinned to one pose, for heads that barely move.
pub struct FixedTracking(pub Pose);

impl TrackingSource for FixedTracking {
    fn sample(&mut self, _delta_time: f32) -> Pose {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orbit_samples_move_and_stay_finite() {
        let mut source = OrbitTracking::new(Vec3::new(0.0, 0.5, 2.0), 0.3, 1.0);
        let first = source.sample(0.016);
        let second = source.sample(0.016);
        assert_ne!(first.position, second.position);
        assert!(first.position.is_finite());
        assert!(second.orientation.is_finite());
        // Samples stay on the arc.
        assert!((first.position - Vec3::new(0.0, 0.5, 2.0)).length() <= 0.3 + 1e-6);
    }
}
