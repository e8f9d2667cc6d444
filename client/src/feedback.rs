//! Collision side effects: audio and controller haptics.
//!
//! Fire-and-forget from the core's point of view; nothing here feeds back
//! into game state.

use glam::Vec3;

pub trait FeedbackSink {
    /// Ball struck a paddle at this world position.
    fn ball_hit(&mut self, at: Vec3);

    /// Pulse the local controller.
    fn haptic_pulse(&mut self);
}

/// Default sink: log the events. A real build wires an audio engine and the
/// controller vibration API here.
#[derive(Default)]
pub struct TracingFeedback;

impl FeedbackSink for TracingFeedback {
    fn ball_hit(&mut self, at: Vec3) {
        tracing::info!(x = at.x, y = at.y, z = at.z, "clang");
    }

    fn haptic_pulse(&mut self) {
        tracing::debug!("haptic pulse");
    }
}
