//! Ball trajectory integration: serve reset, wall reflections, translation.
//!
//! Both clients run this integrator independently and reconcile only through
//! the relay's ball-transform slots (last write wins). That is a deliberate
//! latency/consistency tradeoff, not something to consolidate into a single
//! authority.

use glam::{Mat4, Vec3};

use crate::scene::TransformSet;

/// Number of mesh pieces composing the ball model.
pub const BALL_PIECES: usize = 2;

/// Uniform scale applied to the ball model.
pub const BALL_SCALE: f32 = 0.2;

/// Velocity the ball serves with after leaving the play boundary.
pub const SERVE_VELOCITY: Vec3 = Vec3::new(0.0, 0.0, 0.3);

/// Depth (scoring) boundary, symmetric about the origin.
pub const DEPTH_BOUND: f32 = 3.0;
/// Side-wall boundary, symmetric.
pub const SIDE_BOUND: f32 = 1.0;
/// Ceiling height.
pub const CEILING_BOUND: f32 = 0.7;
/// Floor height.
pub const FLOOR_BOUND: f32 = -1.0;

/// Compensates for the very small physical velocity magnitude.
pub const TIME_SCALE: f32 = 100.0;

/// Mirror of `glm::reflect`: v reflected about the plane with normal n.
fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

pub struct Ball {
    pub transforms: TransformSet,
    pub velocity: Vec3,
    /// Authority token: which player last batted the ball (0 = unclaimed).
    pub last_toucher: u8,
    /// Always true after construction; no release gating exists yet.
    pub released: bool,
    /// Set when the ball crosses the depth bound. Local bookkeeping only,
    /// nothing consumes it at present.
    pub out_of_bounds: bool,
}

impl Ball {
    pub fn new() -> Self {
        Self {
            transforms: TransformSet::new(BALL_PIECES, Mat4::from_scale(Vec3::splat(BALL_SCALE))),
            velocity: SERVE_VELOCITY,
            last_toucher: 0,
            released: true,
            out_of_bounds: false,
        }
    }

    pub fn centroid(&self) -> Vec3 {
        self.transforms.centroid()
    }

    /// Advances the ball one frame.
    ///
    /// The three boundary checks are independent and deliberately not
    /// short-circuited: a corner tick can both reset for a depth overrun and
    /// reflect for a simultaneous side overrun, in this order.
    pub fn update(&mut self, delta_time: f32) {
        let dt = delta_time * TIME_SCALE;
        let center = self.centroid();

        if center.z > DEPTH_BOUND || center.z < -DEPTH_BOUND {
            self.velocity = SERVE_VELOCITY;
            let reset = Mat4::from_scale(Vec3::splat(BALL_SCALE))
                * Mat4::from_translation(self.velocity * dt);
            self.transforms.set_all(reset);
            self.last_toucher = 0;
            self.out_of_bounds = true;
        }
        if center.x > SIDE_BOUND || center.x < -SIDE_BOUND {
            self.velocity = reflect(self.velocity, Vec3::X);
        }
        if center.y > CEILING_BOUND || center.y < FLOOR_BOUND {
            self.velocity = reflect(self.velocity, Vec3::Y);
        }
        if self.released {
            self.transforms.translate_all(self.velocity * dt);
        }
    }
}

impl Default for Ball {
    fn default() -> Self {
        Self::new()
    }
}
