//! Paddle-vs-ball authority resolution.
//!
//! Axis-aligned containment of the ball centroid inside each candidate
//! paddle's AABB, rebuilt every frame from the paddle's current world
//! transform. There is no broad phase and no time-of-impact sub-stepping, so
//! a fast-moving paddle can tunnel through the ball between frames.

use glam::Vec3;

use crate::ball::Ball;
use crate::scene::{Player, PlayerKind};

/// Fixed speed imparted by a paddle hit, sign-negated relative to the
/// paddle facing.
pub const HIT_SPEED: f32 = 0.15;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Tight box around a point cloud.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Aabb {
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        for p in points {
            min = min.min(p);
            max = max.max(p);
        }
        Aabb { min, max }
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }
}

/// A registered paddle hit: the new authority and the ball state it caused.
#[derive(Debug, Clone, Copy)]
pub struct HitEvent {
    pub player: u8,
    pub at: Vec3,
    pub velocity: Vec3,
}

/// Runs one resolver pass over the candidate players.
///
/// Only locally tracked paddles compete: a remote-driven mirror replays its
/// owner's resolution through the relay rather than re-claiming here. A hit
/// registers iff the paddle box contains the ball centroid AND the current
/// last-toucher differs from that player (so a paddle still in contact
/// cannot re-trigger on consecutive frames). At most one player can newly
/// claim authority per pass: the first hit wins and the pass stops.
pub fn resolve_hits<'a>(
    ball: &mut Ball,
    players: impl IntoIterator<Item = &'a Player>,
) -> Option<HitEvent> {
    let center = ball.centroid();
    for player in players {
        if player.kind != PlayerKind::LocalTracked {
            continue;
        }
        let aabb = Aabb::from_points(player.paddle.world_vertices());
        if aabb.contains(center) && ball.last_toucher != player.number {
            // New velocity: the paddle's forward axis, sign-negated and
            // scaled to the fixed hit speed.
            let forward = player.paddle.pose.orientation * Vec3::Z;
            let velocity = forward * -HIT_SPEED;
            ball.velocity = velocity;
            ball.last_toucher = player.number;
            tracing::debug!(player = player.number, ?velocity, "Paddle hit");
            return Some(HitEvent { player: player.number, at: center, velocity });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::PlayerKind;
    use glam::{Mat4, Quat};
    use shared::{DeviceClass, Pose};

    fn player_with_paddle_at(device: DeviceClass, position: Vec3, orientation: Quat) -> Player {
        let mut player = Player::new(device, PlayerKind::LocalTracked);
        player.paddle.update(Pose::new(position, orientation));
        player
    }

    fn ball_at(center: Vec3) -> Ball {
        let mut ball = Ball::new();
        ball.transforms.set_all(Mat4::from_translation(center));
        ball
    }

    #[test]
    fn test_aabb_containment() {
        let aabb = Aabb::from_points([Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0)]);
        assert!(aabb.contains(Vec3::ZERO));
        assert!(aabb.contains(Vec3::new(1.0, 1.0, 1.0)));
        assert!(!aabb.contains(Vec3::new(1.01, 0.0, 0.0)));
    }

    #[test]
    fn test_hit_claims_authority_and_reverses_along_facing() {
        let center = Vec3::new(0.5, 0.0, 0.0);
        let mut ball = ball_at(center);
        let player = player_with_paddle_at(DeviceClass::Primary, center, Quat::IDENTITY);

        let hit = resolve_hits(&mut ball, [&player]).expect("containment should register");
        assert_eq!(hit.player, 1);
        assert_eq!(ball.last_toucher, 1);
        // Identity orientation faces +Z; the hit sends the ball along -Z.
        assert!((ball.velocity - Vec3::new(0.0, 0.0, -HIT_SPEED)).length() < 1e-6);
    }

    #[test]
    fn test_same_player_cannot_retrigger_while_in_contact() {
        let center = Vec3::ZERO;
        let mut ball = ball_at(center);
        let player = player_with_paddle_at(DeviceClass::Primary, center, Quat::IDENTITY);

        assert!(resolve_hits(&mut ball, [&player]).is_some());
        let velocity = ball.velocity;
        // Next frame, still in contact: no new claim, velocity untouched.
        assert!(resolve_hits(&mut ball, [&player]).is_none());
        assert_eq!(ball.velocity, velocity);
    }

    #[test]
    fn test_single_claim_per_pass() {
        // Both paddles contain the center; only the first can claim.
        let center = Vec3::ZERO;
        let mut ball = ball_at(center);
        let first = player_with_paddle_at(DeviceClass::Primary, center, Quat::IDENTITY);
        let second = player_with_paddle_at(DeviceClass::Secondary, center, Quat::IDENTITY);

        let hit = resolve_hits(&mut ball, [&first, &second]).unwrap();
        assert_eq!(hit.player, 1);
        assert_eq!(ball.last_toucher, 1);
    }

    #[test]
    fn test_remote_driven_paddle_never_claims() {
        let center = Vec3::ZERO;
        let mut ball = ball_at(center);
        let mut mirror = Player::new(DeviceClass::Secondary, PlayerKind::RemoteDriven);
        mirror.paddle.update(Pose::new(center, Quat::IDENTITY));

        // Containment alone is not enough: the mirror is not tracked here.
        assert!(resolve_hits(&mut ball, [&mirror]).is_none());
        assert_eq!(ball.last_toucher, 0);
    }

    #[test]
    fn test_miss_outside_paddle_box() {
        let mut ball = ball_at(Vec3::new(0.0, 0.0, 1.0));
        // Paddle is tiny (PADDLE_SCALE world extent), far from the ball.
        let player = player_with_paddle_at(DeviceClass::Primary, Vec3::ZERO, Quat::IDENTITY);
        assert!(resolve_hits(&mut ball, [&player]).is_none());
        assert_eq!(ball.last_toucher, 0);
    }

    #[test]
    fn test_rotated_paddle_redirects_along_new_facing() {
        let center = Vec3::ZERO;
        let mut ball = ball_at(center);
        // Paddle rotated 90 degrees about Y: forward becomes +X.
        let rot = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let player = player_with_paddle_at(DeviceClass::Primary, center, rot);

        resolve_hits(&mut ball, [&player]).unwrap();
        assert!((ball.velocity - Vec3::new(-HIT_SPEED, 0.0, 0.0)).length() < 1e-5);
    }
}
