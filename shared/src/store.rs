//! The relay's bulletin board: last-write-wins storage for everything the
//! two clients share.
//!
//! Four pose slots (2 device classes x 2 body parts), two ball-transform
//! slots (one per mesh piece of the ball model), two monotonic readiness
//! flags and the last-toucher authority token. No history and no timestamps:
//! a reader cannot tell a fresh record from a stale one, and reading head +
//! paddle is two separate operations that may observe a torn snapshot. Both
//! are accepted consistency relaxations, not bugs.
//!
//! The board itself is a plain owned object with no locking; the relay wraps
//! it in an `RwLock`, and client tests drive it directly as a fake relay.

use crate::pose::{WirePose, WireTransform};
use crate::protocol::{BodyPart, DeviceClass};

/// Number of independently addressed ball-transform slots.
pub const BALL_SLOTS: usize = 2;

#[derive(Debug, Clone)]
pub struct BulletinBoard {
    poses: [[WirePose; 2]; 2],
    ball: [WireTransform; BALL_SLOTS],
    ready: [bool; 2],
    last_toucher: u8,
}

impl BulletinBoard {
    pub fn new() -> Self {
        Self {
            poses: Default::default(),
            ball: [WireTransform::zeroed(), WireTransform::zeroed()],
            ready: [false; 2],
            last_toucher: 0,
        }
    }

    pub fn set_pose(&mut self, device: DeviceClass, part: BodyPart, pose: WirePose) {
        self.poses[device.index()][part.index()] = pose;
    }

    /// Last stored pose for the slot; zeroed record if never written.
    pub fn pose(&self, device: DeviceClass, part: BodyPart) -> WirePose {
        self.poses[device.index()][part.index()]
    }

    /// Stores a ball transform. The record is kept as received; validation
    /// is the decoding client's job. Out-of-range slots are ignored.
    pub fn set_ball_transform(&mut self, slot: u8, transform: WireTransform) {
        if let Some(entry) = self.ball.get_mut(slot as usize) {
            *entry = transform;
        }
    }

    pub fn ball_transform(&self, slot: u8) -> WireTransform {
        self.ball
            .get(slot as usize)
            .cloned()
            .unwrap_or_else(WireTransform::zeroed)
    }

    /// Marks a device ready. Monotonic: there is no way to clear the flag
    /// for the lifetime of the session.
    pub fn ready_announce(&mut self, device: DeviceClass) {
        self.ready[device.index()] = true;
    }

    pub fn both_ready(&self) -> bool {
        self.ready[0] && self.ready[1]
    }

    /// Claims ball-velocity authority for a player (0 clears the claim).
    pub fn set_last_toucher(&mut self, player: u8) {
        self.last_toucher = player;
    }

    pub fn last_toucher(&self) -> u8 {
        self.last_toucher
    }
}

impl Default for BulletinBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_pose_is_zeroed() {
        let board = BulletinBoard::new();
        let pose = board.pose(DeviceClass::Secondary, BodyPart::Head);
        assert_eq!(pose, WirePose::default());
    }

    #[test]
    fn test_set_then_get_pose_is_identical() {
        let mut board = BulletinBoard::new();
        let wire = WirePose {
            pos_x: 1.0,
            pos_y: 2.0,
            pos_z: 3.0,
            rot_w: 1.0,
            ..Default::default()
        };
        board.set_pose(DeviceClass::Primary, BodyPart::Paddle, wire);
        assert_eq!(board.pose(DeviceClass::Primary, BodyPart::Paddle), wire);
        // Other slots stay untouched.
        assert_eq!(
            board.pose(DeviceClass::Primary, BodyPart::Head),
            WirePose::default()
        );
    }

    #[test]
    fn test_last_write_wins() {
        let mut board = BulletinBoard::new();
        let first = WirePose { pos_x: 1.0, ..Default::default() };
        let second = WirePose { pos_x: -4.0, ..Default::default() };
        board.set_pose(DeviceClass::Primary, BodyPart::Head, first);
        board.set_pose(DeviceClass::Primary, BodyPart::Head, second);
        assert_eq!(board.pose(DeviceClass::Primary, BodyPart::Head), second);
    }

    #[test]
    fn test_ball_slots_are_independent() {
        let mut board = BulletinBoard::new();
        let transform = WireTransform { values: (0..16).map(|i| i as f32).collect() };
        board.set_ball_transform(0, transform.clone());
        assert_eq!(board.ball_transform(0), transform);
        assert_eq!(board.ball_transform(1), WireTransform::zeroed());
    }

    #[test]
    fn test_out_of_range_ball_slot_ignored() {
        let mut board = BulletinBoard::new();
        board.set_ball_transform(7, WireTransform { values: vec![1.0] });
        assert_eq!(board.ball_transform(7), WireTransform::zeroed());
    }

    #[test]
    fn test_readiness_is_monotonic_and() {
        let mut board = BulletinBoard::new();
        assert!(!board.both_ready());
        board.ready_announce(DeviceClass::Primary);
        assert!(!board.both_ready());
        board.ready_announce(DeviceClass::Secondary);
        assert!(board.both_ready());
        // Repeat announcements are idempotent; readiness never resets.
        board.ready_announce(DeviceClass::Primary);
        assert!(board.both_ready());
    }

    #[test]
    fn test_last_toucher_claim_and_clear() {
        let mut board = BulletinBoard::new();
        assert_eq!(board.last_toucher(), 0);
        board.set_last_toucher(2);
        assert_eq!(board.last_toucher(), 2);
        board.set_last_toucher(0);
        assert_eq!(board.last_toucher(), 0);
    }
}
