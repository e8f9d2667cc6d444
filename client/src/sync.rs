//! Per-frame state exchange with the relay.
//!
//! Each sync tick pushes the local player's poses, pulls the counterpart
//! device's poses straight into the remote avatar (no interpolation, so
//! snapping at the sync cadence is expected behavior), and publishes both
//! locally-integrated ball transforms unconditionally. Every failure is
//! logged and skipped: a dead relay degrades the session to offline local
//! simulation, it never halts the frame loop.

use shared::{BodyPart, Pose, WireTransform};

use crate::ball::Ball;
use crate::scene::Player;
use crate::store::RelayStore;

pub struct SyncClient {
    interval: u64,
}

impl SyncClient {
    pub fn new(interval: u64) -> Self {
        Self { interval: interval.max(1) }
    }

    /// Blocking startup push so the relay has an initial pose for this
    /// device before the first sync tick.
    pub fn initial_push<S: RelayStore>(&self, store: &mut S, local: &Player) -> anyhow::Result<()> {
        store.set_pose(local.device, BodyPart::Head, local.head.pose.to_wire())?;
        store.set_pose(local.device, BodyPart::Paddle, local.paddle.pose.to_wire())?;
        Ok(())
    }

    /// Runs one sync tick if this frame is on the cadence.
    pub fn tick<S: RelayStore>(
        &self,
        frame: u64,
        store: &mut S,
        local: &Player,
        remote: &mut Player,
        ball: &Ball,
    ) {
        if frame % self.interval != 0 {
            return;
        }

        self.push_local(store, local);
        self.pull_remote(store, remote);
        self.push_ball(store, ball);
    }

    fn push_local<S: RelayStore>(&self, store: &mut S, local: &Player) {
        let pushes = [
            (BodyPart::Head, local.head.pose.to_wire()),
            (BodyPart::Paddle, local.paddle.pose.to_wire()),
        ];
        for (part, wire) in pushes {
            if let Err(err) = store.push_pose(local.device, part, wire) {
                tracing::warn!(?part, error = %err, "Unable to send updated pose");
            }
        }
    }

    /// Pulled poses are applied directly to the avatar's transform state;
    /// stale data simply stays on screen when a pull or decode fails.
    fn pull_remote<S: RelayStore>(&self, store: &mut S, remote: &mut Player) {
        match store.pose(remote.device, BodyPart::Head).and_then(|wire| {
            Pose::from_wire(&wire).map_err(Into::into)
        }) {
            Ok(pose) => remote.head.update(pose),
            Err(err) => tracing::warn!(error = %err, "Unable to retrieve remote head pose"),
        }

        match store.pose(remote.device, BodyPart::Paddle).and_then(|wire| {
            Pose::from_wire(&wire).map_err(Into::into)
        }) {
            Ok(pose) => remote.paddle.update(pose),
            Err(err) => tracing::warn!(error = %err, "Unable to retrieve remote paddle pose"),
        }
    }

    /// Both clients always publish their local ball state; whichever write
    /// lands last wins the slot.
    fn push_ball<S: RelayStore>(&self, store: &mut S, ball: &Ball) {
        for (slot, piece) in ball.transforms.pieces().iter().enumerate() {
            let transform = WireTransform::from_matrix(piece);
            if let Err(err) = store.push_ball_transform(slot as u8, transform) {
                tracing::warn!(slot, error = %err, "Unable to send ball transform");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::PlayerKind;
    use crate::store::testing::FakeStore;
    use glam::{Quat, Vec3};
    use shared::DeviceClass;

    fn players() -> (Player, Player) {
        let local = Player::new(DeviceClass::Primary, PlayerKind::LocalTracked);
        let remote = Player::new(DeviceClass::Secondary, PlayerKind::RemoteDriven);
        (local, remote)
    }

    #[test]
    fn test_tick_pushes_local_and_ball_state() {
        let mut store = FakeStore::default();
        let (mut local, mut remote) = players();
        local.paddle.update(Pose::new(Vec3::new(0.3, 0.1, -1.0), Quat::IDENTITY));
        let ball = Ball::new();
        let sync = SyncClient::new(1);

        sync.tick(0, &mut store, &local, &mut remote, &ball);

        let stored = store.board.pose(DeviceClass::Primary, BodyPart::Paddle);
        assert_eq!(stored, local.paddle.pose.to_wire());
        assert_ne!(store.board.ball_transform(0), WireTransform::zeroed());
        assert_ne!(store.board.ball_transform(1), WireTransform::zeroed());
    }

    #[test]
    fn test_tick_pulls_counterpart_into_remote_avatar() {
        let mut store = FakeStore::default();
        let (local, mut remote) = players();
        let peer_pose = Pose::new(Vec3::new(-0.5, 1.2, 2.0), Quat::from_rotation_y(0.3));
        store
            .board
            .set_pose(DeviceClass::Secondary, BodyPart::Paddle, peer_pose.to_wire());
        let ball = Ball::new();
        let sync = SyncClient::new(1);

        sync.tick(0, &mut store, &local, &mut remote, &ball);

        assert_eq!(remote.paddle.pose, peer_pose);
        // Head slot was never written; the zeroed default decodes and lands
        // on the avatar as-is.
        assert_eq!(remote.head.pose.position, Vec3::ZERO);
    }

    #[test]
    fn test_off_cadence_frames_do_nothing() {
        let mut store = FakeStore::default();
        let (local, mut remote) = players();
        let ball = Ball::new();
        let sync = SyncClient::new(3);

        sync.tick(1, &mut store, &local, &mut remote, &ball);
        sync.tick(2, &mut store, &local, &mut remote, &ball);

        assert_eq!(
            store.board.pose(DeviceClass::Primary, BodyPart::Head),
            Default::default()
        );

        sync.tick(3, &mut store, &local, &mut remote, &ball);
        assert_eq!(
            store.board.pose(DeviceClass::Primary, BodyPart::Head),
            local.head.pose.to_wire()
        );
    }

    #[test]
    fn test_offline_relay_keeps_stale_avatar_and_does_not_panic() {
        let mut store = FakeStore { offline: true, ..Default::default() };
        let (local, mut remote) = players();
        let stale = Pose::new(Vec3::new(9.0, 9.0, 9.0), Quat::IDENTITY);
        remote.paddle.update(stale);
        let ball = Ball::new();
        let sync = SyncClient::new(1);

        sync.tick(0, &mut store, &local, &mut remote, &ball);

        assert_eq!(remote.paddle.pose, stale);
    }

    #[test]
    fn test_nan_in_pulled_pose_is_rejected_not_applied() {
        let mut store = FakeStore::default();
        let (local, mut remote) = players();
        let mut poisoned = Pose::IDENTITY.to_wire();
        poisoned.rot_x = f32::NAN;
        store
            .board
            .set_pose(DeviceClass::Secondary, BodyPart::Head, poisoned);
        let before = remote.head.pose;
        let ball = Ball::new();
        let sync = SyncClient::new(1);

        sync.tick(0, &mut store, &local, &mut remote, &ball);

        assert_eq!(remote.head.pose, before);
    }
}
