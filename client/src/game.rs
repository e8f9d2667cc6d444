//! Frame driver: one `frame()` call per rendered frame, orchestrating the
//! readiness handshake, tracking input, ball integration, collision
//! authority resolution and the sync tick, in that order. Single-threaded
//! cooperative; process exit is the only teardown.

use std::time::Instant;

use anyhow::Result;

use shared::DeviceClass;

use crate::ball::Ball;
use crate::collision::resolve_hits;
use crate::feedback::FeedbackSink;
use crate::handshake::{Handshake, HandshakeConfig, HandshakeStatus};
use crate::scene::{Player, PlayerKind};
use crate::store::RelayStore;
use crate::sync::SyncClient;
use crate::tracking::TrackingSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePhase {
    /// Handshake still pending; the scene renders a waiting state.
    Waiting,
    /// Gameplay ran this frame.
    Playing,
}

pub struct Game<S: RelayStore> {
    store: S,
    local: Player,
    remote: Player,
    ball: Ball,
    handshake: Handshake,
    sync: SyncClient,
    head_source: Box<dyn TrackingSource>,
    paddle_source: Box<dyn TrackingSource>,
    feedback: Box<dyn FeedbackSink>,
    frame: u64,
}

impl<S: RelayStore> Game<S> {
    pub fn new(
        device: DeviceClass,
        mut store: S,
        sync_interval: u64,
        handshake_config: HandshakeConfig,
        head_source: Box<dyn TrackingSource>,
        paddle_source: Box<dyn TrackingSource>,
        feedback: Box<dyn FeedbackSink>,
    ) -> Result<Self> {
        let local = Player::new(device, PlayerKind::LocalTracked);
        let remote = Player::new(device.counterpart(), PlayerKind::RemoteDriven);
        let sync = SyncClient::new(sync_interval);

        // Seed the relay with this device's rest poses before the first
        // tick, so the peer never pulls an all-zero record mid-session.
        if let Err(err) = sync.initial_push(&mut store, &local) {
            tracing::warn!(error = %err, "Unable to set initial poses on the relay");
        }

        Ok(Self {
            store,
            local,
            remote,
            ball: Ball::new(),
            handshake: Handshake::new(device, handshake_config),
            sync,
            head_source,
            paddle_source,
            feedback,
            frame: 0,
        })
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn local(&self) -> &Player {
        &self.local
    }

    pub fn remote(&self) -> &Player {
        &self.remote
    }

    /// Advances the game by one frame.
    pub fn frame(&mut self, delta_time: f32) -> Result<FramePhase> {
        self.frame += 1;

        if !self.handshake.is_ready() {
            match self.handshake.advance(&mut self.store, Instant::now())? {
                HandshakeStatus::Waiting => return Ok(FramePhase::Waiting),
                HandshakeStatus::Ready => {}
            }
        }

        // Local tracking samples drive the local avatar's transforms.
        let head_pose = self.head_source.sample(delta_time);
        let paddle_pose = self.paddle_source.sample(delta_time);
        self.local.head.update(head_pose);
        self.local.paddle.update(paddle_pose);

        self.ball.update(delta_time);

        // Both avatars go to the resolver; it only lets locally tracked
        // paddles claim, so the peer resolves its own paddle on its own
        // simulation.
        if let Some(hit) = resolve_hits(&mut self.ball, [&self.local, &self.remote]) {
            tracing::info!(player = hit.player, velocity = ?hit.velocity, "Hit the ball");
            if let Err(err) = self.store.push_last_toucher(hit.player) {
                tracing::warn!(error = %err, "Unable to set last player");
            }
            self.feedback.ball_hit(hit.at);
            self.feedback.haptic_pulse();
        }

        self.sync
            .tick(self.frame, &mut self.store, &self.local, &mut self.remote, &self.ball);

        Ok(FramePhase::Playing)
    }
}
