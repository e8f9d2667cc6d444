//! Two-party readiness barrier.
//!
//! Each client announces itself once, then polls the relay until both flags
//! are up. Instead of busy-polling inside a blocked frame loop, the machine
//! advances once per frame with capped-backoff polling and reports `Waiting`
//! so the caller can keep rendering; a configurable ceiling turns a peer
//! that never shows up into a fatal timeout rather than an eternal stall.

use std::time::{Duration, Instant};

use anyhow::{bail, Result};

use shared::DeviceClass;

use crate::store::RelayStore;

#[derive(Debug, Clone)]
pub struct HandshakeConfig {
    /// First poll delay; doubles on each unsuccessful poll.
    pub poll_initial: Duration,
    /// Backoff cap.
    pub poll_max: Duration,
    /// Total time allowed before the handshake fails.
    pub ceiling: Duration,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            poll_initial: Duration::from_millis(10),
            poll_max: Duration::from_millis(500),
            ceiling: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeStatus {
    /// Still waiting for the peer; keep the frame loop alive.
    Waiting,
    /// Both sides announced; gameplay may proceed.
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Announcing,
    Ready,
}

pub struct Handshake {
    device: DeviceClass,
    config: HandshakeConfig,
    state: State,
    announced: bool,
    started: Option<Instant>,
    next_poll_at: Option<Instant>,
    backoff: Duration,
}

impl Handshake {
    pub fn new(device: DeviceClass, config: HandshakeConfig) -> Self {
        let backoff = config.poll_initial;
        Self {
            device,
            config,
            state: State::Announcing,
            announced: false,
            started: None,
            next_poll_at: None,
            backoff,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state == State::Ready
    }

    /// Advances the machine one frame. Transport failures are retried on the
    /// backoff schedule; only exhausting the ceiling is fatal.
    pub fn advance<S: RelayStore>(&mut self, store: &mut S, now: Instant) -> Result<HandshakeStatus> {
        if self.state == State::Ready {
            return Ok(HandshakeStatus::Ready);
        }

        let started = *self.started.get_or_insert(now);
        if now.duration_since(started) > self.config.ceiling {
            bail!(
                "readiness handshake timed out after {:?} (peer never announced)",
                self.config.ceiling
            );
        }

        if !self.announced {
            match store.ready_announce(self.device) {
                Ok(()) => {
                    self.announced = true;
                    tracing::info!(device = ?self.device, "Announced ready");
                }
                Err(err) => {
                    tracing::warn!(error = %err, "Ready announce failed, will retry");
                    return Ok(HandshakeStatus::Waiting);
                }
            }
        }

        if let Some(at) = self.next_poll_at {
            if now < at {
                return Ok(HandshakeStatus::Waiting);
            }
        }

        match store.both_ready() {
            Ok(true) => {
                self.state = State::Ready;
                tracing::info!("Both devices ready, starting gameplay");
                Ok(HandshakeStatus::Ready)
            }
            Ok(false) => {
                self.schedule_next_poll(now);
                Ok(HandshakeStatus::Waiting)
            }
            Err(err) => {
                tracing::warn!(error = %err, "Readiness poll failed");
                self.schedule_next_poll(now);
                Ok(HandshakeStatus::Waiting)
            }
        }
    }

    fn schedule_next_poll(&mut self, now: Instant) {
        self.next_poll_at = Some(now + self.backoff);
        self.backoff = (self.backoff * 2).min(self.config.poll_max);
    }
}
