//! Store abstraction between game logic and the relay transport.
//!
//! The handshake and sync client only ever talk to a [`RelayStore`], so
//! tests can inject an in-memory fake (a bare [`BulletinBoard`]) and drive
//! the protocol without sockets. `set_*` methods are confirmed round trips;
//! `push_*` methods are the lossy fast path used every sync tick.

use anyhow::{bail, Context, Result};

use shared::{BodyPart, DeviceClass, Request, Response, WirePose, WireTransform};

use crate::rpc::RpcClient;

pub trait RelayStore {
    /// Confirmed pose write (blocking). Used for the startup push.
    fn set_pose(&mut self, device: DeviceClass, part: BodyPart, pose: WirePose) -> Result<()>;

    /// Fire-and-forget pose write for the per-tick fast path.
    fn push_pose(&mut self, device: DeviceClass, part: BodyPart, pose: WirePose) -> Result<()>;

    fn pose(&mut self, device: DeviceClass, part: BodyPart) -> Result<WirePose>;

    fn push_ball_transform(&mut self, slot: u8, transform: WireTransform) -> Result<()>;

    fn push_last_toucher(&mut self, player: u8) -> Result<()>;

    fn ready_announce(&mut self, device: DeviceClass) -> Result<()>;

    fn both_ready(&mut self) -> Result<bool>;
}

/// The real store: every operation is a frame to the relay.
pub struct RemoteStore {
    rpc: RpcClient,
}

impl RemoteStore {
    pub fn new(rpc: RpcClient) -> Self {
        Self { rpc }
    }
}

impl RelayStore for RemoteStore {
    fn set_pose(&mut self, device: DeviceClass, part: BodyPart, pose: WirePose) -> Result<()> {
        let response = self
            .rpc
            .call(&Request::SetPose { device, part, pose })
            .context("setPose call")?;
        match response {
            Response::Ack => Ok(()),
            other => bail!("unexpected setPose response: {other:?}"),
        }
    }

    fn push_pose(&mut self, device: DeviceClass, part: BodyPart, pose: WirePose) -> Result<()> {
        self.rpc
            .cast(&Request::SetPose { device, part, pose })
            .context("setPose cast")
    }

    fn pose(&mut self, device: DeviceClass, part: BodyPart) -> Result<WirePose> {
        let response = self
            .rpc
            .call(&Request::GetPose { device, part })
            .context("getPose call")?;
        match response {
            Response::Pose(pose) => Ok(pose),
            other => bail!("unexpected getPose response: {other:?}"),
        }
    }

    fn push_ball_transform(&mut self, slot: u8, transform: WireTransform) -> Result<()> {
        self.rpc
            .cast(&Request::SetBallTransform { slot, transform })
            .context("setBallTransform cast")
    }

    fn push_last_toucher(&mut self, player: u8) -> Result<()> {
        self.rpc
            .cast(&Request::SetLastToucher { player })
            .context("setLastToucher cast")
    }

    fn ready_announce(&mut self, device: DeviceClass) -> Result<()> {
        let response = self
            .rpc
            .call(&Request::ReadyAnnounce { device })
            .context("readyAnnounce call")?;
        match response {
            Response::Ack => Ok(()),
            other => bail!("unexpected readyAnnounce response: {other:?}"),
        }
    }

    fn both_ready(&mut self) -> Result<bool> {
        let response = self
            .rpc
            .call(&Request::CheckBothReady)
            .context("checkBothReady call")?;
        match response {
            Response::BothReady(ready) => Ok(ready),
            other => bail!("unexpected checkBothReady response: {other:?}"),
        }
    }
}

/// In-memory fake relay for unit tests: the real `BulletinBoard` behind the
/// store trait, with a switch to simulate a dead link.
#[cfg(test)]
pub mod testing {
    use super::*;
    use shared::BulletinBoard;

    #[derive(Default)]
    pub struct FakeStore {
        pub board: BulletinBoard,
        pub offline: bool,
        pub announces: u32,
    }

    impl FakeStore {
        fn check_link(&self) -> Result<()> {
            if self.offline {
                bail!("relay unreachable");
            }
            Ok(())
        }
    }

    impl RelayStore for FakeStore {
        fn set_pose(&mut self, device: DeviceClass, part: BodyPart, pose: WirePose) -> Result<()> {
            self.check_link()?;
            self.board.set_pose(device, part, pose);
            Ok(())
        }

        fn push_pose(&mut self, device: DeviceClass, part: BodyPart, pose: WirePose) -> Result<()> {
            self.check_link()?;
            self.board.set_pose(device, part, pose);
            Ok(())
        }

        fn pose(&mut self, device: DeviceClass, part: BodyPart) -> Result<WirePose> {
            self.check_link()?;
            Ok(self.board.pose(device, part))
        }

        fn push_ball_transform(&mut self, slot: u8, transform: WireTransform) -> Result<()> {
            self.check_link()?;
            self.board.set_ball_transform(slot, transform);
            Ok(())
        }

        fn push_last_toucher(&mut self, player: u8) -> Result<()> {
            self.check_link()?;
            self.board.set_last_toucher(player);
            Ok(())
        }

        fn ready_announce(&mut self, device: DeviceClass) -> Result<()> {
            self.check_link()?;
            self.announces += 1;
            self.board.ready_announce(device);
            Ok(())
        }

        fn both_ready(&mut self) -> Result<bool> {
            self.check_link()?;
            Ok(self.board.both_ready())
        }
    }
}
