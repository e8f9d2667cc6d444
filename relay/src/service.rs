//! Per-connection frame loop and request dispatch.
//!
//! The relay holds no game logic: every request either overwrites a slot in
//! the [`BulletinBoard`] or reads one back. Concurrent clients writing
//! different keys never contend beyond the lock; two writers on the same key
//! resolve by last-write-wins, which the entity-key partitioning normally
//! prevents from mattering.

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::RwLock;

use shared::{
    decode_payload, encode_frame, parse_header, BulletinBoard, FrameKind, Request, Response,
    HEADER_LEN,
};

/// Reads frames off one client socket until it closes, answering `Call`
/// frames and silently applying `Cast` frames. A malformed frame drops the
/// connection; it never poisons the board.
pub async fn serve_connection(
    mut stream: TcpStream,
    board: Arc<RwLock<BulletinBoard>>,
) -> anyhow::Result<()> {
    let mut header = [0u8; HEADER_LEN];
    loop {
        match stream.read_exact(&mut header).await {
            Ok(_) => {}
            // Clean shutdown between frames.
            Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(()),
            Err(err) => return Err(err).context("reading frame header"),
        }

        let (kind, len) = parse_header(&header).context("parsing frame header")?;
        let mut payload = vec![0u8; len];
        stream
            .read_exact(&mut payload)
            .await
            .context("reading frame payload")?;
        let request: Request = decode_payload(&payload).context("decoding request")?;
        tracing::trace!(?kind, ?request, "Frame received");

        let response = {
            let mut board = board.write().await;
            apply(&mut board, request)
        };

        if kind == FrameKind::Call {
            let frame = encode_frame(FrameKind::Call, &response)?;
            stream.write_all(&frame).await.context("writing response")?;
        }
    }
}

/// Applies one request to the board and produces the response a `Call`
/// frame would receive. Pure with respect to I/O, so it is testable without
/// sockets.
pub fn apply(board: &mut BulletinBoard, request: Request) -> Response {
    match request {
        Request::SetPose { device, part, pose } => {
            board.set_pose(device, part, pose);
            Response::Ack
        }
        Request::GetPose { device, part } => Response::Pose(board.pose(device, part)),
        Request::SetBallTransform { slot, transform } => {
            board.set_ball_transform(slot, transform);
            Response::Ack
        }
        Request::GetBallTransform { slot } => {
            Response::BallTransform(board.ball_transform(slot))
        }
        Request::SetLastToucher { player } => {
            board.set_last_toucher(player);
            Response::Ack
        }
        Request::GetLastToucher => Response::LastToucher(board.last_toucher()),
        Request::ReadyAnnounce { device } => {
            tracing::info!(?device, "Device announced ready");
            board.ready_announce(device);
            Response::Ack
        }
        Request::CheckBothReady => Response::BothReady(board.both_ready()),
    }
}
