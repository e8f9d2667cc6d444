//! Remote-call protocol between game clients and the relay.
//!
//! Every exchange is one frame: a 1-byte kind, a big-endian u32 payload
//! length, then the payload as a self-describing MessagePack map (encoded
//! with `rmp_serde::to_vec_named`, so records are keyed by field name rather
//! than position). `Call` frames expect a [`Response`] frame back; `Cast`
//! frames are fire-and-forget and the relay never answers them.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use crate::pose::{WirePose, WireTransform};

/// Errors in frame encoding/decoding, distinct from game-level decode errors.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("failed to encode message: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("failed to decode message: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    #[error("unknown frame kind byte {0:#x}")]
    UnknownKind(u8),

    #[error("frame of {0} bytes exceeds the {MAX_PAYLOAD} byte limit")]
    Oversized(usize),
}

/// Which physical tracking rig produced a pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceClass {
    /// The head-mounted positional-tracking rig.
    Primary,
    /// The external hand-tracking sensor.
    Secondary,
}

impl DeviceClass {
    pub fn index(self) -> usize {
        match self {
            DeviceClass::Primary => 0,
            DeviceClass::Secondary => 1,
        }
    }

    /// The other physical device in the session.
    pub fn counterpart(self) -> DeviceClass {
        match self {
            DeviceClass::Primary => DeviceClass::Secondary,
            DeviceClass::Secondary => DeviceClass::Primary,
        }
    }

    /// Player number used for last-toucher authority (0 means unclaimed).
    pub fn player_number(self) -> u8 {
        match self {
            DeviceClass::Primary => 1,
            DeviceClass::Secondary => 2,
        }
    }
}

/// Which tracked body part a pose slot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyPart {
    Head,
    Paddle,
}

impl BodyPart {
    pub fn index(self) -> usize {
        match self {
            BodyPart::Head => 0,
            BodyPart::Paddle => 1,
        }
    }
}

/// Requests a client sends to the relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Request {
    SetPose {
        device: DeviceClass,
        part: BodyPart,
        pose: WirePose,
    },
    GetPose {
        device: DeviceClass,
        part: BodyPart,
    },
    SetBallTransform {
        slot: u8,
        transform: WireTransform,
    },
    GetBallTransform {
        slot: u8,
    },
    SetLastToucher {
        player: u8,
    },
    GetLastToucher,
    ReadyAnnounce {
        device: DeviceClass,
    },
    CheckBothReady,
}

/// Responses the relay sends back for `Call` frames.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Response {
    Ack,
    Pose(WirePose),
    BallTransform(WireTransform),
    LastToucher(u8),
    BothReady(bool),
}

/// Whether a frame expects a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Blocking request/response round trip.
    Call,
    /// Fire-and-forget write; the relay applies it and stays silent.
    Cast,
}

impl FrameKind {
    pub fn to_byte(self) -> u8 {
        match self {
            FrameKind::Call => 0,
            FrameKind::Cast => 1,
        }
    }

    pub fn from_byte(byte: u8) -> Result<FrameKind, ProtocolError> {
        match byte {
            0 => Ok(FrameKind::Call),
            1 => Ok(FrameKind::Cast),
            other => Err(ProtocolError::UnknownKind(other)),
        }
    }
}

/// Frame header: kind byte + u32be payload length.
pub const HEADER_LEN: usize = 5;

/// Upper bound on a single payload. The largest legitimate record is a
/// 16-float transform; anything near this limit is a confused peer.
pub const MAX_PAYLOAD: usize = 16 * 1024;

/// Encodes a complete frame (header + MessagePack map payload).
pub fn encode_frame<T: Serialize>(kind: FrameKind, msg: &T) -> Result<Vec<u8>, ProtocolError> {
    let payload = rmp_serde::to_vec_named(msg)?;
    if payload.len() > MAX_PAYLOAD {
        return Err(ProtocolError::Oversized(payload.len()));
    }
    let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());
    frame.push(kind.to_byte());
    frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Parses a frame header into its kind and payload length.
pub fn parse_header(header: &[u8; HEADER_LEN]) -> Result<(FrameKind, usize), ProtocolError> {
    let kind = FrameKind::from_byte(header[0])?;
    let len = u32::from_be_bytes([header[1], header[2], header[3], header[4]]) as usize;
    if len > MAX_PAYLOAD {
        return Err(ProtocolError::Oversized(len));
    }
    Ok((kind, len))
}

/// Decodes a frame payload.
pub fn decode_payload<T: DeserializeOwned>(payload: &[u8]) -> Result<T, ProtocolError> {
    Ok(rmp_serde::from_slice(payload)?)
}
