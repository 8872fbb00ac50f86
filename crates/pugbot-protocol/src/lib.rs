//! RCON wire protocol for pugbot.
//!
//! This crate defines the binary frame spoken on a game server's remote
//! administration port:
//!
//! - **Types** ([`Packet`], [`PacketKind`], [`RequestId`]): what a frame
//!   carries.
//! - **Codec** ([`encode`], [`decode`], [`declared_length`]): how frames
//!   are turned into bytes and back.
//! - **Errors** ([`ProtocolError`]): malformed framing.
//!
//! # Frame layout
//!
//! ```text
//! ┌──────────────┬────────────┬──────────┬──────────────┬──────┐
//! │ length (i32) │ id (i32)   │ kind(i32)│ body bytes   │ 0 0  │
//! └──────────────┴────────────┴──────────┴──────────────┴──────┘
//!   little-endian, `length` counts everything after itself
//! ```
//!
//! The crate is pure: no sockets, no state. Reassembling frames from a
//! byte stream is the session layer's job.

mod codec;
mod error;
mod types;

pub use codec::{
    LENGTH_PREFIX_SIZE, MAX_BODY_SIZE, MAX_PACKET_SIZE, MIN_PACKET_SIZE,
    declared_length, decode, encode,
};
pub use error::ProtocolError;
pub use types::{Packet, PacketKind, RequestId};
