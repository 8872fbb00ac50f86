//! RCON sessions for pugbot.
//!
//! An [`RconSession`] owns one connection to a game server's admin port
//! and layers the remote-console conversation on top of it:
//!
//! 1. **Authentication**: the password handshake, including the empty
//!    reply some servers send before the real auth response
//! 2. **Commands**: fire-and-forget `EXEC` packets with advancing ids
//! 3. **Replies**: reassembling whole frames out of a TCP byte stream
//!
//! # How it fits in the stack
//!
//! ```text
//! Engine (above)  ← issues commands when the match state machine asks
//!     ↕
//! Session Layer (this crate)  ← auth, request ids, frame reassembly
//!     ↕
//! Protocol + Transport (below)  ← frame codec, raw socket reads/writes
//! ```

mod error;
mod session;

pub use error::RconError;
pub use session::{
    AUTH_TIMEOUT, REPLY_TIMEOUT, RconSession, SessionState, WRITE_TIMEOUT,
};
