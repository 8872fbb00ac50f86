//! Error types for the PUG and match layers.
//!
//! Every variant's text is written to be sent back to whoever issued the
//! rejected command.

use crate::MatchPhase;

/// Errors from PUG roster operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PugError {
    /// A PUG is already running on the channel.
    #[error("A PUG has already been started, please wait until the next PUG has started.")]
    AlreadyStarted,

    /// No PUG is running on the channel.
    #[error("A PUG has not been started, type !pug <map> to start a new one.")]
    NoPug,

    /// The player is already on the roster.
    #[error("{0} has already joined the PUG.")]
    AlreadyJoined(String),

    /// The roster is full.
    #[error("The PUG is full.")]
    PugFull,

    /// The player is not on the roster.
    #[error("{0} is not in the PUG.")]
    NotInPug(String),

    /// The match is live and the roster is locked.
    #[error("The match has already gone live.")]
    MatchInProgress,

    /// Only the PUG admin may do this.
    #[error("Only the PUG admin ({0}) can do that.")]
    NotAdmin(String),

    /// No game server is free in the channel's region.
    #[error("Unable to discover any available servers in region {0}.")]
    NoServer(String),
}

/// Errors from match commands.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    /// Map changes and restarts are locked once a half has started.
    #[error("The game has gone live.")]
    GoneLive,

    /// The command does not apply in the current phase.
    #[error("Not possible while the match is in phase {0}.")]
    InvalidPhase(MatchPhase),

    /// The server has no PUG and no admin password.
    #[error("No PUG is running on this server.")]
    NotArmed,

    /// No one has logged in as admin yet.
    #[error("Nobody has logged in as PUG admin, use !login <password>.")]
    NotLoggedIn,

    /// Someone else is the logged-in admin.
    #[error("Only the PUG admin can do that.")]
    NotAdmin,

    /// An admin is already logged in.
    #[error("A PUG admin has already logged in.")]
    AdminTaken,

    /// The chat line carried no steam id, so the player cannot be
    /// told apart from anyone else.
    #[error("Unable to identify you, admin commands need a steam id.")]
    UnknownPlayer,

    /// `!login` with the wrong password.
    #[error("Wrong admin password.")]
    WrongPassword,

    /// The map is not on the allow-list.
    #[error("Map {0} is not allowed.")]
    UnknownMap(String),
}
