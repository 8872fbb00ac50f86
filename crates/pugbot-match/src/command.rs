//! In-game chat commands.

/// A `!command` typed in game chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// `!login <password>`: claim PUG admin rights.
    Login(String),
    /// `!lo3`: go live.
    Lo3,
    /// `!request`: ask the chat channel for players.
    Request,
    /// `!map <name>`: change level before going live.
    Map(String),
    /// `!restart`: restart the game before going live.
    Restart,
    /// `!cancelhalf`: throw away the current half.
    CancelHalf,
    /// `!irc <text>`: relay a message to the chat channel.
    Irc(String),
}

impl ChatCommand {
    /// Parses a chat message. Returns `None` for ordinary chat and for
    /// commands missing their argument.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (name, rest) = match text.split_once(' ') {
            Some((name, rest)) => (name, rest.trim()),
            None => (text, ""),
        };
        let arg = || (!rest.is_empty()).then(|| rest.to_string());

        match name {
            "!login" => arg()
                .and_then(|a| a.split(' ').next().map(String::from))
                .map(Self::Login),
            "!lo3" => Some(Self::Lo3),
            "!request" => Some(Self::Request),
            "!map" => arg()
                .and_then(|a| a.split(' ').next().map(String::from))
                .map(Self::Map),
            "!restart" => Some(Self::Restart),
            "!cancelhalf" => Some(Self::CancelHalf),
            "!irc" => arg().map(Self::Irc),
            _ => None,
        }
    }

    /// Returns `true` for commands only the logged-in admin may use.
    pub fn requires_admin(&self) -> bool {
        !matches!(self, Self::Login(_))
    }
}
