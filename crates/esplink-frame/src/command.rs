//! Link-level command identifiers.
//!
//! Only the commands this layer acts on are named. Everything else belongs to
//! higher-level dispatch and is carried as [`Command::Other`].

/// No-op command.
pub const NULL: u16 = 0;

/// Link synchronization request.
pub const SYNC: u16 = 1;

/// Response carrying a single value (also answers SYNC).
pub const RESPONSE_VALUE: u16 = 2;

/// Response delivered to a registered callback.
pub const RESPONSE_CALLBACK: u16 = 3;

/// A packet's command identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Null,
    Sync,
    ResponseValue,
    ResponseCallback,
    /// Any opcode owned by higher layers.
    Other(u16),
}

impl Command {
    /// Numeric wire identifier.
    pub const fn id(self) -> u16 {
        match self {
            Command::Null => NULL,
            Command::Sync => SYNC,
            Command::ResponseValue => RESPONSE_VALUE,
            Command::ResponseCallback => RESPONSE_CALLBACK,
            Command::Other(id) => id,
        }
    }

    /// Human-readable name.
    pub const fn name(self) -> &'static str {
        match self {
            Command::Null => "NULL",
            Command::Sync => "SYNC",
            Command::ResponseValue => "RESPONSE_VALUE",
            Command::ResponseCallback => "RESPONSE_CALLBACK",
            Command::Other(_) => "OTHER",
        }
    }
}

impl From<u16> for Command {
    fn from(id: u16) -> Self {
        match id {
            NULL => Command::Null,
            SYNC => Command::Sync,
            RESPONSE_VALUE => Command::ResponseValue,
            RESPONSE_CALLBACK => Command::ResponseCallback,
            other => Command::Other(other),
        }
    }
}

impl From<Command> for u16 {
    fn from(command: Command) -> Self {
        command.id()
    }
}
