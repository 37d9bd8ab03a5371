use esplink_frame::{Command, END};
use esplink_transport::Transport;
use tracing::{debug, info, trace, warn};

use crate::client::Client;
use crate::error::Result;

/// Plain-text marker sent ahead of a sync so a line-oriented reader on the
/// peer resets too.
pub const SYNC_MARKER: &str = "sync\n";

/// Whether a synchronization handshake is running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncState {
    #[default]
    Idle,
    Syncing,
}

/// How a [`Client::sync`] call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The peer answered with a value response.
    Synchronized,
    /// Receive ran dry before a value response arrived.
    NoResponse,
    /// A sync was already running; nothing was sent.
    AlreadySyncing,
}

impl SyncOutcome {
    /// True only for [`SyncOutcome::Synchronized`].
    pub fn is_synchronized(self) -> bool {
        self == SyncOutcome::Synchronized
    }
}

impl<T: Transport, const N: usize> Client<T, N> {
    /// Re-establish the link.
    ///
    /// Sends the text marker, flushes inbound bytes, sends a bare delimiter,
    /// flushes again and then a SYNC request. Packets are read with the
    /// configured receive timeout until a value response arrives; any other
    /// packet is discarded.
    ///
    /// Never recurses: a SYNC arriving while this runs (or a nested call)
    /// returns [`SyncOutcome::AlreadySyncing`] without touching the
    /// transport. The state is back to [`SyncState::Idle`] when this returns,
    /// including on error.
    pub fn sync(&mut self) -> Result<SyncOutcome> {
        if self.sync_state == SyncState::Syncing {
            debug!("sync already in progress");
            return Ok(SyncOutcome::AlreadySyncing);
        }

        self.sync_state = SyncState::Syncing;
        let outcome = self.run_sync();
        self.sync_state = SyncState::Idle;
        outcome
    }

    fn run_sync(&mut self) -> Result<SyncOutcome> {
        self.send_text(SYNC_MARKER)?;
        self.clear_input()?;
        self.transport.write_byte(END)?;
        self.clear_input()?;
        self.send_request(Command::Sync, 0, &[])?;

        let timeout = self.config().receive_timeout;
        loop {
            let command = match self.receive(timeout)? {
                Some(packet) => packet.command(),
                None => break,
            };

            match command {
                Command::ResponseValue => {
                    info!("link synchronized");
                    return Ok(SyncOutcome::Synchronized);
                }
                other => trace!(command = other.id(), "discarding packet while syncing"),
            }
        }

        warn!("no response to sync");
        Ok(SyncOutcome::NoResponse)
    }
}
