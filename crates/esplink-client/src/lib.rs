//! Client facade for an esplink serial link.
//!
//! [`Client`] owns the transport, the receive buffer and the request writer.
//! It hands out validated packets, streams requests, and runs the
//! synchronization handshake when asked to or when the peer sends SYNC.

pub mod client;
pub mod config;
pub mod error;
pub mod sync;

pub use client::{Client, DEFAULT_BUFFER_SIZE};
pub use config::{ClientConfig, Timeout, DEFAULT_BYTE_TIMEOUT, DEFAULT_RECEIVE_TIMEOUT};
pub use error::{ClientError, Result};
pub use sync::{SyncOutcome, SyncState, SYNC_MARKER};
