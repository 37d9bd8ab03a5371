//! SLIP-framed, CRC16-checked request/response link for serial peers.
//!
//! esplink talks to a microcontroller bridge over any byte-oriented link.
//! Requests are streamed without buffering; inbound packets are assembled in
//! a fixed buffer, checksummed and handed out as borrowed views.
//!
//! # Crate Structure
//!
//! - [`transport`]: byte-level transport trait plus in-memory and `std::io` adapters
//! - [`frame`]: SLIP codec, CRC16, frame assembler, packet validation and request writer
//! - [`client`]: client facade with the link synchronization handshake (behind `client` feature)

/// Re-export transport types.
pub mod transport {
    pub use esplink_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use esplink_frame::*;
}

/// Re-export client types (requires `client` feature).
#[cfg(feature = "client")]
pub mod client {
    pub use esplink_client::*;
}
