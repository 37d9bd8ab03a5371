//! Polled byte-level transport abstraction.
//!
//! This is the lowest layer of esplink. A transport knows nothing about
//! framing: it reports whether a byte is waiting, reads one, and writes one.
//! Everything else builds on top of the [`Transport`] trait provided here.
//!
//! Two implementations ship with the crate:
//! - [`MemoryTransport`] keeps both directions in memory (host tests, loopback)
//! - [`IoTransport`] adapts any `std::io::Read + Write` stream (serial ports, sockets)

pub mod error;
pub mod io;
pub mod memory;
pub mod traits;

pub use error::{Result, TransportError};
pub use io::{IoTransport, MAX_WRITE_RETRIES};
pub use memory::MemoryTransport;
pub use traits::Transport;
