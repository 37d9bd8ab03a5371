use esplink_transport::TransportError;

/// Errors that can occur while framing, validating or emitting packets.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The frame is too short to hold a header and checksum.
    #[error("frame too short ({len} bytes, min {min})")]
    TooShort { len: usize, min: usize },

    /// The trailing checksum does not match the frame body.
    #[error("checksum mismatch (frame carries {received:#06x}, computed {computed:#06x})")]
    ChecksumMismatch { received: u16, computed: u16 },

    /// The frame exceeded the receive buffer and was dropped.
    #[error("frame too large ({len} bytes, capacity {capacity})")]
    Oversized { len: usize, capacity: usize },

    /// A request parameter does not fit its 16-bit length prefix.
    #[error("parameter too long ({len} bytes, max {max})")]
    ParameterTooLong { len: usize, max: usize },

    /// An argument's length prefix runs past the end of the packet.
    #[error("argument truncated (needs {needed} bytes, {available} left)")]
    TruncatedArgument { needed: usize, available: usize },

    /// The transport failed while a frame was being written.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, FrameError>;
