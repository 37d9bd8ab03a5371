/// Errors that can occur in client operations.
///
/// Garbled or oversized inbound frames are not errors; they are dropped and
/// the receive call reports no packet.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] esplink_transport::TransportError),

    /// Frame-level error while emitting a request.
    #[error("frame error: {0}")]
    Frame(#[from] esplink_frame::FrameError),

    /// A request carries more parameters than its 16-bit count can express.
    #[error("too many parameters ({count}, max {max})")]
    TooManyParameters { count: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, ClientError>;
