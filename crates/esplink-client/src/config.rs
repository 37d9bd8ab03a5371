use std::time::{Duration, Instant};

/// Default budget for [`Client::receive`](crate::Client::receive):
/// 10 000 polls of the transport.
pub const DEFAULT_RECEIVE_TIMEOUT: Timeout = Timeout::Iterations(10_000);

/// Default budget for a single timed byte read.
pub const DEFAULT_BYTE_TIMEOUT: Timeout = Timeout::Iterations(10_000);

/// How long a blocking receive may spin.
///
/// `Iterations` counts polls of the transport and is deterministic on any
/// target; how much wall-clock time it covers depends on the clock speed.
/// `Duration` measures wall-clock time and needs `std::time::Instant`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Timeout {
    Iterations(u32),
    Duration(Duration),
}

impl Timeout {
    /// A wall-clock timeout in milliseconds.
    pub const fn from_millis(millis: u64) -> Self {
        Timeout::Duration(Duration::from_millis(millis))
    }
}

impl Default for Timeout {
    fn default() -> Self {
        DEFAULT_RECEIVE_TIMEOUT
    }
}

impl From<Duration> for Timeout {
    fn from(duration: Duration) -> Self {
        Timeout::Duration(duration)
    }
}

/// Client configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ClientConfig {
    /// Budget for `receive_default` and for waiting on the SYNC reply.
    pub receive_timeout: Timeout,
    /// Budget for each `receive_byte` call made by `receive_byte_blocking`.
    pub byte_timeout: Timeout,
    /// Echo validation results ("got packet", "check failed") onto the link
    /// as plain text, for peers that log the serial stream.
    pub wire_diagnostics: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            receive_timeout: DEFAULT_RECEIVE_TIMEOUT,
            byte_timeout: DEFAULT_BYTE_TIMEOUT,
            wire_diagnostics: false,
        }
    }
}

/// A running [`Timeout`].
#[derive(Debug, Clone, Copy)]
pub(crate) enum Deadline {
    Remaining(u32),
    At(Instant),
    Never,
}

impl Deadline {
    pub(crate) fn start(timeout: Timeout) -> Self {
        match timeout {
            Timeout::Iterations(count) => Deadline::Remaining(count),
            Timeout::Duration(duration) => match Instant::now().checked_add(duration) {
                Some(at) => Deadline::At(at),
                None => Deadline::Never,
            },
        }
    }

    /// Consume one attempt. False once the budget is spent.
    pub(crate) fn tick(&mut self) -> bool {
        match self {
            Deadline::Remaining(0) => false,
            Deadline::Remaining(count) => {
                *count -= 1;
                true
            }
            Deadline::At(at) => Instant::now() < *at,
            Deadline::Never => true,
        }
    }
}
