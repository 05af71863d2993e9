/// A result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `flakegen` can emit.
///
/// Generation errors are reported before any generator state is touched, so a
/// caller may retry the same call once the cause is resolved.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The worker ID does not fit in the layout's worker field.
    #[error("worker id {worker_id} is out of range (must be between 0 and {max})")]
    WorkerIdOutOfRange {
        /// The rejected worker ID, as supplied by the caller.
        worker_id: i128,
        /// The largest worker ID the layout can encode.
        max: u64,
    },

    /// The process ID does not fit in the layout's process field.
    #[error("process id {process_id} is out of range (must be between 0 and {max})")]
    ProcessIdOutOfRange {
        /// The rejected process ID, as supplied by the caller.
        process_id: i128,
        /// The largest process ID the layout can encode.
        max: u64,
    },

    /// The clock reported a time earlier than the last issued timestamp.
    ///
    /// No ID was produced and the generator state is unchanged.
    #[error("clock moved backwards, refusing to generate id for {behind_by_ms} milliseconds")]
    ClockRegression {
        /// How far (in milliseconds) the clock is behind the last timestamp.
        behind_by_ms: u64,
    },

    /// The clock reported a time earlier than the generator's epoch.
    #[error("current time {now} is before the configured epoch {epoch}")]
    ClockBeforeEpoch {
        /// Milliseconds since the Unix epoch, as read from the clock.
        now: u64,
        /// The generator's epoch in milliseconds since the Unix epoch.
        epoch: u64,
    },

    /// The time since the epoch no longer fits the layout's timestamp field.
    #[error("timestamp delta {delta} exceeds the layout's maximum of {max} milliseconds")]
    TimestampOverflow {
        /// Milliseconds between the epoch and the clock reading.
        delta: u64,
        /// The largest delta the layout can encode.
        max: u64,
    },

    /// The requested field widths leave no room for a timestamp.
    #[error(
        "invalid bit layout: worker ({worker_bits}), process ({process_bits}) and sequence \
         ({sequence_bits}) widths must each be at least 1 and sum to at most 63"
    )]
    InvalidLayout {
        worker_bits: u8,
        process_bits: u8,
        sequence_bits: u8,
    },

    /// The input is not the decimal representation of a 64-bit unsigned ID.
    #[error("invalid snowflake id {input:?}")]
    InvalidId { input: String },

    /// The operation failed because the lock was **poisoned**.
    ///
    /// This occurs when a thread panics while holding the lock. When the
    /// `parking-lot` feature is enabled, mutexes do **not** poison, so this
    /// variant is not available.
    #[cfg_attr(docsrs, doc(cfg(all(feature = "lock", not(feature = "parking-lot")))))]
    #[cfg(all(feature = "lock", not(feature = "parking-lot")))]
    #[error("generator lock poisoned")]
    LockPoisoned,
}

#[cfg(all(feature = "lock", not(feature = "parking-lot")))]
use crate::generator::{MutexGuard, PoisonError};
#[cfg(all(feature = "lock", not(feature = "parking-lot")))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
