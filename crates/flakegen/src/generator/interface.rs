use crate::{
    ParsedSnowflake, SnowflakeCodec, SnowflakeId,
    generator::{Iter, Poll, Result},
};

/// Worker ID used by [`SnowflakeGenerator::next_id`].
pub const DEFAULT_WORKER_ID: u64 = 1;

/// Process ID used by [`SnowflakeGenerator::next_id`].
pub const DEFAULT_PROCESS_ID: u64 = 0;

/// A minimal interface for generating and decoding Snowflake IDs.
///
/// Implementors supply the non-blocking [`Self::try_poll_id`] and a way to
/// wait for their clock; blocking generation, iteration and decoding are
/// built on top.
pub trait SnowflakeGenerator {
    /// The codec describing this generator's epoch, layout and variant.
    fn codec(&self) -> &SnowflakeCodec;

    /// Attempts to generate the next ID without blocking.
    ///
    /// Returns [`Poll::Pending`] when the sequence for the current
    /// millisecond is exhausted.
    ///
    /// # Errors
    ///
    /// - [`Error::WorkerIdOutOfRange`] / [`Error::ProcessIdOutOfRange`] if an
    ///   ID does not fit the layout. Checked before anything else.
    /// - [`Error::ClockRegression`] if the clock is behind the last issued
    ///   timestamp.
    /// - [`Error::ClockBeforeEpoch`] if the clock is behind the epoch.
    /// - [`Error::TimestampOverflow`] if the time since the epoch no longer
    ///   fits the layout's timestamp field.
    /// - `Error::LockPoisoned` for a poisoned lock-based generator.
    ///
    /// None of these change the generator's state.
    ///
    /// [`Error::WorkerIdOutOfRange`]: crate::Error::WorkerIdOutOfRange
    /// [`Error::ProcessIdOutOfRange`]: crate::Error::ProcessIdOutOfRange
    /// [`Error::ClockRegression`]: crate::Error::ClockRegression
    /// [`Error::ClockBeforeEpoch`]: crate::Error::ClockBeforeEpoch
    /// [`Error::TimestampOverflow`]: crate::Error::TimestampOverflow
    fn try_poll_id(
        &self,
        worker_id: impl Into<i128>,
        process_id: impl Into<i128>,
    ) -> Result<Poll>;

    /// Blocks until this generator's clock reads at least `yield_until`.
    fn wait_until(&self, yield_until: u64);

    /// Generates a new ID for `worker_id` and `process_id`.
    ///
    /// At most `2^sequence_bits` IDs are issued per millisecond; past that,
    /// this waits for the clock to reach the next millisecond.
    ///
    /// # Errors
    ///
    /// Same as [`Self::try_poll_id`].
    fn generate(
        &self,
        worker_id: impl Into<i128>,
        process_id: impl Into<i128>,
    ) -> Result<SnowflakeId> {
        let worker_id = worker_id.into();
        let process_id = process_id.into();
        loop {
            match self.try_poll_id(worker_id, process_id)? {
                Poll::Ready { id } => break Ok(id),
                Poll::Pending { yield_until } => self.wait_until(yield_until),
            }
        }
    }

    /// Generates a new ID with [`DEFAULT_WORKER_ID`] and
    /// [`DEFAULT_PROCESS_ID`].
    ///
    /// # Errors
    ///
    /// Same as [`Self::try_poll_id`].
    fn next_id(&self) -> Result<SnowflakeId> {
        self.generate(DEFAULT_WORKER_ID, DEFAULT_PROCESS_ID)
    }

    /// Returns an iterator producing exactly `n` IDs from [`Self::next_id`].
    fn iter(&self, n: usize) -> Iter<'_, Self>
    where
        Self: Sized,
    {
        Iter::new(self, n)
    }

    /// Decodes `id` with this generator's epoch, layout and variant.
    fn parse(&self, id: impl Into<SnowflakeId>) -> ParsedSnowflake {
        self.codec().parse(id)
    }

    /// Decodes an ID given as its decimal string.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidId`] if `id` is not a decimal `u64`.
    fn parse_str(&self, id: &str) -> Result<ParsedSnowflake> {
        self.codec().parse_str(id)
    }

    fn timestamp(&self, id: impl Into<SnowflakeId>) -> u64 {
        self.codec().timestamp(id)
    }

    fn worker_id(&self, id: impl Into<SnowflakeId>) -> u64 {
        self.codec().worker_id(id)
    }

    fn process_id(&self, id: impl Into<SnowflakeId>) -> u64 {
        self.codec().process_id(id)
    }

    fn sequence(&self, id: impl Into<SnowflakeId>) -> u64 {
        self.codec().sequence(id)
    }
}
