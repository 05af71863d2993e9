use core::cell::Cell;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    BitLayout, DISCORD_EPOCH, LayoutVariant, SnowflakeCodec, SystemClock, TWITTER_EPOCH,
    TimeSource,
    generator::{
        Poll, Result, SnowflakeGenerator,
        state::{GeneratorState, Step, check_ids, delta_since, wait_until},
    },
};

/// A non-concurrent Snowflake ID generator suitable for single-threaded
/// environments.
///
/// This generator is lightweight and fast, but **not thread-safe**: it keeps
/// its state in a [`Cell`] and is therefore `!Sync`. Share a
/// [`LockSnowflakeGenerator`] instead when several threads must draw from one
/// worker/process pair.
///
/// Every generator owns its state. Two generators never coordinate, even with
/// the same epoch, so each must be given a distinct worker/process pair.
///
/// [`LockSnowflakeGenerator`]: crate::generator::LockSnowflakeGenerator
pub struct BasicSnowflakeGenerator<T = SystemClock>
where
    T: TimeSource,
{
    codec: SnowflakeCodec,
    state: Cell<GeneratorState>,
    time: T,
}

impl BasicSnowflakeGenerator<SystemClock> {
    /// Creates a generator bound to `epoch` (milliseconds since the Unix
    /// epoch) that reads the system wall clock.
    ///
    /// # Example
    /// ```
    /// use flakegen::{BasicSnowflakeGenerator, SnowflakeGenerator};
    ///
    /// let epoch = 1_700_000_000_000;
    /// let generator = BasicSnowflakeGenerator::new(epoch);
    ///
    /// let id = generator.generate(3, 1).unwrap();
    /// let parsed = generator.parse(id);
    /// assert_eq!(parsed.worker_id, 3);
    /// assert_eq!(parsed.process_id, 1);
    /// ```
    pub fn new(epoch: u64) -> Self {
        Self::with_time(epoch, SystemClock)
    }

    /// A generator bound to [`DISCORD_EPOCH`] that decodes with
    /// [`LayoutVariant::DiscordSwapped`].
    ///
    /// IDs are still **encoded** in standard order, so this generator's own
    /// IDs do not round-trip worker and process IDs through its decoder. It
    /// decodes real Discord IDs correctly.
    pub fn discord() -> Self {
        Self::new(DISCORD_EPOCH).with_variant(LayoutVariant::DiscordSwapped)
    }

    /// A generator bound to [`TWITTER_EPOCH`].
    pub fn twitter() -> Self {
        Self::new(TWITTER_EPOCH)
    }
}

impl<T> BasicSnowflakeGenerator<T>
where
    T: TimeSource,
{
    /// Creates a generator bound to `epoch` that reads time from `time`.
    ///
    /// The generator starts without a last timestamp, so the first ID it
    /// produces always carries sequence zero.
    pub fn with_time(epoch: u64, time: T) -> Self {
        Self {
            codec: SnowflakeCodec::new(epoch),
            state: Cell::new(GeneratorState::default()),
            time,
        }
    }

    #[must_use]
    pub fn with_layout(mut self, layout: BitLayout) -> Self {
        self.codec = self.codec.with_layout(layout);
        self
    }

    #[must_use]
    pub fn with_variant(mut self, variant: LayoutVariant) -> Self {
        self.codec = self.codec.with_variant(variant);
        self
    }

    pub fn epoch(&self) -> u64 {
        self.codec.epoch()
    }

    pub fn layout(&self) -> &BitLayout {
        self.codec.layout()
    }

    pub fn variant(&self) -> LayoutVariant {
        self.codec.variant()
    }

    pub fn time(&self) -> &T {
        &self.time
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> GeneratorState {
        self.state.get()
    }

    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    fn poll(&self, worker_id: i128, process_id: i128) -> Result<Poll> {
        let layout = self.codec.layout();
        let (worker_id, process_id) = check_ids(layout, worker_id, process_id)?;

        let now = self.time.current_millis();
        let delta = delta_since(layout, self.codec.epoch(), now)?;

        let mut state = self.state.get();
        match state.step(now, layout.sequence_mask())? {
            Step::Ready { sequence } => {
                self.state.set(state);
                let raw = layout.compose(delta, worker_id, process_id, sequence);
                Ok(Poll::Ready { id: raw.into() })
            }
            Step::Exhausted { yield_until } => Ok(Poll::Pending { yield_until }),
        }
    }
}

impl<T> SnowflakeGenerator for BasicSnowflakeGenerator<T>
where
    T: TimeSource,
{
    fn codec(&self) -> &SnowflakeCodec {
        &self.codec
    }

    fn try_poll_id(
        &self,
        worker_id: impl Into<i128>,
        process_id: impl Into<i128>,
    ) -> Result<Poll> {
        self.poll(worker_id.into(), process_id.into())
    }

    fn wait_until(&self, yield_until: u64) {
        wait_until(&self.time, yield_until);
    }
}

/// Shorthand for [`BasicSnowflakeGenerator::discord`].
pub fn discord_generator() -> BasicSnowflakeGenerator {
    BasicSnowflakeGenerator::discord()
}

/// Shorthand for [`BasicSnowflakeGenerator::twitter`].
pub fn twitter_generator() -> BasicSnowflakeGenerator {
    BasicSnowflakeGenerator::twitter()
}
