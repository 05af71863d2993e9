use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    BitLayout, DISCORD_EPOCH, LayoutVariant, SnowflakeCodec, SystemClock, TWITTER_EPOCH,
    TimeSource,
    generator::{
        Mutex, Poll, Result, SnowflakeGenerator,
        state::{GeneratorState, Step, check_ids, delta_since, wait_until},
    },
};

/// A lock-based Snowflake ID generator suitable for multi-threaded
/// environments.
///
/// This generator wraps its state in an [`Arc<Mutex<_>>`], allowing safe
/// shared use across threads. Clones share the same state, so they behave as
/// one generator and must not be handed different worker/process pairs
/// expecting independent sequences.
///
/// The clock is read while the lock is held, so no two callers can observe
/// the same `(timestamp, sequence)` pair. Waiting for an exhausted
/// millisecond to pass happens outside the lock.
///
/// ## Features
/// - ✅ Thread-safe
/// - ✅ Uses `parking_lot` (no poisoning) with the `parking-lot` feature
///
/// ## See Also
/// - [`BasicSnowflakeGenerator`]
///
/// [`BasicSnowflakeGenerator`]: crate::generator::BasicSnowflakeGenerator
pub struct LockSnowflakeGenerator<T = SystemClock>
where
    T: TimeSource,
{
    codec: SnowflakeCodec,
    state: Arc<Mutex<GeneratorState>>,
    time: T,
}

impl LockSnowflakeGenerator<SystemClock> {
    /// Creates a generator bound to `epoch` that reads the system wall clock.
    ///
    /// # Example
    /// ```
    /// use flakegen::{LockSnowflakeGenerator, SnowflakeGenerator, TWITTER_EPOCH};
    ///
    /// let generator = LockSnowflakeGenerator::new(TWITTER_EPOCH);
    ///
    /// std::thread::scope(|s| {
    ///     for _ in 0..4 {
    ///         let generator = generator.clone();
    ///         s.spawn(move || generator.next_id().unwrap());
    ///     }
    /// });
    /// ```
    pub fn new(epoch: u64) -> Self {
        Self::with_time(epoch, SystemClock)
    }

    /// A generator bound to [`DISCORD_EPOCH`] that decodes with
    /// [`LayoutVariant::DiscordSwapped`].
    pub fn discord() -> Self {
        Self::new(DISCORD_EPOCH).with_variant(LayoutVariant::DiscordSwapped)
    }

    /// A generator bound to [`TWITTER_EPOCH`].
    pub fn twitter() -> Self {
        Self::new(TWITTER_EPOCH)
    }
}

impl<T> LockSnowflakeGenerator<T>
where
    T: TimeSource,
{
    /// Creates a generator bound to `epoch` that reads time from `time`.
    pub fn with_time(epoch: u64, time: T) -> Self {
        Self {
            codec: SnowflakeCodec::new(epoch),
            state: Arc::new(Mutex::new(GeneratorState::default())),
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

    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    fn poll(&self, worker_id: i128, process_id: i128) -> Result<Poll> {
        let layout = self.codec.layout();
        let (worker_id, process_id) = check_ids(layout, worker_id, process_id)?;

        let mut state = {
            #[cfg(feature = "parking-lot")]
            {
                self.state.lock()
            }
            #[cfg(not(feature = "parking-lot"))]
            {
                self.state.lock()?
            }
        };

        let now = self.time.current_millis();
        let delta = delta_since(layout, self.codec.epoch(), now)?;

        let step = state.step(now, layout.sequence_mask())?;
        drop(state);

        match step {
            Step::Ready { sequence } => {
                let raw = layout.compose(delta, worker_id, process_id, sequence);
                Ok(Poll::Ready { id: raw.into() })
            }
            Step::Exhausted { yield_until } => Ok(Poll::Pending { yield_until }),
        }
    }
}

impl<T> Clone for LockSnowflakeGenerator<T>
where
    T: TimeSource + Clone,
{
    fn clone(&self) -> Self {
        Self {
            codec: self.codec,
            state: Arc::clone(&self.state),
            time: self.time.clone(),
        }
    }
}

impl<T> SnowflakeGenerator for LockSnowflakeGenerator<T>
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
