use crate::SnowflakeId;

/// Represents the result of attempting to generate a new Snowflake ID.
///
/// This type models the outcome of
/// [`SnowflakeGenerator::try_poll_id`](crate::SnowflakeGenerator::try_poll_id):
///
/// - [`Poll::Ready`] indicates a new ID was successfully generated.
/// - [`Poll::Pending`] means the sequence for the current millisecond is used
///   up and no ID can be produced until the clock reaches `yield_until`.
///
/// This allows non-blocking generation loops and custom backoff strategies.
///
/// # Example
///
/// ```
/// use flakegen::{BasicSnowflakeGenerator, Poll, SnowflakeGenerator, TimeSource};
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1_000
///     }
/// }
///
/// let generator = BasicSnowflakeGenerator::with_time(0, FixedTime);
/// match generator.try_poll_id(1, 0).unwrap() {
///     Poll::Ready { id } => println!("ID: {id}"),
///     Poll::Pending { yield_until } => println!("Back off until: {yield_until}"),
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll {
    /// A unique ID was generated and is ready to use.
    Ready {
        /// The generated Snowflake ID.
        id: SnowflakeId,
    },
    /// No ID could be generated because the sequence has been exhausted for
    /// the current millisecond.
    Pending {
        /// The first wall-clock millisecond (inclusive) at which generation
        /// can resume.
        yield_until: u64,
    },
}
