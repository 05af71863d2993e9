use crate::{
    BasicSnowflakeGenerator, BitLayout, DISCORD_EPOCH, Error, LayoutVariant, Poll,
    SnowflakeGenerator, SnowflakeId, SystemClock, TWITTER_EPOCH, TimeSource,
};
use core::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use super::state::GeneratorState;

#[cfg(feature = "lock")]
use crate::LockSnowflakeGenerator;
#[cfg(feature = "lock")]
use std::collections::HashSet;
#[cfg(feature = "lock")]
use std::sync::{Arc, Mutex};
#[cfg(feature = "lock")]
use std::thread::scope;

#[derive(Clone)]
struct MockTime {
    millis: u64,
}

impl TimeSource for MockTime {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

#[derive(Clone)]
struct SharedMockStepTime {
    clock: Rc<MockStepTime>,
}

impl SharedMockStepTime {
    fn new(values: Vec<u64>) -> Self {
        Self {
            clock: Rc::new(MockStepTime {
                values,
                index: Cell::new(0),
            }),
        }
    }

    fn advance(&self) {
        self.clock.index.set(self.clock.index.get() + 1);
    }
}

impl TimeSource for SharedMockStepTime {
    fn current_millis(&self) -> u64 {
        self.clock.values[self.clock.index.get()]
    }
}

struct MockStepTime {
    values: Vec<u64>,
    index: Cell<usize>,
}

/// Moves forward one millisecond every `reads_per_tick` reads.
struct TickingTime {
    start: u64,
    reads: Cell<u64>,
    reads_per_tick: u64,
}

impl TickingTime {
    fn new(start: u64, reads_per_tick: u64) -> Self {
        Self {
            start,
            reads: Cell::new(0),
            reads_per_tick,
        }
    }
}

impl TimeSource for TickingTime {
    fn current_millis(&self) -> u64 {
        let reads = self.reads.get();
        self.reads.set(reads + 1);
        self.start + reads / self.reads_per_tick
    }
}

trait PollExt {
    fn unwrap_ready(self) -> SnowflakeId;
    fn unwrap_pending(self) -> u64;
}

impl PollExt for Poll {
    fn unwrap_ready(self) -> SnowflakeId {
        match self {
            Self::Ready { id } => id,
            Self::Pending { yield_until } => {
                panic!("unexpected pending (yield until: {yield_until})")
            }
        }
    }

    fn unwrap_pending(self) -> u64 {
        match self {
            Self::Ready { id } => panic!("unexpected ready ({id})"),
            Self::Pending { yield_until } => yield_until,
        }
    }
}

fn run_id_sequence_increments_within_same_tick<G>(generator: &G)
where
    G: SnowflakeGenerator,
{
    let id1 = generator.try_poll_id(1, 0).unwrap().unwrap_ready();
    let id2 = generator.try_poll_id(1, 0).unwrap().unwrap_ready();
    let id3 = generator.try_poll_id(1, 0).unwrap().unwrap_ready();

    assert_eq!(generator.timestamp(id1), 42);
    assert_eq!(generator.timestamp(id2), 42);
    assert_eq!(generator.timestamp(id3), 42);
    assert_eq!(generator.sequence(id1), 0);
    assert_eq!(generator.sequence(id2), 1);
    assert_eq!(generator.sequence(id3), 2);
    assert!(id1 < id2 && id2 < id3);
}

fn run_generator_returns_pending_when_sequence_exhausted<G>(generator: &G)
where
    G: SnowflakeGenerator,
{
    let max_sequence = generator.codec().layout().max_sequence();
    for expected in 0..=max_sequence {
        let id = generator.try_poll_id(1, 0).unwrap().unwrap_ready();
        assert_eq!(generator.sequence(id), expected);
    }

    let yield_until = generator.try_poll_id(1, 0).unwrap().unwrap_pending();
    assert_eq!(yield_until, 43);
}

fn run_generator_handles_rollover<G>(generator: &G, shared_time: &SharedMockStepTime)
where
    G: SnowflakeGenerator,
{
    for i in 0..=BitLayout::DEFAULT.max_sequence() {
        let id = generator.try_poll_id(1, 0).unwrap().unwrap_ready();
        assert_eq!(generator.sequence(id), i);
        assert_eq!(generator.timestamp(id), 42);
    }

    let yield_until = generator.try_poll_id(1, 0).unwrap().unwrap_pending();
    assert_eq!(yield_until, 43);

    shared_time.advance();

    let id = generator.try_poll_id(1, 0).unwrap().unwrap_ready();
    assert_eq!(generator.timestamp(id), 43);
    assert_eq!(generator.sequence(id), 0);
}

fn run_clock_regression_is_reported<G>(generator: &G, shared_time: &SharedMockStepTime)
where
    G: SnowflakeGenerator,
{
    let first = generator.next_id().unwrap();
    assert_eq!(generator.timestamp(first), 100);

    shared_time.advance();
    assert_eq!(
        generator.next_id(),
        Err(Error::ClockRegression { behind_by_ms: 10 })
    );

    shared_time.advance();
    let recovered = generator.next_id().unwrap();
    assert_eq!(generator.timestamp(recovered), 100);
    assert_eq!(generator.sequence(recovered), 1);
    assert!(recovered > first);
}

fn run_throughput_is_bounded_per_millisecond<G>(generator: &G)
where
    G: SnowflakeGenerator,
{
    const TOTAL_IDS: usize = 4096 * 4;

    let mut per_millisecond: HashMap<u64, u64> = HashMap::new();
    let mut last = None;
    for _ in 0..TOTAL_IDS {
        let id = generator.next_id().unwrap();
        if let Some(last) = last {
            assert!(id > last, "{id} not above {last}");
        }
        last = Some(id);
        *per_millisecond.entry(generator.timestamp(id)).or_default() += 1;
    }

    assert!(per_millisecond.len() >= TOTAL_IDS / 4096);
    assert!(per_millisecond.values().all(|&count| count <= 4096));
}

fn run_generator_monotonic<G>(generator: &G)
where
    G: SnowflakeGenerator,
{
    const TOTAL_IDS: usize = 4096 * 64;

    let mut last_timestamp = 0;
    let mut sequence = 0;
    let mut last_id = SnowflakeId::default();

    for _ in 0..TOTAL_IDS {
        let id = generator.next_id().unwrap();
        let parsed = generator.parse(id);
        if parsed.timestamp > last_timestamp {
            sequence = 0;
        }

        assert!(parsed.timestamp >= last_timestamp);
        assert!(id > last_id);
        assert_eq!(parsed.worker_id, 1);
        assert_eq!(parsed.process_id, 0);
        assert_eq!(parsed.sequence, sequence);

        last_timestamp = parsed.timestamp;
        last_id = id;
        sequence += 1;
    }
}

fn run_timestamp_overflow_is_rejected<G>(generator: &G, shared_time: &SharedMockStepTime)
where
    G: SnowflakeGenerator,
{
    let max = generator.codec().layout().max_timestamp();

    let last = generator.next_id().unwrap();
    assert_eq!(generator.timestamp(last), max);

    shared_time.advance();
    assert_eq!(
        generator.next_id(),
        Err(Error::TimestampOverflow {
            delta: max + 1,
            max
        })
    );

    // State is untouched: the same millisecond continues its sequence.
    shared_time.advance();
    let next = generator.next_id().unwrap();
    assert_eq!(generator.timestamp(next), max);
    assert_eq!(generator.sequence(next), 1);
    assert!(next > last);
}

fn run_ids_out_of_range_are_rejected<G>(generator: &G)
where
    G: SnowflakeGenerator,
{
    assert_eq!(
        generator.generate(32, 0),
        Err(Error::WorkerIdOutOfRange {
            worker_id: 32,
            max: 31
        })
    );
    assert_eq!(
        generator.generate(-1, 0),
        Err(Error::WorkerIdOutOfRange {
            worker_id: -1,
            max: 31
        })
    );
    assert_eq!(
        generator.generate(0, 32),
        Err(Error::ProcessIdOutOfRange {
            process_id: 32,
            max: 31
        })
    );
    assert_eq!(
        generator.generate(0, -1_i64),
        Err(Error::ProcessIdOutOfRange {
            process_id: -1,
            max: 31
        })
    );
}

#[test]
fn basic_generator_sequence_test() {
    let generator = BasicSnowflakeGenerator::with_time(0, MockTime { millis: 42 });
    run_id_sequence_increments_within_same_tick(&generator);
}

#[cfg(feature = "lock")]
#[test]
fn lock_generator_sequence_test() {
    let generator = LockSnowflakeGenerator::with_time(0, MockTime { millis: 42 });
    run_id_sequence_increments_within_same_tick(&generator);
}

#[test]
fn basic_generator_pending_test() {
    let generator = BasicSnowflakeGenerator::with_time(0, MockTime { millis: 42 });
    run_generator_returns_pending_when_sequence_exhausted(&generator);
}

#[cfg(feature = "lock")]
#[test]
fn lock_generator_pending_test() {
    let generator = LockSnowflakeGenerator::with_time(0, MockTime { millis: 42 });
    run_generator_returns_pending_when_sequence_exhausted(&generator);
}

#[test]
fn basic_generator_rollover_test() {
    let shared_time = SharedMockStepTime::new(vec![42, 43]);
    let generator = BasicSnowflakeGenerator::with_time(0, shared_time.clone());
    run_generator_handles_rollover(&generator, &shared_time);
}

#[cfg(feature = "lock")]
#[test]
fn lock_generator_rollover_test() {
    let shared_time = SharedMockStepTime::new(vec![42, 43]);
    let generator = LockSnowflakeGenerator::with_time(0, shared_time.clone());
    run_generator_handles_rollover(&generator, &shared_time);
}

#[test]
fn basic_generator_clock_regression_test() {
    let shared_time = SharedMockStepTime::new(vec![100, 90, 100]);
    let generator = BasicSnowflakeGenerator::with_time(0, shared_time.clone());
    run_clock_regression_is_reported(&generator, &shared_time);
}

#[cfg(feature = "lock")]
#[test]
fn lock_generator_clock_regression_test() {
    let shared_time = SharedMockStepTime::new(vec![100, 90, 100]);
    let generator = LockSnowflakeGenerator::with_time(0, shared_time.clone());
    run_clock_regression_is_reported(&generator, &shared_time);
}

#[test]
fn basic_generator_throughput_test() {
    let generator = BasicSnowflakeGenerator::with_time(0, TickingTime::new(1_000, 10_000));
    run_throughput_is_bounded_per_millisecond(&generator);
}

#[cfg(feature = "lock")]
#[test]
fn lock_generator_throughput_test() {
    let generator = LockSnowflakeGenerator::with_time(0, TickingTime::new(1_000, 10_000));
    run_throughput_is_bounded_per_millisecond(&generator);
}

#[test]
fn basic_generator_system_clock_monotonic() {
    let generator = BasicSnowflakeGenerator::twitter();
    run_generator_monotonic(&generator);
}

#[cfg(feature = "lock")]
#[test]
fn lock_generator_system_clock_monotonic() {
    let generator = LockSnowflakeGenerator::twitter();
    run_generator_monotonic(&generator);
}

#[test]
fn basic_generator_range_test() {
    let generator = BasicSnowflakeGenerator::with_time(0, MockTime { millis: 42 });
    run_ids_out_of_range_are_rejected(&generator);
    assert_eq!(generator.state(), GeneratorState::default());
}

#[cfg(feature = "lock")]
#[test]
fn lock_generator_range_test() {
    let generator = LockSnowflakeGenerator::with_time(0, MockTime { millis: 42 });
    run_ids_out_of_range_are_rejected(&generator);

    let id = generator.next_id().unwrap();
    assert_eq!(generator.sequence(id), 0);
    assert_eq!(generator.timestamp(id), 42);
}

#[test]
fn regression_leaves_state_unchanged() {
    let shared_time = SharedMockStepTime::new(vec![100, 100, 95]);
    let generator = BasicSnowflakeGenerator::with_time(0, shared_time.clone());
    generator.next_id().unwrap();
    shared_time.advance();
    generator.next_id().unwrap();
    let before = generator.state();
    assert_eq!(before, GeneratorState::from_parts(100, 1));

    shared_time.advance();
    assert_eq!(
        generator.next_id(),
        Err(Error::ClockRegression { behind_by_ms: 5 })
    );
    assert_eq!(generator.state(), before);
}

#[test]
fn clock_before_epoch_is_rejected() {
    let generator = BasicSnowflakeGenerator::with_time(1_000, MockTime { millis: 999 });
    assert_eq!(
        generator.next_id(),
        Err(Error::ClockBeforeEpoch {
            now: 999,
            epoch: 1_000
        })
    );
    assert_eq!(generator.state(), GeneratorState::default());
}

#[test]
fn generated_id_matches_bit_layout() {
    let epoch = 1_000;
    let generator = BasicSnowflakeGenerator::with_time(epoch, MockTime { millis: 1_005 });
    let id = generator.generate(3, 2).unwrap();
    assert_eq!(id.to_raw(), (5 << 22) | (2 << 17) | (3 << 12));
}

#[test]
fn next_id_uses_default_worker_and_process() {
    let generator = BasicSnowflakeGenerator::new(DISCORD_EPOCH);
    let parsed = generator.parse(generator.next_id().unwrap());
    assert_eq!(parsed.worker_id, 1);
    assert_eq!(parsed.process_id, 0);
}

#[test]
fn round_trips_every_worker_and_process() {
    let generator = BasicSnowflakeGenerator::new(TWITTER_EPOCH);
    let layout = *generator.layout();
    for worker_id in 0..=layout.max_worker_id() {
        for process_id in 0..=layout.max_process_id() {
            let before = SystemClock.current_millis();
            let id = generator.generate(worker_id, process_id).unwrap();
            let after = SystemClock.current_millis();

            let parsed = generator.parse(id);
            assert_eq!(parsed.worker_id, worker_id);
            assert_eq!(parsed.process_id, process_id);
            assert!(parsed.timestamp >= before && parsed.timestamp <= after);
        }
    }
}

#[test]
fn decimal_string_round_trips_through_parse_str() {
    let generator = BasicSnowflakeGenerator::twitter();
    let id = generator.generate(9, 4).unwrap();
    assert_eq!(
        generator.parse_str(&id.to_string()).unwrap(),
        generator.parse(id)
    );
}

#[test]
fn discord_generator_decodes_swapped() {
    let generator = BasicSnowflakeGenerator::discord();
    assert_eq!(generator.epoch(), DISCORD_EPOCH);
    assert_eq!(generator.variant(), LayoutVariant::DiscordSwapped);

    let parsed = generator.parse(175_928_847_299_117_063_u64);
    assert_eq!(parsed.worker_id, 1);
    assert_eq!(parsed.process_id, 0);
}

#[test]
fn discord_generator_does_not_round_trip_its_own_ids() {
    let generator =
        BasicSnowflakeGenerator::with_time(DISCORD_EPOCH, MockTime { millis: DISCORD_EPOCH + 7 })
            .with_variant(LayoutVariant::DiscordSwapped);
    let id = generator.generate(3, 5).unwrap();
    let parsed = generator.parse(id);
    assert_eq!(parsed.worker_id, 5);
    assert_eq!(parsed.process_id, 3);
    assert_eq!(parsed.timestamp, DISCORD_EPOCH + 7);
}

#[test]
fn custom_layout_limits_sequence() {
    let layout = BitLayout::new(8, 2, 4).unwrap();
    let generator = BasicSnowflakeGenerator::with_time(0, MockTime { millis: 42 }).with_layout(layout);

    for expected in 0..16 {
        let id = generator.try_poll_id(200, 3).unwrap().unwrap_ready();
        let parsed = generator.parse(id);
        assert_eq!(parsed.sequence, expected);
        assert_eq!(parsed.worker_id, 200);
        assert_eq!(parsed.process_id, 3);
        assert_eq!(parsed.timestamp, 42);
    }
    assert_eq!(generator.try_poll_id(200, 3).unwrap().unwrap_pending(), 43);
    assert_eq!(
        generator.generate(256, 0),
        Err(Error::WorkerIdOutOfRange {
            worker_id: 256,
            max: 255
        })
    );
}

#[test]
fn independent_generators_keep_independent_state() {
    let a = BasicSnowflakeGenerator::with_time(0, MockTime { millis: 42 });
    let b = BasicSnowflakeGenerator::with_time(0, MockTime { millis: 42 });

    let a1 = a.generate(1, 0).unwrap();
    let a2 = a.generate(1, 0).unwrap();
    let b1 = b.generate(2, 0).unwrap();

    assert_eq!(a.sequence(a2), 1);
    assert_eq!(b.sequence(b1), 0);
    assert_ne!(a1, b1);
}

#[test]
fn iter_yields_exactly_n_ids() {
    let generator = BasicSnowflakeGenerator::with_time(0, TickingTime::new(10, 5));
    let mut iter = generator.iter(10);
    assert_eq!(iter.len(), 10);

    let ids = iter
        .by_ref()
        .collect::<Result<Vec<_>, _>>()
        .expect("no clock regression");
    assert_eq!(ids.len(), 10);
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
    assert!(ids.iter().all(|&id| generator.worker_id(id) == 1));

    assert_eq!(iter.len(), 0);
    assert!(iter.next().is_none());
    assert!(iter.next().is_none());
    assert_eq!(generator.iter(0).count(), 0);
}

#[test]
fn iter_surfaces_errors_without_stopping() {
    let shared_time = SharedMockStepTime::new(vec![100, 90]);
    let generator = BasicSnowflakeGenerator::with_time(0, shared_time.clone());
    let mut iter = generator.iter(3);

    assert!(iter.next().unwrap().is_ok());
    shared_time.advance();
    assert_eq!(
        iter.next().unwrap(),
        Err(Error::ClockRegression { behind_by_ms: 10 })
    );
    assert!(iter.next().unwrap().is_err());
    assert!(iter.next().is_none());
}

#[cfg(feature = "lock")]
#[test]
fn lock_generator_clones_share_state() {
    let generator = LockSnowflakeGenerator::with_time(0, MockTime { millis: 42 });
    let clone = generator.clone();

    let first = generator.next_id().unwrap();
    let second = clone.next_id().unwrap();
    assert_eq!(generator.sequence(first), 0);
    assert_eq!(clone.sequence(second), 1);
}

#[cfg(feature = "lock")]
#[test]
fn lock_generator_threaded_unique() {
    const THREADS: usize = 8;
    const TOTAL_IDS: usize = 4096 * 64;
    const IDS_PER_THREAD: usize = TOTAL_IDS / THREADS;

    let generator = LockSnowflakeGenerator::twitter();
    let seen_ids = Arc::new(Mutex::new(HashSet::with_capacity(TOTAL_IDS)));

    scope(|s| {
        for _ in 0..THREADS {
            let generator = generator.clone();
            let seen_ids = Arc::clone(&seen_ids);

            s.spawn(move || {
                for _ in 0..IDS_PER_THREAD {
                    let id = generator.next_id().unwrap();
                    assert!(seen_ids.lock().unwrap().insert(id));
                }
            });
        }
    });

    let final_count = seen_ids.lock().unwrap().len();
    assert_eq!(final_count, TOTAL_IDS, "Expected {TOTAL_IDS} unique IDs");
}

fn narrow_timestamp_layout() -> BitLayout {
    BitLayout::new(10, 10, 12).unwrap()
}

fn timestamp_overflow_clock() -> SharedMockStepTime {
    let max = narrow_timestamp_layout().max_timestamp();
    SharedMockStepTime::new(vec![max, max + 1, max])
}

#[test]
fn basic_generator_timestamp_overflow_test() {
    let shared_time = timestamp_overflow_clock();
    let generator = BasicSnowflakeGenerator::with_time(0, shared_time.clone())
        .with_layout(narrow_timestamp_layout());
    run_timestamp_overflow_is_rejected(&generator, &shared_time);
}

#[cfg(feature = "lock")]
#[test]
fn lock_generator_timestamp_overflow_test() {
    let shared_time = timestamp_overflow_clock();
    let generator = LockSnowflakeGenerator::with_time(0, shared_time.clone())
        .with_layout(narrow_timestamp_layout());
    run_timestamp_overflow_is_rejected(&generator, &shared_time);
}

#[test]
fn narrow_timestamp_field_round_trips_until_full() {
    const DAY_MS: u64 = 86_400_000;
    let layout = narrow_timestamp_layout();

    let now = TWITTER_EPOCH + 40 * DAY_MS;
    let generator =
        BasicSnowflakeGenerator::with_time(TWITTER_EPOCH, MockTime { millis: now }).with_layout(layout);
    let id = generator.next_id().unwrap();
    assert_eq!(generator.timestamp(id), now);

    let now = TWITTER_EPOCH + 100 * DAY_MS;
    let generator =
        BasicSnowflakeGenerator::with_time(TWITTER_EPOCH, MockTime { millis: now }).with_layout(layout);
    assert_eq!(
        generator.next_id(),
        Err(Error::TimestampOverflow {
            delta: 100 * DAY_MS,
            max: layout.max_timestamp()
        })
    );
    assert_eq!(generator.state(), GeneratorState::default());
}
