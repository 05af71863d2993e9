use crate::{BitLayout, Error, Result, TimeSource};

/// Number of busy spins before a waiting generator starts yielding its
/// thread.
const SPIN_LIMIT: u32 = 64;

/// The mutable part of a generator: the last timestamp used and the sequence
/// issued at that timestamp.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct GeneratorState {
    last_timestamp: Option<u64>,
    sequence: u64,
}

/// Outcome of a single [`GeneratorState::step`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Step {
    Ready { sequence: u64 },
    Exhausted { yield_until: u64 },
}

impl GeneratorState {
    #[cfg(test)]
    pub(crate) const fn from_parts(last_timestamp: u64, sequence: u64) -> Self {
        Self {
            last_timestamp: Some(last_timestamp),
            sequence,
        }
    }

    #[cfg(test)]
    pub(crate) const fn last_timestamp(&self) -> Option<u64> {
        self.last_timestamp
    }

    #[cfg(test)]
    pub(crate) const fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Advances the state to `now`.
    ///
    /// Within the same millisecond the sequence is incremented; once it would
    /// wrap the state is left untouched and [`Step::Exhausted`] tells the
    /// caller to wait for the next millisecond. A new millisecond resets the
    /// sequence to zero. A clock behind the last timestamp is an error and
    /// leaves the state untouched.
    pub(crate) fn step(&mut self, now: u64, sequence_mask: u64) -> Result<Step> {
        match self.last_timestamp {
            Some(last) if now == last => {
                let sequence = (self.sequence + 1) & sequence_mask;
                if sequence == 0 {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(timestamp = last, "sequence exhausted");
                    return Ok(Step::Exhausted {
                        yield_until: last.saturating_add(1),
                    });
                }
                self.sequence = sequence;
                Ok(Step::Ready { sequence })
            }
            Some(last) if now < last => Err(Self::cold_clock_behind(now, last)),
            _ => {
                self.last_timestamp = Some(now);
                self.sequence = 0;
                Ok(Step::Ready { sequence: 0 })
            }
        }
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(now: u64, last: u64) -> Error {
        let behind_by_ms = last - now;
        #[cfg(feature = "tracing")]
        tracing::warn!(behind_by_ms, "clock moved backwards");
        Error::ClockRegression { behind_by_ms }
    }
}

/// Checks that the worker and process IDs fit the layout.
pub(crate) fn check_ids(layout: &BitLayout, worker_id: i128, process_id: i128) -> Result<(u64, u64)> {
    let max_worker = layout.max_worker_id();
    let worker = u64::try_from(worker_id)
        .ok()
        .filter(|&id| id <= max_worker)
        .ok_or(Error::WorkerIdOutOfRange {
            worker_id,
            max: max_worker,
        })?;

    let max_process = layout.max_process_id();
    let process = u64::try_from(process_id)
        .ok()
        .filter(|&id| id <= max_process)
        .ok_or(Error::ProcessIdOutOfRange {
            process_id,
            max: max_process,
        })?;

    Ok((worker, process))
}

/// Milliseconds between `epoch` and `now`, bounded by the layout's
/// timestamp field.
pub(crate) fn delta_since(layout: &BitLayout, epoch: u64, now: u64) -> Result<u64> {
    let delta = now
        .checked_sub(epoch)
        .ok_or(Error::ClockBeforeEpoch { now, epoch })?;
    let max = layout.max_timestamp();
    if delta > max {
        return Err(Error::TimestampOverflow { delta, max });
    }
    Ok(delta)
}

/// Blocks until `time` reads at least `yield_until`.
///
/// Spins briefly, then yields the thread between clock reads. There is no
/// timeout: a wall clock always catches up.
pub(crate) fn wait_until(time: &impl TimeSource, yield_until: u64) {
    let mut spins = 0;
    while time.current_millis() < yield_until {
        if spins < SPIN_LIMIT {
            spins += 1;
            core::hint::spin_loop();
        } else {
            std::thread::yield_now();
        }
    }
}
