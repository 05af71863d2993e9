use core::iter::FusedIterator;

use crate::{
    SnowflakeId,
    generator::{Result, SnowflakeGenerator},
};

/// A finite iterator over freshly generated IDs.
///
/// Created by [`SnowflakeGenerator::iter`]. Each call to [`Iterator::next`]
/// generates a new ID with the default worker and process IDs, so the
/// iterator cannot be restarted and yields exactly `n` items. Successful
/// items are non-decreasing. A failed generation is yielded as an `Err` and
/// still counts toward `n`.
///
/// # Example
///
/// ```
/// use flakegen::{BasicSnowflakeGenerator, SnowflakeGenerator};
///
/// let generator = BasicSnowflakeGenerator::twitter();
/// let ids = generator.iter(10).collect::<Result<Vec<_>, _>>().unwrap();
/// assert_eq!(ids.len(), 10);
/// assert!(ids.windows(2).all(|w| w[0] < w[1]));
/// ```
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, G> {
    generator: &'a G,
    remaining: usize,
}

impl<'a, G> Iter<'a, G>
where
    G: SnowflakeGenerator,
{
    pub(crate) fn new(generator: &'a G, n: usize) -> Self {
        Self {
            generator,
            remaining: n,
        }
    }
}

impl<G> Iterator for Iter<'_, G>
where
    G: SnowflakeGenerator,
{
    type Item = Result<SnowflakeId>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.generator.next_id())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<G> ExactSizeIterator for Iter<'_, G> where G: SnowflakeGenerator {}

impl<G> FusedIterator for Iter<'_, G> where G: SnowflakeGenerator {}
