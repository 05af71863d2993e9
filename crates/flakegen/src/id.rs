use core::{fmt, str::FromStr};

use crate::Error;

/// A 64-bit Snowflake ID.
///
/// The wrapped integer is the exact value produced by a generator. How its
/// bits split into fields depends on the [`BitLayout`] and [`LayoutVariant`]
/// used to decode it, so the ID itself carries no layout.
///
/// Environments without native 64-bit integers can move IDs around as their
/// decimal string: [`fmt::Display`] writes it and [`FromStr`] reads it back
/// without loss.
///
/// # Example
///
/// ```
/// use flakegen::SnowflakeId;
///
/// let id: SnowflakeId = "175928847299117063".parse().unwrap();
/// assert_eq!(id.to_raw(), 175_928_847_299_117_063);
/// assert_eq!(id.to_string(), "175928847299117063");
/// ```
///
/// [`BitLayout`]: crate::BitLayout
/// [`LayoutVariant`]: crate::LayoutVariant
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnowflakeId {
    id: u64,
}

impl SnowflakeId {
    pub const fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }

    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    /// Returns the ID as a zero-padded 20-digit string, which sorts
    /// lexicographically in the same order as the integers.
    pub fn to_padded_string(&self) -> String {
        format!("{:020}", self.id)
    }
}

impl From<u64> for SnowflakeId {
    fn from(raw: u64) -> Self {
        Self::from_raw(raw)
    }
}

impl From<SnowflakeId> for u64 {
    fn from(id: SnowflakeId) -> Self {
        id.to_raw()
    }
}

impl FromStr for SnowflakeId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self::from_raw)
            .map_err(|_| Error::InvalidId {
                input: s.to_owned(),
            })
    }
}

impl TryFrom<&str> for SnowflakeId {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// The fields decoded from a [`SnowflakeId`].
///
/// `timestamp` is absolute: milliseconds since the Unix epoch, with the
/// decoder's epoch already added back.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParsedSnowflake {
    pub timestamp: u64,
    pub worker_id: u64,
    pub process_id: u64,
    pub sequence: u64,
}
