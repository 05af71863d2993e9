use crate::{Error, Result};

/// Field widths of a 64-bit Snowflake ID and the shifts and masks derived
/// from them.
///
/// Fields are packed most significant first: timestamp, process ID, worker
/// ID, sequence. Whatever is left over after the three configured widths
/// belongs to the timestamp.
///
/// ```text
///  Bit Index:  63               22 21             17 16            12 11             0
///              +------------------+-----------------+----------------+---------------+
///  Field:      | timestamp (42)   | process ID (5)  | worker ID (5)  | sequence (12) |
///              +------------------+-----------------+----------------+---------------+
///              |<------ MSB ---------------- 64 bits ---------------- LSB ---------->|
/// ```
///
/// # Example
///
/// ```
/// use flakegen::BitLayout;
///
/// let layout = BitLayout::DEFAULT;
/// assert_eq!(layout.max_worker_id(), 31);
/// assert_eq!(layout.timestamp_shift(), 22);
/// assert_eq!(layout.process_mask(), 0x3e0000);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BitLayout {
    worker_bits: u8,
    process_bits: u8,
    sequence_bits: u8,
}

impl BitLayout {
    /// The Twitter layout: 5 worker bits, 5 process bits, 12 sequence bits.
    pub const DEFAULT: Self = Self {
        worker_bits: 5,
        process_bits: 5,
        sequence_bits: 12,
    };

    /// Creates a layout from explicit field widths.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLayout`] if any width is zero or if the widths
    /// sum to more than 63, which would leave no bit for the timestamp.
    pub const fn new(worker_bits: u8, process_bits: u8, sequence_bits: u8) -> Result<Self> {
        let total = worker_bits as u16 + process_bits as u16 + sequence_bits as u16;
        if worker_bits == 0 || process_bits == 0 || sequence_bits == 0 || total > 63 {
            return Err(Error::InvalidLayout {
                worker_bits,
                process_bits,
                sequence_bits,
            });
        }
        Ok(Self {
            worker_bits,
            process_bits,
            sequence_bits,
        })
    }

    pub const fn worker_bits(&self) -> u8 {
        self.worker_bits
    }

    pub const fn process_bits(&self) -> u8 {
        self.process_bits
    }

    pub const fn sequence_bits(&self) -> u8 {
        self.sequence_bits
    }

    /// Number of bits left for the timestamp delta.
    pub const fn timestamp_bits(&self) -> u8 {
        64 - self.timestamp_shift()
    }

    /// Largest encodable timestamp delta (`2^T - 1` milliseconds past the
    /// epoch).
    pub const fn max_timestamp(&self) -> u64 {
        low_bits(self.timestamp_bits())
    }

    /// Largest encodable worker ID (`2^W - 1`).
    pub const fn max_worker_id(&self) -> u64 {
        low_bits(self.worker_bits)
    }

    /// Largest encodable process ID (`2^P - 1`).
    pub const fn max_process_id(&self) -> u64 {
        low_bits(self.process_bits)
    }

    /// Largest sequence value before the counter wraps (`2^S - 1`).
    pub const fn max_sequence(&self) -> u64 {
        self.sequence_mask()
    }

    pub const fn sequence_shift(&self) -> u8 {
        0
    }

    pub const fn worker_shift(&self) -> u8 {
        self.sequence_bits
    }

    pub const fn process_shift(&self) -> u8 {
        self.sequence_bits + self.worker_bits
    }

    pub const fn timestamp_shift(&self) -> u8 {
        self.sequence_bits + self.worker_bits + self.process_bits
    }

    pub const fn sequence_mask(&self) -> u64 {
        low_bits(self.sequence_bits)
    }

    /// The worker field in place, i.e. `max_worker_id << worker_shift`.
    pub const fn worker_mask(&self) -> u64 {
        self.max_worker_id() << self.worker_shift()
    }

    /// The process field in place, i.e. `max_process_id << process_shift`.
    pub const fn process_mask(&self) -> u64 {
        self.max_process_id() << self.process_shift()
    }

    /// Packs the fields in standard order.
    ///
    /// Every argument must already fit its field. Generators reject a delta
    /// above [`Self::max_timestamp`] before composing.
    pub const fn compose(&self, delta: u64, worker_id: u64, process_id: u64, sequence: u64) -> u64 {
        (delta << self.timestamp_shift())
            | (process_id << self.process_shift())
            | (worker_id << self.worker_shift())
            | (sequence & self.sequence_mask())
    }
}

impl Default for BitLayout {
    fn default() -> Self {
        Self::DEFAULT
    }
}

const fn low_bits(bits: u8) -> u64 {
    (1 << bits) - 1
}

/// How the two middle fields of an ID are interpreted when decoding.
///
/// Encoding always writes the process ID above the worker ID. Discord IDs
/// carry them the other way around, so the [`LayoutVariant::DiscordSwapped`]
/// decoder reads the bits at the worker position as the process ID and the
/// bits at the process position as the worker ID.
///
/// A generator using `DiscordSwapped` therefore does **not** round-trip its
/// own worker and process IDs; the variant exists to read real Discord IDs.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum LayoutVariant {
    #[default]
    Standard,
    DiscordSwapped,
}

impl LayoutVariant {
    /// Extracts the worker ID from a raw ID.
    pub const fn worker_id(self, layout: &BitLayout, raw: u64) -> u64 {
        match self {
            Self::Standard => (raw & layout.worker_mask()) >> layout.worker_shift(),
            Self::DiscordSwapped => (raw & layout.process_mask()) >> layout.process_shift(),
        }
    }

    /// Extracts the process ID from a raw ID.
    pub const fn process_id(self, layout: &BitLayout, raw: u64) -> u64 {
        match self {
            Self::Standard => (raw & layout.process_mask()) >> layout.process_shift(),
            Self::DiscordSwapped => (raw & layout.worker_mask()) >> layout.worker_shift(),
        }
    }
}
