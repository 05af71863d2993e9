use crate::{
    BitLayout, DISCORD_EPOCH, LayoutVariant, ParsedSnowflake, Result, SnowflakeId, TWITTER_EPOCH,
};

/// Decodes Snowflake IDs for one epoch, layout and variant.
///
/// Decoding is total: any 64-bit value decodes to whatever its bits imply.
/// The per-field accessors use the same formulas as [`Self::parse`] and
/// always agree with it.
///
/// # Example
///
/// ```
/// use flakegen::{LayoutVariant, SnowflakeCodec, DISCORD_EPOCH};
///
/// let codec = SnowflakeCodec::new(DISCORD_EPOCH).with_variant(LayoutVariant::DiscordSwapped);
/// let parsed = codec.parse(175_928_847_299_117_063_u64);
/// assert_eq!(parsed.timestamp, 1_462_015_105_796);
/// assert_eq!(parsed.worker_id, 1);
/// assert_eq!(parsed.process_id, 0);
/// assert_eq!(parsed.sequence, 7);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SnowflakeCodec {
    epoch: u64,
    layout: BitLayout,
    variant: LayoutVariant,
}

impl SnowflakeCodec {
    /// A codec using the default layout and standard field order.
    pub const fn new(epoch: u64) -> Self {
        Self {
            epoch,
            layout: BitLayout::DEFAULT,
            variant: LayoutVariant::Standard,
        }
    }

    #[must_use]
    pub const fn with_layout(mut self, layout: BitLayout) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub const fn with_variant(mut self, variant: LayoutVariant) -> Self {
        self.variant = variant;
        self
    }

    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    pub const fn layout(&self) -> &BitLayout {
        &self.layout
    }

    pub const fn variant(&self) -> LayoutVariant {
        self.variant
    }

    /// Decodes every field of `id`.
    pub fn parse(&self, id: impl Into<SnowflakeId>) -> ParsedSnowflake {
        let id = id.into();
        ParsedSnowflake {
            timestamp: self.timestamp(id),
            worker_id: self.worker_id(id),
            process_id: self.process_id(id),
            sequence: self.sequence(id),
        }
    }

    /// Decodes an ID given as its decimal string.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidId`] if `id` is not a decimal `u64`.
    pub fn parse_str(&self, id: &str) -> Result<ParsedSnowflake> {
        Ok(self.parse(id.parse::<SnowflakeId>()?))
    }

    /// Milliseconds since the Unix epoch at which `id` was generated.
    pub fn timestamp(&self, id: impl Into<SnowflakeId>) -> u64 {
        (id.into().to_raw() >> self.layout.timestamp_shift()).wrapping_add(self.epoch)
    }

    pub fn worker_id(&self, id: impl Into<SnowflakeId>) -> u64 {
        self.variant.worker_id(&self.layout, id.into().to_raw())
    }

    pub fn process_id(&self, id: impl Into<SnowflakeId>) -> u64 {
        self.variant.process_id(&self.layout, id.into().to_raw())
    }

    pub fn sequence(&self, id: impl Into<SnowflakeId>) -> u64 {
        id.into().to_raw() & self.layout.sequence_mask()
    }
}

/// Decodes `id` against `epoch` with an explicit layout and variant.
pub fn parse_with(
    epoch: u64,
    layout: BitLayout,
    variant: LayoutVariant,
    id: impl Into<SnowflakeId>,
) -> ParsedSnowflake {
    SnowflakeCodec::new(epoch)
        .with_layout(layout)
        .with_variant(variant)
        .parse(id)
}

/// Decodes `id` against `epoch` with the default layout in standard order.
pub fn parse_snowflake_id(epoch: u64, id: impl Into<SnowflakeId>) -> ParsedSnowflake {
    SnowflakeCodec::new(epoch).parse(id)
}

/// Decodes `id` against [`DISCORD_EPOCH`] in standard order.
///
/// This reads the bits at the worker position as the worker ID. Use a
/// [`LayoutVariant::DiscordSwapped`] codec (or
/// [`BasicSnowflakeGenerator::discord`](crate::BasicSnowflakeGenerator::discord)) to get
/// the worker and process IDs the way Discord documents them.
pub fn parse_discord_id(id: impl Into<SnowflakeId>) -> ParsedSnowflake {
    parse_snowflake_id(DISCORD_EPOCH, id)
}

/// Decodes `id` against [`TWITTER_EPOCH`] in standard order.
pub fn parse_twitter_id(id: impl Into<SnowflakeId>) -> ParsedSnowflake {
    parse_snowflake_id(TWITTER_EPOCH, id)
}
