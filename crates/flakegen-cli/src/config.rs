use anyhow::bail;
use clap::{Parser, Subcommand, ValueEnum};
use flakegen::{
    BasicSnowflakeGenerator, BitLayout, DEFAULT_PROCESS_ID, DEFAULT_WORKER_ID, DISCORD_EPOCH,
    LayoutVariant, SnowflakeCodec, TWITTER_EPOCH,
};

/// Runtime configuration for the `flakegen` binary.
///
/// Every option can also be supplied through its environment variable, and a
/// `.env` file in the working directory is loaded before parsing.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "flakegen",
    version,
    about = "Generate and decode Twitter and Discord style Snowflake IDs"
)]
pub struct CliArgs {
    /// Epoch and decoding preset.
    ///
    /// `discord` decodes with worker and process swapped, the way Discord
    /// documents its IDs. `custom` requires `--epoch`.
    ///
    /// Environment variable: `FLAKEGEN_PRESET`
    #[arg(long, env = "FLAKEGEN_PRESET", value_enum, default_value_t = Preset::Twitter)]
    pub preset: Preset,

    /// Epoch in milliseconds since the Unix epoch. Overrides the preset's
    /// epoch.
    ///
    /// Environment variable: `FLAKEGEN_EPOCH`
    #[arg(long, env = "FLAKEGEN_EPOCH")]
    pub epoch: Option<u64>,

    /// Worker ID stamped into generated IDs.
    ///
    /// Environment variable: `FLAKEGEN_WORKER_ID`
    #[arg(long, env = "FLAKEGEN_WORKER_ID", default_value_t = DEFAULT_WORKER_ID)]
    pub worker_id: u64,

    /// Process ID stamped into generated IDs.
    ///
    /// Environment variable: `FLAKEGEN_PROCESS_ID`
    #[arg(long, env = "FLAKEGEN_PROCESS_ID", default_value_t = DEFAULT_PROCESS_ID)]
    pub process_id: u64,

    /// Width of the worker ID field.
    ///
    /// Environment variable: `FLAKEGEN_WORKER_BITS`
    #[arg(long, env = "FLAKEGEN_WORKER_BITS", default_value_t = BitLayout::DEFAULT.worker_bits())]
    pub worker_bits: u8,

    /// Width of the process ID field.
    ///
    /// Environment variable: `FLAKEGEN_PROCESS_BITS`
    #[arg(long, env = "FLAKEGEN_PROCESS_BITS", default_value_t = BitLayout::DEFAULT.process_bits())]
    pub process_bits: u8,

    /// Width of the sequence field.
    ///
    /// Environment variable: `FLAKEGEN_SEQUENCE_BITS`
    #[arg(long, env = "FLAKEGEN_SEQUENCE_BITS", default_value_t = BitLayout::DEFAULT.sequence_bits())]
    pub sequence_bits: u8,

    /// Decode with worker and process swapped regardless of preset.
    ///
    /// Environment variable: `FLAKEGEN_SWAPPED`
    #[arg(long, env = "FLAKEGEN_SWAPPED")]
    pub swapped: bool,

    /// Log output format. Logs go to stderr and are filtered by `RUST_LOG`.
    ///
    /// Environment variable: `FLAKEGEN_LOG_FORMAT`
    #[arg(long, env = "FLAKEGEN_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print freshly generated IDs, one per line.
    Generate {
        /// Number of IDs to generate.
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
    },
    /// Decode IDs and print one JSON object per ID.
    Parse {
        /// Decimal IDs to decode.
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Discord,
    Twitter,
    Custom,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub codec: SnowflakeCodec,
    pub worker_id: u64,
    pub process_id: u64,
    pub log_format: LogFormat,
    pub command: Command,
}

impl Config {
    /// A generator matching this configuration's epoch, layout and variant.
    pub fn generator(&self) -> BasicSnowflakeGenerator {
        BasicSnowflakeGenerator::new(self.codec.epoch())
            .with_layout(*self.codec.layout())
            .with_variant(self.codec.variant())
    }
}

impl TryFrom<CliArgs> for Config {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let epoch = match (args.preset, args.epoch) {
            (_, Some(epoch)) => epoch,
            (Preset::Discord, None) => DISCORD_EPOCH,
            (Preset::Twitter, None) => TWITTER_EPOCH,
            (Preset::Custom, None) => bail!("FLAKEGEN_EPOCH is required with the custom preset"),
        };

        let layout = BitLayout::new(args.worker_bits, args.process_bits, args.sequence_bits)?;

        if args.worker_id > layout.max_worker_id() {
            bail!(
                "FLAKEGEN_WORKER_ID ({}) exceeds the worker ID space (max = {})",
                args.worker_id,
                layout.max_worker_id()
            );
        }

        if args.process_id > layout.max_process_id() {
            bail!(
                "FLAKEGEN_PROCESS_ID ({}) exceeds the process ID space (max = {})",
                args.process_id,
                layout.max_process_id()
            );
        }

        if let Command::Generate { count: 0 } = args.command {
            bail!("--count must be greater than 0");
        }

        let variant = if args.swapped || args.preset == Preset::Discord {
            LayoutVariant::DiscordSwapped
        } else {
            LayoutVariant::Standard
        };

        Ok(Self {
            codec: SnowflakeCodec::new(epoch)
                .with_layout(layout)
                .with_variant(variant),
            worker_id: args.worker_id,
            process_id: args.process_id,
            log_format: args.log_format,
            command: args.command,
        })
    }
}
