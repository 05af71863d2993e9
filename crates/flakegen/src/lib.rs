//! Twitter and Discord style Snowflake IDs.
//!
//! A Snowflake ID is a 64-bit integer packing, from most to least
//! significant bit, a millisecond timestamp relative to an epoch, a process
//! ID, a worker ID and a per-millisecond sequence. Generators with distinct
//! worker/process pairs produce strictly increasing, collision-free IDs
//! without talking to each other.
//!
//! ```
//! use flakegen::{BasicSnowflakeGenerator, SnowflakeGenerator};
//!
//! let generator = BasicSnowflakeGenerator::twitter();
//! let id = generator.generate(7, 2).unwrap();
//!
//! let parsed = generator.parse(id);
//! assert_eq!(parsed.worker_id, 7);
//! assert_eq!(parsed.process_id, 2);
//! ```
//!
//! Decoding an existing Discord ID:
//!
//! ```
//! use flakegen::{SnowflakeGenerator, discord_generator};
//!
//! let parsed = discord_generator().parse_str("175928847299117063").unwrap();
//! assert_eq!(parsed.timestamp, 1_462_015_105_796); // 2016-04-30T11:18:25.796Z
//! assert_eq!(parsed.worker_id, 1);
//! assert_eq!(parsed.process_id, 0);
//! ```
//!
//! # Crate Features
//! * `lock` (default): [`LockSnowflakeGenerator`], a thread-safe generator.
//! * `parking-lot`: back the lock generator with `parking_lot` instead of
//!   `std::sync::Mutex`.
//! * `serde`: `Serialize`/`Deserialize` for IDs and parsed fields, plus the
//!   [`serde`](crate::serde) field helpers.
//! * `tracing`: trace spans around generation and a warning on clock
//!   regression.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod codec;
mod error;
mod generator;
mod id;
mod layout;
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
#[cfg(feature = "serde")]
pub mod serde;
mod time;

pub use crate::codec::*;
pub use crate::error::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::layout::*;
pub use crate::time::*;
