mod basic;
mod interface;
mod iter;
#[cfg(feature = "lock")]
mod lock;
#[cfg(feature = "lock")]
mod mutex;
mod state;
mod status;
#[cfg(test)]
mod tests;

pub(crate) use crate::error::Result;
pub use basic::*;
pub use interface::*;
pub use iter::*;
#[cfg_attr(docsrs, doc(cfg(feature = "lock")))]
#[cfg(feature = "lock")]
pub use lock::*;
#[cfg(feature = "lock")]
pub(crate) use mutex::*;
pub use status::*;
