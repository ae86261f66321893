//! Format specifiers: parsing and entropy resolution.

pub mod parser;
pub mod resolve;

pub use parser::{parse, Group, GroupSource, Pattern};
pub use resolve::{resolve_entropy, Resolution, ResolvedGroup};
