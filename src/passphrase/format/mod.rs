//! Corpus file formats.
//!
//! # Module Organization
//!
//! - [`packed`]: Validates and randomly accesses packed corpus files
//! - [`writer`]: Produces packed corpus files with suffix-shared strings
//! - [`text`]: Parses plain and hinted text word lists
//!
//! # Packed Layout
//!
//! ```text
//! ┌─────────────────┐
//! │  Header +       │ ← packed::PackedCorpus::open()
//! │  Signature      │
//! ├─────────────────┤
//! │  Comment        │   (opaque)
//! ├─────────────────┤
//! │  String Pool    │ ← get_word() / get_hint()
//! ├─────────────────┤
//! │  Offset Table   │
//! └─────────────────┘
//! ```

pub mod packed;
pub mod text;
pub mod writer;
