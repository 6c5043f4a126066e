//! CPT Sounding Module
//!
//! Parses BRO-format XML cone penetration tests into [`CptRecord`] structs
//! and provides the cleaning operations applied before interpretation:
//!
//! - `bro_reader`: quick-xml event reader for BRO CPT dispatch files
//! - `cleaning`: row-mask based channel cleaning on [`CptRecord`]
//!
//! All per-depth channels of a record stay equal-length and index-aligned;
//! every cleaning operation derives one row mask from its key channel and
//! applies it to all populated channels in a single pass.

mod bro_reader;
mod cleaning;
mod record;

pub use bro_reader::{BroParseError, BroReaderConfig, BroXmlReader};
pub use record::CptRecord;
