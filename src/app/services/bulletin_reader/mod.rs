//! Bulletin reader for TAF input files
//!
//! An input file holds one or more WMO bulletins. Each bulletin starts with
//! an abbreviated heading line (`TTAAii CCCC YYGGgg [BBB]`) followed by one or
//! more forecasts, each terminated by `=`. The reader splits a file into
//! individual messages and pairs each with the heading it was found under,
//! so the heading can be stored alongside the raw text or used as a source
//! of issue time.
//!
//! # Architecture
//!
//! - [`header`] - WMO abbreviated heading recognition
//! - [`reader`] - file reading and message splitting
//!
//! # Usage
//!
//! ```rust
//! use taf_processor::app::services::bulletin_reader::split_messages;
//!
//! let content = "FTUS45 KBOU 261120\nTAF KDEN 261130Z 2612/2712 09008KT P6SM SKC=\n";
//! let messages = split_messages(content);
//! assert_eq!(messages.len(), 1);
//! assert_eq!(messages[0].header.as_deref(), Some("FTUS45 KBOU 261120"));
//! ```

pub mod header;
pub mod reader;

#[cfg(test)]
pub mod tests;

pub use header::WmoHeader;
pub use reader::{BulletinMessage, read_messages, split_messages};
