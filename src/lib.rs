//! Araimo TV - IPTV playlist parsing and channel browsing

pub mod catalog;
pub mod config;
pub mod error;
pub mod m3u_parser;
pub mod models;
pub mod playback;

pub use catalog::Catalog;
pub use m3u_parser::{parse_m3u, parse_m3u_with, OrphanUrlPolicy, ParseOptions};
pub use models::Channel;
