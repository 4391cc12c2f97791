//! File support for XMP
//!
//! This module reads and writes XMP packets in files: whole-file sidecars
//! and packets embedded in other content. Native container formats are not
//! parsed; embedded packets are located by scanning.

pub mod file;
pub mod options;
pub mod packet;

pub use file::XmpFile;
pub use options::XmpOptions;
pub use packet::{find_packet, PacketInfo, PacketScanner};
