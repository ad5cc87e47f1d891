//! In-memory decoding of application export archives.
//!
//! An export is a zip of JSON documents. [`decode`] validates the container
//! format, sanitizes every entry name (zip-slip prevention), enforces entry
//! and size limits, and returns an immutable [`ExportArchive`].
//!
//! # Example
//!
//! ```no_run
//! use exportsync_archive::{decode, DecodeOptions};
//!
//! # fn run(payload: &[u8]) -> exportsync_archive::Result<()> {
//! let archive = decode(payload, &DecodeOptions::default())?;
//! for name in archive.names() {
//!     println!("{name}");
//! }
//! # Ok(())
//! # }
//! ```

pub use archive::{ArchiveEntry, DecodeOptions, EntryKind, ExportArchive, decode};
pub use error::{Error, Result};
pub use format::{ArchiveFormat, detect_format};
pub use sanitize::sanitize_entry_name;

mod archive;
mod error;
mod format;
mod sanitize;
