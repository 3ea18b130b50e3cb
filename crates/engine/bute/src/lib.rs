//! Attribute-file ("bute") engine for data-driven subsystems
//!
//! This crate provides:
//! - **ButeFile**: a case-insensitive table of named groups holding typed
//!   attributes, loaded from a simple `Name = value` text format
//! - **Typed accessors**: `get_*`/`set_*` per value kind, with defaulting
//!   variants that never fail
//! - **BlockCodec**: Blowfish transport for encrypted sources
//!
//! # Example
//!
//! ```rust,ignore
//! use bute::ButeFile;
//!
//! let mut weapons = ButeFile::from_file("attributes/weapons.txt")?;
//!
//! let damage = weapons.get_int_or("Pistol", "Damage", 0);
//! let name = weapons.get_string_or("Pistol", "Name", "<unnamed>");
//!
//! // Runtime tuning; the net result round-trips through save
//! weapons.set_float("Pistol", "Range", 12.5);
//! weapons.save_file("attributes/weapons.txt")?;
//! ```

mod crypto;
mod error;
mod intern;
mod parser;
mod scanner;
mod table;
mod value;

pub use crypto::{BlockCodec, BLOCK_SIZE};
pub use error::{Error, Result};
pub use intern::StringPool;
pub use table::{ButeFile, Provenance};
pub use value::{Point, Range, Rect, Value, ValueKind};

// Re-export glam so callers name the same vector type
pub use glam;
