//! DLF Parser Library
//!
//! A Rust library that rebuilds dive profiles from decoded dive computer logs.
//! A device decoding backend replays the typed values it decoded (time, depth,
//! temperature, ppo2, events); this crate turns that stream into an ordered
//! list of samples plus a parallel list of events, and renders the result as
//! one JSON document.
//!
//! # Features
//!
//! - **`csv`** (default): Enable CSV export of samples
//! - **`cli`** (default): Build the command-line interface binary
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use dlf_parser::{parse_dive_file, write_document, DeviceSelection, ReplayContext, StoreLimits};
//! use std::path::Path;
//!
//! let context = ReplayContext::with_builtin_devices().unwrap();
//! let log = parse_dive_file(
//!     Path::new("dive.json"),
//!     &context,
//!     &DeviceSelection::default(),
//!     &StoreLimits::default(),
//! )
//! .unwrap();
//! println!("Rebuilt {} samples and {} events", log.samples.len(), log.events.len());
//!
//! let mut stdout = std::io::stdout().lock();
//! write_document(&log, &mut stdout).unwrap();
//! ```
//!
//! # Public API
//!
//! ## Parsing Functions
//! - [`parse_dive_file`] - Load and parse a dive file
//! - [`parse_dive_bytes`] - Parse a dive already held in memory
//! - [`load_dive_file`] - Read a file into memory with distinct open/read errors
//!
//! ## Reconstruction
//! - [`SampleReconstructor`] - Turns the value stream into samples and events
//! - [`EventExtractor`] - Captures event markers
//! - [`RecordStore`] - Append-only storage with capacity doubling
//!
//! ## Decoding Backends
//! - [`DeviceContext`] / [`DiveParser`] - Backend traits
//! - [`ReplayContext`] - Backend that replays JSON dive captures
//!
//! ## Export Functions
//! - [`write_document`] - Render the JSON dive document
//! - [`export_to_csv`] - Export samples to CSV
//! - [`export_to_ssrf`] - Export the dive as a Subsurface dive log

pub mod conversion;
pub mod decoder;
pub mod error;
pub mod export;
pub mod parser;
pub mod types;

pub use conversion::*;
pub use decoder::*;
pub use error::{DiveError, Result};
pub use export::*;
#[allow(ambiguous_glob_reexports)]
pub use parser::*;
#[allow(ambiguous_glob_reexports)]
pub use types::*;
