//! Rafters Serialize - Transport for Frozen Grids
//!
//! Encodes [`FrozenGrid`] values as bytes, onto any reader or writer, or to
//! files whose format follows the extension.
//!
//! # Supported Formats
//!
//! - **Binary** (.rgrid, .bin) - bincode encoding
//! - **JSON** (.json) - human-readable
//!
//! # Example
//!
//! ```rust
//! use rafters_grid::{GridArray, GridFields};
//! use rafters_serialize::{decode_grid, encode_grid, Format};
//!
//! let grid = GridArray::from_vec(vec![1.0_f32, 2.0, 3.0], &[3], GridFields::new()).unwrap();
//! let bytes = encode_grid(&grid, Format::Binary).unwrap();
//! let back: GridArray<f32> = decode_grid(&bytes, Format::Binary).unwrap();
//! assert_eq!(back, grid);
//! ```
//!
//! @version 0.1.0
//! @author `Rafters` Development Team

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::trivially_copy_pass_by_ref)]

// =============================================================================
// Modules
// =============================================================================

mod format;

// =============================================================================
// Re-exports
// =============================================================================

pub use format::{detect_format, detect_format_from_bytes, Format};
pub use rafters_grid::{FieldMap, FrozenGrid, RawBuffer};

// =============================================================================
// Imports
// =============================================================================

use rafters_core::{Error, Result, Scalar};
use rafters_grid::GridArray;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::debug;

// =============================================================================
// Bytes
// =============================================================================

/// Encodes a frozen grid.
pub fn encode(frozen: &FrozenGrid, format: Format) -> Result<Vec<u8>> {
    match format {
        Format::Binary => bincode::serialize(frozen).map_err(|e| Error::serialization(e.to_string())),
        Format::Json => {
            serde_json::to_vec_pretty(frozen).map_err(|e| Error::serialization(e.to_string()))
        }
    }
}

/// Decodes a frozen grid.
pub fn decode(bytes: &[u8], format: Format) -> Result<FrozenGrid> {
    match format {
        Format::Binary => bincode::deserialize(bytes).map_err(|e| Error::serialization(e.to_string())),
        Format::Json => serde_json::from_slice(bytes).map_err(|e| Error::serialization(e.to_string())),
    }
}

/// Freezes and encodes a grid.
pub fn encode_grid<T: Scalar>(grid: &GridArray<T>, format: Format) -> Result<Vec<u8>> {
    encode(&grid.to_frozen(), format)
}

/// Decodes and thaws a grid of element type `T`.
pub fn decode_grid<T: Scalar>(bytes: &[u8], format: Format) -> Result<GridArray<T>> {
    decode(bytes, format)?.thaw()
}

// =============================================================================
// Streams
// =============================================================================

/// Writes a grid to any writer.
pub fn write_grid<T: Scalar, W: Write>(grid: &GridArray<T>, writer: W, format: Format) -> Result<()> {
    let frozen = grid.to_frozen();
    let mut writer = writer;
    match format {
        Format::Binary => bincode::serialize_into(&mut writer, &frozen)
            .map_err(|e| Error::serialization(e.to_string()))?,
        Format::Json => serde_json::to_writer_pretty(&mut writer, &frozen)
            .map_err(|e| Error::serialization(e.to_string()))?,
    }
    writer.flush().map_err(|e| Error::serialization(e.to_string()))
}

/// Reads a grid from any reader.
pub fn read_grid<T: Scalar, R: Read>(reader: R, format: Format) -> Result<GridArray<T>> {
    let frozen: FrozenGrid = match format {
        Format::Binary => {
            bincode::deserialize_from(reader).map_err(|e| Error::serialization(e.to_string()))?
        }
        Format::Json => {
            serde_json::from_reader(reader).map_err(|e| Error::serialization(e.to_string()))?
        }
    };
    frozen.thaw()
}

// =============================================================================
// Files
// =============================================================================

/// Saves a grid, choosing the format from the extension.
pub fn save_grid<T: Scalar, P: AsRef<Path>>(grid: &GridArray<T>, path: P) -> Result<()> {
    let path = path.as_ref();
    let format = detect_format(path);
    debug!(path = %path.display(), %format, shape = ?grid.shape(), "saving grid");

    let file = File::create(path).map_err(|e| Error::serialization(e.to_string()))?;
    write_grid(grid, BufWriter::new(file), format)
}

/// Loads a grid, choosing the format from the extension.
pub fn load_grid<T: Scalar, P: AsRef<Path>>(path: P) -> Result<GridArray<T>> {
    let path = path.as_ref();
    let format = detect_format(path);
    debug!(path = %path.display(), %format, "loading grid");

    let file = File::open(path).map_err(|e| Error::serialization(e.to_string()))?;
    read_grid(BufReader::new(file), format)
}

/// Loads a grid, choosing the format from the file contents.
pub fn load_grid_detect<T: Scalar, P: AsRef<Path>>(path: P) -> Result<GridArray<T>> {
    let path = path.as_ref();
    let mut bytes = Vec::new();
    File::open(path)
        .and_then(|mut file| file.read_to_end(&mut bytes))
        .map_err(|e| Error::serialization(e.to_string()))?;

    let format = detect_format_from_bytes(&bytes)
        .ok_or_else(|| Error::serialization(format!("{} is empty", path.display())))?;
    decode_grid(&bytes, format)
}

// =============================================================================
// Tests
// =============================================================================
