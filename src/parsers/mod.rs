// ==============================================================================
// parsers/mod.rs - File parser modules
// ==============================================================================
// Description: Parsers for GO annotation, label, weight, pedigree and table files
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

pub mod gaf;
pub mod go_json;
pub mod ped;
pub mod table;
pub mod weights;

pub use gaf::{GafParseError, GafParser};
pub use go_json::{GoJsonError, GoLabels};
pub use ped::{PedParseError, PedRecord, Pedigree};
pub use table::{Table, TableError};
pub use weights::{ReferenceWeights, WeightParseError};

use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// Gzip magic number (first two bytes of any .gz member)
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Open a text file, transparently decompressing gzip input
///
/// Compression is detected from the magic number, not the file extension,
/// so `goa_human.gaf.gz` and an uncompressed copy read the same way.
pub fn open_reader(path: impl AsRef<Path>) -> std::io::Result<Box<dyn BufRead>> {
    let mut file = File::open(path.as_ref())?;

    let mut magic = Vec::with_capacity(2);
    (&mut file).take(2).read_to_end(&mut magic)?;
    file.seek(SeekFrom::Start(0))?;

    if magic == GZIP_MAGIC {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}
