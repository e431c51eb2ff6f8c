//! Reading and writing PLY files into a columnar, in-memory document.
//!
//! A PLY file is a self-describing container: a text header declares named
//! *elements* (e.g. `vertex` or `face`), each with a record count and a list
//! of typed *properties*. The body then stores all records, either as ASCII
//! text or as raw binary data.
//!
//! This crate reads such a file into a [`Document`] which stores every
//! property as one densely packed column ([`PropertyArray`]). Writing works
//! the other way around: the header is derived from the shape of the
//! document. The [`pack`] module converts between columns and fixed-width
//! records like `[x, y, z]`.
//!
//! ```no_run
//! use plydoc::{Encoding, pack};
//!
//! let doc = plydoc::load("bunny.ply")?;
//! let points = pack::to_point_cloud::<f32>(&doc)?;
//! println!("{} points", points.len());
//!
//! plydoc::save("bunny_ascii.ply", &doc, Encoding::Ascii)?;
//! # Ok::<(), plydoc::Error>(())
//! ```
//!
//! Only lists with a `uchar` count and exactly three entries (triangle
//! faces) are supported, and binary files must use the byte order of the
//! machine running this code.

use std::path::Path;

use derive_more::Display;

#[macro_use]
mod macros;

mod error;
pub mod data;
pub mod pack;
pub mod read;
pub mod ty;
pub mod write;

pub use crate::{
    data::{Document, ElementArray, NamedVec, PropertyArray, LIST_LEN},
    error::{BodyFault, Error},
    read::Reader,
    ty::{Scalar, ScalarType},
    write::{Config, Writer},
};


/// The encoding of the body of a PLY file.
///
/// `Display` prints the name used in the `format` line of the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Encoding {
    #[display(fmt = "ascii")]
    Ascii,
    #[display(fmt = "binary_big_endian")]
    BinaryBigEndian,
    #[display(fmt = "binary_little_endian")]
    BinaryLittleEndian,
}

impl Encoding {
    /// Returns the binary encoding with the native endianness (little endian
    /// on x86).
    pub const fn binary_native() -> Self {
        #[cfg(target_endian = "big")]
        { Encoding::BinaryBigEndian }

        #[cfg(target_endian = "little")]
        { Encoding::BinaryLittleEndian }
    }

    pub fn is_binary(&self) -> bool {
        *self != Encoding::Ascii
    }

    /// Parses the encoding name of a `format` line.
    pub(crate) fn from_header_name(name: &str) -> Option<Self> {
        match name {
            "ascii" => Some(Encoding::Ascii),
            "binary_big_endian" => Some(Encoding::BinaryBigEndian),
            "binary_little_endian" => Some(Encoding::BinaryLittleEndian),
            _ => None,
        }
    }
}

/// Reads the PLY file at `path` into a document.
pub fn load(path: impl AsRef<Path>) -> Result<Document, Error> {
    Reader::open(path)?.read()
}

/// Writes `doc` to the file at `path` using the given encoding. Binary files
/// are written in native byte order; passing the binary encoding of the
/// other byte order fails with [`Error::EndiannessMismatch`].
///
/// The file is created or truncated.
pub fn save(path: impl AsRef<Path>, doc: &Document, encoding: Encoding) -> Result<(), Error> {
    save_with(path, doc, &Config::new(encoding))
}

/// Like [`save`], but with a full writer configuration (e.g. to add header
/// comments).
pub fn save_with(path: impl AsRef<Path>, doc: &Document, config: &Config) -> Result<(), Error> {
    config.write_to_file(path, doc)
}
