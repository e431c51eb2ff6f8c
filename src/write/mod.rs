//! Everything related to writing a PLY file.
//!
//! # Random notes on the format
//!
//! - Header lines are terminated by `'\n'` only. The original PLY format
//!   description talks about carriage returns, but practically every file
//!   uses `'\n'`, and the reader accepts both.
//! - For ASCII encoding we simply use the `fmt::Display` impl of all types.
//!   For floats, this is the shortest representation that parses back to
//!   the identical value.
//! - Binary files are always written in the byte order of this machine.
//! - Lists always have exactly three entries and a `uchar` count.

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use byteorder::{NativeEndian, WriteBytesExt};
use tracing::debug;

use crate::{
    Encoding, Error,
    data::{Document, PropertyArray, LIST_LEN},
    error::BodyFault,
    ty::{Scalar, ScalarType},
};



// ===============================================================================================
// ===== PLY Config
// ===============================================================================================

/// Used to configure and create a [`Writer`].
///
/// This is used to configure basic settings for the file to be written. Most
/// importantly, this is the file encoding. Additionally, you can add comments
/// to the file header.
#[derive(Clone, Debug)]
pub struct Config {
    encoding: Encoding,
    comments: Vec<String>,
}

impl Config {
    /// Creates a new configuration with binary encoding (native endianness).
    pub fn binary() -> Self {
        Self::new(Encoding::binary_native())
    }

    /// Creates a new configuration with ASCII encoding.
    ///
    /// ASCII encoding is usually a lot less space efficient and a lot slower
    /// to read and write. The PLY file header is always ASCII.
    pub fn ascii() -> Self {
        Self::new(Encoding::Ascii)
    }

    /// Creates a new configuration with the given encoding. Writing will
    /// fail if this is a binary encoding with the wrong byte order.
    pub fn new(encoding: Encoding) -> Self {
        Self {
            encoding,
            comments: vec![],
        }
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Adds a `comment` line to the file header.
    ///
    /// The given string must not contain `'\n'` or else this method panics.
    pub fn add_comment(mut self, comment: impl Into<String>) -> Self {
        let comment = comment.into();

        assert!(!comment.contains('\n'), "PLY comments must not contain '\\n'!");

        self.comments.push(comment);
        self
    }

    /// Creates a writer with the given `io::Write` instance and `self` as
    /// configuration.
    pub fn into_writer<W: io::Write>(self, writer: W) -> Writer<W> {
        Writer::new(self, writer)
    }

    /// Writes the document into the file given by the path. Overwrites the
    /// file if it already exists.
    pub fn write_to_file(&self, path: impl AsRef<Path>, doc: &Document) -> Result<(), Error> {
        // Don't truncate the file if we can't write it anyway
        self.check_encoding()?;
        check_lengths(doc)?;

        let file = BufWriter::new(File::create(path)?);
        self.clone().into_writer(file).write(doc)
    }

    /// Writes the document into a `Vec<u8>` which is returned on success.
    pub fn write_to_memory(&self, doc: &Document) -> Result<Vec<u8>, Error> {
        let mut out = Vec::new();
        self.clone().into_writer(&mut out).write(doc)?;
        Ok(out)
    }

    /// Binary files can only be written in the byte order of this machine.
    fn check_encoding(&self) -> Result<(), Error> {
        let host = Encoding::binary_native();
        if self.encoding.is_binary() && self.encoding != host {
            return Err(Error::EndiannessMismatch { file: self.encoding, host });
        }

        Ok(())
    }
}


// ===============================================================================================
// ===== Writer
// ===============================================================================================

/// A writer able to write binary and ASCII PLY files.
///
/// # Example
///
/// ```no_run
/// use std::{fs::File, io::BufWriter};
/// use plydoc::{Document, Error, write::Config};
///
/// fn write_both_encodings(doc: &Document) -> Result<(), Error> {
///     // We use `BufWriter` here because unbuffered file access is usually a
///     // lot slower.
///     let file_a = File::create("cloud_ascii.ply")?;
///     Config::ascii().into_writer(BufWriter::new(file_a)).write(doc)?;
///
///     let file_b = File::create("cloud_binary.ply")?;
///     Config::binary().into_writer(BufWriter::new(file_b)).write(doc)?;
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Writer<W: io::Write> {
    config: Config,
    writer: W,
}

impl<W: io::Write> Writer<W> {
    /// Creates a new PLY writer with the given PLY config which will write to
    /// the given `io::Write` instance.
    pub fn new(config: Config, writer: W) -> Self {
        Self { config, writer }
    }

    /// Writes header and body of `doc` and flushes the underlying writer.
    pub fn write(mut self, doc: &Document) -> Result<(), Error> {
        self.config.check_encoding()?;
        check_lengths(doc)?;
        let encoding = self.config.encoding;

        let w = &mut self.writer;

        // ===================================================================
        // ===== Write header (this part is always ASCII)
        // ===================================================================
        // Magic signature
        w.write_all(b"ply\n")?;
        writeln!(w, "format {} 1.0", encoding)?;

        // Add all comments
        for comment in &self.config.comments {
            writeln!(w, "comment {}", comment)?;
        }

        // Define all elements with their properties
        for (element_name, element) in doc.elements() {
            writeln!(w, "element {} {}", element_name, element.count())?;
            for (name, prop) in element.properties() {
                if prop.is_list() {
                    writeln!(
                        w,
                        "property list {} {} {}",
                        ScalarType::UChar.ply_type_name(),
                        prop.scalar_type().ply_type_name(),
                        name,
                    )?;
                } else {
                    writeln!(w, "property {} {}", prop.scalar_type().ply_type_name(), name)?;
                }
            }
        }

        w.write_all(b"end_header\n")?;


        // ===================================================================
        // ===== Write body
        // ===================================================================
        match encoding {
            Encoding::Ascii => write_body(&mut AsciiSerializer::new(w), doc)?,
            _ => write_body(&mut BinarySerializer { writer: &mut *w }, doc)?,
        }

        w.flush()?;

        debug!(
            %encoding,
            elements = doc.len(),
            "wrote PLY document"
        );

        Ok(())
    }
}

/// Properties can be replaced through `property_mut`, so their lengths have
/// to be checked again before anything is written.
fn check_lengths(doc: &Document) -> Result<(), Error> {
    for (element_name, element) in doc.elements() {
        for (name, prop) in element.properties() {
            let expected = prop.expected_len(element.count());
            if prop.len() != expected {
                return Err(Error::MissingOrInconsistentProperty(format!(
                    "property '{}' of element '{}' holds {} values, but {} records need {}",
                    name,
                    element_name,
                    prop.len(),
                    element.count(),
                    expected,
                )));
            }
        }
    }

    Ok(())
}

/// Writes all records of all elements in document order.
fn write_body(ser: &mut impl Serializer, doc: &Document) -> Result<(), Error> {
    for (element_name, element) in doc.elements() {
        // Same as in the reader: nothing to write for records without
        // properties
        if element.is_empty() {
            continue;
        }

        for record in 0..element.count() {
            for (property_name, property) in element.properties() {
                write_value(ser, property, record)
                    .map_err(|e| BodyFault::from(e).at(element_name, property_name, record))?;
            }

            ser.end_record()?;
        }
    }

    Ok(())
}

fn write_value(
    ser: &mut impl Serializer,
    property: &PropertyArray,
    record: usize,
) -> Result<(), io::Error> {
    let ty = property.scalar_type();
    let stride = property.stride();
    let data = property.as_bytes();

    if property.is_list() {
        ser.add_list_len(LIST_LEN as u8)?;
        let start = record * LIST_LEN * stride;
        for value in data[start..start + LIST_LEN * stride].chunks_exact(stride) {
            ser.add_value(ty, value)?;
        }
    } else {
        let start = record * stride;
        ser.add_value(ty, &data[start..start + stride])?;
    }

    Ok(())
}


// ===============================================================================================
// ===== Definition of ASCII and binary serializers
// ===============================================================================================
// These serializers are just used to abstract over the encoding (and things
// like separators and line endings). Values are passed as native-endian
// bytes of the given type.

trait Serializer {
    fn add_value(&mut self, ty: ScalarType, bytes: &[u8]) -> Result<(), io::Error>;
    fn add_list_len(&mut self, len: u8) -> Result<(), io::Error>;
    fn end_record(&mut self) -> Result<(), io::Error>;
}

#[derive(Debug)]
struct AsciiSerializer<'a, W: Write> {
    writer: &'a mut W,
    at_start_of_line: bool,
}

impl<'a, W: Write> AsciiSerializer<'a, W> {
    fn new(w: &'a mut W) -> Self {
        Self {
            writer: w,
            at_start_of_line: true,
        }
    }

    fn write_separator(&mut self) -> Result<(), io::Error> {
        if self.at_start_of_line {
            self.at_start_of_line = false;
        } else {
            self.writer.write_all(b" ")?;
        }

        Ok(())
    }
}

impl<W: Write> Serializer for AsciiSerializer<'_, W> {
    fn add_value(&mut self, ty: ScalarType, bytes: &[u8]) -> Result<(), io::Error> {
        self.write_separator()?;
        with_scalar_type!(ty, T => write!(self.writer, "{}", T::read_bytes::<NativeEndian>(bytes)))
    }

    fn add_list_len(&mut self, len: u8) -> Result<(), io::Error> {
        self.write_separator()?;
        write!(self.writer, "{}", len)
    }

    fn end_record(&mut self) -> Result<(), io::Error> {
        self.writer.write_all(b"\n")?;
        self.at_start_of_line = true;
        Ok(())
    }
}

/// Native endian binary: the bytes are written verbatim.
#[derive(Debug)]
struct BinarySerializer<'a, W: Write> {
    writer: &'a mut W,
}

impl<W: Write> Serializer for BinarySerializer<'_, W> {
    fn add_value(&mut self, _: ScalarType, bytes: &[u8]) -> Result<(), io::Error> {
        self.writer.write_all(bytes)
    }

    fn add_list_len(&mut self, len: u8) -> Result<(), io::Error> {
        self.writer.write_u8(len)
    }

    fn end_record(&mut self) -> Result<(), io::Error> {
        // NOOP
        Ok(())
    }
}
