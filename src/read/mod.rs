//! Everything related to reading a PLY file.
//!
//! Reading happens in two steps: [`Reader::new`] parses the header and
//! builds an empty (zero-filled) [`Document`] with all elements and
//! properties, then [`Reader::read`] fills all property buffers from the
//! body.
//!
//! # Notes on the format
//!
//! - Lines of the header may end in `"\n"` or `"\r\n"`.
//! - Header lines that are not `format`, `element`, `property`, `comment`
//!   or `end_header` lines are ignored. This includes `obj_info`.
//! - The ASCII body is treated as a stream of whitespace separated tokens;
//!   line breaks are not significant.
//! - Binary files are only read if their byte order is the one of this
//!   machine. Nothing is swapped.

use std::{
    borrow::Cow,
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
    str,
};

use byteorder::{NativeEndian, ReadBytesExt};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::{
    Encoding, Error,
    data::{Document, ElementArray, PropertyArray, LIST_LEN},
    error::BodyFault,
    ty::{Scalar, ScalarType},
};

#[cfg(test)]
mod tests;


// ===========================================================================
// ===== Definition of `Reader`
// ===========================================================================

/// A reader able to read PLY files.
///
/// You can create a reader with [`Reader::open`] or [`Reader::new`]. Both
/// parse the header right away, so that its information (e.g.
/// [`Reader::encoding`] or [`Reader::header`]) is available before the body
/// is read with [`Reader::read`].
#[derive(Debug)]
pub struct Reader<R: BufRead> {
    input: R,
    encoding: Encoding,
    comments: Vec<String>,
    header: Document,
}

impl Reader<BufReader<File>> {
    /// Tries to open the file specified by the given path and creates a new
    /// `Reader` from that file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::new(BufReader::new(File::open(path)?))
    }
}

impl<R: BufRead> Reader<R> {
    /// Creates a new `Reader` from the given input and parses the header.
    ///
    /// If you want to open a file, rather use [`Reader::open`].
    pub fn new(mut input: R) -> Result<Self, Error> {
        let mut lines = HeaderLines { input: &mut input, line: 0 };

        // ===== Magic number ================================================
        match lines.next_line() {
            Ok(Some(line)) if line == "ply" => {}
            _ => return Err(Error::BadMagic),
        }


        // ===== Parse elements and their properties =========================
        let mut encoding = None;
        let mut comments = Vec::new();
        let mut header = Document::new();

        // Name of the element that `property` lines are added to
        let mut current: Option<String> = None;

        loop {
            let line = match lines.next_line()? {
                Some(line) => line,
                None => return Err(lines.error("unexpected end of file (no \"end_header\")")),
            };

            let words = header_words(&line);
            let words = words.iter().map(|w| &**w).collect::<SmallVec<[&str; 8]>>();

            match words.as_slice() {
                [] => {}
                ["end_header"] => break,
                ["comment", ..] => {
                    comments.push(line.trim_start()["comment".len()..].trim().to_string());
                }

                // Format line, e.g. `format ascii 1.0`
                ["format", name, version] => {
                    let e = Encoding::from_header_name(name)
                        .ok_or_else(|| Error::UnknownFormat(name.to_string()))?;
                    if *version != "1.0" {
                        trace!(version = *version, "unexpected PLY version, reading anyway");
                    }
                    encoding = Some(e);
                }

                // Element definition, e.g. `element vertex 8`
                ["element", name, count] => {
                    let count = count.parse::<usize>().map_err(|_| Error::InvalidCount {
                        element: name.to_string(),
                        count: count.to_string(),
                    })?;

                    header.add_element(*name, ElementArray::new(count))?;
                    current = Some(name.to_string());
                }

                // List property, e.g. `property list uchar int vertex_indices`
                ["property", "list", len_type, ty, name] => {
                    add_property(&mut header, current.as_deref(), name, ty, Some(*len_type), &lines)?;
                }

                // Scalar property, e.g. `property float x`
                ["property", ty, name] => {
                    add_property(&mut header, current.as_deref(), name, ty, None, &lines)?;
                }

                _ => trace!(line_no = lines.line, "ignoring header line {:?}", line),
            }
        }

        let encoding = encoding.ok_or_else(|| lines.error("missing \"format\" line"))?;

        let elements = header.elements()
            .map(|(name, e)| (name.to_string(), e.count()))
            .collect::<Vec<_>>();
        debug!(%encoding, ?elements, "parsed PLY header");

        Ok(Self { input, encoding, comments, header })
    }

    /// The encoding of the body, as declared in the header.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// The text of all `comment` lines in the header, in order.
    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    /// The shape of the file: all elements and properties as declared in the
    /// header, with zero-filled buffers.
    pub fn header(&self) -> &Document {
        &self.header
    }

    /// Reads the body and returns the fully populated document.
    ///
    /// Binary files have to use the byte order of this machine and must not
    /// contain any bytes after the last record.
    pub fn read(self) -> Result<Document, Error> {
        let Self { mut input, encoding, mut header, .. } = self;

        match encoding {
            Encoding::Ascii => {
                let mut de = AsciiDeserializer { input: &mut input, token: Vec::new() };
                read_body(&mut de, &mut header)?;
            }
            binary => {
                let host = Encoding::binary_native();
                if binary != host {
                    return Err(Error::EndiannessMismatch { file: binary, host });
                }

                let mut de = BinaryDeserializer { input: &mut input };
                read_body(&mut de, &mut header)?;

                // Make sure we reached the end of the file
                if !input.fill_buf()?.is_empty() {
                    return Err(Error::TrailingData);
                }
            }
        }

        Ok(header)
    }
}


// ===========================================================================
// ===== Header helpers
// ===========================================================================

/// Reads header lines and keeps track of the line number for error messages.
struct HeaderLines<'a, R> {
    input: &'a mut R,
    line: usize,
}

impl<R: BufRead> HeaderLines<'_, R> {
    /// Returns the next line without line break, or `None` at EOF.
    fn next_line(&mut self) -> Result<Option<String>, Error> {
        self.line += 1;

        let mut line = String::new();
        let n = self.input.read_line(&mut line).map_err(|e| self.error(e.to_string()))?;
        if n == 0 {
            return Ok(None);
        }

        if line.ends_with('\n') {
            line.pop();
        }
        if line.ends_with('\r') {
            line.pop();
        }

        Ok(Some(line))
    }

    fn error(&self, msg: impl Into<String>) -> Error {
        Error::HeaderParse { line: self.line, msg: msg.into() }
    }
}

/// Splits a header line into words. The two-word type names `unsigned char`,
/// `unsigned short` and `unsigned int` are returned as one word.
fn header_words(line: &str) -> SmallVec<[Cow<'_, str>; 8]> {
    let mut out = SmallVec::new();
    let mut words = line.split_whitespace().peekable();
    while let Some(word) = words.next() {
        match (word, words.peek()) {
            ("unsigned", Some(&next)) if ["char", "short", "int"].contains(&next) => {
                out.push(Cow::Owned(format!("unsigned {}", next)));
                words.next();
            }
            _ => out.push(Cow::Borrowed(word)),
        }
    }

    out
}

/// Adds a zero-filled property to the element named `current`. The type
/// names are only parsed once it is clear that there is such an element.
fn add_property<R: BufRead>(
    header: &mut Document,
    current: Option<&str>,
    name: &str,
    ty: &str,
    len_type: Option<&str>,
    lines: &HeaderLines<'_, R>,
) -> Result<(), Error> {
    let no_element = || Error::NoCurrentElement {
        property: name.to_string(),
        line: lines.line,
    };
    let element_name = current.ok_or_else(no_element)?;
    let element = header.element_mut(element_name).ok_or_else(no_element)?;

    if let Some(len_type) = len_type {
        let len_type = len_type.parse::<ScalarType>()?;
        if len_type != ScalarType::UChar {
            return Err(Error::UnsupportedListCountType {
                property: name.to_string(),
                ty: len_type,
            });
        }
    }
    let ty = ty.parse::<ScalarType>()?;
    let is_list = len_type.is_some();

    // The count comes straight from the file, so the buffer might be
    // impossible to allocate.
    let per_record = if is_list { LIST_LEN } else { 1 };
    let property = element.count()
        .checked_mul(per_record)
        .and_then(|len| PropertyArray::try_new(ty, len, is_list))
        .ok_or_else(|| Error::InvalidCount {
            element: element_name.to_string(),
            count: element.count().to_string(),
        })?;

    element.add_property(name, property)
}


// ===========================================================================
// ===== Body parsing
// ===========================================================================

/// Abstracts over ASCII and binary bodies. Values are always written into
/// `dst` in native byte order.
trait Deserializer {
    /// Reads the length of a list.
    fn list_len(&mut self) -> Result<i64, BodyFault>;

    /// Reads a single value of type `ty` into `dst`, which is exactly
    /// `ty.size()` bytes long.
    fn value(&mut self, ty: ScalarType, dst: &mut [u8]) -> Result<(), BodyFault>;

    /// Reads as many values of type `ty` as fit into `dst`.
    fn values(&mut self, ty: ScalarType, dst: &mut [u8]) -> Result<(), BodyFault> {
        for chunk in dst.chunks_exact_mut(ty.size()) {
            self.value(ty, chunk)?;
        }

        Ok(())
    }
}

/// Binary body in native byte order: values are copied verbatim.
struct BinaryDeserializer<'a, R> {
    input: &'a mut R,
}

impl<R: Read> Deserializer for BinaryDeserializer<'_, R> {
    fn list_len(&mut self) -> Result<i64, BodyFault> {
        Ok(self.input.read_u8()?.into())
    }

    fn value(&mut self, _: ScalarType, dst: &mut [u8]) -> Result<(), BodyFault> {
        self.input.read_exact(dst)?;
        Ok(())
    }

    fn values(&mut self, _: ScalarType, dst: &mut [u8]) -> Result<(), BodyFault> {
        self.input.read_exact(dst)?;
        Ok(())
    }
}

/// ASCII body: whitespace separated decimal literals.
struct AsciiDeserializer<'a, R> {
    input: &'a mut R,

    // Kept outside to retain the allocation
    token: Vec<u8>,
}

impl<R: BufRead> AsciiDeserializer<'_, R> {
    /// Skips whitespace and reads the next token into `self.token`.
    fn next_token(&mut self) -> Result<(), BodyFault> {
        self.token.clear();

        loop {
            let buf = self.input.fill_buf()?;
            if buf.is_empty() {
                return Err(BodyFault::UnexpectedEof);
            }

            let skip = buf.iter().take_while(|b| b.is_ascii_whitespace()).count();
            let found = skip < buf.len();
            self.input.consume(skip);
            if found {
                break;
            }
        }

        loop {
            let buf = self.input.fill_buf()?;
            let len = buf.iter().take_while(|b| !b.is_ascii_whitespace()).count();
            let done = len < buf.len() || buf.is_empty();
            self.token.extend_from_slice(&buf[..len]);
            self.input.consume(len);
            if done {
                break;
            }
        }

        Ok(())
    }

    fn parse<T: Scalar>(&self) -> Result<T, BodyFault> {
        str::from_utf8(&self.token)
            .ok()
            .and_then(T::parse_ascii)
            .ok_or_else(|| invalid_literal(T::TYPE, &self.token))
    }
}

impl<R: BufRead> Deserializer for AsciiDeserializer<'_, R> {
    fn list_len(&mut self) -> Result<i64, BodyFault> {
        self.next_token()?;
        str::from_utf8(&self.token)
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .ok_or_else(|| invalid_literal(ScalarType::UChar, &self.token))
    }

    fn value(&mut self, ty: ScalarType, dst: &mut [u8]) -> Result<(), BodyFault> {
        self.next_token()?;
        with_scalar_type!(ty, T => self.parse::<T>()?.write_bytes::<NativeEndian>(dst));
        Ok(())
    }
}

fn invalid_literal(ty: ScalarType, token: &[u8]) -> BodyFault {
    // Limit size of error string
    let len = std::cmp::min(token.len(), 50);
    BodyFault::InvalidLiteral {
        ty,
        token: String::from_utf8_lossy(&token[..len]).into_owned(),
    }
}

/// Why reading one property value of a record failed.
enum RecordFault {
    Body(BodyFault),
    ListLen(i64),
}

impl From<BodyFault> for RecordFault {
    fn from(src: BodyFault) -> Self {
        RecordFault::Body(src)
    }
}

/// Fills all property buffers of `doc`: element by element, record by
/// record, property by property.
fn read_body(de: &mut impl Deserializer, doc: &mut Document) -> Result<(), Error> {
    for (element_name, element) in doc.elements_mut() {
        // Records without properties take up no space in the body
        if element.is_empty() {
            continue;
        }

        for record in 0..element.count() {
            for (property_name, property) in element.properties_mut() {
                read_value(de, property, record).map_err(|e| match e {
                    RecordFault::Body(fault) => fault.at(element_name, property_name, record),
                    RecordFault::ListLen(len) => Error::UnsupportedListLength {
                        element: element_name.to_string(),
                        property: property_name.to_string(),
                        len,
                    },
                })?;
            }
        }
    }

    Ok(())
}

fn read_value(
    de: &mut impl Deserializer,
    property: &mut PropertyArray,
    record: usize,
) -> Result<(), RecordFault> {
    let ty = property.scalar_type();
    let stride = property.stride();

    if property.is_list() {
        let len = de.list_len()?;
        if len != LIST_LEN as i64 {
            return Err(RecordFault::ListLen(len));
        }

        let start = record * LIST_LEN * stride;
        de.values(ty, &mut property.as_bytes_mut()[start..start + LIST_LEN * stride])?;
    } else {
        let start = record * stride;
        de.value(ty, &mut property.as_bytes_mut()[start..start + stride])?;
    }

    Ok(())
}
