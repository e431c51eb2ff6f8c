use std::io;

use failure::Fail;

use crate::{
    Encoding,
    ty::ScalarType,
};


/// Everything that can go wrong while reading, writing or repacking PLY data.
///
/// All errors are fatal for the operation that returned them. A failed load
/// never returns a partially filled document.
#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "IO error: {}", _0)]
    Io(#[cause] io::Error),

    #[fail(display = "not a valid PLY file (does not start with \"ply\")")]
    BadMagic,

    #[fail(
        display = "unknown PLY format '{}' (expected \"ascii\", \"binary_little_endian\" \
            or \"binary_big_endian\")",
        _0,
    )]
    UnknownFormat(String),

    #[fail(display = "invalid PLY header (line {}): {}", line, msg)]
    HeaderParse {
        line: usize,
        msg: String,
    },

    #[fail(
        display = "property '{}' is defined before any element (line {})",
        property,
        line,
    )]
    NoCurrentElement {
        property: String,
        line: usize,
    },

    #[fail(display = "invalid count '{}' for element '{}'", count, element)]
    InvalidCount {
        element: String,
        count: String,
    },

    #[fail(display = "\"{}\" is not a valid PLY scalar type", _0)]
    UnknownType(String),

    #[fail(
        display = "list property '{}' uses '{}' as count type (only 'uchar' is supported)",
        property,
        ty,
    )]
    UnsupportedListCountType {
        property: String,
        ty: ScalarType,
    },

    #[fail(
        display = "binary encoding '{}' does not match the byte order of this machine ('{}')",
        file,
        host,
    )]
    EndiannessMismatch {
        file: Encoding,
        host: Encoding,
    },

    #[fail(
        display = "list of property '{}' (element '{}') has {} entries (only lists of \
            exactly 3 values are supported)",
        property,
        element,
        len,
    )]
    UnsupportedListLength {
        element: String,
        property: String,
        len: i64,
    },

    #[fail(display = "expected end of file, but additional data was found")]
    TrailingData,

    #[fail(display = "missing or inconsistent property: {}", _0)]
    MissingOrInconsistentProperty(String),

    #[fail(
        display = "failed to process property '{}' of element '{}' (record {}): {}",
        property,
        element,
        record,
        cause,
    )]
    Body {
        element: String,
        property: String,
        record: usize,
        #[cause]
        cause: BodyFault,
    },

    #[fail(display = "property has type '{}', but '{}' was requested", found, expected)]
    TypeMismatch {
        expected: ScalarType,
        found: ScalarType,
    },

    #[fail(display = "no '{}' element in document", _0)]
    MissingElement(String),

    #[fail(display = "{} '{}' is defined more than once", kind, name)]
    DuplicateName {
        kind: &'static str,
        name: String,
    },

    #[fail(display = "'{}' is not a valid element or property name", _0)]
    InvalidName(String),
}

impl From<io::Error> for Error {
    fn from(src: io::Error) -> Self {
        Error::Io(src)
    }
}

/// The reason a single value in the body could not be read or written.
///
/// This is always wrapped in [`Error::Body`], which names the element,
/// property and record the value belongs to.
#[derive(Debug, Fail)]
pub enum BodyFault {
    #[fail(display = "IO error: {}", _0)]
    Io(#[cause] io::Error),

    #[fail(display = "unexpected end of file")]
    UnexpectedEof,

    #[fail(display = "invalid '{}' literal \"{}\"", ty, token)]
    InvalidLiteral {
        ty: ScalarType,
        token: String,
    },
}

impl BodyFault {
    /// Attaches the position in the body to this fault.
    pub(crate) fn at(self, element: &str, property: &str, record: usize) -> Error {
        Error::Body {
            element: element.to_string(),
            property: property.to_string(),
            record,
            cause: self,
        }
    }
}

impl From<io::Error> for BodyFault {
    fn from(src: io::Error) -> Self {
        match src.kind() {
            io::ErrorKind::UnexpectedEof => BodyFault::UnexpectedEof,
            _ => BodyFault::Io(src),
        }
    }
}
