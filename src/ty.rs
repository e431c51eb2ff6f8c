//! The eight scalar types PLY knows about and the [`Scalar`] trait mapping
//! them to Rust's primitive types.

use std::{
    fmt,
    str::FromStr,
};

use byteorder::ByteOrder;

use crate::Error;


/// A primitive PLY type. There are 8 in total, 2 floating point types, 3
/// signed and 3 unsigned integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Char,
    UChar,
    Short,
    UShort,
    Int,
    UInt,
    Float,
    Double,
}

impl ScalarType {
    /// Returns the canonical type name used in the header (e.g. `short` for
    /// `i16`). Aliases like `int16` are accepted when parsing, but never
    /// emitted.
    pub fn ply_type_name(&self) -> &'static str {
        match *self {
            ScalarType::Char => "char",
            ScalarType::UChar => "uchar",
            ScalarType::Short => "short",
            ScalarType::UShort => "ushort",
            ScalarType::Int => "int",
            ScalarType::UInt => "uint",
            ScalarType::Float => "float",
            ScalarType::Double => "double",
        }
    }

    /// Returns the number of bytes this type occupies.
    pub const fn size(&self) -> usize {
        match self {
            ScalarType::Char => 1,
            ScalarType::UChar => 1,
            ScalarType::Short => 2,
            ScalarType::UShort => 2,
            ScalarType::Int => 4,
            ScalarType::UInt => 4,
            ScalarType::Float => 4,
            ScalarType::Double => 8,
        }
    }

    /// Returns `true` if and only if the type is either `float` or `double`.
    pub fn is_floating_point(&self) -> bool {
        *self == ScalarType::Float || *self == ScalarType::Double
    }

    /// Returns `true` if and only if the type is one of `uchar`, `ushort` or
    /// `uint`.
    pub fn is_unsigned_integer(&self) -> bool {
        match self {
            ScalarType::UChar | ScalarType::UShort | ScalarType::UInt => true,
            _ => false,
        }
    }

    /// Returns `true` if and only if the type is one of `char`, `short` or
    /// `int`.
    pub fn is_signed_integer(&self) -> bool {
        match self {
            ScalarType::Char | ScalarType::Short | ScalarType::Int => true,
            _ => false,
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(self.ply_type_name())
    }
}

impl FromStr for ScalarType {
    type Err = Error;

    /// Parses a type name from a header. Two-word names like `unsigned char`
    /// have to be passed with a single space between the words.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "char" | "int8" => Ok(ScalarType::Char),
            "uchar" | "uint8" | "unsigned char" => Ok(ScalarType::UChar),
            "short" | "int16" => Ok(ScalarType::Short),
            "ushort" | "uint16" | "unsigned short" => Ok(ScalarType::UShort),
            "int" | "int32" => Ok(ScalarType::Int),
            "uint" | "uint32" | "unsigned int" => Ok(ScalarType::UInt),
            "float" | "float32" => Ok(ScalarType::Float),
            "double" | "float64" => Ok(ScalarType::Double),
            other => Err(Error::UnknownType(other.to_string())),
        }
    }
}


// ===========================================================================
// ===== `Scalar` trait
// ===========================================================================

mod internal {
    pub trait Sealed {}
}

/// A Rust primitive type that corresponds to one PLY [`ScalarType`].
///
/// This trait is implemented for `i8`, `u8`, `i16`, `u16`, `i32`, `u32`,
/// `f32` and `f64` and cannot be implemented outside of this crate. It is the
/// bridge between the untyped byte buffers of
/// [`PropertyArray`][crate::PropertyArray] and typed values.
pub trait Scalar:
    Copy + Default + PartialEq + fmt::Debug + fmt::Display + Send + Sync + 'static
    + internal::Sealed
{
    /// The PLY type of `Self`.
    const TYPE: ScalarType;

    /// Decodes a value from the first `Self::TYPE.size()` bytes of `buf`,
    /// which are interpreted in byte order `B`.
    ///
    /// Panics if `buf` is too short.
    fn read_bytes<B: ByteOrder>(buf: &[u8]) -> Self;

    /// Encodes `self` in byte order `B` into the first `Self::TYPE.size()`
    /// bytes of `buf`.
    ///
    /// Panics if `buf` is too short.
    fn write_bytes<B: ByteOrder>(self, buf: &mut [u8]);

    /// Parses an ASCII body token. Returns `None` if the token is not a valid
    /// literal or is out of range for `Self`.
    fn parse_ascii(token: &str) -> Option<Self>;
}

// Integers are parsed through an `i64` so that one-byte types are treated as
// numbers and out of range values are rejected instead of wrapped.
fn parse_integer<T: num_traits::NumCast>(token: &str) -> Option<T> {
    token.parse::<i64>().ok().and_then(num_traits::cast)
}

fn parse_float<T: FromStr>(token: &str) -> Option<T> {
    token.parse().ok()
}

macro_rules! impl_single_byte {
    ($ty:ident, $variant:ident) => {
        impl internal::Sealed for $ty {}
        impl Scalar for $ty {
            const TYPE: ScalarType = ScalarType::$variant;

            fn read_bytes<B: ByteOrder>(buf: &[u8]) -> Self {
                buf[0] as $ty
            }
            fn write_bytes<B: ByteOrder>(self, buf: &mut [u8]) {
                buf[0] = self as u8;
            }
            fn parse_ascii(token: &str) -> Option<Self> {
                parse_integer(token)
            }
        }
    }
}

macro_rules! impl_multi_byte {
    ($ty:ident, $variant:ident, $read:ident, $write:ident, $parse:ident) => {
        impl internal::Sealed for $ty {}
        impl Scalar for $ty {
            const TYPE: ScalarType = ScalarType::$variant;

            fn read_bytes<B: ByteOrder>(buf: &[u8]) -> Self {
                B::$read(buf)
            }
            fn write_bytes<B: ByteOrder>(self, buf: &mut [u8]) {
                B::$write(buf, self)
            }
            fn parse_ascii(token: &str) -> Option<Self> {
                $parse(token)
            }
        }
    }
}

impl_single_byte!(i8, Char);
impl_single_byte!(u8, UChar);
impl_multi_byte!(i16, Short, read_i16, write_i16, parse_integer);
impl_multi_byte!(u16, UShort, read_u16, write_u16, parse_integer);
impl_multi_byte!(i32, Int, read_i32, write_i32, parse_integer);
impl_multi_byte!(u32, UInt, read_u32, write_u32, parse_integer);
impl_multi_byte!(f32, Float, read_f32, write_f32, parse_float);
impl_multi_byte!(f64, Double, read_f64, write_f64, parse_float);
