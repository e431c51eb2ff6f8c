use std::io::Cursor;

use failure::Error;

use crate::{
    Encoding,
    data::Document,
    error::{BodyFault, Error as PlyError},
    ty::ScalarType,
};
use super::Reader;


fn read(input: &[u8]) -> Result<Document, PlyError> {
    Reader::new(Cursor::new(input))?.read()
}

fn foreign_binary() -> Encoding {
    match Encoding::binary_native() {
        Encoding::BinaryLittleEndian => Encoding::BinaryBigEndian,
        _ => Encoding::BinaryLittleEndian,
    }
}

fn native_header(body: &str) -> Vec<u8> {
    format!("ply\nformat {} 1.0\n{}", Encoding::binary_native(), body).into_bytes()
}

const TRIANGLE: &[u8] = b"\
    ply\n\
    format ascii 1.0\n\
    comment made by hand\n\
    element vertex 3\n\
    property float x\n\
    property float y\n\
    property float z\n\
    element face 1\n\
    property list uchar int vertex_indices\n\
    end_header\n\
    0 0 0\n\
    1 0 0\n\
    0 1 0\n\
    3 0 1 2\n\
";

#[test]
fn ascii_triangle() -> Result<(), Error> {
    let reader = Reader::new(Cursor::new(TRIANGLE))?;
    assert_eq!(reader.encoding(), Encoding::Ascii);
    assert_eq!(reader.comments(), &["made by hand".to_string()]);

    let doc = reader.read()?;
    assert_eq!(doc.element_names().collect::<Vec<_>>(), ["vertex", "face"]);

    let vertex = doc.element("vertex").unwrap();
    assert_eq!(vertex.count(), 3);
    assert_eq!(vertex.property_names().collect::<Vec<_>>(), ["x", "y", "z"]);
    assert_eq!(vertex.property("x").unwrap().to_vec::<f32>()?, [0.0, 1.0, 0.0]);
    assert_eq!(vertex.property("y").unwrap().to_vec::<f32>()?, [0.0, 0.0, 1.0]);
    assert_eq!(vertex.property("z").unwrap().to_vec::<f32>()?, [0.0, 0.0, 0.0]);

    let face = doc.element("face").unwrap();
    let indices = face.property("vertex_indices").unwrap();
    assert!(indices.is_list());
    assert_eq!(indices.scalar_type(), ScalarType::Int);
    assert_eq!(indices.len(), 3);
    assert_eq!(indices.lists::<i32>()?, [[0, 1, 2]]);

    Ok(())
}

#[test]
fn header_only() -> Result<(), Error> {
    let reader = Reader::new(Cursor::new(TRIANGLE))?;
    let header = reader.header();

    assert_eq!(header.len(), 2);
    let x = header.element("vertex").unwrap().property("x").unwrap();
    assert_eq!(x.len(), 3);
    assert!(x.to_vec::<f32>()?.iter().all(|&v| v == 0.0));

    Ok(())
}

#[test]
fn crlf_and_aliases() -> Result<(), Error> {
    let input = b"ply\r\n\
        format ascii 1.0\r\n\
        obj_info generated somewhere\r\n\
        element point 2\r\n\
        property unsigned char a\r\n\
        property uint16 b\r\n\
        property int8 c\r\n\
        property float64 d\r\n\
        end_header\r\n\
        255 65535 -128 0.5\r\n\
        0 1 127 -1e10\r\n";

    let doc = read(input)?;
    let point = doc.element("point").unwrap();
    assert_eq!(point.property("a").unwrap().to_vec::<u8>()?, [255, 0]);
    assert_eq!(point.property("b").unwrap().to_vec::<u16>()?, [65535, 1]);
    assert_eq!(point.property("c").unwrap().to_vec::<i8>()?, [-128, 127]);
    assert_eq!(point.property("d").unwrap().to_vec::<f64>()?, [0.5, -1e10]);

    Ok(())
}

#[test]
fn ascii_tokens_ignore_line_structure() -> Result<(), Error> {
    let input = b"ply\nformat ascii 1.0\nelement v 2\nproperty int a\nproperty int b\n\
        end_header\n1\n2 3\t\t4";

    let doc = read(input)?;
    let v = doc.element("v").unwrap();
    assert_eq!(v.property("a").unwrap().to_vec::<i32>()?, [1, 3]);
    assert_eq!(v.property("b").unwrap().to_vec::<i32>()?, [2, 4]);

    Ok(())
}

#[test]
fn empty_element() -> Result<(), Error> {
    let input = b"ply\nformat ascii 1.0\nelement vertex 0\nproperty float x\nend_header\n";
    let doc = read(input)?;
    assert_eq!(doc.element("vertex").unwrap().count(), 0);
    assert!(doc.element("vertex").unwrap().property("x").unwrap().is_empty());

    Ok(())
}

#[test]
fn binary_native() -> Result<(), Error> {
    let mut input = native_header(
        "element vertex 2\nproperty short a\nproperty double b\n\
        element face 1\nproperty list uchar uint idx\nend_header\n"
    );
    input.extend_from_slice(&(-7i16).to_ne_bytes());
    input.extend_from_slice(&1.5f64.to_ne_bytes());
    input.extend_from_slice(&300i16.to_ne_bytes());
    input.extend_from_slice(&(-0.25f64).to_ne_bytes());
    input.push(3);
    for i in &[4u32, 5, 6] {
        input.extend_from_slice(&i.to_ne_bytes());
    }

    let doc = read(&input)?;
    let vertex = doc.element("vertex").unwrap();
    assert_eq!(vertex.property("a").unwrap().to_vec::<i16>()?, [-7, 300]);
    assert_eq!(vertex.property("b").unwrap().to_vec::<f64>()?, [1.5, -0.25]);
    assert_eq!(doc.element("face").unwrap().property("idx").unwrap().lists::<u32>()?, [[4, 5, 6]]);

    Ok(())
}

// ===========================================================================
// ===== Errors
// ===========================================================================

#[test]
fn bad_magic() {
    assert!(matches!(read(b"plx\nformat ascii 1.0\nend_header\n"), Err(PlyError::BadMagic)));
    assert!(matches!(read(b""), Err(PlyError::BadMagic)));
}

#[test]
fn unknown_format() {
    let res = read(b"ply\nformat binary_middle_endian 1.0\nend_header\n");
    match res {
        Err(PlyError::UnknownFormat(name)) => assert_eq!(name, "binary_middle_endian"),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn missing_end_header() {
    let res = read(b"ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\n");
    assert!(matches!(res, Err(PlyError::HeaderParse { .. })));
}

#[test]
fn missing_format() {
    let res = read(b"ply\nelement vertex 0\nend_header\n");
    assert!(matches!(res, Err(PlyError::HeaderParse { .. })));
}

#[test]
fn property_before_element() {
    let res = read(b"ply\nformat ascii 1.0\nproperty float x\nend_header\n");
    match res {
        Err(PlyError::NoCurrentElement { property, line }) => {
            assert_eq!(property, "x");
            assert_eq!(line, 3);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn invalid_count() {
    for count in &["-1", "abc", "1.5"] {
        let input = format!("ply\nformat ascii 1.0\nelement vertex {}\nend_header\n", count);
        match read(input.as_bytes()) {
            Err(PlyError::InvalidCount { element, count: c }) => {
                assert_eq!(element, "vertex");
                assert_eq!(&c, count);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}

#[test]
fn unknown_type() {
    let res = read(b"ply\nformat ascii 1.0\nelement vertex 1\nproperty half x\nend_header\n0\n");
    match res {
        Err(PlyError::UnknownType(ty)) => assert_eq!(ty, "half"),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn unsupported_list_count_type() {
    let res = read(b"ply\nformat ascii 1.0\nelement face 1\n\
        property list int int vertex_indices\nend_header\n3 0 1 2\n");
    match res {
        Err(PlyError::UnsupportedListCountType { property, ty }) => {
            assert_eq!(property, "vertex_indices");
            assert_eq!(ty, ScalarType::Int);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn malformed_property_line_is_ignored() {
    // A `property` line with the wrong number of words is not a property
    let input = b"ply\nformat ascii 1.0\nelement v 1\nproperty float x extra\nend_header\n";
    let doc = read(input).unwrap();
    assert_eq!(doc.element("v").unwrap().len(), 0);
}

#[test]
fn unsupported_list_length_ascii() {
    let res = read(b"ply\nformat ascii 1.0\nelement face 1\n\
        property list uchar int vertex_indices\nend_header\n4 0 1 2 3\n");
    match res {
        Err(PlyError::UnsupportedListLength { element, property, len }) => {
            assert_eq!(element, "face");
            assert_eq!(property, "vertex_indices");
            assert_eq!(len, 4);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn unsupported_list_length_binary() {
    let mut input = native_header("element face 1\nproperty list uchar int idx\nend_header\n");
    input.push(4);
    input.extend_from_slice(&[0; 16]);

    match read(&input) {
        Err(PlyError::UnsupportedListLength { len, .. }) => assert_eq!(len, 4),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn endianness_mismatch() {
    let foreign = foreign_binary();
    let input = format!("ply\nformat {} 1.0\nelement v 1\nproperty int a\nend_header\n", foreign);

    // The header can still be inspected
    let reader = Reader::new(Cursor::new(input.as_bytes())).unwrap();
    assert_eq!(reader.encoding(), foreign);

    match reader.read() {
        Err(PlyError::EndiannessMismatch { file, host }) => {
            assert_eq!(file, foreign);
            assert_eq!(host, Encoding::binary_native());
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn trailing_data() {
    let mut input = native_header("element v 1\nproperty uchar a\nend_header\n");
    input.push(7);
    assert!(read(&input).is_ok());

    input.push(8);
    assert!(matches!(read(&input), Err(PlyError::TrailingData)));
}

#[test]
fn truncated_binary_body() {
    let mut input = native_header("element v 2\nproperty int a\nproperty int b\nend_header\n");
    input.extend_from_slice(&1i32.to_ne_bytes());
    input.extend_from_slice(&2i32.to_ne_bytes());
    input.extend_from_slice(&3i32.to_ne_bytes());

    match read(&input) {
        Err(PlyError::Body { element, property, record, cause: BodyFault::UnexpectedEof }) => {
            assert_eq!(element, "v");
            assert_eq!(property, "b");
            assert_eq!(record, 1);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn truncated_ascii_body() {
    let res = read(b"ply\nformat ascii 1.0\nelement v 2\nproperty int a\nend_header\n5\n");
    match res {
        Err(PlyError::Body { record, cause: BodyFault::UnexpectedEof, .. }) => {
            assert_eq!(record, 1);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn invalid_literals() {
    let cases: &[(&str, &str)] = &[
        ("uchar", "256"),
        ("uchar", "-1"),
        ("char", "128"),
        ("int", "1.5"),
        ("float", "abc"),
        ("ushort", "0x10"),
    ];

    for &(ty, token) in cases {
        let input = format!(
            "ply\nformat ascii 1.0\nelement v 1\nproperty {} a\nend_header\n{}\n",
            ty,
            token,
        );
        match read(input.as_bytes()) {
            Err(PlyError::Body { property, cause: BodyFault::InvalidLiteral { token: t, .. }, .. }) => {
                assert_eq!(property, "a");
                assert_eq!(t, token);
            }
            other => panic!("unexpected result for {} {}: {:?}", ty, token, other),
        }
    }
}

#[test]
fn duplicate_names() {
    let res = read(b"ply\nformat ascii 1.0\nelement v 1\nproperty int a\nproperty int a\n\
        end_header\n1 2\n");
    assert!(matches!(res, Err(PlyError::DuplicateName { kind: "property", .. })));

    let res = read(b"ply\nformat ascii 1.0\nelement v 0\nelement v 0\nend_header\n");
    assert!(matches!(res, Err(PlyError::DuplicateName { kind: "element", .. })));
}

#[test]
fn unallocatable_count() {
    let res = read(b"ply\nformat ascii 1.0\nelement vertex 1000000000000000\n\
        property float x\nend_header\n");
    match res {
        Err(PlyError::InvalidCount { element, count }) => {
            assert_eq!(element, "vertex");
            assert_eq!(count, "1000000000000000");
        }
        other => panic!("unexpected result: {:?}", other),
    }

    // Overflows when multiplied with the list length
    let input = format!(
        "ply\nformat ascii 1.0\nelement face {}\nproperty list uchar int vertex_indices\nend_header\n",
        usize::MAX / 2,
    );
    match read(input.as_bytes()) {
        Err(PlyError::InvalidCount { element, .. }) => assert_eq!(element, "face"),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn huge_element_without_properties() -> Result<(), Error> {
    let input = format!(
        "ply\nformat {} 1.0\nelement junk {}\nelement vertex 1\nproperty uchar x\nend_header\n",
        Encoding::binary_native(),
        usize::MAX,
    );
    let mut input = input.into_bytes();
    input.push(7);

    let doc = read(&input)?;
    let junk = doc.element("junk").unwrap();
    assert_eq!(junk.count(), usize::MAX);
    assert!(junk.is_empty());
    assert_eq!(doc.element("vertex").unwrap().property("x").unwrap().to_vec::<u8>()?, [7]);

    Ok(())
}

#[test]
fn property_with_unknown_type_before_element() {
    let inputs: &[&[u8]] = &[
        b"ply\nformat ascii 1.0\nproperty foo x\nend_header\n",
        b"ply\nformat ascii 1.0\nproperty list foo bar x\nend_header\n",
    ];
    for input in inputs {
        match read(input) {
            Err(PlyError::NoCurrentElement { property, line }) => {
                assert_eq!(property, "x");
                assert_eq!(line, 3);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
