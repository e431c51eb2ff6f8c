//! Converting between property columns and fixed-width records.
//!
//! A PLY file stores data column by column (one [`PropertyArray`] per
//! property), but most consumers want records like `[x, y, z]`. [`pack`]
//! gathers `N` columns of the same scalar type into records of type
//! `[T; N]`, [`unpack`] is the inverse.
//!
//! ```
//! use plydoc::{pack::pack, ElementArray, PropertyArray};
//!
//! let mut vertex = ElementArray::new(2);
//! vertex.add_property("u", PropertyArray::from_values(&[0.0f32, 0.5]))?;
//! vertex.add_property("v", PropertyArray::from_values(&[1.0f32, 0.25]))?;
//!
//! let uvs = pack::<f32, 2>([vertex.property("u"), vertex.property("v")])?;
//! assert_eq!(uvs, [[0.0, 1.0], [0.5, 0.25]]);
//! # Ok::<(), plydoc::Error>(())
//! ```

use std::array;

use crate::{
    Error,
    data::{Document, ElementArray, PropertyArray},
    ty::Scalar,
};


/// Gathers `N` non-list columns of type `T` into records.
///
/// Record `i` is `[columns[0][i], ..., columns[N - 1][i]]`. Fails with
/// [`Error::MissingOrInconsistentProperty`] if a column is missing, is a
/// list, has another scalar type or another length than the first column.
pub fn pack<T: Scalar, const N: usize>(
    columns: [Option<&PropertyArray>; N],
) -> Result<Vec<[T; N]>, Error> {
    let mut size = None;
    for (i, column) in columns.iter().enumerate() {
        let column = column.ok_or_else(|| {
            Error::MissingOrInconsistentProperty(format!("column {} is missing", i))
        })?;

        if column.is_list() {
            return Err(Error::MissingOrInconsistentProperty(
                format!("column {} is a list", i),
            ));
        }
        if !column.is_of_type::<T>() {
            return Err(Error::MissingOrInconsistentProperty(format!(
                "column {} has type '{}', but '{}' was requested",
                i,
                column.scalar_type(),
                T::TYPE,
            )));
        }

        let expected = *size.get_or_insert(column.len());
        if column.len() != expected {
            return Err(Error::MissingOrInconsistentProperty(format!(
                "column {} has {} values, but column 0 has {}",
                i,
                column.len(),
                expected,
            )));
        }
    }

    let size = size.unwrap_or(0);
    let mut out = vec![[T::default(); N]; size];
    for (j, column) in columns.iter().enumerate() {
        if let Some(column) = column {
            for (record, value) in out.iter_mut().zip(column.iter::<T>()?) {
                record[j] = value;
            }
        }
    }

    Ok(out)
}

/// Scatters records into `N` fresh non-list columns of type `T`.
///
/// Component `j` of every record ends up in column `j`.
pub fn unpack<T: Scalar, const N: usize>(records: &[[T; N]]) -> [PropertyArray; N] {
    array::from_fn(|j| {
        PropertyArray::collect(records.iter().map(|r| r[j]), records.len(), false)
    })
}


// ===========================================================================
// ===== Point clouds
// ===========================================================================

const POSITION: [&str; 3] = ["x", "y", "z"];
const NORMAL: [&str; 3] = ["nx", "ny", "nz"];

fn vertex_triples<T: Scalar>(doc: &Document, names: [&str; 3]) -> Result<Vec<[T; 3]>, Error> {
    let vertex = doc.element("vertex")
        .ok_or_else(|| Error::MissingElement("vertex".into()))?;

    if vertex.count() == 0 {
        return Ok(vec![]);
    }

    let [a, b, c] = names;
    pack([vertex.property(a), vertex.property(b), vertex.property(c)])
}

fn add_triple<T: Scalar>(
    vertex: &mut ElementArray,
    names: [&str; 3],
    triples: &[[T; 3]],
) -> Result<(), Error> {
    for (name, column) in names.iter().zip(IntoIterator::into_iter(unpack(triples))) {
        vertex.add_property(*name, column)?;
    }

    Ok(())
}

/// Returns the `x`, `y` and `z` properties of the `vertex` element as
/// points.
///
/// Fails with [`Error::MissingElement`] if there is no `vertex` element. A
/// `vertex` element without records yields an empty cloud, even if it does
/// not declare positions.
pub fn to_point_cloud<T: Scalar>(doc: &Document) -> Result<Vec<[T; 3]>, Error> {
    vertex_triples(doc, POSITION)
}

/// Like [`to_point_cloud`], but for the `nx`, `ny` and `nz` properties.
pub fn to_normal_cloud<T: Scalar>(doc: &Document) -> Result<Vec<[T; 3]>, Error> {
    vertex_triples(doc, NORMAL)
}

/// Creates a document with a single `vertex` element with `x`, `y` and `z`
/// properties.
pub fn from_point_cloud<T: Scalar>(points: &[[T; 3]]) -> Result<Document, Error> {
    let mut vertex = ElementArray::new(points.len());
    add_triple(&mut vertex, POSITION, points)?;

    let mut doc = Document::new();
    doc.add_element("vertex", vertex)?;
    Ok(doc)
}

/// Creates a document with a single `vertex` element with positions
/// (`x`, `y`, `z`) and normals (`nx`, `ny`, `nz`).
///
/// Fails with [`Error::MissingOrInconsistentProperty`] if there are not as
/// many normals as points.
pub fn from_point_cloud_and_normals<T: Scalar>(
    points: &[[T; 3]],
    normals: &[[T; 3]],
) -> Result<Document, Error> {
    if points.len() != normals.len() {
        return Err(Error::MissingOrInconsistentProperty(format!(
            "{} points, but {} normals",
            points.len(),
            normals.len(),
        )));
    }

    let mut vertex = ElementArray::new(points.len());
    add_triple(&mut vertex, POSITION, points)?;
    add_triple(&mut vertex, NORMAL, normals)?;

    let mut doc = Document::new();
    doc.add_element("vertex", vertex)?;
    Ok(doc)
}
