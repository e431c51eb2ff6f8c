//! The in-memory representation of a PLY file: a [`Document`] holds named
//! [`ElementArray`]s which in turn hold named, column-wise
//! [`PropertyArray`]s.
//!
//! All name-keyed collections preserve insertion order, as the order of
//! elements and properties in the header determines the layout of the body.

use std::fmt;

use byteorder::NativeEndian;
use static_assertions::const_assert;

use crate::{
    Error,
    ty::{Scalar, ScalarType},
};


/// The number of values in every list property. Lists are written with a
/// `uchar` count, so this has to fit into a `u8`.
pub const LIST_LEN: usize = 3;

const_assert!(LIST_LEN <= u8::MAX as usize);

/// Element and property names end up as single words in the header.
fn check_name(name: &str) -> Result<(), Error> {
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(Error::InvalidName(name.to_string()));
    }

    Ok(())
}


// ===========================================================================
// ===== NamedVec
// ===========================================================================

/// A list of values that can be accessed by name for convenience.
///
/// Lookup is linear. Files usually have a handful of elements with a handful
/// of properties each, so this is not worth a hash map (which would also lose
/// the order).
#[derive(Debug, Clone, PartialEq)]
pub struct NamedVec<T> {
    entries: Vec<(String, T)>,
}

impl<T> NamedVec<T> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the index of the entry with the given name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(n, _)| n == name)
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut T> {
        self.entries.iter_mut().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> + '_ {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut T)> + '_ {
        self.entries.iter_mut().map(|(n, v)| (n.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Appends an entry. `kind` is only used for the error message.
    pub(crate) fn push(&mut self, kind: &'static str, name: String, value: T) -> Result<(), Error> {
        check_name(&name)?;
        if self.position(&name).is_some() {
            return Err(Error::DuplicateName { kind, name });
        }

        self.entries.push((name, value));
        Ok(())
    }
}

impl<T> Default for NamedVec<T> {
    fn default() -> Self {
        Self::new()
    }
}


// ===========================================================================
// ===== PropertyArray
// ===========================================================================

/// The values of one property for all records of an element, stored as a
/// densely packed, native-endian byte buffer tagged with its scalar type.
///
/// For list properties, the buffer holds `LIST_LEN` values per record, one
/// list after another. Typed access goes through [`Scalar`] and fails with
/// [`Error::TypeMismatch`] if the requested type is not the stored one.
#[derive(Clone, PartialEq)]
pub struct PropertyArray {
    data: Vec<u8>,
    ty: ScalarType,
    is_list: bool,
}

impl PropertyArray {
    /// Creates a zero-filled array holding `len` scalars of type `ty`.
    pub fn new(ty: ScalarType, len: usize, is_list: bool) -> Self {
        Self {
            data: vec![0; len * ty.size()],
            ty,
            is_list,
        }
    }

    /// Like [`PropertyArray::new`], but returns `None` instead of aborting if
    /// the buffer cannot be allocated.
    pub(crate) fn try_new(ty: ScalarType, len: usize, is_list: bool) -> Option<Self> {
        let bytes = len.checked_mul(ty.size())?;
        let mut data = Vec::new();
        data.try_reserve_exact(bytes).ok()?;
        data.resize(bytes, 0);

        Some(Self { data, ty, is_list })
    }

    /// Creates a non-list array from the given values.
    pub fn from_values<T: Scalar>(values: &[T]) -> Self {
        Self::collect(values.iter().copied(), values.len(), false)
    }

    /// Creates a list array with one list per record.
    pub fn from_lists<T: Scalar>(lists: &[[T; LIST_LEN]]) -> Self {
        Self::collect(lists.iter().flatten().copied(), lists.len() * LIST_LEN, true)
    }

    pub(crate) fn collect<T: Scalar>(
        values: impl Iterator<Item = T>,
        len: usize,
        is_list: bool,
    ) -> Self {
        let mut out = Self::new(T::TYPE, len, is_list);
        let stride = out.stride();
        for (chunk, v) in out.data.chunks_exact_mut(stride).zip(values) {
            v.write_bytes::<NativeEndian>(chunk);
        }

        out
    }

    pub fn scalar_type(&self) -> ScalarType {
        self.ty
    }

    /// Number of bytes of a single scalar.
    pub fn stride(&self) -> usize {
        self.ty.size()
    }

    pub fn is_list(&self) -> bool {
        self.is_list
    }

    /// Number of scalars (not records!) stored in this array.
    pub fn len(&self) -> usize {
        self.data.len() / self.stride()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The raw native-endian data.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// The raw native-endian data. The length cannot be changed through this.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Returns `true` if the values are stored as `T`.
    pub fn is_of_type<T: Scalar>(&self) -> bool {
        T::TYPE == self.ty
    }

    fn check_type<T: Scalar>(&self) -> Result<(), Error> {
        if self.is_of_type::<T>() {
            Ok(())
        } else {
            Err(Error::TypeMismatch { expected: T::TYPE, found: self.ty })
        }
    }

    /// Returns the `i`-th scalar.
    ///
    /// Panics if `i >= self.len()`.
    pub fn get<T: Scalar>(&self, i: usize) -> Result<T, Error> {
        self.check_type::<T>()?;
        let stride = self.stride();
        Ok(T::read_bytes::<NativeEndian>(&self.data[i * stride..(i + 1) * stride]))
    }

    /// Overwrites the `i`-th scalar.
    ///
    /// Panics if `i >= self.len()`.
    pub fn set<T: Scalar>(&mut self, i: usize, value: T) -> Result<(), Error> {
        self.check_type::<T>()?;
        let stride = self.stride();
        value.write_bytes::<NativeEndian>(&mut self.data[i * stride..(i + 1) * stride]);
        Ok(())
    }

    /// Returns an iterator over all scalars.
    pub fn iter<T: Scalar>(&self) -> Result<impl Iterator<Item = T> + '_, Error> {
        self.check_type::<T>()?;
        Ok(self.data.chunks_exact(self.stride()).map(T::read_bytes::<NativeEndian>))
    }

    /// Copies all scalars into a new vector.
    pub fn to_vec<T: Scalar>(&self) -> Result<Vec<T>, Error> {
        Ok(self.iter()?.collect())
    }

    /// Returns the values of a list property grouped by record.
    pub fn lists<T: Scalar>(&self) -> Result<Vec<[T; LIST_LEN]>, Error> {
        if !self.is_list {
            return Err(Error::MissingOrInconsistentProperty(
                "lists requested from a non-list property".into()
            ));
        }

        let values = self.to_vec::<T>()?;
        let out = values.chunks_exact(LIST_LEN)
            .map(|c| {
                let mut list = [T::default(); LIST_LEN];
                list.copy_from_slice(c);
                list
            })
            .collect();

        Ok(out)
    }

    /// The number of scalars this property needs for `count` records.
    pub(crate) fn expected_len(&self, count: usize) -> usize {
        if self.is_list { count * LIST_LEN } else { count }
    }
}

impl fmt::Debug for PropertyArray {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PropertyArray")
            .field("ty", &self.ty)
            .field("is_list", &self.is_list)
            .field("len", &self.len())
            .finish()
    }
}


// ===========================================================================
// ===== ElementArray and Document
// ===========================================================================

/// All properties of one element, e.g. `vertex`. Every property holds
/// exactly `count` records.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementArray {
    count: usize,
    properties: NamedVec<PropertyArray>,
}

impl ElementArray {
    /// Creates an element with `count` records and no properties yet.
    pub fn new(count: usize) -> Self {
        Self {
            count,
            properties: NamedVec::new(),
        }
    }

    /// Number of records.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Appends a property. Fails if the array does not hold exactly `count`
    /// records, or if the name is invalid or already taken.
    pub fn add_property(
        &mut self,
        name: impl Into<String>,
        property: PropertyArray,
    ) -> Result<(), Error> {
        let name = name.into();
        let expected = property.expected_len(self.count);
        if property.len() != expected {
            return Err(Error::MissingOrInconsistentProperty(format!(
                "property '{}' holds {} values, but {} records need {}",
                name,
                property.len(),
                self.count,
                expected,
            )));
        }

        self.properties.push("property", name, property)
    }

    pub fn property(&self, name: &str) -> Option<&PropertyArray> {
        self.properties.get(name)
    }

    pub fn property_mut(&mut self, name: &str) -> Option<&mut PropertyArray> {
        self.properties.get_mut(name)
    }

    /// All properties in header order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &PropertyArray)> + '_ {
        self.properties.iter()
    }

    pub(crate) fn properties_mut(
        &mut self,
    ) -> impl Iterator<Item = (&str, &mut PropertyArray)> + '_ {
        self.properties.iter_mut()
    }

    pub fn property_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.properties.names()
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// A complete PLY file in memory: its elements in file order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    elements: NamedVec<ElementArray>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an element. Elements are written in the order they were
    /// added.
    pub fn add_element(
        &mut self,
        name: impl Into<String>,
        element: ElementArray,
    ) -> Result<(), Error> {
        self.elements.push("element", name.into(), element)
    }

    pub fn element(&self, name: &str) -> Option<&ElementArray> {
        self.elements.get(name)
    }

    pub fn element_mut(&mut self, name: &str) -> Option<&mut ElementArray> {
        self.elements.get_mut(name)
    }

    /// All elements in file order.
    pub fn elements(&self) -> impl Iterator<Item = (&str, &ElementArray)> + '_ {
        self.elements.iter()
    }

    pub(crate) fn elements_mut(
        &mut self,
    ) -> impl Iterator<Item = (&str, &mut ElementArray)> + '_ {
        self.elements.iter_mut()
    }

    pub fn element_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.elements.names()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
