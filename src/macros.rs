/// Dispatches on a runtime [`ScalarType`][crate::ScalarType] and evaluates
/// `$body` with `$t` being the corresponding Rust type.
///
/// ```ignore
/// let v = with_scalar_type!(ty, T => T::read_bytes::<NativeEndian>(bytes).to_string());
/// ```
macro_rules! with_scalar_type {
    ($ty:expr, $t:ident => $body:expr) => {
        match $ty {
            $crate::ty::ScalarType::Char => { type $t = i8; $body }
            $crate::ty::ScalarType::UChar => { type $t = u8; $body }
            $crate::ty::ScalarType::Short => { type $t = i16; $body }
            $crate::ty::ScalarType::UShort => { type $t = u16; $body }
            $crate::ty::ScalarType::Int => { type $t = i32; $body }
            $crate::ty::ScalarType::UInt => { type $t = u32; $body }
            $crate::ty::ScalarType::Float => { type $t = f32; $body }
            $crate::ty::ScalarType::Double => { type $t = f64; $body }
        }
    }
}
