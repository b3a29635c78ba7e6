//! Clamping numeric pixel values into the 8-bit display range.

use std::fmt::Display;

use ndarray::ArrayD;

use crate::error::{Error, Result};

use super::PixelArray;

/// Conversion of a pixel element into a display byte without wraparound.
pub trait ClipToU8: Copy + Display {
    /// Inclusive range of values that display without clipping.
    const RANGE: (&'static str, &'static str);

    fn clip_to_u8(self) -> u8;

    fn in_range(self) -> bool;
}

impl ClipToU8 for u8 {
    const RANGE: (&'static str, &'static str) = ("0", "255");

    #[inline]
    fn clip_to_u8(self) -> u8 {
        self
    }

    #[inline]
    fn in_range(self) -> bool {
        true
    }
}

impl ClipToU8 for i8 {
    const RANGE: (&'static str, &'static str) = ("0", "255");

    #[inline]
    #[allow(clippy::cast_sign_loss)]
    fn clip_to_u8(self) -> u8 {
        self.max(0) as u8
    }

    #[inline]
    fn in_range(self) -> bool {
        self >= 0
    }
}

macro_rules! clip_integer {
    ($($ty:ty),*) => {
        $(
            impl ClipToU8 for $ty {
                const RANGE: (&'static str, &'static str) = ("0", "255");

                #[inline]
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                fn clip_to_u8(self) -> u8 {
                    // Safe: clamped to [0, 255] before casting
                    self.clamp(0, 255) as u8
                }

                #[inline]
                fn in_range(self) -> bool {
                    (0..=255).contains(&self)
                }
            }
        )*
    };
}

clip_integer!(i16, u16, i32, u32, i64, u64);

macro_rules! clip_float {
    ($($ty:ty),*) => {
        $(
            impl ClipToU8 for $ty {
                const RANGE: (&'static str, &'static str) = ("0.0", "1.0");

                /// Floats are intensities in [0, 1], scaled by 255 and
                /// truncated; NaN becomes 0.
                #[inline]
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                fn clip_to_u8(self) -> u8 {
                    if self.is_nan() {
                        return 0;
                    }
                    (self * 255.0).clamp(0.0, 255.0) as u8
                }

                #[inline]
                fn in_range(self) -> bool {
                    (0.0..=1.0).contains(&self)
                }
            }
        )*
    };
}

clip_float!(f32, f64);

/// Convert every element of `array` into `[0, 255]`.
///
/// With `clamp` set, out-of-range values saturate. Without it they are
/// rejected.
///
/// # Errors
///
/// Returns [`Error::OutOfRange`] if `clamp` is false and an element lies
/// outside the display range of its type (NaN included).
pub fn clip_array(array: &PixelArray, clamp: bool) -> Result<ArrayD<u8>> {
    match array {
        PixelArray::U8(a) => Ok(a.clone()),
        PixelArray::I8(a) => clip_elements(a, clamp),
        PixelArray::I16(a) => clip_elements(a, clamp),
        PixelArray::U16(a) => clip_elements(a, clamp),
        PixelArray::I32(a) => clip_elements(a, clamp),
        PixelArray::U32(a) => clip_elements(a, clamp),
        PixelArray::I64(a) => clip_elements(a, clamp),
        PixelArray::U64(a) => clip_elements(a, clamp),
        PixelArray::F32(a) => clip_elements(a, clamp),
        PixelArray::F64(a) => clip_elements(a, clamp),
    }
}

fn clip_elements<T: ClipToU8>(array: &ArrayD<T>, clamp: bool) -> Result<ArrayD<u8>> {
    if !clamp {
        if let Some(value) = array.iter().find(|value| !value.in_range()) {
            let (min, max) = T::RANGE;
            return Err(Error::OutOfRange {
                value: value.to_string(),
                min: min.to_string(),
                max: max.to_string(),
            });
        }
    }

    Ok(array.mapv(ClipToU8::clip_to_u8))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn values(array: &ArrayD<u8>) -> Vec<u8> {
        array.iter().copied().collect()
    }

    #[test]
    fn test_int_clip() {
        assert_eq!((-5i32).clip_to_u8(), 0);
        assert_eq!(128i32.clip_to_u8(), 128);
        assert_eq!(300i64.clip_to_u8(), 255);
        assert_eq!(256u16.clip_to_u8(), 255);
        assert_eq!(i64::MIN.clip_to_u8(), 0);
    }

    #[test]
    fn test_narrow_and_wide_int_clip() {
        assert_eq!((-128i8).clip_to_u8(), 0);
        assert_eq!(127i8.clip_to_u8(), 127);
        assert_eq!((-300i16).clip_to_u8(), 0);
        assert_eq!(1000i16.clip_to_u8(), 255);
        assert_eq!(u32::MAX.clip_to_u8(), 255);
        assert_eq!(u64::MAX.clip_to_u8(), 255);
        assert_eq!(42u64.clip_to_u8(), 42);
    }

    #[test]
    fn test_float_clip() {
        assert_eq!(0.0f32.clip_to_u8(), 0);
        assert_eq!(1.0f32.clip_to_u8(), 255);
        assert_eq!(0.5f64.clip_to_u8(), 127);
        assert_eq!((-0.25f64).clip_to_u8(), 0);
        assert_eq!(3.0f32.clip_to_u8(), 255);
        assert_eq!(f64::NAN.clip_to_u8(), 0);
        assert_eq!(f32::INFINITY.clip_to_u8(), 255);
    }

    #[test]
    fn test_clip_array_no_wraparound() {
        let array = PixelArray::from(
            Array2::from_shape_vec((1, 4), vec![-1i32, 0, 255, 256]).unwrap(),
        );
        let clipped = clip_array(&array, true).unwrap();
        assert_eq!(values(&clipped), vec![0, 0, 255, 255]);
    }

    #[test]
    fn test_clip_array_extra_int_types() {
        let i8s = PixelArray::from(Array2::from_shape_vec((1, 2), vec![-7i8, 9]).unwrap());
        assert_eq!(values(&clip_array(&i8s, true).unwrap()), vec![0, 9]);

        let u64s = PixelArray::from(Array2::from_shape_vec((1, 2), vec![u64::MAX, 3]).unwrap());
        assert_eq!(values(&clip_array(&u64s, true).unwrap()), vec![255, 3]);
    }

    #[test]
    fn test_clip_array_u8_is_identity() {
        let array = PixelArray::from(Array2::from_shape_vec((1, 3), vec![0u8, 7, 255]).unwrap());
        assert_eq!(values(&clip_array(&array, false).unwrap()), vec![0, 7, 255]);
    }

    #[test]
    fn test_out_of_range_int_without_clamp() {
        let array = PixelArray::from(Array2::from_shape_vec((1, 2), vec![-40i32, 900]).unwrap());
        let err = clip_array(&array, false).unwrap_err();
        match err {
            Error::OutOfRange { value, min, max } => {
                assert_eq!(value, "-40");
                assert_eq!((min.as_str(), max.as_str()), ("0", "255"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_out_of_range_float_without_clamp() {
        let array = PixelArray::from(Array2::from_shape_vec((1, 2), vec![0.5f32, 1.5]).unwrap());
        assert!(matches!(
            clip_array(&array, false),
            Err(Error::OutOfRange { .. })
        ));

        let nan = PixelArray::from(Array2::from_elem((1, 1), f64::NAN));
        assert!(clip_array(&nan, false).is_err());
    }

    #[test]
    fn test_in_range_without_clamp() {
        let array = PixelArray::from(Array2::from_shape_vec((1, 2), vec![0.0f64, 1.0]).unwrap());
        assert_eq!(values(&clip_array(&array, false).unwrap()), vec![0, 255]);
    }
}
