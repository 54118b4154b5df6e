//! Numeric sample types a [`PixelBuffer`](crate::image::PixelBuffer) can hold.
//!
//! Every sample knows its representable range and converts through `f64`,
//! which is the accumulator type for statistics, normalization and
//! saturating arithmetic.

use std::fmt::Debug;

use num_traits::{NumCast, ToPrimitive};

pub trait Sample: Copy + PartialOrd + Default + Debug + Send + Sync + 'static {
    /// Smallest representable value (most negative for floats).
    const MIN: Self;
    /// Largest representable value.
    const MAX: Self;

    fn to_f64(self) -> f64;

    /// Convert back from `f64`, saturating at `MIN`/`MAX`.
    ///
    /// Integer types round half away from zero; NaN maps to the default value.
    fn from_f64(value: f64) -> Self;
}

macro_rules! impl_integer_sample {
    ($($t:ty),*) => {$(
        impl Sample for $t {
            const MIN: Self = <$t>::MIN;
            const MAX: Self = <$t>::MAX;

            #[inline]
            fn to_f64(self) -> f64 {
                ToPrimitive::to_f64(&self).unwrap_or_default()
            }

            #[inline]
            fn from_f64(value: f64) -> Self {
                let clamped = value.round().clamp(<$t>::MIN as f64, <$t>::MAX as f64);
                <$t as NumCast>::from(clamped).unwrap_or_default()
            }
        }
    )*};
}

macro_rules! impl_float_sample {
    ($($t:ty),*) => {$(
        impl Sample for $t {
            const MIN: Self = <$t>::MIN;
            const MAX: Self = <$t>::MAX;

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64(value: f64) -> Self {
                value.clamp(<$t>::MIN as f64, <$t>::MAX as f64) as $t
            }
        }
    )*};
}

impl_integer_sample!(u8, u16, u32, i8, i16, i32);
impl_float_sample!(f32, f64);

/// Masks of structuring elements are boolean images.
impl Sample for bool {
    const MIN: Self = false;
    const MAX: Self = true;

    #[inline]
    fn to_f64(self) -> f64 {
        if self {
            1.0
        } else {
            0.0
        }
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value > 0.5
    }
}
