//! Vector arithmetic over the supported numeric widths.
//!
//! Indexes store and project vectors as `Vec<T>` where `T: Scalar`; `f32` is
//! the default width and `f64` is available for callers that need the extra
//! precision. Only the handful of operations the index needs are exposed.
//!
//! ```rust
//! use gaussian_lsh::vector::{dot, norm, normalize};
//!
//! let a = [3.0_f32, 4.0];
//! assert_eq!(dot(&a, &a), 25.0);
//! assert_eq!(norm(&a), 5.0);
//!
//! let unit = normalize(&a).unwrap();
//! assert!((norm(&unit) - 1.0).abs() < 1e-6);
//! assert!(normalize(&[0.0_f32, 0.0]).is_none());
//! ```

use std::fmt::Debug;
use std::iter::Sum;
use std::ops::{Add, Div, Mul};

/// Floating point element type of stored vectors and projections.
pub trait Scalar:
    Copy
    + Debug
    + Default
    + PartialOrd
    + Add<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Sum
    + Send
    + Sync
    + 'static
{
    const ZERO: Self;
    const ONE: Self;

    fn from_f64(v: f64) -> Self;
    fn to_f64(self) -> f64;
    fn sqrt(self) -> Self;
    fn is_finite(self) -> bool;

    /// `floor(self)` saturated into a signed byte.
    fn floor_to_i8(self) -> i8;
}

macro_rules! impl_scalar {
    ($t:ty) => {
        impl Scalar for $t {
            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;

            #[inline]
            fn from_f64(v: f64) -> Self {
                v as $t
            }

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn sqrt(self) -> Self {
                <$t>::sqrt(self)
            }

            #[inline]
            fn is_finite(self) -> bool {
                <$t>::is_finite(self)
            }

            #[inline]
            fn floor_to_i8(self) -> i8 {
                // `as` saturates at the i8 bounds and maps NaN to 0.
                self.floor() as i8
            }
        }
    };
}

impl_scalar!(f32);
impl_scalar!(f64);

/// Inner product of two vectors.
///
/// Extra trailing elements of the longer slice are ignored; callers validate
/// dimensions before reaching this.
#[inline]
#[must_use]
pub fn dot<T: Scalar>(a: &[T], b: &[T]) -> T {
    a.iter().zip(b.iter()).map(|(&x, &y)| x * y).sum()
}

/// L2 norm of a vector.
#[inline]
#[must_use]
pub fn norm<T: Scalar>(v: &[T]) -> T {
    dot(v, v).sqrt()
}

/// Rescale a vector to unit L2 norm.
///
/// Returns `None` when the result is undefined: a zero or non-finite norm
/// (all zeros, NaN components, overflow), or a non-finite scaled component.
#[must_use]
pub fn normalize<T: Scalar>(v: &[T]) -> Option<Vec<T>> {
    let n = norm(v);
    if !(n.is_finite() && n > T::ZERO) {
        return None;
    }
    let factor = T::ONE / n;
    let out: Vec<T> = v.iter().map(|&x| x * factor).collect();
    if out.iter().all(|x| x.is_finite()) {
        Some(out)
    } else {
        None
    }
}
