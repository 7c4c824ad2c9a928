//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Linearly interpolate between `a` and `b`.
///
/// `alpha` is clamped into `[0, 1]` before use, so the result always lies
/// between `a` and `b`. The endpoints are returned exactly for `alpha` of 0
/// and 1.
pub fn lerp<T>(a: T, b: T, alpha: T) -> T
where
    T: Float
{
    let alpha = clamp(&alpha, &T::zero(), &T::one());

    (T::one() - alpha) * a + alpha * b
}

pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}
