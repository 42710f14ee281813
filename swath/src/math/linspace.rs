use num_traits::{Float, FromPrimitive};

/// Returns `n` evenly spaced values from `start` to `end`, inclusive.
pub fn linspace<T>(start: T, end: T, n: usize) -> impl Iterator<Item = T>
where
    T: Float + FromPrimitive,
{
    let step = if n > 1 {
        (end - start) / T::from(n - 1).unwrap_or_else(T::one)
    } else {
        T::zero()
    };
    (0..n).map(move |i| start + T::from(i).unwrap_or_else(T::zero) * step)
}
