#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Maps `f` over `items`, on the rayon thread pool when the `parallel` feature is
/// enabled. The output order always matches the input order.
#[cfg(feature = "parallel")]
pub fn ordered_map<T, R, F>(items: &[T], f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(usize, &T) -> R + Sync + Send,
{
    items
        .par_iter()
        .enumerate()
        .map(|(i, item)| f(i, item))
        .collect()
}

/// Maps `f` over `items`. The output order always matches the input order.
#[cfg(not(feature = "parallel"))]
pub fn ordered_map<T, R, F>(items: &[T], f: F) -> Vec<R>
where
    F: Fn(usize, &T) -> R,
{
    items.iter().enumerate().map(|(i, item)| f(i, item)).collect()
}
