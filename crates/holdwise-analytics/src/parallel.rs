//! Parallel processing utilities for per-investor analytics.
//!
//! Provides conditional parallel iteration based on configuration and the
//! number of investors. Uses rayon when the `parallel` feature is enabled.

use crate::config::EngineConfig;

/// Maps a function over items, conditionally using parallel iteration.
///
/// Uses parallel iteration when:
/// - The `parallel` feature is enabled
/// - `config.parallel` is true
/// - The collection size reaches `config.parallel_threshold`
///
/// Output order matches input order either way.
#[allow(unused_variables)]
pub fn maybe_parallel_map<T, U, F>(items: &[T], config: &EngineConfig, f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> U + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        if config.should_parallelize(items.len()) {
            return items.par_iter().map(f).collect();
        }
    }

    items.iter().map(f).collect()
}

/// Folds over items with a reduce step, conditionally using parallel iteration.
///
/// `reduce` must be associative and commutative: in parallel mode the
/// partial accumulators are combined in no particular order.
///
/// # Arguments
///
/// * `items` - The collection to process
/// * `config` - Engine configuration
/// * `identity` - The identity value for the fold
/// * `fold` - The fold function: `(accumulator, item) -> accumulator`
/// * `reduce` - The reduce function: `(acc1, acc2) -> combined`
///
/// # Example
///
/// ```ignore
/// let holders = maybe_parallel_fold(
///     &investors,
///     &config,
///     HashMap::new(),
///     |mut acc, investor| { /* add this investor's securities */ acc },
///     merge_counts,
/// );
/// ```
#[allow(unused_variables)]
pub fn maybe_parallel_fold<T, U, F, R>(
    items: &[T],
    config: &EngineConfig,
    identity: U,
    fold: F,
    reduce: R,
) -> U
where
    T: Sync,
    U: Send + Sync + Clone,
    F: Fn(U, &T) -> U + Sync + Send,
    R: Fn(U, U) -> U + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        if config.should_parallelize(items.len()) {
            return items
                .par_iter()
                .fold(|| identity.clone(), &fold)
                .reduce(|| identity.clone(), reduce);
        }
    }

    items.iter().fold(identity, fold)
}

/// Filters and maps items, conditionally using parallel iteration.
#[allow(unused_variables)]
pub fn maybe_parallel_filter_map<T, U, F>(items: &[T], config: &EngineConfig, f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> Option<U> + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        if config.should_parallelize(items.len()) {
            return items.par_iter().filter_map(f).collect();
        }
    }

    items.iter().filter_map(f).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maybe_parallel_map() {
        let config = EngineConfig::sequential();
        let items = vec![1, 2, 3, 4, 5];
        let results: Vec<i32> = maybe_parallel_map(&items, &config, |x| x * 2);
        assert_eq!(results, vec![2, 4, 6, 8, 10]);
    }

    #[test]
    fn test_maybe_parallel_fold() {
        let config = EngineConfig::sequential();
        let items: Vec<u64> = (1..=100).collect();
        let sum = maybe_parallel_fold(&items, &config, 0u64, |acc, x| acc + x, |a, b| a + b);
        assert_eq!(sum, 5050);
    }

    #[test]
    fn test_fold_same_result_when_parallel_requested() {
        let items: Vec<u64> = (1..=1000).collect();
        let sequential = EngineConfig::sequential();
        let parallel = EngineConfig::default().with_threshold(1);
        let a = maybe_parallel_fold(&items, &sequential, 0u64, |acc, x| acc + x, |a, b| a + b);
        let b = maybe_parallel_fold(&items, &parallel, 0u64, |acc, x| acc + x, |a, b| a + b);
        assert_eq!(a, b);
    }

    #[test]
    fn test_maybe_parallel_filter_map() {
        let config = EngineConfig::default().with_threshold(2);
        let items = vec![1, 2, 3, 4, 5];
        let results: Vec<i32> =
            maybe_parallel_filter_map(&items, &config, |x| if *x > 2 { Some(x * 2) } else { None });
        assert_eq!(results, vec![6, 8, 10]);
    }
}
