//! Ordered filter chains.
//!
//! A filter is a named transform `T -> T`. Chains run their filters in
//! registration order, each receiving the previous one's output.

use std::collections::HashMap;
use std::fmt;

type FilterFn<T> = Box<dyn Fn(T) -> T + Send + Sync>;

/// An ordered list of named transforms over one value type.
pub struct FilterChain<T> {
    filters: Vec<(String, FilterFn<T>)>,
}

impl<T> Default for FilterChain<T> {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
        }
    }
}

impl<T> fmt::Debug for FilterChain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterChain")
            .field("filters", &self.names())
            .finish()
    }
}

impl<T> FilterChain<T> {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter. Names need not be unique.
    pub fn add<F>(&mut self, name: impl Into<String>, filter: F)
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        self.filters.push((name.into(), Box::new(filter)));
    }

    /// Remove every filter registered under `name`. Returns how many were removed.
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.filters.len();
        self.filters.retain(|(n, _)| n != name);
        before - self.filters.len()
    }

    /// Whether a filter with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.filters.iter().any(|(n, _)| n == name)
    }

    /// Filter names in run order.
    pub fn names(&self) -> Vec<&str> {
        self.filters.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Number of filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Whether the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Run `value` through every filter in order.
    pub fn apply(&self, value: T) -> T {
        self.filters.iter().fold(value, |acc, (_, filter)| filter(acc))
    }
}

/// Named extension points, each with its own chain.
pub struct Filters<T> {
    points: HashMap<String, FilterChain<T>>,
}

impl<T> Default for Filters<T> {
    fn default() -> Self {
        Self {
            points: HashMap::new(),
        }
    }
}

impl<T> fmt::Debug for Filters<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.points.iter()).finish()
    }
}

impl<T> Filters<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter to an extension point.
    pub fn add_filter<F>(&mut self, point: &str, name: impl Into<String>, filter: F)
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        self.points
            .entry(point.to_string())
            .or_default()
            .add(name, filter);
    }

    /// Remove filters registered under `name` at `point`.
    pub fn remove_filter(&mut self, point: &str, name: &str) -> usize {
        self.points
            .get_mut(point)
            .map(|chain| chain.remove(name))
            .unwrap_or(0)
    }

    /// Whether `name` is registered at `point`.
    pub fn has_filter(&self, point: &str, name: &str) -> bool {
        self.points
            .get(point)
            .is_some_and(|chain| chain.contains(name))
    }

    /// The chain for `point`, if anything was registered there.
    pub fn chain(&self, point: &str) -> Option<&FilterChain<T>> {
        self.points.get(point)
    }

    /// Run `value` through the chain at `point`. Unknown points return it unchanged.
    pub fn apply_filters(&self, point: &str, value: T) -> T {
        match self.points.get(point) {
            Some(chain) => chain.apply(value),
            None => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_runs_in_registration_order() {
        let mut chain: FilterChain<String> = FilterChain::new();
        chain.add("a", |s| s + "a");
        chain.add("b", |s| s + "b");
        chain.add("c", |s| s + "c");

        assert_eq!(chain.apply(String::new()), "abc");
        assert_eq!(chain.names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_chain_is_identity() {
        let chain: FilterChain<i32> = FilterChain::new();
        assert!(chain.is_empty());
        assert_eq!(chain.apply(5), 5);
    }

    #[test]
    fn test_remove_by_name() {
        let mut chain: FilterChain<i32> = FilterChain::new();
        chain.add("double", |n| n * 2);
        chain.add("inc", |n| n + 1);
        chain.add("double", |n| n * 2);

        assert_eq!(chain.remove("double"), 2);
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.apply(1), 2);
        assert_eq!(chain.remove("missing"), 0);
    }

    #[test]
    fn test_filters_unknown_point_is_identity() {
        let filters: Filters<Vec<i32>> = Filters::new();
        assert_eq!(filters.apply_filters("nothing", vec![1, 2]), vec![1, 2]);
        assert!(filters.chain("nothing").is_none());
    }

    #[test]
    fn test_filters_points_are_independent() {
        let mut filters: Filters<i32> = Filters::new();
        filters.add_filter("one", "inc", |n| n + 1);
        filters.add_filter("two", "neg", |n| -n);

        assert_eq!(filters.apply_filters("one", 1), 2);
        assert_eq!(filters.apply_filters("two", 1), -1);
        assert!(filters.has_filter("one", "inc"));
        assert!(!filters.has_filter("two", "inc"));

        assert_eq!(filters.remove_filter("one", "inc"), 1);
        assert_eq!(filters.apply_filters("one", 1), 1);
        assert_eq!(filters.remove_filter("three", "inc"), 0);
    }
}
