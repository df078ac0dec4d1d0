//! # Substring Search
//!
//! Each list view searches one text field. A non-empty query keeps only the
//! records whose field contains the query, ignoring case; an empty or absent
//! query keeps everything. Order is preserved.
//!
//! Queries are trimmed before use. A query longer than
//! [`MAX_SEARCH_LENGTH`] characters is an invalid search input and leaves the
//! collection unfiltered, the same as no query at all.

/// Longest accepted search input, in characters.
pub const MAX_SEARCH_LENGTH: usize = 255;

/// A record that can be narrowed by a free-text query on one field.
pub trait Searchable {
    /// Name of the searched field. List endpoints use it as the query
    /// parameter name.
    const SEARCH_FIELD: &'static str;

    /// Current value of the searched field.
    fn search_value(&self) -> &str;

    /// Whether the searched field contains `needle` ignoring case.
    ///
    /// `needle` must already be lowercased.
    fn matches_lowercase(&self, needle: &str) -> bool {
        self.search_value().to_lowercase().contains(needle)
    }
}

/// Narrow `records` to those matching `query`.
pub fn filter_by_search<T: Searchable>(records: Vec<T>, query: Option<&str>) -> Vec<T> {
    match query.map(str::trim) {
        Some(q) if !q.is_empty() && q.chars().count() <= MAX_SEARCH_LENGTH => {
            let needle = q.to_lowercase();
            records
                .into_iter()
                .filter(|record| record.matches_lowercase(&needle))
                .collect()
        }
        _ => records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Named(String);

    impl Searchable for Named {
        const SEARCH_FIELD: &'static str = "name";

        fn search_value(&self) -> &str {
            &self.0
        }
    }

    fn named(s: &str) -> Named {
        Named(s.to_string())
    }

    fn names() -> Vec<Named> {
        (0..12).map(|i| Named(format!("Name {i}"))).collect()
    }

    #[test]
    fn no_query_keeps_everything() {
        assert_eq!(filter_by_search(names(), None).len(), 12);
        assert_eq!(filter_by_search(names(), Some("")).len(), 12);
    }

    #[test]
    fn query_keeps_exact_matching_subset_in_order() {
        let kept = filter_by_search(names(), Some("1"));
        let expected: Vec<Named> = names()
            .into_iter()
            .filter(|n| n.0.contains('1'))
            .collect();
        assert_eq!(kept, expected);
        assert_eq!(
            kept.iter().map(|n| n.0.as_str()).collect::<Vec<_>>(),
            ["Name 1", "Name 10", "Name 11"]
        );
    }

    #[test]
    fn matching_ignores_case() {
        let records = vec![named("Toyota"), named("TOYOTA"), named("Honda")];
        let kept = filter_by_search(records, Some("toYo"));
        assert_eq!(kept, vec![named("Toyota"), named("TOYOTA")]);
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let records = vec![named("Town Car"), named("Sedan")];
        assert_eq!(
            filter_by_search(records.clone(), Some("  car ")),
            vec![named("Town Car")]
        );
        assert_eq!(filter_by_search(records, Some("   ")).len(), 2);
    }

    #[test]
    fn overlong_query_does_not_filter() {
        let query = "x".repeat(MAX_SEARCH_LENGTH + 1);
        assert_eq!(filter_by_search(names(), Some(&query)).len(), 12);
    }

    #[test]
    fn no_match_yields_empty() {
        assert!(filter_by_search(names(), Some("zzz")).is_empty());
    }
}
