//! Query parameters for child (concept/mapping) lookups.

/// Selects active child records by id.
///
/// Results are ordered by ascending id. Retired records are dropped unless
/// `include_retired` is set; `limit` truncates after filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildFilter<I> {
    pub ids: Vec<I>,
    pub include_retired: bool,
    pub limit: Option<usize>,
}

impl<I> ChildFilter<I> {
    pub fn new(ids: Vec<I>) -> Self {
        ChildFilter {
            ids,
            include_retired: false,
            limit: None,
        }
    }

    pub fn include_retired(mut self, include: bool) -> Self {
        self.include_retired = include;
        self
    }

    /// Sets the result cap. `0` means unlimited.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = (limit > 0).then_some(limit);
        self
    }

    /// Whether a record with the given flags passes the filter (ignoring ids).
    pub fn admits(&self, is_active: bool, retired: bool) -> bool {
        is_active && (self.include_retired || !retired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_limit_means_unlimited() {
        let filter = ChildFilter::new(vec![1, 2, 3]).limit(0);
        assert_eq!(filter.limit, None);
        assert_eq!(ChildFilter::new(vec![1]).limit(2).limit, Some(2));
    }

    #[test]
    fn admits_respects_retired_flag() {
        let strict = ChildFilter::<i64>::new(vec![]);
        assert!(strict.admits(true, false));
        assert!(!strict.admits(true, true));
        assert!(!strict.admits(false, false));

        let lenient = strict.include_retired(true);
        assert!(lenient.admits(true, true));
        assert!(!lenient.admits(false, true));
    }
}
