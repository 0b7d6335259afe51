//! Query-string parsing shared by handlers.
//!
//! Query values arrive as strings. Boolean flags accept `true`, `1`, `yes`
//! and `on` in any case; every other value, including an empty one, is false.

use std::collections::HashMap;

use ocl_core::FieldErrors;

pub const INCLUDE_CONCEPTS_PARAM: &str = "includeConcepts";
pub const INCLUDE_MAPPINGS_PARAM: &str = "includeMappings";
pub const INCLUDE_RETIRED_PARAM: &str = "includeRetired";
pub const INCLUDE_FACETS_PARAM: &str = "includeFacets";
pub const VERBOSE_PARAM: &str = "verbose";
pub const LIMIT_PARAM: &str = "limit";
pub const PAGE_PARAM: &str = "page";

/// Raw query parameters as received.
pub type QueryParams = HashMap<String, String>;

/// Interprets a query value as a boolean flag.
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

/// Reads a boolean flag; absent means false.
pub fn flag(params: &QueryParams, name: &str) -> bool {
    params.get(name).is_some_and(|v| is_truthy(v))
}

/// Reads a non-negative integer, recording a field error when malformed.
pub fn non_negative(params: &QueryParams, name: &str, errors: &mut FieldErrors) -> Option<usize> {
    let raw = params.get(name)?;
    match raw.trim().parse::<usize>() {
        Ok(n) => Some(n),
        Err(_) => {
            errors.add(name, "A valid non-negative integer is required.");
            None
        }
    }
}

/// Nested-collection options for a single source GET.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IncludeParams {
    pub concepts: bool,
    pub mappings: bool,
    pub retired: bool,
    /// `0` means unlimited.
    pub limit: usize,
}

impl IncludeParams {
    pub fn from_query(params: &QueryParams) -> Result<Self, FieldErrors> {
        let concepts = flag(params, INCLUDE_CONCEPTS_PARAM);
        let mappings = flag(params, INCLUDE_MAPPINGS_PARAM);
        let mut include = IncludeParams {
            concepts,
            mappings,
            ..IncludeParams::default()
        };
        // limit and includeRetired only matter once something is included.
        if concepts || mappings {
            let mut errors = FieldErrors::new();
            include.limit = non_negative(params, LIMIT_PARAM, &mut errors).unwrap_or(0);
            include.retired = flag(params, INCLUDE_RETIRED_PARAM);
            errors.into_result()?;
        }
        Ok(include)
    }

    pub fn any(&self) -> bool {
        self.concepts || self.mappings
    }
}

/// Page selection for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    /// 1-based page number.
    pub page: usize,
    pub limit: usize,
}

impl PageParams {
    /// Parses `page` and `limit`; `limit` defaults to `default_limit` and is
    /// capped at `max_limit`.
    pub fn from_query(
        params: &QueryParams,
        default_limit: usize,
        max_limit: usize,
    ) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let page = non_negative(params, PAGE_PARAM, &mut errors).unwrap_or(1);
        let limit = non_negative(params, LIMIT_PARAM, &mut errors).unwrap_or(default_limit);
        if page == 0 {
            errors.add(PAGE_PARAM, "Page numbers start at 1.");
        }
        if limit == 0 {
            errors.add(LIMIT_PARAM, "Ensure this value is greater than 0.");
        }
        errors.into_result()?;
        Ok(PageParams {
            page,
            limit: limit.min(max_limit.max(1)),
        })
    }

    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> QueryParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn flag_values() {
        for v in ["true", "TRUE", "1", "yes", "On"] {
            assert!(is_truthy(v), "{v}");
        }
        for v in ["false", "0", "", "no", "maybe"] {
            assert!(!is_truthy(v), "{v}");
        }
    }

    #[test]
    fn include_params_default_to_nothing() {
        let include = IncludeParams::from_query(&query(&[("limit", "bogus")])).unwrap();
        assert!(!include.any());
        assert_eq!(include.limit, 0);
    }

    #[test]
    fn include_params_parse_limit_and_retired() {
        let include = IncludeParams::from_query(&query(&[
            ("includeConcepts", "true"),
            ("limit", "5"),
            ("includeRetired", "1"),
        ]))
        .unwrap();
        assert!(include.concepts);
        assert!(!include.mappings);
        assert!(include.retired);
        assert_eq!(include.limit, 5);
    }

    #[test]
    fn include_params_reject_bad_limit() {
        let errors = IncludeParams::from_query(&query(&[
            ("includeMappings", "true"),
            ("limit", "-3"),
        ]))
        .unwrap_err();
        assert!(errors.get("limit").is_some());
    }

    #[test]
    fn page_params_defaults_and_caps() {
        let page = PageParams::from_query(&query(&[]), 25, 500).unwrap();
        assert_eq!(page, PageParams { page: 1, limit: 25 });
        assert_eq!(page.offset(), 0);

        let page = PageParams::from_query(&query(&[("page", "3"), ("limit", "9999")]), 25, 500)
            .unwrap();
        assert_eq!(page.limit, 500);
        assert_eq!(page.offset(), 1000);
    }

    #[test]
    fn page_params_reject_zero() {
        let errors = PageParams::from_query(&query(&[("page", "0"), ("limit", "0")]), 25, 500)
            .unwrap_err();
        assert!(errors.get("page").is_some());
        assert!(errors.get("limit").is_some());
    }
}
