//! Search-filter backend for collection listings.
//!
//! A listing declares its searchable fields in a [`SearchField`] table. The
//! query string is parsed against that table into a [`SearchQuery`], which
//! filters, sorts and facets any [`Searchable`] collection.
//!
//! Query parameters:
//! - `q`: case-insensitive substring match over the item's text
//! - `sortAsc` / `sortDesc`: sort by a sortable field
//! - `<field>=a,b`: keep items whose field has any of the values; several
//!   fields must all match
//! - `includeFacets`: count field values over the filtered items

use chrono::SecondsFormat;
use indexmap::IndexMap;

use ocl_core::{FieldErrors, Source};

use crate::params::{flag, QueryParams, INCLUDE_FACETS_PARAM};

pub const SEARCH_TEXT_PARAM: &str = "q";
pub const SORT_ASC_PARAM: &str = "sortAsc";
pub const SORT_DESC_PARAM: &str = "sortDesc";

/// How a field takes part in searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchField {
    pub name: &'static str,
    pub sortable: bool,
    pub filterable: bool,
    pub facet: bool,
}

impl SearchField {
    const fn new(name: &'static str, sortable: bool, filterable: bool, facet: bool) -> Self {
        SearchField {
            name,
            sortable,
            filterable,
            facet,
        }
    }
}

/// Search fields of the source listing.
pub const SOURCE_SEARCH_FIELDS: &[SearchField] = &[
    SearchField::new("sourceType", false, true, true),
    SearchField::new("name", true, false, false),
    SearchField::new("lastUpdate", true, false, false),
    SearchField::new("locale", false, true, true),
    SearchField::new("owner", false, true, true),
    SearchField::new("ownerType", false, true, true),
];

/// Something the search backend can index.
pub trait Searchable {
    /// Values of a filterable or facet field.
    fn field_values(&self, field: &str) -> Vec<String>;

    /// Ordering key for a sortable field.
    fn sort_key(&self, field: &str) -> Option<String>;

    /// Whether the free-text query (already lowercased) matches.
    fn matches_text(&self, needle: &str) -> bool;
}

impl Searchable for Source {
    fn field_values(&self, field: &str) -> Vec<String> {
        match field {
            "sourceType" => self.source_type.iter().cloned().collect(),
            "locale" => self.locales().map(str::to_string).collect(),
            "owner" => vec![self.owner.clone()],
            "ownerType" => vec![self.owner_type.as_str().to_string()],
            _ => Vec::new(),
        }
    }

    fn sort_key(&self, field: &str) -> Option<String> {
        match field {
            "name" => Some(self.name.to_lowercase()),
            "lastUpdate" => Some(self.updated_at.to_rfc3339_opts(SecondsFormat::Nanos, true)),
            _ => None,
        }
    }

    fn matches_text(&self, needle: &str) -> bool {
        [
            Some(self.mnemonic.as_str()),
            Some(self.name.as_str()),
            self.full_name.as_deref(),
            self.description.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|text| text.to_lowercase().contains(needle))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Facet counts: field name to value to count, most frequent value first.
pub type Facets = IndexMap<String, IndexMap<String, usize>>;

/// The outcome of applying a [`SearchQuery`].
#[derive(Debug, Clone)]
pub struct SearchResults<T> {
    pub items: Vec<T>,
    pub facets: Option<Facets>,
}

/// A parsed search request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: Option<String>,
    pub sort: Option<(&'static str, SortOrder)>,
    /// Filterable field and accepted (lowercased) values.
    pub filters: Vec<(&'static str, Vec<String>)>,
    pub include_facets: bool,
    facet_fields: Vec<&'static str>,
}

impl SearchQuery {
    /// Parses the query string against `fields`.
    pub fn from_params(params: &QueryParams, fields: &[SearchField]) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();

        let text = params
            .get(SEARCH_TEXT_PARAM)
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty());

        let mut sort = None;
        for (param, order) in [(SORT_ASC_PARAM, SortOrder::Asc), (SORT_DESC_PARAM, SortOrder::Desc)] {
            let Some(requested) = params.get(param) else {
                continue;
            };
            if sort.is_some() {
                errors.add(param, "Only one of sortAsc and sortDesc may be given.");
                continue;
            }
            match fields.iter().find(|f| f.name == requested.as_str() && f.sortable) {
                Some(field) => sort = Some((field.name, order)),
                None => errors.add(param, format!("Cannot sort by '{}'.", requested)),
            }
        }

        // Table order keeps the filter list deterministic.
        let filters = fields
            .iter()
            .filter(|f| f.filterable)
            .filter_map(|f| {
                let raw = params.get(f.name)?;
                let values: Vec<String> = raw
                    .split(',')
                    .map(|v| v.trim().to_lowercase())
                    .filter(|v| !v.is_empty())
                    .collect();
                (!values.is_empty()).then_some((f.name, values))
            })
            .collect();

        errors.into_result()?;
        Ok(SearchQuery {
            text,
            sort,
            filters,
            include_facets: flag(params, INCLUDE_FACETS_PARAM),
            facet_fields: fields.iter().filter(|f| f.facet).map(|f| f.name).collect(),
        })
    }

    fn admits<T: Searchable>(&self, item: &T) -> bool {
        if let Some(text) = &self.text {
            if !item.matches_text(text) {
                return false;
            }
        }
        self.filters.iter().all(|(field, accepted)| {
            item.field_values(field)
                .iter()
                .any(|v| accepted.contains(&v.to_lowercase()))
        })
    }

    /// Filters, sorts and optionally facets `items`. Without a sort the
    /// input order is kept.
    pub fn apply<T: Searchable>(&self, items: Vec<T>) -> SearchResults<T> {
        let mut items: Vec<T> = items.into_iter().filter(|item| self.admits(item)).collect();

        if let Some((field, order)) = self.sort {
            items.sort_by(|a, b| {
                let ordering = a.sort_key(field).cmp(&b.sort_key(field));
                match order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            });
        }

        let facets = self.include_facets.then(|| self.facets(&items));
        SearchResults { items, facets }
    }

    fn facets<T: Searchable>(&self, items: &[T]) -> Facets {
        self.facet_fields
            .iter()
            .map(|field| {
                let mut counts: IndexMap<String, usize> = IndexMap::new();
                for item in items {
                    for value in item.field_values(field) {
                        *counts.entry(value).or_default() += 1;
                    }
                }
                counts.sort_by(|ka, va, kb, vb| vb.cmp(va).then_with(|| ka.cmp(kb)));
                (field.to_string(), counts)
            })
            .collect()
    }
}
