//! Source handlers (list, create, retrieve, update, delete).

use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, Uri};
use axum::response::Response;
use axum::Json;

use ocl_core::OwnerRef;

use super::{created, owner_ref};
use crate::auth::Caller;
use crate::error::ApiError;
use crate::pagination::{ListResponse, Page};
use crate::params::{flag, IncludeParams, PageParams, QueryParams, VERBOSE_PARAM};
use crate::schema::children::{ConceptDetailView, MappingDetailView};
use crate::schema::common::{DeferredBody, JsonBody};
use crate::schema::sources::{
    CreateSourceRequest, SourceDetailView, SourceRetrieveResponse, SourceView,
};
use crate::search::{SearchQuery, SOURCE_SEARCH_FIELDS};
use crate::state::AppState;

async fn search(
    state: &AppState,
    caller: &Caller,
    owner: Option<OwnerRef>,
    params: QueryParams,
    path: &str,
) -> Result<ListResponse<SourceView>, ApiError> {
    let query = SearchQuery::from_params(&params, SOURCE_SEARCH_FIELDS)?;
    let page = PageParams::from_query(
        &params,
        state.config.default_page_size,
        state.config.max_page_size,
    )?;
    let verbose = flag(&params, VERBOSE_PARAM);

    let service = state.service.lock().await;
    let results = service.search_sources(&caller.principal, owner.as_ref(), &query)?;
    let page = Page::cut(results.items, page).map(|s| SourceView::render(&s, verbose));
    Ok(ListResponse::new(page, path, params).with_facets(results.facets))
}

/// Lists every source the caller can view.
///
/// `GET /sources`
pub async fn list_all_sources(
    State(state): State<AppState>,
    caller: Caller,
    uri: Uri,
    Query(params): Query<QueryParams>,
) -> Result<ListResponse<SourceView>, ApiError> {
    search(&state, &caller, None, params, uri.path()).await
}

/// Lists the sources of one owner.
///
/// `GET /{owner_kind}/{owner}/sources`
pub async fn list_sources(
    State(state): State<AppState>,
    Path((kind, owner)): Path<(String, String)>,
    caller: Caller,
    uri: Uri,
    Query(params): Query<QueryParams>,
) -> Result<ListResponse<SourceView>, ApiError> {
    let owner = owner_ref(&kind, &owner)?;
    search(&state, &caller, Some(owner), params, uri.path()).await
}

/// Creates a source and its initial version.
///
/// `POST /{owner_kind}/{owner}/sources`
pub async fn create_source(
    State(state): State<AppState>,
    Path((kind, owner)): Path<(String, String)>,
    caller: Caller,
    JsonBody(req): JsonBody<CreateSourceRequest>,
) -> Result<Response, ApiError> {
    let owner = owner_ref(&kind, &owner)?;
    let mut service = state.service.lock().await;
    let source = service.create_source(&caller.principal, &owner, req)?;
    Ok(created(&source.url(), SourceDetailView::from(&source)))
}

/// Retrieves a source, optionally with the concepts and mappings of its
/// released version.
///
/// `GET /{owner_kind}/{owner}/sources/{source}`
pub async fn get_source(
    State(state): State<AppState>,
    Path((kind, owner, source)): Path<(String, String, String)>,
    caller: Caller,
    Query(params): Query<QueryParams>,
) -> Result<Json<SourceRetrieveResponse>, ApiError> {
    let owner = owner_ref(&kind, &owner)?;
    let include = IncludeParams::from_query(&params)?;
    let service = state.service.lock().await;
    let expansion = service.retrieve_source(&caller, &owner, &source, include)?;
    Ok(Json(SourceRetrieveResponse {
        source: SourceDetailView::from(&expansion.source),
        concepts: expansion
            .concepts
            .map(|items| items.iter().map(ConceptDetailView::from).collect()),
        mappings: expansion
            .mappings
            .map(|items| items.iter().map(MappingDetailView::from).collect()),
    }))
}

/// Updates a source's attributes.
///
/// `PUT|PATCH /{owner_kind}/{owner}/sources/{source}`
pub async fn update_source(
    State(state): State<AppState>,
    Path((kind, owner, source)): Path<(String, String, String)>,
    caller: Caller,
    body: DeferredBody,
) -> Result<Json<SourceDetailView>, ApiError> {
    let owner = owner_ref(&kind, &owner)?;
    let mut service = state.service.lock().await;
    let source = service.update_source(&caller, &owner, &source, &body)?;
    Ok(Json(SourceDetailView::from(&source)))
}

/// Deactivates a source.
///
/// `DELETE /{owner_kind}/{owner}/sources/{source}`
pub async fn delete_source(
    State(state): State<AppState>,
    Path((kind, owner, source)): Path<(String, String, String)>,
    caller: Caller,
) -> Result<StatusCode, ApiError> {
    let owner = owner_ref(&kind, &owner)?;
    let mut service = state.service.lock().await;
    service.delete_source(&caller, &owner, &source)?;
    Ok(StatusCode::NO_CONTENT)
}
