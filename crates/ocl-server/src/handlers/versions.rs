//! Source version handlers, including `latest` resolution and child listing.

use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, Uri};
use axum::response::Response;
use axum::Json;

use super::{created, owner_ref};
use crate::auth::Caller;
use crate::error::ApiError;
use crate::pagination::{ListResponse, Page};
use crate::params::{flag, PageParams, QueryParams, VERBOSE_PARAM};
use crate::schema::common::DeferredBody;
use crate::schema::versions::{VersionDetailView, VersionView};
use crate::service::VersionSelector;
use crate::state::AppState;

fn page_params(state: &AppState, params: &QueryParams) -> Result<PageParams, ApiError> {
    Ok(PageParams::from_query(
        params,
        state.config.default_page_size,
        state.config.max_page_size,
    )?)
}

/// Lists a source's versions, newest first.
///
/// `GET /{owner_kind}/{owner}/sources/{source}/versions`
pub async fn list_versions(
    State(state): State<AppState>,
    Path((kind, owner, source)): Path<(String, String, String)>,
    caller: Caller,
    uri: Uri,
    Query(params): Query<QueryParams>,
) -> Result<ListResponse<VersionView>, ApiError> {
    let owner = owner_ref(&kind, &owner)?;
    let page = page_params(&state, &params)?;
    let verbose = flag(&params, VERBOSE_PARAM);

    let service = state.service.lock().await;
    let (source, versions) = service.list_versions(&caller, &owner, &source)?;
    let page = Page::cut(versions, page).map(|v| VersionView::render(&v, &source, verbose));
    Ok(ListResponse::new(page, uri.path(), params))
}

/// Creates a version of a source.
///
/// `POST /{owner_kind}/{owner}/sources/{source}/versions`
pub async fn create_version(
    State(state): State<AppState>,
    Path((kind, owner, source)): Path<(String, String, String)>,
    caller: Caller,
    body: DeferredBody,
) -> Result<Response, ApiError> {
    let owner = owner_ref(&kind, &owner)?;
    let mut service = state.service.lock().await;
    let (source, version) = service.create_version(&caller, &owner, &source, &body)?;
    Ok(created(
        &version.url(&source),
        VersionDetailView::new(&version, &source),
    ))
}

async fn show(
    state: &AppState,
    caller: &Caller,
    (kind, owner, source): (String, String, String),
    selector: VersionSelector,
) -> Result<Json<VersionDetailView>, ApiError> {
    let owner = owner_ref(&kind, &owner)?;
    let service = state.service.lock().await;
    let (source, version) = service.get_version(caller, &owner, &source, &selector)?;
    Ok(Json(VersionDetailView::new(&version, &source)))
}

async fn update(
    state: &AppState,
    caller: &Caller,
    (kind, owner, source): (String, String, String),
    selector: VersionSelector,
    body: DeferredBody,
) -> Result<Json<VersionDetailView>, ApiError> {
    let owner = owner_ref(&kind, &owner)?;
    let mut service = state.service.lock().await;
    let (source, version) = service.update_version(caller, &owner, &source, &selector, &body)?;
    Ok(Json(VersionDetailView::new(&version, &source)))
}

/// Retrieves the released version.
///
/// `GET /{owner_kind}/{owner}/sources/{source}/latest`
pub async fn get_latest(
    State(state): State<AppState>,
    Path(path): Path<(String, String, String)>,
    caller: Caller,
) -> Result<Json<VersionDetailView>, ApiError> {
    show(&state, &caller, path, VersionSelector::Latest).await
}

/// Updates the released version.
///
/// `PUT|PATCH /{owner_kind}/{owner}/sources/{source}/latest`
pub async fn update_latest(
    State(state): State<AppState>,
    Path(path): Path<(String, String, String)>,
    caller: Caller,
    body: DeferredBody,
) -> Result<Json<VersionDetailView>, ApiError> {
    update(&state, &caller, path, VersionSelector::Latest, body).await
}

/// Retrieves a version by mnemonic.
///
/// `GET /{owner_kind}/{owner}/sources/{source}/{version}`
pub async fn get_version(
    State(state): State<AppState>,
    Path((kind, owner, source, version)): Path<(String, String, String, String)>,
    caller: Caller,
) -> Result<Json<VersionDetailView>, ApiError> {
    show(
        &state,
        &caller,
        (kind, owner, source),
        VersionSelector::Named(version),
    )
    .await
}

/// Updates a version by mnemonic.
///
/// `PUT|PATCH /{owner_kind}/{owner}/sources/{source}/{version}`
pub async fn update_version(
    State(state): State<AppState>,
    Path((kind, owner, source, version)): Path<(String, String, String, String)>,
    caller: Caller,
    body: DeferredBody,
) -> Result<Json<VersionDetailView>, ApiError> {
    update(
        &state,
        &caller,
        (kind, owner, source),
        VersionSelector::Named(version),
        body,
    )
    .await
}

/// Deactivates a version unless it is released.
///
/// `DELETE /{owner_kind}/{owner}/sources/{source}/{version}`
pub async fn delete_version(
    State(state): State<AppState>,
    Path((kind, owner, source, version)): Path<(String, String, String, String)>,
    caller: Caller,
) -> Result<StatusCode, ApiError> {
    let owner = owner_ref(&kind, &owner)?;
    let mut service = state.service.lock().await;
    service.delete_version(&caller, &owner, &source, &VersionSelector::Named(version))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn children(
    state: &AppState,
    caller: &Caller,
    (kind, owner, source): (String, String, String),
    selector: VersionSelector,
    path: &str,
    params: QueryParams,
) -> Result<ListResponse<VersionView>, ApiError> {
    let owner = owner_ref(&kind, &owner)?;
    let page = page_params(state, &params)?;
    let verbose = flag(&params, VERBOSE_PARAM);

    let service = state.service.lock().await;
    let (source, children) = service.list_child_versions(caller, &owner, &source, &selector)?;
    let page = Page::cut(children, page).map(|v| VersionView::render(&v, &source, verbose));
    Ok(ListResponse::new(page, path, params))
}

/// Lists the versions whose parent is the given version.
///
/// `GET /{owner_kind}/{owner}/sources/{source}/{version}/children`
pub async fn list_children(
    State(state): State<AppState>,
    Path((kind, owner, source, version)): Path<(String, String, String, String)>,
    caller: Caller,
    uri: Uri,
    Query(params): Query<QueryParams>,
) -> Result<ListResponse<VersionView>, ApiError> {
    children(
        &state,
        &caller,
        (kind, owner, source),
        VersionSelector::Named(version),
        uri.path(),
        params,
    )
    .await
}

/// Lists the versions whose parent is the released version.
///
/// `GET /{owner_kind}/{owner}/sources/{source}/latest/children`
pub async fn list_latest_children(
    State(state): State<AppState>,
    Path(path): Path<(String, String, String)>,
    caller: Caller,
    uri: Uri,
    Query(params): Query<QueryParams>,
) -> Result<ListResponse<VersionView>, ApiError> {
    children(
        &state,
        &caller,
        path,
        VersionSelector::Latest,
        uri.path(),
        params,
    )
    .await
}
