//! Access rules for sources and their versions.
//!
//! Versions carry no access settings of their own; every version check is
//! evaluated against the parent source.

use axum::http::Method;

use ocl_core::{OwnerRef, OwnerType, Source};

use crate::auth::Principal;

/// The level of access a request needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    View,
    Edit,
}

impl Access {
    /// Safe methods need view access; everything else needs edit access.
    pub fn for_method(method: &Method) -> Self {
        if *method == Method::GET || *method == Method::HEAD {
            Access::View
        } else {
            Access::Edit
        }
    }
}

/// Whether `principal` owns resources of `owner`, either as the user
/// itself or as a member of the organization. `is_member` answers the
/// organization case.
pub fn is_owner(
    principal: &Principal,
    owner: &OwnerRef,
    is_member: impl FnOnce(&str) -> bool,
) -> bool {
    match (principal.username(), owner.owner_type) {
        (None, _) => false,
        (Some(user), OwnerType::User) => user == owner.name,
        (Some(user), OwnerType::Organization) => is_member(user),
    }
}

/// Decides whether `principal` may access `source` at `access`.
pub fn may_access(
    principal: &Principal,
    source: &Source,
    access: Access,
    is_member: impl FnOnce(&str) -> bool,
) -> bool {
    if principal.is_staff() {
        return true;
    }
    let public = match access {
        Access::View => source.public_access.allows_view(),
        Access::Edit => principal.is_authenticated() && source.public_access.allows_edit(),
    };
    public || is_owner(principal, &source.owner_ref(), is_member)
}

/// Decides whether `principal` may create sources under `owner`.
pub fn may_create_under(
    principal: &Principal,
    owner: &OwnerRef,
    is_member: impl FnOnce(&str) -> bool,
) -> bool {
    principal.is_staff() || is_owner(principal, owner, is_member)
}
