//! HTTP routes.

pub mod admin;
pub mod auth;
pub mod health;
pub mod memberships;
pub mod organizations;
pub mod projects;
pub mod settings;

use axum::Router;
use axum::routing::{get, patch, post, put};

use crate::state::SharedState;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route(
            "/organizations",
            get(organizations::list).post(organizations::create),
        )
        .route("/organizations/{id}", axum::routing::delete(organizations::delete))
        .route(
            "/organizations/{id}/members",
            get(memberships::list).post(memberships::add),
        )
        .route(
            "/organizations/{id}/projects",
            post(projects::create),
        )
        .route(
            "/organizations/membership/{id}",
            patch(memberships::change_role).delete(memberships::remove),
        )
        .route("/projects", get(projects::list))
        .route(
            "/projects/{id}",
            get(projects::get).patch(projects::update).delete(projects::delete),
        )
        .route("/settings/{key}", get(settings::get))
        .route(
            "/admin/users",
            get(admin::list_users).patch(admin::change_role),
        )
        .route("/admin/reconcile", post(admin::reconcile))
        .route("/admin/settings", get(settings::list))
        .route("/admin/settings/{key}", put(settings::put))
        .with_state(state)
}
