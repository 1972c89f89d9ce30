//! Backend for a personal portfolio site.
//!
//! Serves the JSON collections behind the public pages and the admin
//! screen (projects, achievements, testimonials) from flat files in a
//! data directory.

pub mod config;
pub mod error;
pub mod logic;
pub mod models;
pub mod repository;
pub mod routes_projects;
pub mod routes_records;
pub mod routes_support;
pub mod store;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Body,
    http::Request,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::{services::ServeDir, trace::TraceLayer};
use uuid::Uuid;

use crate::models::Collection;
use crate::repository::Repository;
use crate::store::DocumentStore;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub repo: Repository,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            repo: Repository::new(store),
        }
    }
}

/// Build the HTTP router.
///
/// `static_dir`, when given, is served for every path the API does not claim.
pub fn build_router(state: AppState, static_dir: Option<PathBuf>) -> Router {
    let api = Router::new()
        // projects
        .route(
            "/projects",
            get(routes_projects::get_projects)
                .post(routes_projects::create_project)
                .put(routes_projects::update_project)
                .delete(routes_projects::delete_project),
        )
        // achievements, testimonials
        .route("/achievements", routes_records::routes(Collection::Achievements))
        .route("/testimonials", routes_records::routes(Collection::Testimonials));

    let mut app = Router::new()
        .nest("/api", api)
        .route("/healthz", get(|| async { Json(json!({ "status": "ok" })) }));

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(
        TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
            tracing::info_span!(
                "request",
                request_id = %Uuid::new_v4(),
                method = %req.method(),
                path = %req.uri().path()
            )
        }),
    )
    .with_state(state)
}
