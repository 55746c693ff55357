//! Defines routes for the SEO page endpoints.
//!
//! ## Structure
//! - **Page collection**
//!   - `GET    /pages` — list stored page codes
//!   - `POST   /pages` — create a page
//!
//! - **Single page**
//!   - `GET    /pages/{code}` — fetch a page with expanded SEO data
//!   - `PUT    /pages/{code}` — replace the page's metadata wholesale
//!   - `DELETE /pages/{code}` — remove the page
//!
//! Health endpoints (`/healthz`, `/readyz`) are mounted at the root.

use crate::{
    handlers::{
        health_handlers::{healthz, readyz},
        page_handlers::{create_page, delete_page, get_page, list_pages, update_page},
    },
    services::page_service::PageService,
};
use axum::{
    Router,
    routing::get,
};

/// Build and return the router for all page routes.
///
/// The router carries shared state (`PageService`) to all handlers.
pub fn routes() -> Router<PageService> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // single-page routes
        .route(
            "/pages/{code}",
            get(get_page).put(update_page).delete(delete_page),
        )
        // collection routes
        .route("/pages", get(list_pages).post(create_page))
}
