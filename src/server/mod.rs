//! HTTP server for the site backend.
//!
//! Serves the JSON API the marketing site's widgets talk to, plus the
//! static site itself for every non-API path.
//!
//! # Endpoints
//!
//! - `GET  /api/health`             — Liveness + database status
//! - `POST /api/contact`            — Contact form submission
//! - `GET  /api/portfolio`          — Active portfolio items
//! - `GET  /api/testimonials`       — Approved testimonials
//! - `POST /api/chat`               — Chat message + canned bot reply
//! - `GET  /api/chat/{session_id}`  — A session's transcript
//! - `POST /api/subscribe`          — Newsletter signup

pub mod routes;

pub use routes::{api_router, app_router, AppState};
