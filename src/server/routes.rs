//! Axum route handlers for the site API.
//!
//! # Routes
//!
//! - `GET  /api/health`            — Returns status, version, database state
//! - `POST /api/contact`           — Validates and stores a contact submission
//! - `GET  /api/portfolio`         — Active portfolio items, curated order
//! - `GET  /api/testimonials`      — Approved testimonials, newest first
//! - `POST /api/chat`              — Stores a visitor message and the bot reply
//! - `GET  /api/chat/{session_id}` — Full transcript of one chat session
//! - `POST /api/subscribe`         — Newsletter signup with duplicate handling
//!
//! Every JSON response carries a `success` flag; failures add a human-readable
//! `message`. POST bodies are parsed from the raw bytes so that malformed
//! JSON, UTF-8 or not, gets the same 400 envelope as any other client mistake.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::models::{NewChatMessage, NewContact, NewSubscriber, SenderType};
use crate::notify::ContactRelay;
use crate::responder;
use crate::storage::Storage;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    /// Active storage backend.
    pub storage: Arc<dyn Storage>,
    /// Relay for new contact submissions, when a webhook is configured.
    pub relay: Option<ContactRelay>,
    /// What the health endpoint reports for the database.
    pub database: &'static str,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            relay: None,
            database: "not configured",
        }
    }
}

/// Build the full site router: the JSON API nested under `/api`, static
/// assets for everything else.
pub fn app_router(state: AppState, static_dir: &str) -> Router {
    Router::new()
        .nest("/api", api_router(state))
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
}

/// Build the `/api` router with all routes.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/contact", post(contact_handler))
        .route("/portfolio", get(portfolio_handler))
        .route("/testimonials", get(testimonials_handler))
        .route("/chat", post(chat_handler))
        .route("/chat/{session_id}", get(transcript_handler))
        .route("/subscribe", post(subscribe_handler))
        .fallback(not_found_handler)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Contact form body. Everything optional at parse time; presence is
/// validated by the handler so the client gets one uniform 400.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContactForm {
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    service: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Chat widget body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatForm {
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    sender_type: Option<SenderType>,
}

/// Newsletter signup body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscribeForm {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    source: Option<String>,
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn api_error(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(serde_json::json!({ "success": false, "message": message })),
    )
}

/// Parse a raw POST body, answering 400 "Invalid JSON data" on failure.
fn parse_body<T: serde::de::DeserializeOwned>(
    body: &[u8],
) -> Result<T, (StatusCode, Json<Value>)> {
    serde_json::from_slice(body)
        .map_err(|_| api_error(StatusCode::BAD_REQUEST, "Invalid JSON data"))
}

/// JS-style presence check: absent and empty both count as missing.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/health — liveness probe plus database status.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "database": state.database,
    }))
}

/// POST /api/contact — validate and store a contact form submission.
async fn contact_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let form: ContactForm = parse_body(&body)?;

    let (Some(first_name), Some(last_name), Some(email), Some(service), Some(message)) = (
        non_empty(form.first_name),
        non_empty(form.last_name),
        non_empty(form.email),
        non_empty(form.service),
        non_empty(form.message),
    ) else {
        return Err(api_error(StatusCode::BAD_REQUEST, "Missing required fields"));
    };

    if !EMAIL_PATTERN.is_match(&email) {
        return Err(api_error(StatusCode::BAD_REQUEST, "Invalid email format"));
    }

    let contact = state
        .storage
        .create_contact(NewContact {
            first_name,
            last_name,
            email,
            phone: non_empty(form.phone),
            service,
            message,
        })
        .await
        .map_err(|e| {
            tracing::error!("Contact creation failed: {}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        })?;

    if let Some(relay) = &state.relay {
        relay.dispatch(&contact);
    }

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Contact form submitted successfully",
        "contactId": contact.id,
    })))
}

/// GET /api/portfolio — active portfolio items in curated order.
async fn portfolio_handler(
    State(state): State<AppState>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let items = state.storage.portfolio_items().await.map_err(|e| {
        tracing::error!("Portfolio listing failed: {}", e);
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Error fetching portfolio items",
        )
    })?;

    Ok(Json(serde_json::json!({ "success": true, "data": items })))
}

/// GET /api/testimonials — approved testimonials, newest first.
async fn testimonials_handler(
    State(state): State<AppState>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let testimonials = state.storage.approved_testimonials().await.map_err(|e| {
        tracing::error!("Testimonial listing failed: {}", e);
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Error fetching testimonials",
        )
    })?;

    Ok(Json(serde_json::json!({ "success": true, "data": testimonials })))
}

/// POST /api/chat — store a visitor message, answer with the canned reply.
///
/// Both rows come back so the widget can render them with server ids and
/// timestamps.
async fn chat_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let form: ChatForm = parse_body(&body)?;

    let (Some(session_id), Some(message)) =
        (non_empty(form.session_id), non_empty(form.message))
    else {
        return Err(api_error(StatusCode::BAD_REQUEST, "Missing required fields"));
    };

    let reply = responder::reply_to(&message);

    let store_failed = |e| {
        tracing::error!("Chat message creation failed: {}", e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    };

    let user_message = state
        .storage
        .create_chat_message(NewChatMessage {
            session_id: session_id.clone(),
            sender_type: form.sender_type.unwrap_or_default(),
            message,
            metadata: None,
        })
        .await
        .map_err(store_failed)?;

    let bot_message = state
        .storage
        .create_chat_message(NewChatMessage {
            session_id,
            sender_type: SenderType::Bot,
            message: reply.to_string(),
            metadata: None,
        })
        .await
        .map_err(store_failed)?;

    Ok(Json(serde_json::json!({
        "success": true,
        "userMessage": user_message,
        "botResponse": bot_message,
    })))
}

/// GET /api/chat/{session_id} — full transcript of one session, oldest first.
async fn transcript_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let messages = state.storage.chat_messages(&session_id).await.map_err(|e| {
        tracing::error!("Transcript fetch failed: {}", e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    })?;

    Ok(Json(serde_json::json!({ "success": true, "data": messages })))
}

/// POST /api/subscribe — newsletter signup.
async fn subscribe_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let form: SubscribeForm = parse_body(&body)?;

    let Some(email) = non_empty(form.email) else {
        return Err(api_error(StatusCode::BAD_REQUEST, "Email is required"));
    };

    if !EMAIL_PATTERN.is_match(&email) {
        return Err(api_error(StatusCode::BAD_REQUEST, "Invalid email format"));
    }

    let subscriber = state
        .storage
        .create_subscriber(NewSubscriber {
            email,
            first_name: non_empty(form.first_name),
            last_name: non_empty(form.last_name),
            source: non_empty(form.source).or_else(|| Some("website".to_string())),
        })
        .await
        .map_err(|e| {
            if e.is_duplicate() {
                api_error(StatusCode::BAD_REQUEST, "Email already subscribed")
            } else {
                tracing::error!("Subscriber creation failed: {}", e);
                api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        })?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Successfully subscribed to newsletter",
        "subscriberId": subscriber.id,
    })))
}

/// Fallback for unknown `/api` paths.
async fn not_found_handler() -> (StatusCode, Json<Value>) {
    api_error(StatusCode::NOT_FOUND, "API endpoint not found")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::models::{NewPortfolioItem, NewTestimonial};
    use crate::storage::MemStorage;

    fn test_state() -> AppState {
        AppState::new(Arc::new(MemStorage::new()))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = api_router(test_state());

        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], crate::VERSION);
        assert_eq!(json["database"], "not configured");
        assert!(json["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_contact_submission_round_trip() {
        let state = test_state();
        let app = api_router(state.clone());

        let response = app
            .oneshot(post_json(
                "/contact",
                r#"{
                    "firstName": "Ada",
                    "lastName": "Lovelace",
                    "email": "ada@example.com",
                    "phone": "555-0100",
                    "service": "website",
                    "message": "I need a new site"
                }"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Contact form submitted successfully");
        assert_eq!(json["contactId"], 1);

        let stored = state.storage.contacts().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].status, "new");
        assert!(!stored[0].is_read);
    }

    #[tokio::test]
    async fn test_contact_missing_fields() {
        let app = api_router(test_state());

        // service omitted entirely
        let response = app
            .clone()
            .oneshot(post_json(
                "/contact",
                r#"{"firstName": "Ada", "lastName": "L", "email": "a@b.co", "message": "hi"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["message"], "Missing required fields");

        // empty string counts as missing
        let response = app
            .oneshot(post_json(
                "/contact",
                r#"{"firstName": "", "lastName": "L", "email": "a@b.co", "service": "web", "message": "hi"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["message"], "Missing required fields");
    }

    #[tokio::test]
    async fn test_contact_rejects_bad_email() {
        let app = api_router(test_state());

        let response = app
            .oneshot(post_json(
                "/contact",
                r#"{"firstName": "Ada", "lastName": "L", "email": "not-an-email", "service": "web", "message": "hi"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["message"], "Invalid email format");
    }

    #[tokio::test]
    async fn test_contact_rejects_malformed_json() {
        let app = api_router(test_state());

        let response = app
            .oneshot(post_json("/contact", "this is not json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["message"], "Invalid JSON data");
    }

    #[tokio::test]
    async fn test_contact_rejects_non_utf8_body() {
        let app = api_router(test_state());

        let request = Request::builder()
            .method("POST")
            .uri("/contact")
            .header("Content-Type", "application/json")
            .body(Body::from(vec![0xf0, 0x28, 0x8c, 0x28]))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["message"], "Invalid JSON data");
    }

    #[tokio::test]
    async fn test_chat_stores_both_sides() {
        let state = test_state();
        let app = api_router(state.clone());

        let response = app
            .oneshot(post_json(
                "/chat",
                r#"{"sessionId": "s1", "message": "What are your prices?"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["userMessage"]["senderType"], "user");
        assert_eq!(json["userMessage"]["message"], "What are your prices?");
        assert_eq!(json["botResponse"]["senderType"], "bot");
        assert!(json["botResponse"]["message"]
            .as_str()
            .unwrap()
            .contains("pricing"));

        let transcript = state.storage.chat_messages("s1").await.unwrap();
        assert_eq!(transcript.len(), 2);
    }

    #[tokio::test]
    async fn test_chat_missing_message() {
        let app = api_router(test_state());

        let response = app
            .oneshot(post_json("/chat", r#"{"sessionId": "s1"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["message"], "Missing required fields");
    }

    #[tokio::test]
    async fn test_chat_transcript_route() {
        let app = api_router(test_state());

        let response = app
            .clone()
            .oneshot(post_json(
                "/chat",
                r#"{"sessionId": "talk-1", "message": "hello there"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(get("/chat/talk-1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        let data = json["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["senderType"], "user");
        assert_eq!(data[1]["senderType"], "bot");
    }

    #[tokio::test]
    async fn test_subscribe_then_duplicate() {
        let app = api_router(test_state());
        let body = r#"{"email": "fan@example.com", "firstName": "Fan"}"#;

        let response = app.clone().oneshot(post_json("/subscribe", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Successfully subscribed to newsletter");
        assert_eq!(json["subscriberId"], 1);

        let response = app.oneshot(post_json("/subscribe", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["message"], "Email already subscribed");
    }

    #[tokio::test]
    async fn test_subscribe_requires_email() {
        let app = api_router(test_state());

        let response = app
            .clone()
            .oneshot(post_json("/subscribe", r#"{"firstName": "Fan"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["message"], "Email is required");

        let response = app
            .oneshot(post_json("/subscribe", r#"{"email": "nope"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["message"], "Invalid email format");
    }

    #[tokio::test]
    async fn test_portfolio_lists_active_items() {
        let state = test_state();
        let app = api_router(state.clone());

        let item = |title: &str, sort: i32, active: bool| NewPortfolioItem {
            title: title.to_string(),
            description: None,
            category: "website".to_string(),
            technologies: Some(r#"["Rust"]"#.to_string()),
            image_url: None,
            project_url: None,
            client_name: None,
            completed_date: None,
            featured: false,
            sort_order: sort,
            is_active: active,
        };
        state.storage.create_portfolio_item(item("second", 2, true)).await.unwrap();
        state.storage.create_portfolio_item(item("first", 1, true)).await.unwrap();
        state.storage.create_portfolio_item(item("hidden", 0, false)).await.unwrap();

        let response = app.oneshot(get("/portfolio")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        let data = json["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["title"], "first");
        assert_eq!(data[1]["title"], "second");
        // camelCase on the wire
        assert!(data[0]["sortOrder"].is_number());
    }

    #[tokio::test]
    async fn test_testimonials_lists_approved_only() {
        let state = test_state();
        let app = api_router(state.clone());

        let testimonial = |name: &str, approved: bool| NewTestimonial {
            client_name: name.to_string(),
            client_title: None,
            client_company: None,
            message: "Great team".to_string(),
            rating: 5,
            avatar_url: None,
            project_id: None,
            featured: false,
            is_approved: approved,
        };
        state.storage.create_testimonial(testimonial("pending", false)).await.unwrap();
        state.storage.create_testimonial(testimonial("live", true)).await.unwrap();

        let response = app.oneshot(get("/testimonials")).await.unwrap();
        let json = body_json(response).await;
        let data = json["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["clientName"], "live");
    }

    #[tokio::test]
    async fn test_unknown_api_path_is_404() {
        let app = api_router(test_state());

        let response = app.oneshot(get("/blogposts")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["message"], "API endpoint not found");
    }

    #[tokio::test]
    async fn test_api_nested_under_prefix() {
        let app = app_router(test_state(), "public");

        let response = app.oneshot(get("/api/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }
}
