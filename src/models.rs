//! Row and insert types for the site database.
//!
//! Every table the site touches lives here, in the shape the REST API
//! exposes: snake_case columns in the store, camelCase keys on the wire.
//! `New*` types carry exactly the caller-supplied columns; server-managed
//! columns (ids, timestamps, read flags) are filled in by the storage layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a chat message.
///
/// Stored as the lowercase string in the `sender_type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderType {
    User,
    Bot,
    Agent,
}

impl SenderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SenderType::User => "user",
            SenderType::Bot => "bot",
            SenderType::Agent => "agent",
        }
    }
}

impl Default for SenderType {
    fn default() -> Self {
        SenderType::User
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// A registered user (client, staff member, or admin).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Columns supplied when creating a user. `role` defaults to `"client"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default = "default_user_role")]
    pub role: String,
}

fn default_user_role() -> String {
    "client".to_string()
}

// ---------------------------------------------------------------------------
// Contacts
// ---------------------------------------------------------------------------

/// A contact form submission.
///
/// `status` moves through new → contacted → in-progress → completed as the
/// team works the lead; new submissions always start at `"new"`, unread.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub service: String,
    pub message: String,
    pub status: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Columns supplied by the contact form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub service: String,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

/// A client project tracked through delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i32,
    pub user_id: Option<i32>,
    pub title: String,
    pub description: Option<String>,
    pub service_type: String,
    pub status: String,
    /// Budget in cents.
    pub budget: Option<i32>,
    pub deadline: Option<DateTime<Utc>>,
    pub start_date: Option<DateTime<Utc>>,
    pub completed_date: Option<DateTime<Utc>>,
    pub project_url: Option<String>,
    pub github_url: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Columns supplied when opening a project. `status` defaults to `"planning"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    #[serde(default)]
    pub user_id: Option<i32>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub service_type: String,
    #[serde(default = "default_project_status")]
    pub status: String,
    #[serde(default)]
    pub budget: Option<i32>,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub project_url: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_project_status() -> String {
    "planning".to_string()
}

// ---------------------------------------------------------------------------
// Chat messages
// ---------------------------------------------------------------------------

/// One message in a live-chat session.
///
/// `session_id` is minted by the widget and groups a visitor's whole
/// conversation; the server never invents one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: i32,
    pub session_id: String,
    pub sender_type: String,
    pub message: String,
    /// Free-form JSON string for widget extras.
    pub metadata: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Columns supplied when persisting a chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChatMessage {
    pub session_id: String,
    #[serde(default)]
    pub sender_type: SenderType,
    pub message: String,
    #[serde(default)]
    pub metadata: Option<String>,
}

// ---------------------------------------------------------------------------
// Portfolio
// ---------------------------------------------------------------------------

/// A showcased piece of work.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct PortfolioItem {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    /// JSON array string of technologies used.
    pub technologies: Option<String>,
    pub image_url: Option<String>,
    pub project_url: Option<String>,
    pub client_name: Option<String>,
    pub completed_date: Option<DateTime<Utc>>,
    pub featured: bool,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Columns supplied when adding a portfolio item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPortfolioItem {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: String,
    #[serde(default)]
    pub technologies: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub project_url: Option<String>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub completed_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

// ---------------------------------------------------------------------------
// Testimonials
// ---------------------------------------------------------------------------

/// A client testimonial. Only approved testimonials are served publicly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    pub id: i32,
    pub client_name: String,
    pub client_title: Option<String>,
    pub client_company: Option<String>,
    pub message: String,
    /// 1-5 stars.
    pub rating: i32,
    pub avatar_url: Option<String>,
    pub project_id: Option<i32>,
    pub featured: bool,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

/// Columns supplied when recording a testimonial. New entries are neither
/// featured nor approved until reviewed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTestimonial {
    pub client_name: String,
    #[serde(default)]
    pub client_title: Option<String>,
    #[serde(default)]
    pub client_company: Option<String>,
    pub message: String,
    pub rating: i32,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub project_id: Option<i32>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub is_approved: bool,
}

// ---------------------------------------------------------------------------
// Blog posts
// ---------------------------------------------------------------------------

/// A content-marketing article.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub author_id: Option<i32>,
    pub category: String,
    /// JSON array string of tags.
    pub tags: Option<String>,
    pub featured_image: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub view_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Columns supplied when drafting a post. Posts start unpublished with a
/// zero view count.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBlogPost {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    pub content: String,
    #[serde(default)]
    pub author_id: Option<i32>,
    pub category: String,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub meta_title: Option<String>,
    #[serde(default)]
    pub meta_description: Option<String>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Newsletter subscribers
// ---------------------------------------------------------------------------

/// A newsletter subscriber. Email is unique across the table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub id: i32,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Where the signup came from: website, social, referral.
    pub source: Option<String>,
    pub is_active: bool,
    pub subscribed_at: DateTime<Utc>,
    pub unsubscribed_at: Option<DateTime<Utc>>,
}

/// Columns supplied when subscribing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubscriber {
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_type_round_trip() {
        assert_eq!(serde_json::to_string(&SenderType::Bot).unwrap(), "\"bot\"");
        let parsed: SenderType = serde_json::from_str("\"agent\"").unwrap();
        assert_eq!(parsed, SenderType::Agent);
        assert_eq!(SenderType::User.as_str(), "user");
    }

    #[test]
    fn test_sender_type_rejects_unknown() {
        let parsed: Result<SenderType, _> = serde_json::from_str("\"visitor\"");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_contact_serializes_camel_case() {
        let contact = Contact {
            id: 7,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: None,
            service: "website".to_string(),
            message: "Need a site".to_string(),
            status: "new".to_string(),
            is_read: false,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&contact).unwrap();
        assert_eq!(json["firstName"], "Ada");
        assert_eq!(json["isRead"], false);
        assert!(json.get("first_name").is_none());
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_new_contact_accepts_form_payload() {
        let form: NewContact = serde_json::from_str(
            r#"{
                "firstName": "Grace",
                "lastName": "Hopper",
                "email": "grace@example.com",
                "service": "mobile-app",
                "message": "Quote please"
            }"#,
        )
        .unwrap();

        assert_eq!(form.first_name, "Grace");
        assert_eq!(form.phone, None);
    }

    #[test]
    fn test_new_chat_message_defaults_to_user_sender() {
        let msg: NewChatMessage = serde_json::from_str(
            r#"{"sessionId": "session_1", "message": "hello"}"#,
        )
        .unwrap();

        assert_eq!(msg.sender_type, SenderType::User);
        assert_eq!(msg.metadata, None);
    }

    #[test]
    fn test_new_portfolio_item_defaults() {
        let item: NewPortfolioItem = serde_json::from_str(
            r#"{"title": "Shop", "category": "ecommerce"}"#,
        )
        .unwrap();

        assert!(!item.featured);
        assert_eq!(item.sort_order, 0);
        assert!(item.is_active);
    }

    #[test]
    fn test_new_user_role_defaults_to_client() {
        let user: NewUser = serde_json::from_str(
            r#"{"email": "kay@example.com", "name": "Kay"}"#,
        )
        .unwrap();

        assert_eq!(user.role, "client");
    }
}
