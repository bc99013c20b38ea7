//! Persistence for the site: one trait, two backends.
//!
//! [`Storage`] carries every data operation the site performs — contact
//! intake, chat transcripts, portfolio/testimonial listings, blog content,
//! newsletter signups, and the user/project records behind them. Each
//! operation is a single CRUD call; there are no transactions spanning
//! operations.
//!
//! Backends:
//!
//! - [`MemStorage`] — in-process, used when no database is configured and by
//!   the test suite.
//! - [`PgStorage`] — (feature `postgres`) PostgreSQL via sqlx.

pub mod memory;
#[cfg(feature = "postgres")]
pub mod pg;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    BlogPost, ChatMessage, Contact, NewBlogPost, NewChatMessage, NewContact, NewPortfolioItem,
    NewProject, NewSubscriber, NewTestimonial, NewUser, PortfolioItem, Project, Subscriber,
    Testimonial, User,
};

pub use memory::MemStorage;
#[cfg(feature = "postgres")]
pub use pg::PgStorage;

/// Errors surfaced by storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A unique column already holds the given value (subscriber or user
    /// email, blog slug).
    #[error("duplicate value for {field}")]
    Duplicate { field: String },

    /// The backend could not be reached or its lock was poisoned.
    #[error("storage connection error: {message}")]
    Connection { message: String },

    /// A query failed.
    #[error("storage query error: {message}")]
    Query { message: String },
}

impl StorageError {
    pub fn duplicate(field: &str) -> Self {
        StorageError::Duplicate {
            field: field.to_string(),
        }
    }

    /// True when the error is a unique-constraint violation.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, StorageError::Duplicate { .. })
    }
}

/// The full set of data operations behind the site.
///
/// Lookups that miss return `Ok(None)`; only backend failures and duplicate
/// unique values are errors. List operations encode their ordering in the
/// contract: newest-first for feeds, oldest-first for chat transcripts,
/// curator-controlled `sort_order` for the portfolio.
#[async_trait]
pub trait Storage: Send + Sync {
    // ---- Contacts ----

    /// Insert a contact submission with status `"new"`, unread.
    async fn create_contact(&self, contact: NewContact) -> Result<Contact, StorageError>;

    /// All contacts, newest first.
    async fn contacts(&self) -> Result<Vec<Contact>, StorageError>;

    async fn contact_by_id(&self, id: i32) -> Result<Option<Contact>, StorageError>;

    /// Update a contact's workflow status, optionally flipping the read flag.
    /// Returns the updated row, or `None` when the id is unknown.
    async fn update_contact_status(
        &self,
        id: i32,
        status: &str,
        is_read: Option<bool>,
    ) -> Result<Option<Contact>, StorageError>;

    // ---- Users ----

    async fn create_user(&self, user: NewUser) -> Result<User, StorageError>;

    async fn user_by_id(&self, id: i32) -> Result<Option<User>, StorageError>;

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StorageError>;

    // ---- Projects ----

    async fn create_project(&self, project: NewProject) -> Result<Project, StorageError>;

    /// All projects, newest first.
    async fn projects(&self) -> Result<Vec<Project>, StorageError>;

    /// A user's projects, newest first.
    async fn projects_by_user(&self, user_id: i32) -> Result<Vec<Project>, StorageError>;

    /// Update a project's status, touching `updated_at`. Returns the updated
    /// row, or `None` when the id is unknown.
    async fn update_project_status(
        &self,
        id: i32,
        status: &str,
    ) -> Result<Option<Project>, StorageError>;

    // ---- Chat ----

    /// Persist a chat message, unread.
    async fn create_chat_message(
        &self,
        message: NewChatMessage,
    ) -> Result<ChatMessage, StorageError>;

    /// A session's transcript, oldest first.
    async fn chat_messages(&self, session_id: &str) -> Result<Vec<ChatMessage>, StorageError>;

    /// Mark every message in a session as read.
    async fn mark_session_read(&self, session_id: &str) -> Result<(), StorageError>;

    // ---- Portfolio ----

    /// Active portfolio items: `sort_order` ascending, then newest first.
    async fn portfolio_items(&self) -> Result<Vec<PortfolioItem>, StorageError>;

    /// Featured items (active or not), `sort_order` ascending.
    async fn featured_portfolio_items(&self) -> Result<Vec<PortfolioItem>, StorageError>;

    async fn create_portfolio_item(
        &self,
        item: NewPortfolioItem,
    ) -> Result<PortfolioItem, StorageError>;

    // ---- Testimonials ----

    /// Approved testimonials, newest first.
    async fn approved_testimonials(&self) -> Result<Vec<Testimonial>, StorageError>;

    /// Featured testimonials, newest first.
    async fn featured_testimonials(&self) -> Result<Vec<Testimonial>, StorageError>;

    async fn create_testimonial(
        &self,
        testimonial: NewTestimonial,
    ) -> Result<Testimonial, StorageError>;

    // ---- Blog ----

    /// Published posts, most recently published first.
    async fn published_posts(&self) -> Result<Vec<BlogPost>, StorageError>;

    async fn post_by_slug(&self, slug: &str) -> Result<Option<BlogPost>, StorageError>;

    async fn create_blog_post(&self, post: NewBlogPost) -> Result<BlogPost, StorageError>;

    // ---- Newsletter ----

    /// Insert a subscriber. Fails with [`StorageError::Duplicate`] when the
    /// email is already subscribed.
    async fn create_subscriber(
        &self,
        subscriber: NewSubscriber,
    ) -> Result<Subscriber, StorageError>;

    /// Active subscribers, most recently subscribed first.
    async fn active_subscribers(&self) -> Result<Vec<Subscriber>, StorageError>;
}
