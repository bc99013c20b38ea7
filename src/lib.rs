//! # ThinkBright Site Backend
//!
//! The server side of the ThinkBright Web Solutions marketing site: a JSON
//! API for the contact form, live-chat widget, portfolio and testimonial
//! sections, and newsletter signup, backed by a relational schema with
//! in-memory and PostgreSQL backends.
//!
//! The chat widget gets its replies from a fixed keyword rule table
//! ([`responder`]); there is no model, ranking, or session state behind it.

pub mod config;
pub mod models;
pub mod notify;
pub mod responder;
pub mod server;
pub mod storage;

pub use models::{
    BlogPost, ChatMessage, Contact, PortfolioItem, Project, SenderType, Subscriber, Testimonial,
    User,
};
pub use server::{api_router, app_router, AppState};
pub use storage::{MemStorage, Storage, StorageError};

/// Library version.
pub const VERSION: &str = "0.3.1";
