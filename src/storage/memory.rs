//! In-memory storage backend.
//!
//! Backs the server when no database is configured and the whole test
//! suite. Rows live in `RwLock`-guarded vectors; nothing is ever deleted,
//! so `len + 1` hands out the same ids a SERIAL column would.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use crate::models::{
    BlogPost, ChatMessage, Contact, NewBlogPost, NewChatMessage, NewContact, NewPortfolioItem,
    NewProject, NewSubscriber, NewTestimonial, NewUser, PortfolioItem, Project, Subscriber,
    Testimonial, User,
};
use crate::storage::{Storage, StorageError};

#[derive(Default)]
struct MemInner {
    users: Vec<User>,
    contacts: Vec<Contact>,
    projects: Vec<Project>,
    chat_messages: Vec<ChatMessage>,
    portfolio_items: Vec<PortfolioItem>,
    testimonials: Vec<Testimonial>,
    blog_posts: Vec<BlogPost>,
    subscribers: Vec<Subscriber>,
}

/// In-process [`Storage`] implementation.
pub struct MemStorage {
    inner: RwLock<MemInner>,
}

impl MemStorage {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemInner::default()),
        }
    }
}

impl Default for MemStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> StorageError {
    StorageError::Connection {
        message: "storage lock poisoned".to_string(),
    }
}

#[async_trait]
impl Storage for MemStorage {
    // ---- Contacts ----

    async fn create_contact(&self, contact: NewContact) -> Result<Contact, StorageError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        let row = Contact {
            id: inner.contacts.len() as i32 + 1,
            first_name: contact.first_name,
            last_name: contact.last_name,
            email: contact.email,
            phone: contact.phone,
            service: contact.service,
            message: contact.message,
            status: "new".to_string(),
            is_read: false,
            created_at: Utc::now(),
        };
        inner.contacts.push(row.clone());
        Ok(row)
    }

    async fn contacts(&self) -> Result<Vec<Contact>, StorageError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        let mut rows = inner.contacts.clone();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(rows)
    }

    async fn contact_by_id(&self, id: i32) -> Result<Option<Contact>, StorageError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        Ok(inner.contacts.iter().find(|c| c.id == id).cloned())
    }

    async fn update_contact_status(
        &self,
        id: i32,
        status: &str,
        is_read: Option<bool>,
    ) -> Result<Option<Contact>, StorageError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        let Some(contact) = inner.contacts.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        contact.status = status.to_string();
        if let Some(read) = is_read {
            contact.is_read = read;
        }
        Ok(Some(contact.clone()))
    }

    // ---- Users ----

    async fn create_user(&self, user: NewUser) -> Result<User, StorageError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        if inner.users.iter().any(|u| u.email == user.email) {
            return Err(StorageError::duplicate("email"));
        }
        let now = Utc::now();
        let row = User {
            id: inner.users.len() as i32 + 1,
            email: user.email,
            name: user.name,
            phone: user.phone,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        inner.users.push(row.clone());
        Ok(row)
    }

    async fn user_by_id(&self, id: i32) -> Result<Option<User>, StorageError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    // ---- Projects ----

    async fn create_project(&self, project: NewProject) -> Result<Project, StorageError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        let now = Utc::now();
        let row = Project {
            id: inner.projects.len() as i32 + 1,
            user_id: project.user_id,
            title: project.title,
            description: project.description,
            service_type: project.service_type,
            status: project.status,
            budget: project.budget,
            deadline: project.deadline,
            start_date: project.start_date,
            completed_date: project.completed_date,
            project_url: project.project_url,
            github_url: project.github_url,
            notes: project.notes,
            created_at: now,
            updated_at: now,
        };
        inner.projects.push(row.clone());
        Ok(row)
    }

    async fn projects(&self) -> Result<Vec<Project>, StorageError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        let mut rows = inner.projects.clone();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(rows)
    }

    async fn projects_by_user(&self, user_id: i32) -> Result<Vec<Project>, StorageError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        let mut rows: Vec<Project> = inner
            .projects
            .iter()
            .filter(|p| p.user_id == Some(user_id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(rows)
    }

    async fn update_project_status(
        &self,
        id: i32,
        status: &str,
    ) -> Result<Option<Project>, StorageError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        let Some(project) = inner.projects.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        project.status = status.to_string();
        project.updated_at = Utc::now();
        Ok(Some(project.clone()))
    }

    // ---- Chat ----

    async fn create_chat_message(
        &self,
        message: NewChatMessage,
    ) -> Result<ChatMessage, StorageError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        let row = ChatMessage {
            id: inner.chat_messages.len() as i32 + 1,
            session_id: message.session_id,
            sender_type: message.sender_type.as_str().to_string(),
            message: message.message,
            metadata: message.metadata,
            is_read: false,
            created_at: Utc::now(),
        };
        inner.chat_messages.push(row.clone());
        Ok(row)
    }

    async fn chat_messages(&self, session_id: &str) -> Result<Vec<ChatMessage>, StorageError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        let mut rows: Vec<ChatMessage> = inner
            .chat_messages
            .iter()
            .filter(|m| m.session_id == session_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(rows)
    }

    async fn mark_session_read(&self, session_id: &str) -> Result<(), StorageError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        for message in inner
            .chat_messages
            .iter_mut()
            .filter(|m| m.session_id == session_id)
        {
            message.is_read = true;
        }
        Ok(())
    }

    // ---- Portfolio ----

    async fn portfolio_items(&self) -> Result<Vec<PortfolioItem>, StorageError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        let mut rows: Vec<PortfolioItem> = inner
            .portfolio_items
            .iter()
            .filter(|i| i.is_active)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then((b.created_at, b.id).cmp(&(a.created_at, a.id)))
        });
        Ok(rows)
    }

    async fn featured_portfolio_items(&self) -> Result<Vec<PortfolioItem>, StorageError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        let mut rows: Vec<PortfolioItem> = inner
            .portfolio_items
            .iter()
            .filter(|i| i.featured)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (a.sort_order, a.id).cmp(&(b.sort_order, b.id)));
        Ok(rows)
    }

    async fn create_portfolio_item(
        &self,
        item: NewPortfolioItem,
    ) -> Result<PortfolioItem, StorageError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        let now = Utc::now();
        let row = PortfolioItem {
            id: inner.portfolio_items.len() as i32 + 1,
            title: item.title,
            description: item.description,
            category: item.category,
            technologies: item.technologies,
            image_url: item.image_url,
            project_url: item.project_url,
            client_name: item.client_name,
            completed_date: item.completed_date,
            featured: item.featured,
            sort_order: item.sort_order,
            is_active: item.is_active,
            created_at: now,
            updated_at: now,
        };
        inner.portfolio_items.push(row.clone());
        Ok(row)
    }

    // ---- Testimonials ----

    async fn approved_testimonials(&self) -> Result<Vec<Testimonial>, StorageError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        let mut rows: Vec<Testimonial> = inner
            .testimonials
            .iter()
            .filter(|t| t.is_approved)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(rows)
    }

    async fn featured_testimonials(&self) -> Result<Vec<Testimonial>, StorageError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        let mut rows: Vec<Testimonial> = inner
            .testimonials
            .iter()
            .filter(|t| t.featured)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(rows)
    }

    async fn create_testimonial(
        &self,
        testimonial: NewTestimonial,
    ) -> Result<Testimonial, StorageError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        let row = Testimonial {
            id: inner.testimonials.len() as i32 + 1,
            client_name: testimonial.client_name,
            client_title: testimonial.client_title,
            client_company: testimonial.client_company,
            message: testimonial.message,
            rating: testimonial.rating,
            avatar_url: testimonial.avatar_url,
            project_id: testimonial.project_id,
            featured: testimonial.featured,
            is_approved: testimonial.is_approved,
            created_at: Utc::now(),
        };
        inner.testimonials.push(row.clone());
        Ok(row)
    }

    // ---- Blog ----

    async fn published_posts(&self) -> Result<Vec<BlogPost>, StorageError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        let mut rows: Vec<BlogPost> = inner
            .blog_posts
            .iter()
            .filter(|p| p.is_published)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.published_at, b.id).cmp(&(a.published_at, a.id)));
        Ok(rows)
    }

    async fn post_by_slug(&self, slug: &str) -> Result<Option<BlogPost>, StorageError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        Ok(inner.blog_posts.iter().find(|p| p.slug == slug).cloned())
    }

    async fn create_blog_post(&self, post: NewBlogPost) -> Result<BlogPost, StorageError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        if inner.blog_posts.iter().any(|p| p.slug == post.slug) {
            return Err(StorageError::duplicate("slug"));
        }
        let now = Utc::now();
        let row = BlogPost {
            id: inner.blog_posts.len() as i32 + 1,
            title: post.title,
            slug: post.slug,
            excerpt: post.excerpt,
            content: post.content,
            author_id: post.author_id,
            category: post.category,
            tags: post.tags,
            featured_image: post.featured_image,
            meta_title: post.meta_title,
            meta_description: post.meta_description,
            is_published: post.is_published,
            published_at: post.published_at,
            view_count: 0,
            created_at: now,
            updated_at: now,
        };
        inner.blog_posts.push(row.clone());
        Ok(row)
    }

    // ---- Newsletter ----

    async fn create_subscriber(
        &self,
        subscriber: NewSubscriber,
    ) -> Result<Subscriber, StorageError> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        if inner.subscribers.iter().any(|s| s.email == subscriber.email) {
            return Err(StorageError::duplicate("email"));
        }
        let row = Subscriber {
            id: inner.subscribers.len() as i32 + 1,
            email: subscriber.email,
            first_name: subscriber.first_name,
            last_name: subscriber.last_name,
            source: subscriber.source,
            is_active: true,
            subscribed_at: Utc::now(),
            unsubscribed_at: None,
        };
        inner.subscribers.push(row.clone());
        Ok(row)
    }

    async fn active_subscribers(&self) -> Result<Vec<Subscriber>, StorageError> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        let mut rows: Vec<Subscriber> = inner
            .subscribers
            .iter()
            .filter(|s| s.is_active)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.subscribed_at, b.id).cmp(&(a.subscribed_at, a.id)));
        Ok(rows)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
