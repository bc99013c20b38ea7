//! PostgreSQL storage backend.
//!
//! Requires the `postgres` feature flag:
//! ```toml
//! [dependencies]
//! thinkbright = { features = ["postgres"] }
//! ```

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::models::{
    BlogPost, ChatMessage, Contact, NewBlogPost, NewChatMessage, NewContact, NewPortfolioItem,
    NewProject, NewSubscriber, NewTestimonial, NewUser, PortfolioItem, Project, Subscriber,
    Testimonial, User,
};
use crate::storage::{Storage, StorageError};

/// PostgreSQL-backed [`Storage`] implementation.
#[derive(Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool against `url`.
    pub async fn connect(url: &str) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await
            .map_err(|err| StorageError::Connection {
                message: err.to_string(),
            })?;
        Ok(Self::new(pool))
    }

    /// Create the site tables if they do not exist yet (idempotent).
    pub async fn migrate(&self) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id SERIAL PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                phone TEXT,
                role TEXT NOT NULL DEFAULT 'client',
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(map_err)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS contacts (
                id SERIAL PRIMARY KEY,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                email TEXT NOT NULL,
                phone TEXT,
                service TEXT NOT NULL,
                message TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'new',
                is_read BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(map_err)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS projects (
                id SERIAL PRIMARY KEY,
                user_id INTEGER REFERENCES users(id),
                title TEXT NOT NULL,
                description TEXT,
                service_type TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'planning',
                budget INTEGER,
                deadline TIMESTAMPTZ,
                start_date TIMESTAMPTZ,
                completed_date TIMESTAMPTZ,
                project_url TEXT,
                github_url TEXT,
                notes TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(map_err)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS chat_messages (
                id SERIAL PRIMARY KEY,
                session_id TEXT NOT NULL,
                sender_type TEXT NOT NULL,
                message TEXT NOT NULL,
                metadata TEXT,
                is_read BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(map_err)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS portfolio_items (
                id SERIAL PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT,
                category TEXT NOT NULL,
                technologies TEXT,
                image_url TEXT,
                project_url TEXT,
                client_name TEXT,
                completed_date TIMESTAMPTZ,
                featured BOOLEAN NOT NULL DEFAULT FALSE,
                sort_order INTEGER NOT NULL DEFAULT 0,
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(map_err)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS testimonials (
                id SERIAL PRIMARY KEY,
                client_name TEXT NOT NULL,
                client_title TEXT,
                client_company TEXT,
                message TEXT NOT NULL,
                rating INTEGER NOT NULL,
                avatar_url TEXT,
                project_id INTEGER REFERENCES projects(id),
                featured BOOLEAN NOT NULL DEFAULT FALSE,
                is_approved BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(map_err)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS blog_posts (
                id SERIAL PRIMARY KEY,
                title TEXT NOT NULL,
                slug TEXT NOT NULL UNIQUE,
                excerpt TEXT,
                content TEXT NOT NULL,
                author_id INTEGER REFERENCES users(id),
                category TEXT NOT NULL,
                tags TEXT,
                featured_image TEXT,
                meta_title TEXT,
                meta_description TEXT,
                is_published BOOLEAN NOT NULL DEFAULT FALSE,
                published_at TIMESTAMPTZ,
                view_count INTEGER NOT NULL DEFAULT 0,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(map_err)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS subscribers (
                id SERIAL PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                first_name TEXT,
                last_name TEXT,
                source TEXT,
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                subscribed_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                unsubscribed_at TIMESTAMPTZ
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(map_err)?;

        log::debug!("Site tables migrated");
        Ok(())
    }
}

/// Collapse sqlx failures into the storage error the API layer handles.
/// Unique violations (SQLSTATE 23505) surface the offending column so the
/// routes can answer "already subscribed" instead of a 500.
fn map_err(err: sqlx::Error) -> StorageError {
    if let sqlx::Error::Database(ref db) = err {
        if db.code().as_deref() == Some("23505") {
            let field = match db.constraint() {
                Some(name) if name.contains("slug") => "slug",
                _ => "email",
            };
            return StorageError::duplicate(field);
        }
    }
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StorageError::Connection {
                message: err.to_string(),
            }
        }
        other => StorageError::Query {
            message: other.to_string(),
        },
    }
}

#[async_trait]
impl Storage for PgStorage {
    // ---- Contacts ----

    async fn create_contact(&self, contact: NewContact) -> Result<Contact, StorageError> {
        sqlx::query_as::<_, Contact>(
            r#"
            INSERT INTO contacts (first_name, last_name, email, phone, service, message)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(contact.first_name)
        .bind(contact.last_name)
        .bind(contact.email)
        .bind(contact.phone)
        .bind(contact.service)
        .bind(contact.message)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn contacts(&self) -> Result<Vec<Contact>, StorageError> {
        sqlx::query_as::<_, Contact>(
            "SELECT * FROM contacts ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn contact_by_id(&self, id: i32) -> Result<Option<Contact>, StorageError> {
        sqlx::query_as::<_, Contact>("SELECT * FROM contacts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_err)
    }

    async fn update_contact_status(
        &self,
        id: i32,
        status: &str,
        is_read: Option<bool>,
    ) -> Result<Option<Contact>, StorageError> {
        sqlx::query_as::<_, Contact>(
            r#"
            UPDATE contacts
            SET status = $2, is_read = COALESCE($3, is_read)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(is_read)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)
    }

    // ---- Users ----

    async fn create_user(&self, user: NewUser) -> Result<User, StorageError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, name, phone, role)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(user.email)
        .bind(user.name)
        .bind(user.phone)
        .bind(user.role)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn user_by_id(&self, id: i32) -> Result<Option<User>, StorageError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_err)
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_err)
    }

    // ---- Projects ----

    async fn create_project(&self, project: NewProject) -> Result<Project, StorageError> {
        sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects
                (user_id, title, description, service_type, status, budget,
                 deadline, start_date, completed_date, project_url, github_url, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(project.user_id)
        .bind(project.title)
        .bind(project.description)
        .bind(project.service_type)
        .bind(project.status)
        .bind(project.budget)
        .bind(project.deadline)
        .bind(project.start_date)
        .bind(project.completed_date)
        .bind(project.project_url)
        .bind(project.github_url)
        .bind(project.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn projects(&self) -> Result<Vec<Project>, StorageError> {
        sqlx::query_as::<_, Project>(
            "SELECT * FROM projects ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn projects_by_user(&self, user_id: i32) -> Result<Vec<Project>, StorageError> {
        sqlx::query_as::<_, Project>(
            "SELECT * FROM projects WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn update_project_status(
        &self,
        id: i32,
        status: &str,
    ) -> Result<Option<Project>, StorageError> {
        sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET status = $2, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)
    }

    // ---- Chat ----

    async fn create_chat_message(
        &self,
        message: NewChatMessage,
    ) -> Result<ChatMessage, StorageError> {
        sqlx::query_as::<_, ChatMessage>(
            r#"
            INSERT INTO chat_messages (session_id, sender_type, message, metadata)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(message.session_id)
        .bind(message.sender_type.as_str())
        .bind(message.message)
        .bind(message.metadata)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn chat_messages(&self, session_id: &str) -> Result<Vec<ChatMessage>, StorageError> {
        sqlx::query_as::<_, ChatMessage>(
            "SELECT * FROM chat_messages WHERE session_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn mark_session_read(&self, session_id: &str) -> Result<(), StorageError> {
        sqlx::query("UPDATE chat_messages SET is_read = TRUE WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;
        Ok(())
    }

    // ---- Portfolio ----

    async fn portfolio_items(&self) -> Result<Vec<PortfolioItem>, StorageError> {
        sqlx::query_as::<_, PortfolioItem>(
            r#"
            SELECT * FROM portfolio_items
            WHERE is_active = TRUE
            ORDER BY sort_order ASC, created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn featured_portfolio_items(&self) -> Result<Vec<PortfolioItem>, StorageError> {
        sqlx::query_as::<_, PortfolioItem>(
            r#"
            SELECT * FROM portfolio_items
            WHERE featured = TRUE
            ORDER BY sort_order ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn create_portfolio_item(
        &self,
        item: NewPortfolioItem,
    ) -> Result<PortfolioItem, StorageError> {
        sqlx::query_as::<_, PortfolioItem>(
            r#"
            INSERT INTO portfolio_items
                (title, description, category, technologies, image_url, project_url,
                 client_name, completed_date, featured, sort_order, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(item.title)
        .bind(item.description)
        .bind(item.category)
        .bind(item.technologies)
        .bind(item.image_url)
        .bind(item.project_url)
        .bind(item.client_name)
        .bind(item.completed_date)
        .bind(item.featured)
        .bind(item.sort_order)
        .bind(item.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    // ---- Testimonials ----

    async fn approved_testimonials(&self) -> Result<Vec<Testimonial>, StorageError> {
        sqlx::query_as::<_, Testimonial>(
            r#"
            SELECT * FROM testimonials
            WHERE is_approved = TRUE
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn featured_testimonials(&self) -> Result<Vec<Testimonial>, StorageError> {
        sqlx::query_as::<_, Testimonial>(
            r#"
            SELECT * FROM testimonials
            WHERE featured = TRUE
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn create_testimonial(
        &self,
        testimonial: NewTestimonial,
    ) -> Result<Testimonial, StorageError> {
        sqlx::query_as::<_, Testimonial>(
            r#"
            INSERT INTO testimonials
                (client_name, client_title, client_company, message, rating,
                 avatar_url, project_id, featured, is_approved)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(testimonial.client_name)
        .bind(testimonial.client_title)
        .bind(testimonial.client_company)
        .bind(testimonial.message)
        .bind(testimonial.rating)
        .bind(testimonial.avatar_url)
        .bind(testimonial.project_id)
        .bind(testimonial.featured)
        .bind(testimonial.is_approved)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    // ---- Blog ----

    async fn published_posts(&self) -> Result<Vec<BlogPost>, StorageError> {
        sqlx::query_as::<_, BlogPost>(
            r#"
            SELECT * FROM blog_posts
            WHERE is_published = TRUE
            ORDER BY published_at DESC NULLS LAST, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn post_by_slug(&self, slug: &str) -> Result<Option<BlogPost>, StorageError> {
        sqlx::query_as::<_, BlogPost>("SELECT * FROM blog_posts WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_err)
    }

    async fn create_blog_post(&self, post: NewBlogPost) -> Result<BlogPost, StorageError> {
        sqlx::query_as::<_, BlogPost>(
            r#"
            INSERT INTO blog_posts
                (title, slug, excerpt, content, author_id, category, tags,
                 featured_image, meta_title, meta_description, is_published, published_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(post.title)
        .bind(post.slug)
        .bind(post.excerpt)
        .bind(post.content)
        .bind(post.author_id)
        .bind(post.category)
        .bind(post.tags)
        .bind(post.featured_image)
        .bind(post.meta_title)
        .bind(post.meta_description)
        .bind(post.is_published)
        .bind(post.published_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    // ---- Newsletter ----

    async fn create_subscriber(
        &self,
        subscriber: NewSubscriber,
    ) -> Result<Subscriber, StorageError> {
        sqlx::query_as::<_, Subscriber>(
            r#"
            INSERT INTO subscribers (email, first_name, last_name, source)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(subscriber.email)
        .bind(subscriber.first_name)
        .bind(subscriber.last_name)
        .bind(subscriber.source)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn active_subscribers(&self) -> Result<Vec<Subscriber>, StorageError> {
        sqlx::query_as::<_, Subscriber>(
            r#"
            SELECT * FROM subscribers
            WHERE is_active = TRUE
            ORDER BY subscribed_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)
    }
}
