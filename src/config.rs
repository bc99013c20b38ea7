//! Server configuration.

/// Runtime configuration for the site server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP port to listen on.
    pub port: u16,
    /// PostgreSQL connection string; in-memory storage when unset.
    pub database_url: Option<String>,
    /// Webhook that receives new contact submissions; relay off when unset.
    pub contact_webhook_url: Option<String>,
    /// Directory served for non-API requests.
    pub static_dir: String,
}

impl ServerConfig {
    /// Load from environment variables.
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),
            database_url: std::env::var("DATABASE_URL").ok().filter(|v| !v.is_empty()),
            contact_webhook_url: std::env::var("CONTACT_WEBHOOK_URL")
                .ok()
                .filter(|v| !v.is_empty()),
            static_dir: std::env::var("STATIC_DIR").unwrap_or_else(|_| "public".into()),
        }
    }

    /// Address string for the TCP listener.
    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_addr_formats_port() {
        let config = ServerConfig {
            port: 5000,
            database_url: None,
            contact_webhook_url: None,
            static_dir: "public".to_string(),
        };
        assert_eq!(config.bind_addr(), "0.0.0.0:5000");
    }
}
