//! Outbound contact notifications.
//!
//! New contact submissions can be relayed to an external webhook (a
//! spreadsheet bridge or CRM hook) so the team hears about leads without
//! polling the database. Delivery is fire-and-forget: the form submission
//! never waits on the relay and never fails because of it.

use std::time::Duration;

use serde_json::{json, Value};

use crate::models::Contact;

const RELAY_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts accepted contact submissions to a configured webhook URL.
#[derive(Clone)]
pub struct ContactRelay {
    http: reqwest::Client,
    url: String,
}

impl ContactRelay {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }

    /// Relay `contact` in the background. Failures are logged and dropped.
    pub fn dispatch(&self, contact: &Contact) {
        let http = self.http.clone();
        let url = self.url.clone();
        let payload = relay_payload(contact);
        let contact_id = contact.id;

        tokio::spawn(async move {
            let result = http
                .post(&url)
                .timeout(RELAY_TIMEOUT)
                .json(&payload)
                .send()
                .await;

            match result {
                Ok(resp) if resp.status().is_success() => {
                    tracing::debug!("Relayed contact {} to webhook", contact_id);
                }
                Ok(resp) => {
                    tracing::warn!(
                        "Contact webhook rejected contact {}: HTTP {}",
                        contact_id,
                        resp.status()
                    );
                }
                Err(e) => {
                    tracing::warn!("Contact webhook unreachable for contact {}: {}", contact_id, e);
                }
            }
        });
    }
}

/// The webhook body: form fields plus submission time, internal columns
/// (id, status, read flag) stay home.
fn relay_payload(contact: &Contact) -> Value {
    json!({
        "firstName": contact.first_name,
        "lastName": contact.last_name,
        "email": contact.email,
        "phone": contact.phone,
        "service": contact.service,
        "message": contact.message,
        "submittedAt": contact.created_at.to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_relay_payload_carries_form_fields_only() {
        let contact = Contact {
            id: 1,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: Some("555-0100".to_string()),
            service: "website".to_string(),
            message: "Need a site".to_string(),
            status: "new".to_string(),
            is_read: false,
            created_at: Utc::now(),
        };

        let payload = relay_payload(&contact);
        assert_eq!(payload["firstName"], "Ada");
        assert_eq!(payload["phone"], "555-0100");
        assert!(payload.get("status").is_none());
        assert!(payload.get("id").is_none());
        assert!(payload["submittedAt"].is_string());
    }

    #[test]
    fn test_relay_payload_null_phone() {
        let contact = Contact {
            id: 2,
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            email: "grace@example.com".to_string(),
            phone: None,
            service: "consulting".to_string(),
            message: "Hello".to_string(),
            status: "new".to_string(),
            is_read: false,
            created_at: Utc::now(),
        };

        assert!(relay_payload(&contact)["phone"].is_null());
    }
}
