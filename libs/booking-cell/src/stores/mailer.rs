// libs/booking-cell/src/stores/mailer.rs
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::debug;

use shared_config::AppConfig;

use crate::stores::{MailDispatcher, MailMessage};

/// Dispatcher backed by a transactional-mail HTTP API. Best-effort by
/// contract: callers observe a failure but never roll back for one.
pub struct HttpMailDispatcher {
    client: Client,
    api_url: String,
    api_token: String,
    from: String,
}

impl HttpMailDispatcher {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            api_url: config.mail_api_url.clone(),
            api_token: config.mail_api_token.clone(),
            from: config.mail_from.clone(),
        }
    }
}

#[async_trait]
impl MailDispatcher for HttpMailDispatcher {
    async fn send(&self, message: &MailMessage) -> Result<()> {
        let payload = json!({
            "from": self.from,
            "to": message.to,
            "subject": message.subject,
            "text": message.body,
        });

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("mail API error ({}): {}", status, error_text));
        }

        debug!("Dispatched mail to {}", message.to);
        Ok(())
    }
}
