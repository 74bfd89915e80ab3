use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

/// Delivers a magic link to a user's inbox.
///
/// Implement this trait to plug in an SMTP or transactional-email provider.
/// Register the implementation in `AppState` at startup.
#[async_trait]
pub trait MagicLinkSender: Send + Sync {
    async fn send(&self, email: &str, link: &str) -> Result<()>;
}

/// Writes the link to the log instead of sending mail. Used for local development.
pub struct LogMailer;

#[async_trait]
impl MagicLinkSender for LogMailer {
    async fn send(&self, email: &str, link: &str) -> Result<()> {
        info!(%email, %link, "magic link issued");
        Ok(())
    }
}
