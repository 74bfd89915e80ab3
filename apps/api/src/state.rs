use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::mailer::MagicLinkSender;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    /// Pluggable magic-link delivery. Default: LogMailer.
    pub mailer: Arc<dyn MagicLinkSender>,
}
