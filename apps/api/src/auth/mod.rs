pub mod handlers;
pub mod mailer;
pub mod service;
pub mod session;
