pub mod completeness;
pub mod handlers;
pub mod service;
pub mod slug;
pub mod validation;
