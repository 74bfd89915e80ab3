pub mod interview;
pub mod payment;
pub mod profile;
pub mod user;
