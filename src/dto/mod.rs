pub mod admin;
pub mod health;
pub mod public;
pub mod sse;
pub mod validation;
