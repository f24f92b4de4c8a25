pub mod actions;
pub mod health;
pub mod phase;
pub mod session;
pub mod sse;
pub mod validation;
