pub mod core;
pub mod handlers;
