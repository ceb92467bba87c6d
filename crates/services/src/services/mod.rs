pub mod auth;
pub mod identity;
pub mod remote_source;
pub mod reports;
pub mod sync;
