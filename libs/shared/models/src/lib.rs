pub mod auth;
pub mod coordinates;
pub mod error;
pub mod pagination;
