pub mod auth;

pub use auth::{AuthUser, ModeratorUser};
