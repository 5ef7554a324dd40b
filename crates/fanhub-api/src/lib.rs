pub mod accounts;
pub mod auth;
pub mod board;
pub mod carousel;
pub mod chat;
pub mod config;
pub mod error;
pub mod extract;
pub mod health;
pub mod middleware;
pub mod password;
pub mod reviews;
pub mod router;
pub mod state;
pub mod token;
pub mod validation;

pub use router::build_router;
pub use state::{AppState, AppStateInner};
