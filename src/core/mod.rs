pub mod auth;
pub mod client;
pub mod company;
pub mod invitations;
pub mod session;
pub mod summary;
pub mod timelogs;
pub mod users;

pub use crate::domain::ports::{ConfigProvider, TokenStore};
pub use crate::utils::error::Result;
pub use client::ApiClient;
pub use session::ClockSession;
