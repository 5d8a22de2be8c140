pub mod manager;
pub mod model;

pub use manager::{SessionError, SessionManager};
pub use model::Session;
