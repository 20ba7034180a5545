pub mod document;
pub mod error;
pub mod model;
pub mod service;
pub mod store;

pub use error::{SessionError, SessionResult};
