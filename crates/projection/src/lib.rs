//! CTAS Projection - SQLite read model for fund requests
//!
//! The projection is disposable. It is rebuilt from the journal on start and
//! kept current by applying each committed event.

pub mod error;
pub mod store;

pub use error::ProjectionError;
pub use store::{Projection, RequestStats, RequestView};
