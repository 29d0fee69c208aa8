mod error;
mod executions;
mod health;
mod metrics;
mod router;
mod rules;
mod snapshots;

pub use error::ApiError;
pub use router::{router, AppState};
