pub mod envelope;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use envelope::{ApiError, JsonBody, PathParam};
pub use routes::{create_router, AppState};
