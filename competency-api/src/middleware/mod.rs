/// Middleware modules for the API server
///
/// Authentication lives in `competency_shared::auth::middleware`; this
/// module holds HTTP concerns that only the server needs.

pub mod security;
