// handlers/protected/mod.rs - Endpoints behind the bearer JWT middleware
//
// The middleware only establishes who is calling. Whether that user still
// exists and whether they hold the admin role is decided by the services.
pub mod requests;
pub mod users;
