pub mod admin_request;
pub mod user;

pub use admin_request::{AdminApproval, AdminRequest};
pub use user::{User, UserSummary};
