pub mod init;
pub mod requests;
pub mod token;
pub mod users;
