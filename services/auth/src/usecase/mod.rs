pub mod account;
pub mod notification;
pub mod password;
pub mod session;
pub mod token;
