pub mod account;
pub mod health;
pub mod password;
pub mod token;
