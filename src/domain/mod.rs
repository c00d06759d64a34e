pub mod error;
pub mod repository;
pub mod todo;
pub mod token;
pub mod user;
