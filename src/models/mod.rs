//! Data models for Lectern

pub mod author;
pub mod book;
pub mod book_instance;
pub mod user;

// Re-export commonly used types
pub use author::Author;
pub use book::{Book, BookTitle};
pub use book_instance::{BookInstance, BookInstanceStatus};
pub use user::User;
