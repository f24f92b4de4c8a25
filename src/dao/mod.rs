/// Database model definitions.
pub mod models;
/// Storage abstraction layer for database operations.
pub mod storage;
/// Player and question retrieval operations.
pub mod trivia_store;
