pub mod auth;
pub mod health;
pub mod todos;

pub use auth::{login, logout, refresh_token, signup};
pub use health::health;
pub use todos::{create_todo, delete_todo, list_todos, update_todo};
