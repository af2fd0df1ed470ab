pub mod user_models;
pub mod user_repository;
pub mod user_handlers;
pub mod user_service;

pub use user_models::{User, UserResponse, UserRole};
pub use user_repository::UserRepository;
pub use user_handlers::{get_current_user, list_mentors};
pub use user_service::UserService;
