pub mod notification_models;
pub mod notification_repository;
pub mod notification_handlers;
pub mod notification_service;
pub mod reminder_service;

pub use notification_models::Notification;
pub use notification_repository::NotificationRepository;
pub use notification_handlers::{get_user_notifications, mark_notification_read, notification_hub};
pub use notification_service::NotificationService;
pub use reminder_service::start_reminder_service;
