use crate::db::DbPool;
use anyhow::Context;
use std::sync::Arc;

use crate::{
    auth::auth_service::AuthService,
    mentorship::{mentorship_repository::MentorshipRepository, mentorship_service::MentorshipService},
    notification::{
        notification_repository::NotificationRepository,
        notification_service::NotificationService,
    },
    schedule::{schedule_repository::ScheduleRepository, schedule_service::ScheduleService},
    user::{user_repository::UserRepository, user_service::UserService},
    hub::ConnectionManager,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub hub_connections: ConnectionManager,
    pub schedule_repository: ScheduleRepository,
    pub user_service: UserService,
    pub auth_service: AuthService,
    pub mentorship_service: MentorshipService,
    pub schedule_service: ScheduleService,
    pub notification_service: NotificationService,
}

impl AppState {
    pub fn new(db: DbPool, config: Arc<Config>) -> Self {
        let hub_connections = ConnectionManager::new();

        let user_repository = UserRepository::new(db.clone());
        let mentorship_repository = MentorshipRepository::new(db.clone());
        let schedule_repository = ScheduleRepository::new(db.clone());
        let notification_repository = NotificationRepository::new(db.clone());

        let notification_service =
            NotificationService::new(notification_repository, hub_connections.clone());
        let user_service = UserService::new(user_repository.clone());
        let auth_service = AuthService::new(
            user_repository.clone(),
            config.jwt_secret.clone(),
            config.jwt_expiration_hours,
        );
        let mentorship_service =
            MentorshipService::new(mentorship_repository.clone(), schedule_repository.clone());
        let schedule_service = ScheduleService::new(
            db,
            mentorship_repository,
            schedule_repository.clone(),
            user_repository,
            notification_service.clone(),
        );

        Self {
            config,
            hub_connections,
            schedule_repository,
            user_service,
            auth_service,
            mentorship_service,
            schedule_service,
            notification_service,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub host: String,
    pub port: u16,
    pub session_reminder_minutes: i64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            database_max_connections: env_or("DATABASE_MAX_CONNECTIONS", 5)?,
            jwt_secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_expiration_hours: env_or("JWT_EXPIRATION_HOURS", 24)?,
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env_or("PORT", 3000)?,
            session_reminder_minutes: env_or("SESSION_REMINDER_MINUTES", 30)?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{} must be a number", key)),
        Err(_) => Ok(default),
    }
}
