pub mod schedule_models;
pub mod schedule_dto;
pub mod schedule_repository;
pub mod schedule_handlers;
pub mod schedule_service;

pub use schedule_models::{Schedule, ScheduleStatus};
pub use schedule_dto::{
    AcceptScheduleRequest, CompleteScheduleRequest, FailScheduleRequest, RateScheduleRequest,
    ScheduleFilters,
};
pub use schedule_repository::ScheduleRepository;
pub use schedule_handlers::{
    accept_schedule, complete_schedule, fail_schedule, get_schedule, list_schedules, rate_schedule,
};
pub use schedule_service::ScheduleService;
