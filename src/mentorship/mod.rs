pub mod mentorship_models;
pub mod mentorship_dto;
pub mod mentorship_repository;
pub mod mentorship_handlers;
pub mod mentorship_service;

pub use mentorship_models::{MentoringRequest, MentorshipDetail, MentorshipStatus};
pub use mentorship_dto::{CreateMentorshipRequest, MentorshipFilters};
pub use mentorship_repository::MentorshipRepository;
pub use mentorship_handlers::{cancel_mentorship, create_mentorship, get_mentorship, list_mentorships};
pub use mentorship_service::MentorshipService;
