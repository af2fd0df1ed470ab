use crate::{
    auth,
    mentorship,
    middleware::auth_middleware,
    notification,
    schedule,
    state::AppState,
    user,
};
use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::auth_handlers::register,
        auth::auth_handlers::login,
        user::user_handlers::get_current_user,
        user::user_handlers::list_mentors,
        mentorship::mentorship_handlers::create_mentorship,
        mentorship::mentorship_handlers::list_mentorships,
        mentorship::mentorship_handlers::get_mentorship,
        mentorship::mentorship_handlers::cancel_mentorship,
        schedule::schedule_handlers::accept_schedule,
        schedule::schedule_handlers::complete_schedule,
        schedule::schedule_handlers::fail_schedule,
        schedule::schedule_handlers::rate_schedule,
        schedule::schedule_handlers::list_schedules,
        schedule::schedule_handlers::get_schedule,
        notification::notification_handlers::get_user_notifications,
        notification::notification_handlers::mark_notification_read,
        notification::notification_handlers::notification_hub,
    ),
    components(
        schemas(
            auth::RegisterRequest,
            auth::LoginRequest,
            auth::AuthResponse,
            user::UserResponse,
            user::UserRole,
            mentorship::MentoringRequest,
            mentorship::MentorshipDetail,
            mentorship::MentorshipStatus,
            mentorship::CreateMentorshipRequest,
            schedule::Schedule,
            schedule::ScheduleStatus,
            schedule::AcceptScheduleRequest,
            schedule::CompleteScheduleRequest,
            schedule::FailScheduleRequest,
            schedule::RateScheduleRequest,
            notification::Notification,
        )
    ),
    tags(
        (name = "auth", description = "Authentication endpoints"),
        (name = "users", description = "User endpoints"),
        (name = "mentorships", description = "Mentoring request submission and triage"),
        (name = "schedules", description = "Mentoring session lifecycle"),
        (name = "notifications", description = "Notification endpoints and push channel")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            )
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/users/me", get(user::get_current_user))
        .route("/users/mentors", get(user::list_mentors))
        .route(
            "/v1/mentorships",
            get(mentorship::list_mentorships).post(mentorship::create_mentorship),
        )
        .route("/v1/mentorships/:id", get(mentorship::get_mentorship))
        .route("/v1/mentorships/:id/cancel", patch(mentorship::cancel_mentorship))
        .route("/schedules", get(schedule::list_schedules))
        .route("/schedules/:id", get(schedule::get_schedule))
        .route("/schedules/mentorship/accept", post(schedule::accept_schedule))
        .route("/schedules/complete", patch(schedule::complete_schedule))
        .route("/schedules/fail", patch(schedule::fail_schedule))
        .route("/v1/api/schedules/rate", post(schedule::rate_schedule))
        .route("/Notification/user/:id", get(notification::get_user_notifications))
        .route(
            "/Notification/mark-as-read/:id",
            patch(notification::mark_notification_read),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let hub_routes = Router::new()
        .route("/notificationHub", get(notification::notification_hub))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(protected_routes);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api_routes)
        .merge(hub_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
