use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the trivia night controller.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::public_stream,
        crate::routes::session::get_session,
        crate::routes::session::dismiss_rules,
        crate::routes::session::draw_teams,
        crate::routes::session::adjust_score,
        crate::routes::session::toggle_lightning,
        crate::routes::session::start_next_round,
        crate::routes::session::open_categories,
        crate::routes::session::pick_category,
        crate::routes::session::draw_category,
        crate::routes::session::view_scoreboard,
        crate::routes::session::open_question,
        crate::routes::session::back_to_numbers,
        crate::routes::session::select_option,
        crate::routes::session::reveal_answer,
        crate::routes::session::mark_used,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::phase::VisiblePhase,
            crate::dto::session::SessionView,
            crate::dto::session::TeamView,
            crate::dto::session::QuestionSummaryView,
            crate::dto::session::QuestionView,
            crate::dto::session::OptionView,
            crate::dto::session::OptionStatusView,
            crate::dto::actions::ScoreAdjustmentRequest,
            crate::dto::actions::PickCategoryRequest,
            crate::dto::actions::SelectOptionRequest,
            crate::dto::sse::SystemStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "session", description = "Host actions driving the game night"),
    )
)]
pub struct ApiDoc;
