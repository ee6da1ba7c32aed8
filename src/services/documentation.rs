use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for League Back.
#[openapi(
    info(title = "League Back", description = "Sports league management API"),
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::public_stream,
        crate::routes::public::get_data,
        crate::routes::public::get_standings,
        crate::routes::public::get_matches,
        crate::routes::public::get_news,
        crate::routes::public::register,
        crate::routes::public::login,
        crate::routes::admin::get_document,
        crate::routes::admin::save_document,
        crate::routes::admin::create_team,
        crate::routes::admin::rename_team,
        crate::routes::admin::delete_team,
        crate::routes::admin::set_stat,
        crate::routes::admin::reset_team,
        crate::routes::admin::reset_standings,
        crate::routes::admin::create_match,
        crate::routes::admin::reschedule_match,
        crate::routes::admin::delete_match,
        crate::routes::admin::start_match,
        crate::routes::admin::update_score,
        crate::routes::admin::update_minute,
        crate::routes::admin::finish_match,
        crate::routes::admin::reopen_match,
        crate::routes::admin::generate_round,
        crate::routes::admin::list_registrations,
        crate::routes::admin::approve_registration,
        crate::routes::admin::reject_registration,
        crate::routes::admin::create_news,
        crate::routes::admin::delete_news,
        crate::routes::admin::list_activities,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::sse::Handshake,
            crate::dto::sse::SystemStatus,
            crate::dto::sse::LeagueSection,
            crate::dto::sse::LeagueUpdatedEvent,
            crate::dto::sse::LiveScoreEvent,
            crate::dto::public::PublicLeagueView,
            crate::dto::public::StandingRow,
            crate::dto::public::MatchView,
            crate::dto::admin::StatFieldDto,
            crate::dto::admin::ScoreSide,
            crate::dto::admin::MinuteInput,
            crate::dao::models::LeagueDocument,
            crate::dao::models::ActivityKind,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "public", description = "League data for the public site"),
        (name = "admin", description = "League management, requires `X-Admin-Token`"),
    )
)]
pub struct ApiDoc;
