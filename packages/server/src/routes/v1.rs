use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers;
use crate::handlers::upload::upload_body_limit;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/results", result_routes(config))
        .nest("/media", media_routes(config))
        .nest("/announcements", announcement_routes(config))
        .nest("/activity", activity_routes())
        .merge(contact_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::register))
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::me))
}

fn result_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::result::list_results,
            handlers::result::create_result
        ))
        .routes(routes!(
            handlers::result::get_result,
            handlers::result::update_result,
            handlers::result::delete_result
        ))
        .routes(routes!(handlers::result::replace_photo))
        .layer(upload_body_limit(config.storage.max_photo_size))
}

fn media_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::media::list_media,
            handlers::media::upload_media
        ))
        .routes(routes!(handlers::media::delete_media))
        .layer(upload_body_limit(config.storage.max_media_size))
}

fn announcement_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::announcement::list_announcements,
            handlers::announcement::create_announcement
        ))
        .routes(routes!(handlers::announcement::deactivate_announcement))
        .layer(upload_body_limit(config.storage.max_media_size))
}

fn contact_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::contact::submit_contact))
        .routes(routes!(handlers::contact::list_contacts))
        .routes(routes!(
            handlers::contact::update_contact_status,
            handlers::contact::delete_contact
        ))
}

fn activity_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::activity::list_activity))
}
