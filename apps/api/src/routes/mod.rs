pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::{activity, admin, feed, onboarding, paintings, room, saved};

/// Room uploads are size-checked at 10 MB in the handler; the transport
/// limit sits above that so an 11 MB photo gets the proper validation
/// error instead of a generic body-limit rejection.
const BODY_LIMIT: usize = 20 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Discovery feed
        .route("/api/v1/feed", get(feed::handlers::handle_get_feed))
        .route("/api/v1/paintings/:id", get(paintings::handle_get_painting))
        // Onboarding
        .route(
            "/api/v1/styles",
            get(onboarding::handlers::handle_get_styles)
                .post(onboarding::handlers::handle_select_styles),
        )
        .route("/api/v1/room/photo", post(room::handlers::handle_upload_photo))
        .route(
            "/api/v1/room/analyze",
            post(room::handlers::handle_analyze_room),
        )
        .route(
            "/api/v1/room/placement",
            get(room::handlers::handle_get_placement),
        )
        // Favorites & activity
        .route(
            "/api/v1/saved",
            get(saved::handle_list_saved).post(saved::handle_toggle_saved),
        )
        .route(
            "/api/v1/activity",
            post(activity::handlers::handle_post_activity),
        )
        // Admin
        .route(
            "/api/v1/admin/paintings/batch",
            get(admin::handlers::handle_batch_status).post(admin::handlers::handle_batch_upload),
        )
        .route(
            "/api/v1/admin/paintings/generate-embeddings",
            post(admin::handlers::handle_generate_embeddings),
        )
        .route(
            "/api/v1/admin/paintings/delete-batch",
            get(admin::handlers::handle_delete_preview)
                .delete(admin::handlers::handle_delete_batch),
        )
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(state)
}
