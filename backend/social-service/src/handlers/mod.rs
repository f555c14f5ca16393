/// HTTP handlers for social-service
///
/// - Posts and the feed
/// - Likes and comments on a post
/// - Profiles and the follow graph
/// - Health and readiness probes
pub mod comments;
pub mod health;
pub mod likes;
pub mod posts;
pub mod users;

use actix_web::web;

use crate::error::AppError;
use crate::metrics::serve_metrics;

/// Register every route; shared by the binary and the integration tests
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(64 * 1024)
            .error_handler(|err, _req| AppError::InvalidInput(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::InvalidInput(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::NotFound(err.to_string()).into()),
    )
    .route("/health", web::get().to(health::health))
    .route("/ready", web::get().to(health::ready))
    .route("/metrics", web::get().to(serve_metrics))
    .service(
        web::scope("/api/v1")
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list_feed))
                    .route("", web::post().to(posts::create_post))
                    .route("/{post_id}", web::get().to(posts::get_post))
                    .route("/{post_id}", web::put().to(posts::update_post))
                    .route("/{post_id}", web::delete().to(posts::delete_post))
                    .route("/{post_id}/like", web::post().to(likes::like_post))
                    .route("/{post_id}/like", web::delete().to(likes::unlike_post))
                    .route("/{post_id}/comments", web::get().to(comments::list_comments))
                    .route("/{post_id}/comments", web::post().to(comments::add_comment))
                    .route(
                        "/{post_id}/comments/{comment_id}",
                        web::get().to(comments::get_comment),
                    )
                    .route(
                        "/{post_id}/comments/{comment_id}",
                        web::delete().to(comments::delete_comment),
                    ),
            )
            .service(
                web::scope("/users")
                    .route("/profile", web::get().to(users::own_profile))
                    .route("/profiles", web::get().to(users::search_profiles))
                    .route("/{username}/profile", web::get().to(users::profile_by_username))
                    .route("/{user_id}/follow", web::post().to(users::follow))
                    .route("/{user_id}/unfollow", web::delete().to(users::unfollow))
                    .route("/{user_id}/followers", web::get().to(users::followers))
                    .route("/{user_id}/following", web::get().to(users::following)),
            ),
    );
}
