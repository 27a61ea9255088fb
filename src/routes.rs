/// Route table, shared between `main` and the HTTP test harness.
///
/// Specific routes register before the greedy `/{username}` patterns so
/// `/new`, `/follow` and `/group/...` resolve first; `/{username}/follow`
/// likewise registers before `/{username}/{post_id}`.
use actix_web::web;

use crate::handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(handlers::health))
        .route("/", web::get().to(handlers::index))
        .route("/follow", web::get().to(handlers::follow_index))
        .route("/group/{slug}", web::get().to(handlers::group_posts))
        .route("/new", web::get().to(handlers::new_post_form))
        .route("/new", web::post().to(handlers::new_post))
        .route("/{username}/follow", web::get().to(handlers::profile_follow))
        .route(
            "/{username}/unfollow",
            web::get().to(handlers::profile_unfollow),
        )
        .route("/{username}", web::get().to(handlers::profile))
        .route(
            "/{username}/{post_id}/edit",
            web::get().to(handlers::post_edit_form),
        )
        .route(
            "/{username}/{post_id}/edit",
            web::post().to(handlers::post_edit),
        )
        .route(
            "/{username}/{post_id}/comment",
            web::post().to(handlers::add_comment),
        )
        .route("/{username}/{post_id}", web::get().to(handlers::post_detail));
}
