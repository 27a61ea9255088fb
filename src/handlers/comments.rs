/// Comment handlers
use actix_web::http::header;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;

use crate::error::Result;
use crate::middleware::Viewer;
use crate::services::CommentService;

#[derive(Debug, Deserialize)]
pub struct CommentForm {
    pub text: Option<String>,
}

/// Add a comment, then send the viewer back to the post page
pub async fn add_comment(
    pool: web::Data<PgPool>,
    viewer: Viewer,
    path: web::Path<(String, i64)>,
    form: web::Form<CommentForm>,
) -> Result<HttpResponse> {
    let (username, post_id) = path.into_inner();

    let service = CommentService::new(pool.get_ref().clone());
    service
        .add_comment(post_id, viewer.0, form.text.as_deref())
        .await?;

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, format!("/{}/{}/", username, post_id)))
        .finish())
}
