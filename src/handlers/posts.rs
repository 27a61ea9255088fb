/// Post handlers - creation, detail, author-only editing
use actix_multipart::form::{bytes::Bytes, text::Text, MultipartForm};
use actix_web::http::header;
use actix_web::{web, HttpResponse};
use sqlx::PgPool;

use crate::db::{comment_repo, post_repo};
use crate::error::{AppError, Result};
use crate::middleware::Viewer;
use crate::models::{CommentView, PostView};
use crate::services::{PostInput, PostService};

/// Multipart submission for post creation and editing
#[derive(Debug, MultipartForm)]
pub struct PostForm {
    pub text: Option<Text<String>>,
    pub group: Option<Text<i64>>,
    #[multipart(limit = "10MB")]
    pub image: Option<Bytes>,
}

impl PostForm {
    fn input(&self) -> PostInput<'_> {
        PostInput {
            text: self.text.as_ref().map(|t| t.0.as_str()),
            group_id: self.group.as_ref().map(|g| g.0),
            image: self.image.as_ref().map(|b| b.data.as_ref()),
        }
    }
}

/// Form context for the external renderer. Field metadata mirrors what the
/// form layer shows next to each input.
pub async fn new_post_form(_viewer: Viewer) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "fields": {
            "group": {
                "label": "Группа",
                "help_text": "Выберите группу, в которой будет размещена Ваша запись (необязательно):",
            },
            "text": {
                "label": "Текст записи",
                "help_text": "Введите текст Вашей записи:",
            },
            "image": {
                "label": "Изображение",
                "help_text": "Загрузите Ваше изображение (если, конечно, хотите):",
            },
        },
    }))
}

/// Create a post, then send the author back to the index
pub async fn new_post(
    pool: web::Data<PgPool>,
    viewer: Viewer,
    form: MultipartForm<PostForm>,
) -> Result<HttpResponse> {
    let service = PostService::new(pool.get_ref().clone());
    service.create_post(viewer.0, form.input()).await?;

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, "/"))
        .finish())
}

/// Post detail with its comments. The username in the path must match the
/// post author, otherwise the post does not exist on that profile.
pub async fn post_detail(
    pool: web::Data<PgPool>,
    path: web::Path<(String, i64)>,
) -> Result<HttpResponse> {
    let (username, post_id) = path.into_inner();

    let row = post_repo::find_post(pool.get_ref(), post_id)
        .await?
        .filter(|row| row.author == username)
        .ok_or_else(|| AppError::NotFound(format!("post {} by {}", post_id, username)))?;

    let comments: Vec<CommentView> = comment_repo::comments_for_post(pool.get_ref(), post_id)
        .await?
        .into_iter()
        .map(CommentView::from)
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "post": PostView::from(row),
        "comments": comments,
    })))
}

/// Edit form context: the current post values, author-only
pub async fn post_edit_form(
    pool: web::Data<PgPool>,
    viewer: Viewer,
    path: web::Path<(String, i64)>,
) -> Result<HttpResponse> {
    let (username, post_id) = path.into_inner();

    let row = post_repo::find_post(pool.get_ref(), post_id)
        .await?
        .filter(|row| row.author == username)
        .ok_or_else(|| AppError::NotFound(format!("post {} by {}", post_id, username)))?;

    if row.author_id != viewer.0 {
        return Err(AppError::Forbidden(
            "only the author can edit this post".to_string(),
        ));
    }

    Ok(HttpResponse::Ok().json(PostView::from(row)))
}

/// Apply an edit, then send the author to the post page
pub async fn post_edit(
    pool: web::Data<PgPool>,
    viewer: Viewer,
    path: web::Path<(String, i64)>,
    form: MultipartForm<PostForm>,
) -> Result<HttpResponse> {
    let (username, post_id) = path.into_inner();

    let service = PostService::new(pool.get_ref().clone());
    let updated = service.edit_post(post_id, viewer.0, form.input()).await?;

    Ok(HttpResponse::Found()
        .insert_header((
            header::LOCATION,
            format!("/{}/{}/", username, updated.id),
        ))
        .finish())
}
