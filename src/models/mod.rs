/// Data models for the posts service
///
/// Row types map directly onto the Postgres schema; the `*View` types are what
/// handlers serialize. HTML rendering is an external collaborator, so views
/// carry everything the template layer needs (author username, group slug,
/// image URL) without further lookups.
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// User entity. The password hash never leaves the database layer.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Group entity - a named, slug-identified category for posts
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Group {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Post row joined with its author and (optional) group
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostRow {
    pub id: i64,
    pub author_id: Uuid,
    pub author: String,
    pub text: String,
    pub group_id: Option<i64>,
    pub group_slug: Option<String>,
    pub group_title: Option<String>,
    pub has_image: bool,
    pub created_at: DateTime<Utc>,
}

/// Comment row joined with its author
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentRow {
    pub id: i64,
    pub post_id: i64,
    pub author: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Follow edge: `user` follows `author`
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Follow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Group reference embedded in a post view
#[derive(Debug, Clone, Serialize)]
pub struct GroupRef {
    pub title: String,
    pub slug: String,
}

/// Post as rendered on list and detail surfaces
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: i64,
    pub author: String,
    pub text: String,
    pub group: Option<GroupRef>,
    /// Present when the post has an image; the media host serves the bytes.
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<PostRow> for PostView {
    fn from(row: PostRow) -> Self {
        let group = match (row.group_slug, row.group_title) {
            (Some(slug), Some(title)) => Some(GroupRef { title, slug }),
            _ => None,
        };
        let image_url = row.has_image.then(|| format!("/media/posts/{}", row.id));

        PostView {
            id: row.id,
            author: row.author,
            text: row.text,
            group,
            image_url,
            created_at: row.created_at,
        }
    }
}

/// Comment as rendered on the post detail surface
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: i64,
    pub author: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl From<CommentRow> for CommentView {
    fn from(row: CommentRow) -> Self {
        CommentView {
            id: row.id,
            author: row.author,
            text: row.text,
            created_at: row.created_at,
        }
    }
}

/// One page of a list surface
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub total_pages: u32,
    pub total_items: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: u32, page_size: i64, total_items: i64) -> Self {
        let total_pages = if total_items <= 0 {
            1
        } else {
            ((total_items + page_size - 1) / page_size) as u32
        };

        Page {
            items,
            page,
            total_pages,
            total_items,
        }
    }

    pub fn empty(page: u32) -> Self {
        Page {
            items: Vec::new(),
            page,
            total_pages: 1,
            total_items: 0,
        }
    }
}
