/// Feed engine - assembles the four read surfaces
///
/// Every surface is derived per request from the authoritative tables through
/// the [`ContentStore`] seam: no materialized feed, no propagation delay. The
/// index surface is additionally wrapped by the page cache at the handler
/// level; everything here is cache-oblivious.
use serde::Serialize;
use uuid::Uuid;

use crate::db::ContentStore;
use crate::error::{AppError, Result};
use crate::models::{Page, PostView};

pub struct FeedService<S> {
    store: S,
    page_size: i64,
}

/// Group page: the group itself plus its posts
#[derive(Debug, Serialize)]
pub struct GroupPage {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub page: Page<PostView>,
}

/// Author context exposed alongside profile posts
#[derive(Debug, Serialize)]
pub struct AuthorInfo {
    pub username: String,
    pub posts_count: i64,
    pub followers: i64,
    pub following: i64,
    /// Whether the requesting viewer follows this author
    pub viewer_follows: bool,
}

/// Profile page: author context plus the author's posts
#[derive(Debug, Serialize)]
pub struct ProfilePage {
    pub author: AuthorInfo,
    pub page: Page<PostView>,
}

impl<S: ContentStore> FeedService<S> {
    pub fn new(store: S, page_size: i64) -> Self {
        Self { store, page_size }
    }

    /// Global index: all posts, most recent first
    pub async fn index(&self, page: u32) -> Result<Page<PostView>> {
        let page = normalize(page);
        let total = self.store.count_posts().await?;
        let rows = self
            .store
            .recent_posts(self.page_size, self.offset(page))
            .await?;

        Ok(self.assemble(rows, page, total))
    }

    /// Group page: posts attached to the group with the requested slug
    pub async fn group_page(&self, slug: &str, page: u32) -> Result<GroupPage> {
        let page = normalize(page);
        let group = self
            .store
            .find_group(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("group {}", slug)))?;

        let total = self.store.count_group_posts(group.id).await?;
        let rows = self
            .store
            .group_posts(group.id, self.page_size, self.offset(page))
            .await?;

        Ok(GroupPage {
            title: group.title,
            slug: group.slug,
            description: group.description,
            page: self.assemble(rows, page, total),
        })
    }

    /// Profile page: the author's posts plus author context
    pub async fn profile(
        &self,
        username: &str,
        viewer_id: Option<Uuid>,
        page: u32,
    ) -> Result<ProfilePage> {
        let page = normalize(page);
        let author = self
            .store
            .find_user(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("profile {}", username)))?;

        let total = self.store.count_author_posts(author.id).await?;
        let rows = self
            .store
            .author_posts(author.id, self.page_size, self.offset(page))
            .await?;

        let viewer_follows = match viewer_id {
            Some(viewer) if viewer != author.id => {
                self.store.is_following(viewer, author.id).await?
            }
            _ => false,
        };

        Ok(ProfilePage {
            author: AuthorInfo {
                username: author.username,
                posts_count: total,
                followers: self.store.follower_count(author.id).await?,
                following: self.store.following_count(author.id).await?,
                viewer_follows,
            },
            page: self.assemble(rows, page, total),
        })
    }

    /// Following feed: union of posts by every author the viewer follows.
    ///
    /// Anonymous and follow-less viewers get an empty page; the follow graph
    /// is not consulted for anonymous requests at all.
    pub async fn following_feed(
        &self,
        viewer_id: Option<Uuid>,
        page: u32,
    ) -> Result<Page<PostView>> {
        let page = normalize(page);
        let viewer = match viewer_id {
            Some(viewer) => viewer,
            None => return Ok(Page::empty(page)),
        };

        let total = self.store.count_following_posts(viewer).await?;
        if total == 0 {
            return Ok(Page::empty(page));
        }

        let rows = self
            .store
            .following_posts(viewer, self.page_size, self.offset(page))
            .await?;

        Ok(self.assemble(rows, page, total))
    }

    fn offset(&self, page: u32) -> i64 {
        (i64::from(page) - 1) * self.page_size
    }

    fn assemble(
        &self,
        rows: Vec<crate::models::PostRow>,
        page: u32,
        total: i64,
    ) -> Page<PostView> {
        let items = rows.into_iter().map(PostView::from).collect();
        Page::new(items, page, self.page_size, total)
    }
}

/// Pages are 1-based; anything below clamps to the first page.
fn normalize(page: u32) -> u32 {
    page.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MockContentStore;
    use crate::models::{Group, PostRow, User};
    use chrono::{Duration, Utc};
    use mockall::predicate::eq;

    fn row(id: i64, author: &str) -> PostRow {
        PostRow {
            id,
            author_id: Uuid::new_v4(),
            author: author.to_string(),
            text: format!("post {}", id),
            group_id: None,
            group_slug: None,
            group_title: None,
            has_image: false,
            created_at: Utc::now() - Duration::minutes(id),
        }
    }

    fn user(username: &str) -> User {
        User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: format!("{}@example.com", username),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn anonymous_following_feed_is_empty_without_store_access() {
        // No expectations set: any store call would panic.
        let store = MockContentStore::new();
        let feed = FeedService::new(store, 10);

        let page = feed.following_feed(None, 1).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_items, 0);
    }

    #[tokio::test]
    async fn followless_viewer_gets_empty_feed_without_post_query() {
        let viewer = Uuid::new_v4();
        let mut store = MockContentStore::new();
        store
            .expect_count_following_posts()
            .with(eq(viewer))
            .returning(|_| Ok(0));

        let feed = FeedService::new(store, 10);
        let page = feed.following_feed(Some(viewer), 1).await.unwrap();
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn following_feed_preserves_store_order() {
        let viewer = Uuid::new_v4();
        let mut store = MockContentStore::new();
        store
            .expect_count_following_posts()
            .returning(|_| Ok(2));
        store
            .expect_following_posts()
            .with(eq(viewer), eq(10), eq(0))
            .returning(|_, _, _| Ok(vec![row(2, "leopold"), row(1, "matroskin")]));

        let feed = FeedService::new(store, 10);
        let page = feed.following_feed(Some(viewer), 1).await.unwrap();

        let authors: Vec<&str> = page.items.iter().map(|p| p.author.as_str()).collect();
        assert_eq!(authors, vec!["leopold", "matroskin"]);
    }

    #[tokio::test]
    async fn index_paginates_with_one_based_pages() {
        let mut store = MockContentStore::new();
        store.expect_count_posts().returning(|| Ok(25));
        store
            .expect_recent_posts()
            .with(eq(10), eq(20))
            .returning(|_, _| Ok(vec![row(25, "kenga")]));

        let feed = FeedService::new(store, 10);
        let page = feed.index(3).await.unwrap();

        assert_eq!(page.page, 3);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_items, 25);
    }

    #[tokio::test]
    async fn page_zero_clamps_to_first_page() {
        let mut store = MockContentStore::new();
        store.expect_count_posts().returning(|| Ok(1));
        store
            .expect_recent_posts()
            .with(eq(10), eq(0))
            .returning(|_, _| Ok(vec![row(1, "kenga")]));

        let feed = FeedService::new(store, 10);
        let page = feed.index(0).await.unwrap();
        assert_eq!(page.page, 1);
    }

    #[tokio::test]
    async fn unknown_group_slug_is_not_found() {
        let mut store = MockContentStore::new();
        store
            .expect_find_group()
            .with(eq("nope"))
            .returning(|_| Ok(None));

        let feed = FeedService::new(store, 10);
        match feed.group_page("nope", 1).await {
            Err(AppError::NotFound(_)) => {}
            other => panic!("expected NotFound, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn empty_group_is_an_empty_page_not_an_error() {
        let mut store = MockContentStore::new();
        store.expect_find_group().returning(|_| {
            Ok(Some(Group {
                id: 5,
                title: "group to test".to_string(),
                slug: "gtt".to_string(),
                description: None,
                created_at: Utc::now(),
            }))
        });
        store.expect_count_group_posts().with(eq(5)).returning(|_| Ok(0));
        store
            .expect_group_posts()
            .returning(|_, _, _| Ok(Vec::new()));

        let feed = FeedService::new(store, 10);
        let group_page = feed.group_page("gtt", 1).await.unwrap();
        assert_eq!(group_page.slug, "gtt");
        assert!(group_page.page.items.is_empty());
    }

    #[tokio::test]
    async fn reassigned_post_moves_between_group_pages_on_the_next_read() {
        // Group pages are derived from current table state per request, so a
        // post moved from "gtt" to "jag" is gone from the old page and present
        // on the new one immediately.
        fn group(id: i64, slug: &str) -> Group {
            Group {
                id,
                title: format!("group {}", slug),
                slug: slug.to_string(),
                description: None,
                created_at: Utc::now(),
            }
        }

        let mut store = MockContentStore::new();
        store
            .expect_find_group()
            .with(eq("gtt"))
            .returning(|_| Ok(Some(group(5, "gtt"))));
        store
            .expect_find_group()
            .with(eq("jag"))
            .returning(|_| Ok(Some(group(6, "jag"))));
        store
            .expect_count_group_posts()
            .with(eq(5))
            .returning(|_| Ok(0));
        store
            .expect_count_group_posts()
            .with(eq(6))
            .returning(|_| Ok(1));
        store
            .expect_group_posts()
            .with(eq(5), eq(10), eq(0))
            .returning(|_, _, _| Ok(Vec::new()));
        store
            .expect_group_posts()
            .with(eq(6), eq(10), eq(0))
            .returning(|_, _, _| Ok(vec![row(1, "kenga")]));

        let feed = FeedService::new(store, 10);

        let old_group = feed.group_page("gtt", 1).await.unwrap();
        assert!(old_group.page.items.is_empty());
        assert_eq!(old_group.page.total_items, 0);

        let new_group = feed.group_page("jag", 1).await.unwrap();
        assert_eq!(new_group.page.items.len(), 1);
        assert_eq!(new_group.page.items[0].author, "kenga");
    }

    #[tokio::test]
    async fn unknown_profile_is_not_found() {
        let mut store = MockContentStore::new();
        store.expect_find_user().returning(|_| Ok(None));

        let feed = FeedService::new(store, 10);
        match feed.profile("somecrazybullshitidontknow", None, 1).await {
            Err(AppError::NotFound(_)) => {}
            other => panic!("expected NotFound, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn profile_exposes_author_context() {
        let author = user("kenga");
        let author_id = author.id;
        let viewer = Uuid::new_v4();

        let mut store = MockContentStore::new();
        store
            .expect_find_user()
            .with(eq("kenga"))
            .returning(move |_| Ok(Some(author.clone())));
        store
            .expect_count_author_posts()
            .with(eq(author_id))
            .returning(|_| Ok(1));
        store
            .expect_author_posts()
            .returning(|_, _, _| Ok(vec![row(1, "kenga")]));
        store
            .expect_is_following()
            .with(eq(viewer), eq(author_id))
            .returning(|_, _| Ok(true));
        store.expect_follower_count().returning(|_| Ok(3));
        store.expect_following_count().returning(|_| Ok(2));

        let feed = FeedService::new(store, 10);
        let profile = feed.profile("kenga", Some(viewer), 1).await.unwrap();

        assert_eq!(profile.author.username, "kenga");
        assert_eq!(profile.author.posts_count, 1);
        assert_eq!(profile.author.followers, 3);
        assert_eq!(profile.author.following, 2);
        assert!(profile.author.viewer_follows);
        assert_eq!(profile.page.items.len(), 1);
    }
}
