use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use super::model::{Bookmark, BookmarkChanges, NewBookmark};
use super::repository::BookmarkRepository;

#[derive(Default)]
struct Store {
    rows: Vec<Bookmark>,
    next_id: i64,
    // Logical clock standing in for wall-clock `created_at`.
    ticks: u64,
}

/// Process-local repository. Nothing survives a restart.
#[derive(Default)]
pub struct InMemoryBookmarks {
    store: RwLock<Store>,
}

impl InMemoryBookmarks {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookmarkRepository for InMemoryBookmarks {
    async fn list(&self) -> Result<Vec<Bookmark>> {
        Ok(self.store.read().await.rows.clone())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Bookmark>> {
        let store = self.store.read().await;
        Ok(store.rows.iter().find(|b| b.id == id).cloned())
    }

    async fn insert(&self, input: NewBookmark) -> Result<Bookmark> {
        let mut store = self.store.write().await;
        store.next_id += 1;
        store.ticks += 1;

        let bookmark = Bookmark {
            id: store.next_id,
            title: input.title,
            url: input.url,
            desc: input.desc,
            rating: input.rating,
            created_at: format!("{:020}", store.ticks),
        };
        store.rows.push(bookmark.clone());
        Ok(bookmark)
    }

    async fn update(&self, id: i64, changes: BookmarkChanges) -> Result<Option<Bookmark>> {
        let mut store = self.store.write().await;
        let Some(bookmark) = store.rows.iter_mut().find(|b| b.id == id) else {
            return Ok(None);
        };

        if let Some(title) = changes.title {
            bookmark.title = title;
        }
        if let Some(url) = changes.url {
            bookmark.url = url;
        }
        if let Some(desc) = changes.desc {
            bookmark.desc = Some(desc);
        }
        if let Some(rating) = changes.rating {
            bookmark.rating = Some(rating);
        }

        Ok(Some(bookmark.clone()))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.store.write().await.rows.retain(|b| b.id != id);
        Ok(())
    }

    async fn most_recent(&self) -> Result<Option<Bookmark>> {
        let store = self.store.read().await;
        Ok(store
            .rows
            .iter()
            .max_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)))
            .cloned())
    }
}
