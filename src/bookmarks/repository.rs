use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use super::model::{Bookmark, BookmarkChanges, NewBookmark};
use crate::db::Database;

#[async_trait]
pub trait BookmarkRepository: Send + Sync {
    /// All bookmarks in insertion order.
    async fn list(&self) -> Result<Vec<Bookmark>>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Bookmark>>;

    async fn insert(&self, input: NewBookmark) -> Result<Bookmark>;

    /// Returns `None` when no bookmark has `id`.
    async fn update(&self, id: i64, changes: BookmarkChanges) -> Result<Option<Bookmark>>;

    /// Succeeds whether or not the row existed.
    async fn delete(&self, id: i64) -> Result<()>;

    /// Latest `created_at`, ties broken by the higher id.
    async fn most_recent(&self) -> Result<Option<Bookmark>>;
}

const COLUMNS: &str = r#"id, title, url, "desc", rating, created_at"#;

pub struct LibsqlBookmarks {
    db: Arc<Database>,
}

impl LibsqlBookmarks {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    async fn query_one(&self, query: &str, params: Vec<libsql::Value>) -> Result<Option<Bookmark>> {
        let mut rows = self.db.connection().query(query, params).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(row_to_bookmark(&row)?))
        } else {
            Ok(None)
        }
    }
}

fn row_to_bookmark(row: &libsql::Row) -> Result<Bookmark> {
    Ok(Bookmark {
        id: row.get(0)?,
        title: row.get(1)?,
        url: row.get(2)?,
        desc: row.get::<Option<String>>(3)?,
        rating: row.get::<Option<i64>>(4)?,
        created_at: row.get(5)?,
    })
}

#[async_trait]
impl BookmarkRepository for LibsqlBookmarks {
    async fn list(&self) -> Result<Vec<Bookmark>> {
        let query = format!("SELECT {COLUMNS} FROM bookmarks ORDER BY id ASC");

        let mut rows = self.db.connection().query(&query, ()).await?;
        let mut bookmarks = Vec::new();

        while let Some(row) = rows.next().await? {
            bookmarks.push(row_to_bookmark(&row)?);
        }

        Ok(bookmarks)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Bookmark>> {
        let query = format!("SELECT {COLUMNS} FROM bookmarks WHERE id = ?");
        self.query_one(&query, vec![id.into()]).await
    }

    async fn insert(&self, input: NewBookmark) -> Result<Bookmark> {
        let query = format!(
            r#"INSERT INTO bookmarks (title, url, "desc", rating) VALUES (?, ?, ?, ?) RETURNING {COLUMNS}"#
        );

        let params: Vec<libsql::Value> = vec![
            input.title.into(),
            input.url.into(),
            input.desc.into(),
            input.rating.into(),
        ];

        match self.query_one(&query, params).await? {
            Some(bookmark) => Ok(bookmark),
            None => anyhow::bail!("Failed to create bookmark"),
        }
    }

    async fn update(&self, id: i64, changes: BookmarkChanges) -> Result<Option<Bookmark>> {
        let mut updates = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(title) = changes.title {
            updates.push("title = ?");
            params.push(title.into());
        }
        if let Some(url) = changes.url {
            updates.push("url = ?");
            params.push(url.into());
        }
        if let Some(desc) = changes.desc {
            updates.push(r#""desc" = ?"#);
            params.push(desc.into());
        }
        if let Some(rating) = changes.rating {
            updates.push("rating = ?");
            params.push(rating.into());
        }

        if updates.is_empty() {
            return self.find_by_id(id).await;
        }

        params.push(id.into());
        let query = format!("UPDATE bookmarks SET {} WHERE id = ?", updates.join(", "));

        let affected = self.db.connection().execute(&query, params).await?;
        if affected == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.db
            .connection()
            .execute("DELETE FROM bookmarks WHERE id = ?", libsql::params![id])
            .await?;
        Ok(())
    }

    async fn most_recent(&self) -> Result<Option<Bookmark>> {
        let query = format!("SELECT {COLUMNS} FROM bookmarks ORDER BY created_at DESC, id DESC LIMIT 1");
        self.query_one(&query, Vec::new()).await
    }
}
