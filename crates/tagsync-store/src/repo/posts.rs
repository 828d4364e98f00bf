use crate::error::Result;
use crate::query::PostQuery;
use rusqlite::types::ToSql;
use rusqlite::{params, Connection, OptionalExtension};
use tagsync_core::{PostId, TagSet};

pub struct PostsRepo<'a> {
    conn: &'a Connection,
}

impl<'a> PostsRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Overwrites the mirrored tags of a post, creating it when missing.
    /// Run inside a transaction when atomicity matters.
    pub fn replace_tags(&self, now_utc: i64, post_id: PostId, tags: &TagSet) -> Result<()> {
        self.conn.execute(
            "INSERT INTO posts (id, updated_at) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET updated_at = excluded.updated_at;",
            params![post_id.get(), now_utc],
        )?;
        self.conn
            .execute("DELETE FROM post_tags WHERE post_id = ?1;", [post_id.get()])?;

        let mut stmt = self
            .conn
            .prepare("INSERT OR IGNORE INTO post_tags (post_id, tag) VALUES (?1, ?2);")?;
        for tag in tags.iter() {
            stmt.execute(params![post_id.get(), tag.as_str()])?;
        }
        Ok(())
    }

    pub fn exists(&self, post_id: PostId) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM posts WHERE id = ?1;",
                [post_id.get()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    pub fn get_tags(&self, post_id: PostId) -> Result<Option<TagSet>> {
        if !self.exists(post_id)? {
            return Ok(None);
        }
        let mut stmt = self
            .conn
            .prepare("SELECT tag FROM post_tags WHERE post_id = ?1 ORDER BY tag ASC;")?;
        let mut rows = stmt.query([post_id.get()])?;
        let mut tags = TagSet::new();
        while let Some(row) = rows.next()? {
            let tag: String = row.get(0)?;
            tags.set(&tag);
        }
        Ok(Some(tags))
    }

    pub fn list_ids(&self) -> Result<Vec<PostId>> {
        let mut stmt = self.conn.prepare("SELECT id FROM posts ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            ids.push(PostId::new(row.get(0)?)?);
        }
        Ok(ids)
    }

    /// Every mirrored post with its tags, ordered by id.
    pub fn load_all(&self) -> Result<Vec<(PostId, TagSet)>> {
        let mut posts: Vec<(PostId, TagSet)> = self
            .list_ids()?
            .into_iter()
            .map(|id| (id, TagSet::new()))
            .collect();

        let mut stmt = self
            .conn
            .prepare("SELECT post_id, tag FROM post_tags ORDER BY post_id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut cursor = 0;
        while let Some(row) = rows.next()? {
            let post_id: i64 = row.get(0)?;
            let tag: String = row.get(1)?;
            while cursor < posts.len() && posts[cursor].0.get() < post_id {
                cursor += 1;
            }
            if let Some((id, tags)) = posts.get_mut(cursor) {
                if id.get() == post_id {
                    tags.set(&tag);
                }
            }
        }
        Ok(posts)
    }

    pub fn delete(&self, post_id: PostId) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM posts WHERE id = ?1;", [post_id.get()])?;
        Ok(deleted > 0)
    }

    /// Ids of mirrored posts satisfying the query.
    pub fn search(&self, query: &PostQuery) -> Result<Vec<PostId>> {
        let sql = query.to_sql();
        let mut stmt = self.conn.prepare(&sql.sql)?;
        let named: Vec<(&str, &dyn ToSql)> = sql
            .params
            .iter()
            .map(|(name, value)| (name.as_str(), value as &dyn ToSql))
            .collect();
        let mut rows = stmt.query(named.as_slice())?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            ids.push(PostId::new(row.get(0)?)?);
        }
        Ok(ids)
    }
}
