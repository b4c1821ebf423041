// ABOUTME: Tag storage layer using SQLite
// ABOUTME: Tag lookups, per-object tagging, and tag/model relation queries

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};
use std::collections::BTreeSet;
use tracing::{debug, info};

use tagging_config::TaggingSettings;
use tagging_storage::StorageError;

use crate::parser::parse_tag_input;
use crate::types::{CountedTag, ObjectSource, Tag, TagCreateInput, TagFilter, TaggedObject};

const OBJECT_COLUMNS: &str = "content_type, object_id";

pub struct TagStorage {
    pool: SqlitePool,
    settings: TaggingSettings,
}

impl TagStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_settings(pool, TaggingSettings::default())
    }

    pub fn with_settings(pool: SqlitePool, settings: TaggingSettings) -> Self {
        Self { pool, settings }
    }

    pub fn settings(&self) -> &TaggingSettings {
        &self.settings
    }

    /// List all tags ordered by name
    pub async fn list_tags(&self) -> Result<Vec<Tag>, StorageError> {
        debug!("Fetching all tags");

        let rows = sqlx::query("SELECT id, name, created_at FROM tags ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_tag).collect()
    }

    /// Get a single tag by ID
    pub async fn get_tag_by_id(&self, tag_id: &str) -> Result<Tag, StorageError> {
        debug!("Fetching tag: {}", tag_id);

        let row = sqlx::query("SELECT id, name, created_at FROM tags WHERE id = ?")
            .bind(tag_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("Tag '{}'", tag_id)))?;

        row_to_tag(&row)
    }

    /// Get a tag by name
    pub async fn get_tag_by_name(&self, name: &str) -> Result<Option<Tag>, StorageError> {
        debug!("Fetching tag by name: {}", name);

        let row = sqlx::query("SELECT id, name, created_at FROM tags WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_tag).transpose()
    }

    /// Resolve an identifier that is either a tag name or a tag ID.
    /// Names win when both would match.
    pub async fn get_tag(&self, ident: &str) -> Result<Option<Tag>, StorageError> {
        if let Some(tag) = self.get_tag_by_name(ident).await? {
            return Ok(Some(tag));
        }

        let row = sqlx::query("SELECT id, name, created_at FROM tags WHERE id = ?")
            .bind(ident)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_tag).transpose()
    }

    /// Parse a tag string and return the tags from it that exist
    pub async fn get_tag_list(&self, input: &str) -> Result<Vec<Tag>, StorageError> {
        let names = self.normalized_names(input);
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = QueryBuilder::<Sqlite>::new("SELECT id, name, created_at FROM tags WHERE name IN (");
        let mut separated = query.separated(", ");
        for name in names {
            separated.push_bind(name);
        }
        separated.push_unseparated(") ORDER BY name");

        let rows = query.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_tag).collect()
    }

    /// Create a new tag
    pub async fn create_tag(&self, input: TagCreateInput) -> Result<Tag, StorageError> {
        let name = self.normalize_name(input.name.trim());
        if name.is_empty() {
            return Err(StorageError::InvalidInput("Tag name cannot be empty".to_string()));
        }

        let tag_id = format!("tag-{}", nanoid::nanoid!());
        let now = Utc::now();

        debug!("Creating tag: {} (name: {})", tag_id, name);

        sqlx::query("INSERT INTO tags (id, name, created_at) VALUES (?, ?, ?)")
            .bind(&tag_id)
            .bind(&name)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    StorageError::Duplicate(format!("Tag '{}' already exists", name))
                }
                other => StorageError::Sqlx(other),
            })?;

        self.get_tag_by_id(&tag_id).await
    }

    /// Delete a tag along with every association it has
    pub async fn delete_tag(&self, tag_id: &str) -> Result<(), StorageError> {
        debug!("Deleting tag: {}", tag_id);

        let result = sqlx::query("DELETE FROM tags WHERE id = ?")
            .bind(tag_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("Tag '{}'", tag_id)));
        }

        Ok(())
    }

    /// Replace the tags on a record with the ones named in `input`.
    /// Returns the record's tags afterwards.
    pub async fn update_tags(
        &self,
        content_type: &str,
        object_id: &str,
        input: &str,
    ) -> Result<Vec<Tag>, StorageError> {
        let wanted = self.normalized_names(input);

        let mut tx = self.pool.begin().await?;

        let current = fetch_object_tags(&mut *tx, content_type, object_id).await?;

        // Remove tags which no longer apply
        for tag in current.iter().filter(|tag| !wanted.contains(&tag.name)) {
            sqlx::query(
                "DELETE FROM tagged_items WHERE tag_id = ? AND content_type = ? AND object_id = ?",
            )
            .bind(&tag.id)
            .bind(content_type)
            .bind(object_id)
            .execute(&mut *tx)
            .await?;
        }

        let current_names: BTreeSet<&str> = current.iter().map(|tag| tag.name.as_str()).collect();
        for name in wanted.iter().filter(|name| !current_names.contains(name.as_str())) {
            let tag = get_or_create_tag(&mut *tx, name).await?;
            insert_tagged_item(&mut *tx, &tag.id, content_type, object_id).await?;
        }

        let updated = fetch_object_tags(&mut *tx, content_type, object_id).await?;
        tx.commit().await?;

        info!(
            "Updated tags for {}:{} ({} tags)",
            content_type,
            object_id,
            updated.len()
        );

        Ok(updated)
    }

    /// Attach a single tag to a record. `input` must name exactly one tag.
    pub async fn add_tag(
        &self,
        content_type: &str,
        object_id: &str,
        input: &str,
    ) -> Result<Tag, StorageError> {
        let names = parse_tag_input(input);
        let name = match names.as_slice() {
            [] => {
                return Err(StorageError::InvalidInput(format!(
                    "No tags were given: \"{}\".",
                    input
                )))
            }
            [name] => self.normalize_name(name),
            _ => {
                return Err(StorageError::InvalidInput(format!(
                    "Multiple tags were given: \"{}\".",
                    input
                )))
            }
        };

        let mut tx = self.pool.begin().await?;
        let tag = get_or_create_tag(&mut *tx, &name).await?;
        insert_tagged_item(&mut *tx, &tag.id, content_type, object_id).await?;
        tx.commit().await?;

        Ok(tag)
    }

    /// Tags attached to a record, ordered by name
    pub async fn get_for_object(
        &self,
        content_type: &str,
        object_id: &str,
    ) -> Result<Vec<Tag>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        fetch_object_tags(&mut *conn, content_type, object_id).await
    }

    /// Names of tags containing `query` (case-sensitive), in creation order,
    /// at most `limit` of them
    pub async fn search_by_name(
        &self,
        query: &str,
        filter: &TagFilter,
        limit: i64,
    ) -> Result<Vec<String>, StorageError> {
        debug!("Searching tags containing '{}' (limit: {})", query, limit);

        let mut builder = QueryBuilder::<Sqlite>::new("SELECT name FROM tags WHERE instr(name, ");
        builder.push_bind(query.to_string());
        builder.push(") > 0");

        if let Some(content_type) = &filter.content_type {
            builder.push(
                " AND EXISTS (SELECT 1 FROM tagged_items ti WHERE ti.tag_id = tags.id AND ti.content_type = ",
            );
            builder.push_bind(content_type.clone());
            builder.push(")");
        }

        builder.push(" ORDER BY rowid LIMIT ");
        builder.push_bind(limit);

        let names = builder
            .build_query_scalar::<String>()
            .fetch_all(&self.pool)
            .await?;

        Ok(names)
    }

    /// Records in `source` carrying every one of `tags`, in the order they
    /// were first tagged. Returns the page and the total number of matches.
    pub async fn get_by_model(
        &self,
        source: &ObjectSource,
        tags: &[Tag],
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<(Vec<TaggedObject>, i64), StorageError> {
        if tags.is_empty() || source.object_ids().is_some_and(|ids| ids.is_empty()) {
            return Ok((Vec::new(), 0));
        }

        let tag_ids = distinct_ids(tags);

        let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM (");
        push_object_matches(&mut count_query, OBJECT_COLUMNS, source, &tag_ids, true);
        count_query.push(")");
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut query = QueryBuilder::<Sqlite>::new("");
        push_object_matches(&mut query, OBJECT_COLUMNS, source, &tag_ids, true);
        query.push(" ORDER BY MIN(rowid)");
        if let Some(lim) = limit {
            query.push(" LIMIT ");
            query.push_bind(lim);
            if let Some(off) = offset {
                query.push(" OFFSET ");
                query.push_bind(off);
            }
        }

        let rows = query.build().fetch_all(&self.pool).await?;
        let objects = rows
            .iter()
            .map(row_to_object)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((objects, total))
    }

    /// Records in `source` carrying any of `tags`
    pub async fn get_union_by_model(
        &self,
        source: &ObjectSource,
        tags: &[Tag],
    ) -> Result<Vec<TaggedObject>, StorageError> {
        if tags.is_empty() || source.object_ids().is_some_and(|ids| ids.is_empty()) {
            return Ok(Vec::new());
        }

        let tag_ids = distinct_ids(tags);

        let mut query = QueryBuilder::<Sqlite>::new("");
        push_object_matches(&mut query, OBJECT_COLUMNS, source, &tag_ids, false);
        query.push(" ORDER BY MIN(rowid)");

        let rows = query.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_object).collect()
    }

    /// Tags appearing on records of `content_type` that carry all of `tags`,
    /// excluding `tags` themselves, ordered by name. With `counts`, each
    /// tag reports how many such records have it.
    pub async fn related_for_model(
        &self,
        tags: &[Tag],
        content_type: &str,
        counts: bool,
        min_count: Option<i64>,
    ) -> Result<Vec<CountedTag>, StorageError> {
        if tags.is_empty() {
            return Ok(Vec::new());
        }

        let tag_ids = distinct_ids(tags);

        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT t.id, t.name, t.created_at, COUNT(ti.object_id) AS count \
             FROM tags t JOIN tagged_items ti ON ti.tag_id = t.id \
             WHERE ti.content_type = ",
        );
        query.push_bind(content_type.to_string());
        query.push(" AND ti.object_id IN (");
        let source = ObjectSource::Model(content_type.to_string());
        push_object_matches(&mut query, "object_id", &source, &tag_ids, true);
        query.push(") AND t.id NOT IN (");
        let mut excluded = query.separated(", ");
        for id in &tag_ids {
            excluded.push_bind(id.clone());
        }
        excluded.push_unseparated(") GROUP BY t.id, t.name, t.created_at");
        push_min_count(&mut query, min_count);
        query.push(" ORDER BY t.name");

        let rows = query.build().fetch_all(&self.pool).await?;
        rows.iter().map(|row| row_to_counted_tag(row, counts)).collect()
    }

    /// Tags used on records of `content_type`, ordered by name
    pub async fn usage_for_model(
        &self,
        content_type: &str,
        counts: bool,
        min_count: Option<i64>,
    ) -> Result<Vec<CountedTag>, StorageError> {
        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT t.id, t.name, t.created_at, COUNT(ti.object_id) AS count \
             FROM tags t JOIN tagged_items ti ON ti.tag_id = t.id \
             WHERE ti.content_type = ",
        );
        query.push_bind(content_type.to_string());
        query.push(" GROUP BY t.id, t.name, t.created_at");
        push_min_count(&mut query, min_count);
        query.push(" ORDER BY t.name");

        let rows = query.build().fetch_all(&self.pool).await?;
        rows.iter().map(|row| row_to_counted_tag(row, counts)).collect()
    }

    fn normalize_name(&self, name: &str) -> String {
        if self.settings.force_lowercase_tags {
            name.to_lowercase()
        } else {
            name.to_string()
        }
    }

    /// Distinct tag names in `input` as they would be stored
    pub fn normalized_names(&self, input: &str) -> BTreeSet<String> {
        parse_tag_input(input)
            .iter()
            .map(|name| self.normalize_name(name))
            .collect()
    }
}

async fn fetch_object_tags(
    conn: &mut SqliteConnection,
    content_type: &str,
    object_id: &str,
) -> Result<Vec<Tag>, StorageError> {
    let rows = sqlx::query(
        r#"
        SELECT t.id, t.name, t.created_at
        FROM tags t
        JOIN tagged_items ti ON ti.tag_id = t.id
        WHERE ti.content_type = ? AND ti.object_id = ?
        ORDER BY t.name
        "#,
    )
    .bind(content_type)
    .bind(object_id)
    .fetch_all(&mut *conn)
    .await?;

    rows.iter().map(row_to_tag).collect()
}

async fn get_or_create_tag(conn: &mut SqliteConnection, name: &str) -> Result<Tag, StorageError> {
    sqlx::query("INSERT OR IGNORE INTO tags (id, name, created_at) VALUES (?, ?, ?)")
        .bind(format!("tag-{}", nanoid::nanoid!()))
        .bind(name)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

    let row = sqlx::query("SELECT id, name, created_at FROM tags WHERE name = ?")
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;

    row_to_tag(&row)
}

async fn insert_tagged_item(
    conn: &mut SqliteConnection,
    tag_id: &str,
    content_type: &str,
    object_id: &str,
) -> Result<(), StorageError> {
    sqlx::query(
        r#"
        INSERT OR IGNORE INTO tagged_items (id, tag_id, content_type, object_id, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(format!("item-{}", nanoid::nanoid!()))
    .bind(tag_id)
    .bind(content_type)
    .bind(object_id)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Push a query selecting `columns` for records in `source` tagged with all
/// (`require_all`) or any of `tag_ids`.
fn push_object_matches(
    query: &mut QueryBuilder<'_, Sqlite>,
    columns: &str,
    source: &ObjectSource,
    tag_ids: &[String],
    require_all: bool,
) {
    query.push("SELECT ");
    query.push(columns);
    query.push(" FROM tagged_items WHERE content_type = ");
    query.push_bind(source.content_type().to_string());

    query.push(" AND tag_id IN (");
    let mut ids = query.separated(", ");
    for id in tag_ids {
        ids.push_bind(id.clone());
    }
    ids.push_unseparated(")");

    if let Some(object_ids) = source.object_ids() {
        query.push(" AND object_id IN (");
        let mut objects = query.separated(", ");
        for object_id in object_ids {
            objects.push_bind(object_id.clone());
        }
        objects.push_unseparated(")");
    }

    query.push(" GROUP BY content_type, object_id");
    if require_all {
        query.push(" HAVING COUNT(DISTINCT tag_id) = ");
        query.push_bind(tag_ids.len() as i64);
    }
}

fn push_min_count(query: &mut QueryBuilder<'_, Sqlite>, min_count: Option<i64>) {
    if let Some(min) = min_count {
        query.push(" HAVING COUNT(ti.object_id) >= ");
        query.push_bind(min);
    }
}

fn distinct_ids(tags: &[Tag]) -> Vec<String> {
    tags.iter()
        .map(|tag| tag.id.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Convert a database row to a Tag
fn row_to_tag(row: &SqliteRow) -> Result<Tag, StorageError> {
    Ok(Tag {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_counted_tag(row: &SqliteRow, counts: bool) -> Result<CountedTag, StorageError> {
    let count = if counts {
        Some(row.try_get::<i64, _>("count")?)
    } else {
        None
    };

    Ok(CountedTag {
        tag: row_to_tag(row)?,
        count,
    })
}

fn row_to_object(row: &SqliteRow) -> Result<TaggedObject, StorageError> {
    Ok(TaggedObject {
        content_type: row.try_get("content_type")?,
        object_id: row.try_get("object_id")?,
    })
}
