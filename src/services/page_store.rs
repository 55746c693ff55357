//! PageStore — SQLite-backed persistence for pages and their embedded SEO
//! metadata. Rows are decoded by fixed column order; the serialized titles
//! and extra-config columns go through the blob codec in `page_config`.

use crate::models::{metadata::SeoPageMetadata, page::Page};
use crate::services::page_config::{self, BlobError};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("page `{0}` not found")]
    PageNotFound(String),
    #[error("page `{0}` already exists")]
    PageAlreadyExists(String),
    #[error("error parsing the titles of page `{code}`: {source}")]
    TitlesParse { code: String, source: BlobError },
    #[error("error parsing the extra config of page `{code}`: {source}")]
    ExtraConfigParse { code: String, source: BlobError },
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Decode a metadata record from a page row, starting at column `start`.
///
/// Columns, in order: group, titles blob, model code, showable (integer,
/// 1 means visible), extra-config blob (nullable), update timestamp
/// (nullable). A blob that fails to parse is fatal for the row and the
/// error names the page code.
pub fn metadata_from_row(
    code: &str,
    row: &SqliteRow,
    start: usize,
) -> StoreResult<SeoPageMetadata> {
    let mut index = start;
    let mut meta = SeoPageMetadata {
        group: row.try_get(index)?,
        ..Default::default()
    };
    index += 1;

    let titles_blob: String = row.try_get(index)?;
    index += 1;
    meta.titles = page_config::parse_titles(&titles_blob).map_err(|source| {
        tracing::error!("error parsing the titles of page {}: {}", code, source);
        StoreError::TitlesParse {
            code: code.to_string(),
            source,
        }
    })?;

    meta.model_code = row.try_get(index)?;
    index += 1;

    let showable: i64 = row.try_get(index)?;
    index += 1;
    meta.showable = showable == 1;

    let extra_config: Option<String> = row.try_get(index)?;
    index += 1;
    if let Some(extra_config) = extra_config {
        if !extra_config.trim().is_empty() {
            page_config::apply_extra_config(&mut meta, &extra_config).map_err(|source| {
                tracing::error!("error parsing the extra config of page {}: {}", code, source);
                StoreError::ExtraConfigParse {
                    code: code.to_string(),
                    source,
                }
            })?;
        }
    }

    let updated_at: Option<DateTime<Utc>> = row.try_get(index)?;
    meta.updated_at = updated_at;

    Ok(meta)
}

/// Builds a metadata record from a page row starting at a column index.
/// Lets callers swap the decoding strategy without wrapping the store.
pub type MetadataBuilder = fn(&str, &SqliteRow, usize) -> StoreResult<SeoPageMetadata>;

/// PageStore provides the page persistence the service layer sits on:
/// - Load a page (decode metadata from the stored row)
/// - Insert / update a page (metadata replaced wholesale, blobs serialized)
/// - Delete a page (the embedded metadata goes with it)
/// - List stored page codes
///
/// Transactional guarantees stay with SQLite single statements; at most
/// one writer per page edit is assumed upstream.
#[derive(Clone)]
pub struct PageStore {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,

    builder: MetadataBuilder,
}

impl PageStore {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self {
            db,
            builder: metadata_from_row,
        }
    }

    /// A store decoding rows through a custom metadata builder.
    pub fn with_metadata_builder(db: Arc<SqlitePool>, builder: MetadataBuilder) -> Self {
        Self { db, builder }
    }

    /// Fetch a page row and decode its metadata.
    ///
    /// Returns PageNotFound if missing.
    pub async fn load_page(&self, code: &str) -> StoreResult<Page> {
        // Metadata columns stay in the order metadata_from_row consumes them.
        let row = sqlx::query(
            "SELECT parentcode, groupname, titles, modelcode, showable, extraconfig, updatedat
             FROM pages WHERE code = ?",
        )
        .bind(code)
        .fetch_one(&*self.db)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => StoreError::PageNotFound(code.to_string()),
            other => StoreError::Sqlx(other),
        })?;

        let parent_code: Option<String> = row.try_get(0)?;
        let metadata = (self.builder)(code, &row, 1)?;
        Ok(Page {
            code: code.to_string(),
            parent_code,
            metadata,
        })
    }

    /// Insert a new page row. Fails when the code is already taken.
    pub async fn insert_page(&self, page: &Page) -> StoreResult<()> {
        let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pages WHERE code = ?")
            .bind(&page.code)
            .fetch_one(&*self.db)
            .await?;
        if exists > 0 {
            return Err(StoreError::PageAlreadyExists(page.code.clone()));
        }

        debug!("inserting page {}", page.code);
        sqlx::query(
            "INSERT INTO pages (code, parentcode, groupname, titles, modelcode, showable, extraconfig, updatedat)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&page.code)
        .bind(&page.parent_code)
        .bind(&page.metadata.group)
        .bind(page_config::build_titles(&page.metadata.titles))
        .bind(&page.metadata.model_code)
        .bind(if page.metadata.showable { 1_i64 } else { 0 })
        .bind(page_config::build_extra_config(&page.metadata))
        .bind(page.metadata.updated_at)
        .execute(&*self.db)
        .await?;
        Ok(())
    }

    /// Replace a page row wholesale. Returns PageNotFound when the code
    /// does not exist.
    pub async fn update_page(&self, page: &Page) -> StoreResult<()> {
        debug!("updating page {}", page.code);
        let result = sqlx::query(
            "UPDATE pages
             SET parentcode = ?, groupname = ?, titles = ?, modelcode = ?,
                 showable = ?, extraconfig = ?, updatedat = ?
             WHERE code = ?",
        )
        .bind(&page.parent_code)
        .bind(&page.metadata.group)
        .bind(page_config::build_titles(&page.metadata.titles))
        .bind(&page.metadata.model_code)
        .bind(if page.metadata.showable { 1_i64 } else { 0 })
        .bind(page_config::build_extra_config(&page.metadata))
        .bind(page.metadata.updated_at)
        .bind(&page.code)
        .execute(&*self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::PageNotFound(page.code.clone()));
        }
        Ok(())
    }

    /// Remove a page row and the metadata embedded in it.
    pub async fn delete_page(&self, code: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM pages WHERE code = ?")
            .bind(code)
            .execute(&*self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::PageNotFound(code.to_string()));
        }
        Ok(())
    }

    /// All stored page codes, sorted.
    pub async fn list_codes(&self) -> StoreResult<Vec<String>> {
        let codes = sqlx::query_scalar("SELECT code FROM pages ORDER BY code")
            .fetch_all(&*self.db)
            .await?;
        Ok(codes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::metadata::PageMetatag;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_store() -> PageStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        for stmt in include_str!("../../migrations/0001_init.sql")
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            sqlx::query(stmt).execute(&pool).await.unwrap();
        }
        PageStore::new(Arc::new(pool))
    }

    fn sample_page() -> Page {
        let mut metadata = SeoPageMetadata {
            group: "free".into(),
            model_code: "home".into(),
            showable: true,
            use_extra_titles: true,
            updated_at: Some("2024-05-01T10:00:00Z".parse().unwrap()),
            ..Default::default()
        };
        metadata.titles.insert("en".into(), "Home".into());
        metadata.titles.insert("it".into(), "Pagina".into());
        metadata
            .descriptions
            .insert("en".into(), PageMetatag::new("en", "description", "Welcome", false));
        metadata.complex_parameters.entry("en".into()).or_default().insert(
            "author".into(),
            PageMetatag::with_attribute("en", "author", Some("name".into()), "Jane", false),
        );
        Page {
            code: "home".into(),
            parent_code: Some("root".into()),
            metadata,
        }
    }

    #[tokio::test]
    async fn insert_then_load_round_trips() {
        let store = test_store().await;
        let page = sample_page();
        store.insert_page(&page).await.unwrap();

        let loaded = store.load_page("home").await.unwrap();
        assert_eq!(loaded, page);
    }

    #[tokio::test]
    async fn missing_page_is_not_found() {
        let store = test_store().await;
        let err = store.load_page("nope").await.unwrap_err();
        assert!(matches!(err, StoreError::PageNotFound(code) if code == "nope"));
    }

    #[tokio::test]
    async fn duplicate_insert_rejected() {
        let store = test_store().await;
        let page = sample_page();
        store.insert_page(&page).await.unwrap();
        let err = store.insert_page(&page).await.unwrap_err();
        assert!(matches!(err, StoreError::PageAlreadyExists(_)));
    }

    #[tokio::test]
    async fn update_replaces_metadata_wholesale() {
        let store = test_store().await;
        let mut page = sample_page();
        store.insert_page(&page).await.unwrap();

        page.metadata.descriptions.clear();
        page.metadata.titles.insert("en".into(), "New home".into());
        page.metadata.showable = false;
        store.update_page(&page).await.unwrap();

        let loaded = store.load_page("home").await.unwrap();
        assert!(loaded.metadata.descriptions.is_empty());
        assert_eq!(loaded.metadata.titles["en"], "New home");
        assert!(!loaded.metadata.showable);
    }

    #[tokio::test]
    async fn delete_removes_row() {
        let store = test_store().await;
        store.insert_page(&sample_page()).await.unwrap();
        store.delete_page("home").await.unwrap();
        assert!(matches!(
            store.load_page("home").await,
            Err(StoreError::PageNotFound(_))
        ));
    }

    #[tokio::test]
    async fn empty_extra_config_keeps_defaults() {
        let store = test_store().await;
        sqlx::query(
            "INSERT INTO pages (code, parentcode, groupname, titles, modelcode, showable, extraconfig, updatedat)
             VALUES ('bare', NULL, 'free', ?, 'home', 2, '   ', NULL)",
        )
        .bind(page_config::build_titles(&Default::default()))
        .execute(&*store.db)
        .await
        .unwrap();

        let page = store.load_page("bare").await.unwrap();
        assert!(page.metadata.descriptions.is_empty());
        assert!(!page.metadata.use_extra_titles);
        // showable column 2 is not 1
        assert!(!page.metadata.showable);
        assert!(page.metadata.updated_at.is_none());
    }

    #[tokio::test]
    async fn malformed_titles_blob_names_page() {
        let store = test_store().await;
        sqlx::query(
            "INSERT INTO pages (code, parentcode, groupname, titles, modelcode, showable, extraconfig, updatedat)
             VALUES ('broken', NULL, 'free', 'not xml at all', 'home', 1, NULL, NULL)",
        )
        .execute(&*store.db)
        .await
        .unwrap();

        let err = store.load_page("broken").await.unwrap_err();
        assert!(err.to_string().contains("broken"));
        assert!(matches!(err, StoreError::TitlesParse { .. }));
    }

    #[tokio::test]
    async fn malformed_extra_config_names_page() {
        let store = test_store().await;
        sqlx::query(
            "INSERT INTO pages (code, parentcode, groupname, titles, modelcode, showable, extraconfig, updatedat)
             VALUES ('broken2', NULL, 'free', ?, 'home', 1, '<seoconfig><descriptions></seoconfig>', NULL)",
        )
        .bind(page_config::build_titles(&Default::default()))
        .execute(&*store.db)
        .await
        .unwrap();

        let err = store.load_page("broken2").await.unwrap_err();
        assert!(matches!(err, StoreError::ExtraConfigParse { code, .. } if code == "broken2"));
    }

    #[tokio::test]
    async fn custom_metadata_builder_is_used() {
        let store = test_store().await;
        store.insert_page(&sample_page()).await.unwrap();

        fn fixed_group(code: &str, _row: &sqlx::sqlite::SqliteRow, _start: usize) -> StoreResult<SeoPageMetadata> {
            Ok(SeoPageMetadata {
                group: format!("built-{}", code),
                ..Default::default()
            })
        }

        let custom = PageStore::with_metadata_builder(store.db.clone(), fixed_group);
        let page = custom.load_page("home").await.unwrap();
        assert_eq!(page.metadata.group, "built-home");
    }

    #[tokio::test]
    async fn list_codes_sorted() {
        let store = test_store().await;
        let mut a = sample_page();
        a.code = "zeta".into();
        let mut b = sample_page();
        b.code = "alpha".into();
        store.insert_page(&a).await.unwrap();
        store.insert_page(&b).await.unwrap();
        assert_eq!(store.list_codes().await.unwrap(), vec!["alpha", "zeta"]);
    }
}
