//! PageService — SEO-aware page operations over the page store.
//!
//! Carries its collaborators explicitly (store + language configuration)
//! and is the shared state handed to the router.

use crate::config::LangConfig;
use crate::errors::AppError;
use crate::models::page::Page;
use crate::models::seo::{PageRequest, SeoPageDto};
use crate::services::page_store::{PageStore, StoreError};
use crate::services::seo_mapper;
use std::sync::Arc;
use tracing::{error, warn};

#[derive(Clone)]
pub struct PageService {
    store: PageStore,
    langs: Arc<LangConfig>,
}

impl PageService {
    pub fn new(store: PageStore, langs: Arc<LangConfig>) -> Self {
        Self { store, langs }
    }

    /// The underlying store, for probes that need the raw pool.
    pub fn store(&self) -> &PageStore {
        &self.store
    }

    /// Fetch one page with its SEO data expanded for every configured
    /// language.
    pub async fn get_page(&self, code: &str) -> Result<SeoPageDto, AppError> {
        let page = self.store.load_page(code).await.map_err(|err| {
            if matches!(err, StoreError::PageNotFound(_)) {
                warn!("no page found with code {}", code);
            }
            AppError::from(err)
        })?;
        Ok(self.page_to_dto(page))
    }

    /// All stored page codes.
    pub async fn list_pages(&self) -> Result<Vec<String>, AppError> {
        Ok(self.store.list_codes().await?)
    }

    /// Create a page from a request, building its metadata record fresh.
    pub async fn create_page(&self, request: PageRequest) -> Result<SeoPageDto, AppError> {
        let metadata = seo_mapper::metadata_from_request(&request, &self.langs);
        let page = Page {
            code: request.code.clone(),
            parent_code: request.parent_code.clone(),
            metadata,
        };
        match self.store.insert_page(&page).await {
            Ok(()) => Ok(self.page_to_dto(page)),
            Err(StoreError::PageAlreadyExists(code)) => {
                Err(AppError::conflict(format!("page `{}` already exists", code)))
            }
            Err(err) => {
                error!("error adding seo page {}: {}", page.code, err);
                Err(err.into())
            }
        }
    }

    /// Replace a page's metadata wholesale from a request.
    ///
    /// The owner group is immutable: a mismatch is a validation failure
    /// naming the stored and requested groups, distinct from not-found.
    pub async fn update_page(
        &self,
        code: &str,
        request: PageRequest,
    ) -> Result<SeoPageDto, AppError> {
        let old_page = self.store.load_page(code).await?;
        if old_page.metadata.group != request.owner_group {
            return Err(AppError::bad_request(format!(
                "cannot change the owner group of page `{}` from `{}` to `{}`",
                code, old_page.metadata.group, request.owner_group
            )));
        }

        let metadata = seo_mapper::metadata_from_request(&request, &self.langs);
        let page = Page {
            code: code.to_string(),
            parent_code: request.parent_code.clone(),
            metadata,
        };
        if let Err(err) = self.store.update_page(&page).await {
            error!("error updating page {}: {}", code, err);
            return Err(err.into());
        }
        Ok(self.page_to_dto(page))
    }

    /// Remove a page; its embedded metadata is destroyed with it.
    pub async fn delete_page(&self, code: &str) -> Result<(), AppError> {
        Ok(self.store.delete_page(code).await?)
    }

    fn page_to_dto(&self, page: Page) -> SeoPageDto {
        let seo_data = seo_mapper::seo_data_from_metadata(&page.metadata, &self.langs);
        let meta = page.metadata;
        SeoPageDto {
            code: page.code,
            parent_code: page.parent_code,
            owner_group: meta.group,
            page_model: meta.model_code,
            titles: meta.titles,
            displayed_in_menu: meta.showable,
            charset: meta.charset,
            content_type: meta.mime_type,
            join_groups: meta.extra_groups.into_iter().collect(),
            seo_data,
            last_modified: meta.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::seo::{SeoData, SeoDataByLang};
    use axum::http::StatusCode;
    use sqlx::sqlite::SqlitePoolOptions;
    use std::collections::HashMap;

    async fn service() -> PageService {
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
        let langs = LangConfig::new(vec!["en".into(), "it".into()], "en".into()).unwrap();
        PageService::new(PageStore::new(Arc::new(pool)), Arc::new(langs))
    }

    fn request(code: &str, group: &str) -> PageRequest {
        PageRequest {
            code: code.into(),
            parent_code: Some("root".into()),
            owner_group: group.into(),
            page_model: "homepage".into(),
            titles: HashMap::from([("en".to_string(), "Home".to_string())]),
            displayed_in_menu: true,
            charset: None,
            content_type: None,
            join_groups: None,
            seo_data: Some(SeoData {
                seo_data_by_lang: HashMap::from([(
                    "en".to_string(),
                    SeoDataByLang {
                        description: Some("Welcome".into()),
                        ..Default::default()
                    },
                )]),
                ..Default::default()
            }),
        }
    }

    #[tokio::test]
    async fn create_then_get() {
        let svc = service().await;
        let created = svc.create_page(request("home", "free")).await.unwrap();
        assert_eq!(created.code, "home");
        assert!(created.last_modified.is_some());

        let fetched = svc.get_page("home").await.unwrap();
        assert_eq!(fetched.owner_group, "free");
        assert_eq!(
            fetched.seo_data.seo_data_by_lang["en"].description.as_deref(),
            Some("Welcome")
        );
        // every configured language is present in the response
        assert!(fetched.seo_data.seo_data_by_lang.contains_key("it"));
    }

    #[tokio::test]
    async fn get_missing_is_404() {
        let svc = service().await;
        let err = svc.get_page("nope").await.unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_missing_is_404() {
        let svc = service().await;
        let err = svc
            .update_page("nope", request("nope", "free"))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn group_mismatch_is_validation_error_naming_both() {
        let svc = service().await;
        svc.create_page(request("home", "free")).await.unwrap();
        let err = svc
            .update_page("home", request("home", "admins"))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.message.contains("free"));
        assert!(err.message.contains("admins"));
    }

    #[tokio::test]
    async fn update_replaces_seo_data() {
        let svc = service().await;
        svc.create_page(request("home", "free")).await.unwrap();

        let mut next = request("home", "free");
        next.seo_data = None;
        let updated = svc.update_page("home", next).await.unwrap();
        assert_eq!(
            updated.seo_data.seo_data_by_lang["en"].description.as_deref(),
            Some("")
        );

        let fetched = svc.get_page("home").await.unwrap();
        assert_eq!(
            fetched.seo_data.seo_data_by_lang["en"].description.as_deref(),
            Some("")
        );
    }

    #[tokio::test]
    async fn duplicate_create_is_conflict() {
        let svc = service().await;
        svc.create_page(request("home", "free")).await.unwrap();
        let err = svc.create_page(request("home", "free")).await.unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn delete_then_get_is_404() {
        let svc = service().await;
        svc.create_page(request("home", "free")).await.unwrap();
        svc.delete_page("home").await.unwrap();
        let err = svc.get_page("home").await.unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_pages_returns_codes() {
        let svc = service().await;
        svc.create_page(request("a", "free")).await.unwrap();
        svc.create_page(request("b", "free")).await.unwrap();
        assert_eq!(svc.list_pages().await.unwrap(), vec!["a", "b"]);
    }
}
