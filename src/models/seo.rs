//! Wire-facing request/response shapes for the SEO page endpoints.
//!
//! The same `SeoData` shape travels both ways: requests may leave fields
//! absent (absent and empty string mean different things on the write
//! path), responses always fill every configured language.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single custom meta tag as it appears on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SeoMetaTag {
    /// Tag key (e.g. "author").
    pub key: String,

    /// HTML attribute the key is rendered with (e.g. "name", "property").
    #[serde(default)]
    pub key_attribute: Option<String>,

    /// Tag value.
    pub value: String,

    /// Inherit the value from the default language.
    #[serde(default)]
    pub use_default_lang: bool,
}

/// Per-language SEO fields.
///
/// On the write path `None` means "no entry for this language" while
/// `Some("")` stores an explicit empty value. Inheritance flags are
/// ignored (forced false) when the language is the configured default.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeoDataByLang {
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub keywords: Option<String>,

    #[serde(default)]
    pub friendly_code: Option<String>,

    #[serde(default)]
    pub meta_tags: Option<Vec<SeoMetaTag>>,

    #[serde(default)]
    pub inherit_description_from_default_lang: bool,

    #[serde(default)]
    pub inherit_keywords_from_default_lang: bool,

    #[serde(default)]
    pub inherit_friendly_code_from_default_lang: bool,
}

/// The page's SEO payload: top-level toggles plus the per-language map.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeoData {
    #[serde(default)]
    pub use_extra_descriptions: Option<bool>,

    #[serde(default)]
    pub use_extra_titles: Option<bool>,

    #[serde(default)]
    pub seo_data_by_lang: HashMap<String, SeoDataByLang>,
}

/// Incoming page create/update request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    pub code: String,

    #[serde(default)]
    pub parent_code: Option<String>,

    pub owner_group: String,

    /// Template identifier for the page.
    pub page_model: String,

    /// Titles per language code; unknown codes are dropped with a warning.
    #[serde(default)]
    pub titles: HashMap<String, String>,

    #[serde(default)]
    pub displayed_in_menu: bool,

    #[serde(default)]
    pub charset: Option<String>,

    #[serde(default)]
    pub content_type: Option<String>,

    #[serde(default)]
    pub join_groups: Option<Vec<String>>,

    /// Absent payload means a record with no per-language SEO fields.
    #[serde(default)]
    pub seo_data: Option<SeoData>,
}

/// Outgoing page representation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeoPageDto {
    pub code: String,
    pub parent_code: Option<String>,
    pub owner_group: String,
    pub page_model: String,
    pub titles: HashMap<String, String>,
    pub displayed_in_menu: bool,
    pub charset: Option<String>,
    pub content_type: Option<String>,
    pub join_groups: Vec<String>,
    pub seo_data: SeoData,
    pub last_modified: Option<chrono::DateTime<chrono::Utc>>,
}
