//! Per-page SEO metadata: the internal record persisted alongside a page.

use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};

/// A single SEO field value for one language.
///
/// One entry per (language, field) pair; `use_default_lang_value` marks
/// values displayed by falling back to the default language instead of a
/// locally authored string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMetatag {
    /// Language code owning this value (e.g. "en").
    pub language: String,

    /// Field name (e.g. "description", "keywords", or a custom tag key).
    pub key: String,

    /// Optional HTML attribute name for custom tags (e.g. "name", "property").
    pub key_attribute: Option<String>,

    /// The stored value, trimmed.
    pub value: String,

    /// True when the displayed value is inherited from the default language.
    pub use_default_lang_value: bool,
}

impl PageMetatag {
    /// Build a tag for one of the built-in fields. The value is trimmed.
    pub fn new(language: &str, key: &str, value: &str, use_default_lang_value: bool) -> Self {
        Self {
            language: language.to_string(),
            key: key.to_string(),
            key_attribute: None,
            value: value.trim().to_string(),
            use_default_lang_value,
        }
    }

    /// Build a custom meta tag carrying an attribute name.
    pub fn with_attribute(
        language: &str,
        key: &str,
        key_attribute: Option<String>,
        value: &str,
        use_default_lang_value: bool,
    ) -> Self {
        Self {
            language: language.to_string(),
            key: key.to_string(),
            key_attribute,
            value: value.trim().to_string(),
            use_default_lang_value,
        }
    }
}

/// The SEO-aware page metadata record.
///
/// Embedded configuration owned by a page row: created fresh on page
/// creation, replaced wholesale on every update, destroyed with the page.
/// The per-language maps only ever contain configured language codes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeoPageMetadata {
    /// Owner permission group.
    pub group: String,

    /// Page titles per language. Titles carry no inheritance flag.
    pub titles: HashMap<String, String>,

    /// Template identifier the page renders with.
    pub model_code: String,

    /// Whether the page is visible in navigation menus.
    pub showable: bool,

    /// Character set declared for the page, if any.
    pub charset: Option<String>,

    /// MIME type declared for the page, if any.
    pub mime_type: Option<String>,

    /// Per-language meta description entries.
    pub descriptions: HashMap<String, PageMetatag>,

    /// Per-language meta keywords entries.
    pub keywords: HashMap<String, PageMetatag>,

    /// Per-language friendly URL slugs.
    pub friendly_codes: HashMap<String, PageMetatag>,

    /// Arbitrary custom meta tags: language -> tag key -> tag.
    pub complex_parameters: HashMap<String, HashMap<String, PageMetatag>>,

    /// Whether extra descriptions from content are used for this page.
    pub use_extra_descriptions: bool,

    /// Whether extra titles from content are used for this page.
    pub use_extra_titles: bool,

    /// Additional permission groups joined to the page.
    pub extra_groups: BTreeSet<String>,

    /// Last metadata write; None for rows that never recorded one.
    pub updated_at: Option<DateTime<Utc>>,
}
