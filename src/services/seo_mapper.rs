//! Bidirectional mapping between the wire-level SEO payload and the
//! internal metadata record.
//!
//! Both directions are pure functions over their inputs plus the
//! configured language list; no state is consulted and new records are
//! returned instead of mutating shared maps.

use crate::config::LangConfig;
use crate::models::metadata::{PageMetatag, SeoPageMetadata};
use crate::models::seo::{PageRequest, SeoData, SeoDataByLang, SeoMetaTag};
use chrono::Utc;
use std::collections::HashMap;
use tracing::warn;

/// Expand a metadata record into the per-language wire shape.
///
/// Every configured language gets an entry: stored values are copied with
/// their inheritance flags, missing ones default to the empty string and
/// false. Derivable purely from the record.
pub fn seo_data_from_metadata(meta: &SeoPageMetadata, langs: &LangConfig) -> SeoData {
    let mut seo_data_by_lang = HashMap::new();
    for lang in langs.codes() {
        let (description, inherit_description) = lookup(&meta.descriptions, lang);
        let (keywords, inherit_keywords) = lookup(&meta.keywords, lang);
        let (friendly_code, inherit_friendly_code) = lookup(&meta.friendly_codes, lang);
        seo_data_by_lang.insert(
            lang.clone(),
            SeoDataByLang {
                description: Some(description),
                keywords: Some(keywords),
                friendly_code: Some(friendly_code),
                meta_tags: Some(meta_tag_list(lang, &meta.complex_parameters)),
                inherit_description_from_default_lang: inherit_description,
                inherit_keywords_from_default_lang: inherit_keywords,
                inherit_friendly_code_from_default_lang: inherit_friendly_code,
            },
        );
    }
    SeoData {
        use_extra_descriptions: Some(meta.use_extra_descriptions),
        use_extra_titles: Some(meta.use_extra_titles),
        seo_data_by_lang,
    }
}

fn lookup(map: &HashMap<String, PageMetatag>, lang: &str) -> (String, bool) {
    map.get(lang)
        .map(|tag| (tag.value.clone(), tag.use_default_lang_value))
        .unwrap_or_default()
}

/// Custom meta tags stored under one language, as wire entries. Sorted by
/// key so responses are stable; callers must not rely on any order.
fn meta_tag_list(
    lang: &str,
    complex_parameters: &HashMap<String, HashMap<String, PageMetatag>>,
) -> Vec<SeoMetaTag> {
    let mut tags: Vec<SeoMetaTag> = complex_parameters
        .get(lang)
        .into_iter()
        .flat_map(|by_key| by_key.values())
        .map(|tag| SeoMetaTag {
            key: tag.key.clone(),
            key_attribute: tag.key_attribute.clone(),
            value: tag.value.clone(),
            use_default_lang: tag.use_default_lang_value,
        })
        .collect();
    tags.sort_by(|a, b| a.key.cmp(&b.key));
    tags
}

/// Build a fresh metadata record from a page request.
///
/// Per-language entries with unrecognized language codes are dropped with
/// a warning and never stored. For the default language all inheritance
/// flags are forced false. A present string (empty included) is trimmed
/// and stored; an absent one writes no entry. An absent `seoData` payload
/// yields a record with no per-language SEO fields at all.
pub fn metadata_from_request(request: &PageRequest, langs: &LangConfig) -> SeoPageMetadata {
    let mut meta = SeoPageMetadata {
        group: request.owner_group.clone(),
        model_code: request.page_model.clone(),
        showable: request.displayed_in_menu,
        charset: request.charset.clone(),
        mime_type: request.content_type.clone(),
        extra_groups: request.join_groups.iter().flatten().cloned().collect(),
        ..Default::default()
    };

    if let Some(seo_data) = &request.seo_data {
        // Toggles keep their built-in defaults unless explicitly sent.
        if let Some(flag) = seo_data.use_extra_descriptions {
            meta.use_extra_descriptions = flag;
        }
        if let Some(flag) = seo_data.use_extra_titles {
            meta.use_extra_titles = flag;
        }

        for (lang, by_lang) in &seo_data.seo_data_by_lang {
            if !langs.is_configured(lang) {
                warn!("lang not valid: {}. seoDataByLang not added", lang);
                continue;
            }
            let is_default = langs.is_default(lang);
            let inherit_description = !is_default && by_lang.inherit_description_from_default_lang;
            let inherit_keywords = !is_default && by_lang.inherit_keywords_from_default_lang;
            let inherit_friendly_code =
                !is_default && by_lang.inherit_friendly_code_from_default_lang;

            if let Some(keywords) = &by_lang.keywords {
                meta.keywords.insert(
                    lang.clone(),
                    PageMetatag::new(lang, "keywords", keywords, inherit_keywords),
                );
            }
            if let Some(description) = &by_lang.description {
                meta.descriptions.insert(
                    lang.clone(),
                    PageMetatag::new(lang, "description", description, inherit_description),
                );
            }
            if let Some(friendly_code) = &by_lang.friendly_code {
                meta.friendly_codes.insert(
                    lang.clone(),
                    PageMetatag::new(lang, "friendlyCode", friendly_code, inherit_friendly_code),
                );
            }
            if let Some(tags) = &by_lang.meta_tags {
                meta.complex_parameters
                    .insert(lang.clone(), meta_tags_to_map(lang, tags));
            }
        }
    }

    for (lang, title) in &request.titles {
        if langs.is_configured(lang) {
            meta.titles.insert(lang.clone(), title.clone());
        } else {
            warn!("lang not valid: {}. title not added", lang);
        }
    }

    meta.updated_at = Some(Utc::now());
    meta
}

/// Convert a wire tag list into the per-key map stored under one language.
/// A later entry for a duplicate key silently replaces the earlier one.
fn meta_tags_to_map(lang: &str, tags: &[SeoMetaTag]) -> HashMap<String, PageMetatag> {
    let mut map = HashMap::new();
    for tag in tags {
        map.insert(
            tag.key.clone(),
            PageMetatag::with_attribute(
                lang,
                &tag.key,
                tag.key_attribute.clone(),
                &tag.value,
                tag.use_default_lang,
            ),
        );
    }
    map
}
