//! Codec for the two serialized page columns: the titles blob
//! (`<properties>`) and the SEO extra-config blob (`<seoconfig>`).
//!
//! Both directions live here, so the vocabulary only has to agree with
//! itself. Parsing walks quick-xml events; writing builds the document by
//! hand through `xml_escape`.

use crate::models::metadata::{PageMetatag, SeoPageMetadata};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("XML parse error: {0}")]
    Xml(String),
    #[error("missing `{0}` root element")]
    MissingRoot(&'static str),
    #[error("<{element}> element missing `{attribute}` attribute")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },
}

/// Read one attribute off an element, unescaped.
fn attr_value(e: &BytesStart, name: &str) -> Result<Option<String>, BlobError> {
    match e.try_get_attribute(name) {
        Ok(Some(attr)) => attr
            .unescape_value()
            .map(|v| Some(v.into_owned()))
            .map_err(|err| BlobError::Xml(err.to_string())),
        Ok(None) => Ok(None),
        Err(err) => Err(BlobError::Xml(err.to_string())),
    }
}

fn required_attr(
    e: &BytesStart,
    element: &'static str,
    attribute: &'static str,
) -> Result<String, BlobError> {
    attr_value(e, attribute)?.ok_or(BlobError::MissingAttribute { element, attribute })
}

fn parse_bool(raw: &str) -> bool {
    raw.trim().eq_ignore_ascii_case("true")
}

// ---------------------------------------------------------------------------
// Titles blob
// ---------------------------------------------------------------------------

/// Parse the titles blob into a language -> title map.
///
/// Format: `<properties><property key="en">Home</property></properties>`.
pub fn parse_titles(xml: &str) -> Result<HashMap<String, String>, BlobError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut titles = HashMap::new();
    let mut saw_root = false;
    let mut current_key: Option<String> = None;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"properties" => saw_root = true,
                b"property" => {
                    current_key = Some(required_attr(&e, "property", "key")?);
                    text.clear();
                }
                _ => {}
            },
            Ok(Event::Empty(e)) if e.name().as_ref() == b"property" => {
                let key = required_attr(&e, "property", "key")?;
                titles.insert(key, String::new());
            }
            Ok(Event::Text(e)) => {
                if current_key.is_some() {
                    let chunk = e
                        .unescape()
                        .map_err(|err| BlobError::Xml(err.to_string()))?;
                    text.push_str(&chunk);
                }
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"property" => {
                if let Some(key) = current_key.take() {
                    titles.insert(key, std::mem::take(&mut text));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => return Err(BlobError::Xml(err.to_string())),
        }
    }

    if !saw_root {
        return Err(BlobError::MissingRoot("properties"));
    }
    Ok(titles)
}

/// Serialize a titles map, keys in sorted order for stable output.
pub fn build_titles(titles: &HashMap<String, String>) -> String {
    let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?><properties>"#);
    let mut keys: Vec<&String> = titles.keys().collect();
    keys.sort();
    for key in keys {
        xml.push_str(&format!(
            r#"<property key="{}">{}</property>"#,
            xml_escape(key),
            xml_escape(&titles[key])
        ));
    }
    xml.push_str("</properties>");
    xml
}

// ---------------------------------------------------------------------------
// Extra-config blob
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, PartialEq)]
enum Section {
    None,
    Descriptions,
    Keywords,
    FriendlyCodes,
    ComplexParameters,
    ExtraGroups,
}

/// Populate the SEO fields of `meta` from a non-empty extra-config blob.
///
/// The base column fields (group, titles, model code, showable, timestamp)
/// are untouched; only the SEO extras are written. Any structural problem
/// is fatal for the blob.
pub fn apply_extra_config(meta: &mut SeoPageMetadata, xml: &str) -> Result<(), BlobError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut saw_root = false;
    let mut section = Section::None;
    let mut scalar: Option<String> = None;
    let mut text = String::new();
    // key attribute + inherit flag of the <property> being read
    let mut pending_prop: Option<(String, bool)> = None;
    // lang, key, attribute, inherit flag of the <parameter> being read
    let mut pending_param: Option<(String, String, Option<String>, bool)> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"seoconfig" => saw_root = true,
                b"descriptions" => section = Section::Descriptions,
                b"keywords" => section = Section::Keywords,
                b"friendlycodes" => section = Section::FriendlyCodes,
                b"complexparameters" => section = Section::ComplexParameters,
                b"extragroups" => section = Section::ExtraGroups,
                b"property" if section != Section::None => {
                    let key = required_attr(&e, "property", "key")?;
                    let inherit = attr_value(&e, "usedefaultlang")?
                        .map(|v| parse_bool(&v))
                        .unwrap_or(false);
                    pending_prop = Some((key, inherit));
                    text.clear();
                }
                b"parameter" if section == Section::ComplexParameters => {
                    let lang = required_attr(&e, "parameter", "lang")?;
                    let key = required_attr(&e, "parameter", "key")?;
                    let attribute = attr_value(&e, "attribute")?;
                    let inherit = attr_value(&e, "usedefaultlang")?
                        .map(|v| parse_bool(&v))
                        .unwrap_or(false);
                    pending_param = Some((lang, key, attribute, inherit));
                    text.clear();
                }
                name @ (b"useextratitles" | b"useextradescriptions" | b"charset"
                | b"mimetype") => {
                    scalar = Some(String::from_utf8_lossy(name).into_owned());
                    text.clear();
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"group" if section == Section::ExtraGroups => {
                    meta.extra_groups
                        .insert(required_attr(&e, "group", "name")?);
                }
                b"property" if section != Section::None => {
                    let key = required_attr(&e, "property", "key")?;
                    let inherit = attr_value(&e, "usedefaultlang")?
                        .map(|v| parse_bool(&v))
                        .unwrap_or(false);
                    store_property(meta, section, key, String::new(), inherit);
                }
                b"parameter" if section == Section::ComplexParameters => {
                    let lang = required_attr(&e, "parameter", "lang")?;
                    let key = required_attr(&e, "parameter", "key")?;
                    let attribute = attr_value(&e, "attribute")?;
                    let inherit = attr_value(&e, "usedefaultlang")?
                        .map(|v| parse_bool(&v))
                        .unwrap_or(false);
                    store_parameter(meta, lang, key, attribute, String::new(), inherit);
                }
                _ => {}
            },
            Ok(Event::Text(e)) => {
                let chunk = e
                    .unescape()
                    .map_err(|err| BlobError::Xml(err.to_string()))?;
                text.push_str(&chunk);
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"property" => {
                    if let Some((key, inherit)) = pending_prop.take() {
                        store_property(meta, section, key, std::mem::take(&mut text), inherit);
                    }
                }
                b"parameter" => {
                    if let Some((lang, key, attribute, inherit)) = pending_param.take() {
                        store_parameter(
                            meta,
                            lang,
                            key,
                            attribute,
                            std::mem::take(&mut text),
                            inherit,
                        );
                    }
                }
                b"descriptions" | b"keywords" | b"friendlycodes" | b"complexparameters"
                | b"extragroups" => section = Section::None,
                name => {
                    if let Some(tag) = scalar.take() {
                        if tag.as_bytes() == name {
                            apply_scalar(meta, &tag, text.trim());
                        }
                        text.clear();
                    }
                }
            },
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => return Err(BlobError::Xml(err.to_string())),
        }
    }

    if !saw_root {
        return Err(BlobError::MissingRoot("seoconfig"));
    }
    Ok(())
}

fn apply_scalar(meta: &mut SeoPageMetadata, tag: &str, value: &str) {
    match tag {
        "useextratitles" => meta.use_extra_titles = parse_bool(value),
        "useextradescriptions" => meta.use_extra_descriptions = parse_bool(value),
        "charset" if !value.is_empty() => meta.charset = Some(value.to_string()),
        "mimetype" if !value.is_empty() => meta.mime_type = Some(value.to_string()),
        _ => {}
    }
}

fn store_property(
    meta: &mut SeoPageMetadata,
    section: Section,
    lang: String,
    value: String,
    inherit: bool,
) {
    let (map, field) = match section {
        Section::Descriptions => (&mut meta.descriptions, "description"),
        Section::Keywords => (&mut meta.keywords, "keywords"),
        Section::FriendlyCodes => (&mut meta.friendly_codes, "friendlyCode"),
        _ => return,
    };
    map.insert(lang.clone(), PageMetatag::new(&lang, field, &value, inherit));
}

fn store_parameter(
    meta: &mut SeoPageMetadata,
    lang: String,
    key: String,
    attribute: Option<String>,
    value: String,
    inherit: bool,
) {
    let tag = PageMetatag::with_attribute(&lang, &key, attribute, &value, inherit);
    meta.complex_parameters
        .entry(lang)
        .or_default()
        .insert(key, tag);
}

/// Serialize the SEO extras of a metadata record into the extra-config
/// blob. Sections and keys come out in sorted order for stable storage.
pub fn build_extra_config(meta: &SeoPageMetadata) -> String {
    let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?><seoconfig>"#);
    xml.push_str(&format!(
        "<useextratitles>{}</useextratitles>",
        meta.use_extra_titles
    ));
    xml.push_str(&format!(
        "<useextradescriptions>{}</useextradescriptions>",
        meta.use_extra_descriptions
    ));
    if let Some(charset) = &meta.charset {
        xml.push_str(&format!("<charset>{}</charset>", xml_escape(charset)));
    }
    if let Some(mime) = &meta.mime_type {
        xml.push_str(&format!("<mimetype>{}</mimetype>", xml_escape(mime)));
    }
    if !meta.extra_groups.is_empty() {
        xml.push_str("<extragroups>");
        for group in &meta.extra_groups {
            xml.push_str(&format!(r#"<group name="{}" />"#, xml_escape(group)));
        }
        xml.push_str("</extragroups>");
    }
    push_property_section(&mut xml, "descriptions", &meta.descriptions);
    push_property_section(&mut xml, "keywords", &meta.keywords);
    push_property_section(&mut xml, "friendlycodes", &meta.friendly_codes);
    if !meta.complex_parameters.is_empty() {
        xml.push_str("<complexparameters>");
        let mut langs: Vec<&String> = meta.complex_parameters.keys().collect();
        langs.sort();
        for lang in langs {
            let tags = &meta.complex_parameters[lang];
            let mut keys: Vec<&String> = tags.keys().collect();
            keys.sort();
            for key in keys {
                let tag = &tags[key];
                xml.push_str(&format!(r#"<parameter lang="{}" key="{}""#,
                    xml_escape(lang),
                    xml_escape(key)
                ));
                if let Some(attribute) = &tag.key_attribute {
                    xml.push_str(&format!(r#" attribute="{}""#, xml_escape(attribute)));
                }
                xml.push_str(&format!(
                    r#" usedefaultlang="{}">{}</parameter>"#,
                    tag.use_default_lang_value,
                    xml_escape(&tag.value)
                ));
            }
        }
        xml.push_str("</complexparameters>");
    }
    xml.push_str("</seoconfig>");
    xml
}

fn push_property_section(xml: &mut String, name: &str, map: &HashMap<String, PageMetatag>) {
    if map.is_empty() {
        return;
    }
    xml.push_str(&format!("<{}>", name));
    let mut langs: Vec<&String> = map.keys().collect();
    langs.sort();
    for lang in langs {
        let tag = &map[lang];
        xml.push_str(&format!(
            r#"<property key="{}" usedefaultlang="{}">{}</property>"#,
            xml_escape(lang),
            tag.use_default_lang_value,
            xml_escape(&tag.value)
        ));
    }
    xml.push_str(&format!("</{}>", name));
}

fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn sample_metadata() -> SeoPageMetadata {
        let mut meta = SeoPageMetadata {
            use_extra_titles: true,
            charset: Some("utf-8".into()),
            mime_type: Some("text/html".into()),
            extra_groups: BTreeSet::from(["free".to_string(), "editors".to_string()]),
            ..Default::default()
        };
        meta.descriptions
            .insert("en".into(), PageMetatag::new("en", "description", "Home page", false));
        meta.descriptions
            .insert("it".into(), PageMetatag::new("it", "description", "Pagina", true));
        meta.keywords
            .insert("en".into(), PageMetatag::new("en", "keywords", "cms, seo", false));
        meta.friendly_codes
            .insert("en".into(), PageMetatag::new("en", "friendlyCode", "home", false));
        meta.complex_parameters.entry("en".into()).or_default().insert(
            "author".into(),
            PageMetatag::with_attribute("en", "author", Some("name".into()), "Jane", false),
        );
        meta
    }

    #[test]
    fn titles_round_trip() {
        let mut titles = HashMap::new();
        titles.insert("en".to_string(), "Home & Garden".to_string());
        titles.insert("it".to_string(), "Pagina <iniziale>".to_string());
        let xml = build_titles(&titles);
        let parsed = parse_titles(&xml).unwrap();
        assert_eq!(parsed, titles);
    }

    #[test]
    fn titles_empty_value_preserved() {
        let mut titles = HashMap::new();
        titles.insert("en".to_string(), String::new());
        let parsed = parse_titles(&build_titles(&titles)).unwrap();
        assert_eq!(parsed.get("en"), Some(&String::new()));
    }

    #[test]
    fn titles_missing_key_attribute_fails() {
        let err = parse_titles("<properties><property>Home</property></properties>");
        assert!(err.is_err());
    }

    #[test]
    fn titles_not_xml_fails() {
        assert!(parse_titles("this is not xml").is_err());
    }

    #[test]
    fn extra_config_round_trip() {
        let meta = sample_metadata();
        let xml = build_extra_config(&meta);

        let mut rebuilt = SeoPageMetadata::default();
        apply_extra_config(&mut rebuilt, &xml).unwrap();

        assert_eq!(rebuilt.use_extra_titles, meta.use_extra_titles);
        assert_eq!(rebuilt.use_extra_descriptions, meta.use_extra_descriptions);
        assert_eq!(rebuilt.charset, meta.charset);
        assert_eq!(rebuilt.mime_type, meta.mime_type);
        assert_eq!(rebuilt.extra_groups, meta.extra_groups);
        assert_eq!(rebuilt.descriptions, meta.descriptions);
        assert_eq!(rebuilt.keywords, meta.keywords);
        assert_eq!(rebuilt.friendly_codes, meta.friendly_codes);
        assert_eq!(rebuilt.complex_parameters, meta.complex_parameters);
    }

    #[test]
    fn extra_config_malformed_fails() {
        let mut meta = SeoPageMetadata::default();
        assert!(apply_extra_config(&mut meta, "<seoconfig><descriptions></seoconfig>").is_err());
    }

    #[test]
    fn extra_config_wrong_root_fails() {
        let mut meta = SeoPageMetadata::default();
        let err = apply_extra_config(&mut meta, "<other></other>");
        assert!(matches!(err, Err(BlobError::MissingRoot("seoconfig"))));
    }

    #[test]
    fn extra_config_inherit_flags_survive() {
        let meta = sample_metadata();
        let mut rebuilt = SeoPageMetadata::default();
        apply_extra_config(&mut rebuilt, &build_extra_config(&meta)).unwrap();
        assert!(rebuilt.descriptions["it"].use_default_lang_value);
        assert!(!rebuilt.descriptions["en"].use_default_lang_value);
    }

    #[test]
    fn escaped_values_survive() {
        let mut meta = SeoPageMetadata::default();
        meta.descriptions.insert(
            "en".into(),
            PageMetatag::new("en", "description", r#"a < b & "c""#, false),
        );
        let mut rebuilt = SeoPageMetadata::default();
        apply_extra_config(&mut rebuilt, &build_extra_config(&meta)).unwrap();
        assert_eq!(rebuilt.descriptions["en"].value, r#"a < b & "c""#);
    }
}
