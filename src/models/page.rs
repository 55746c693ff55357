//! The page entity the store persists.

use crate::models::metadata::SeoPageMetadata;

/// A page row with its embedded SEO metadata.
///
/// The page tree (positioning, publishing workflow) lives in the page
/// framework; this service only stores the code, the parent link verbatim,
/// and the metadata record it owns.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Unique page code.
    pub code: String,

    /// Parent page code, stored as given. No tree semantics here.
    pub parent_code: Option<String>,

    /// The SEO metadata record embedded in this page.
    pub metadata: SeoPageMetadata,
}
