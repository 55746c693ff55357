//! Core data models for the SEO page metadata service.
//!
//! The internal records (`metadata`, `page`) are what the store persists;
//! `seo` holds the wire shapes exchanged with the request/response layer.

pub mod metadata;
pub mod page;
pub mod seo;
