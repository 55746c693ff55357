pub mod page_config;
pub mod page_service;
pub mod page_store;
pub mod seo_mapper;
