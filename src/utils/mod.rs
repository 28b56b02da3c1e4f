pub mod date_range;
pub mod pagination;
pub mod response;
pub mod username_cache;
pub mod username_filter;
pub mod username_index;
