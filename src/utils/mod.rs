pub mod hours;
pub mod name_cache;
pub mod name_filter;
pub mod summary;
