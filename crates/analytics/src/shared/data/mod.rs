pub mod csv_source;
pub mod fetch_cache;
