pub mod field_map;
pub mod normalizer;
mod parse;

pub use normalizer::{normalize, normalize_record};
