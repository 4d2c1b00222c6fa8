pub mod calculator;
pub mod fee_model;

pub use calculator::{enrich, enrich_row};
pub use fee_model::FeeModel;
