pub mod p900_canonical_orders;
pub mod p901_enriched_orders;
