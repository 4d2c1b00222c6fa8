pub mod d400_period_metrics;
pub mod d401_kpi_summary;
pub mod d402_unfulfilled_orders;
