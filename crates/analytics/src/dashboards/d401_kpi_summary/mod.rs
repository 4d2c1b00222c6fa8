pub mod service;

pub use service::{compute, summarize, ChannelData, MetricsFacade};
