pub mod service;

pub use service::{is_unfulfilled, summarize_unfulfilled, unfulfilled};
