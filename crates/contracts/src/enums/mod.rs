pub mod channel;
pub mod order_status;
