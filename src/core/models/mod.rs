pub mod cost;
pub mod message;
pub mod metric;
