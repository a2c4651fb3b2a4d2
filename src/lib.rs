pub mod category;
pub mod jitter;
pub mod loader;
pub mod output;
pub mod pipeline;
pub mod summary;
pub mod table;
