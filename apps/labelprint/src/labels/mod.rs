// Label API: job ingestion formats and the HTTP handlers that run the layout engine.

pub mod handlers;
pub mod jobs;

pub use jobs::load_text_job;
