pub mod errors;
pub mod host;
pub mod metadata;
pub mod prompt;
pub mod publisher;
pub mod settings;
pub mod utils;

#[cfg(not(target_arch = "wasm32"))]
pub mod vault;

pub use publish_api::responses::{PublishRecord, PublishStatus, RecordId};
pub use publisher::Publisher;
