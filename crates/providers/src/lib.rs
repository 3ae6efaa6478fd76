pub mod google;
#[cfg(feature = "ollama")]
pub mod ollama;
pub mod openai_compat;
pub mod registry;
pub mod traits;
pub(crate) mod util;

// Re-exports for convenience.
pub use registry::{effective_model_name, resolve, ProviderEntry};
pub use traits::{ChatModel, ChatRequest, ChatResponse};
