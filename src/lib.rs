pub mod chunker;
pub mod config;
pub mod error;
pub mod ollama;
pub mod pipeline;
pub mod profiling;
pub mod prompt;
pub mod reduce;
pub mod sanitize;
pub mod summarize;

// Re-exports
pub use crate::chunker::{chunk, Chunk, Chunker};
pub use crate::config::{ConfigPaths, Settings};
pub use crate::ollama::{Backend, BackendError, OllamaClient};
pub use crate::pipeline::commit_message;
pub use crate::profiling::Profile;
pub use crate::prompt::PromptTemplate;
pub use crate::reduce::{ReduceError, Reducer};
pub use crate::sanitize::sanitize;
