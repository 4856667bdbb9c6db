// Library root for the debate domain: configuration, the model provider seam,
// and the skeptic/advocate debate pipeline.

pub mod config;
pub mod debate;
pub mod provider;

pub use debate::{DebateReport, DebateResult, GenerationError, Role, Turn};
pub use provider::{GenerationParams, LoadError, ModelProvider, ProviderError};
