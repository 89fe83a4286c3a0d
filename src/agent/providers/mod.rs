//! Concrete [`LlmProvider`](super::provider::LlmProvider) implementations.
//!
//! Each provider sits behind a cargo feature of the same name; a build
//! without it reports the provider as unavailable at call time.

#[cfg(feature = "anthropic")]
pub mod anthropic;
#[cfg(feature = "gemini")]
pub mod gemini;
#[cfg(feature = "grok")]
pub mod grok;
#[cfg(any(feature = "anthropic", feature = "gemini", feature = "grok"))]
mod http;
#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "anthropic")]
pub use anthropic::AnthropicProvider;
#[cfg(feature = "gemini")]
pub use gemini::GeminiProvider;
#[cfg(feature = "grok")]
pub use grok::GrokProvider;
#[cfg(feature = "openai")]
pub use openai::OpenAiProvider;
