//! # docqa-model
//!
//! LLM provider adapters for DocQA.
//!
//! ## Overview
//!
//! This crate provides [`Llm`](docqa_core::Llm) implementations:
//!
//! - [`OpenAIClient`] — OpenAI chat models and OpenAI-compatible APIs
//!   (feature `openai`)
//! - [`MockLlm`] — deterministic mock for tests and demos
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docqa_model::openai::{OpenAIClient, OpenAIConfig};
//!
//! let model = OpenAIClient::new(OpenAIConfig::new(
//!     std::env::var("OPENAI_API_KEY").unwrap(),
//!     "gpt-4o-mini",
//! ))?;
//! ```

pub mod mock;
#[cfg(feature = "openai")]
pub mod openai;

pub use mock::MockLlm;
#[cfg(feature = "openai")]
pub use openai::OpenAIClient;
