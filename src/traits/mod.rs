//! Trait definitions for mockable dependencies.
//!
//! [`GenerativeClientTrait`] abstracts the external text-generation
//! capability so the pipeline can be driven by the Anthropic client in
//! production and by mocks or scripted stubs in tests.
//!
//! # Mocking
//!
//! The trait is annotated with `#[cfg_attr(test, mockall::automock)]`
//! which generates `MockGenerativeClientTrait` for unit tests.

mod types;

pub use types::{GenerateRequest, OutputSchema, RawOutput, ANALYSIS_TEMPERATURE};

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AnalysisError;

/// Generative client trait for mocking.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerativeClientTrait: Send + Sync {
    /// Run one generation request.
    ///
    /// Implementations return [`RawOutput::Structured`] when the request
    /// carried an output schema and the model honoured it, and
    /// [`RawOutput::Text`] otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::ApiUnavailable`] if the call fails.
    async fn generate(&self, request: GenerateRequest) -> Result<RawOutput, AnalysisError>;
}

#[async_trait]
impl<T> GenerativeClientTrait for Arc<T>
where
    T: GenerativeClientTrait + ?Sized,
{
    async fn generate(&self, request: GenerateRequest) -> Result<RawOutput, AnalysisError> {
        (**self).generate(request).await
    }
}
