use async_trait::async_trait;

use crate::classifier::types::{ClassifierError, ClassifierRequest, ClassifierResponse};

/// A language-model service that picks capabilities for an utterance.
///
/// Implementations own their transport, including timeouts; any error they
/// return is treated by the resolver as an ordinary classification failure.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(
        &self,
        request: ClassifierRequest,
    ) -> Result<ClassifierResponse, ClassifierError>;
}
