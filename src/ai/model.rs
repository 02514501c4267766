// file: src/ai/model.rs
// description: text generation seam shared by the gemini client and test doubles
// reference: https://docs.rs/async-trait

use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ContentModel: Send + Sync {
    /// Short model label for logs.
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String>;
}
