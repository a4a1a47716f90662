//! Remote model providers.

mod openai;

pub use openai::OpenAiResponsesClient;
