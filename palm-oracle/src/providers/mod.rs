pub mod gemini;
pub mod offline;
pub mod openai_compatible;

pub use gemini::GeminiInsightProvider;
pub use offline::OfflineInsightProvider;
pub use openai_compatible::OpenAiCompatibleInsightProvider;
