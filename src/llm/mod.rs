pub mod openai;
pub mod provider;
pub mod types;

pub use openai::OpenAiProvider;
pub use provider::LlmProvider;
pub use types::{
    define_tool, Message, MessageResponse, Role, StopReason, ToolCall, ToolDefinition,
    ToolInputSchema, Usage,
};
