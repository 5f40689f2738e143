pub mod agent_loop;
pub mod system_prompt;

pub use agent_loop::{AgentRun, AgentState, ResearchAgent, TraceStep, DEFAULT_MAX_ITERATIONS};
pub use system_prompt::{default_system_prompt, EXAMPLE_QUESTIONS, SYSTEM_PROMPT};
