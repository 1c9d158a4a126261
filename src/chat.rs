pub mod session;
pub mod system_prompt;
pub mod tools;

pub use session::{local_output_path, ChatSession, MAX_TOOL_ROUNDS};
pub use system_prompt::{build_system_prompt, greeting};
pub use tools::{ToolHandler, ToolRegistry, TOOL_FAILURE, TOOL_SUCCESS};

const CHAT_EXIT_COMMANDS: &[&str] = &["/exit", "exit", "quit"];

pub fn is_chat_exit_command(message: &str) -> bool {
    CHAT_EXIT_COMMANDS
        .iter()
        .any(|command| message.eq_ignore_ascii_case(command))
}
