//! Formatting utilities for the ReAct system prompt.

use crate::llm::tools::ToolDescriptor;

/// Opening line of the default system prompt.
pub const DEFAULT_ROLE: &str = "You are an intelligent travel assistant. Your task is to analyze \
the user's request and solve it step by step using the available tools.";

/// Format the available tools as a bulleted list of call signatures.
///
/// # Arguments
///
/// * `tools` - Descriptors of the registered tools, in the order they should be listed.
pub fn format_available_tools(tools: &[ToolDescriptor]) -> String {
    if tools.is_empty() {
        return "No tools are available.\n".to_string();
    }

    let mut output = String::new();
    for tool in tools {
        output.push_str(&format!("- `{}`: {}\n", tool.signature(), tool.description));
    }
    output
}

/// Build the system instruction that teaches the model the action protocol.
pub fn format_system_prompt(role: &str, tools: &[ToolDescriptor]) -> String {
    format!(
        "{role}

# Available tools:
{tools}
# Action format:
Your reply must strictly follow the format below. First give your reasoning, then the concrete \
action to execute. Output exactly one Thought-Action pair per reply:
Thought: [your reasoning and plan for the next step]
Action: [the tool to call, written as function_name(arg_name=\"arg_value\")]

# Finishing:
Once you have gathered enough information to answer the user's question, you must write \
`finish(answer=\"...\")` after `Action:` to give the final answer.

Let's begin!",
        role = role,
        tools = format_available_tools(tools)
    )
}
