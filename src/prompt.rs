use std::env::consts::OS;

/// Exact reply the model is told to give when no command fits the request.
pub const CANNOT_TRANSLATE: &str = "CANNOT_TRANSLATE";

/// Instruction and task text sent to a provider for one translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub task: String,
}

pub fn build_prompt(query: &str, shell: &str) -> Prompt {
    let system = format!(
        "You translate natural language requests into shell commands.\n\n\
         Environment:\n\
         - OS: {OS}\n\
         - Shell: {shell}\n\n\
         Rules:\n\
         - Reply with exactly ONE shell command on a single line and nothing else\n\
         - No explanations, no comments, no markdown, no code fences, no quotes around the command\n\
         - If the task needs several steps, chain them on that one line with && or |\n\
         - Prefer common POSIX utilities and relative paths from the working directory\n\
         - If the request cannot be expressed as a shell command, reply with exactly {CANNOT_TRANSLATE} and nothing else"
    );

    Prompt {
        system,
        task: query.trim().to_string(),
    }
}
