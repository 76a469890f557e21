use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::LalError;
use crate::prompt::CANNOT_TRANSLATE;
use crate::translate::RawResponse;

/// Program name, path, `VAR=value` assignment, or a grouping opener.
static COMMAND_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:[A-Za-z_][A-Za-z0-9_]*=\S*|[A-Za-z0-9_./~+-][A-Za-z0-9_./~+@:%=-]*|[({!\[]\S*)$",
    )
    .expect("command head pattern is valid")
});

const PROSE_OPENERS: &[&str] = &[
    "I",
    "Sorry",
    "Here",
    "Here's",
    "The",
    "This",
    "That",
    "To",
    "You",
    "Unfortunately",
    "As",
    "Please",
    "Note",
    "It",
    "There",
    "Certainly",
    "Sure",
    "Yes",
    "No",
    "Use",
    "Run",
    "Try",
    "what",
    "why",
    "how",
    "could",
    "would",
    "should",
    "can",
    "do",
    "does",
    "did",
];

/// Heads that run without a lookup on `PATH`.
#[cfg(not(windows))]
const SHELL_BUILTINS: &[&str] = &[
    ".", ":", "alias", "bg", "break", "case", "cd", "command", "continue", "echo", "eval",
    "exec", "exit", "export", "false", "fg", "for", "getopts", "hash", "if", "jobs", "kill",
    "printf", "pwd", "read", "readonly", "return", "set", "shift", "source", "test", "time",
    "times", "trap", "true", "type", "ulimit", "umask", "unalias", "unset", "until", "wait",
    "while",
];

#[cfg(windows)]
const SHELL_BUILTINS: &[&str] = &[
    "assoc", "break", "call", "cd", "chdir", "cls", "copy", "date", "del", "dir", "echo",
    "erase", "exit", "for", "if", "md", "mkdir", "mklink", "move", "path", "popd", "pushd",
    "rd", "ren", "rename", "rmdir", "set", "start", "time", "title", "type", "ver", "vol",
];

/// A single-line shell command isolated from a model reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedCommand(String);

impl ExtractedCommand {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExtractedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn extract(raw: &RawResponse) -> Result<ExtractedCommand, LalError> {
    let reply = raw.provider.parse_reply(&raw.body)?;
    let command = extract_command(&reply)?;
    debug!(
        provider = raw.provider.as_str(),
        command_len = command.as_str().len(),
        "extracted command from model reply"
    );
    Ok(command)
}

/// Reduces a free-text reply to one runnable line, or refuses.
///
/// Only formatting that wraps the whole reply is removed: a fenced block,
/// inline backticks, matching quotes and a `$ ` prompt marker. Anything that
/// still spans several lines, carries control characters, reads like prose or
/// starts with an unknown program is rejected rather than guessed at.
pub fn extract_command(reply: &str) -> Result<ExtractedCommand, LalError> {
    if reply.contains(CANNOT_TRANSLATE) {
        return Err(LalError::unparsable(
            "model could not translate the request",
            reply,
        ));
    }

    let text = strip_code_fence(reply.trim()).trim();
    if text.is_empty() {
        return Err(LalError::unparsable("reply is empty", reply));
    }

    // A bare carriage return rewrites the displayed line just like a newline.
    let line_count = text.split(['\n', '\r']).count();
    if line_count > 1 {
        return Err(LalError::unparsable(
            format!("reply spans {line_count} lines"),
            reply,
        ));
    }

    let line = strip_inline_wrapping(text);
    if line.is_empty() {
        return Err(LalError::unparsable("reply is empty", reply));
    }
    if let Some(ch) = line.chars().find(|ch| ch.is_control()) {
        return Err(LalError::unparsable(
            format!("reply contains control character {ch:?}"),
            reply,
        ));
    }
    if !looks_like_command(line) {
        return Err(LalError::unparsable(
            "reply does not look like a shell command",
            reply,
        ));
    }
    if shlex::split(line).is_none() {
        return Err(LalError::unparsable("unbalanced quoting", reply));
    }

    Ok(ExtractedCommand(line.to_string()))
}

fn strip_code_fence(text: &str) -> &str {
    let Some(inner) = text
        .strip_prefix("```")
        .and_then(|rest| rest.strip_suffix("```"))
    else {
        return text;
    };

    // The opening fence line may carry a language tag.
    match inner.split_once('\n') {
        Some((_tag, body)) => body,
        // A lone word on the fence line is a language tag with no body.
        None if !inner.trim().contains(char::is_whitespace) => "",
        None => inner,
    }
}

fn strip_inline_wrapping(text: &str) -> &str {
    let mut line = text.trim();
    loop {
        let before = line;

        if let Some(rest) = line.strip_prefix("$ ") {
            line = rest.trim_start();
        }
        for quote in ['`', '\'', '"'] {
            if line.len() >= 2 && line.starts_with(quote) && line.ends_with(quote) {
                let inner = &line[1..line.len() - 1];
                if !inner.contains(quote) {
                    line = inner.trim();
                }
            }
        }

        if line == before {
            return line;
        }
    }
}

fn looks_like_command(line: &str) -> bool {
    let Some(head) = line.split_whitespace().next() else {
        return false;
    };
    if !COMMAND_HEAD.is_match(head) {
        return false;
    }

    let bare_head = head.trim_end_matches([',', '.', '!', '?', ':', ';']);
    if PROSE_OPENERS.contains(&bare_head) {
        return false;
    }

    let starts_capitalised = line.chars().next().is_some_and(|ch| ch.is_ascii_uppercase());
    let ends_like_sentence = line.ends_with(['.', '!', '?']);
    if starts_capitalised && ends_like_sentence {
        return false;
    }

    names_runnable_program(head)
}

/// Paths, assignments and grouping are taken as written; a bare word must be
/// a shell builtin or resolve on `PATH`.
fn names_runnable_program(head: &str) -> bool {
    let is_bare_word = !head.contains(['/', '=', '~']) && !head.starts_with(['(', '{', '!', '[']);
    if !is_bare_word {
        return true;
    }

    let is_builtin = SHELL_BUILTINS.iter().any(|builtin| {
        if cfg!(windows) {
            builtin.eq_ignore_ascii_case(head)
        } else {
            *builtin == head
        }
    });
    is_builtin || which::which(head).is_ok()
}

/// Advisory description of what makes a command destructive, if anything.
///
/// Plain substring checks; a hit only adds a warning above the prompt.
pub fn detect_destructive_command(command: &str) -> Option<&'static str> {
    let patterns: &[(&str, &str)] = &[
        ("rm ", "deletes files"),
        ("rmdir ", "removes directories"),
        ("dd ", "raw disk write"),
        ("mkfs", "formats filesystem"),
        ("truncate ", "truncates file"),
        ("shred ", "overwrites file data"),
        ("pkill ", "kills processes by name"),
        ("chmod 777", "makes files world-writable"),
        ("chmod -R", "changes permissions recursively"),
        ("kill -9", "force-kills process"),
        ("-delete", "deletes files (find -delete)"),
    ];

    for (pattern, description) in patterns {
        if command.contains(pattern) {
            return Some(*description);
        }
    }

    if let Some(pos) = command.find("> ")
        && (pos == 0 || command.as_bytes()[pos - 1] != b'>')
    {
        return Some("overwrites file");
    }

    None
}
