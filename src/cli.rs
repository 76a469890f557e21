use std::io::{self, IsTerminal, Read};

use anyhow::{Context, Result};
use clap::Parser;

use crate::confirm::AnswerSource;
use crate::providers::Provider;

pub const BANNER: &str = "LAL - Natural Language to Shell Commands";

const AFTER_HELP: &str = "\
Environment:
  ANTHROPIC_API_KEY    Anthropic API key (used first when both keys are set)
  OPENAI_API_KEY       OpenAI API key
  LAL_MODEL            Override the provider's default model
  LAL_TIMEOUT_SECS     Provider request timeout in seconds [default: 30]

Examples:
  lal list files in current directory
  echo \"find large log files\" | lal";

#[derive(Debug, Parser)]
#[command(name = "lal", version, about = BANNER, after_help = AFTER_HELP)]
pub struct Cli {
    /// What you want to do, in plain words (read from stdin when omitted)
    pub query: Vec<String>,

    /// Use this provider instead of picking one from the available keys
    #[arg(long, value_enum)]
    pub provider: Option<Provider>,

    /// Print the generated command without asking to run it
    #[arg(long)]
    pub dry_run: bool,
}

/// Raw request text plus where the confirmation answer must come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryInput {
    pub text: String,
    pub answer_source: AnswerSource,
}

impl Cli {
    pub fn query_input(&self) -> Result<QueryInput> {
        if !self.query.is_empty() {
            return Ok(QueryInput {
                text: self.query.join(" "),
                answer_source: AnswerSource::Stdin,
            });
        }

        let stdin = io::stdin();
        if stdin.is_terminal() {
            return Ok(QueryInput {
                text: String::new(),
                answer_source: AnswerSource::Stdin,
            });
        }

        let mut text = String::new();
        stdin
            .lock()
            .read_to_string(&mut text)
            .context("Failed to read request from stdin")?;
        Ok(QueryInput {
            text,
            answer_source: AnswerSource::Terminal,
        })
    }
}
