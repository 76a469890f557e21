use std::io::{self, BufRead, BufReader, Write};

use tracing::{debug, warn};

use crate::extract::{ExtractedCommand, detect_destructive_command};

/// Where the yes/no answer is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerSource {
    Stdin,
    /// The controlling terminal; used when stdin already carried the request.
    Terminal,
}

/// Shows the command and blocks until the user answers. Only an explicit
/// `y`/`yes` counts as consent.
pub fn confirm(command: &ExtractedCommand, source: AnswerSource) -> bool {
    let mut output = io::stderr();
    match source {
        AnswerSource::Stdin => confirm_with(command, &mut io::stdin().lock(), &mut output),
        AnswerSource::Terminal => match open_terminal() {
            Ok(terminal) => confirm_with(command, &mut BufReader::new(terminal), &mut output),
            Err(err) => {
                warn!(error = %err, "could not open terminal for confirmation; reading stdin");
                confirm_with(command, &mut io::stdin().lock(), &mut output)
            }
        },
    }
}

#[cfg(unix)]
fn open_terminal() -> io::Result<std::fs::File> {
    std::fs::File::open("/dev/tty")
}

#[cfg(windows)]
fn open_terminal() -> io::Result<std::fs::File> {
    std::fs::File::open("CONIN$")
}

pub fn confirm_with<R: BufRead, W: Write>(
    command: &ExtractedCommand,
    input: &mut R,
    output: &mut W,
) -> bool {
    if let Err(err) = render_prompt(command, output) {
        warn!(error = %err, "failed to display confirmation prompt");
        return false;
    }

    let mut answer = String::new();
    match input.read_line(&mut answer) {
        Ok(0) => {
            // EOF leaves the cursor on the prompt line.
            let _ = writeln!(output);
            debug!("confirmation input closed; declining");
            false
        }
        Ok(_) => is_affirmative(&answer),
        Err(err) => {
            warn!(error = %err, "failed to read confirmation answer; declining");
            false
        }
    }
}

fn render_prompt<W: Write>(command: &ExtractedCommand, output: &mut W) -> io::Result<()> {
    writeln!(output, "Command: {command}")?;
    if let Some(warning) = detect_destructive_command(command.as_str()) {
        writeln!(output, "Warning: this command {warning}")?;
    }
    write!(output, "Execute? [y/N] ")?;
    output.flush()
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
