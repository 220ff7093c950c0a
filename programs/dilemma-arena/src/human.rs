//! Console input for `HumanStrategy` players.

use dilemma_core::{AgentError, DecisionBackend, DecisionRequest};
use std::io::{self, BufRead, Write};

/// Reads moves from stdin, showing the game state on stdout
#[derive(Debug, Default)]
pub struct ConsoleBackend;

impl DecisionBackend for ConsoleBackend {
    fn complete(&self, request: &DecisionRequest<'_>) -> Result<String, AgentError> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        prompt_choice(&mut stdin.lock(), &mut stdout.lock(), request.prompt)
    }
}

/// Ask until the answer is `C` or `D`. End of input is an error.
pub fn prompt_choice<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> Result<String, AgentError> {
    let io_err = |e: io::Error| AgentError::Backend(e.to_string());

    writeln!(output, "{}", prompt).map_err(io_err)?;
    loop {
        write!(output, "Your move [C/D]: ").map_err(io_err)?;
        output.flush().map_err(io_err)?;

        let mut line = String::new();
        if input.read_line(&mut line).map_err(io_err)? == 0 {
            return Err(AgentError::Backend("console input closed".into()));
        }
        match line.trim().to_uppercase().as_str() {
            answer @ ("C" | "D") => return Ok(answer.to_string()),
            _ => writeln!(output, "Please type C or D.").map_err(io_err)?,
        }
    }
}
