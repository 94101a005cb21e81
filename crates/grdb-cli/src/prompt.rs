//! Interactive proposal review for `migration create`.
//!
//! Each proposal is shown as a question and answered with a single key:
//!
//! ```text
//! y - confirm the proposal
//! n - reject it and see the next alternative
//! l - list the DDL the proposal would write
//! c - list everything confirmed so far
//! b - go back to the previous proposal
//! s - stop here and write what was confirmed
//! q - quit without writing anything
//! ? - show this help
//! ```

use grdb_core::migration::{DdlStatement, Proposal, SafetyClass};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};
use std::io;

/// Outcome of reviewing a plan's proposals.
#[derive(Debug, Clone, PartialEq)]
pub enum Review {
    /// Every proposal was answered; these statements were confirmed.
    Accepted(Vec<DdlStatement>),
    /// The user stopped early; only these statements were confirmed.
    Stopped(Vec<DdlStatement>),
    /// The user quit; nothing should be written.
    Aborted,
}

/// Source of user answers. `None` means end of input (Ctrl-C or Ctrl-D).
pub trait PromptInput {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

/// Terminal input through rustyline.
pub struct ReadlinePrompt {
    editor: Editor<(), DefaultHistory>,
}

impl ReadlinePrompt {
    pub fn new() -> io::Result<Self> {
        let config = Config::builder().auto_add_history(false).build();
        let editor = Editor::with_config(config).map_err(io::Error::other)?;
        Ok(Self { editor })
    }
}

impl PromptInput for ReadlinePrompt {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(io::Error::other(e)),
        }
    }
}

const HELP: &str = "\
y - confirm the proposal
n - reject it and see the next alternative
l - list the DDL the proposal would write
c - list everything confirmed so far
b - go back to the previous proposal
s - stop here and write what was confirmed
q - quit without writing anything
? - show this help";

/// Walk the user through `proposals`, collecting confirmed statements.
pub fn review_proposals(
    proposals: &[Proposal],
    input: &mut impl PromptInput,
) -> io::Result<Review> {
    // Per-proposal cursor: 0 is the primary proposal, k > 0 is
    // alternatives[k - 1]. Survives going back and forward again.
    let mut cursor = vec![0usize; proposals.len()];
    let mut confirmed: Vec<Vec<DdlStatement>> = Vec::new();
    let mut index = 0;

    while index < proposals.len() {
        let primary = &proposals[index];
        let proposal = if cursor[index] == 0 {
            primary
        } else {
            &primary.alternatives[cursor[index] - 1]
        };

        println!(
            "[{}/{}] {} [y,n,l,c,b,s,q,?]",
            index + 1,
            proposals.len(),
            proposal.prompt
        );
        if proposal.safety == SafetyClass::Destructive {
            println!("    warning: this change discards existing data");
        }
        if proposal.confidence < 1.0 {
            println!("    (inferred, confidence {:.2})", proposal.confidence);
        }

        let Some(line) = input.read_line("> ")? else {
            return Ok(Review::Aborted);
        };
        match line.trim() {
            "y" | "yes" => {
                let mut values = Vec::with_capacity(proposal.required_input.len());
                for slot in &proposal.required_input {
                    println!("{}", slot.prompt);
                    let value = loop {
                        let Some(expr) = input.read_line(&format!("{}> ", slot.placeholder))?
                        else {
                            return Ok(Review::Aborted);
                        };
                        if !expr.trim().is_empty() {
                            break expr.trim().to_string();
                        }
                        println!("An expression is required.");
                    };
                    values.push(value);
                }
                confirmed.push(proposal.resolve_inputs(&values));
                index += 1;
            }
            "n" | "no" => {
                let total = 1 + primary.alternatives.len();
                if total == 1 {
                    println!(
                        "No alternatives; answer 's' to leave this out or adjust the schema."
                    );
                } else {
                    cursor[index] = (cursor[index] + 1) % total;
                }
            }
            "l" | "list" => println!("{}", proposal.render_statements()),
            "c" | "confirmed" => {
                if confirmed.is_empty() {
                    println!("Nothing confirmed yet.");
                }
                for stmt in confirmed.iter().flatten() {
                    println!("{}", stmt.render());
                }
            }
            "b" | "back" => {
                if index == 0 {
                    println!("Already at the first proposal.");
                } else {
                    index -= 1;
                    confirmed.pop();
                }
            }
            "s" | "stop" => return Ok(Review::Stopped(confirmed.concat())),
            "q" | "quit" => return Ok(Review::Aborted),
            "?" | "h" | "help" => println!("{HELP}"),
            other => println!("Unknown command {other:?}; type ? for help."),
        }
    }

    Ok(Review::Accepted(confirmed.concat()))
}
