//! Operator input.
//!
//! The workflow reads everything through the `Prompt` trait so tests can
//! script the operator's answers. The terminal implementation echoes plain
//! input and masks passwords via rpassword.

use std::io::{self, Write};

use anyhow::Result;

pub trait Prompt {
    /// Read a line of plain input, trimmed of surrounding whitespace
    fn read_line(&mut self, prompt: &str) -> Result<String>;

    /// Read input with terminal echo disabled
    fn read_password(&mut self, prompt: &str) -> Result<String>;
}

pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn read_line(&mut self, prompt: &str) -> Result<String> {
        print!("{}", prompt);
        io::stdout().flush()?;

        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
        Ok(line.trim().to_string())
    }

    fn read_password(&mut self, prompt: &str) -> Result<String> {
        Ok(rpassword::prompt_password(prompt)?)
    }
}
