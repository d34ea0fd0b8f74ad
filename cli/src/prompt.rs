use anyhow::Result;
use colored::*;
use inquire::{InquireError, Password, PasswordDisplayMode, Text};
use std::io::{self, BufRead, Write};

/// What the user did at a prompt.
#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Value(String),
    /// Esc: abandon the current action, stay in the menu.
    Cancelled,
    /// Ctrl+C or end of input: leave the client.
    Exit,
}

/// Reads a line of text, trimmed.
pub fn text(message: &str) -> Result<Input> {
    match Text::new(message).prompt() {
        Ok(value) => Ok(Input::Value(value.trim().to_string())),
        Err(InquireError::NotTTY) => {
            Ok(read_plain(&mut io::stdin().lock(), message)?.map_trimmed())
        }
        Err(e) => from_inquire(e),
    }
}

/// Reads a password, echoing `*` for each character when there is a terminal.
/// Without one we can't hide input, so it falls back to a plain line read.
pub fn password(message: &str) -> Result<Input> {
    let prompt = Password::new(message)
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt();

    match prompt {
        Ok(value) => Ok(Input::Value(value)),
        Err(InquireError::NotTTY) => {
            log::debug!("no TTY available, password will not be masked");
            read_plain(&mut io::stdin().lock(), message)
        }
        Err(e) => from_inquire(e),
    }
}

fn from_inquire(e: InquireError) -> Result<Input> {
    match e {
        InquireError::OperationCanceled => Ok(Input::Cancelled),
        InquireError::OperationInterrupted => Ok(Input::Exit),
        other => Err(other.into()),
    }
}

/// Plain `message` + line read. EOF means the user is done.
fn read_plain<R: BufRead>(reader: &mut R, message: &str) -> Result<Input> {
    print!("{} ", message.bright_cyan());
    io::stdout().flush()?;

    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        println!();
        return Ok(Input::Exit);
    }

    Ok(Input::Value(line.trim_end_matches(['\r', '\n']).to_string()))
}

impl Input {
    fn map_trimmed(self) -> Self {
        match self {
            Input::Value(v) => Input::Value(v.trim().to_string()),
            other => other,
        }
    }
}
