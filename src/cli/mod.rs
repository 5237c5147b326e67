//! CLI command implementations

pub mod hosts;
pub mod pubkey;
pub mod session;

use std::io::{self, BufRead, Write};

use colored::Colorize;

use crate::error::{Result, SshdError};

/// Print an informational line.
pub fn info(msg: &str) {
    println!("{} - {}", " INFO   ".blue().bold(), msg);
}

/// Print an error line to stderr.
pub fn error(msg: &str) {
    eprintln!("{} - {}", " ERROR  ".red().bold(), msg);
}

/// Banner shown when a command falls back to prompting.
pub fn interactive_mode() {
    println!("{}", " *** Interactive Mode ***".bright_black().bold());
    println!();
}

/// Read one trimmed line after printing `label`.
pub fn prompt(label: &str) -> Result<String> {
    let stdin = io::stdin();
    prompt_from(&mut stdin.lock(), label)
}

fn prompt_from(input: &mut impl BufRead, label: &str) -> Result<String> {
    print!("{label}");
    io::stdout()
        .flush()
        .map_err(|e| SshdError::storage("<stdout>", e))?;

    let mut line = String::new();
    input
        .read_line(&mut line)
        .map_err(|e| SshdError::storage("<stdin>", e))?;
    Ok(line.trim().to_string())
}

/// Ask a strict yes/no question. Anything but `y` or `n` is rejected.
pub fn confirm(label: &str) -> Result<bool> {
    let stdin = io::stdin();
    confirm_from(&mut stdin.lock(), label)
}

fn confirm_from(input: &mut impl BufRead, label: &str) -> Result<bool> {
    let answer = prompt_from(input, &format!("{label} (y/n): "))?.to_lowercase();
    parse_yes_no(&answer)
}

fn parse_yes_no(answer: &str) -> Result<bool> {
    match answer {
        "y" => Ok(true),
        "n" => Ok(false),
        other => Err(SshdError::InvalidResponse(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_prompt_trims_input() {
        let mut input = Cursor::new("  web.example.com  \n");
        assert_eq!(prompt_from(&mut input, "host: ").unwrap(), "web.example.com");
    }

    #[test]
    fn test_confirm_accepts_only_y_or_n() {
        assert!(confirm_from(&mut Cursor::new("Y\n"), "overwrite?").unwrap());
        assert!(!confirm_from(&mut Cursor::new("n\n"), "overwrite?").unwrap());

        let err = confirm_from(&mut Cursor::new("yes\n"), "overwrite?").unwrap_err();
        assert!(matches!(err, SshdError::InvalidResponse(r) if r == "yes"));
    }
}
