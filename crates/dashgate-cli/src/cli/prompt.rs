//! Line-based stdin prompts.

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{Context, Result, bail};

/// Prints `label` and reads one trimmed line.
///
/// # Errors
/// Returns an error on I/O failure or when stdin is closed.
pub fn line(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush()?;

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input)? == 0 {
        bail!("No input (stdin closed)");
    }
    Ok(input.trim().to_string())
}

/// Prints `label` and reads a secret without echo.
///
/// The input is returned as typed; only the line terminator is removed.
/// When stdin is not a terminal the line is read from the pipe instead.
///
/// # Errors
/// Returns an error on I/O failure or when stdin is closed.
pub fn password(label: &str) -> Result<String> {
    if io::stdin().is_terminal() {
        return rpassword::prompt_password(label).context("Failed to read password");
    }

    print!("{label}");
    io::stdout().flush()?;
    read_secret(&mut io::stdin().lock())
}

fn read_secret(reader: &mut impl BufRead) -> Result<String> {
    rpassword::read_password_from_bufread(reader).context("No input (stdin closed)")
}

/// Reads a 1-based menu selection; empty input returns `None`.
///
/// # Errors
/// Returns an error if the input is not a number in `1..=len`.
pub fn choice(label: &str, len: usize) -> Result<Option<usize>> {
    let input = line(label)?;
    parse_choice(&input, len)
}

fn parse_choice(input: &str, len: usize) -> Result<Option<usize>> {
    if input.is_empty() {
        return Ok(None);
    }
    match input.parse::<usize>() {
        Ok(n) if (1..=len).contains(&n) => Ok(Some(n - 1)),
        _ => bail!("Invalid selection '{input}' (expected 1-{len})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_keeps_surrounding_spaces() {
        let mut input = io::Cursor::new(" admin \r\nrest\n");
        assert_eq!(read_secret(&mut input).unwrap(), " admin ");
    }

    #[test]
    fn test_secret_on_closed_stdin() {
        let mut input = io::Cursor::new("");
        assert!(read_secret(&mut input).is_err());
    }

    #[test]
    fn test_parse_choice() {
        assert_eq!(parse_choice("", 3).unwrap(), None);
        assert_eq!(parse_choice("1", 3).unwrap(), Some(0));
        assert_eq!(parse_choice("3", 3).unwrap(), Some(2));
        assert!(parse_choice("0", 3).is_err());
        assert!(parse_choice("4", 3).is_err());
        assert!(parse_choice("two", 3).is_err());
    }
}
