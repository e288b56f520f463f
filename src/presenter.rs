use std::io::{self, BufRead, Write};

use crate::error::{QuizError, Result};

/// Text-only boundary between the quiz and whoever is answering it.
///
/// Implementations own input validation: `choose_from_list` only returns an
/// index into `options`, and `read_count` only returns a non-negative number.
/// Bad input is re-prompted, never returned as an error.
pub trait Presenter {
    fn choose_from_list(&mut self, prompt: &str, options: &[String]) -> Result<usize>;

    fn read_count(&mut self, prompt: &str) -> Result<usize>;

    fn render(&mut self, text: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceError {
    NotNumeric,
    OutOfRange,
}

impl ChoiceError {
    pub fn message(&self) -> &'static str {
        match self {
            ChoiceError::NotNumeric => "Please enter a numeric value.",
            ChoiceError::OutOfRange => "Please select an option in the list, by number.",
        }
    }
}

/// Number the options from 1, one per line.
pub fn format_list(options: &[String]) -> String {
    options
        .iter()
        .enumerate()
        .map(|(i, option)| format!("{}. {}\n", i + 1, option))
        .collect()
}

/// Parse a 1-based menu selection into a 0-based index.
pub fn parse_choice(input: &str, len: usize) -> std::result::Result<usize, ChoiceError> {
    let number: usize = input.trim().parse().map_err(|_| ChoiceError::NotNumeric)?;
    if number == 0 || number > len {
        return Err(ChoiceError::OutOfRange);
    }
    Ok(number - 1)
}

pub fn parse_count(input: &str) -> std::result::Result<usize, ChoiceError> {
    input.trim().parse().map_err(|_| ChoiceError::NotNumeric)
}

pub struct ConsolePresenter<R, W> {
    input: R,
    output: W,
}

impl ConsolePresenter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsolePresenter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn prompt_line(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(QuizError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed while waiting for an answer",
            )));
        }
        Ok(line)
    }
}

impl<R: BufRead, W: Write> Presenter for ConsolePresenter<R, W> {
    fn choose_from_list(&mut self, prompt: &str, options: &[String]) -> Result<usize> {
        let listing = format_list(options);
        loop {
            writeln!(self.output, "{}", listing)?;
            let line = self.prompt_line(prompt)?;
            match parse_choice(&line, options.len()) {
                Ok(index) => return Ok(index),
                Err(err) => writeln!(self.output, "\n{}\n", err.message())?,
            }
        }
    }

    fn read_count(&mut self, prompt: &str) -> Result<usize> {
        loop {
            let line = self.prompt_line(prompt)?;
            match parse_count(&line) {
                Ok(count) => return Ok(count),
                Err(err) => writeln!(self.output, "\n{}\n", err.message())?,
            }
        }
    }

    fn render(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{}", text)?;
        self.output.flush()?;
        Ok(())
    }
}
