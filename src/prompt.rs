use crate::error::Result;
use colored::Colorize;
use std::io::{self, BufRead, Write};

/// Asks the operator to pick one of several choices.
pub trait Prompter {
    /// Index of the chosen entry, or `None` when the operator cancels.
    fn select(&mut self, prompt: &str, choices: &[String]) -> Result<Option<usize>>;
}

/// Numbered-menu prompter over any line reader and writer.
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl LinePrompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn select(&mut self, prompt: &str, choices: &[String]) -> Result<Option<usize>> {
        if choices.is_empty() {
            return Ok(None);
        }

        writeln!(self.output, "\n{}", prompt.cyan().bold())?;
        for (index, choice) in choices.iter().enumerate() {
            writeln!(self.output, "  {}) {}", (index + 1).to_string().yellow(), choice)?;
        }

        loop {
            write!(
                self.output,
                "{}",
                format!("Choose [1-{}] or q to cancel: ", choices.len()).bold()
            )?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                // EOF: nobody is there to answer
                writeln!(self.output)?;
                return Ok(None);
            }

            let answer = line.trim().to_lowercase();
            match answer.as_str() {
                "" | "q" | "quit" => return Ok(None),
                _ => match answer.parse::<usize>() {
                    Ok(n) if (1..=choices.len()).contains(&n) => return Ok(Some(n - 1)),
                    _ => {
                        writeln!(
                            self.output,
                            "{}",
                            format!("Please enter a number between 1 and {}.", choices.len())
                                .red()
                        )?;
                    }
                },
            }
        }
    }
}
