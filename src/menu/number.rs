use std::io::{self, BufRead, Write};

use super::{next_stdin_event, next_stream_event, take_interrupt, PromptError, ReadEvent};

/// How a numeric prompt resolved.
#[derive(Debug, PartialEq)]
pub enum NumberOutcome<T> {
    /// Parsed value, returned unchanged (no rounding).
    Value(f64),
    /// The user typed `exit` or interrupted the prompt; carries the
    /// exit action's result.
    Exit(T),
}

/// A single-line numeric prompt with optional inclusive bounds and an
/// optional default for empty input.
///
/// Unlike [`OptionMenu`](super::OptionMenu), the exit action's return
/// value is handed back to the caller inside [`NumberOutcome::Exit`].
pub struct NumberInput<'a, T> {
    message: String,
    default: Option<f64>,
    min: Option<f64>,
    max: Option<f64>,
    exit_action: Box<dyn FnOnce() -> T + 'a>,
}

impl<'a, T> NumberInput<'a, T> {
    pub fn new(message: impl Into<String>, exit_action: impl FnOnce() -> T + 'a) -> Self {
        Self {
            message: message.into(),
            default: None,
            min: None,
            max: None,
            exit_action: Box::new(exit_action),
        }
    }

    /// Value returned for empty input. Must satisfy any bounds already
    /// configured.
    pub fn default(mut self, value: f64) -> Result<Self, PromptError> {
        self.default = Some(value);
        self.validate()?;
        Ok(self)
    }

    /// Inclusive lower bound.
    pub fn min(mut self, value: f64) -> Result<Self, PromptError> {
        self.min = Some(value);
        self.validate()?;
        Ok(self)
    }

    /// Inclusive upper bound.
    pub fn max(mut self, value: f64) -> Result<Self, PromptError> {
        self.max = Some(value);
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), PromptError> {
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(PromptError::InvertedBounds { min, max });
            }
        }
        if let Some(value) = self.default {
            if let Some(min) = self.min {
                if value < min {
                    return Err(PromptError::DefaultBelowMinimum { value, min });
                }
            }
            if let Some(max) = self.max {
                if value > max {
                    return Err(PromptError::DefaultAboveMaximum { value, max });
                }
            }
        }
        Ok(())
    }

    fn render_prompt(&self) -> String {
        let mut prompt = self.message.clone();
        match (self.min, self.max) {
            (Some(min), Some(max)) => prompt.push_str(&format!(" (between {} and {})", min, max)),
            (Some(min), None) => prompt.push_str(&format!(" (min {})", min)),
            (None, Some(max)) => prompt.push_str(&format!(" (max {})", max)),
            (None, None) => {}
        }
        if let Some(default) = self.default {
            prompt.push_str(&format!(" [default: {}]", default));
        }
        prompt.push_str(": ");
        prompt
    }

    /// Prompt on stdout and resolve one number from the console.
    /// Ctrl+C resolves to the exit action without waiting for Enter.
    pub fn prompt(self) -> NumberOutcome<T> {
        self.resolve(io::stdout(), next_stdin_event)
    }

    /// Same as [`prompt`](Self::prompt) over explicit streams, with
    /// the process-wide interrupt flag as the interrupt probe.
    pub fn prompt_from<R: BufRead, W: Write>(self, input: R, output: W) -> NumberOutcome<T> {
        self.prompt_with(input, output, take_interrupt)
    }

    /// Resolve over explicit streams and an explicit interrupt probe.
    pub fn prompt_with<R: BufRead, W: Write>(
        self,
        mut input: R,
        output: W,
        mut interrupted: impl FnMut() -> bool,
    ) -> NumberOutcome<T> {
        self.resolve(output, move || {
            next_stream_event(&mut input, &mut interrupted)
        })
    }

    fn resolve<W: Write>(
        self,
        mut output: W,
        mut next_event: impl FnMut() -> ReadEvent,
    ) -> NumberOutcome<T> {
        let hint = self.render_prompt();
        loop {
            write!(output, "{}", hint).ok();
            output.flush().ok();

            let line = match next_event() {
                ReadEvent::Line(line) => line,
                ReadEvent::Aborted => return NumberOutcome::Exit((self.exit_action)()),
            };

            let trimmed = line.trim();
            if trimmed.eq_ignore_ascii_case("exit") {
                return NumberOutcome::Exit((self.exit_action)());
            }
            if trimmed.is_empty() {
                if let Some(default) = self.default {
                    return NumberOutcome::Value(default);
                }
            }

            match trimmed.parse::<f64>() {
                Err(_) => {
                    writeln!(output, "'{}' is not a valid number.", trimmed).ok();
                }
                Ok(value) => {
                    if let Some(min) = self.min {
                        if value < min {
                            writeln!(output, "Value must be at least {}.", min).ok();
                            continue;
                        }
                    }
                    if let Some(max) = self.max {
                        if value > max {
                            writeln!(output, "Value must be at most {}.", max).ok();
                            continue;
                        }
                    }
                    return NumberOutcome::Value(value);
                }
            }
        }
    }
}
