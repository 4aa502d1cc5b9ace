//! Reusable line-oriented console prompts.
//!
//! `OptionMenu` renders a numbered list of choices (with a synthesized
//! Exit entry) and resolves one line of input to the chosen action.
//! `NumberInput` asks for an optionally bounded, optionally defaulted
//! number. Both are built fresh per prompt, consumed on resolution,
//! and accept any `BufRead`/`Write` pair plus an interrupt probe so
//! they can be driven from scripted input in tests. Console prompts go
//! through a shared reader thread, letting Ctrl+C resolve a prompt
//! without waiting for Enter.

mod number;

pub use number::{NumberInput, NumberOutcome};

use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use thiserror::Error;

/// Set by the Ctrl+C handler; prompts consult it while waiting for
/// input and resolve to their exit path when it is pending.
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// How often a console prompt polls for a pending interrupt while the
/// stdin read blocks.
const INTERRUPT_POLL: Duration = Duration::from_millis(50);

/// Install the process-wide Ctrl+C handler backing prompt interruption.
pub fn install_interrupt_handler() -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(|| {
        INTERRUPTED.store(true, Ordering::SeqCst);
        println!();
    })
}

fn take_interrupt() -> bool {
    INTERRUPTED.swap(false, Ordering::SeqCst)
}

/// One console read: either a full line, or a request to bail out
/// (interrupt, read failure, end of input).
enum ReadEvent {
    Line(String),
    Aborted,
}

/// Blocking read from a generic stream. Nothing can unblock the read
/// itself, so the interrupt probe is consulted before and after it.
fn next_stream_event<R: BufRead>(
    input: &mut R,
    interrupted: &mut impl FnMut() -> bool,
) -> ReadEvent {
    if interrupted() {
        return ReadEvent::Aborted;
    }
    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) | Err(_) => ReadEvent::Aborted,
        Ok(_) => {
            if interrupted() {
                ReadEvent::Aborted
            } else {
                ReadEvent::Line(line)
            }
        }
    }
}

/// Dedicated reader thread feeding console lines through a channel, so
/// prompts can poll the interrupt flag while stdin blocks. `None`
/// marks end of input.
fn stdin_lines() -> &'static Mutex<Receiver<Option<String>>> {
    static LINES: OnceLock<Mutex<Receiver<Option<String>>>> = OnceLock::new();
    LINES.get_or_init(|| {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let stdin = io::stdin();
            loop {
                let mut line = String::new();
                match stdin.lock().read_line(&mut line) {
                    Ok(0) | Err(_) => {
                        let _ = tx.send(None);
                        break;
                    }
                    Ok(_) => {
                        if tx.send(Some(line)).is_err() {
                            break;
                        }
                    }
                }
            }
        });
        Mutex::new(rx)
    })
}

/// Next console line, resolving to `Aborted` as soon as Ctrl+C lands
/// even while the read is still blocking.
fn next_stdin_event() -> ReadEvent {
    let lines = match stdin_lines().lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    loop {
        if take_interrupt() {
            return ReadEvent::Aborted;
        }
        match lines.recv_timeout(INTERRUPT_POLL) {
            Ok(Some(line)) => {
                return if take_interrupt() {
                    ReadEvent::Aborted
                } else {
                    ReadEvent::Line(line)
                };
            }
            Ok(None) | Err(RecvTimeoutError::Disconnected) => return ReadEvent::Aborted,
            Err(RecvTimeoutError::Timeout) => {}
        }
    }
}

/// Read one line from the console through the shared reader thread.
/// `None` on end of input or interrupt. All console line input must go
/// through here; reading stdin directly would race the reader thread.
pub fn read_console_line() -> Option<String> {
    match next_stdin_event() {
        ReadEvent::Line(line) => Some(line),
        ReadEvent::Aborted => None,
    }
}

/// Configuration errors caught when a prompt is built. Never clamped
/// or deferred to resolution time.
#[derive(Debug, Error, PartialEq)]
pub enum PromptError {
    #[error("default index {index} is out of range (valid: 1 to {count})")]
    DefaultIndexOutOfRange { index: usize, count: usize },

    #[error("minimum {min} is greater than maximum {max}")]
    InvertedBounds { min: f64, max: f64 },

    #[error("default value {value} is below the minimum {min}")]
    DefaultBelowMinimum { value: f64, min: f64 },

    #[error("default value {value} is above the maximum {max}")]
    DefaultAboveMaximum { value: f64, max: f64 },
}

/// One selectable menu entry: a label and the action it resolves to.
pub struct MenuOption<'a, T> {
    label: String,
    action: Box<dyn FnOnce() -> T + 'a>,
}

impl<'a, T> MenuOption<'a, T> {
    pub fn new(label: impl Into<String>, action: impl FnOnce() -> T + 'a) -> Self {
        Self {
            label: label.into(),
            action: Box::new(action),
        }
    }
}

/// How a menu prompt resolved.
#[derive(Debug, PartialEq, Eq)]
pub enum MenuOutcome<T> {
    /// A listed choice was picked; carries its action's result.
    Selected(T),
    /// The user took the Exit entry, typed `exit`, or interrupted the
    /// prompt. The menu's exit action has already run.
    Exit,
}

/// A numbered choice prompt with a synthesized trailing Exit entry.
///
/// Choices are identified by their 1-based position; the Exit entry is
/// always `N + 1`. Typing `exit` (any case) resolves to Exit from
/// anywhere in the loop.
pub struct OptionMenu<'a, T> {
    title: String,
    options: Vec<MenuOption<'a, T>>,
    default_index: Option<usize>,
    exit_action: Box<dyn FnOnce() + 'a>,
}

impl<'a, T> OptionMenu<'a, T> {
    pub fn new(title: impl Into<String>, options: Vec<MenuOption<'a, T>>) -> Self {
        Self {
            title: title.into(),
            options,
            default_index: None,
            exit_action: Box::new(|| {}),
        }
    }

    /// Run `action` when the menu resolves to Exit, before the outcome
    /// is returned.
    pub fn on_exit(mut self, action: impl FnOnce() + 'a) -> Self {
        self.exit_action = Box::new(action);
        self
    }

    /// Pre-select the 1-based `index` for empty input. Must name a
    /// real choice, not the Exit entry.
    pub fn default_index(mut self, index: usize) -> Result<Self, PromptError> {
        if index == 0 || index > self.options.len() {
            return Err(PromptError::DefaultIndexOutOfRange {
                index,
                count: self.options.len(),
            });
        }
        self.default_index = Some(index);
        Ok(self)
    }

    /// Render the menu on stdout and resolve one choice from the
    /// console. Ctrl+C resolves to Exit without waiting for Enter.
    pub fn prompt(self) -> MenuOutcome<T> {
        self.resolve(io::stdout(), next_stdin_event)
    }

    /// Same as [`prompt`](Self::prompt) over explicit streams, with
    /// the process-wide interrupt flag as the interrupt probe.
    pub fn prompt_from<R: BufRead, W: Write>(self, input: R, output: W) -> MenuOutcome<T> {
        self.prompt_with(input, output, take_interrupt)
    }

    /// Resolve over explicit streams and an explicit interrupt probe.
    ///
    /// A read failure, end of input, or a pending interrupt resolves
    /// to Exit; nothing is propagated to the caller.
    pub fn prompt_with<R: BufRead, W: Write>(
        self,
        mut input: R,
        output: W,
        mut interrupted: impl FnMut() -> bool,
    ) -> MenuOutcome<T> {
        self.resolve(output, move || {
            next_stream_event(&mut input, &mut interrupted)
        })
    }

    fn resolve<W: Write>(
        mut self,
        mut output: W,
        mut next_event: impl FnMut() -> ReadEvent,
    ) -> MenuOutcome<T> {
        let total = self.options.len() + 1;

        writeln!(output, "{}:", self.title).ok();
        for (i, option) in self.options.iter().enumerate() {
            writeln!(output, "{}) {}", i + 1, option.label).ok();
        }
        writeln!(output, "{}) Exit", total).ok();
        writeln!(output).ok();

        let hint = match self.default_index {
            Some(index) => format!("Enter your choice [{}]: ", index),
            None => "Enter your choice: ".to_string(),
        };

        loop {
            write!(output, "{}", hint).ok();
            output.flush().ok();

            let line = match next_event() {
                ReadEvent::Line(line) => line,
                ReadEvent::Aborted => {
                    (self.exit_action)();
                    return MenuOutcome::Exit;
                }
            };

            let trimmed = line.trim();
            if trimmed.eq_ignore_ascii_case("exit") {
                (self.exit_action)();
                return MenuOutcome::Exit;
            }

            if trimmed.is_empty() {
                if let Some(index) = self.default_index {
                    let option = self.options.swap_remove(index - 1);
                    return MenuOutcome::Selected((option.action)());
                }
            } else if trimmed.bytes().all(|b| b.is_ascii_digit()) {
                // Only plain non-negative integers count as an index
                // attempt; signs and decimal points fall through.
                if let Ok(choice) = trimmed.parse::<usize>() {
                    if choice >= 1 && choice < total {
                        let option = self.options.swap_remove(choice - 1);
                        return MenuOutcome::Selected((option.action)());
                    }
                    if choice == total {
                        (self.exit_action)();
                        return MenuOutcome::Exit;
                    }
                }
            }

            writeln!(
                output,
                "'{}' is not a valid option. Please enter a number from 1 to {}.",
                trimmed, total
            )
            .ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn two_choice_menu<'a>() -> OptionMenu<'a, &'static str> {
        OptionMenu::new(
            "Pick",
            vec![
                MenuOption::new("A", || "a"),
                MenuOption::new("B", || "b"),
            ],
        )
    }

    fn run<T>(menu: OptionMenu<'_, T>, input: &str) -> (MenuOutcome<T>, String) {
        let mut output = Vec::new();
        let outcome = menu.prompt_from(Cursor::new(input), &mut output);
        (outcome, String::from_utf8(output).unwrap())
    }

    #[test]
    fn numeric_input_selects_choice() {
        let (outcome, rendered) = run(two_choice_menu(), "2\n");
        assert_eq!(outcome, MenuOutcome::Selected("b"));
        assert!(rendered.contains("Pick:\n1) A\n2) B\n3) Exit\n"));
        assert!(rendered.contains("Enter your choice: "));
    }

    #[test]
    fn exit_index_resolves_to_exit() {
        let (outcome, _) = run(two_choice_menu(), "3\n");
        assert_eq!(outcome, MenuOutcome::Exit);
    }

    #[test]
    fn exit_token_is_case_insensitive_and_trimmed() {
        for input in ["exit\n", "EXIT\n", "  Exit  \n"] {
            let (outcome, _) = run(two_choice_menu(), input);
            assert_eq!(outcome, MenuOutcome::Exit);
        }
    }

    #[test]
    fn exit_token_beats_configured_default() {
        let menu = two_choice_menu().default_index(1).unwrap();
        let (outcome, _) = run(menu, "exit\n");
        assert_eq!(outcome, MenuOutcome::Exit);
    }

    #[test]
    fn empty_input_takes_default() {
        let menu = two_choice_menu().default_index(2).unwrap();
        let (outcome, rendered) = run(menu, "\n");
        assert_eq!(outcome, MenuOutcome::Selected("b"));
        assert!(rendered.contains("Enter your choice [2]: "));
    }

    #[test]
    fn empty_input_without_default_reprompts() {
        let (outcome, rendered) = run(two_choice_menu(), "\n1\n");
        assert_eq!(outcome, MenuOutcome::Selected("a"));
        assert!(rendered.contains("'' is not a valid option. Please enter a number from 1 to 3."));
    }

    #[test]
    fn out_of_range_then_exit() {
        let (outcome, rendered) = run(two_choice_menu(), "4\nexit\n");
        assert_eq!(outcome, MenuOutcome::Exit);
        assert!(rendered.contains("'4' is not a valid option. Please enter a number from 1 to 3."));
    }

    #[test]
    fn zero_and_non_integer_input_are_rejected() {
        let (outcome, rendered) = run(two_choice_menu(), "0\n-1\n1.5\nbanana\n2\n");
        assert_eq!(outcome, MenuOutcome::Selected("b"));
        for quoted in ["'0'", "'-1'", "'1.5'", "'banana'"] {
            assert!(rendered.contains(quoted), "missing rejection for {}", quoted);
        }
    }

    #[test]
    fn end_of_input_runs_exit_action() {
        let mut exited = false;
        let menu = OptionMenu::new("Pick", vec![MenuOption::new("A", || "a")])
            .on_exit(|| exited = true);
        let mut output = Vec::new();
        let outcome = menu.prompt_from(Cursor::new(""), &mut output);
        assert_eq!(outcome, MenuOutcome::Exit);
        assert!(exited);
    }

    #[test]
    fn pending_interrupt_resolves_to_exit_without_consuming_input() {
        let mut exited = false;
        let menu = OptionMenu::new("Pick", vec![MenuOption::new("A", || "a")])
            .on_exit(|| exited = true);
        let mut output = Vec::new();
        let outcome = menu.prompt_with(Cursor::new("1\n"), &mut output, || true);
        assert_eq!(outcome, MenuOutcome::Exit);
        assert!(exited);
    }

    #[test]
    fn interrupt_during_loop_resolves_to_exit() {
        // Probe fires on its third consultation: the first line gets
        // through (and is rejected), the next wait aborts.
        let mut polls = 0;
        let menu = two_choice_menu();
        let mut output = Vec::new();
        let outcome = menu.prompt_with(Cursor::new("junk\n1\n"), &mut output, move || {
            polls += 1;
            polls >= 3
        });
        assert_eq!(outcome, MenuOutcome::Exit);
        let rendered = String::from_utf8(output).unwrap();
        assert!(rendered.contains("'junk' is not a valid option."));
    }

    #[test]
    fn default_index_bounds_are_validated() {
        assert_eq!(
            two_choice_menu().default_index(0).err(),
            Some(PromptError::DefaultIndexOutOfRange { index: 0, count: 2 })
        );
        // The synthesized Exit entry is not a valid default.
        assert_eq!(
            two_choice_menu().default_index(3).err(),
            Some(PromptError::DefaultIndexOutOfRange { index: 3, count: 2 })
        );
        assert!(two_choice_menu().default_index(1).is_ok());
        assert!(two_choice_menu().default_index(2).is_ok());
    }

    #[test]
    fn duplicate_labels_resolve_positionally() {
        let menu = OptionMenu::new(
            "Pick",
            vec![
                MenuOption::new("same", || 1),
                MenuOption::new("same", || 2),
            ],
        );
        let (outcome, _) = run(menu, "2\n");
        assert_eq!(outcome, MenuOutcome::Selected(2));
    }
}
