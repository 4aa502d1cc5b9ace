pub mod adb;
pub mod menu;
pub mod scrcpy;
pub mod utils;
pub mod workflows;

// Re-export common items
pub use menu::{MenuOption, MenuOutcome, NumberInput, NumberOutcome, OptionMenu, PromptError};
