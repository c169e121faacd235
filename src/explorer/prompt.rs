use anyhow::{Context, Result};
use dialoguer::console::Term;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};

/// Rows shown at once in a scrolling select
pub const SELECT_ROWS: usize = 10;

/// The terminal interactions the explorer needs
pub trait Prompter {
    /// Pick one of `items`, returning its index
    fn select(&self, prompt: &str, items: &[String]) -> Result<usize>;

    /// Free text, falling back to `default` on empty input
    fn input(&self, prompt: &str, default: Option<&str>) -> Result<String>;

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;

    /// Show a message to the user
    fn notify(&self, message: &str);

    fn clear(&self) -> Result<()> {
        Ok(())
    }
}

/// [`Prompter`] backed by dialoguer on the controlling terminal
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn select(&self, prompt: &str, items: &[String]) -> Result<usize> {
        Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .max_length(SELECT_ROWS)
            .interact()
            .context("Selection aborted")
    }

    fn input(&self, prompt: &str, default: Option<&str>) -> Result<String> {
        let mut input = Input::<String>::with_theme(&self.theme).with_prompt(prompt);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        let value = input.interact_text().context("Input aborted")?;
        Ok(value.trim().to_string())
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact()
            .context("Confirmation aborted")
    }

    fn notify(&self, message: &str) {
        println!("{}", message);
    }

    fn clear(&self) -> Result<()> {
        Term::stdout()
            .clear_screen()
            .context("Failed to clear the terminal")
    }
}
