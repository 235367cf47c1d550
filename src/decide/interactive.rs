//! Terminal yes/no prompts

use super::{DecisionProvider, Prompt};
use console::Style;
use dialoguer::Confirm;
use tracing::warn;

/// Asks on the terminal; each source root gets its own color
#[derive(Debug, Clone)]
pub struct Interactive {
    palette: Vec<Style>,
}

impl Interactive {
    pub fn new() -> Self {
        Self {
            palette: vec![
                Style::new().cyan(),
                Style::new().magenta(),
                Style::new().yellow(),
                Style::new().blue(),
                Style::new().green(),
            ],
        }
    }

    fn render(&self, prompt: &Prompt) -> String {
        let style = &self.palette[prompt.from % self.palette.len()];
        style.apply_to(&prompt.text).to_string()
    }
}

impl Default for Interactive {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionProvider for Interactive {
    fn decide(&mut self, prompt: &Prompt) -> bool {
        let answer = Confirm::new()
            .with_prompt(self.render(prompt))
            .default(false)
            .wait_for_newline(true)
            .interact_opt();

        match answer {
            Ok(Some(answer)) => answer,
            Ok(None) => false,
            Err(e) => {
                warn!(error = %e, "could not read answer, treating it as no");
                false
            }
        }
    }
}
