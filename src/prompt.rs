//! Line-oriented prompts.
//!
//! The wizard talks to the user only through [`Prompter`], so sessions can be driven by a script
//! in tests and by dialoguer on a real terminal.

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};

use crate::Result;

pub trait Prompter {
    /// Ask for free text. A blank answer is `None`.
    fn text(&mut self, prompt: &str) -> Result<Option<String>>;

    /// Ask for an integer. A blank answer is `None` and is only accepted when `allow_blank`.
    fn integer(&mut self, prompt: &str, allow_blank: bool) -> Result<Option<i64>>;

    fn confirm(&mut self, prompt: &str) -> Result<bool>;

    /// Ask the user to pick one of `items`; returns its index. The first item is the default.
    fn select(&mut self, prompt: &str, items: &[&str]) -> Result<usize>;
}

impl<P: Prompter + ?Sized> Prompter for &mut P {
    fn text(&mut self, prompt: &str) -> Result<Option<String>> {
        (**self).text(prompt)
    }

    fn integer(&mut self, prompt: &str, allow_blank: bool) -> Result<Option<i64>> {
        (**self).integer(prompt, allow_blank)
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        (**self).confirm(prompt)
    }

    fn select(&mut self, prompt: &str, items: &[&str]) -> Result<usize> {
        (**self).select(prompt, items)
    }
}

/// Terminal prompts rendered with dialoguer.
pub struct DialoguerPrompter {
    theme: ColorfulTheme,
}

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for DialoguerPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for DialoguerPrompter {
    fn text(&mut self, prompt: &str) -> Result<Option<String>> {
        let answer: String = Input::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        Ok(non_blank(answer))
    }

    fn integer(&mut self, prompt: &str, allow_blank: bool) -> Result<Option<i64>> {
        let answer: String = Input::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(allow_blank)
            .validate_with(|input: &String| parse_integer(input).map(|_| ()))
            .interact_text()?;

        parse_integer(&answer).map_err(crate::Error::Message)
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(false)
            .interact()?)
    }

    fn select(&mut self, prompt: &str, items: &[&str]) -> Result<usize> {
        Ok(Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact()?)
    }
}

fn non_blank(answer: String) -> Option<String> {
    let trimmed = answer.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Blank input parses to `None`; blankness is policed by the caller's `allow_blank`.
fn parse_integer(input: &str) -> std::result::Result<Option<i64>, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<i64>()
        .map(Some)
        .map_err(|_| format!("{trimmed:?} is not a whole number"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_only_answers_are_blank() {
        assert_eq!(non_blank("   ".to_string()), None);
        assert_eq!(non_blank(" Artist ".to_string()), Some("Artist".to_string()));
    }

    #[test]
    fn integers_parse_with_surrounding_whitespace() {
        assert_eq!(parse_integer(" 2021 "), Ok(Some(2021)));
        assert_eq!(parse_integer(""), Ok(None));
        assert!(parse_integer("twenty").is_err());
    }
}
