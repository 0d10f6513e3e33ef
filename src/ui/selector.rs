//! Interactive prompts (dialoguer)

use crate::types::MenuItem;
use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};

/// Run a prompt off the async runtime so timers keep firing while it waits
pub async fn blocking<T, F>(prompt: F) -> Option<T>
where
    T: Send + 'static,
    F: FnOnce() -> Option<T> + Send + 'static,
{
    tokio::task::spawn_blocking(prompt).await.ok().flatten()
}

/// Select an item from the menu; `None` when cancelled
pub fn select<T: Clone>(items: &[MenuItem<T>], prompt: &str) -> Option<T> {
    if items.is_empty() {
        return None;
    }

    let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(&labels)
        .default(0)
        .interact_opt()
        .ok()
        .flatten()?;

    items.get(selection).map(|item| item.value.clone())
}

/// Yes/no question, defaulting to no
pub fn confirm(prompt: &str) -> bool {
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()
        .unwrap_or(false)
}

/// Free text, pre-filled with `initial`; `None` when the prompt failed
pub fn input(prompt: &str, initial: &str) -> Option<String> {
    Input::<String>::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .with_initial_text(initial)
        .allow_empty(true)
        .interact_text()
        .ok()
}
