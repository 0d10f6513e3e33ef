//! Terminal UI: rendering, prompts, locale, navigation

pub mod admin_screen;
pub mod i18n;
pub mod player_screen;
pub mod render;
pub mod routes;
pub mod selector;
