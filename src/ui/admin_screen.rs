//! Interactive Admin surface on the terminal

use crate::core::admin::AdminPanel;
use crate::core::clipboard::Clipboard;
use crate::error::{Result, StoreError};
use crate::types::{MenuItem, Route};
use crate::ui::i18n::Lang;
use crate::ui::render::{render_admin, render_copied};
use crate::ui::selector::{self, blocking};
use colored::Colorize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AdminAction {
    SetUrl,
    ToggleStreaming,
    ResetStats,
    CopyLink,
    OpenPlayer,
    Quit,
}

/// Print the admin header
pub fn show(panel: &AdminPanel, lang: Lang) {
    for line in render_admin(&panel.video(), &panel.stats(), panel.share_link(), lang) {
        println!("{}", line);
    }
}

/// Report the outcome of a store write to the operator
pub fn report_write<T>(result: std::result::Result<T, StoreError>, success: Option<&str>, lang: Lang) {
    match result {
        Ok(_) => {
            if let Some(key) = success {
                println!("{}", lang.t(key).green());
            }
        }
        Err(e) => eprintln!("{} {} ({})", "Warning:".yellow(), lang.t("saveFailed"), e),
    }
}

fn menu(lang: Lang) -> Vec<MenuItem<AdminAction>> {
    vec![
        MenuItem { label: format!("✎ {}", lang.t("saveButton")), value: AdminAction::SetUrl },
        MenuItem { label: format!("⏻ {}", lang.t("videoStreaming")), value: AdminAction::ToggleStreaming },
        MenuItem { label: format!("↺ {}", lang.t("resetButton")), value: AdminAction::ResetStats },
        MenuItem { label: format!("⧉ {}", lang.t("copyButton")), value: AdminAction::CopyLink },
        MenuItem { label: format!("▶ {}", lang.t("openPlayer")), value: AdminAction::OpenPlayer },
        MenuItem { label: format!("✖ {}", lang.t("quit")), value: AdminAction::Quit },
    ]
}

/// Menu loop until the operator leaves.
///
/// Returns the route to open next, or `None` on quit.
pub async fn run(panel: &mut AdminPanel, clipboard: &dyn Clipboard, lang: Lang) -> Result<Option<Route>> {
    loop {
        println!();
        show(panel, lang);
        println!();

        let items = menu(lang);
        let prompt = lang.t("selectAction").to_string();
        let action = blocking(move || selector::select(&items, &prompt))
            .await
            .unwrap_or(AdminAction::Quit);

        match action {
            AdminAction::SetUrl => {
                let prompt = lang.t("videoUrlLabel").to_string();
                let initial = panel.draft_url().to_string();
                if let Some(url) = blocking(move || selector::input(&prompt, &initial)).await {
                    panel.set_draft_url(url);
                    report_write(panel.save(), Some("urlSaved"), lang);
                }
            }
            AdminAction::ToggleStreaming => {
                report_write(panel.toggle_enabled(), None, lang);
            }
            AdminAction::ResetStats => {
                let prompt = lang.t("confirmStatReset").to_string();
                let confirmed = blocking(move || Some(selector::confirm(&prompt))).await.unwrap_or(false);
                report_write(panel.reset_stats(|| confirmed), None, lang);
            }
            AdminAction::CopyLink => match panel.copy_share_link(clipboard).await {
                Ok(()) if panel.is_copied() => println!("{}", render_copied(lang)),
                Ok(()) => {}
                Err(e) => {
                    eprintln!("{} {}", "Error:".red(), e);
                    println!("{}", panel.share_link());
                }
            },
            AdminAction::OpenPlayer => return Ok(Some(Route::Player)),
            AdminAction::Quit => break,
        }
    }

    Ok(None)
}
