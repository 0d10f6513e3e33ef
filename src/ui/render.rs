//! Terminal rendering of both surfaces

use crate::core::player::Screen;
use crate::types::{Affordance, Phase, StatsData, VideoData};
use crate::ui::i18n::Lang;
use colored::Colorize;

/// Icon and label, in reading order
fn labeled(lang: Lang, icon: &str, label: &str) -> String {
    if lang.is_rtl() {
        format!("{} {}", label, icon)
    } else {
        format!("{} {}", icon, label)
    }
}

fn affordance_label(lang: Lang, affordance: Affordance) -> String {
    match affordance {
        Affordance::Play => labeled(lang, "▶", lang.t("playLabel")),
        Affordance::Pause => labeled(lang, "⏸", lang.t("pauseLabel")),
        Affordance::Replay => labeled(lang, "↻", lang.t("watchAgain")),
    }
}

fn phase_label(lang: Lang, phase: Phase) -> &'static str {
    match phase {
        Phase::Idle => lang.t("ready"),
        Phase::Playing => lang.t("playing"),
        Phase::Paused => lang.t("paused"),
        Phase::Ended => lang.t("ended"),
    }
}

/// Lines for the Player surface
pub fn render_screen(screen: &Screen, lang: Lang) -> Vec<String> {
    match screen {
        Screen::Unavailable { admin_link } => vec![
            labeled(lang, "✖", lang.t("videoNotAvailable")).red().bold().to_string(),
            lang.t("contentDisabled").dimmed().to_string(),
            String::new(),
            format!("{}: {}", lang.t("adminPanelLink"), admin_link.path().underline()),
        ],
        Screen::Video { phase, affordance } => {
            let mut status = phase_label(lang, *phase).dimmed().to_string();
            if let Some(affordance) = affordance {
                status = format!("{}   [ {} ]", status, affordance_label(lang, *affordance).bold());
            }
            vec![status]
        }
    }
}

/// Header block for the Admin surface
pub fn render_admin(video: &VideoData, stats: &StatsData, share_link: &str, lang: Lang) -> Vec<String> {
    let streaming = if video.is_enabled {
        lang.t("enabled").green()
    } else {
        lang.t("disabled").red()
    };
    let url = if video.url.is_empty() {
        "—".dimmed()
    } else {
        video.url.as_str().cyan()
    };
    vec![
        lang.t("adminTitle").bold().to_string(),
        lang.t("adminSubtitle").dimmed().to_string(),
        String::new(),
        format!("{}: {}", lang.t("videoUrlLabel"), url),
        format!("{}: {}", lang.t("videoStreaming"), streaming),
        format!("{}: {}", lang.t("totalViews"), stats.total_views.to_string().blue().bold()),
        format!("{}: {}", lang.t("qrCodeLink"), share_link),
    ]
}

/// One-off line shown right after a successful copy
pub fn render_copied(lang: Lang) -> String {
    labeled(lang, "✓", lang.t("copied")).green().to_string()
}
