//! Interactive Player surface on the terminal

use crate::core::controller::Controller;
use crate::core::media::MediaElement;
use crate::core::player::{PlayerPage, Screen};
use crate::error::Result;
use crate::types::Route;
use crate::ui::i18n::Lang;
use crate::ui::render::render_screen;
use crate::ui::selector;
use colored::Colorize;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

/// A key line typed by the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Key {
    Affordance,
    Tap,
    Admin,
    Quit,
    Unknown,
}

fn parse_key(line: &str) -> Key {
    match line.trim() {
        "" | "p" => Key::Affordance,
        "t" => Key::Tap,
        "a" => Key::Admin,
        "q" => Key::Quit,
        _ => Key::Unknown,
    }
}

fn draw(screen: &Screen, lang: Lang) {
    for line in render_screen(screen, lang) {
        println!("{}", line);
    }
}

/// Show the unavailable view and follow its admin link if asked
pub async fn offer_admin(lang: Lang) -> Option<Route> {
    let admin_link = Route::Admin;
    draw(&Screen::Unavailable { admin_link }, lang);
    println!();

    let prompt = format!("{} ({})", lang.t("openAdmin"), admin_link.path());
    let follow = selector::blocking(move || Some(selector::confirm(&prompt)))
        .await
        .unwrap_or(false);
    follow.then_some(admin_link)
}

/// Run the player until the viewer leaves.
///
/// Returns the route the viewer asked for, or `None` on quit.
pub async fn run<M: MediaElement>(page: &PlayerPage, element: Arc<M>, autoplay: bool, lang: Lang) -> Result<Option<Route>> {
    let Some(mut controller) = page.controller(element) else {
        return Ok(offer_admin(lang).await);
    };

    println!("{}", lang.t("playerHint").dimmed());
    if autoplay {
        controller.autoplay();
    }

    let mut last = page.screen(Some(&controller));
    draw(&last, lang);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let key = match line? {
                    Some(line) => parse_key(&line),
                    None => Key::Quit,
                };
                match key {
                    Key::Affordance => controller.press(),
                    Key::Tap => controller.tap(),
                    Key::Admin => return Ok(Some(Route::Admin)),
                    Key::Quit => break,
                    Key::Unknown => continue,
                }
            }
            _ = controller.next() => {}
        }

        redraw(page, &controller, &mut last, lang);
    }

    Ok(None)
}

fn redraw<M: MediaElement>(page: &PlayerPage, controller: &Controller<M>, last: &mut Screen, lang: Lang) {
    let screen = page.screen(Some(controller));
    if screen != *last {
        draw(&screen, lang);
        *last = screen;
    }
}
