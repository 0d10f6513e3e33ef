//! kiosk-player - one video, one fullscreen player, one admin panel
//!
//! The operator sets a video URL and an enabled flag; viewers get a
//! distraction-free player; every qualifying player launch counts a view.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use kiosk_player::core::admin::AdminPanel;
use kiosk_player::core::clipboard::SystemClipboard;
use kiosk_player::core::media::{HeadlessElement, HeadlessOptions};
#[cfg(unix)]
use kiosk_player::core::mpv::MpvElement;
use kiosk_player::core::player::PlayerPage;
use kiosk_player::error::{ErrorCode, KioskError};
use kiosk_player::storage::{Store, config};
use kiosk_player::types::{Config, Route};
use kiosk_player::ui::i18n::Lang;
use kiosk_player::ui::render::render_copied;
use kiosk_player::ui::{admin_screen, player_screen, routes, selector};
use kiosk_player::utils::{logging, paths::ensure_dir};

/// One video, one fullscreen player, one admin panel.
#[derive(Parser, Debug)]
#[command(name = "kiosk-player")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Store directory (overrides config)
    #[arg(long, global = true)]
    data_dir: Option<String>,

    /// Keep everything in memory for this run
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the player (the default)
    Play {
        /// Start playing without waiting for a key press
        #[arg(long)]
        autoplay: bool,

        /// Simulate playback instead of launching mpv
        #[arg(long)]
        headless: bool,
    },

    /// Manage the video and statistics (interactive without an action)
    Admin {
        #[command(subcommand)]
        action: Option<AdminCommand>,
    },

    /// Open a route such as `/` or `/admin`
    Open { route: String },

    /// Show or edit the configuration file
    Config {
        #[arg(short, long)]
        edit: bool,
    },
}

#[derive(Subcommand, Debug)]
enum AdminCommand {
    /// Print current settings and statistics
    Show,
    /// Save a new video URL
    SetUrl { url: String },
    /// Allow playback
    Enable,
    /// Block playback
    Disable,
    /// Flip the enabled flag
    Toggle,
    /// Zero the view counter
    ResetStats {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Print the shareable link
    Link {
        /// Also copy it to the clipboard
        #[arg(long)]
        copy: bool,
    },
}

async fn open_store(cli: &Cli, cfg: &Config) -> anyhow::Result<Arc<Store>> {
    if cli.ephemeral {
        return Ok(Arc::new(Store::in_memory()));
    }

    let dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| config::resolve_store_dir(cfg));
    ensure_dir(&dir).await?;
    Ok(Arc::new(Store::open(dir)))
}

async fn run_player(
    store: &Arc<Store>,
    cfg: &Config,
    autoplay: bool,
    headless: bool,
    lang: Lang,
) -> anyhow::Result<Option<Route>> {
    let page = PlayerPage::mount(store);
    if !page.is_available() {
        return Ok(player_screen::offer_admin(lang).await);
    }

    if headless {
        let element = Arc::new(HeadlessElement::new(HeadlessOptions {
            duration: Duration::from_secs(cfg.headless_duration_secs),
            ..Default::default()
        }));
        return Ok(player_screen::run(&page, element, autoplay, lang).await?);
    }

    let element = launch_native(&page.video().url).await?;
    Ok(player_screen::run(&page, element, autoplay, lang).await?)
}

#[cfg(unix)]
async fn launch_native(url: &str) -> anyhow::Result<Arc<MpvElement>> {
    Ok(Arc::new(MpvElement::launch(url).await?))
}

#[cfg(not(unix))]
async fn launch_native(_url: &str) -> anyhow::Result<Arc<HeadlessElement>> {
    anyhow::bail!("mpv playback needs a Unix IPC socket; run with --headless")
}

async fn run_admin(store: &Arc<Store>, cfg: &Config, lang: Lang) -> anyhow::Result<Option<Route>> {
    let mut panel = AdminPanel::mount(store, &cfg.share_url)?;
    let clipboard = SystemClipboard::new();
    Ok(admin_screen::run(&mut panel, &clipboard, lang).await?)
}

/// Move between the surfaces until the user quits; every visit is a fresh mount
async fn browse(store: &Arc<Store>, cfg: &Config, start: Route, autoplay: bool, headless: bool, lang: Lang) -> anyhow::Result<()> {
    routes::navigate(start, |route| async move {
        match route {
            Route::Player => run_player(store, cfg, autoplay, headless, lang).await,
            Route::Admin => run_admin(store, cfg, lang).await,
        }
    })
    .await
}

async fn run_admin_action(store: &Arc<Store>, cfg: &Config, action: AdminCommand, lang: Lang) -> anyhow::Result<()> {
    let mut panel = AdminPanel::mount(store, &cfg.share_url)?;

    match action {
        AdminCommand::Show => admin_screen::show(&panel, lang),
        AdminCommand::SetUrl { url } => {
            panel.set_draft_url(url);
            admin_screen::report_write(panel.save(), Some("urlSaved"), lang);
        }
        AdminCommand::Enable => admin_screen::report_write(panel.set_enabled(true), None, lang),
        AdminCommand::Disable => admin_screen::report_write(panel.set_enabled(false), None, lang),
        AdminCommand::Toggle => {
            let result = panel.toggle_enabled();
            if let Ok(enabled) = result {
                let label = if enabled { lang.t("enabled") } else { lang.t("disabled") };
                println!("{}: {}", lang.t("videoStreaming"), label);
            }
            admin_screen::report_write(result, None, lang);
        }
        AdminCommand::ResetStats { yes } => {
            let result = panel.reset_stats(|| yes || selector::confirm(lang.t("confirmStatReset")));
            admin_screen::report_write(result, None, lang);
        }
        AdminCommand::Link { copy } => {
            println!("{}", panel.share_link());
            if copy {
                panel.copy_share_link(&SystemClipboard::new()).await?;
                println!("{}", render_copied(lang));
            }
        }
    }

    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let cfg = config::load_config().await?;

    // Handle config before touching the store
    if let Some(Commands::Config { edit }) = &cli.command {
        if *edit {
            config::edit_config(&cfg.editor).await?;
        } else {
            println!("{}", serde_json::to_string_pretty(&cfg)?);
        }
        return Ok(());
    }

    let store = open_store(&cli, &cfg).await?;
    let lang = Lang::detect(cfg.locale.as_deref());

    match cli.command {
        None => browse(&store, &cfg, Route::Player, false, false, lang).await,
        Some(Commands::Play { autoplay, headless }) => browse(&store, &cfg, Route::Player, autoplay, headless, lang).await,
        Some(Commands::Admin { action: None }) => browse(&store, &cfg, Route::Admin, false, false, lang).await,
        Some(Commands::Admin { action: Some(action) }) => run_admin_action(&store, &cfg, action, lang).await,
        Some(Commands::Open { route }) => browse(&store, &cfg, Route::resolve(&route), false, false, lang).await,
        Some(Commands::Config { .. }) => Ok(()),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code = e.downcast_ref::<KioskError>().map(KioskError::code);
            debug!(?code, "Exiting with error");
            eprintln!("{} {:#}", "Error:".red(), e);
            ExitCode::from(code.map_or(1, ErrorCode::exit_status))
        }
    }
}
