mod api;
mod cache;
mod calendar;
mod config;
mod models;
mod theme;
mod tui;

use anyhow::{Context, Result};
use crossterm::{
    event::{Event, KeyEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;

use api::PlatformClient;
use config::Config;
use tui::App;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--init") {
        let path = Config::generate_default()?;
        println!("Generated config file at: {}", path.display());
        println!("Edit it with your platform URL and API token, then run realty-tui.");
        return Ok(());
    }

    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("realty-tui — A terminal dashboard for the Realty lead-generation platform");
        println!();
        println!("USAGE:");
        println!("  realty-tui           Start the TUI");
        println!("  realty-tui --init    Generate a default config file");
        println!();
        println!("CONFIG:");
        println!("  File: ~/.config/realty-tui/config.toml");
        println!("  Or set env vars: REALTY_URL and REALTY_API_TOKEN");
        println!();
        println!("KEYBINDINGS:");
        println!("  Tab / Shift+Tab   Switch tabs");
        println!("  1-5               Jump to tab");
        println!("  j / k / Up / Down Navigate lists (weeks on the calendar)");
        println!("  Left / Right      Move the selected date");
        println!("  h / l             Previous / next month");
        println!("  t                 Jump to today");
        println!("  q / Ctrl+C        Quit");
        return Ok(());
    }

    init_tracing();

    let config = Config::load().with_context(|| {
        "Failed to load configuration.\n\
         Run `realty-tui --init` to generate a config file,\n\
         or set REALTY_URL and REALTY_API_TOKEN environment variables."
    })?;

    let client = PlatformClient::new(&config.platform_url, &config.api_token)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, client, config.theme_settings_id).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
    }

    Ok(())
}

/// Logs go to a file under the cache dir; writing to stdout would
/// corrupt the alternate screen.
fn init_tracing() {
    let Some(path) = cache::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let Ok(file) = std::fs::OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };
    tracing_subscriber::fmt()
        .with_writer(std::sync::Arc::new(file))
        .with_ansi(false)
        .init();
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    client: PlatformClient,
    theme_settings_id: u64,
) -> Result<()> {
    let mut app = App::new(client, theme_settings_id);

    // Show cached data instantly, then kick off a background sync.
    if let Some(cached) = cache::load_cache() {
        app.load_from_cache(cached);
        app.start_fetch();
        app.status_message = "Showing cached data — syncing in background…".into();
    } else {
        app.start_fetch();
    }
    terminal.draw(|f| tui::ui::render(f, &mut app))?;

    loop {
        app.frame_count = app.frame_count.wrapping_add(1);
        terminal.draw(|f| tui::ui::render(f, &mut app))?;

        if let Some(event) = tui::event::poll_event(Duration::from_millis(100))? {
            if let Event::Key(KeyEvent {
                code, modifiers, ..
            }) = event
            {
                tui::event::handle_key(&mut app, code, modifiers);
            }
        }

        if !app.running {
            break;
        }

        // Apply completed fetch results without blocking.
        app.poll_fetch_result();

        if app.needs_refresh {
            app.needs_refresh = false;
            app.start_fetch();
        }
    }

    Ok(())
}
