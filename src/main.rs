use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyEventKind},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ratatui::prelude::*;
use tokio::time::{Duration, interval};
use tracing::info;

use proctor::app::{App, handle_action, handle_runner_event, trigger_action};
use proctor::config::Config;
use proctor::{logging, suites, ui};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init()?;

    let arg = std::env::args().nth(1);
    if arg.as_deref() == Some("--list") {
        for suite in suites::all() {
            println!("{:<10} {}", suite.name, suite.title);
        }
        return Ok(());
    }

    let workdir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config = Config::load(&workdir);
    let name = arg.unwrap_or_else(|| config.run.suite.clone());
    let Some(suite) = suites::by_name(&name) else {
        bail!(
            "unknown suite '{}' (available: {})",
            name,
            suites::names().collect::<Vec<_>>().join(", ")
        );
    };
    let runner = suite
        .runner()
        .with_context(|| format!("failed to load suite '{}'", suite.name))?;
    info!(suite = suite.name, tests = runner.len(), "starting");

    // Panics inside test functions are reported in the UI; any other panic
    // restores the terminal before the default report.
    proctor::install_panic_hook(|| {
        let _ = terminal::disable_raw_mode();
        let _ = io::stdout().execute(LeaveAlternateScreen);
    });

    // Setup terminal
    terminal::enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let (app, event_rx) = App::new(runner, config);
    let result = run(&mut terminal, app, event_rx).await;

    // Teardown terminal
    terminal::disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
    mut event_rx: tokio::sync::mpsc::UnboundedReceiver<proctor::runner::RunnerEvent>,
) -> Result<()> {
    let mut tick = interval(Duration::from_millis(100));
    let mut event_stream = EventStream::new();

    loop {
        terminal.draw(|frame| ui::draw(frame, &mut app))?;

        tokio::select! {
            maybe_event = event_stream.next() => {
                match maybe_event {
                    None => break,
                    Some(Err(e)) => return Err(e.into()),
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        if let Some(action) = trigger_action(key, app.filter_active) {
                            handle_action(&mut app, action);
                        }
                    }
                    Some(Ok(_)) => {}
                }
            }

            Some(runner_event) = event_rx.recv() => {
                handle_runner_event(&mut app, runner_event);
            }

            _ = tick.tick() => {
                if app.running() {
                    app.spinner_tick = app.spinner_tick.wrapping_add(1);
                }
                app.notifier.prune_expired();
            }
        }

        if app.should_quit {
            break;
        }
    }

    // The view is going away; nothing may act on results after this point.
    app.cancel_run();
    info!(
        passed = app.runner.passed_count(),
        failed = app.runner.failed_count(),
        "exiting"
    );
    Ok(())
}
