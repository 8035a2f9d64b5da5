//! Startup wiring: settings, storage paths, registry, session, worker,
//! MPRIS and the terminal. Also hosts the catalog-maintenance command line
//! entry points (`add-remote`, `add-local`).

use std::sync::mpsc;

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::library::SourceRegistry;
use crate::mpris::ControlCmd;
use crate::paths::StoragePaths;
use crate::player::MpvBackend;
use crate::recents::RecentsLedger;
use crate::remote::{SidecarLyrics, YtDlp};
use crate::session::PlaybackSession;
use crate::theme;

mod event_loop;
mod resolver;
mod settings;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();
    let paths =
        StoragePaths::resolve().ok_or("no data directory (set VIVACE_DATA_DIR or HOME)")?;
    init_logging(&paths);

    let registry = SourceRegistry::new(paths.clone());

    // Catalog maintenance runs without the UI.
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [cmd, name, locator] if cmd == "add-remote" => {
            registry.add_remote(name, locator)?;
            println!("added remote playlist {name}");
            return Ok(());
        }
        [cmd, name, locator] if cmd == "add-local" => {
            registry.add_local(name, locator)?;
            println!("added local playlist {name}");
            return Ok(());
        }
        [] => {}
        _ => {
            return Err("usage: vivace [add-remote <name> <url> | add-local <name> <dir>]".into());
        }
    }

    let recents = RecentsLedger::new(paths.recents_file(), settings.recents.cap);
    let mut app = App::new(registry.load());
    let mut session = PlaybackSession::new(
        Box::new(MpvBackend::new(settings.player.binary.clone())),
        Box::new(YtDlp::new(
            settings.extractor.binary.clone(),
            settings.extractor.search_limit,
        )),
        Box::new(SidecarLyrics),
        recents.clone(),
        settings.player.volume,
    );
    let worker = resolver::ResolverWorker::new(
        YtDlp::new(
            settings.extractor.binary.clone(),
            settings.extractor.search_limit,
        ),
        recents,
    );

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx.clone());
    let theme = theme::by_name(&settings.ui.theme);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::new(&session);
        event_loop::run(
            &mut terminal,
            &settings,
            theme,
            &registry,
            &mut app,
            &mut session,
            &worker,
            &mpris,
            &control_tx,
            &control_rx,
            &mut state,
        )
    })();

    // The engine handle must be released on every exit path, including
    // event-loop errors.
    session.shutdown();
    worker.quit();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}

/// Route log records to a file: the terminal belongs to the TUI.
fn init_logging(paths: &StoragePaths) {
    let _ = std::fs::create_dir_all(paths.data_dir());
    let mut builder = env_logger::Builder::from_default_env();
    if let Ok(file) = std::fs::File::create(paths.log_file()) {
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    let _ = builder.try_init();
}
