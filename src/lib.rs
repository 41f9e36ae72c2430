use std::io::{self, Stdout};
use std::time::Duration;

use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};

mod app;
pub mod config;
pub mod error;
pub mod file;
pub mod import;
mod keybinds;
pub mod language;
pub mod logger;
pub mod notice;
pub mod session;
pub mod settings;
pub mod store;
mod syntax;
pub mod textarea_view;
mod theme;
mod types;
mod ui;
mod util;
pub mod view;

use app::App;
use config::{AppConfig, CliArgs, StoreKind, log_file_path};
use store::{JsonStorage, MemStorage, Storage, StoreWorker, local_client};
use ui::draw;

pub fn run() -> io::Result<()> {
    let args = match CliArgs::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{msg}\n\n{}", CliArgs::usage());
            return Ok(());
        }
    };
    if args.help {
        println!("{}", CliArgs::usage());
        return Ok(());
    }

    let mut config = AppConfig::load();
    config.apply_cli(&args);
    if let Some(path) = log_file_path()
        && let Err(err) = logger::init(&path, config.level_filter())
    {
        eprintln!("Logging disabled: {err}");
    }
    log::info!("starting mxedit with {:?} store", config.store);

    let (storage, store_label, watch_path): (Box<dyn Storage>, String, _) = match config.store {
        StoreKind::Memory => (Box::new(MemStorage::with_samples()), "memory".to_string(), None),
        StoreKind::Json => {
            let path = config
                .resolved_store_path()
                .ok_or_else(|| io::Error::other("no location for the JSON store"))?;
            let storage = JsonStorage::open(&path)
                .map_err(|e| io::Error::other(format!("open store {}: {e}", path.display())))?;
            let label = path.display().to_string();
            let watch = config.watch_store.then_some(path);
            (Box::new(storage), label, watch)
        }
    };
    let client = local_client(storage).map_err(|e| io::Error::other(e.to_string()))?;
    let worker = StoreWorker::spawn(Box::new(client))?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;

    let enhanced_keys =
        ratatui::crossterm::terminal::supports_keyboard_enhancement().unwrap_or(false);
    if enhanced_keys {
        let _ = execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        );
    }

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableBracketedPaste);
        original_hook(info);
    }));

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;

    let mut app = App::new(worker, keybinds::load_keybindings(), store_label, watch_path);
    for path in &args.files {
        app.import_path(path);
    }
    let result = run_app(terminal, &mut app);
    app.shutdown();

    disable_raw_mode()?;
    let mut stdout = io::stdout();
    if enhanced_keys {
        let _ = execute!(stdout, PopKeyboardEnhancementFlags);
    }
    execute!(stdout, LeaveAlternateScreen, DisableBracketedPaste)?;
    log::info!("mxedit exiting");

    result
}

fn run_app(mut terminal: Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> io::Result<()> {
    loop {
        app.tick();
        terminal.draw(|f| draw(app, f))?;
        if app.quit {
            return Ok(());
        }
        if event::poll(Duration::from_millis(100))? {
            // Drain everything pending before the next draw.
            loop {
                match event::read()? {
                    Event::Key(key) => {
                        if let Err(err) = app.handle_key(key) {
                            app.set_status(format!("Action failed: {err}"));
                        }
                    }
                    Event::Paste(text) => app.handle_paste(text),
                    _ => {}
                }
                if app.quit {
                    return Ok(());
                }
                if !event::poll(Duration::ZERO)? {
                    break;
                }
            }
        }
    }
}
