use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
};

use typometer::{
    app::{App, AppSettings, Control},
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    history::ResultsLog,
    logging,
    passage::{
        BuiltinPassages, CustomPassage, FilePassages, Language, PassageDeck, PassageSource,
        Selection,
    },
    runtime::{CrosstermEventSource, FixedTicker, Runner, TypingEvent},
};

/// typing speed trainer scored by edit distance
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type a reference passage and get your time, words per minute and accuracy. Accuracy is based on the edit distance between the passage and what you typed."
)]
pub struct Cli {
    /// number of seconds to run test
    #[clap(
        short = 's',
        long,
        value_parser = clap::value_parser!(u64).range(1..),
        conflicts_with = "untimed"
    )]
    secs: Option<u64>,

    /// run without a time limit
    #[clap(long)]
    untimed: bool,

    /// language to pull passages from
    #[clap(short = 'l', long, value_enum)]
    language: Option<Language>,

    /// show passages in order and stop after the last one
    #[clap(long, conflicts_with = "random")]
    sequential: bool,

    /// pick passages at random
    #[clap(long)]
    random: bool,

    /// custom passage to use
    #[clap(short = 'p', long, conflicts_with = "file")]
    prompt: Option<String>,

    /// text file with one passage per line
    #[clap(short = 'f', long)]
    file: Option<PathBuf>,

    /// do not append results to the results log
    #[clap(long)]
    no_log: bool,

    /// print the passages and exit
    #[clap(long)]
    list: bool,

    /// remember the given settings for future runs
    #[clap(long)]
    save: bool,
}

impl Cli {
    /// Overlays the command line flags on the stored configuration
    fn apply(&self, mut config: Config) -> Config {
        if let Some(secs) = self.secs {
            config.time_limit_secs = Some(secs);
        }
        if self.untimed {
            config.time_limit_secs = None;
        }
        if let Some(language) = self.language {
            config.language = language;
        }
        if self.sequential {
            config.selection = Selection::Sequential;
        }
        if self.random {
            config.selection = Selection::Random;
        }
        if self.no_log {
            config.log_results = false;
        }
        config
    }

    /// Loads the stored configuration, overlays the flags and, with `--save`,
    /// writes the result back
    fn resolve_config(&self, store: &FileConfigStore) -> io::Result<Config> {
        let config = self.apply(store.load());
        if self.save {
            store.save(&config)?;
            tracing::info!(path = %store.path().display(), "settings saved");
        }
        Ok(config)
    }

    fn passage_source(&self) -> Box<dyn PassageSource> {
        match (&self.prompt, &self.file) {
            (Some(prompt), _) => Box::new(CustomPassage(prompt.clone())),
            (None, Some(path)) => Box::new(FilePassages::new(path)),
            (None, None) => Box::new(BuiltinPassages),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(path) = AppDirs::log_path() {
        logging::init(&path);
    }

    let config = cli.resolve_config(&FileConfigStore::new())?;

    let source = cli.passage_source();

    if cli.list {
        for (i, passage) in source.passages(config.language)?.iter().enumerate() {
            println!("{:>3}  {}", i + 1, passage);
        }
        return Ok(());
    }

    let deck = PassageDeck::load(source.as_ref(), config.language, config.selection)?;

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let settings = AppSettings {
        time_limit_secs: config.time_limit_secs,
        language: config.language,
        results_log: if config.log_results {
            AppDirs::results_path().map(ResultsLog::with_path)
        } else {
            None
        },
    };
    let mut app = App::new(deck, settings);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let outcome = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    outcome
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::new(CrosstermEventSource::new(), FixedTicker::seconds());

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match runner.step() {
            TypingEvent::Tick => app.on_tick(),
            TypingEvent::Resize => {}
            TypingEvent::Closed => {
                tracing::warn!("terminal input closed, exiting");
                break;
            }
            TypingEvent::Key(key) => {
                let was_started = app.session.has_started();
                if app.handle_key(key) == Control::Quit {
                    break;
                }
                // the countdown runs from the first keystroke
                if !was_started && app.session.has_started() {
                    runner.reset_ticks();
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_stored_config() {
        let cli = Cli::parse_from([
            "typometer",
            "-s",
            "30",
            "-l",
            "bengali",
            "--sequential",
            "--no-log",
        ]);

        let config = cli.apply(Config::default());

        assert_eq!(config.time_limit_secs, Some(30));
        assert_eq!(config.language, Language::Bengali);
        assert_eq!(config.selection, Selection::Sequential);
        assert!(!config.log_results);
    }

    #[test]
    fn cli_untimed() {
        let cli = Cli::parse_from(["typometer", "--untimed"]);
        assert_eq!(cli.apply(Config::default()).time_limit_secs, None);
    }

    #[test]
    fn cli_without_flags_keeps_config() {
        let cli = Cli::parse_from(["typometer"]);
        let stored = Config {
            time_limit_secs: Some(90),
            language: Language::Bengali,
            selection: Selection::Sequential,
            log_results: false,
        };
        assert_eq!(cli.apply(stored.clone()), stored);
    }

    #[test]
    fn cli_rejects_zero_seconds() {
        let err = Cli::try_parse_from(["typometer", "-s", "0"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn cli_rejects_conflicting_flags() {
        assert!(Cli::try_parse_from(["typometer", "-s", "10", "--untimed"]).is_err());
        assert!(Cli::try_parse_from(["typometer", "--sequential", "--random"]).is_err());
    }

    #[test]
    fn cli_save_persists_flags() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));

        let cli = Cli::parse_from(["typometer", "-s", "45", "--sequential", "--save"]);
        let config = cli.resolve_config(&store).unwrap();
        assert_eq!(config.time_limit_secs, Some(45));

        // a later run without flags picks the saved settings up
        let later = Cli::parse_from(["typometer"]).resolve_config(&store).unwrap();
        assert_eq!(later, config);
        assert_eq!(later.selection, Selection::Sequential);
    }

    #[test]
    fn cli_without_save_leaves_store_alone() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));

        let config = Cli::parse_from(["typometer", "--untimed"])
            .resolve_config(&store)
            .unwrap();

        assert_eq!(config.time_limit_secs, None);
        assert!(!store.path().exists());
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn cli_verify() {
        Cli::command().debug_assert();
    }
}
