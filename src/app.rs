use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::history::{HistorySummary, ResultRecord, ResultsLog};
use crate::passage::{Language, PassageDeck};
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Typing,
    Results,
    /// a sequential deck ran out of passages
    Completed,
}

/// What the event loop should do after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub time_limit_secs: Option<u64>,
    pub language: Language,
    /// `None` disables the results log
    pub results_log: Option<ResultsLog>,
}

#[derive(Debug)]
pub struct App {
    pub deck: PassageDeck,
    pub session: Session,
    pub state: AppState,
    pub settings: AppSettings,
    pub summary: Option<HistorySummary>,
}

impl App {
    pub fn new(deck: PassageDeck, settings: AppSettings) -> Self {
        let session = Session::new(deck.current(), settings.time_limit_secs);
        Self {
            deck,
            session,
            state: AppState::Typing,
            settings,
            summary: None,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Control {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Control::Quit;
        }

        match self.state {
            AppState::Typing => match key.code {
                KeyCode::Char(c) => {
                    if self.session.type_char(c).is_some() {
                        self.on_finished();
                    }
                }
                KeyCode::Backspace => self.session.backspace(),
                KeyCode::Enter => {
                    if self.session.has_started() && self.session.finish().is_some() {
                        self.on_finished();
                    }
                }
                KeyCode::Esc => {
                    if !self.session.has_started() {
                        return Control::Quit;
                    }
                    if self.session.finish().is_some() {
                        self.on_finished();
                    }
                }
                _ => {}
            },
            AppState::Results => match key.code {
                KeyCode::Char('r') => self.retry(),
                KeyCode::Char('n') | KeyCode::Enter => self.next_passage(),
                KeyCode::Char('q') | KeyCode::Esc => return Control::Quit,
                _ => {}
            },
            AppState::Completed => match key.code {
                KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter => return Control::Quit,
                _ => {}
            },
        }

        Control::Continue
    }

    /// Forwards the one-second tick to the running session
    pub fn on_tick(&mut self) {
        if self.state == AppState::Typing && self.session.on_tick().is_some() {
            self.on_finished();
        }
    }

    /// Starts over on the same passage
    pub fn retry(&mut self) {
        self.session = Session::new(self.session.passage(), self.settings.time_limit_secs);
        self.state = AppState::Typing;
    }

    pub fn next_passage(&mut self) {
        let total = self.deck.len();
        match self.deck.advance() {
            Some(passage) => {
                self.session = Session::new(passage, self.settings.time_limit_secs);
                self.state = AppState::Typing;
            }
            None => {
                tracing::info!(passages = total, "all passages completed");
                self.state = AppState::Completed;
            }
        }
    }

    fn on_finished(&mut self) {
        self.state = AppState::Results;

        let (Some(log), Some(result)) = (&self.settings.results_log, self.session.result()) else {
            return;
        };

        let record = ResultRecord::from_result(result, self.settings.language);
        if let Err(e) = log.append(&record) {
            tracing::warn!(path = %log.path().display(), error = %e, "unable to log result");
        }

        self.summary = match log.summary() {
            Ok(summary) => summary,
            Err(e) => {
                tracing::warn!(error = %e, "unable to read results log");
                None
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passage::Selection;
    use tempfile::tempdir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with(passages: &[&str], time_limit_secs: Option<u64>) -> App {
        let deck = PassageDeck::new(
            passages.iter().map(|p| p.to_string()).collect(),
            Selection::Sequential,
        )
        .unwrap();
        App::new(
            deck,
            AppSettings {
                time_limit_secs,
                language: Language::English,
                results_log: None,
            },
        )
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn typing_whole_passage_shows_results() {
        let mut app = app_with(&["hi"], None);

        type_str(&mut app, "hi");

        assert_eq!(app.state, AppState::Results);
        assert_eq!(app.session.result().unwrap().score.accuracy, 100.0);
    }

    #[test]
    fn enter_ends_test_early() {
        let mut app = app_with(&["hello world"], None);
        type_str(&mut app, "hello");

        assert_eq!(app.handle_key(key(KeyCode::Enter)), Control::Continue);

        assert_eq!(app.state, AppState::Results);
        assert_eq!(app.session.result().unwrap().typed, "hello");
    }

    #[test]
    fn enter_before_typing_does_nothing() {
        let mut app = app_with(&["hello"], None);
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.state, AppState::Typing);
        assert!(!app.session.has_started());
    }

    #[test]
    fn esc_before_typing_quits() {
        let mut app = app_with(&["hello"], None);
        assert_eq!(app.handle_key(key(KeyCode::Esc)), Control::Quit);
    }

    #[test]
    fn esc_while_typing_ends_test() {
        let mut app = app_with(&["hello"], None);
        type_str(&mut app, "he");

        assert_eq!(app.handle_key(key(KeyCode::Esc)), Control::Continue);
        assert_eq!(app.state, AppState::Results);
    }

    #[test]
    fn ctrl_c_always_quits() {
        let mut app = app_with(&["hello"], None);
        type_str(&mut app, "he");
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);

        assert_eq!(app.handle_key(ctrl_c), Control::Quit);
        assert_eq!(app.session.typed(), "he");
    }

    #[test]
    fn countdown_expiry_shows_results() {
        let mut app = app_with(&["hello"], Some(1));
        type_str(&mut app, "h");

        app.on_tick();

        assert_eq!(app.state, AppState::Results);
        // further ticks are harmless
        app.on_tick();
        assert_eq!(app.state, AppState::Results);
    }

    #[test]
    fn retry_keeps_passage() {
        let mut app = app_with(&["ab", "cd"], None);
        type_str(&mut app, "ab");

        app.handle_key(key(KeyCode::Char('r')));

        assert_eq!(app.state, AppState::Typing);
        assert_eq!(app.session.passage(), "ab");
        assert!(!app.session.has_started());
    }

    #[test]
    fn next_walks_deck_then_completes() {
        let mut app = app_with(&["ab", "cd"], None);
        type_str(&mut app, "ab");

        app.handle_key(key(KeyCode::Char('n')));
        assert_eq!(app.state, AppState::Typing);
        assert_eq!(app.session.passage(), "cd");

        type_str(&mut app, "cd");
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.state, AppState::Completed);

        assert_eq!(app.handle_key(key(KeyCode::Char('x'))), Control::Continue);
        assert_eq!(app.handle_key(key(KeyCode::Char('q'))), Control::Quit);
    }

    #[test]
    fn results_are_logged_and_summarised() {
        let dir = tempdir().unwrap();
        let log = ResultsLog::with_path(dir.path().join("results.csv"));
        let mut app = app_with(&["ab"], None);
        app.settings.results_log = Some(log.clone());

        type_str(&mut app, "ab");
        app.handle_key(key(KeyCode::Char('r')));
        type_str(&mut app, "ax");

        assert_eq!(log.records().unwrap().len(), 2);
        let summary = app.summary.unwrap();
        assert_eq!(summary.sessions, 2);
    }
}
