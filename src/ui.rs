use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::{
    app::{App, AppState},
    history::HistorySummary,
    passage::Selection,
    session::{Highlight, Session, SessionResult},
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Typing => render_typing(self, area, buf),
            AppState::Results => match self.session.result() {
                Some(result) => render_results(result, self.summary.as_ref(), area, buf),
                None => render_typing(self, area, buf),
            },
            AppState::Completed => render_completed(area, buf),
        }
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim_bold() -> Style {
    bold().add_modifier(Modifier::DIM)
}

/// Coloured spans for the passage: typed characters by outcome, the cursor,
/// then the untyped remainder.
pub fn passage_spans(session: &Session) -> Vec<Span<'static>> {
    let green_bold_style = bold().fg(Color::Green);
    let red_bold_style = bold().fg(Color::Red);
    let extra_style = red_bold_style.add_modifier(Modifier::CROSSED_OUT);

    let mut spans = session
        .passage()
        .chars()
        .map(Some)
        .chain(std::iter::repeat(None))
        .zip(session.typed().chars())
        .zip(session.highlights())
        .chunk_by(|(_, highlight)| *highlight)
        .into_iter()
        .map(|(highlight, run)| {
            let text: String = run
                .map(|((expected, typed), _)| match highlight {
                    Highlight::Correct => expected.unwrap_or(typed),
                    // make mistyped spaces visible
                    Highlight::Incorrect | Highlight::Extra if typed == ' ' => '·',
                    Highlight::Incorrect | Highlight::Extra => typed,
                })
                .collect();
            let style = match highlight {
                Highlight::Correct => green_bold_style,
                Highlight::Incorrect => red_bold_style,
                Highlight::Extra => extra_style,
            };
            Span::styled(text, style)
        })
        .collect::<Vec<Span>>();

    let mut rest = session.passage().chars().skip(session.cursor_pos());
    if let Some(cursor) = rest.next() {
        spans.push(Span::styled(
            cursor.to_string(),
            dim_bold().add_modifier(Modifier::UNDERLINED),
        ));
    }
    let remainder: String = rest.collect();
    if !remainder.is_empty() {
        spans.push(Span::styled(remainder, dim_bold()));
    }

    spans
}

fn timer_text(session: &Session) -> String {
    match session.seconds_remaining() {
        Some(remaining) => format!("Time Remaining: {remaining} seconds"),
        None => format!("Time: {}s", session.elapsed_ticks()),
    }
}

fn render_typing(app: &App, area: Rect, buf: &mut Buffer) {
    let session = &app.session;
    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let passage_width = u16::try_from(session.passage().width()).unwrap_or(u16::MAX);
    let prompt_occupied_lines = if passage_width <= max_chars_per_line {
        1
    } else {
        passage_width.div_ceil(max_chars_per_line).saturating_add(1)
    };
    let padding = area.height.saturating_sub(prompt_occupied_lines.saturating_add(4)) / 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(padding),
            Constraint::Length(2),
            Constraint::Length(prompt_occupied_lines),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let mut header = timer_text(session);
    if app.deck.selection() == Selection::Sequential {
        header.push_str(&format!("   passage {}/{}", app.deck.position(), app.deck.len()));
    }
    Paragraph::new(Span::styled(header, dim_bold()))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    Paragraph::new(Line::from(passage_spans(session)))
        .alignment(if prompt_occupied_lines == 1 {
            // a passage that fits on one line reads best centred
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: true })
        .render(chunks[2], buf);

    let legend = if session.has_started() {
        "(enter) finish / (esc) finish"
    } else {
        "start typing / (esc)ape"
    };
    Paragraph::new(Span::styled(
        legend,
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .render(chunks[4], buf);
}

fn results_lines(result: &SessionResult, summary: Option<&HistorySummary>) -> Vec<String> {
    let score = &result.score;
    let mut lines = vec![
        format!("Time taken: {:.2} seconds", score.elapsed_secs),
        format!("Typing speed: {:.2} words per minute", score.wpm),
        format!("Accuracy: {:.2}%", score.accuracy),
        format!("Positional accuracy: {:.2}%", score.positional_accuracy),
    ];
    if let Some(s) = summary {
        lines.push(format!(
            "{} tests logged   best {:.0} wpm   mean {:.1} wpm   sd {:.1}",
            s.sessions, s.best_wpm, s.mean_wpm, s.wpm_std_dev
        ));
    }
    lines
}

fn render_results(
    result: &SessionResult,
    summary: Option<&HistorySummary>,
    area: Rect,
    buf: &mut Buffer,
) {
    let lines = results_lines(result, summary);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(lines.len() as u16),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let stats: Vec<Line> = lines
        .into_iter()
        .enumerate()
        .map(|(i, l)| {
            // history summary is secondary information
            let style = if i < 4 {
                bold()
            } else {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::ITALIC)
            };
            Line::from(Span::styled(l, style))
        })
        .collect();

    Paragraph::new(stats)
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        "(r)etry / (n)ext / (q)uit",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .render(chunks[3], buf);
}

fn render_completed(area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    Paragraph::new(Span::styled(
        "You have completed all passages!",
        bold().fg(Color::Magenta),
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        "(q)uit",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .render(chunks[3], buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppSettings;
    use crate::passage::{Language, PassageDeck};

    fn create_test_app(passages: &[&str], time_limit_secs: Option<u64>) -> App {
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

    fn render_to_string(app: &App, area: Rect) -> String {
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        buffer
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    fn span_text(spans: &[Span]) -> Vec<String> {
        spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn test_ui_typing_shows_passage_and_timer() {
        let app = create_test_app(&["hello world"], Some(60));

        let rendered = render_to_string(&app, Rect::new(0, 0, 80, 24));

        assert!(rendered.contains("hello world"));
        assert!(rendered.contains("Time Remaining: 60 seconds"));
        assert!(rendered.contains("passage 1/1"));
    }

    #[test]
    fn test_ui_untimed_shows_elapsed() {
        let mut app = create_test_app(&["hello world"], None);
        app.session.start();
        app.on_tick();

        let rendered = render_to_string(&app, Rect::new(0, 0, 80, 24));

        assert!(rendered.contains("Time: 1s"));
    }

    #[test]
    fn test_passage_spans_group_by_outcome() {
        let mut session = Session::new("hello", None);
        for c in "hex".chars() {
            session.type_char(c);
        }

        let spans = passage_spans(&session);

        assert_eq!(span_text(&spans), vec!["he", "x", "l", "o"]);
        assert_eq!(spans[0].style.fg, Some(Color::Green));
        assert_eq!(spans[1].style.fg, Some(Color::Red));
        assert!(spans[2].style.add_modifier.contains(Modifier::UNDERLINED));
    }

    #[test]
    fn test_passage_spans_mistyped_space_is_visible() {
        let mut session = Session::new("a b", None);
        session.type_char(' ');

        let spans = passage_spans(&session);

        assert_eq!(spans[0].content, "·");
    }

    #[test]
    fn test_ui_results() {
        let mut app = create_test_app(&["kitten"], None);
        for c in "sittin".chars() {
            app.handle_key(crossterm::event::KeyEvent::new(
                crossterm::event::KeyCode::Char(c),
                crossterm::event::KeyModifiers::NONE,
            ));
        }
        assert_eq!(app.state, AppState::Results);

        let rendered = render_to_string(&app, Rect::new(0, 0, 80, 24));

        assert!(rendered.contains("Time taken:"));
        assert!(rendered.contains("words per minute"));
        assert!(rendered.contains("Accuracy: 66.67%"));
        assert!(rendered.contains("(r)etry / (n)ext / (q)uit"));
    }

    #[test]
    fn test_results_lines_with_summary() {
        let mut session = Session::new("ab", None);
        session.type_char('a');
        session.type_char('b');
        let summary = HistorySummary {
            sessions: 3,
            best_wpm: 61.0,
            mean_wpm: 48.25,
            wpm_std_dev: 5.0,
        };

        let lines = results_lines(session.result().unwrap(), Some(&summary));

        assert_eq!(lines.len(), 5);
        assert_eq!(lines[2], "Accuracy: 100.00%");
        assert!(lines[4].starts_with("3 tests logged"));
    }

    #[test]
    fn test_ui_passage_wider_than_u16() {
        let huge = "word ".repeat(20_000);
        let app = create_test_app(&[huge.trim_end()], None);
        let rendered = render_to_string(&app, Rect::new(0, 0, 80, 24));

        assert!(rendered.contains("word word"));
    }

    #[test]
    fn test_ui_completed() {
        let mut app = create_test_app(&["a"], None);
        app.state = AppState::Completed;

        let rendered = render_to_string(&app, Rect::new(0, 0, 80, 24));

        assert!(rendered.contains("You have completed all passages!"));
    }

    #[test]
    fn test_ui_widget_small_area() {
        let app = create_test_app(&["hello"], None);
        let area = Rect::new(0, 0, 8, 3);
        let mut buffer = Buffer::empty(area);

        (&app).render(area, &mut buffer);

        assert_eq!(*buffer.area(), area);
    }

    #[test]
    fn test_ui_widget_large_prompt() {
        let large_prompt = "This is a very long passage that should wrap across multiple lines when rendered in the terminal interface";
        let app = create_test_app(&[large_prompt], None);
        let area = Rect::new(0, 0, 40, 20);
        let mut buffer = Buffer::empty(area);

        (&app).render(area, &mut buffer);

        assert_eq!(*buffer.area(), area);
    }
}
