use chrono::{DateTime, Local};
use std::time::Instant;

use crate::scorer::{self, Score};

/// Lifecycle of a test. Moves only forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Ready,
    Active,
    Finalized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum EndReason {
    /// the whole passage was typed
    Completed,
    /// the countdown reached zero
    TimeUp,
    /// the user ended the test early
    Stopped,
}

/// Positional outcome of a typed character, used for error highlighting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    Correct,
    Incorrect,
    /// typed past the end of the passage
    Extra,
}

#[derive(Debug, Clone)]
pub struct SessionResult {
    pub passage: String,
    pub typed: String,
    pub score: Score,
    pub reason: EndReason,
    pub finished_at: DateTime<Local>,
}

/// One attempt at typing a passage
#[derive(Debug, Clone)]
pub struct Session {
    passage: String,
    passage_len: usize,
    typed: String,
    typed_len: usize,
    phase: Phase,
    started_at: Option<Instant>,
    time_limit_secs: Option<u64>,
    seconds_remaining: Option<u64>,
    elapsed_ticks: u64,
    result: Option<SessionResult>,
}

impl Session {
    pub fn new(passage: impl Into<String>, time_limit_secs: Option<u64>) -> Self {
        let passage = passage.into();
        Self {
            passage_len: passage.chars().count(),
            passage,
            typed: String::new(),
            typed_len: 0,
            phase: Phase::Ready,
            started_at: None,
            time_limit_secs,
            seconds_remaining: time_limit_secs,
            elapsed_ticks: 0,
            result: None,
        }
    }

    pub fn start(&mut self) {
        self.start_at(Instant::now());
    }

    /// Starts the clock from `at`. Ignored unless the session is still ready.
    pub fn start_at(&mut self, at: Instant) {
        if self.phase != Phase::Ready {
            return;
        }
        self.started_at = Some(at);
        self.phase = Phase::Active;
        tracing::debug!(
            passage_chars = self.passage_len,
            time_limit = ?self.time_limit_secs,
            "session started"
        );
    }

    /// Records a keystroke. The first keystroke starts the clock. Returns the
    /// result if this keystroke completed the passage.
    pub fn type_char(&mut self, c: char) -> Option<&SessionResult> {
        match self.phase {
            Phase::Finalized => return None,
            Phase::Ready => self.start(),
            Phase::Active => {}
        }

        self.typed.push(c);
        self.typed_len += 1;

        if self.typed_len >= self.passage_len {
            return self.finalize(EndReason::Completed);
        }
        None
    }

    pub fn backspace(&mut self) {
        if self.phase == Phase::Active && self.typed.pop().is_some() {
            self.typed_len -= 1;
        }
    }

    /// One-second timer tick. Returns the result if the countdown expired.
    pub fn on_tick(&mut self) -> Option<&SessionResult> {
        if self.phase != Phase::Active {
            return None;
        }

        self.elapsed_ticks += 1;
        if let Some(remaining) = self.seconds_remaining.as_mut() {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                return self.finalize(EndReason::TimeUp);
            }
        }
        None
    }

    /// Ends the test on user request. Finishing an already finished session
    /// is a no-op that returns `None`.
    pub fn finish(&mut self) -> Option<&SessionResult> {
        self.finalize(EndReason::Stopped)
    }

    fn finalize(&mut self, reason: EndReason) -> Option<&SessionResult> {
        if self.phase == Phase::Finalized {
            return None;
        }
        self.phase = Phase::Finalized;

        let elapsed_secs = self
            .started_at
            .map_or(0.0, |s| s.elapsed().as_secs_f64());

        let score = scorer::score(&self.passage, &self.typed, elapsed_secs);
        tracing::info!(
            %reason,
            elapsed_secs,
            wpm = score.wpm,
            accuracy = score.accuracy,
            "session finalized"
        );

        self.result = Some(SessionResult {
            passage: self.passage.clone(),
            typed: self.typed.clone(),
            score,
            reason,
            finished_at: Local::now(),
        });
        self.result.as_ref()
    }

    /// Positional highlight for every typed character
    pub fn highlights(&self) -> Vec<Highlight> {
        let mut expected = self.passage.chars();
        self.typed
            .chars()
            .map(|c| match expected.next() {
                Some(e) if e == c => Highlight::Correct,
                Some(_) => Highlight::Incorrect,
                None => Highlight::Extra,
            })
            .collect()
    }

    pub fn passage(&self) -> &str {
        &self.passage
    }

    pub fn typed(&self) -> &str {
        &self.typed
    }

    /// Number of characters typed so far, which is also the cursor position
    pub fn cursor_pos(&self) -> usize {
        self.typed_len
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn has_started(&self) -> bool {
        self.phase != Phase::Ready
    }

    pub fn has_finished(&self) -> bool {
        self.phase == Phase::Finalized
    }

    pub fn time_limit_secs(&self) -> Option<u64> {
        self.time_limit_secs
    }

    pub fn seconds_remaining(&self) -> Option<u64> {
        self.seconds_remaining
    }

    /// Whole seconds counted by the timer since the session started
    pub fn elapsed_ticks(&self) -> u64 {
        self.elapsed_ticks
    }

    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }
}
