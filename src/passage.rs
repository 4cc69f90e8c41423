use clap::ValueEnum;
use include_dir::{include_dir, Dir};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::from_str;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PassageError;

static PASSAGE_DIR: Dir = include_dir!("src/passages");

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, ValueEnum, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Bengali,
}

impl Language {
    fn file_name(&self) -> String {
        format!("{}.json", self.to_string().to_lowercase())
    }
}

/// A bundled set of passages as stored on disk
#[derive(Deserialize, Clone, Debug)]
pub struct PassageSet {
    pub name: String,
    pub passages: Vec<String>,
}

/// Where the reference texts for a test come from
pub trait PassageSource {
    fn passages(&self, language: Language) -> Result<Vec<String>, PassageError>;
}

/// Passages compiled into the binary
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinPassages;

impl PassageSource for BuiltinPassages {
    fn passages(&self, language: Language) -> Result<Vec<String>, PassageError> {
        let file = PASSAGE_DIR
            .get_file(language.file_name())
            .ok_or_else(|| PassageError::UnknownLanguage(language.to_string()))?;

        let contents = file
            .contents_utf8()
            .ok_or_else(|| PassageError::UnknownLanguage(language.to_string()))?;

        let set: PassageSet = from_str(contents)?;
        non_empty(set.name, set.passages)
    }
}

/// Plain text file with one passage per non-blank line. The language is
/// ignored: the file is whatever the user chose to practise.
#[derive(Debug, Clone)]
pub struct FilePassages {
    path: PathBuf,
}

impl FilePassages {
    pub fn new<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl PassageSource for FilePassages {
    fn passages(&self, _language: Language) -> Result<Vec<String>, PassageError> {
        let text = fs::read_to_string(&self.path)?;
        let passages = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect();
        non_empty(self.path.display().to_string(), passages)
    }
}

/// A single passage given on the command line
#[derive(Debug, Clone)]
pub struct CustomPassage(pub String);

impl PassageSource for CustomPassage {
    fn passages(&self, _language: Language) -> Result<Vec<String>, PassageError> {
        non_empty("custom".to_string(), vec![self.0.trim().to_string()])
    }
}

fn non_empty(name: String, passages: Vec<String>) -> Result<Vec<String>, PassageError> {
    if passages.iter().all(|p| p.is_empty()) {
        return Err(PassageError::Empty(name));
    }
    Ok(passages.into_iter().filter(|p| !p.is_empty()).collect())
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Selection {
    /// walk the passages in order, finishing after the last one
    Sequential,
    /// pick uniformly at random, never runs out
    #[default]
    Random,
}

/// The passages of a run and which one is in play.
#[derive(Debug, Clone)]
pub struct PassageDeck {
    passages: Vec<String>,
    selection: Selection,
    current: usize,
}

impl PassageDeck {
    /// `passages` must be non-empty, which every [`PassageSource`] guarantees.
    pub fn new(passages: Vec<String>, selection: Selection) -> Result<Self, PassageError> {
        if passages.is_empty() {
            return Err(PassageError::Empty("deck".to_string()));
        }

        let mut deck = Self {
            passages,
            selection,
            current: 0,
        };
        if selection == Selection::Random {
            deck.current = deck.random_index();
        }
        Ok(deck)
    }

    pub fn load(
        source: &dyn PassageSource,
        language: Language,
        selection: Selection,
    ) -> Result<Self, PassageError> {
        Self::new(source.passages(language)?, selection)
    }

    pub fn current(&self) -> &str {
        &self.passages[self.current]
    }

    /// Advances to another passage. Returns `None` once a sequential deck
    /// has shown its last passage; the deck then stays on that passage.
    pub fn advance(&mut self) -> Option<&str> {
        match self.selection {
            Selection::Sequential => {
                if self.current + 1 >= self.passages.len() {
                    return None;
                }
                self.current += 1;
            }
            Selection::Random => self.current = self.random_index(),
        }
        Some(self.current())
    }

    /// 1-based position of the current passage
    pub fn position(&self) -> usize {
        self.current + 1
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    fn random_index(&self) -> usize {
        rand::thread_rng().gen_range(0..self.passages.len())
    }
}
