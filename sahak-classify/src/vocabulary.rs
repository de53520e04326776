use crate::ClassifyError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Label written on the first reply line when the model call failed.
pub const ERROR_LABEL: &str = "오류";

/// How a label line containing several category names is resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchStrategy {
    /// The category listed first in the vocabulary wins.
    #[default]
    FirstListed,
    /// The longest matching category wins; ties go to listing order.
    Longest,
}

/// Outcome of reading the label line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Label {
    Category(String),
    /// Nothing recognised; carries the page's fallback text.
    Fallback(String),
    /// The reply is an error sentinel.
    Error(String),
}

impl Label {
    pub fn as_str(&self) -> &str {
        match self {
            Label::Category(s) | Label::Fallback(s) | Label::Error(s) => s,
        }
    }

    pub fn is_category(&self) -> bool {
        matches!(self, Label::Category(_))
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reply split into its label and the free-text explanation below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReply {
    pub label: Label,
    pub explanation: String,
}

/// The ordered set of categories a page can assign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    categories: Vec<String>,
    fallback: String,
    error_label: String,
    strategy: MatchStrategy,
}

impl Vocabulary {
    pub const MIN_CATEGORIES: usize = 2;
    pub const MAX_CATEGORIES: usize = 6;

    /// Build a vocabulary. Categories must be non-empty, distinct and
    /// differ from the fallback; order is the match priority.
    pub fn new<I, S>(categories: I, fallback: impl Into<String>) -> Result<Self, ClassifyError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let categories: Vec<String> = categories.into_iter().map(Into::into).collect();
        let fallback = fallback.into();

        if !(Self::MIN_CATEGORIES..=Self::MAX_CATEGORIES).contains(&categories.len()) {
            return Err(ClassifyError::VocabularySize {
                got: categories.len(),
                min: Self::MIN_CATEGORIES,
                max: Self::MAX_CATEGORIES,
            });
        }
        if fallback.trim().is_empty() {
            return Err(ClassifyError::Vocabulary("fallback label is empty".into()));
        }
        let mut seen = HashSet::new();
        for category in &categories {
            if category.trim().is_empty() {
                return Err(ClassifyError::Vocabulary("empty category".into()));
            }
            if !seen.insert(category.as_str()) {
                return Err(ClassifyError::Vocabulary(format!("duplicate category `{category}`")));
            }
            if *category == fallback || category == ERROR_LABEL {
                return Err(ClassifyError::Vocabulary(format!(
                    "`{category}` is reserved for unclassified replies"
                )));
            }
        }

        Ok(Self {
            categories,
            fallback,
            error_label: ERROR_LABEL.to_string(),
            strategy: MatchStrategy::default(),
        })
    }

    pub fn with_strategy(mut self, strategy: MatchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn error_label(&self) -> &str {
        &self.error_label
    }

    pub fn strategy(&self) -> MatchStrategy {
        self.strategy
    }

    pub fn contains(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }

    /// Check a user guess before any lookup is made.
    pub fn validate_guess(&self, guess: &str) -> Result<String, ClassifyError> {
        let guess = guess.trim();
        if self.contains(guess) {
            Ok(guess.to_string())
        } else {
            Err(ClassifyError::UnknownGuess {
                guess: guess.to_string(),
                allowed: self.categories.join(", "),
            })
        }
    }

    /// Label carried by the first line of `reply`.
    ///
    /// Always one of the categories, the fallback or the error label.
    pub fn parse_label(&self, reply: &str) -> Label {
        let (first, _) = split_reply(reply);
        let hit = match self.strategy {
            MatchStrategy::FirstListed => self.categories.iter().find(|c| first.contains(c.as_str())),
            MatchStrategy::Longest => {
                let mut best: Option<&String> = None;
                for c in self.categories.iter().filter(|c| first.contains(c.as_str())) {
                    if best.map_or(true, |b| c.chars().count() > b.chars().count()) {
                        best = Some(c);
                    }
                }
                best
            }
        };

        match hit {
            Some(category) => Label::Category(category.clone()),
            None if first.contains(self.error_label.as_str()) => Label::Error(self.error_label.clone()),
            None => Label::Fallback(self.fallback.clone()),
        }
    }

    pub fn parse(&self, reply: &str) -> ParsedReply {
        let (_, rest) = split_reply(reply);
        ParsedReply {
            label: self.parse_label(reply),
            explanation: rest.to_string(),
        }
    }
}

/// Trim `reply` and split it at the first newline.
pub fn split_reply(reply: &str) -> (&str, &str) {
    let reply = reply.trim();
    reply.split_once('\n').unwrap_or((reply, ""))
}
