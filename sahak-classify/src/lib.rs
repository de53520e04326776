//! Person classification against a fixed category vocabulary.
//!
//! A [`pipeline::Pipeline`] performs one lookup on a
//! [`sahak_web::DocumentSource`], renders the page's
//! [`prompt::PromptTemplate`], asks the model once through
//! [`classifier::Classifier`], reads the label off the first reply line with
//! [`vocabulary::Vocabulary`] and compares it with the user's guess
//! ([`verdict::Verdict`]). [`pages`] holds the built-in presets and
//! [`profile`] the free-form world-history summary.
//!
//! ```
//! use sahak_classify::vocabulary::{Label, Vocabulary};
//! use sahak_classify::verdict::Verdict;
//!
//! let vocab = Vocabulary::new(["무장투쟁론", "외교독립론", "친일파"], "기타").unwrap();
//! let parsed = vocab.parse("최종 분류: 친일파\n상세 내용...");
//! assert_eq!(parsed.label, Label::Category("친일파".into()));
//! assert_eq!(Verdict::compare(&parsed.label, "무장투쟁론"), Verdict::Mismatch);
//! ```

use thiserror::Error;

pub mod classifier;
pub mod pages;
pub mod pipeline;
pub mod profile;
pub mod prompt;
pub mod verdict;
pub mod vocabulary;

pub use classifier::{Classification, Classifier};
pub use pages::{PageId, PagePreset};
pub use pipeline::{Assessment, Pipeline, PipelineSettings};
pub use profile::{Profile, Profiler};
pub use verdict::Verdict;
pub use vocabulary::{Label, MatchStrategy, Vocabulary};

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("a vocabulary needs between {min} and {max} categories, got {got}")]
    VocabularySize { got: usize, min: usize, max: usize },

    #[error("invalid vocabulary: {0}")]
    Vocabulary(String),

    #[error("`{guess}` is not a category of this page (expected one of: {allowed})")]
    UnknownGuess { guess: String, allowed: String },

    #[error("a person's name is required")]
    EmptyName,

    #[error("unknown page `{0}`")]
    UnknownPage(String),

    #[error("no article found for `{0}`")]
    NotFound(String),

    #[error(transparent)]
    Source(#[from] sahak_web::SourceError),
}
