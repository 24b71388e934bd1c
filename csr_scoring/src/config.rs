// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The metadata field holding the name of the respondent (company name).
///
/// It is mandatory in every metadata map: the derived identifier is built from it.
pub const NAME_FIELD: &str = "name";

/// The metadata field holding the time at which the questionnaire was submitted.
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// The keys of a serialized score record, besides the name.
///
/// Metadata fields are written next to them, so they cannot take these names.
pub const RESERVED_FIELDS: [&str; 9] = [
    "id",
    "respondedAt",
    "language",
    "scoreGlobal",
    "level",
    "scoresByPillar",
    "strengths",
    "weaknesses",
    "recommendations",
];

/// The classification of a single answer cell.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Answer {
    /// The answer matches one of the affirmative tokens ("oui", "yes", ...)
    Affirmative,
    /// The answer matches one of the negative tokens ("non", "no", ...)
    Negative,
    /// Some text that is neither affirmative nor negative.
    /// This is treated as a partial engagement.
    FreeText,
    /// Missing cell, or a cell that only contains whitespace.
    Blank,
}

impl Answer {
    /// The numeric value of this answer: 1.0, 0.5 or 0.0.
    pub fn score(self) -> f64 {
        match self {
            Answer::Affirmative => 1.0,
            Answer::FreeText => 0.5,
            Answer::Negative | Answer::Blank => 0.0,
        }
    }
}

/// The tokens recognized as yes/no answers for one language.
///
/// Tokens are stored trimmed and lowercased, so that comparisons are case-insensitive.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Vocabulary {
    affirmative: Vec<String>,
    negative: Vec<String>,
}

impl Vocabulary {
    pub fn new<S: AsRef<str>>(affirmative: &[S], negative: &[S]) -> Vocabulary {
        Vocabulary {
            affirmative: affirmative
                .iter()
                .map(|s| normalize_token(s.as_ref()))
                .collect(),
            negative: negative
                .iter()
                .map(|s| normalize_token(s.as_ref()))
                .collect(),
        }
    }

    pub fn affirmative(&self) -> &[String] {
        &self.affirmative
    }

    pub fn negative(&self) -> &[String] {
        &self.negative
    }

    pub(crate) fn is_affirmative(&self, normalized: &str) -> bool {
        self.affirmative.iter().any(|t| t == normalized)
    }

    pub(crate) fn is_negative(&self, normalized: &str) -> bool {
        self.negative.iter().any(|t| t == normalized)
    }
}

pub(crate) fn normalize_token(s: &str) -> String {
    s.trim().to_lowercase()
}

/// A thematic pillar and its weight in the global score.
#[derive(PartialEq, Debug, Clone)]
pub struct Pillar {
    pub name: String,
    /// The display name. Defaults to the name when not provided.
    pub label: String,
    pub weight: f64,
}

impl Pillar {
    pub fn new(name: &str, label: &str, weight: f64) -> Pillar {
        Pillar {
            name: name.to_string(),
            label: label.to_string(),
            weight,
        }
    }
}

/// If the answer in `column` scores below 0.5, `text` is recommended to the respondent.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RecommendationRule {
    pub column: usize,
    pub text: String,
}

/// Everything that depends on the language of a questionnaire.
///
/// The column positions of the questions may differ between the language versions of the
/// same questionnaire, hence each language carries its own mapping.
#[derive(PartialEq, Debug, Clone)]
pub struct LanguageConfig {
    /// The language tag ("fr", "en", ...)
    pub language: String,
    pub vocabulary: Vocabulary,
    /// For each pillar name, the (0-based) column indexes of the questions of this pillar.
    pub columns: Vec<(String, Vec<usize>)>,
    /// For each metadata field, the (0-based) column index where it is found.
    pub metadata: Vec<(String, usize)>,
    /// The rules are evaluated in order. Only the first matches are kept.
    pub recommendations: Vec<RecommendationRule>,
}

impl LanguageConfig {
    /// The columns of the given pillar. Unknown pillars have no columns.
    pub fn pillar_columns(&self, pillar: &str) -> &[usize] {
        self.columns
            .iter()
            .find(|(name, _)| name == pillar)
            .map(|(_, cols)| cols.as_slice())
            .unwrap_or(&[])
    }

    pub fn metadata_column(&self, field: &str) -> Option<usize> {
        self.metadata
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, idx)| *idx)
    }

    /// The largest column index referenced by this configuration.
    ///
    /// Rows shorter than this index + 1 are still scored, but are a sign that the
    /// questionnaire has changed.
    pub fn max_column_index(&self) -> Option<usize> {
        let pillar_cols = self.columns.iter().flat_map(|(_, cols)| cols.iter().cloned());
        let meta_cols = self.metadata.iter().map(|(_, idx)| *idx);
        let reco_cols = self.recommendations.iter().map(|r| r.column);
        pillar_cols.chain(meta_cols).chain(reco_cols).max()
    }
}

// ******** Output data structures *********

/// The traffic light level of a respondent.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Level {
    Green,
    Amber,
    Red,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Green => "green",
            Level::Amber => "amber",
            Level::Red => "red",
        }
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The scores of one respondent.
#[derive(PartialEq, Debug, Clone)]
pub struct ScoreRecord {
    /// Derived from the name, see [`crate::derive_id`].
    pub id: String,
    pub name: String,
    /// All the metadata fields of the language configuration, in order, trimmed.
    /// Missing cells are empty strings.
    pub metadata: Vec<(String, String)>,
    pub responded_at: String,
    pub language: String,
    /// Between 0 and 100, with one decimal.
    pub score_global: f64,
    pub level: Level,
    /// One entry per pillar, in the order of the configuration.
    pub scores_by_pillar: Vec<(String, f64)>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
}

impl ScoreRecord {
    pub fn pillar_score(&self, pillar: &str) -> Option<f64> {
        self.scores_by_pillar
            .iter()
            .find(|(name, _)| name == pillar)
            .map(|(_, s)| *s)
    }
}

/// Statistics across all the respondents.
#[derive(PartialEq, Debug, Clone)]
pub struct CollectiveStats {
    pub avg_score: f64,
    /// One entry per pillar, in the order of the configuration.
    pub avg_by_pillar: Vec<(String, f64)>,
    pub count_green: usize,
    pub count_amber: usize,
    pub count_red: usize,
    pub top_pillar: String,
    pub weak_pillar: String,
}

// ********* Errors **********

/// Problems found while validating a scoring configuration.
///
/// They are all reported when the configuration is built, never while scoring.
#[derive(PartialEq, Debug, Clone)]
pub enum ConfigErrors {
    NoPillars,
    EmptyPillarName,
    DuplicatePillar(String),
    InvalidWeight { pillar: String, weight: f64 },
    WeightsDoNotSumToOne(f64),
    NoLanguages,
    DuplicateLanguage(String),
    UnknownPillar { language: String, pillar: String },
    MissingPillar { language: String, pillar: String },
    EmptyPillarColumns { language: String, pillar: String },
    MissingNameField { language: String },
    ReservedMetadataField { language: String, field: String },
    EmptyVocabulary { language: String },
    AmbiguousToken { language: String, token: String },
}

impl Error for ConfigErrors {}

impl Display for ConfigErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigErrors::NoPillars => write!(f, "no pillar is configured"),
            ConfigErrors::EmptyPillarName => write!(f, "a pillar has an empty name"),
            ConfigErrors::DuplicatePillar(p) => write!(f, "pillar {} is defined twice", p),
            ConfigErrors::InvalidWeight { pillar, weight } => write!(
                f,
                "pillar {} has weight {}, expected a value between 0 and 1",
                pillar, weight
            ),
            ConfigErrors::WeightsDoNotSumToOne(sum) => {
                write!(f, "the pillar weights sum to {}, expected 1.0", sum)
            }
            ConfigErrors::NoLanguages => write!(f, "no language is configured"),
            ConfigErrors::DuplicateLanguage(l) => write!(f, "language {} is defined twice", l),
            ConfigErrors::UnknownPillar { language, pillar } => write!(
                f,
                "language {}: columns are mapped to unknown pillar {}",
                language, pillar
            ),
            ConfigErrors::MissingPillar { language, pillar } => write!(
                f,
                "language {}: no columns are mapped to pillar {}",
                language, pillar
            ),
            ConfigErrors::EmptyPillarColumns { language, pillar } => write!(
                f,
                "language {}: pillar {} has an empty list of columns",
                language, pillar
            ),
            ConfigErrors::MissingNameField { language } => write!(
                f,
                "language {}: the metadata map has no '{}' field",
                language, NAME_FIELD
            ),
            ConfigErrors::ReservedMetadataField { language, field } => write!(
                f,
                "language {}: metadata field '{}' has the name of a score field",
                language, field
            ),
            ConfigErrors::EmptyVocabulary { language } => write!(
                f,
                "language {}: both affirmative and negative tokens must be provided",
                language
            ),
            ConfigErrors::AmbiguousToken { language, token } => write!(
                f,
                "language {}: token {:?} is both affirmative and negative",
                language, token
            ),
        }
    }
}

/// Errors when scoring with a validated configuration.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ScoringErrors {
    UnknownLanguage(String),
}

impl Error for ScoringErrors {}

impl Display for ScoringErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoringErrors::UnknownLanguage(l) => write!(f, "language {} is not configured", l),
        }
    }
}
