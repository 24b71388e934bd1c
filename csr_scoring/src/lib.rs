pub mod builder;
mod config;
pub mod manual;
pub mod quick_start;

use log::{debug, info};

pub use crate::builder::ScoringConfig;
pub use crate::config::*;

/// Global score from which a respondent is green.
pub const GREEN_THRESHOLD: f64 = 67.0;
/// Global score from which a respondent is amber (below it is red).
pub const AMBER_THRESHOLD: f64 = 34.0;
/// A pillar scoring at least this much is a strength.
pub const STRENGTH_THRESHOLD: f64 = 80.0;
/// A pillar scoring strictly less than this is a weakness.
pub const WEAKNESS_THRESHOLD: f64 = 50.0;
/// Maximum number of recommendations for one respondent.
pub const MAX_RECOMMENDATIONS: usize = 5;
/// Maximum length (in characters) of a derived identifier.
pub const MAX_ID_LEN: usize = 50;

/// Rounds to one decimal. Values exactly halfway round to the even digit: 61.25 gives 61.2,
/// 63.75 gives 63.8.
///
/// The halfway test is done on the stored value, not on its decimal rendering: 0.15 is
/// stored slightly below 0.15 and gives 0.1.
pub fn round1(x: f64) -> f64 {
    let y = x * 10.0;
    let rounded = if (y - y.trunc()).abs() != 0.5 {
        y.round()
    } else {
        // Exact rounding error of the product.
        let err = x.mul_add(10.0, -y);
        if err > 0.0 {
            y.ceil()
        } else if err < 0.0 {
            y.floor()
        } else {
            y.round_ties_even()
        }
    };
    rounded / 10.0
}

/// The content of a cell, if the row is long enough to have it.
fn cell<S: AsRef<str>>(row: &[S], idx: usize) -> Option<&str> {
    row.get(idx).map(|s| s.as_ref())
}

/// Classifies a single answer.
///
/// The comparison with the vocabulary is done on the trimmed, lowercased value.
pub fn classify_answer(value: Option<&str>, vocabulary: &Vocabulary) -> Answer {
    match value.map(normalize_token) {
        None => Answer::Blank,
        Some(v) if v.is_empty() => Answer::Blank,
        Some(v) if vocabulary.is_affirmative(&v) => Answer::Affirmative,
        Some(v) if vocabulary.is_negative(&v) => Answer::Negative,
        Some(_) => Answer::FreeText,
    }
}

/// The score of a single answer: 1.0 (yes), 0.5 (free text) or 0.0 (no, blank).
pub fn score_answer(value: Option<&str>, vocabulary: &Vocabulary) -> f64 {
    classify_answer(value, vocabulary).score()
}

/// The score of a pillar between 0 and 100, rounded to one decimal.
///
/// It is the mean of the scores of the answers in the given columns. Columns past the
/// end of the row count as blank answers. No columns means no credit: the score is 0.
pub fn score_pillar<S: AsRef<str>>(row: &[S], columns: &[usize], vocabulary: &Vocabulary) -> f64 {
    if columns.is_empty() {
        return 0.0;
    }
    let total: f64 = columns
        .iter()
        .map(|idx| score_answer(cell(row, *idx), vocabulary))
        .sum();
    round1(total / (columns.len() as f64) * 100.0)
}

/// The traffic light level associated to a global score.
pub fn get_level(score: f64) -> Level {
    if score >= GREEN_THRESHOLD {
        Level::Green
    } else if score >= AMBER_THRESHOLD {
        Level::Amber
    } else {
        Level::Red
    }
}

/// Identifier derived from a name: lowercase, spaces and slashes replaced by dashes,
/// at most 50 characters.
pub fn derive_id(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '/' { '-' } else { c })
        .take(MAX_ID_LEN)
        .collect()
}

/// The trimmed content of a metadata field, or an empty string.
fn metadata_value<S: AsRef<str>>(row: &[S], lang: &LanguageConfig, field: &str) -> String {
    lang.metadata_column(field)
        .and_then(|idx| cell(row, idx))
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Scores one respondent.
///
/// This function never fails: short rows and missing cells count as blank answers and
/// empty metadata. Rows without a name should be filtered out by the caller beforehand.
///
/// Arguments:
/// * `row` the cells of the response, in the order of the questionnaire columns
/// * `pillars` the pillars with their weights (expected to sum to 1)
/// * `lang` the column mappings of the language of this response
pub fn score_respondent<S: AsRef<str>>(
    row: &[S],
    pillars: &[Pillar],
    lang: &LanguageConfig,
) -> ScoreRecord {
    let vocabulary = &lang.vocabulary;

    let scores_by_pillar: Vec<(String, f64)> = pillars
        .iter()
        .map(|p| {
            let cols = lang.pillar_columns(&p.name);
            (p.name.clone(), score_pillar(row, cols, vocabulary))
        })
        .collect();

    let weighted: f64 = pillars
        .iter()
        .zip(scores_by_pillar.iter())
        .map(|(p, (_, s))| p.weight * s)
        .sum();
    let score_global = round1(weighted);
    let level = get_level(score_global);

    let strengths: Vec<String> = scores_by_pillar
        .iter()
        .filter(|(_, s)| *s >= STRENGTH_THRESHOLD)
        .map(|(p, _)| p.clone())
        .collect();
    let weaknesses: Vec<String> = scores_by_pillar
        .iter()
        .filter(|(_, s)| *s < WEAKNESS_THRESHOLD)
        .map(|(p, _)| p.clone())
        .collect();

    // Only clear "no" and missing answers trigger a recommendation, not free text.
    // A column past the end of the row is a missing answer.
    let recommendations: Vec<String> = lang
        .recommendations
        .iter()
        .filter(|rule| score_answer(cell(row, rule.column), vocabulary) < 0.5)
        .take(MAX_RECOMMENDATIONS)
        .map(|rule| rule.text.clone())
        .collect();

    let metadata: Vec<(String, String)> = lang
        .metadata
        .iter()
        .map(|(field, _)| (field.clone(), metadata_value(row, lang, field)))
        .collect();
    let name = metadata_value(row, lang, NAME_FIELD);
    let responded_at = metadata_value(row, lang, TIMESTAMP_FIELD);

    debug!(
        "score_respondent: {:?} ({}): global {} {:?} pillars {:?}",
        name, lang.language, score_global, level, scores_by_pillar
    );

    ScoreRecord {
        id: derive_id(&name),
        name,
        metadata,
        responded_at,
        language: lang.language.clone(),
        score_global,
        level,
        scores_by_pillar,
        strengths,
        weaknesses,
        recommendations,
    }
}

/// Computes the statistics over all the respondents.
///
/// Returns `None` when there is no respondent: there is no meaningful average then.
///
/// The best and worst pillars are the ones with the highest and lowest average.
/// Ties are broken by the order of `pillars`: the first one wins.
pub fn compute_collective_stats(records: &[ScoreRecord], pillars: &[Pillar]) -> Option<CollectiveStats> {
    if records.is_empty() {
        return None;
    }
    info!(
        "compute_collective_stats: {} respondents, {} pillars",
        records.len(),
        pillars.len()
    );

    let n = records.len() as f64;
    let avg_score = round1(records.iter().map(|r| r.score_global).sum::<f64>() / n);

    let avg_by_pillar: Vec<(String, f64)> = pillars
        .iter()
        .map(|p| {
            let scores: Vec<f64> = records
                .iter()
                .filter_map(|r| r.pillar_score(&p.name))
                .collect();
            let avg = if scores.is_empty() {
                0.0
            } else {
                round1(scores.iter().sum::<f64>() / (scores.len() as f64))
            };
            (p.name.clone(), avg)
        })
        .collect();

    let count_level = |level: Level| records.iter().filter(|r| r.level == level).count();

    // Strict comparisons: the first pillar with the extremal value is kept.
    let mut top: Option<&(String, f64)> = None;
    let mut weak: Option<&(String, f64)> = None;
    for entry in avg_by_pillar.iter() {
        match top {
            Some((_, best)) if entry.1 <= *best => {}
            _ => top = Some(entry),
        }
        match weak {
            Some((_, worst)) if entry.1 >= *worst => {}
            _ => weak = Some(entry),
        }
    }

    Some(CollectiveStats {
        avg_score,
        count_green: count_level(Level::Green),
        count_amber: count_level(Level::Amber),
        count_red: count_level(Level::Red),
        top_pillar: top.map(|(p, _)| p.clone()).unwrap_or_default(),
        weak_pillar: weak.map(|(p, _)| p.clone()).unwrap_or_default(),
        avg_by_pillar,
    })
}

/// Sorts the records by decreasing global score.
///
/// The sort is stable: records with the same score keep their relative order.
pub fn sort_by_score(records: &mut [ScoreRecord]) {
    records.sort_by(|a, b| b.score_global.total_cmp(&a.score_global));
}

impl ScoringConfig {
    /// Scores one respondent using the configuration of the given language.
    pub fn score_respondent<S: AsRef<str>>(
        &self,
        row: &[S],
        language: &str,
    ) -> Result<ScoreRecord, ScoringErrors> {
        let lang = self
            .language(language)
            .ok_or_else(|| ScoringErrors::UnknownLanguage(language.to_string()))?;
        Ok(score_respondent(row, &self.pillars, lang))
    }

    pub fn compute_collective_stats(&self, records: &[ScoreRecord]) -> Option<CollectiveStats> {
        compute_collective_stats(records, &self.pillars)
    }
}
