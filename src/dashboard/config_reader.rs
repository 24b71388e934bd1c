use crate::dashboard::*;

use snafu::prelude::*;
use std::fs;

use csr_scoring::builder::Builder;
use csr_scoring::{LanguageConfig, Pillar, RecommendationRule, ScoringConfig, Vocabulary};
use serde::{Deserialize, Serialize};
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "dashboardName")]
    pub dashboard_name: Option<String>,
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct PillarSettings {
    pub name: String,
    pub label: Option<String>,
    pub weight: f64,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct VocabularySettings {
    pub affirmative: Vec<String>,
    pub negative: Vec<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationSettings {
    column: JSValue,
    pub text: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct LanguageSource {
    pub language: String,
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    pub vocabulary: VocabularySettings,
    /// pillar name -> list of columns
    columns: JSMap<String, JSValue>,
    /// field name -> column
    metadata: JSMap<String, JSValue>,
    #[serde(default)]
    recommendations: Vec<RecommendationSettings>,
}

impl LanguageSource {
    pub fn column_map(&self) -> DashboardResult<Vec<(String, Vec<usize>)>> {
        let mut res: Vec<(String, Vec<usize>)> = Vec::new();
        for (pillar, cols) in self.columns.iter() {
            let indexes = match cols {
                JSValue::Array(l) => l.iter().map(read_js_int).collect::<DashboardResult<Vec<usize>>>()?,
                x => {
                    return Err(DashboardError::ParsingColumnList {
                        language: self.language.clone(),
                        pillar: pillar.clone(),
                        content: x.to_string(),
                    })
                }
            };
            res.push((pillar.clone(), indexes));
        }
        Ok(res)
    }

    pub fn metadata_map(&self) -> DashboardResult<Vec<(String, usize)>> {
        self.metadata
            .iter()
            .map(|(field, idx)| Ok((field.clone(), read_js_int(idx)?)))
            .collect()
    }

    pub fn recommendation_rules(&self) -> DashboardResult<Vec<RecommendationRule>> {
        self.recommendations
            .iter()
            .map(|r| {
                Ok(RecommendationRule {
                    column: read_js_int(&r.column)?,
                    text: r.text.clone(),
                })
            })
            .collect()
    }

    pub fn language_config(&self) -> DashboardResult<LanguageConfig> {
        Ok(LanguageConfig {
            language: self.language.clone(),
            vocabulary: Vocabulary::new(&self.vocabulary.affirmative, &self.vocabulary.negative),
            columns: self.column_map()?,
            metadata: self.metadata_map()?,
            recommendations: self.recommendation_rules()?,
        })
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    pub pillars: Vec<PillarSettings>,
    pub languages: Vec<LanguageSource>,
}

pub fn read_config(path: &str) -> DashboardResult<DashboardConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: DashboardConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    Ok(config)
}

/// Checks the configuration once, before any response is scored.
pub fn validate_config(config: &DashboardConfig) -> DashboardResult<ScoringConfig> {
    let pillars: Vec<Pillar> = config
        .pillars
        .iter()
        .map(|p| Pillar {
            name: p.name.clone(),
            label: match p.label.clone() {
                Some(x) if !x.is_empty() => x,
                _ => p.name.clone(),
            },
            weight: p.weight,
        })
        .collect();

    let mut builder = Builder::new(&pillars).context(InvalidConfigSnafu {})?;
    for source in config.languages.iter() {
        builder = builder
            .language(source.language_config()?)
            .context(InvalidConfigSnafu {})?;
    }
    builder.build().context(InvalidConfigSnafu {})
}

/// Reads a column position. It may be given as:
/// - a number or a string with a number (0-based)
/// - an Excel-style column name: "A" is 0, "Z" is 25, "AA" is 26
pub fn read_js_int(x: &JSValue) -> DashboardResult<usize> {
    let res = match x {
        JSValue::Number(n) => n.as_u64().map(|x| x as usize),
        JSValue::String(s) if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic()) => {
            excel_column_index(s)
        }
        JSValue::String(s) => s.trim().parse::<usize>().ok(),
        _ => None,
    };
    res.context(ParsingColumnIndexSnafu {
        content: x.to_string(),
    })
}

fn excel_column_index(s: &str) -> Option<usize> {
    let mut acc: usize = 0;
    for c in s.to_ascii_uppercase().chars() {
        let digit = (c as usize) - ('A' as usize) + 1;
        acc = acc.checked_mul(26)?.checked_add(digit)?;
    }
    Some(acc - 1)
}
