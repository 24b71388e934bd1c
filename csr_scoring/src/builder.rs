pub use crate::config::*;

use log::debug;
use std::collections::HashSet;

/// Tolerance used when checking that the weights sum to one.
const WEIGHT_EPSILON: f64 = 1e-6;

/// A validated scoring configuration: the pillars with their weights, and one
/// [`LanguageConfig`] per supported language.
///
/// It can only be created through the [`Builder`], which checks the structure once.
/// All the scoring functions can then assume that:
/// - the weights are between 0 and 1 and sum to 1
/// - every language maps every pillar to at least one column
/// - every language knows where to find the name of the respondent
#[derive(PartialEq, Debug, Clone)]
pub struct ScoringConfig {
    pub(crate) pillars: Vec<Pillar>,
    pub(crate) languages: Vec<LanguageConfig>,
}

impl ScoringConfig {
    /// The pillars, in the order of the configuration.
    pub fn pillars(&self) -> &[Pillar] {
        &self.pillars
    }

    pub fn pillar_names(&self) -> Vec<String> {
        self.pillars.iter().map(|p| p.name.clone()).collect()
    }

    /// The languages, in the order of the configuration.
    pub fn languages(&self) -> &[LanguageConfig] {
        &self.languages
    }

    pub fn language(&self, tag: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|l| l.language == tag)
    }
}

/// A builder for scoring configurations.
///
/// ```
/// use csr_scoring::builder::Builder;
/// use csr_scoring::{LanguageConfig, Pillar, RecommendationRule, Vocabulary};
/// # use csr_scoring::ConfigErrors;
///
/// let config = Builder::new(&[
///     Pillar::new("governance", "Governance", 0.6),
///     Pillar::new("environment", "Environment", 0.4),
/// ])?
/// .language(LanguageConfig {
///     language: "en".to_string(),
///     vocabulary: Vocabulary::new(&["yes"], &["no"]),
///     columns: vec![
///         ("governance".to_string(), vec![3, 4]),
///         ("environment".to_string(), vec![5]),
///     ],
///     metadata: vec![("timestamp".to_string(), 0), ("name".to_string(), 1)],
///     recommendations: vec![RecommendationRule {
///         column: 5,
///         text: "Track your energy consumption".to_string(),
///     }],
/// })?
/// .build()?;
///
/// assert_eq!(config.pillar_names(), vec!["governance", "environment"]);
/// # Ok::<(), ConfigErrors>(())
/// ```
pub struct Builder {
    pub(crate) _pillars: Vec<Pillar>,
    pub(crate) _languages: Vec<LanguageConfig>,
}

impl Builder {
    /// Starts a configuration with the given pillars.
    ///
    /// The order of the pillars is significant: it is the order of the scores in the
    /// records, and it breaks the ties when looking for the best and worst pillars.
    pub fn new(pillars: &[Pillar]) -> Result<Builder, ConfigErrors> {
        check_pillars(pillars)?;
        Ok(Builder {
            _pillars: pillars.to_vec(),
            _languages: Vec::new(),
        })
    }

    /// Adds the configuration of one language.
    ///
    /// The column map is reordered to follow the order of the pillars.
    pub fn language(self, lang: LanguageConfig) -> Result<Builder, ConfigErrors> {
        if self._languages.iter().any(|l| l.language == lang.language) {
            return Err(ConfigErrors::DuplicateLanguage(lang.language));
        }
        let checked = check_language(&self._pillars, lang)?;
        let mut languages = self._languages;
        languages.push(checked);
        Ok(Builder {
            _pillars: self._pillars,
            _languages: languages,
        })
    }

    pub fn build(self) -> Result<ScoringConfig, ConfigErrors> {
        if self._languages.is_empty() {
            return Err(ConfigErrors::NoLanguages);
        }
        Ok(ScoringConfig {
            pillars: self._pillars,
            languages: self._languages,
        })
    }
}

fn check_pillars(pillars: &[Pillar]) -> Result<(), ConfigErrors> {
    if pillars.is_empty() {
        return Err(ConfigErrors::NoPillars);
    }
    let mut seen: HashSet<&str> = HashSet::new();
    for p in pillars.iter() {
        if p.name.trim().is_empty() {
            return Err(ConfigErrors::EmptyPillarName);
        }
        if !seen.insert(p.name.as_str()) {
            return Err(ConfigErrors::DuplicatePillar(p.name.clone()));
        }
        if !(0.0..=1.0).contains(&p.weight) {
            return Err(ConfigErrors::InvalidWeight {
                pillar: p.name.clone(),
                weight: p.weight,
            });
        }
    }
    let total: f64 = pillars.iter().map(|p| p.weight).sum();
    if (total - 1.0).abs() > WEIGHT_EPSILON {
        return Err(ConfigErrors::WeightsDoNotSumToOne(total));
    }
    Ok(())
}

fn check_language(pillars: &[Pillar], lang: LanguageConfig) -> Result<LanguageConfig, ConfigErrors> {
    let language = lang.language.clone();

    for (pillar, _) in lang.columns.iter() {
        if !pillars.iter().any(|p| p.name == *pillar) {
            return Err(ConfigErrors::UnknownPillar {
                language,
                pillar: pillar.clone(),
            });
        }
    }

    // Same pillar set for every language, in the order of the pillars.
    let mut columns: Vec<(String, Vec<usize>)> = Vec::new();
    for p in pillars.iter() {
        let cols = lang
            .columns
            .iter()
            .find(|(name, _)| *name == p.name)
            .map(|(_, cols)| cols.clone());
        match cols {
            None => {
                return Err(ConfigErrors::MissingPillar {
                    language,
                    pillar: p.name.clone(),
                });
            }
            Some(cols) if cols.is_empty() => {
                return Err(ConfigErrors::EmptyPillarColumns {
                    language,
                    pillar: p.name.clone(),
                });
            }
            Some(cols) => columns.push((p.name.clone(), cols)),
        }
    }

    if lang.metadata_column(NAME_FIELD).is_none() {
        return Err(ConfigErrors::MissingNameField { language });
    }
    if let Some((field, _)) = lang
        .metadata
        .iter()
        .find(|(field, _)| RESERVED_FIELDS.contains(&field.as_str()))
    {
        return Err(ConfigErrors::ReservedMetadataField {
            language,
            field: field.clone(),
        });
    }

    let vocab = &lang.vocabulary;
    if vocab.affirmative().is_empty() || vocab.negative().is_empty() {
        return Err(ConfigErrors::EmptyVocabulary { language });
    }
    if let Some(token) = vocab.affirmative().iter().find(|t| vocab.is_negative(t)) {
        return Err(ConfigErrors::AmbiguousToken {
            language,
            token: token.clone(),
        });
    }

    debug!(
        "check_language: {}: {} pillars, {} metadata fields, {} recommendation rules",
        language,
        columns.len(),
        lang.metadata.len(),
        lang.recommendations.len()
    );

    Ok(LanguageConfig { columns, ..lang })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pillars() -> Vec<Pillar> {
        vec![
            Pillar::new("governance", "Governance", 0.5),
            Pillar::new("ethics", "Ethics", 0.3),
            Pillar::new("environment", "Environment", 0.2),
        ]
    }

    fn lang(tag: &str) -> LanguageConfig {
        LanguageConfig {
            language: tag.to_string(),
            vocabulary: Vocabulary::new(&["Yes"], &["No"]),
            // Deliberately not in pillar order.
            columns: vec![
                ("environment".to_string(), vec![7]),
                ("governance".to_string(), vec![3, 4]),
                ("ethics".to_string(), vec![5, 6]),
            ],
            metadata: vec![("timestamp".to_string(), 0), ("name".to_string(), 1)],
            recommendations: vec![],
        }
    }

    #[test]
    fn builds_and_reorders_columns() {
        let config = Builder::new(&pillars())
            .unwrap()
            .language(lang("en"))
            .unwrap()
            .language(lang("fr"))
            .unwrap()
            .build()
            .unwrap();
        let en = config.language("en").unwrap();
        let names: Vec<&str> = en.columns.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["governance", "ethics", "environment"]);
        assert_eq!(en.vocabulary.affirmative(), &["yes".to_string()]);
        assert_eq!(config.languages().len(), 2);
        assert!(config.language("de").is_none());
    }

    #[test]
    fn weights_must_sum_to_one() {
        let mut ps = pillars();
        ps[0].weight = 0.6;
        match Builder::new(&ps) {
            Err(ConfigErrors::WeightsDoNotSumToOne(s)) => assert!((s - 1.1).abs() < 1e-9),
            _ => panic!("expected a weight error"),
        }
    }

    #[test]
    fn float_noise_in_weights_is_accepted() {
        let ps = vec![
            Pillar::new("a", "A", 0.1),
            Pillar::new("b", "B", 0.2),
            Pillar::new("c", "C", 0.7),
        ];
        assert!(Builder::new(&ps).is_ok());
    }

    #[test]
    fn invalid_pillars() {
        assert_eq!(Builder::new(&[]).err(), Some(ConfigErrors::NoPillars));
        let dup = vec![Pillar::new("a", "A", 0.5), Pillar::new("a", "A", 0.5)];
        assert_eq!(
            Builder::new(&dup).err(),
            Some(ConfigErrors::DuplicatePillar("a".to_string()))
        );
        let neg = vec![Pillar::new("a", "A", 1.5), Pillar::new("b", "B", -0.5)];
        assert!(matches!(
            Builder::new(&neg).err(),
            Some(ConfigErrors::InvalidWeight { .. })
        ));
    }

    #[test]
    fn missing_and_empty_pillar_columns() {
        let b = Builder::new(&pillars()).unwrap();
        let mut l = lang("en");
        l.columns.retain(|(n, _)| n != "ethics");
        assert_eq!(
            b.language(l).err(),
            Some(ConfigErrors::MissingPillar {
                language: "en".to_string(),
                pillar: "ethics".to_string()
            })
        );

        let b = Builder::new(&pillars()).unwrap();
        let mut l = lang("en");
        l.columns[0].1.clear();
        assert_eq!(
            b.language(l).err(),
            Some(ConfigErrors::EmptyPillarColumns {
                language: "en".to_string(),
                pillar: "environment".to_string()
            })
        );
    }

    #[test]
    fn unknown_pillar_in_columns() {
        let b = Builder::new(&pillars()).unwrap();
        let mut l = lang("en");
        l.columns.push(("procurement".to_string(), vec![9]));
        assert!(matches!(
            b.language(l).err(),
            Some(ConfigErrors::UnknownPillar { .. })
        ));
    }

    #[test]
    fn languages_are_checked() {
        let b = Builder::new(&pillars()).unwrap();
        assert_eq!(b.build().err(), Some(ConfigErrors::NoLanguages));

        let b = Builder::new(&pillars()).unwrap().language(lang("en")).unwrap();
        assert_eq!(
            b.language(lang("en")).err(),
            Some(ConfigErrors::DuplicateLanguage("en".to_string()))
        );

        let mut l = lang("fr");
        l.metadata.retain(|(n, _)| n != NAME_FIELD);
        let b = Builder::new(&pillars()).unwrap();
        assert_eq!(
            b.language(l).err(),
            Some(ConfigErrors::MissingNameField {
                language: "fr".to_string()
            })
        );
    }

    #[test]
    fn reserved_metadata_fields() {
        let mut l = lang("en");
        l.metadata.push(("id".to_string(), 2));
        let b = Builder::new(&pillars()).unwrap();
        assert_eq!(
            b.language(l).err(),
            Some(ConfigErrors::ReservedMetadataField {
                language: "en".to_string(),
                field: "id".to_string()
            })
        );

        // Other fields, including the registration number, are accepted.
        let mut l = lang("en");
        l.metadata.push(("siret".to_string(), 2));
        l.metadata.push(("registration_id".to_string(), 3));
        assert!(Builder::new(&pillars()).unwrap().language(l).is_ok());
    }

    #[test]
    fn vocabulary_is_checked() {
        let mut l = lang("fr");
        l.vocabulary = Vocabulary::new(&["oui", "Non"], &["non"]);
        let b = Builder::new(&pillars()).unwrap();
        assert_eq!(
            b.language(l).err(),
            Some(ConfigErrors::AmbiguousToken {
                language: "fr".to_string(),
                token: "non".to_string()
            })
        );

        let mut l = lang("fr");
        let empty: [&str; 0] = [];
        l.vocabulary = Vocabulary::new(&["oui"], &empty);
        let b = Builder::new(&pillars()).unwrap();
        assert!(matches!(
            b.language(l).err(),
            Some(ConfigErrors::EmptyVocabulary { .. })
        ));
    }
}
