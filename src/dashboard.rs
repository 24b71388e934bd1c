use log::{debug, info, warn};

use csr_scoring::{ScoreRecord, ScoringConfig};
use snafu::{prelude::*, Snafu};

use std::path::{Path, PathBuf};

use serde_json::Value as JSValue;

use crate::dashboard::config_reader::*;
use crate::dashboard::io_common::{count_short_rows, select_respondent_rows};
use crate::dashboard::output::*;

pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_xlsx;
pub mod output;

#[derive(Debug, Snafu)]
pub enum DashboardError {
    #[snafu(display("No configuration file provided (use --config)"))]
    MissingConfig {},
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the JSON file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Could not understand the column index {content}"))]
    ParsingColumnIndex { content: String },
    #[snafu(display("Language {language}: the columns of pillar {pillar} must be a list, got {content}"))]
    ParsingColumnList {
        language: String,
        pillar: String,
        content: String,
    },
    #[snafu(display("Invalid scoring configuration: {source}"))]
    InvalidConfig { source: csr_scoring::ConfigErrors },
    #[snafu(display("Scoring error: {source}"))]
    Scoring { source: csr_scoring::ScoringErrors },
    #[snafu(display("Malformed input option {content}, expected language=path"))]
    InputOverride { content: String },
    #[snafu(display("Input option given for language {language}, which is not configured"))]
    InputOverrideLanguage { language: String },
    #[snafu(display("Provider {provider} is not supported (language {language})"))]
    UnknownProvider { provider: String, language: String },
    #[snafu(display("Error opening the CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of the CSV file"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The Excel file {path} has no worksheet"))]
    EmptyExcel { path: String },
    #[snafu(display("Cannot find worksheet {worksheet_name} in {path}"))]
    MissingWorksheet {
        worksheet_name: String,
        path: String,
    },
    #[snafu(display(
        "The Excel file {path} has several worksheets, excelWorksheetName must be provided"
    ))]
    AmbiguousWorksheet { path: String },
    #[snafu(display("Error serializing the document"))]
    WritingJson { source: serde_json::Error },
    #[snafu(display("Error writing {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type DashboardResult<T> = Result<T, DashboardError>;

/// The raw rows read for one language, header included.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct LanguageRows {
    pub language: String,
    pub rows: Vec<Vec<String>>,
}

/// Parses the `language=path` options of the command line.
fn parse_input_overrides(
    inputs: &[String],
    scoring: &ScoringConfig,
) -> DashboardResult<Vec<(String, String)>> {
    let mut res: Vec<(String, String)> = Vec::new();
    for s in inputs.iter() {
        let (language, path) = match s.split_once('=') {
            Some((l, p)) if !l.trim().is_empty() && !p.trim().is_empty() => {
                (l.trim().to_string(), p.trim().to_string())
            }
            _ => {
                return Err(DashboardError::InputOverride { content: s.clone() });
            }
        };
        ensure!(
            scoring.language(&language).is_some(),
            InputOverrideLanguageSnafu { language }
        );
        res.push((language, path));
    }
    Ok(res)
}

fn read_responses(path: &Path, source: &LanguageSource) -> DashboardResult<Vec<Vec<String>>> {
    let p = path.display().to_string();
    info!("Reading responses for {} from {:?}", source.language, p);
    match source.provider.as_str() {
        "csv" => io_csv::read_csv_rows(&p),
        "xlsx" | "excel" => io_xlsx::read_xlsx_rows(&p, source.excel_worksheet_name.as_deref()),
        x => UnknownProviderSnafu {
            provider: x,
            language: source.language.clone(),
        }
        .fail(),
    }
}

/// Scores all the respondents and builds the content of the data file.
///
/// For each language, the header row, the blank rows and the rows without a name
/// are dropped before scoring.
pub fn build_data(
    scoring: &ScoringConfig,
    sources: &[LanguageRows],
    dashboard_name: Option<&str>,
    last_updated: &str,
) -> DashboardResult<JSValue> {
    let mut records: Vec<ScoreRecord> = Vec::new();
    let mut per_language: Vec<(String, usize)> = Vec::new();

    for src in sources.iter() {
        let lang = scoring
            .language(&src.language)
            .context(InputOverrideLanguageSnafu {
                language: src.language.clone(),
            })?;
        // Every configured metadata map has a name column.
        let name_idx = lang
            .metadata_column(csr_scoring::NAME_FIELD)
            .unwrap_or_default();
        let rows = select_respondent_rows(&src.rows, name_idx);

        if let Some(max_idx) = lang.max_column_index() {
            let short = count_short_rows(&rows, max_idx + 1);
            if short > 0 {
                warn!(
                    "{}: {} rows have less than {} columns, the questionnaire may have changed. Missing answers count as blank.",
                    src.language,
                    short,
                    max_idx + 1
                );
            }
        }

        let mut count: usize = 0;
        for row in rows.iter() {
            let rec = scoring
                .score_respondent(row, &src.language)
                .context(ScoringSnafu {})?;
            records.push(rec);
            count += 1;
        }
        info!("{}: {} respondents scored", src.language, count);
        per_language.push((src.language.clone(), count));
    }

    csr_scoring::sort_by_score(&mut records);
    let collective = scoring.compute_collective_stats(&records);

    Ok(build_document(
        &records,
        collective.as_ref(),
        scoring.pillars(),
        &per_language,
        dashboard_name,
        last_updated,
    ))
}

pub fn run_update(
    config_path: String,
    out: Option<String>,
    inputs: Vec<String>,
    check_reference_path: Option<String>,
) -> DashboardResult<()> {
    let config_p = Path::new(config_path.as_str());
    let config = read_config(&config_path)?;
    debug!("config: {:?}", config);

    // Validate the configuration before reading anything else.
    let scoring = validate_config(&config)?;
    info!(
        "Configuration: {} pillars, languages: {:?}",
        scoring.pillars().len(),
        scoring
            .languages()
            .iter()
            .map(|l| l.language.clone())
            .collect::<Vec<String>>()
    );
    let overrides = parse_input_overrides(&inputs, &scoring)?;

    let root_p = match config_p.parent() {
        Some(p) => p,
        None => whatever!("Missing parent directory for {}", config_path),
    };

    let mut sources: Vec<LanguageRows> = Vec::new();
    for src in config.languages.iter() {
        let p: PathBuf = match overrides.iter().find(|(l, _)| *l == src.language) {
            Some((_, override_path)) => PathBuf::from(override_path),
            None => root_p.join(&src.file_path),
        };
        let rows = read_responses(&p, src)?;
        sources.push(LanguageRows {
            language: src.language.clone(),
            rows,
        });
    }

    let last_updated = chrono::Local::now()
        .format("%Y-%m-%dT%H:%M:%S")
        .to_string();
    let dashboard_name = config.output_settings.dashboard_name.as_deref();
    if let Some(name) = dashboard_name {
        info!("Updating dashboard {}", name);
    }
    let data_js = build_data(&scoring, &sources, dashboard_name, &last_updated)?;
    log_summary(&data_js);

    let out_path: Option<String> = match out {
        Some(x) => Some(x),
        None => config
            .output_settings
            .output_path
            .clone()
            .map(|p| root_p.join(p).display().to_string()),
    };
    write_document(&data_js, out_path.as_deref())?;

    // The reference document, if provided for comparison
    if let Some(reference_p) = check_reference_path {
        let reference_js = read_reference(&reference_p)?;
        compare_with_reference(&data_js, &reference_js)?;
        info!("The document matches the reference {}", reference_p);
    }

    Ok(())
}

fn log_summary(data_js: &JSValue) {
    let total = data_js["meta"]["totalResponded"].as_u64().unwrap_or(0);
    let collective = &data_js["collective"];
    if collective.is_null() {
        info!("{} suppliers, no collective statistics", total);
        return;
    }
    info!(
        "{} suppliers, average score {}",
        total, collective["avgScore"]
    );
    info!(
        "green: {} amber: {} red: {}",
        collective["countGreen"], collective["countAmber"], collective["countRed"]
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use csr_scoring::builder::Builder;
    use csr_scoring::{LanguageConfig, Pillar, RecommendationRule, Vocabulary};

    fn test_dir() -> String {
        option_env!("CSR_TEST_DIR")
            .unwrap_or(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures"))
            .to_string()
    }

    fn run_update_test(test_name: &str, config_lpath: &str, summary_lpath: &str) {
        let _ = env_logger::builder().is_test(true).try_init();
        let test_dir = test_dir();
        info!("Running test {}", test_name);
        let res = run_update(
            format!("{}/{}/{}", test_dir, test_name, config_lpath),
            None,
            Vec::new(),
            Some(format!("{}/{}/{}", test_dir, test_name, summary_lpath)),
        );
        if let Err(e) = res {
            warn!("Error occured {:?}", e);
            panic!("An error occured {}", e);
        }
    }

    fn test_wrapper(test_name: &str) {
        run_update_test(
            test_name,
            format!("{}_config.json", test_name).as_str(),
            format!("{}_expected_summary.json", test_name).as_str(),
        )
    }

    #[test]
    fn two_languages_csv() {
        test_wrapper("two_languages_csv");
    }

    #[test]
    fn header_only() {
        test_wrapper("header_only");
    }

    #[test]
    fn two_sheets_xlsx() {
        test_wrapper("two_sheets_xlsx");
    }

    #[test]
    fn reference_mismatch_is_an_error() {
        let test_dir = test_dir();
        let res = run_update(
            format!("{}/header_only/header_only_config.json", test_dir),
            None,
            Vec::new(),
            Some(format!(
                "{}/two_languages_csv/two_languages_csv_expected_summary.json",
                test_dir
            )),
        );
        assert!(matches!(res, Err(DashboardError::Whatever { .. })));
    }

    #[test]
    fn input_override_replaces_file() {
        // The French responses are replaced by a file without any response.
        let test_dir = test_dir();
        let res = run_update(
            format!("{}/two_languages_csv/two_languages_csv_config.json", test_dir),
            None,
            vec![format!("fr={}/header_only/responses_fr.csv", test_dir)],
            Some(format!(
                "{}/two_languages_csv/english_only_expected_summary.json",
                test_dir
            )),
        );
        if let Err(e) = res {
            panic!("An error occured {}", e);
        }
    }

    #[test]
    fn missing_file_is_an_error() {
        let test_dir = test_dir();
        let res = run_update(
            format!("{}/two_languages_csv/two_languages_csv_config.json", test_dir),
            None,
            vec!["en=/does/not/exist.csv".to_string()],
            None,
        );
        assert!(matches!(res, Err(DashboardError::CsvOpen { .. })));
    }

    fn scoring() -> ScoringConfig {
        Builder::new(&[
            Pillar::new("gouvernance", "Gouvernance", 0.5),
            Pillar::new("environnement", "Environnement", 0.5),
        ])
        .unwrap()
        .language(LanguageConfig {
            language: "fr".to_string(),
            vocabulary: Vocabulary::new(&["oui"], &["non"]),
            columns: vec![
                ("gouvernance".to_string(), vec![2]),
                ("environnement".to_string(), vec![3]),
            ],
            metadata: vec![("timestamp".to_string(), 0), ("name".to_string(), 1)],
            recommendations: vec![RecommendationRule {
                column: 3,
                text: "Mesurer les émissions".to_string(),
            }],
        })
        .unwrap()
        .build()
        .unwrap()
    }

    fn rows(cells: &[&[&str]]) -> Vec<Vec<String>> {
        cells
            .iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn overrides_are_parsed() {
        let scoring = scoring();
        let res = parse_input_overrides(&["fr = a/b.csv".to_string()], &scoring).unwrap();
        assert_eq!(res, vec![("fr".to_string(), "a/b.csv".to_string())]);
        assert!(matches!(
            parse_input_overrides(&["a/b.csv".to_string()], &scoring),
            Err(DashboardError::InputOverride { .. })
        ));
        assert!(matches!(
            parse_input_overrides(&["en=a/b.csv".to_string()], &scoring),
            Err(DashboardError::InputOverrideLanguage { .. })
        ));
    }

    #[test]
    fn build_data_sorts_and_counts() {
        let sources = vec![LanguageRows {
            language: "fr".to_string(),
            rows: rows(&[
                &["Horodateur", "Société", "Q1", "Q2"],
                &["t1", "Alpha", "Non", "Oui"],
                &["", "", "", ""],
                &["t2", "", "Oui", "Oui"],
                &["t3", "Bravo", "Oui", "Oui"],
                &["t4", "Charlie", "Oui", "Non"],
                &["t5", "Delta", "Non", "Oui"],
            ]),
        }];
        let js = build_data(&scoring(), &sources, Some("RSE"), "2024-01-01T00:00:00").unwrap();

        assert_eq!(js["meta"]["lastUpdated"], "2024-01-01T00:00:00");
        assert_eq!(js["meta"]["dashboardName"], "RSE");
        assert_eq!(js["meta"]["pillarLabels"]["gouvernance"], "Gouvernance");
        assert_eq!(js["meta"]["totalResponded"], 4);
        assert_eq!(js["meta"]["perLanguageCounts"]["fr"], 4);

        let names: Vec<&str> = js["suppliers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap())
            .collect();
        // Alpha, Charlie and Delta have the same score and keep their order.
        assert_eq!(names, vec!["Bravo", "Alpha", "Charlie", "Delta"]);
        assert_eq!(
            js["suppliers"][2]["recommendations"][0],
            "Mesurer les émissions"
        );
        assert_eq!(js["suppliers"][1]["id"], "alpha");
        assert_eq!(js["suppliers"][1]["scoresByPillar"]["environnement"], 100.0);

        let c = &js["collective"];
        assert_eq!(c["avgScore"], 62.5);
        assert_eq!(c["avgByPillar"]["gouvernance"], 50.0);
        assert_eq!(c["countGreen"], 1);
        assert_eq!(c["countAmber"], 3);
        assert_eq!(c["countRed"], 0);
        assert_eq!(c["topPillar"], "environnement");
        assert_eq!(c["weakPillar"], "gouvernance");
    }

    #[test]
    fn build_data_without_respondents() {
        let sources = vec![LanguageRows {
            language: "fr".to_string(),
            rows: rows(&[&["Horodateur", "Société", "Q1", "Q2"]]),
        }];
        let js = build_data(&scoring(), &sources, None, "now").unwrap();
        assert_eq!(js["meta"]["totalResponded"], 0);
        assert!(js["meta"].get("dashboardName").is_none());
        assert!(js["collective"].is_null());
        assert_eq!(js["suppliers"], serde_json::json!([]));
    }
}
