// The data file read by the dashboard.

use std::fs;
use std::path::Path;

use csr_scoring::{CollectiveStats, Pillar, ScoreRecord, NAME_FIELD, TIMESTAMP_FIELD};
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use snafu::prelude::*;
use text_diff::print_diff;

use crate::dashboard::*;

#[derive(PartialEq, Debug, Clone, Serialize)]
struct Meta {
    #[serde(rename = "dashboardName", skip_serializing_if = "Option::is_none")]
    dashboard_name: Option<String>,
    #[serde(rename = "lastUpdated")]
    last_updated: String,
    #[serde(rename = "totalResponded")]
    total_responded: usize,
    #[serde(rename = "perLanguageCounts")]
    per_language_counts: JSMap<String, JSValue>,
    /// pillar name -> display label
    #[serde(rename = "pillarLabels")]
    pillar_labels: JSMap<String, JSValue>,
}

fn pillar_map(scores: &[(String, f64)]) -> JSMap<String, JSValue> {
    let mut m: JSMap<String, JSValue> = JSMap::new();
    for (pillar, score) in scores.iter() {
        m.insert(pillar.clone(), json!(score));
    }
    m
}

pub fn record_to_json(rec: &ScoreRecord) -> JSValue {
    let mut m: JSMap<String, JSValue> = JSMap::new();
    m.insert("id".to_string(), json!(rec.id));
    m.insert("name".to_string(), json!(rec.name));
    // The name and the timestamp have their own keys.
    for (field, value) in rec.metadata.iter() {
        if field != NAME_FIELD && field != TIMESTAMP_FIELD {
            m.insert(field.clone(), json!(value));
        }
    }
    m.insert("respondedAt".to_string(), json!(rec.responded_at));
    m.insert("language".to_string(), json!(rec.language));
    m.insert("scoreGlobal".to_string(), json!(rec.score_global));
    m.insert("level".to_string(), json!(rec.level.as_str()));
    m.insert(
        "scoresByPillar".to_string(),
        JSValue::Object(pillar_map(&rec.scores_by_pillar)),
    );
    m.insert("strengths".to_string(), json!(rec.strengths));
    m.insert("weaknesses".to_string(), json!(rec.weaknesses));
    m.insert("recommendations".to_string(), json!(rec.recommendations));
    JSValue::Object(m)
}

pub fn collective_to_json(stats: &CollectiveStats) -> JSValue {
    json!({
        "avgScore": stats.avg_score,
        "avgByPillar": pillar_map(&stats.avg_by_pillar),
        "countGreen": stats.count_green,
        "countAmber": stats.count_amber,
        "countRed": stats.count_red,
        "topPillar": stats.top_pillar,
        "weakPillar": stats.weak_pillar,
    })
}

/// Assembles the document: `{ meta, collective, suppliers }`.
///
/// `collective` is null when nobody responded.
pub fn build_document(
    records: &[ScoreRecord],
    collective: Option<&CollectiveStats>,
    pillars: &[Pillar],
    per_language: &[(String, usize)],
    dashboard_name: Option<&str>,
    last_updated: &str,
) -> JSValue {
    let mut counts: JSMap<String, JSValue> = JSMap::new();
    for (language, count) in per_language.iter() {
        counts.insert(language.clone(), json!(count));
    }
    let mut labels: JSMap<String, JSValue> = JSMap::new();
    for p in pillars.iter() {
        labels.insert(p.name.clone(), json!(p.label));
    }
    let meta = Meta {
        dashboard_name: dashboard_name.map(|s| s.to_string()),
        last_updated: last_updated.to_string(),
        total_responded: records.len(),
        per_language_counts: counts,
        pillar_labels: labels,
    };
    let suppliers: Vec<JSValue> = records.iter().map(record_to_json).collect();
    json!({
        "meta": meta,
        "collective": collective.map(collective_to_json),
        "suppliers": suppliers,
    })
}

/// Writes the document to a file, or to the standard output if no path
/// (or `stdout`) is given. Parent directories are created.
pub fn write_document(data_js: &JSValue, path: Option<&str>) -> DashboardResult<()> {
    let pretty_js = serde_json::to_string_pretty(data_js).context(WritingJsonSnafu {})?;
    match path {
        None | Some("") | Some("stdout") => {
            println!("{}", pretty_js);
        }
        Some(p) => {
            if let Some(parent) = Path::new(p).parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).context(WritingOutputSnafu { path: p })?;
                }
            }
            fs::write(p, &pretty_js).context(WritingOutputSnafu { path: p })?;
            info!("Data file written to {} ({} bytes)", p, pretty_js.len());
        }
    }
    Ok(())
}

pub fn read_reference(path: &str) -> DashboardResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    debug!("read_reference: {:?}", js);
    Ok(js)
}

fn without_timestamp(js: &JSValue) -> JSValue {
    let mut res = js.clone();
    if let Some(meta) = res.get_mut("meta").and_then(|m| m.as_object_mut()) {
        meta.remove("lastUpdated");
    }
    res
}

/// Fails if the document differs from the reference. The update timestamp is ignored.
pub fn compare_with_reference(data_js: &JSValue, reference_js: &JSValue) -> DashboardResult<()> {
    let computed = without_timestamp(data_js);
    let reference = without_timestamp(reference_js);
    if computed != reference {
        warn!("Found differences with the reference document");
        let pretty_ref = serde_json::to_string_pretty(&reference).context(WritingJsonSnafu {})?;
        let pretty_computed =
            serde_json::to_string_pretty(&computed).context(WritingJsonSnafu {})?;
        print_diff(pretty_ref.as_str(), pretty_computed.as_str(), "\n");
        whatever!("Difference detected between the computed document and the reference document")
    }
    Ok(())
}
