//! Localization completeness — find missing keys across the l10n files,
//! then fill them in from the analysis report.
//!
//! `en.json` is the reference key space. Nested objects contribute dotted
//! key paths (`menu.home`). Filled values come from a small reviewed
//! lexicon where available, otherwise a bracketed placeholder marks the
//! key for a human translation pass.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use eyre::WrapErr;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const COVERAGE_TARGET: f64 = 95.0;
const BATCH_SIZE: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileStats {
    pub total_keys: usize,
    pub missing_keys: usize,
    pub extra_keys: usize,
    pub coverage: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub reference_keys_count: usize,
    pub total_files: usize,
    pub file_stats: BTreeMap<String, FileStats>,
    pub missing_translations: BTreeMap<String, Vec<String>>,
    pub reference_keys: Vec<String>,
}

/// Analyze every `<lang>.json` against the English reference and write the
/// machine-readable report consumed by `translations-complete`.
pub fn analyze(l10n_dir: &str, report_path: &str) -> eyre::Result<String> {
    let dir = Path::new(l10n_dir);
    eyre::ensure!(dir.is_dir(), "translation directory {l10n_dir} not found");

    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    eyre::ensure!(!files.is_empty(), "no JSON files found in {l10n_dir}");

    let reference_path = dir.join("en.json");
    eyre::ensure!(
        reference_path.exists(),
        "reference file en.json not found in {l10n_dir}"
    );
    let reference_keys = key_set(&load_json(&reference_path)?);
    eyre::ensure!(!reference_keys.is_empty(), "reference file en.json has no keys");

    println!(
        "Found {} translation files, reference has {} keys",
        files.len(),
        reference_keys.len()
    );

    let mut file_stats: BTreeMap<String, FileStats> = BTreeMap::new();
    let mut missing_translations: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for file in &files {
        let lang = file
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
            .to_string();
        let keys = key_set(&load_json(file)?);
        let missing: Vec<String> = reference_keys.difference(&keys).cloned().collect();
        let extra = keys.difference(&reference_keys).count();
        let coverage = ((keys.len() - extra) as f64 / reference_keys.len() as f64) * 100.0;

        println!(
            "{lang}: {} keys, {} missing, {} extra, {coverage:.1}% coverage",
            keys.len(),
            missing.len(),
            extra
        );

        file_stats.insert(
            lang.clone(),
            FileStats {
                total_keys: keys.len(),
                missing_keys: missing.len(),
                extra_keys: extra,
                coverage,
            },
        );
        if !missing.is_empty() {
            missing_translations.insert(lang, missing);
        }
    }

    let mut sorted: Vec<(&String, &FileStats)> = file_stats.iter().collect();
    sorted.sort_by(|a, b| {
        b.1.coverage
            .partial_cmp(&a.1.coverage)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    println!("\n{:<12} {:>9} {:>8} {:>7}", "language", "coverage", "missing", "total");
    for (lang, stats) in &sorted {
        println!(
            "{:<12} {:>8.1}% {:>8} {:>7}",
            lang, stats.coverage, stats.missing_keys, stats.total_keys
        );
    }

    let needs_work: Vec<(&String, &FileStats)> = sorted
        .iter()
        .filter(|(_, stats)| stats.coverage < COVERAGE_TARGET)
        .copied()
        .collect();
    if needs_work.is_empty() {
        println!("\nAll languages meet the {COVERAGE_TARGET}% coverage target");
    } else {
        println!("\nLanguages under the {COVERAGE_TARGET}% coverage target:");
        for (lang, stats) in &needs_work {
            println!(
                "  {lang}: {:.1}% coverage, {} missing keys",
                stats.coverage, stats.missing_keys
            );
        }
    }

    let report = AnalysisReport {
        reference_keys_count: reference_keys.len(),
        total_files: files.len(),
        file_stats,
        missing_translations,
        reference_keys: reference_keys.into_iter().collect(),
    };
    if let Some(parent) = Path::new(report_path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(report_path, serde_json::to_string_pretty(&report)?)?;

    Ok(format!("[translations] analysis report saved to {report_path}"))
}

/// Fill missing keys for every language below the coverage target, lowest
/// coverage first. Updates the language files in place with sorted keys.
pub fn complete(l10n_dir: &str, report_path: &str) -> eyre::Result<String> {
    let text = fs::read_to_string(report_path)
        .wrap_err("analysis report not found; run translations-analyze first")?;
    let report: AnalysisReport =
        serde_json::from_str(&text).wrap_err_with(|| format!("parsing {report_path}"))?;

    let dir = Path::new(l10n_dir);
    let reference = load_json(&dir.join("en.json"))?;

    let mut targets: Vec<(String, f64)> = report
        .file_stats
        .iter()
        .filter(|(lang, stats)| lang.as_str() != "en" && stats.coverage < COVERAGE_TARGET)
        .map(|(lang, stats)| (lang.clone(), stats.coverage))
        .collect();
    targets.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    if targets.is_empty() {
        return Ok(
            "[translations] all languages meet the coverage target, nothing to fill".to_string(),
        );
    }

    println!("{} languages below the {COVERAGE_TARGET}% coverage target", targets.len());

    let mut total_filled = 0usize;
    for (lang, coverage) in &targets {
        let missing = report
            .missing_translations
            .get(lang)
            .cloned()
            .unwrap_or_default();
        if missing.is_empty() {
            continue;
        }
        println!(
            "{} ({lang}): {coverage:.1}% coverage, {} missing",
            language_name(lang),
            missing.len()
        );
        total_filled += fill_language(dir, lang, &missing, &reference)?;
    }

    Ok(format!(
        "[translations] filled {total_filled} keys across {} languages",
        targets.len()
    ))
}

fn fill_language(dir: &Path, lang: &str, missing: &[String], reference: &Value) -> eyre::Result<usize> {
    let path = dir.join(format!("{lang}.json"));
    let text =
        fs::read_to_string(&path).wrap_err_with(|| format!("reading {}", path.display()))?;
    let mut data: BTreeMap<String, Value> =
        serde_json::from_str(&text).wrap_err_with(|| format!("parsing {}", path.display()))?;

    let batches = missing.len().div_ceil(BATCH_SIZE);
    let mut filled = 0;
    for (batch_index, batch) in missing.chunks(BATCH_SIZE).enumerate() {
        for key in batch {
            let value = match sample_translation(lang, key) {
                Some(reviewed) => reviewed.to_string(),
                None => {
                    let english = lookup_dotted(reference, key)
                        .and_then(|v| v.as_str())
                        .unwrap_or(key);
                    format!("[{} translation for: {}]", language_name(lang), english)
                }
            };
            data.insert(key.clone(), Value::String(value));
            filled += 1;
        }
        println!("  batch {}/{batches}: {} keys", batch_index + 1, batch.len());
    }

    fs::write(&path, serde_json::to_string_pretty(&data)?)?;
    println!("  saved {} ({} keys total)", path.display(), data.len());
    Ok(filled)
}

fn load_json(path: &Path) -> eyre::Result<Value> {
    let text = fs::read_to_string(path).wrap_err_with(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).wrap_err_with(|| format!("parsing {}", path.display()))
}

/// All dotted key paths in a JSON document, including intermediate objects.
fn key_set(value: &Value) -> BTreeSet<String> {
    let mut keys = BTreeSet::new();
    collect_keys(value, "", &mut keys);
    keys
}

fn collect_keys(value: &Value, prefix: &str, keys: &mut BTreeSet<String>) {
    if let Some(map) = value.as_object() {
        for (key, child) in map {
            let full = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            if child.is_object() {
                collect_keys(child, &full, keys);
            }
            keys.insert(full);
        }
    }
}

fn lookup_dotted<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    let mut current = value;
    for part in key.split('.') {
        current = current.get(part)?;
    }
    Some(current)
}

/// Reviewed translations for the most common keys. Everything else gets a
/// bracketed placeholder for a human pass.
fn sample_translation(lang: &str, key: &str) -> Option<&'static str> {
    let samples: &[(&str, &str)] = match lang {
        "hi" => &[
            ("action", "कार्य"),
            ("actions", "कार्य"),
            ("amount_must_be_positive", "राशि शून्य से अधिक होनी चाहिए"),
            ("annual", "वार्षिक"),
            ("apply", "लागू करें"),
            ("available_cash", "उपलब्ध नकदी"),
            ("bill_added", "बिल सफलतापूर्वक जोड़ा गया"),
            ("camera", "कैमरा"),
            ("current_balance", "वर्तमान शेष राशि"),
        ],
        "da" => &[
            ("action", "Handling"),
            ("actions", "Handlinger"),
            ("amount_must_be_positive", "Beløbet skal være større end nul"),
            ("annual", "Årligt"),
            ("apply", "Anvend"),
            ("available_cash", "Tilgængelige kontanter"),
            ("bill_added", "Regning tilføjet succesfuldt"),
            ("camera", "Kamera"),
            ("current_balance", "Nuværende saldo"),
        ],
        _ => return None,
    };
    samples.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

fn language_name(lang: &str) -> &str {
    match lang {
        "hi" => "Hindi",
        "gsw" => "Swiss German",
        "da" => "Danish",
        "el" => "Greek",
        "ru" => "Russian",
        "pt" => "Portuguese",
        "zh" => "Chinese (Simplified)",
        "es" => "Spanish",
        "nl" => "Dutch",
        "ja" => "Japanese",
        "it" => "Italian",
        "fr" => "French",
        "de" => "German",
        "en" => "English",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, value: &Value) {
        fs::write(dir.join(name), serde_json::to_string_pretty(value).unwrap()).unwrap();
    }

    #[test]
    fn nested_objects_contribute_dotted_keys() {
        let value = serde_json::json!({
            "app_name": "BrightBudget",
            "menu": {"home": "Home", "settings": {"title": "Settings"}},
        });
        let keys = key_set(&value);
        assert!(keys.contains("app_name"));
        assert!(keys.contains("menu"));
        assert!(keys.contains("menu.home"));
        assert!(keys.contains("menu.settings.title"));
        assert_eq!(keys.len(), 5);
    }

    #[test]
    fn lookup_follows_dotted_paths() {
        let value = serde_json::json!({"menu": {"home": "Home"}});
        assert_eq!(
            lookup_dotted(&value, "menu.home").and_then(|v| v.as_str()),
            Some("Home")
        );
        assert!(lookup_dotted(&value, "menu.missing").is_none());
    }

    #[test]
    fn analyze_reports_missing_keys_per_language() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "en.json",
            &serde_json::json!({"app_name": "BrightBudget", "budget": "Budget", "savings": "Savings", "expenses": "Expenses"}),
        );
        write(
            dir.path(),
            "es.json",
            &serde_json::json!({"app_name": "BrightBudget"}),
        );

        let report_path = dir.path().join("report.json");
        analyze(
            dir.path().to_str().unwrap(),
            report_path.to_str().unwrap(),
        )
        .unwrap();

        let report: AnalysisReport =
            serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
        assert_eq!(report.reference_keys_count, 4);
        assert_eq!(report.file_stats["es"].missing_keys, 3);
        assert_eq!(report.file_stats["es"].coverage, 25.0);
        assert_eq!(report.file_stats["en"].missing_keys, 0);
        assert_eq!(
            report.missing_translations["es"],
            vec!["budget".to_string(), "expenses".to_string(), "savings".to_string()]
        );
    }

    #[test]
    fn complete_fills_placeholders_and_reviewed_entries() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "en.json",
            &serde_json::json!({"action": "Action", "budget": "Budget", "savings": "Savings"}),
        );
        write(dir.path(), "da.json", &serde_json::json!({"budget": "Budget"}));

        let report_path = dir.path().join("report.json");
        analyze(dir.path().to_str().unwrap(), report_path.to_str().unwrap()).unwrap();
        complete(dir.path().to_str().unwrap(), report_path.to_str().unwrap()).unwrap();

        let filled: BTreeMap<String, Value> =
            serde_json::from_str(&fs::read_to_string(dir.path().join("da.json")).unwrap()).unwrap();
        // reviewed lexicon entry
        assert_eq!(filled["action"], "Handling");
        // placeholder carrying the English source text
        assert_eq!(filled["savings"], "[Danish translation for: Savings]");
        assert_eq!(filled.len(), 3);
    }

    #[test]
    fn complete_skips_languages_at_target() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "en.json", &serde_json::json!({"budget": "Budget"}));
        write(dir.path(), "fr.json", &serde_json::json!({"budget": "Budget"}));

        let report_path = dir.path().join("report.json");
        analyze(dir.path().to_str().unwrap(), report_path.to_str().unwrap()).unwrap();
        let out = complete(dir.path().to_str().unwrap(), report_path.to_str().unwrap()).unwrap();
        assert!(out.contains("nothing to fill"));
    }
}
