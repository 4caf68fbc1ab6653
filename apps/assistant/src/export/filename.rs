use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Builds a download name such as `resume_Jane_Doe_2025-03-01.md`.
/// Parts are joined with `_`; whitespace runs inside parts become `_`.
pub fn download_filename(parts: &[&str], date: NaiveDate, extension: &str) -> String {
    let mut stem: Vec<String> = parts
        .iter()
        .map(|part| WHITESPACE.replace_all(part, "_").into_owned())
        .collect();
    stem.push(date.format("%Y-%m-%d").to_string());
    format!("{}.{}", stem.join("_"), extension.trim_start_matches('.'))
}
