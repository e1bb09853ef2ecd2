//! Flat CSV export of a report.
//!
//! Records normally come straight from the report's retained results.
//! [`scrape`] rebuilds them from rendered markup instead, for reports that
//! only survive as a saved HTML file. Both paths encode probabilities the
//! same way the bar does (`value * 100` followed by `%`), and the export
//! taxonomy is fixed at High/Mid/Low: other probability keys are not exported.

use crate::error::AssessmentError;
use crate::labels::Level;
use crate::models::{AggregateSummary, ClassificationResult};
use crate::report::{bar_width, Report};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const EXPORT_FILE_NAME: &str = "pronunciation_assessment_results.csv";
pub const CSV_HEADER: &str = "Filename,Level,High Probability,Mid Probability,Low Probability";
const MISSING_PROBABILITY: &str = "0%";
const CONTENT_TYPE: &str = "text/csv;charset=utf-8";

/// One exported row. Probabilities are percentage strings such as `70%`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRecord {
    pub file_name: String,
    pub level: Level,
    pub high: String,
    pub mid: String,
    pub low: String,
}

impl ExportRecord {
    /// Builds a row from a retained result, reading probabilities the way the
    /// rendered bar exposes them. `None` when the file name is blank.
    pub fn from_result(result: &ClassificationResult) -> Option<Self> {
        let file_name = result.file_name.trim();
        if file_name.is_empty() {
            return None;
        }
        let mut found: [Option<String>; 3] = [None, None, None];
        for (key, value) in result.probabilities.iter() {
            if let Some(level) = Level::from_probability_key(key) {
                found[level_index(level)].get_or_insert_with(|| format!("{}%", bar_width(value)));
            }
        }
        let [high, mid, low] = found.map(|v| v.unwrap_or_else(|| MISSING_PROBABILITY.to_string()));
        Some(Self {
            file_name: file_name.to_string(),
            level: result.predicted_class,
            high,
            mid,
            low,
        })
    }
}

/// What a walk over rendered rows found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapedReport {
    /// Body rows present, usable or not.
    pub rows_seen: usize,
    pub records: Vec<ExportRecord>,
}

struct Selectors {
    rows: Selector,
    badge: Selector,
    bar: Selector,
    fallback: [(Level, Regex); 3],
}

impl Selectors {
    fn new() -> Result<Self, AssessmentError> {
        let selector =
            |s: &str| Selector::parse(s).map_err(|e| AssessmentError::Scrape(e.to_string()));
        let pattern = |label: &str| {
            Regex::new(&format!(r"(?i){label}:?\s*(\d+(?:\.\d+)?)%"))
                .map_err(|e| AssessmentError::Scrape(e.to_string()))
        };
        Ok(Self {
            rows: selector(".results-table tbody tr")?,
            badge: selector("span")?,
            bar: selector(".probabilities-bar")?,
            fallback: [
                (Level::High, pattern("High")?),
                (Level::Mid, pattern("Mid")?),
                (Level::Low, pattern("Low")?),
            ],
        })
    }
}

/// Rebuilds export records from rendered report markup.
///
/// Rows with fewer than three cells are skipped, as are rows missing a file
/// name or a recognizable level badge.
pub fn scrape(html: &str) -> Result<ScrapedReport, AssessmentError> {
    let selectors = Selectors::new()?;
    let document = Html::parse_document(html);

    let mut scraped = ScrapedReport::default();
    for row in document.select(&selectors.rows) {
        scraped.rows_seen += 1;
        let cells: Vec<ElementRef> = row
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|e| e.value().name() == "td")
            .collect();
        if cells.len() < 3 {
            continue;
        }

        let file_name = element_text(&cells[0]);
        let level = cells[1]
            .select(&selectors.badge)
            .next()
            .and_then(|badge| badge_level(&badge));

        let (high, mid, low) = match cells[2].select(&selectors.bar).next() {
            Some(bar) => bar_probabilities(&bar),
            None => text_probabilities(&element_text(&cells[2]), &selectors.fallback),
        };

        match level {
            Some(level) if !file_name.is_empty() => scraped.records.push(ExportRecord {
                file_name,
                level,
                high,
                mid,
                low,
            }),
            _ => debug!(row = scraped.rows_seen, "skipping row without file name or level"),
        }
    }
    Ok(scraped)
}

fn element_text(el: &ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn badge_level(badge: &ElementRef) -> Option<Level> {
    badge
        .value()
        .classes()
        .filter_map(|c| c.strip_prefix("classification-"))
        .find_map(Level::from_style_class)
}

/// Reads each class's segment width, first segment per class wins.
fn bar_probabilities(bar: &ElementRef) -> (String, String, String) {
    let mut found: [Option<String>; 3] = [None, None, None];
    for segment in bar.descendants().filter_map(ElementRef::wrap) {
        let level = segment
            .value()
            .classes()
            .filter_map(|c| c.strip_prefix("probability-"))
            .find_map(Level::from_probability_key);
        if let Some(level) = level {
            let slot = &mut found[level_index(level)];
            if slot.is_none() {
                *slot = Some(
                    segment
                        .value()
                        .attr("style")
                        .and_then(style_width)
                        .unwrap_or_else(|| MISSING_PROBABILITY.to_string()),
                );
            }
        }
    }
    let [high, mid, low] = found.map(|v| v.unwrap_or_else(|| MISSING_PROBABILITY.to_string()));
    (high, mid, low)
}

/// Matches `High: 55.0%` style text. Only the three canonical classes are
/// recognized here.
fn text_probabilities(text: &str, patterns: &[(Level, Regex); 3]) -> (String, String, String) {
    let mut found: [String; 3] = Default::default();
    for (level, re) in patterns {
        found[level_index(*level)] = re
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| format!("{}%", m.as_str()))
            .unwrap_or_else(|| MISSING_PROBABILITY.to_string());
    }
    let [high, mid, low] = found;
    (high, mid, low)
}

fn style_width(style: &str) -> Option<String> {
    style
        .split(';')
        .filter_map(|decl| decl.split_once(':'))
        .find(|(prop, _)| prop.trim().eq_ignore_ascii_case("width"))
        .map(|(_, value)| value.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn level_index(level: Level) -> usize {
    match level {
        Level::High => 0,
        Level::Mid => 1,
        Level::Low => 2,
    }
}

/// Recounts levels from the exported records alone.
pub fn aggregate(records: &[ExportRecord]) -> AggregateSummary {
    AggregateSummary::from_levels(records.iter().map(|r| r.level))
}

fn export_percentage(summary: &AggregateSummary, level: Level) -> String {
    summary
        .percentage(level)
        .map(|p| format!("{p:.2}"))
        .unwrap_or_else(|| "0.00".to_string())
}

fn strip_percent(value: &str) -> String {
    value.replacen('%', "", 1)
}

pub fn serialize(records: &[ExportRecord], summary: &AggregateSummary) -> String {
    let mut out = String::new();
    out.push_str(CSV_HEADER);
    out.push('\n');
    for record in records {
        out.push_str(&format!(
            "\"{}\",{},{},{},{}\n",
            record.file_name.replace('"', "\"\""),
            record.level,
            strip_percent(&record.high),
            strip_percent(&record.mid),
            strip_percent(&record.low),
        ));
    }
    out.push('\n');
    out.push_str("Summary Statistics\n");
    for level in Level::ALL {
        out.push_str(&format!(
            "{} Level,{},{}%\n",
            level,
            summary.count(level),
            export_percentage(summary, level)
        ));
    }
    out.push_str(&format!("Total Files,{},100.00%\n", summary.total));
    out
}

/// A finished export, ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    pub file_name: String,
    pub content: String,
    pub summary: AggregateSummary,
}

impl ExportDocument {
    fn build(records: &[ExportRecord], file_name: &str) -> Self {
        let summary = aggregate(records);
        Self {
            file_name: file_name.to_string(),
            content: serialize(records, &summary),
            summary,
        }
    }

    pub fn content_type(&self) -> &'static str {
        CONTENT_TYPE
    }

    /// Writes the document into `dir` under its fixed name. A fresh temporary
    /// handle is used per save and released right after it is persisted.
    pub fn save(&self, dir: &Path) -> Result<PathBuf, AssessmentError> {
        std::fs::create_dir_all(dir)?;
        let target = dir.join(&self.file_name);
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(self.content.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&target).map_err(|e| AssessmentError::Io(e.error))?;
        info!(path = %target.display(), content_type = self.content_type(), "export saved");
        Ok(target)
    }
}

/// Exports the report's retained results.
pub fn export_report(report: &Report, file_name: &str) -> Result<ExportDocument, AssessmentError> {
    if report.is_empty() {
        return Err(AssessmentError::ExportPrecondition);
    }
    let records: Vec<ExportRecord> = report
        .results()
        .iter()
        .filter_map(ExportRecord::from_result)
        .collect();
    Ok(ExportDocument::build(&records, file_name))
}

/// Exports a report that only exists as rendered markup.
pub fn export_html(html: &str, file_name: &str) -> Result<ExportDocument, AssessmentError> {
    let scraped = scrape(html)?;
    if scraped.rows_seen == 0 {
        return Err(AssessmentError::ExportPrecondition);
    }
    Ok(ExportDocument::build(&scraped.records, file_name))
}
