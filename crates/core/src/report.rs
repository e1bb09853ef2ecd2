//! The rendered report: the results of the latest batch, their summary, and
//! the HTML view built from them.

use crate::error::AssessmentError;
use crate::i18n::Language;
use crate::labels::Level;
use crate::models::{AggregateSummary, ClassificationResult};
use askama::Template;
use tracing::debug;

#[derive(Template)]
#[template(path = "report.html")]
struct ReportTemplate<'a> {
    lang: &'static str,
    title: &'static str,
    generated_at: String,
    headers: [&'static str; 3],
    summary: Vec<SummaryItem>,
    rows: Vec<RowView<'a>>,
}

struct SummaryItem {
    kind: &'static str,
    label: &'static str,
    count: usize,
    percent: String,
}

struct RowView<'a> {
    file_name: &'a str,
    style_class: &'static str,
    level: &'static str,
    segments: Vec<Segment>,
    labels: Vec<String>,
}

struct Segment {
    class: String,
    width: String,
}

/// Sole owner of the displayed report. Every render replaces it wholesale.
#[derive(Debug, Clone, Default)]
pub struct Report {
    language: Language,
    results: Vec<ClassificationResult>,
    summary: AggregateSummary,
    html: String,
}

impl Report {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            ..Self::default()
        }
    }

    /// Replaces the report with `results`. On failure the previous report
    /// stays in place.
    pub fn render(&mut self, results: Vec<ClassificationResult>) -> Result<(), AssessmentError> {
        let summary = compute_summary(&results);
        let html = render_html(&results, &summary, self.language)?;
        debug!(rows = results.len(), "report rendered");
        self.results = results;
        self.summary = summary;
        self.html = html;
        Ok(())
    }

    /// Switches the display language and rebuilds the view.
    pub fn set_language(&mut self, language: Language) -> Result<(), AssessmentError> {
        let html = render_html(&self.results, &self.summary, language)?;
        self.language = language;
        self.html = html;
        Ok(())
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn results(&self) -> &[ClassificationResult] {
        &self.results
    }

    pub fn summary(&self) -> AggregateSummary {
        self.summary
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

pub fn compute_summary(results: &[ClassificationResult]) -> AggregateSummary {
    AggregateSummary::from_levels(results.iter().map(|r| r.predicted_class))
}

/// `(xx.x%)` for a class share, blank for an empty batch.
pub fn share_text(summary: &AggregateSummary, level: Level) -> String {
    summary
        .percentage(level)
        .map(|p| format!("({p:.1}%)"))
        .unwrap_or_default()
}

/// Bar segment width in percent: `value * 100`, neither clamped nor rescaled.
pub fn bar_width(value: f64) -> String {
    format!("{}", value * 100.0)
}

/// Summary caption for a level, or for the total when `level` is `None`.
pub fn summary_label(level: Option<Level>, lang: Language) -> &'static str {
    match level {
        None => lang.pick("จำนวนไฟล์ทั้งหมด", "Total Files"),
        Some(Level::High) => lang.pick("ระดับสูง", "High Level"),
        Some(Level::Mid) => lang.pick("ระดับกลาง", "Mid Level"),
        Some(Level::Low) => lang.pick("ระดับต่ำ", "Low Level"),
    }
}

fn summary_items(summary: &AggregateSummary, lang: Language) -> Vec<SummaryItem> {
    let mut items = vec![SummaryItem {
        kind: "total-item",
        label: summary_label(None, lang),
        count: summary.total,
        percent: String::new(),
    }];
    for level in Level::ALL {
        items.push(SummaryItem {
            kind: match level {
                Level::High => "high-level",
                Level::Mid => "mid-level",
                Level::Low => "low-level",
            },
            label: summary_label(Some(level), lang),
            count: summary.count(level),
            percent: share_text(summary, level),
        });
    }
    items
}

fn row_view(result: &ClassificationResult) -> RowView<'_> {
    RowView {
        file_name: &result.file_name,
        style_class: result.predicted_class.style_class(),
        level: result.predicted_class.as_str(),
        segments: result
            .probabilities
            .iter()
            .map(|(key, value)| Segment {
                class: key.to_lowercase(),
                width: bar_width(value),
            })
            .collect(),
        labels: result
            .probabilities
            .iter()
            .map(|(key, value)| format!("{}: {:.1}%", key, value * 100.0))
            .collect(),
    }
}

fn render_html(
    results: &[ClassificationResult],
    summary: &AggregateSummary,
    lang: Language,
) -> Result<String, AssessmentError> {
    let template = ReportTemplate {
        lang: lang.code(),
        title: lang.pick("ผลการประเมินการออกเสียง", "Pronunciation Assessment Results"),
        generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M").to_string(),
        headers: [
            lang.pick("ชื่อไฟล์", "Filename"),
            lang.pick("ระดับการออกเสียง", "Classification"),
            lang.pick("ความน่าจะเป็น", "Probabilities"),
        ],
        summary: summary_items(summary, lang),
        rows: results.iter().map(row_view).collect(),
    };
    template
        .render()
        .map_err(|e| AssessmentError::Render(e.to_string()))
}
