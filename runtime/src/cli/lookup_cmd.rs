//! `tc-unicode attrs|meaning|lookup <INPUT>...`

use crate::attributes::CharacterAttributes;
use crate::cli::output::{self, Styled};
use crate::config::LookupConfig;
use crate::error::LookupError;
use crate::lookup::{get_character_attributes, get_character_meaning};
use serde::Serialize;
use tracing::warn;

/// Inputs queried when the binary runs without a subcommand.
pub const SAMPLE_INPUTS: &[&str] = &["數", "2A838"];

/// Which lookups to run per input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Attributes,
    Meaning,
    Both,
}

impl Mode {
    fn attributes(self) -> bool {
        matches!(self, Mode::Attributes | Mode::Both)
    }

    fn meaning(self) -> bool {
        matches!(self, Mode::Meaning | Mode::Both)
    }
}

/// Everything learned about one input.
#[derive(Debug, Default, Serialize)]
pub struct QueryReport {
    pub input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<CharacterAttributes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meaning: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl QueryReport {
    fn new(input: &str) -> Self {
        Self {
            input: input.to_string(),
            ..Self::default()
        }
    }

    fn push_error(&mut self, err: LookupError) {
        let err = anyhow::Error::new(err);
        warn!(input = %self.input, "lookup failed: {err:#}");
        self.errors.push(format!("{err:#}"));
    }
}

/// Query every input in turn. One failing input never stops the rest.
///
/// Returns the number of inputs with at least one failed lookup.
pub async fn run(mode: Mode, inputs: &[String], config: &LookupConfig, json: bool) -> usize {
    let s = Styled::new(!json);
    let mut reports = Vec::with_capacity(inputs.len());
    let mut failures = 0;

    for input in inputs {
        let report = query(mode, input, config).await;
        if !report.errors.is_empty() {
            failures += 1;
        }
        if json {
            reports.push(report);
        } else {
            println!("{}", render_text(&s, &report));
        }
    }

    if json {
        match serde_json::to_value(&reports) {
            Ok(value) => output::print_json(&value),
            Err(e) => warn!("failed to serialize results: {e}"),
        }
    }

    failures
}

async fn query(mode: Mode, input: &str, config: &LookupConfig) -> QueryReport {
    let mut report = QueryReport::new(input);

    if mode.attributes() {
        match get_character_attributes(input, config).await {
            Ok(attrs) => report.attributes = Some(attrs),
            Err(e) => report.push_error(e),
        }
    }

    if mode.meaning() {
        match get_character_meaning(input, config).await {
            Ok(meaning) => report.meaning = Some(meaning),
            Err(e) => report.push_error(e),
        }
    }

    report
}

/// Human-readable block for one input, followed by a blank line.
pub fn render_text(s: &Styled, report: &QueryReport) -> String {
    let mut lines = vec![output::format_heading(s, &report.input)];

    if let Some(attrs) = &report.attributes {
        for (key, value) in attrs.iter() {
            lines.push(output::format_field(s, key, value));
        }
    }
    if let Some(meaning) = &report.meaning {
        lines.push(output::format_field(s, "meaning", meaning));
    }
    for err in &report.errors {
        lines.push(output::format_error(s, &report.input, err));
    }

    lines.push(String::new());
    lines.join("\n")
}
