//! `sleuth rules` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use sleuth_annotator::rule::{Rule, SectionRule};
use sleuth_annotator::{CompileMode, RuleLoader, RuleSet, RuleSource, RulesDocument};
use sleuth_core::config::SleuthConfig;

use crate::cli::{RulesAction, RulesArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `rules` command.
pub async fn execute(
    args: RulesArgs,
    config: &SleuthConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        RulesAction::List { rules } => {
            let source = resolve_source(rules, config);
            execute_list(&source, writer).await
        }
        RulesAction::Validate { rules } => {
            let source = resolve_source(rules, config);
            execute_validate(&source, writer).await
        }
    }
}

fn resolve_source(flag: Option<String>, config: &SleuthConfig) -> RuleSource {
    RuleSource::parse(flag.as_deref().unwrap_or(&config.annotate.rules))
}

async fn execute_list(source: &RuleSource, writer: &OutputWriter) -> Result<(), CliError> {
    info!(source = %source, "loading rule document");

    let document = RuleLoader::load(source).await?;
    let report = RuleListReport::from_document(&source.to_string(), &document);

    writer.render(&report)?;

    Ok(())
}

async fn execute_validate(source: &RuleSource, writer: &OutputWriter) -> Result<(), CliError> {
    info!(source = %source, "validating rule document");

    let document = RuleLoader::load(source).await?;
    let rule_set = RuleSet::build(&document, CompileMode::Lenient)?;
    let report = RuleValidationReport::new(&source.to_string(), &document, &rule_set);

    writer.render(&report)?;

    if report.invalid > 0 {
        return Err(CliError::InvalidPattern(format!(
            "{} invalid rule pattern(s)",
            report.invalid
        )));
    }

    Ok(())
}

#[derive(Serialize)]
pub struct RuleListReport {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_prefix: Option<String>,
    pub total: usize,
    pub line_rules: Vec<LineRuleEntry>,
    pub section_rules: Vec<SectionRuleEntry>,
}

#[derive(Serialize)]
pub struct LineRuleEntry {
    pub pattern: String,
    pub message: String,
    pub valid: bool,
}

#[derive(Serialize)]
pub struct SectionRuleEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub pattern: String,
    pub hints: Vec<String>,
    pub valid: bool,
}

impl RuleListReport {
    /// Build a listing, compiling each pattern to flag invalid ones.
    pub fn from_document(source: &str, document: &RulesDocument) -> Self {
        let line_rules: Vec<LineRuleEntry> = document
            .line_rules
            .iter()
            .map(|def| LineRuleEntry {
                pattern: def.pattern.clone(),
                message: def.message.clone(),
                valid: Rule::compile(def).is_ok(),
            })
            .collect();

        let section_rules: Vec<SectionRuleEntry> = document
            .section_rules
            .iter()
            .map(|def| SectionRuleEntry {
                line: def.line,
                pattern: def.pattern.clone(),
                hints: def.hints.clone(),
                valid: SectionRule::compile(def).is_ok(),
            })
            .collect();

        Self {
            source: source.to_owned(),
            message_prefix: document.message_prefix.clone(),
            total: line_rules.len() + section_rules.len(),
            line_rules,
            section_rules,
        }
    }
}

impl Render for RuleListReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "Rules from {} ({} total)",
            self.source.bold(),
            self.total.to_string().bold()
        )?;
        if let Some(prefix) = &self.message_prefix {
            writeln!(w, "Prefix: {prefix}")?;
        }

        if !self.line_rules.is_empty() {
            writeln!(w)?;
            writeln!(w, "{:<4} {:<45} Message", "#", "Pattern")?;
            writeln!(w, "{}", "-".repeat(90))?;
            for (idx, r) in self.line_rules.iter().enumerate() {
                let pattern = if r.valid {
                    r.pattern.normal()
                } else {
                    r.pattern.red()
                };
                writeln!(w, "{:<4} {:<45} {}", idx, pattern, r.message)?;
            }
        }

        if !self.section_rules.is_empty() {
            writeln!(w)?;
            writeln!(w, "{:<4} {:<6} {:<45} Hints", "#", "Line", "Pattern")?;
            writeln!(w, "{}", "-".repeat(90))?;
            for (idx, r) in self.section_rules.iter().enumerate() {
                let line = r.line.map_or_else(|| "any".to_owned(), |l| l.to_string());
                let pattern = if r.valid {
                    r.pattern.normal()
                } else {
                    r.pattern.red()
                };
                writeln!(
                    w,
                    "{:<4} {:<6} {:<45} {}",
                    idx,
                    line,
                    pattern,
                    r.hints.join(" | ")
                )?;
            }
        }

        Ok(())
    }
}

#[derive(Serialize)]
pub struct RuleValidationReport {
    pub source: String,
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub errors: Vec<RuleError>,
}

#[derive(Serialize)]
pub struct RuleError {
    pub pattern: String,
    pub error: String,
}

impl RuleValidationReport {
    /// Summarise the compile result of every pattern in the document.
    pub fn new(source: &str, document: &RulesDocument, rule_set: &RuleSet) -> Self {
        let errors: Vec<RuleError> = rule_set
            .compile_failures()
            .iter()
            .map(|f| RuleError {
                pattern: f.pattern.clone(),
                error: f.reason.clone(),
            })
            .collect();

        Self {
            source: source.to_owned(),
            total: document.rule_count(),
            valid: rule_set.rule_count(),
            invalid: errors.len(),
            errors,
        }
    }
}

impl Render for RuleValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Rule Validation: {}", self.source.bold())?;
        writeln!(
            w,
            "  Patterns: {} total, {} valid, {} invalid",
            self.total,
            self.valid.to_string().green(),
            if self.invalid > 0 {
                self.invalid.to_string().red()
            } else {
                self.invalid.to_string().normal()
            }
        )?;

        if !self.errors.is_empty() {
            writeln!(w)?;
            writeln!(w, "Errors:")?;
            for e in &self.errors {
                writeln!(w, "  {}: {}", e.pattern.red(), e.error)?;
            }
        }

        Ok(())
    }
}
