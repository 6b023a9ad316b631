use console::{measure_text_width, Style};

use crate::scoring::{Analysis, DetailedAnalysis, Filter, SdgCategory};
use crate::settings::ModelSettings;

pub const TREE_BRANCH: char = '\u{251C}';
pub const TREE_END: char = '\u{2514}';
pub const TREE_HORIZ: char = '\u{2500}';
pub const TREE_VERT: char = '\u{2502}';

const TREE_PREFIX_WIDTH: usize = 4;
const VALUE_COLUMN: usize = 25;
const PREVIEW_CHARS: usize = 60;

fn tree_branch() -> String {
    dim()
        .apply_to(format!("{}{}{} ", TREE_BRANCH, TREE_HORIZ, TREE_HORIZ))
        .to_string()
}

fn tree_end() -> String {
    dim()
        .apply_to(format!("{}{}{} ", TREE_END, TREE_HORIZ, TREE_HORIZ))
        .to_string()
}

fn tree_indent() -> String {
    dim().apply_to(format!("{}   ", TREE_VERT)).to_string()
}

fn tree_blank() -> String {
    " ".repeat(TREE_PREFIX_WIDTH)
}

fn branch_for(index: usize, count: usize) -> String {
    if index + 1 == count {
        tree_end()
    } else {
        tree_branch()
    }
}

pub fn dim() -> Style {
    Style::new().dim()
}

fn blue() -> Style {
    Style::new().blue()
}

fn magenta() -> Style {
    Style::new().magenta()
}

fn cyan() -> Style {
    Style::new().cyan()
}

fn green() -> Style {
    Style::new().green()
}

fn red() -> Style {
    Style::new().red()
}

fn yellow() -> Style {
    Style::new().yellow()
}

fn bold() -> Style {
    Style::new().bold()
}

fn init_prefix() -> String {
    blue().apply_to("[INIT]").to_string()
}

fn ml_prefix() -> String {
    yellow().apply_to("[ML]").to_string()
}

fn fallback_prefix() -> String {
    magenta().apply_to("[FALLBACK]").to_string()
}

pub fn pad_label(label: &str, depth: usize) -> String {
    let prefix_width = depth * TREE_PREFIX_WIDTH;
    let target_width = VALUE_COLUMN.saturating_sub(prefix_width);
    let current_width = measure_text_width(label);
    if current_width < target_width {
        format!("{}{}", label, " ".repeat(target_width - current_width))
    } else {
        format!("{} ", label)
    }
}

fn confidence_style(confidence: f32) -> Style {
    if confidence >= 0.70 {
        green()
    } else if confidence >= 0.40 {
        yellow()
    } else {
        dim()
    }
}

pub fn format_confidence(confidence: f32) -> String {
    confidence_style(confidence)
        .apply_to(format!("{:.2}", confidence))
        .to_string()
}

fn preview(text: &str) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() > PREVIEW_CHARS {
        format!("{}...", flat.chars().take(PREVIEW_CHARS - 3).collect::<String>())
    } else {
        flat
    }
}

pub fn log_init(settings: &ModelSettings, categories: &[SdgCategory]) {
    eprintln!(
        "{} starting sdg-extractor with {} backend...",
        init_prefix(),
        cyan().apply_to(settings.backend),
    );
    eprintln!(
        "{} {} categories loaded, model path {}",
        init_prefix(),
        bold().apply_to(categories.len()),
        dim().apply_to(&settings.model_path),
    );
}

pub fn log_ml_step(step: &str) {
    eprintln!("{} {}", ml_prefix(), step);
}

pub fn log_ml_model_loaded(name: &str, elapsed_secs: f32) {
    eprintln!(
        "{} {} {} {}",
        ml_prefix(),
        green().apply_to("loaded"),
        bold().apply_to(name),
        dim().apply_to(format!("({:.1}s)", elapsed_secs)),
    );
}

pub fn log_ml_ready() {
    eprintln!("{} model ready!", ml_prefix());
}

pub fn log_ml_error(error: &str) {
    eprintln!("{} {}", ml_prefix(), red().apply_to(error));
}

pub fn log_fallback(reason: &str) {
    eprintln!("{} {}", fallback_prefix(), dim().apply_to(reason));
}

pub fn log_input_rejected(filter: &Filter, length: usize, min_length: usize) {
    eprintln!(
        "{} {} ({}: {} of {} chars)",
        init_prefix(),
        red().apply_to("input rejected"),
        filter,
        bold().apply_to(length),
        dim().apply_to(min_length),
    );
}

pub fn log_document_header(title: &str, text: &str) {
    let heading = if title.is_empty() {
        preview(text)
    } else {
        title.to_string()
    };
    println!(
        "{} \"{}\"",
        magenta().apply_to(bold().apply_to("[SDG ANALYSIS]")),
        dim().apply_to(heading)
    );
}

/// Prints the fused report as a tree: the ranked goals with both component
/// scores, followed by the source counts and the summary.
pub fn log_report(analysis: &Analysis) {
    let report = &analysis.report;
    let mut lines: Vec<String> = Vec::new();

    lines.push(String::new());
    lines.push(format!("{}", bold().apply_to("SOURCES")));
    lines.push(format!(
        "{}{} {}",
        tree_branch(),
        pad_label("rule matches", 1),
        bold().apply_to(analysis.rule_results.len())
    ));
    lines.push(format!(
        "{}{} {}",
        tree_end(),
        pad_label("model predictions", 1),
        bold().apply_to(analysis.semantic_results.len())
    ));

    lines.push(String::new());
    lines.push(format!("{}", bold().apply_to("TOP SDGS")));

    if report.top_3_sdgs.is_empty() {
        let status = match analysis.no_signal() {
            Some(sentinel) => sentinel.sdg_name.clone(),
            None => "none".to_string(),
        };
        lines.push(format!("{}{}", tree_end(), dim().apply_to(status)));
    }

    let count = report.top_3_sdgs.len();
    for (i, entry) in report.top_3_sdgs.iter().enumerate() {
        let last = i + 1 == count;
        let indent = if last { tree_blank() } else { tree_indent() };

        lines.push(format!(
            "{}{} {} {}",
            branch_for(i, count),
            bold().apply_to(format!("SDG {}", entry.sdg_number)),
            entry.sdg_name,
            dim().apply_to(format!("({})", entry.confidence_level)),
        ));
        lines.push(format!(
            "{}{}{}{}",
            indent,
            tree_branch(),
            pad_label("combined", 2),
            format_confidence(entry.combined_confidence)
        ));
        lines.push(format!(
            "{}{}{}{}",
            indent,
            tree_branch(),
            pad_label("rule", 2),
            format_confidence(entry.rule_confidence)
        ));
        lines.push(format!(
            "{}{}{}{}",
            indent,
            tree_branch(),
            pad_label("semantic", 2),
            format_confidence(entry.semantic_confidence)
        ));
        let keywords = if entry.matched_keywords.is_empty() {
            dim().apply_to("none".to_string()).to_string()
        } else {
            cyan().apply_to(entry.matched_keywords.join(", ")).to_string()
        };
        lines.push(format!(
            "{}{}{}{}",
            indent,
            tree_branch(),
            pad_label("keywords", 2),
            keywords
        ));
        lines.push(format!(
            "{}{}{}{}",
            indent,
            tree_end(),
            pad_label("scope", 2),
            dim().apply_to(entry.inclusion_scope)
        ));
    }

    lines.push(String::new());
    lines.push(format!("{}", bold().apply_to("SUMMARY")));
    lines.push(format!(
        "{}{}{}",
        tree_branch(),
        pad_label("levels", 1),
        dim().apply_to(format!(
            "high {}, medium {}, low {}",
            report.confidence_levels.high,
            report.confidence_levels.medium,
            report.confidence_levels.low
        ))
    ));
    lines.push(format!("{}{}", tree_end(), report.overall_summary));

    println!("{}\n", lines.join("\n"));
}

pub fn log_detailed_analysis(analysis: &DetailedAnalysis) {
    let mut lines: Vec<String> = vec![format!("{}", bold().apply_to("MODEL ONLY"))];

    let count = analysis.top_3_sdgs.len();
    for (i, prediction) in analysis.top_3_sdgs.iter().enumerate() {
        lines.push(format!(
            "{}{}{}",
            branch_for(i, count + 1),
            pad_label(&format!("SDG {} {}", prediction.sdg_number, prediction.sdg_name), 1),
            format_confidence(prediction.confidence)
        ));
    }
    lines.push(format!("{}{}", tree_end(), analysis.explanation));

    println!("{}\n", lines.join("\n"));
}
