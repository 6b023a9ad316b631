use anyhow::Result;
use sdg_extractor::document::Document;
use sdg_extractor::scoring::{
    apply_filters, load_categories, Analyzer, FilterResult, MLHandle,
};
use sdg_extractor::settings::settings;
use sdg_extractor::utils::{
    log_detailed_analysis, log_document_header, log_init, log_input_rejected, log_report,
};
use std::env;
use std::path::Path;
use std::process;
use tracing::subscriber::set_global_default;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn print_usage() {
    eprintln!("Usage: sdg-extractor <path|text> [--json|-j] [--model-only|-m]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <path>        Document bundle (.json) or plain text file");
    eprintln!("  <text>        Raw text to analyze");
    eprintln!("  --json        Print the analysis as JSON");
    eprintln!("  --model-only  Only run the classifier, without rule matching or fusion");
}

fn is_flag(arg: &str) -> bool {
    matches!(arg, "--json" | "-j" | "--model-only" | "-m")
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("sdg_extractor=info".parse()?))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        );
    set_global_default(subscriber)?;

    let args: Vec<String> = env::args().collect();
    let json_output = args.iter().any(|a| a == "--json" || a == "-j");
    let model_only = args.iter().any(|a| a == "--model-only" || a == "-m");

    let inputs: Vec<&str> = args
        .iter()
        .skip(1)
        .map(String::as_str)
        .filter(|a| !is_flag(a))
        .collect();

    if inputs.is_empty() {
        print_usage();
        process::exit(1);
    }

    let input = inputs.join(" ");
    let path = Path::new(&input);
    let document = if inputs.len() == 1 && path.is_file() {
        Document::from_path(path)?
    } else {
        Document::from_plain_text(input.clone())
    };
    let text = document.analysis_text();

    let s = settings();
    if let FilterResult::Reject(filter) = apply_filters(&text) {
        log_input_rejected(&filter, text.trim().chars().count(), s.input.min_text_length);
        process::exit(1);
    }

    let categories = load_categories(s.categories.path.as_deref());
    log_init(&s.model, &categories);
    let ml_handle = MLHandle::spawn(s.model.clone())?;

    if model_only {
        let detailed = ml_handle.detailed_analysis(text).await;
        if json_output {
            println!("{}", serde_json::to_string_pretty(&detailed)?);
        } else {
            log_document_header(&document.title, &document.full_text);
            log_detailed_analysis(&detailed);
        }
        return Ok(());
    }

    let analyzer = Analyzer::new(categories, ml_handle, s.model.top_k);
    let analysis = analyzer.analyze(&text).await;

    if json_output {
        let output = analysis.to_output(Some(document.summary()));
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        log_document_header(&document.title, &document.full_text);
        log_report(&analysis);
    }

    Ok(())
}
