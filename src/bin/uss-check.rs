use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use url::Url;

use uss_language_server::core::{MemoryDocuments, STYLESHEET_PATTERN};
use uss_language_server::properties::{PropertyKnowledge, PropertyRegistry};
use uss_language_server::resolve::resolve_in_workspace;
use uss_language_server::validation::{validate_document, DiagnosticKind, Severity};
use uss_language_server::{parse, Diagnostic};

/// Validate USS files from the command line
#[derive(Debug, Parser)]
#[command(name = "uss-check")]
#[command(about = "Check Unity USS style sheets for errors")]
#[command(version)]
struct Args {
    /// Skip property name and value checks
    #[arg(long)]
    no_properties: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Files to check
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

struct Checked {
    path: PathBuf,
    diagnostics: Vec<Diagnostic>,
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
    }
}

async fn load(files: &[PathBuf]) -> Result<Vec<(PathBuf, Url, String)>> {
    let mut loaded = Vec::new();
    for path in files {
        let absolute = std::path::absolute(path)
            .with_context(|| format!("Invalid path: {}", path.display()))?;
        let uri = Url::from_file_path(&absolute)
            .map_err(|_| anyhow::anyhow!("Cannot build URI for {}", absolute.display()))?;
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        loaded.push((path.clone(), uri, text));
    }
    Ok(loaded)
}

async fn check(args: &Args) -> Result<Vec<Checked>> {
    let files = load(&args.files).await?;

    let registry = PropertyRegistry::with_builtin();
    let knowledge: Option<&dyn PropertyKnowledge> = if args.no_properties {
        None
    } else {
        Some(&registry)
    };

    let mut documents = MemoryDocuments::new();
    for (_, uri, text) in &files {
        documents.insert(uri.clone(), text.clone());
    }

    let cancel = CancellationToken::new();
    let mut checked = Vec::new();

    for (path, uri, text) in &files {
        let parsed = parse(text);
        let mut diagnostics = Vec::new();

        for diagnostic in validate_document(&parsed, knowledge).diagnostics {
            // Variables may be declared in another file of the set
            let reference = (diagnostic.kind == DiagnosticKind::UndefinedVariable)
                .then(|| parsed.offset_at(diagnostic.range.start))
                .flatten()
                .and_then(|offset| parsed.variable_ref_at(offset));

            if let Some(reference) = reference {
                let found = resolve_in_workspace(
                    &reference.name,
                    uri,
                    STYLESHEET_PATTERN,
                    &documents,
                    &cancel,
                )
                .await;
                if found.is_some() {
                    log::debug!("{} resolved outside {}", reference.name, path.display());
                    continue;
                }
            }
            diagnostics.push(diagnostic);
        }

        checked.push(Checked {
            path: path.clone(),
            diagnostics,
        });
    }

    Ok(checked)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(args.log_level.as_str()),
    )
    .init();

    let checked = match check(&args).await {
        Ok(checked) => checked,
        Err(e) => {
            eprintln!("uss-check: {:#}", e);
            return ExitCode::from(2);
        }
    };

    let mut errors = 0;
    let mut warnings = 0;

    for file in &checked {
        for diagnostic in &file.diagnostics {
            match diagnostic.severity {
                Severity::Error => errors += 1,
                Severity::Warning => warnings += 1,
            }
            println!(
                "{}:{}:{}: {}: {}",
                file.path.display(),
                diagnostic.range.start.line + 1,
                diagnostic.range.start.character + 1,
                severity_label(diagnostic.severity),
                diagnostic.message
            );
        }
    }

    eprintln!(
        "{} file(s) checked: {} error(s), {} warning(s)",
        checked.len(),
        errors,
        warnings
    );

    if errors > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
