use std::path::{Path, PathBuf};
use std::process;

use clap::{Arg, ArgAction, Command};
use regex::Regex;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use linguist_i18n::ts::{TranslationStatus, TsDocument};
use linguist_i18n::{check, loader, parser, writer};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("linguist-i18n")
        .version("0.1.0")
        .about("Inspect and validate Qt Linguist translation catalogs (.ts files)")
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .help("Enable debug logging")
                .action(ArgAction::SetTrue),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("stats")
                .about("Per-context message and translation-status counts")
                .arg(
                    Arg::new("files")
                        .help("Catalog files to summarize")
                        .value_name("FILE")
                        .required(true)
                        .num_args(1..),
                )
                .arg(
                    Arg::new("context")
                        .long("context")
                        .short('c')
                        .help("Only contexts whose name matches this regex"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Emit JSON instead of text")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Audit catalogs for placeholder drift and duplicate messages")
                .arg(
                    Arg::new("files")
                        .help("Catalog files to audit")
                        .value_name("FILE")
                        .required(true)
                        .num_args(1..),
                )
                .arg(
                    Arg::new("context")
                        .long("context")
                        .short('c')
                        .help("Only contexts whose name matches this regex"),
                ),
        )
        .subcommand(
            Command::new("query")
                .about("Look up one message, with %N substitution")
                .arg(
                    Arg::new("file")
                        .help("Catalog file")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("context")
                        .help("Context name (e.g. PdfExportConfig)")
                        .required(true)
                        .index(2),
                )
                .arg(
                    Arg::new("source")
                        .help("Source string to look up")
                        .required(true)
                        .index(3),
                )
                .arg(
                    Arg::new("comment")
                        .long("comment")
                        .help("Disambiguation comment"),
                )
                .arg(
                    Arg::new("arg")
                        .long("arg")
                        .short('a')
                        .help("Value for the next positional %N marker (repeatable)")
                        .action(ArgAction::Append),
                ),
        )
        .subcommand(
            Command::new("dump")
                .about("Re-serialize a catalog (round-trip) or dump it as JSON")
                .arg(
                    Arg::new("file")
                        .help("Catalog file")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Emit JSON instead of TS XML")
                        .action(ArgAction::SetTrue),
                ),
        )
        .get_matches();

    init_tracing(matches.get_flag("verbose"));

    match matches.subcommand() {
        Some(("stats", sub)) => {
            let filter = context_filter(sub.get_one::<String>("context"))?;
            let files: Vec<PathBuf> = sub
                .get_many::<String>("files")
                .unwrap()
                .map(PathBuf::from)
                .collect();
            run_stats(&files, filter.as_ref(), sub.get_flag("json"))
        }
        Some(("check", sub)) => {
            let filter = context_filter(sub.get_one::<String>("context"))?;
            let files: Vec<PathBuf> = sub
                .get_many::<String>("files")
                .unwrap()
                .map(PathBuf::from)
                .collect();
            run_check(&files, filter.as_ref())
        }
        Some(("query", sub)) => {
            let file = PathBuf::from(sub.get_one::<String>("file").unwrap());
            let context = sub.get_one::<String>("context").unwrap();
            let source = sub.get_one::<String>("source").unwrap();
            let comment = sub.get_one::<String>("comment").map(String::as_str);
            let values: Vec<&str> = sub
                .get_many::<String>("arg")
                .map(|vals| vals.map(String::as_str).collect())
                .unwrap_or_default();
            run_query(&file, context, source, comment, &values)
        }
        Some(("dump", sub)) => {
            let file = PathBuf::from(sub.get_one::<String>("file").unwrap());
            run_dump(&file, sub.get_flag("json"))
        }
        _ => unreachable!("subcommand required"),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "linguist_i18n=debug"
    } else {
        "linguist_i18n=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

fn context_filter(pattern: Option<&String>) -> Result<Option<Regex>, Box<dyn std::error::Error>> {
    match pattern {
        Some(p) => Ok(Some(Regex::new(p)?)),
        None => Ok(None),
    }
}

#[derive(Serialize)]
struct ContextStats {
    name: String,
    messages: usize,
    finished: usize,
    unfinished: usize,
    vanished: usize,
    obsolete: usize,
}

#[derive(Serialize)]
struct FileStats {
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<String>,
    contexts: Vec<ContextStats>,
}

fn collect_stats(path: &Path, doc: &TsDocument, filter: Option<&Regex>) -> FileStats {
    let contexts = doc
        .contexts
        .iter()
        .filter(|ctx| filter.is_none_or(|re| re.is_match(&ctx.name)))
        .map(|ctx| {
            let count = |status: TranslationStatus| {
                ctx.messages
                    .iter()
                    .filter(|m| m.translation.status == status)
                    .count()
            };
            ContextStats {
                name: ctx.name.clone(),
                messages: ctx.messages.len(),
                finished: count(TranslationStatus::Finished),
                unfinished: count(TranslationStatus::Unfinished),
                vanished: count(TranslationStatus::Vanished),
                obsolete: count(TranslationStatus::Obsolete),
            }
        })
        .collect();
    FileStats {
        file: path.display().to_string(),
        language: doc.language.clone(),
        contexts,
    }
}

fn run_stats(
    files: &[PathBuf],
    filter: Option<&Regex>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut all = Vec::new();
    for path in files {
        let doc = parser::parse_file(path)?;
        all.push(collect_stats(path, &doc, filter));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&all)?);
        return Ok(());
    }

    for stats in &all {
        let messages: usize = stats.contexts.iter().map(|c| c.messages).sum();
        let finished: usize = stats.contexts.iter().map(|c| c.finished).sum();
        let unfinished: usize = stats.contexts.iter().map(|c| c.unfinished).sum();
        let vanished: usize = stats.contexts.iter().map(|c| c.vanished).sum();
        let obsolete: usize = stats.contexts.iter().map(|c| c.obsolete).sum();
        println!(
            "{} ({}): {} contexts, {} messages, {} finished, {} unfinished, {} vanished, {} obsolete",
            stats.file,
            stats.language.as_deref().unwrap_or("unknown locale"),
            stats.contexts.len(),
            messages,
            finished,
            unfinished,
            vanished,
            obsolete
        );
        for ctx in &stats.contexts {
            println!(
                "  {}: {} messages, {} finished, {} unfinished, {} vanished, {} obsolete",
                ctx.name, ctx.messages, ctx.finished, ctx.unfinished, ctx.vanished, ctx.obsolete
            );
        }
    }
    Ok(())
}

fn run_check(files: &[PathBuf], filter: Option<&Regex>) -> Result<(), Box<dyn std::error::Error>> {
    let mut errors = 0usize;
    let mut warnings = 0usize;

    for path in files {
        let doc = parser::parse_file(path)?;
        let issues: Vec<_> = check::audit(&doc)
            .into_iter()
            .filter(|issue| filter.is_none_or(|re| re.is_match(&issue.context)))
            .collect();
        for issue in &issues {
            println!("{}: {}", path.display(), issue);
            match issue.severity() {
                check::Severity::Error => errors += 1,
                check::Severity::Warning => warnings += 1,
            }
        }
    }

    println!("{} error(s), {} warning(s)", errors, warnings);
    if errors > 0 {
        process::exit(1);
    }
    Ok(())
}

fn run_query(
    file: &Path,
    context: &str,
    source: &str,
    comment: Option<&str>,
    values: &[&str],
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = loader::load_catalog_from_file(file)?;
    println!("{}", catalog.translate(context, source, comment, values));
    Ok(())
}

fn run_dump(file: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let doc = parser::parse_file(file)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        print!("{}", writer::to_string(&doc)?);
    }
    Ok(())
}
