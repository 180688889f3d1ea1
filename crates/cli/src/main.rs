mod render;

use std::fs;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use hed_toolchain_core::{ParsedHedString, ParsedHedSubstring, parse_hed_string};
use hed_toolchain_diagnostics::{self as diag, Diagnostic, Severity};
use hed_toolchain_schema::loader::load_schema_from_str;
use hed_toolchain_schema::{Schema, SchemaLoader, SchemaSpec, Schemas, SchemasSpec};
use indexmap::IndexMap;
use log::{debug, info, warn};
use serde::Serialize;

use crate::render::{Format, print_summary, render_issues};

// ── Embedded schema ─────────────────────────────────────────────────────

/// Default schema baked into the binary at compile time.
/// Present when `schemas/HED8.3.0-subset.jsonc` existed during `cargo build`.
#[cfg(has_embedded_schema)]
const EMBEDDED_SCHEMA_JSON: &str = include_str!(concat!(env!("OUT_DIR"), "/schema.jsonc"));

#[cfg(not(has_embedded_schema))]
const EMBEDDED_SCHEMA_JSON: &str = "";

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "hed",
    version,
    about = "HED toolchain: parse, check, and convert HED annotation strings"
)]
struct Cli {
    /// Output mode: "pretty" for coloured terminal output, "json" for
    /// machine-readable JSON. Defaults to "pretty" when stdout is a TTY,
    /// "json" otherwise.
    #[arg(long, global = true, value_parser = ["pretty", "json"])]
    output: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    /// `RUST_LOG` applies when no -v is given.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(flatten)]
    schemas: SchemaArgs,

    #[command(subcommand)]
    cmd: Cmd,
}

/// Which schemas HED strings are resolved against.
#[derive(Args, Debug)]
struct SchemaArgs {
    /// Base schema file (JSON or JSONC). Defaults to the embedded schema.
    #[arg(long, global = true, env = "HED_SCHEMA")]
    schema: Option<PathBuf>,

    /// Schema version spec to look up in --schema-dir, as in a BIDS
    /// `HEDVersion` field: `8.3.0`, `sc:score_1.0.0`. Repeatable.
    #[arg(long = "hed-version", global = true, value_name = "SPEC")]
    hed_versions: Vec<String>,

    /// Directory searched for `HED<version>.json(c)` files. Repeatable.
    #[arg(long = "schema-dir", global = true, value_name = "DIR")]
    schema_dirs: Vec<PathBuf>,

    /// Library schema file for a prefix, as `NICK=PATH`. Repeatable.
    #[arg(long = "library", global = true, value_name = "NICK=PATH")]
    libraries: Vec<String>,

    /// Skip tag resolution and check syntax only.
    #[arg(long, global = true, conflicts_with_all = ["schema", "hed_versions", "libraries"])]
    syntax_only: bool,
}

/// HED strings to process: one on the command line, or one per line of a file.
#[derive(Args, Debug)]
struct InputArgs {
    /// HED string to process.
    #[arg(conflicts_with = "file")]
    string: Option<String>,

    /// Read HED strings from a file, one per line (`-` for stdin).
    #[arg(long, short)]
    file: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Parse HED strings and print their tree.
    Parse {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Check HED strings and report syntax and conversion issues.
    Check {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Convert HED strings to long or short form.
    Convert {
        #[command(flatten)]
        input: InputArgs,
        /// Target form.
        #[arg(long, value_enum, default_value_t = TagForm::Short)]
        to: TagForm,
    },

    /// Explain an issue code (e.g. commaMissing).
    Explain { code: String },
}

/// Target form for the `convert` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TagForm {
    /// Full path from the schema root.
    Long,
    /// Shortest unambiguous form.
    Short,
}

// ── Main ────────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let format = Format::resolve_or_detect(cli.output.as_deref());

    if let Err(err) = run(cli, format) {
        match format {
            Format::Json => {
                let out = serde_json::json!({
                    "success": false,
                    "error": "command_failed",
                    "message": format!("{err:#}"),
                });
                println!("{out}");
            }
            Format::Pretty => eprintln!("error: {err:#}"),
        }
        process::exit(1);
    }
}

fn run(cli: Cli, format: Format) -> Result<()> {
    match cli.cmd {
        Cmd::Parse { input } => {
            let inputs = read_inputs(&input)?;
            cmd_parse(&inputs, &resolve_schemas(&cli.schemas)?, format)
        }
        Cmd::Check { input } => {
            let inputs = read_inputs(&input)?;
            cmd_check(&inputs, &resolve_schemas(&cli.schemas)?, format)
        }
        Cmd::Convert { input, to } => {
            let inputs = read_inputs(&input)?;
            cmd_convert(&inputs, &resolve_schemas(&cli.schemas)?, to, format)
        }
        Cmd::Explain { code } => cmd_explain(&code, format),
    }
}

fn init_logging(verbose: u8) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    match verbose {
        0 => {}
        1 => {
            builder.filter_level(log::LevelFilter::Info);
        }
        2 => {
            builder.filter_level(log::LevelFilter::Debug);
        }
        _ => {
            builder.filter_level(log::LevelFilter::Trace);
        }
    }
    builder.format_timestamp(None).init();
}

// ── Commands ────────────────────────────────────────────────────────────

/// Per-line result in JSON output.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LineReport<'a, T: Serialize> {
    line: usize,
    source: &'a str,
    #[serde(flatten)]
    result: T,
}

fn cmd_parse(inputs: &[Input], schemas: &Schemas, format: Format) -> Result<()> {
    let parsed: Vec<ParsedHedString> = inputs
        .iter()
        .map(|input| parse_hed_string(&input.text, schemas))
        .collect();

    match format {
        Format::Json => {
            let reports: Vec<_> = inputs
                .iter()
                .zip(&parsed)
                .map(|(input, result)| LineReport {
                    line: input.line,
                    source: &input.source,
                    result,
                })
                .collect();
            let out = serde_json::json!({
                "success": parsed.iter().all(ParsedHedString::is_ok),
                "strings": reports,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            for (input, result) in inputs.iter().zip(&parsed) {
                println!("{}", result.hed_string());
                print_tree(result.tree(), 1);
                draw_issues(input, result);
            }
        }
    }

    exit_on_errors(&collect_issues(&parsed));
    Ok(())
}

fn cmd_check(inputs: &[Input], schemas: &Schemas, format: Format) -> Result<()> {
    let parsed: Vec<ParsedHedString> = inputs
        .iter()
        .map(|input| parse_hed_string(&input.text, schemas))
        .collect();
    let all = collect_issues(&parsed);
    info!(
        "checked {} HED string(s), {} issue(s)",
        parsed.len(),
        all.len()
    );

    match format {
        Format::Json => {
            let reports: Vec<_> = inputs
                .iter()
                .zip(&parsed)
                .map(|(input, result)| LineReport {
                    line: input.line,
                    source: &input.source,
                    result: serde_json::json!({
                        "hedString": result.hed_string(),
                        "issues": result.issues(),
                    }),
                })
                .collect();
            let out = serde_json::json!({
                "success": !all.iter().any(Diagnostic::is_error),
                "strings": reports,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            for (input, result) in inputs.iter().zip(&parsed) {
                draw_issues(input, result);
            }
            print_summary(&all, parsed.len());
        }
    }

    exit_on_errors(&all);
    Ok(())
}

fn cmd_convert(inputs: &[Input], schemas: &Schemas, to: TagForm, format: Format) -> Result<()> {
    if schemas.is_syntax_only() {
        warn!("no schema loaded; tags are printed as written");
    }
    let long = to == TagForm::Long;
    let parsed: Vec<ParsedHedString> = inputs
        .iter()
        .map(|input| parse_hed_string(&input.text, schemas))
        .collect();

    match format {
        Format::Json => {
            let reports: Vec<_> = inputs
                .iter()
                .zip(&parsed)
                .map(|(input, result)| LineReport {
                    line: input.line,
                    source: &input.source,
                    result: serde_json::json!({
                        "hedString": result.hed_string(),
                        "converted": result.is_ok().then(|| result.format(long)),
                        "issues": result.issues(),
                    }),
                })
                .collect();
            let out = serde_json::json!({
                "success": parsed.iter().all(ParsedHedString::is_ok),
                "strings": reports,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            for (input, result) in inputs.iter().zip(&parsed) {
                if result.is_ok() {
                    println!("{}", result.format(long));
                } else {
                    draw_issues(input, result);
                }
            }
        }
    }

    exit_on_errors(&collect_issues(&parsed));
    Ok(())
}

fn cmd_explain(code: &str, format: Format) -> Result<()> {
    match format {
        Format::Json => {
            let out = serde_json::json!({
                "id": code,
                "hedCode": diag::hed_code_for(code),
                "explanation": diag::explain(code),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            use ariadne::Fmt;
            match (diag::explain(code), diag::hed_code_for(code)) {
                (Some(text), Some(hed_code)) => {
                    println!("{} [{hed_code}]: {text}", code.fg(ariadne::Color::Cyan));
                }
                (Some(text), None) => println!("{}: {text}", code.fg(ariadne::Color::Cyan)),
                _ => println!("{code}: (no explanation available)"),
            }
        }
    }
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// One HED string and where it came from.
#[derive(Debug)]
struct Input {
    /// 1-based line number; 1 for a string given on the command line.
    line: usize,
    /// `<string>`, `<stdin>`, or the file path.
    source: String,
    text: String,
}

/// Collect the strings to process. Blank lines of a file are skipped.
fn read_inputs(args: &InputArgs) -> Result<Vec<Input>> {
    if let Some(text) = &args.string {
        return Ok(vec![Input {
            line: 1,
            source: "<string>".to_string(),
            text: text.clone(),
        }]);
    }
    let Some(path) = &args.file else {
        bail!("no HED string given; pass a string or --file PATH");
    };

    let (source, lines) = if path == "-" {
        let lines = io::stdin()
            .lock()
            .lines()
            .collect::<io::Result<Vec<_>>>()
            .context("failed to read stdin")?;
        ("<stdin>".to_string(), lines)
    } else {
        let text = fs::read_to_string(path).with_context(|| format!("failed to read '{path}'"))?;
        (path.clone(), text.lines().map(str::to_string).collect())
    };

    let inputs: Vec<Input> = lines
        .into_iter()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(index, text)| Input {
            line: index + 1,
            source: source.clone(),
            text,
        })
        .collect();
    debug!("read {} HED string(s) from {source}", inputs.len());
    Ok(inputs)
}

/// Build the schema collection from, in priority order:
///   1. `--syntax-only`
///   2. `--schema` / `HED_SCHEMA`, `--hed-version` and `--library`
///   3. The schema embedded in the binary, as base schema
///
/// Falls back to syntax checks only when no schema is available.
fn resolve_schemas(args: &SchemaArgs) -> Result<Schemas> {
    if args.syntax_only {
        return Ok(Schemas::syntax_only());
    }

    let mut specs = SchemasSpec::new();
    if let Some(path) = &args.schema {
        specs.add_schema_spec(SchemaSpec::new("", "", "").with_path(path))?;
    }
    for version in &args.hed_versions {
        let spec = SchemaSpec::parse(version)
            .with_context(|| format!("invalid --hed-version '{version}'"))?;
        specs.add_schema_spec(spec)?;
    }
    for library in &args.libraries {
        let (nickname, path) = library
            .split_once('=')
            .with_context(|| format!("invalid --library '{library}', expected NICK=PATH"))?;
        specs
            .add_schema_spec(SchemaSpec::new(nickname, "", "").with_path(path))
            .with_context(|| format!("invalid --library '{library}'"))?;
    }

    let loader = args
        .schema_dirs
        .iter()
        .fold(SchemaLoader::new(), |loader, dir| loader.with_search_dir(dir));
    let loaded = loader
        .load_schemas(&specs)
        .context("failed to load schemas")?;

    let mut schemas: IndexMap<String, Arc<Schema>> = IndexMap::with_capacity(loaded.len() + 1);
    if !specs.iter().any(|spec| spec.nickname.is_empty()) {
        match embedded_schema()? {
            Some(base) => {
                debug!("using embedded schema {}", base.local_name());
                schemas.insert(String::new(), Arc::new(base));
            }
            None if specs.is_empty() => {
                warn!("no schema available; checking syntax only");
                return Ok(Schemas::syntax_only());
            }
            None => {}
        }
    }
    schemas.extend(
        loaded
            .iter()
            .map(|(nickname, schema)| (nickname.to_string(), Arc::clone(schema))),
    );
    Ok(Schemas::new(schemas))
}

fn embedded_schema() -> Result<Option<Schema>> {
    if EMBEDDED_SCHEMA_JSON.is_empty() {
        return Ok(None);
    }
    let schema =
        load_schema_from_str(EMBEDDED_SCHEMA_JSON).context("failed to load embedded schema")?;
    Ok(Some(schema))
}

fn draw_issues(input: &Input, result: &ParsedHedString) {
    let issues: Vec<Diagnostic> = result.issues().all().cloned().collect();
    let origin = format!("{}:{}", input.source, input.line);
    render_issues(&input.text, &origin, &issues);
}

fn collect_issues(parsed: &[ParsedHedString]) -> Vec<Diagnostic> {
    parsed
        .iter()
        .flat_map(|result| result.issues().all().cloned())
        .collect()
}

/// Print a tree as indented short forms, with the long form alongside.
fn print_tree(nodes: &[ParsedHedSubstring], depth: usize) {
    let indent = "  ".repeat(depth);
    for node in nodes {
        match node {
            ParsedHedSubstring::Tag(tag) => {
                let (short, long) = (tag.format(false), tag.format(true));
                if short == long {
                    println!("{indent}{short}");
                } else {
                    println!("{indent}{short}  ({long})");
                }
            }
            ParsedHedSubstring::Group(group) => {
                println!("{indent}(");
                print_tree(group.children(), depth + 1);
                println!("{indent})");
            }
            ParsedHedSubstring::ColumnSplice(splice) => println!("{indent}{}", splice.format()),
        }
    }
}

/// Exit with code 1 if any diagnostic is an error.
/// Warnings and info do not cause a non-zero exit.
fn exit_on_errors(diagnostics: &[Diagnostic]) {
    if diagnostics
        .iter()
        .any(|d| matches!(d.severity, Severity::Error))
    {
        process::exit(1);
    }
}
