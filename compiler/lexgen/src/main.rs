//! `lexgen` command-line tool.
//!
//! ```text
//! lexgen check <rules.json>             validate a rule file
//! lexgen emit <rules.json> [-o FILE]    print the flex grammar
//! lexgen build <rules.json>             build (or find) the scanner module
//! lexgen scan <rules.json> [INPUT]      tokenize INPUT, or stdin
//! lexgen cache path|count|clear         inspect the scratch directory
//! ```
//!
//! Set `RUST_LOG` (for example `RUST_LOG=lexgen_build=debug`) for tracing
//! output; `--tree` renders it as a span tree.

use std::fs;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use lexgen::{BuildCache, BuildConfig, CompileOptions, Error, Lexgen, RuleFile, RuleSet};

#[derive(Debug, Parser)]
#[command(name = "lexgen", version, about = "Compile declarative tokenizers to native scanners")]
struct Cli {
    /// Scratch directory for build artifacts (default: LEXGEN_SCRATCH_DIR, then
    /// next to the executable, then the system temp directory).
    #[arg(long, global = true, value_name = "DIR")]
    scratch_dir: Option<PathBuf>,

    /// Pass `\s`, `\d` and `\w` through to flex untranslated.
    #[arg(long, global = true)]
    no_shorthands: bool,

    /// Render tracing output as a span tree.
    #[arg(long, global = true)]
    tree: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate a rule file and list the token kinds it produces.
    Check { rules: PathBuf },
    /// Print the generated flex grammar.
    Emit {
        rules: PathBuf,
        /// Write to FILE instead of stdout.
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Build the scanner module and print its path.
    Build { rules: PathBuf },
    /// Tokenize a file (or stdin) and print one token per line.
    Scan {
        rules: PathBuf,
        input: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Inspect or clear the scratch directory.
    Cache {
        #[arg(value_enum)]
        action: CacheAction,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    /// `kind<TAB>"text"`
    Text,
    /// One JSON object per line.
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CacheAction {
    Path,
    Count,
    Clear,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.tree {
        lexgen::init_tracing_tree();
    } else {
        lexgen::init_tracing();
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Error> {
    let options = CompileOptions::new().with_shorthands(!cli.no_shorthands);
    match &cli.command {
        Command::Check { rules } => {
            let rule_set = rule_set(rules, options)?;
            println!("hash   {}", rule_set.content_hash());
            for name in rule_set.emitting_names() {
                println!("emits  {name}");
            }
            Ok(())
        }
        Command::Emit { rules, output } => {
            let grammar = lexgen_emit::render(&rule_set(rules, options)?);
            match output {
                Some(path) => fs::write(path, grammar.as_str()).map_err(io_error(path)),
                None => {
                    print!("{}", grammar.as_str());
                    Ok(())
                }
            }
        }
        Command::Build { rules } => {
            let lexgen = open(cli, options)?;
            let rule_set = lexgen.rule_set(&RuleFile::load(rules)?.rules)?;
            let artifact = lexgen.artifact(&rule_set)?;
            println!("{}", artifact.module_path().display());
            Ok(())
        }
        Command::Scan {
            rules,
            input,
            format,
        } => {
            let lexgen = open(cli, options)?;
            let scanner = lexgen.compile(&RuleFile::load(rules)?.rules)?;
            let tokens = match input {
                Some(path) => scanner.scan_path(path)?,
                None => {
                    let mut bytes = Vec::new();
                    io::stdin()
                        .read_to_end(&mut bytes)
                        .map_err(io_error(Path::new("<stdin>")))?;
                    scanner.scan_string(bytes)?
                }
            };
            print_tokens(tokens, *format)
        }
        Command::Cache { action } => {
            let cache = BuildCache::open(config(cli))?;
            match action {
                CacheAction::Path => println!("{}", cache.scratch_dir().display()),
                CacheAction::Count => println!("{}", cache.count()?),
                CacheAction::Clear => cache.clear()?,
            }
            Ok(())
        }
    }
}

fn config(cli: &Cli) -> BuildConfig {
    let config = BuildConfig::from_env();
    match &cli.scratch_dir {
        Some(dir) => config.with_scratch_dir(dir),
        None => config,
    }
}

fn open(cli: &Cli, options: CompileOptions) -> Result<Lexgen, Error> {
    Ok(Lexgen::with_config(config(cli))?.with_options(options))
}

fn rule_set(path: &Path, options: CompileOptions) -> Result<RuleSet, Error> {
    let file = RuleFile::load(path)?;
    Ok(lexgen::lexgen_rules::PatternCompiler::new(options).compile(&file.rules)?)
}

fn print_tokens(tokens: lexgen::TokenStream, format: Format) -> Result<(), Error> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let write_error = io_error(Path::new("<stdout>"));
    for token in tokens {
        let token = token?;
        let line = match format {
            Format::Text => format!("{}\t{:?}", token.kind, token.text),
            Format::Json => {
                serde_json::json!({ "kind": token.kind, "text": token.text }).to_string()
            }
        };
        if let Err(e) = writeln!(out, "{line}") {
            return Err(write_error(e));
        }
    }
    out.flush().map_err(write_error)
}

fn io_error(path: &Path) -> impl Fn(io::Error) -> Error + '_ {
    move |source| Error::Io {
        path: path.to_path_buf(),
        source,
    }
}
