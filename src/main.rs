//! hypnolint CLI - HypnoScript linter and formatter

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use glob::glob;
use hypnolint::config::{ColorMode, Config, OutputFormat};
use hypnolint::engine::{Engine, FileReport, LintResult};
use hypnolint::format::{Formatter, IndentStyle};
use hypnolint::lsp::{to_lsp_folding_ranges, to_lsp_symbols};
use hypnolint::output::formatter_for;
use hypnolint::{document_symbols, folding_ranges, DiagnosticCode, Severity, SourceDocument};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const STDIN: &str = "-";
const STDIN_NAME: &str = "<stdin>";

#[derive(Parser)]
#[command(
    name = "hypnolint",
    version,
    about = "HypnoScript linter and formatter",
    long_about = "Structural diagnostics, quick fixes and formatting for HypnoScript (.hyp) programs."
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// JSON message catalog used for diagnostic texts
    #[arg(long, global = true)]
    locale: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report diagnostics for files
    Check {
        /// Files or glob patterns (- for stdin; defaults to the configured include patterns)
        files: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<Format>,

        /// Minimum severity to report
        #[arg(long, value_enum)]
        min_severity: Option<MinSeverity>,

        /// Disable specific codes (comma-separated)
        #[arg(long, value_delimiter = ',')]
        disable: Option<Vec<String>>,

        /// Apply quick fixes (dry-run by default, use with --write to apply)
        #[arg(long)]
        fix: bool,

        /// Include unsafe fixes (they delete code)
        #[arg(long, requires = "fix")]
        unsafe_fixes: bool,

        /// Write fixes to files (requires --fix); fixed stdin is printed with text output
        #[arg(long, requires = "fix")]
        write: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Show statistics
        #[arg(long)]
        stats: bool,

        /// Number of parallel jobs (0 = auto)
        #[arg(short, long)]
        jobs: Option<usize>,
    },
    /// Re-indent files
    Fmt {
        /// Files or glob patterns (- for stdin)
        #[arg(required = true)]
        files: Vec<String>,

        /// Check if files are formatted (exit 1 if not)
        #[arg(long)]
        check: bool,

        /// Write formatted output back to files
        #[arg(short, long)]
        write: bool,

        /// Spaces (or tabs) per indent level
        #[arg(long)]
        indent_size: Option<usize>,

        /// Indent with tabs
        #[arg(long)]
        tabs: bool,
    },
    /// Print document symbols and folding ranges as JSON
    Symbols {
        /// File to outline
        file: PathBuf,
    },
    /// Show detailed information about a diagnostic code
    Explain {
        /// Code to explain (e.g. HS_NO_FOCUS)
        code: String,
    },
    /// List all diagnostic codes
    Codes,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    Lsp,
}

#[derive(Clone, Copy, ValueEnum)]
enum MinSeverity {
    Hint,
    Info,
    Warning,
    Error,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
            Format::Lsp => OutputFormat::Lsp,
        }
    }
}

impl From<MinSeverity> for Severity {
    fn from(severity: MinSeverity) -> Self {
        match severity {
            MinSeverity::Hint => Severity::Hint,
            MinSeverity::Info => Severity::Info,
            MinSeverity::Warning => Severity::Warning,
            MinSeverity::Error => Severity::Error,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logger
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = load_config(&cli)?;

    match cli.command {
        Commands::Check {
            files,
            format,
            min_severity,
            disable,
            fix,
            unsafe_fixes,
            write,
            no_color,
            stats,
            jobs,
        } => {
            config.merge_cli(
                format.map(OutputFormat::from),
                cli.verbose.then_some(true),
                jobs,
                disable,
                min_severity.map(Severity::from),
            );
            if stats {
                config.output.statistics = true;
            }
            let colored = match (no_color, config.output.color) {
                (true, _) | (false, ColorMode::Never) => false,
                (false, ColorMode::Always) => true,
                (false, ColorMode::Auto) => colored::control::SHOULD_COLORIZE.should_colorize(),
            };
            colored::control::set_override(colored);

            let engine = Engine::new(config).context("Failed to set up the linter")?;
            let options = FixOptions {
                enabled: fix,
                include_unsafe: unsafe_fixes,
                write,
            };
            handle_check(&engine, &files, &options, colored)
        }
        Commands::Fmt {
            files,
            check,
            write,
            indent_size,
            tabs,
        } => {
            if let Some(size) = indent_size {
                config.format.indent_size = size.max(1);
            }
            if tabs {
                config.format.indent_style = IndentStyle::Tab;
                if indent_size.is_none() {
                    config.format.indent_size = 1;
                }
            }
            let formatter = Formatter::new(config.format.clone()).with_facts(config.language.clone());
            handle_fmt(&formatter, &files, check, write, cli.verbose)
        }
        Commands::Symbols { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let document = SourceDocument::new(text);
            let output = serde_json::json!({
                "symbols": to_lsp_symbols(&document, &document_symbols(&document, &config.language)),
                "foldingRanges": to_lsp_folding_ranges(&folding_ranges(&document, &config.language)),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Explain { code } => {
            let code: DiagnosticCode = code.parse().map_err(anyhow::Error::msg)?;
            explain_code(code);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Codes => {
            list_codes();
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(path) = &cli.config {
        Config::load(path).with_context(|| format!("Failed to load config {}", path.display()))?
    } else {
        Config::load_default().unwrap_or_else(|e| {
            log::warn!("ignoring configuration: {}", e);
            Config::default()
        })
    };
    if let Some(locale) = &cli.locale {
        config.messages = Some(locale.clone());
    }
    Ok(config)
}

/// Expand glob patterns; plain paths are kept even when missing so they are reported
fn expand_files(patterns: &[String]) -> Result<Vec<String>> {
    let mut files = Vec::new();

    for pattern in patterns {
        if pattern == STDIN {
            files.push(STDIN.to_string());
        } else if pattern.contains(['*', '?', '[']) {
            let paths = glob(pattern).with_context(|| format!("Invalid pattern '{}'", pattern))?;
            for entry in paths.flatten() {
                if entry.is_file() {
                    files.push(entry.to_string_lossy().to_string());
                }
            }
        } else {
            files.push(pattern.clone());
        }
    }

    Ok(files)
}

fn read_stdin() -> Result<String> {
    let mut source = String::new();
    io::stdin()
        .read_to_string(&mut source)
        .context("Failed to read stdin")?;
    Ok(source)
}

struct FixOptions {
    enabled: bool,
    include_unsafe: bool,
    write: bool,
}

fn handle_check(engine: &Engine, patterns: &[String], fix: &FixOptions, colored: bool) -> Result<ExitCode> {
    let config = engine.config();
    let patterns = if patterns.is_empty() {
        config.files.include.clone()
    } else {
        patterns.to_vec()
    };

    let mut files: Vec<PathBuf> = Vec::new();
    let mut use_stdin = false;
    for file in expand_files(&patterns)? {
        if file == STDIN {
            use_stdin = true;
        } else if config.is_excluded(Path::new(&file)) {
            log::debug!("excluded: {}", file);
        } else {
            files.push(PathBuf::from(file));
        }
    }

    if files.is_empty() && !use_stdin {
        bail!("No files found to lint");
    }

    let stdin = if use_stdin { Some(read_stdin()?) } else { None };
    let mut result = engine.lint(&files);
    if let Some(text) = &stdin {
        let report = engine.lint_text(Path::new(STDIN_NAME), text.clone());
        result.merge(LintResult::from_report(report));
    }

    if fix.enabled {
        let outcome = apply_fixes(engine, &result, fix)?;
        // Structured reports own stdout
        if let Some(fixed) = &outcome.stdin_text {
            if config.output.format == OutputFormat::Text {
                io::stdout().write_all(fixed.as_bytes())?;
            } else {
                log::debug!("fixed stdin text not printed with {:?} output", config.output.format);
            }
        }
        if fix.write && outcome.changed > 0 {
            // Report what is left after fixing
            result = engine.lint(&files);
            if let Some(text) = outcome.stdin_text.or(stdin) {
                let report = engine.lint_text(Path::new(STDIN_NAME), text);
                result.merge(LintResult::from_report(report));
            }
        }
    }

    let formatter = formatter_for(config.output.format, colored, config.output.statistics);
    let output = formatter.format(&result);
    if !output.is_empty() {
        print!("{}", output);
        if config.output.format != OutputFormat::Text {
            println!();
        }
    }

    Ok(ExitCode::from(result.exit_code() as u8))
}

/// What a fix run changed
struct FixOutcome {
    /// Number of files with at least one applied fix
    changed: usize,
    /// Fixed stdin text, when stdin had fixes
    stdin_text: Option<String>,
}

/// Apply quick fixes to every report, writing files when asked
fn apply_fixes(engine: &Engine, result: &LintResult, options: &FixOptions) -> Result<FixOutcome> {
    let mut outcome = FixOutcome {
        changed: 0,
        stdin_text: None,
    };
    for report in result.files.iter().filter(|f| f.error.is_none()) {
        let fixed = engine
            .fix(report, options.include_unsafe)
            .with_context(|| format!("Failed to fix {}", report.path.display()))?;
        if fixed.applied == 0 {
            continue;
        }
        outcome.changed += 1;
        describe_fix(report, fixed.applied, fixed.skipped, options.write);
        if report.path == Path::new(STDIN_NAME) {
            outcome.stdin_text = Some(fixed.text);
        } else if options.write {
            std::fs::write(&report.path, &fixed.text)
                .with_context(|| format!("Failed to write {}", report.path.display()))?;
        }
    }
    Ok(outcome)
}

fn describe_fix(report: &FileReport, applied: usize, skipped: usize, write: bool) {
    let verb = if write { "applied" } else { "would apply" };
    let mut line = format!("{}: {} {} fix(es)", report.path.display(), verb, applied);
    if skipped > 0 {
        line.push_str(&format!(", {} skipped", skipped));
    }
    eprintln!("{}", line);
}

fn handle_fmt(formatter: &Formatter, patterns: &[String], check: bool, write: bool, verbose: bool) -> Result<ExitCode> {
    let files = expand_files(patterns)?;
    if verbose {
        eprintln!("Processing {} file(s)", files.len());
    }

    // Track if any files need formatting (for --check mode)
    let mut needs_formatting = false;

    for file in &files {
        let (source, path) = if file == STDIN {
            (read_stdin()?, None)
        } else {
            let path = Path::new(file);
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            (source, Some(path))
        };

        let formatted = formatter.format(&source);
        let changed = source != formatted;
        let name = path.map(|p| p.display().to_string()).unwrap_or_else(|| STDIN_NAME.to_string());

        if check {
            if changed {
                needs_formatting = true;
                eprintln!("{}: needs formatting", name);
            }
        } else if let (true, Some(path)) = (write, path) {
            if changed {
                std::fs::write(path, &formatted)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                if verbose {
                    eprintln!("{}: formatted", name);
                }
            } else if verbose {
                eprintln!("{}: already formatted", name);
            }
        } else {
            io::stdout().write_all(formatted.as_bytes())?;
        }
    }

    if check && needs_formatting {
        return Ok(ExitCode::from(1));
    }
    Ok(ExitCode::SUCCESS)
}

fn severity_label(severity: Severity) -> colored::ColoredString {
    match severity {
        Severity::Error => "error".red(),
        Severity::Warning => "warning".yellow(),
        Severity::Info => "info".blue(),
        Severity::Hint => "hint".dimmed(),
    }
}

/// Print detailed code explanation
fn explain_code(code: DiagnosticCode) {
    println!("{}", "Diagnostic Details".bold());
    println!();
    println!("  {}: {}", "Code".bold(), code.as_str().cyan());
    println!("  {}: {}", "Severity".bold(), severity_label(code.severity()));
    println!("  {}: {}", "Category".bold(), code.category());
    println!("  {}: {}", "Message".bold(), code.message_key().default_text());
    println!();
    println!("  {}", "Description".bold());
    println!("  {}", code.explanation());
}

fn list_codes() {
    for code in DiagnosticCode::ALL {
        println!(
            "  {} [{}] ({})",
            format!("{:<24}", code.as_str()).cyan(),
            severity_label(code.severity()),
            code.category()
        );
        println!("      {}", code.message_key().default_text());
    }
}
