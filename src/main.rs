use std::io::IsTerminal;
use std::io::Read;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use miette::{Context, IntoDiagnostic, Result};

use faultline_core::{MutationMode, OutputFormat};
use faultline_mutate::MutationEngine;
use faultline_policy::PolicyChecker;

#[derive(Parser)]
#[command(
    name = "faultline",
    version,
    about = "Patch mutation and policy-violation detection for Rust diffs",
    long_about = "Faultline injects policy violations (unwrap, unsafe, panic) into unified-diff\n\
                   patches while trying to preserve compilability, and counts the same\n\
                   violations in a diff so detectors can be evaluated against known-bad patches.\n\n\
                   Examples:\n  \
                     git diff | faultline mutate --mode unwrap   Inject unwrap calls into a diff\n  \
                     faultline mutate --mode unsafe --file p.patch --out mutated.patch\n  \
                     git diff | faultline check                  Count policy violations\n  \
                     faultline check --file p.patch --deny       Fail CI on any violation\n  \
                     faultline init                              Create a default config"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .faultline.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for command results.\n\n\
                       Formats:\n  \
                         text      Human-readable summaries (default)\n  \
                         json      Machine-readable JSON with camelCase keys\n  \
                         markdown  GitHub-flavored Markdown"
    )]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    verbose: bool,

    /// When to use colors
    #[arg(long, global = true, default_value = "auto")]
    color: ColorChoice,
}

#[derive(Subcommand)]
enum Command {
    /// Inject a policy violation into the added lines of a diff
    #[command(long_about = "Inject a policy violation into the added lines of a diff.\n\n\
        Reads a unified diff from stdin or a file and rewrites in-scope added lines\n\
        (Rust sources outside tests/ and benches/) using mode-specific rules. When no\n\
        structural rewrite site exists, a marker comment is appended to the first\n\
        eligible line instead, so the output is always distinguishable.\n\n\
        Examples:\n  git diff | faultline mutate --mode unwrap\n  \
        faultline mutate --mode panic --file fix.patch --out mutated.patch")]
    Mutate {
        /// Mutation mode: unwrap, unsafe, or panic
        #[arg(long)]
        mode: MutationMode,
        /// Read diff from file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
        /// Write the mutated patch to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Count policy violations in the added lines of a diff
    #[command(long_about = "Count policy violations in the added lines of a diff.\n\n\
        Counts unwrap/expect calls, panic! invocations, and unsafe occurrences in\n\
        in-scope added lines. Unsafe occurrences covered by a // SAFETY: comment\n\
        within the configured window are exempted from the missing-justification\n\
        counter.\n\n\
        Examples:\n  git diff | faultline check\n  faultline check --file fix.patch --format json\n  \
        faultline check --file fix.patch --deny")]
    Check {
        /// Read diff from file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
        /// Exit with non-zero code if any counter is nonzero
        #[arg(
            long,
            long_help = "Exit with non-zero code if any policy counter is nonzero.\n\nUseful in CI pipelines to fail builds that introduce unwrap/unsafe/panic."
        )]
        deny: bool,
    },
    /// Create a default .faultline.toml configuration file
    #[command(long_about = "Create a default .faultline.toml configuration file.\n\n\
        Generates a commented-out template with all available options.\n\
        Fails if .faultline.toml already exists.")]
    Init,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Clone, PartialEq, Eq, ValueEnum)]
enum ColorChoice {
    /// Auto-detect based on terminal
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

fn print_welcome(use_color: bool) {
    let version = env!("CARGO_PKG_VERSION");

    if use_color {
        println!("\x1b[1m\x1b[33m⚡\x1b[0m \x1b[1mfaultline\x1b[0m v{version} — break patches on purpose, then catch them\n");

        println!("Quick start:");
        println!("  \x1b[36mfaultline init\x1b[0m                        Create a .faultline.toml config file");
        println!("  \x1b[36mgit diff | faultline mutate --mode unwrap\x1b[0m  Inject unwrap calls");
        println!("  \x1b[36mgit diff | faultline check\x1b[0m            Count policy violations\n");

        println!("All commands:");
        println!("  \x1b[32mmutate\x1b[0m  Inject a policy violation (unwrap, unsafe, panic) into a diff");
        println!("  \x1b[32mcheck\x1b[0m   Count unwrap/unsafe/panic occurrences in a diff");
        println!("  \x1b[32minit\x1b[0m    Create default configuration\n");
    } else {
        println!("faultline v{version} — break patches on purpose, then catch them\n");

        println!("Quick start:");
        println!("  faultline init                        Create a .faultline.toml config file");
        println!("  git diff | faultline mutate --mode unwrap  Inject unwrap calls");
        println!("  git diff | faultline check            Count policy violations\n");

        println!("All commands:");
        println!("  mutate  Inject a policy violation (unwrap, unsafe, panic) into a diff");
        println!("  check   Count unwrap/unsafe/panic occurrences in a diff");
        println!("  init    Create default configuration\n");
    }

    println!("Run 'faultline <command> --help' for details.");
}

fn read_diff_input(file: &Option<PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err(format!("reading {}", path.display())),
        None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .into_diagnostic()
                .wrap_err("reading stdin")?;
            Ok(input)
        }
    }
}

const DEFAULT_CONFIG: &str = r#"# Faultline Configuration
# See: https://github.com/faultline-dev/faultline

[scope]
# File extension of in-scope source files
# source_extension = "rs"
# Directory segments excluded from policy scope
# excluded_dirs = ["tests", "benches"]
# Additional glob patterns to exclude
# skip_patterns = ["generated/**"]

[mutation]
# Append a marker comment when no structural rewrite site exists
# fallback_enabled = true
# Message used in injected panic! invocations
# panic_message = "mutation"

[policy]
# Exempt unsafe occurrences covered by a // SAFETY: comment
# check_safety_comments = true
# Annotation search window (lines before / after an unsafe occurrence)
# window_before = 10
# window_after = 3
"#;

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => faultline_core::FaultlineConfig::from_file(path)
            .into_diagnostic()
            .wrap_err(format!("loading {}", path.display()))?,
        None => {
            let default_path = std::path::Path::new(".faultline.toml");
            if default_path.exists() {
                faultline_core::FaultlineConfig::from_file(default_path)
                    .into_diagnostic()
                    .wrap_err("loading .faultline.toml")?
            } else {
                faultline_core::FaultlineConfig::default()
            }
        }
    };

    let use_color = match cli.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => std::io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    };

    if cli.verbose {
        eprintln!("format: {}", cli.format);
        eprintln!(
            "scope: *.{} excluding {:?}",
            config.scope.source_extension, config.scope.excluded_dirs
        );
    }

    match cli.command {
        None => {
            print_welcome(use_color);
            return Ok(());
        }
        Some(Command::Mutate {
            mode,
            ref file,
            ref out,
        }) => {
            let input = read_diff_input(file)?;

            // Hint: empty diff input from stdin
            if input.trim().is_empty() {
                miette::bail!(miette::miette!(
                    help = "Pipe a diff to faultline, e.g.: git diff | faultline mutate --mode unwrap\n       Or use --file <path>",
                    "Empty diff input"
                ));
            }

            if cli.format == OutputFormat::Json && out.is_none() {
                miette::bail!("--format json requires --out so the mutated patch is not lost");
            }

            let engine = MutationEngine::new(&config);
            let result = engine.mutate(&input, mode);

            match out {
                Some(path) => {
                    std::fs::write(path, &result.text)
                        .into_diagnostic()
                        .wrap_err(format!("writing {}", path.display()))?;
                    eprintln!(
                        "Wrote mutated patch to {} (mutations: {})",
                        path.display(),
                        result.mutation_count
                    );
                }
                None => print!("{}", result.text),
            }

            match cli.format {
                OutputFormat::Json => {
                    let summary = serde_json::json!({
                        "mode": mode,
                        "mutationCount": result.mutation_count,
                        "fallbackUsed": result.fallback_used,
                    });
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&summary).into_diagnostic()?
                    );
                }
                _ => {
                    eprintln!("{} mutations applied (mode: {mode})", result.mutation_count);
                    if result.fallback_used {
                        eprintln!(
                            "note: fallback comment mutation only; treat as a weaker signal"
                        );
                    }
                }
            }

            if result.mutation_count == 0 {
                eprintln!("warning: no mutations applied; flag this case for manual attention");
            }
        }
        Some(Command::Check { ref file, deny }) => {
            let input = read_diff_input(file)?;
            let checker = PolicyChecker::new(&config);
            let counts = checker.count_with_config(&input);

            match cli.format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&counts).into_diagnostic()?
                    );
                }
                OutputFormat::Markdown => {
                    print!("{}", counts.to_markdown());
                }
                OutputFormat::Text => {
                    print!("{counts}");
                }
            }

            if deny && counts.any_violation() {
                std::process::exit(1);
            }
        }
        Some(Command::Init) => {
            let path = std::path::Path::new(".faultline.toml");
            if path.exists() {
                miette::bail!(".faultline.toml already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created .faultline.toml with default configuration");
        }
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "faultline", &mut std::io::stdout());
        }
    }

    Ok(())
}
