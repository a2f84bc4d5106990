//! CLI entry point for `cafemsg`.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use cafemsg::extract::{self, plan::ExtractPlan, ExtractOptions, ExtractReport};
use cafemsg::parser::text::LegacyEncoding;

#[derive(Parser)]
#[command(
    name = "cafemsg",
    version,
    about = "Extract text from .msg message containers into .txt files"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract every .msg file under INPUT into OUTPUT
    Extract {
        /// Directory of extracted archives (one subdirectory per archive)
        input: PathBuf,
        /// Existing output directory
        output: PathBuf,
        /// Encoding of untagged payloads (overrides config)
        #[arg(short, long, value_enum, env = "CAFEMSG_ENCODING")]
        encoding: Option<LegacyEncoding>,
        /// Worker threads, 0 = one per core (overrides config)
        #[arg(short, long)]
        threads: Option<usize>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show how a single .msg file would be extracted
    Inspect {
        path: PathBuf,
        #[arg(short, long, value_enum, env = "CAFEMSG_ENCODING")]
        encoding: Option<LegacyEncoding>,
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = cafemsg::config::load_config();

    // Configure logging: stderr + optional log file
    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match cli.command {
        Commands::Extract {
            input,
            output,
            encoding,
            threads,
            json,
        } => {
            let mut opts = ExtractOptions::from_config(&config, input, output);
            if let Some(enc) = encoding {
                opts.encoding = enc;
            }
            if let Some(n) = threads {
                opts.threads = n;
            }
            cmd_extract(&opts, json)
        }
        Commands::Inspect {
            path,
            encoding,
            json,
        } => cmd_inspect(
            &path,
            encoding.unwrap_or(config.extract.legacy_encoding),
            json,
        ),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &cafemsg::config::Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_dir = cafemsg::config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "cafemsg.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        // Fall back to stderr only
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "cafemsg", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}

/// Extract all containers below the input directory.
fn cmd_extract(opts: &ExtractOptions, json: bool) -> anyhow::Result<()> {
    if !opts.input.is_dir() {
        anyhow::bail!("Input directory not found: {}", opts.input.display());
    }
    if !opts.output.is_dir() {
        anyhow::bail!("Output directory not found: {}", opts.output.display());
    }

    let plan = extract::plan(opts)?;
    if !json {
        print_plan(&plan);
    }

    let pb = ProgressBar::new(plan.total_files() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Extracting [{bar:40.cyan/blue}] {pos}/{len}")
            .expect("valid template")
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let report = extract::execute(
        &plan,
        opts,
        Some(&|current, _total| {
            pb.set_position(current as u64);
        }),
    );
    pb.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(opts, &report, start.elapsed());
    }

    Ok(())
}

/// Parse a single container and describe it.
fn cmd_inspect(path: &Path, encoding: LegacyEncoding, json: bool) -> anyhow::Result<()> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }

    let info = extract::inspect(path, encoding)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    use humansize::{format_size, BINARY};
    println!();
    println!("  {:<16} {}", "File", info.source.display());
    println!("  {:<16} {}", "Size", format_size(info.size, BINARY));
    println!("  {:<16} {:?}", "Layout", info.layout);
    println!("  {:<16} {:#010X}", "Header magic", info.header_magic);
    println!("  {:<16} {} bytes", "Payload", info.payload_len);
    if let Some(len) = info.footer_len {
        println!("  {:<16} {} bytes", "Footer", len);
    }
    println!("  {:<16} {} ({:?})", "Name", info.name, info.name_source);
    println!("  {:<16} {}", "Encoding", encoding);
    println!();
    let preview: String = info.text.chars().take(200).collect();
    println!("{preview}");
    Ok(())
}

/// Print the category layout before extracting.
fn print_plan(plan: &ExtractPlan) {
    for category in &plan.categories {
        println!();
        println!("  {:<12} {}", "Category", category.key);
        println!("  {:<12} {}", "Size", category.dirs.len());
        for (dir, label) in &category.dirs {
            println!("    {:<6} {}", label, dir.path.display());
        }
    }

    println!();
    println!("  {:<12} Misc.", "Category");
    println!("  {:<12} {}", "Size", plan.misc.len());
    for dir in &plan.misc {
        println!("    {}", dir.path.display());
    }
    println!();
}

/// Print a summary table after extracting.
fn print_report(opts: &ExtractOptions, report: &ExtractReport, elapsed: std::time::Duration) {
    use humansize::{format_size, BINARY};

    println!();
    println!("  {:<20} {}", "Output", opts.output.display());
    println!("  {:<20} {}", "Encoding", opts.encoding);
    println!("  {:<20} {}", "Files written", report.written.len());
    println!("  {:<20} {}", "Tagged messages", report.tagged_count());
    println!(
        "  {:<20} {}",
        "Text size",
        format_size(report.bytes_written(), BINARY)
    );
    println!("  {:<20} {:.2?}", "Time", elapsed);

    if !report.failures.is_empty() {
        println!();
        println!("  {} file(s) skipped:", report.failures.len());
        for f in &report.failures {
            println!("    {}  {}", f.source.display(), f.error);
        }
    }
    println!();
}
