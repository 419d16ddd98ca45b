//! Autogen CLI.
//!
//! Generates `XRequest` objects and `XRepository` classes for every
//! `@Autogen` service interface under a source tree.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode, DebounceEventResult};

use autogen_compiler::config::CONVENTIONS_FILE_NAME;
use autogen_compiler::{Conventions, GenerateResult, Generator, GeneratorConfig};

mod ui;

#[derive(Parser)]
#[command(name = "autogen")]
#[command(about = "Generates Kotlin Request/Repository boilerplate from annotated service interfaces")]
struct Cli {
    /// Log pipeline details to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate Request and Repository sources
    Generate {
        #[command(flatten)]
        source: SourceArgs,

        /// Output directory for generated Kotlin sources
        #[arg(short, long, default_value = "build/generated/source/autogen")]
        output: PathBuf,
    },

    /// Analyze and render without writing anything
    Check {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Regenerate whenever the source tree changes
    Watch {
        #[command(flatten)]
        source: SourceArgs,

        /// Output directory for generated Kotlin sources
        #[arg(short, long, default_value = "build/generated/source/autogen")]
        output: PathBuf,
    },

    /// Print the extracted services as JSON
    Inspect {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Write a default autogen.json
    Init {
        /// Directory to write the conventions file into
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Clone)]
struct SourceArgs {
    /// Directory containing annotated interfaces
    #[arg(short, long, default_value = "src/main/java")]
    source: PathBuf,

    /// Source language: kotlin or descriptor
    #[arg(short, long, default_value = "kotlin")]
    language: String,

    /// Conventions file (default: autogen.json in the source directory)
    #[arg(short, long)]
    conventions: Option<PathBuf>,
}

impl SourceArgs {
    fn config(&self, out_dir: PathBuf) -> miette::Result<GeneratorConfig> {
        let conventions = match &self.conventions {
            Some(path) => Conventions::load(path)?,
            None => Conventions::discover(&self.source)?,
        };
        Ok(GeneratorConfig {
            source_dir: self.source.clone(),
            out_dir,
            language: self.language.clone(),
            conventions,
        })
    }
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "autogen_compiler=debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .try_init();

    match cli.command {
        Commands::Generate { source, output } => {
            let config = source.config(output)?;
            generate_once(config)?;
        }

        Commands::Check { source } => {
            check_sources(&source)?;
        }

        Commands::Watch { source, output } => {
            run_watch_mode(source, output).await?;
        }

        Commands::Inspect { source } => {
            let config = source.config(PathBuf::new())?;
            let services = Generator::new(config).analyze()?;
            let json = serde_json::to_string_pretty(&services).into_diagnostic()?;
            println!("{}", json);
        }

        Commands::Init { path, force } => {
            init_conventions(&path, force)?;
        }
    }

    Ok(())
}

/// Run one generation pass and print the summary.
fn generate_once(config: GeneratorConfig) -> miette::Result<()> {
    let start = Instant::now();
    let spinner = ui::spinner("Generating...");
    let out_dir = config.out_dir.clone();

    let result = Generator::new(config).generate();
    spinner.finish_and_clear();
    let result = result?;

    ui::box_header("GENERATED");
    ui::box_line("");
    ui::box_line(&format!(
        "{} {} {}",
        ui::plural(result.interfaces, "interface"),
        ui::symbols::DOT,
        ui::plural(result.methods, "method"),
    ));
    ui::box_line(&format!("{} written, {} unchanged", result.written, result.unchanged));
    ui::box_line("");
    ui::box_footer();
    println!();

    ui::tree_dir("", &out_dir.display().to_string());
    println!();
    ui::timing("Done", start.elapsed().as_millis());
    Ok(())
}

/// Analyze and render in memory, listing the files a generate would produce.
fn check_sources(source: &SourceArgs) -> miette::Result<()> {
    let spinner = ui::spinner("Checking service interfaces...");
    let config = source.config(PathBuf::new())?;

    match Generator::new(config).check() {
        Ok((services, generated)) => {
            spinner.finish_and_clear();
            ui::looking_good();
            println!();
            println!(
                "    {} {} {}",
                ui::plural(services.len(), "interface"),
                ui::symbols::DOT,
                ui::plural(generated.files.len(), "file"),
            );
            println!();

            let count = generated.files.len();
            for (i, file) in generated.files.iter().enumerate() {
                ui::tree_item("    ", &file.path.display().to_string(), None, i + 1 == count);
            }
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            ui::nope_header();
            Err(e.into())
        }
    }
}

/// Write `autogen.json` with the default conventions.
fn init_conventions(dir: &Path, force: bool) -> miette::Result<()> {
    let path = dir.join(CONVENTIONS_FILE_NAME);
    if path.exists() && !force {
        return Err(miette::miette!(
            "{} already exists (use --force to overwrite)",
            path.display()
        ));
    }

    std::fs::create_dir_all(dir)
        .map_err(|e| miette::miette!("Failed to create {}: {}", dir.display(), e))?;
    std::fs::write(&path, Conventions::default().to_json() + "\n")
        .map_err(|e| miette::miette!("Failed to write {}: {}", path.display(), e))?;

    ui::success(&format!("Wrote {}", path.display()));
    ui::dim("Edit the type names to match your runtime library.");
    Ok(())
}

/// Run watch mode: one pass up front, then one per debounced change.
async fn run_watch_mode(source: SourceArgs, output: PathBuf) -> miette::Result<()> {
    // Channel for file change events
    let (tx, mut rx) = tokio::sync::mpsc::channel::<()>(1);

    // The output may sit inside the source tree; its writes must not retrigger a pass.
    // Event paths are absolute.
    let ignored = std::env::current_dir()
        .map(|cwd| cwd.join(&output))
        .unwrap_or_else(|_| output.clone());
    let mut debouncer = new_debouncer(
        Duration::from_millis(500),
        move |result: DebounceEventResult| match result {
            Ok(events) => {
                if events.iter().any(|event| !event.path.starts_with(&ignored)) {
                    let _ = tx.try_send(());
                }
            }
            Err(e) => tracing::warn!(error = %e, "file watcher error"),
        },
    )
    .map_err(|e| miette::miette!("Failed to create file watcher: {}", e))?;

    debouncer
        .watcher()
        .watch(&source.source, RecursiveMode::Recursive)
        .map_err(|e| miette::miette!("Failed to watch {}: {}", source.source.display(), e))?;

    ui::info(&format!("Watching for changes in {}", source.source.display()));
    println!();
    watch_pass(&source, &output);
    ui::info("Ready! Waiting for changes...");

    loop {
        tokio::select! {
            Some(()) = rx.recv() => {
                println!();
                watch_pass(&source, &output);
                println!();
                ui::info("Ready! Waiting for changes...");
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                ui::dim("Stopping watch mode.");
                break;
            }
        }
    }

    Ok(())
}

/// One regeneration inside watch mode. Errors are reported, never fatal.
fn watch_pass(source: &SourceArgs, output: &Path) {
    let spinner = ui::spinner("Regenerating...");
    let start = Instant::now();

    // Conventions are reloaded each pass so edits to autogen.json apply.
    let result = source
        .config(output.to_path_buf())
        .and_then(|config| Generator::new(config).generate().map_err(Into::into));
    spinner.finish_and_clear();

    match result {
        Ok(GenerateResult { interfaces, written, .. }) => {
            ui::success(&format!(
                "{}, {} in {}ms",
                ui::plural(interfaces, "interface"),
                ui::plural(written, "file") + " written",
                start.elapsed().as_millis()
            ));
        }
        Err(e) => ui::error(&format!("{:?}", e)),
    }
}
