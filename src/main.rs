use std::fs;
use std::time::Instant;

use clap::{Parser, Subcommand};
use colored::*;

use doctag_lib::{config, exit_codes, file_processor, init};

#[derive(Parser)]
#[command(name = "doctag", author, version, about = "Keeps Javadoc tag metadata consistent across a source tree", long_about = None)]
struct Cli {
    /// Files or directories to process.
    /// If provided, these paths take precedence over include patterns.
    #[arg(required = false)]
    paths: Vec<String>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<String>,

    /// Apply changes instead of only reporting them
    #[arg(short, long, default_value = "false")]
    fix: bool,

    /// Include only specific files or directories (comma-separated glob patterns)
    #[arg(long)]
    include: Option<String>,

    /// Exclude specific files or directories (comma-separated glob patterns)
    #[arg(long)]
    exclude: Option<String>,

    /// Ignore .gitignore files when scanning directories
    #[arg(long, default_value = "false")]
    no_respect_gitignore: bool,

    /// Show detailed output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode
    #[arg(short, long)]
    quiet: bool,

    /// Command to run
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new configuration file
    Init,
}

fn split_patterns(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if matches!(cli.command, Some(Commands::Init)) {
        match init::create_default_config(init::DEFAULT_CONFIG_FILE) {
            Ok(true) => {
                println!("Created default configuration: {}", init::DEFAULT_CONFIG_FILE);
                exit_codes::exit::success();
            }
            Ok(false) => {
                eprintln!(
                    "{}: {} already exists",
                    "Error".red().bold(),
                    init::DEFAULT_CONFIG_FILE
                );
                exit_codes::exit::tool_error();
            }
            Err(e) => {
                eprintln!("{}: {}", "Error".red().bold(), e);
                exit_codes::exit::tool_error();
            }
        }
    }

    let mut config = match config::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", "Config error".red().bold(), e);
            exit_codes::exit::tool_error();
        }
    };

    // CLI patterns override the config file.
    if let Some(include) = &cli.include {
        config.global.include = split_patterns(include);
    }
    if let Some(exclude) = &cli.exclude {
        config.global.exclude = split_patterns(exclude);
    }
    if cli.no_respect_gitignore {
        config.global.respect_gitignore = false;
    }

    let files = match file_processor::collect_files(&cli.paths, &config.global) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            exit_codes::exit::tool_error();
        }
    };

    if files.is_empty() && !cli.quiet {
        println!("No Java files found to process");
    }

    let start = Instant::now();
    let mut files_changed = 0usize;
    let mut total_replacements = 0usize;
    let mut had_error = false;

    for path in &files {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("{}: failed to read {}: {e}", "Error".red().bold(), path.display());
                had_error = true;
                continue;
            }
        };

        let outcome = file_processor::process_content(&content, &config.tags);
        if !outcome.changed {
            if cli.verbose && !cli.quiet {
                println!("{} {}", "✓".green(), path.display());
            }
            continue;
        }

        files_changed += 1;
        total_replacements += outcome.replacements;

        if cli.fix {
            match fs::write(path, &outcome.output) {
                Ok(()) => {
                    if !cli.quiet {
                        println!(
                            "{} {} ({} tag{} updated)",
                            "Fixed".green().bold(),
                            path.display(),
                            outcome.replacements,
                            if outcome.replacements == 1 { "" } else { "s" }
                        );
                    }
                }
                Err(e) => {
                    eprintln!("{}: failed to write {}: {e}", "Error".red().bold(), path.display());
                    had_error = true;
                }
            }
        } else if !cli.quiet {
            println!(
                "{}: {} tag{} would be updated",
                path.display(),
                outcome.replacements,
                if outcome.replacements == 1 { "" } else { "s" }
            );
        }
    }

    if !cli.quiet {
        let duration = start.elapsed();
        if cli.fix {
            println!(
                "Updated {total_replacements} tag(s) across {files_changed} file(s) in {duration:.2?}"
            );
        } else if files_changed > 0 {
            println!(
                "{total_replacements} tag(s) across {files_changed} file(s) need updating (run with --fix to apply) [{duration:.2?}]"
            );
        } else {
            println!(
                "{} checked {} file(s) in {duration:.2?}",
                "Success:".green().bold(),
                files.len()
            );
        }
    }

    if had_error {
        exit_codes::exit::tool_error();
    }
    if files_changed > 0 && !cli.fix {
        exit_codes::exit::changes_found();
    }
    exit_codes::exit::success();
}
