mod config;
mod depfile;
mod test_runner;

use std::io;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use htmlpp::{Report, Severity};
use processor::{Context, VariableStore};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use config::{Config, ConfigError};

const SUBCOMMANDS: &[&str] = &["build", "test", "help"];

#[derive(Parser)]
#[command(name = "htmlpp", version, about = "HTML comment-directive preprocessor")]
struct Cli {
    /// Disable colored diagnostics
    #[arg(long, global = true)]
    no_color: bool,

    /// Log engine decisions at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Process a document (default when no subcommand is given)
    Build(BuildArgs),

    /// Run .test.html fixture files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct BuildArgs {
    /// Document to process
    #[arg(long, value_name = "FILE")]
    target: PathBuf,

    /// Write the result to this file instead of standard output
    #[arg(long, value_name = "FILE", conflicts_with = "inplace")]
    output: Option<PathBuf>,

    /// Write the result back to the target
    #[arg(long)]
    inplace: bool,

    /// Set a variable before processing. Repeatable.
    #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_var)]
    vars: Vec<(String, String)>,

    /// Write a Make-style dependency line for the output to this file
    #[arg(long, value_name = "FILE")]
    output_deps: Option<PathBuf>,

    /// Abort on conditions at or above this severity (light, serious, critical)
    #[arg(long, value_name = "SEVERITY")]
    exit_on: Option<Severity>,

    /// TOML file with exit_on, [vars] and [sidebar] settings
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.html file or a directory containing them
    path: String,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cannot read '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("cannot write '{}': {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

fn main() {
    let args = with_default_subcommand(std::env::args().collect());

    // Usage errors exit 1; 2 and 3 belong to processing failures.
    let cli = match Cli::try_parse_from(&args) {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };

    init_logging(cli.verbose);

    match cli.command {
        Command::Build(build_args) => process::exit(do_build(&build_args, cli.no_color)),
        Command::Test(test_args) => {
            let path = Path::new(&test_args.path);
            if test_args.list_categories {
                test_runner::list_categories(path);
                return;
            }
            let exit_code = test_runner::run_tests(path, cli.no_color, &test_args.category);
            process::exit(exit_code);
        }
    }
}

/// `htmlpp --target x` is shorthand for `htmlpp build --target x`. Only the
/// first argument can name a subcommand, so option values never do.
fn with_default_subcommand(mut args: Vec<String>) -> Vec<String> {
    let explicit = args.get(1).is_some_and(|first| {
        SUBCOMMANDS.contains(&first.as_str()) || first == "--version" || first == "-V"
    });
    if !explicit && !args.is_empty() {
        args.insert(1, "build".to_string());
    }
    args
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn do_build(args: &BuildArgs, no_color: bool) -> i32 {
    let color_choice = if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    match build(args, color_choice) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}

/// Process the target and write the results. Returns the exit code of a
/// run that got as far as processing.
fn build(args: &BuildArgs, color_choice: ColorChoice) -> Result<i32, CliError> {
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let output = if args.inplace {
        Some(args.target.clone())
    } else {
        args.output.clone()
    };
    let source = std::fs::read_to_string(&args.target).map_err(|source| CliError::Read {
        path: args.target.clone(),
        source,
    })?;

    let mut variables: VariableStore = config
        .vars
        .iter()
        .map(|(name, value)| (name.as_str(), value.as_str()))
        .collect();
    variables.extend(args.vars.iter().cloned());
    let threshold = args.exit_on.or(config.exit_on).unwrap_or_default();

    let mut ctx = Context::new()
        .with_variables(variables)
        .with_threshold(threshold)
        .with_nav_template(config.sidebar.template());
    debug!(file = %args.target.display(), %threshold, "processing");

    let mut files = SimpleFiles::new();
    let file_id = files.add(args.target.display().to_string(), source.clone());
    let result = processor::process(&source, &mut ctx);

    let writer = StandardStream::stderr(color_choice);
    let term_config = term::Config::default();
    for report in ctx.diagnostics() {
        emit_report(&writer, &term_config, &files, file_id, report, false);
    }

    let document = match result {
        Ok(document) => document,
        Err(e) => {
            match e.report() {
                Some(report) => emit_report(&writer, &term_config, &files, file_id, report, true),
                None => eprintln!("error: {e}"),
            }
            return Ok(e.exit_code());
        }
    };

    match &output {
        Some(path) => std::fs::write(path, &document).map_err(|source| CliError::Write {
            path: path.clone(),
            source,
        })?,
        None => {
            info!("no output path given, printing to stdout; use --output or --inplace to save the result");
            print!("{document}");
        }
    }

    if let Some(deps_path) = &args.output_deps {
        // Printed output has no file of its own; the rule names the target.
        let rule_target = output.as_deref().unwrap_or(args.target.as_path());
        let line = depfile::render(rule_target, &args.target, &ctx.dependencies);
        debug!(path = %deps_path.display(), deps = ctx.dependencies.len(), "writing dependency file");
        std::fs::write(deps_path, line).map_err(|source| CliError::Write {
            path: deps_path.clone(),
            source,
        })?;
    }
    Ok(0)
}

fn emit_report(
    writer: &StandardStream,
    config: &term::Config,
    files: &SimpleFiles<String, String>,
    file_id: usize,
    report: &Report,
    fatal: bool,
) {
    let diagnostic = report.to_diagnostic(file_id, fatal);
    let _ = term::emit_to_write_style(&mut writer.lock(), config, files, &diagnostic);
}

/// Parse `NAME=VALUE`. Both sides are trimmed of spaces; the value may be
/// empty, the name may not.
fn parse_var(arg: &str) -> Result<(String, String), String> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{arg}'"))?;
    let name = name.trim_matches(' ');
    if name.is_empty() {
        return Err(format!("missing variable name in '{arg}'"));
    }
    Ok((name.to_string(), value.trim_matches(' ').to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn var_arguments() {
        assert_eq!(
            parse_var("lang=en").unwrap(),
            ("lang".to_string(), "en".to_string())
        );
        assert_eq!(
            parse_var(" title = a=b ").unwrap(),
            ("title".to_string(), "a=b".to_string())
        );
        assert_eq!(parse_var("empty=").unwrap().1, "");
        assert!(parse_var("novalue").is_err());
        assert!(parse_var("=x").is_err());
    }

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn build_is_the_default_subcommand() {
        assert_eq!(
            with_default_subcommand(argv(&["htmlpp", "--target", "a.html"])),
            argv(&["htmlpp", "build", "--target", "a.html"])
        );
        assert_eq!(
            with_default_subcommand(argv(&["htmlpp", "--target", "test", "--output", "build"])),
            argv(&["htmlpp", "build", "--target", "test", "--output", "build"])
        );
        assert_eq!(
            with_default_subcommand(argv(&["htmlpp", "test", "fixtures"])),
            argv(&["htmlpp", "test", "fixtures"])
        );
        assert_eq!(
            with_default_subcommand(argv(&["htmlpp", "--version"])),
            argv(&["htmlpp", "--version"])
        );
        assert_eq!(with_default_subcommand(argv(&["htmlpp"])), argv(&["htmlpp", "build"]));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
