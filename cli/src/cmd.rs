use std::{io, path::PathBuf, process::ExitCode, str::FromStr, time::Duration};

use clap::CommandFactory;
use harn_core::{
    action,
    config::{ColorChoice, Config},
    duration::parse_duration,
    style::{ConsoleReporter, Theme},
};

use crate::{config, config::Settings, util};

#[derive(Debug, clap::Parser)]
#[command(author, version, about, long_about = None)]
#[command(disable_help_flag = true)]
#[command(override_usage = "harn [options] <program_to_execute> <glob_pattern>")]
#[command(after_help = "Example: harn -v -t 5s ./myprogram 'testcases/*.in'")]
pub struct Args {
    /// Program run once per input file, with the file on its stdin
    #[arg(value_name = "program_to_execute")]
    pub program: Option<PathBuf>,

    /// Input files, e.g. 'testcases/*.in'
    #[arg(value_name = "glob_pattern")]
    pub pattern: Option<String>,

    /// Show expected and actual output of every test
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Do not show the diff when a test fails
    #[arg(short = 's')]
    pub silent: bool,

    /// Timeout for program execution (e.g. 5s, 1m, 500ms) [default: 30s]
    #[arg(short = 't', value_name = "duration", value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Generate output files if they don't exist
    #[arg(short = 'g')]
    pub generate: bool,

    /// (with -g) Overwrite the output file even if it exists
    #[arg(short = 'f')]
    pub force: bool,

    /// Compare SHA-256 hashes with .hash files instead of .out files
    #[arg(short = 'h')]
    pub hash: bool,

    /// When to use colors: auto, always, never
    #[arg(long, value_name = "when", value_parser = ColorChoice::from_str)]
    pub color: Option<ColorChoice>,

    /// Exit with status 1 unless every test passed
    #[arg(long)]
    pub fail_exit: bool,

    /// Print help
    #[arg(long, action = clap::ArgAction::Help)]
    pub help: Option<bool>,
}

impl Args {
    pub async fn exec(&self) -> anyhow::Result<ExitCode> {
        let (Some(program), Some(pattern)) = (&self.program, &self.pattern) else {
            Self::command().print_help()?;
            return Ok(ExitCode::FAILURE);
        };

        let cfg = Config::load(util::current_dir(), config::user_config_dir().as_deref())?;
        let settings = Settings::new(&cfg, self);

        let colorize = util::should_colorize(settings.color);
        colored::control::set_override(colorize);

        let input_files = action::find_input_files(pattern)?;
        if input_files.is_empty() {
            println!("No files found matching pattern: {}", pattern);
            return Ok(ExitCode::SUCCESS);
        }

        let mut reporter = ConsoleReporter::new(
            io::stdout(),
            Theme::new(colorize),
            settings.report_options(),
            pattern,
            settings.timeout,
        );
        let summary =
            action::do_test(program, &input_files, &settings.run_options(), &mut reporter).await;

        if settings.fail_exit && !summary.all_passed() {
            return Ok(ExitCode::FAILURE);
        }
        Ok(ExitCode::SUCCESS)
    }
}
