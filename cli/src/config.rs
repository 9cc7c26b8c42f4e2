use std::{path::PathBuf, time::Duration};

use harn_core::{
    action::RunOptions,
    config::{ColorChoice, Config},
    style::ReportOptions,
    testing::CaptureMode,
};

use crate::cmd::Args;

pub const APP_NAME: &str = "harn";

/// `<user config dir>/harn`, searched after the current dir's ancestors.
pub fn user_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME))
}

/// Effective settings of one invocation: flags on top of the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub timeout: Duration,
    pub hash: bool,
    pub generate: bool,
    pub force: bool,
    pub verbose: bool,
    pub silent: bool,
    pub color: ColorChoice,
    pub fail_exit: bool,
}

impl Settings {
    pub fn new(cfg: &Config, args: &Args) -> Self {
        let Args {
            program: _,
            pattern: _,
            verbose,
            silent,
            timeout,
            generate,
            force,
            hash,
            color,
            fail_exit,
            help: _,
        } = args;

        if *force && !*generate {
            log::warn!("-f has no effect without -g");
        }

        Self {
            timeout: timeout.unwrap_or(cfg.timeout),
            hash: *hash || cfg.hash,
            generate: *generate,
            force: *force,
            verbose: *verbose || cfg.verbose,
            silent: *silent || cfg.silent,
            color: color.unwrap_or(cfg.color),
            fail_exit: *fail_exit || cfg.fail_exit,
        }
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            timeout: self.timeout,
            capture_mode: CaptureMode::from_hash_flag(self.hash),
            generate: self.generate,
            force: self.force,
        }
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            verbose: self.verbose,
            silent: self.silent,
        }
    }
}
