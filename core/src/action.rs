pub mod error {
    #[allow(unused_imports)]
    pub(crate) use anyhow::{anyhow, bail, ensure, Context as _};
    pub use anyhow::{Error, Result};
}

use std::path::{Path, PathBuf};
use std::time::Duration;

use error::*;

use crate::testing::{
    CaptureMode, Detail, ExecOutcome, FsTestcase, RunSummary, TestOutcome, TestRunner, Verdict,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub timeout: Duration,
    pub capture_mode: CaptureMode,
    /// Write expected files instead of comparing against them.
    pub generate: bool,
    /// With `generate`, overwrite expected files that already exist.
    pub force: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            timeout: TestRunner::DEFAULT_EXEC_TIME_LIMIT,
            capture_mode: CaptureMode::default(),
            generate: false,
            force: false,
        }
    }
}

/// Receives progress of a run as it happens.
pub trait Reporter {
    fn on_start(&mut self, _testcases: &[FsTestcase]) {}
    fn on_testcase_start(&mut self, _testcase: &FsTestcase) {}
    fn on_testcase_end(&mut self, outcome: &TestOutcome);
    fn on_finish(&mut self, _summary: &RunSummary) {}
}

/// Expand the glob pattern into input files, keeping the order of the expansion.
pub fn find_input_files(pattern: &str) -> Result<Vec<PathBuf>> {
    fsutil::expand_glob(pattern).context("Error matching glob pattern")
}

/// Outputs are equal if they match after trimming leading and trailing whitespace.
pub fn outputs_match(expected: impl AsRef<[u8]>, actual: impl AsRef<[u8]>) -> bool {
    trim_output(expected.as_ref()) == trim_output(actual.as_ref())
}

/// Unicode-aware trim for UTF-8 text, ASCII-only trim for anything else.
fn trim_output(bytes: &[u8]) -> &[u8] {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.trim().as_bytes(),
        Err(_) => {
            let start = bytes
                .iter()
                .position(|b| !b.is_ascii_whitespace())
                .unwrap_or(bytes.len());
            let end = bytes
                .iter()
                .rposition(|b| !b.is_ascii_whitespace())
                .map_or(start, |i| i + 1);
            &bytes[start..end]
        }
    }
}

/// Run every input file through the program, one after another, in the given order.
pub async fn do_test(
    program: impl AsRef<Path>,
    input_files: &[PathBuf],
    opts: &RunOptions,
    reporter: &mut impl Reporter,
) -> RunSummary {
    let runner = TestRunner::new(program.as_ref())
        .execution_time_limit(opts.timeout)
        .capture_mode(opts.capture_mode);

    let testcases: Vec<_> = input_files
        .iter()
        .map(|path| FsTestcase::from_input_path(path, opts.capture_mode))
        .collect();

    reporter.on_start(&testcases);

    let mut summary = RunSummary::new(opts.generate);
    for t in &testcases {
        reporter.on_testcase_start(t);
        let outcome = if opts.generate {
            generate_one(&runner, t, opts.force).await
        } else {
            check_one(&runner, t).await
        };
        summary.add(&outcome);
        reporter.on_testcase_end(&outcome);
    }

    reporter.on_finish(&summary);
    summary
}

/// Run the program and compare its output with the saved expected file.
pub async fn check_one(runner: &TestRunner, t: &FsTestcase) -> TestOutcome {
    let res = runner.run(t.input_path()).await;
    let judged = |verdict, detail| TestOutcome {
        testcase_name: t.name().to_owned(),
        verdict,
        execution_time: Some(res.elapsed),
        detail,
        stderr: res.stderr.clone(),
    };

    let actual = match &res.outcome {
        ExecOutcome::Success(output) => output,
        ExecOutcome::Timeout => {
            return judged(
                Verdict::TLE,
                Detail::Timeout {
                    limit: runner.get_exec_time_limit(),
                },
            )
        }
        ExecOutcome::ExecutionError(message) => {
            return judged(
                Verdict::ERR,
                Detail::ExecutionError {
                    message: message.clone(),
                },
            )
        }
    };

    let expected = match fsutil::read_lines(t.expected_path()) {
        Ok(bytes) => bytes,
        Err(e) => {
            return judged(
                Verdict::ERR,
                Detail::ReadExpected {
                    message: e.to_string(),
                },
            )
        }
    };

    let matched = outputs_match(&expected, actual);
    let expected = String::from_utf8_lossy(&expected).into_owned();
    let actual = String::from_utf8_lossy(actual).into_owned();
    if matched {
        judged(Verdict::AC, Detail::Accepted { expected, actual })
    } else {
        judged(Verdict::WA, Detail::WrongAnswer { expected, actual })
    }
}

/// Run the program and save its output as the expected file,
/// unless the file already exists and `force` is off.
pub async fn generate_one(runner: &TestRunner, t: &FsTestcase, force: bool) -> TestOutcome {
    let path = t.expected_path();

    // anything but a definite "not found" counts as existing
    let exists = !matches!(path.try_exists(), Ok(false));
    if exists && !force {
        log::debug!("{:?} exists, skipping", path);
        return TestOutcome {
            testcase_name: t.name().to_owned(),
            verdict: Verdict::SKIP,
            execution_time: None,
            detail: Detail::AlreadyExists {
                path: path.to_owned(),
            },
            stderr: String::new(),
        };
    }

    let res = runner.run(t.input_path()).await;
    let (verdict, detail) = match &res.outcome {
        ExecOutcome::Timeout => (
            Verdict::TLE,
            Detail::Timeout {
                limit: runner.get_exec_time_limit(),
            },
        ),
        ExecOutcome::ExecutionError(message) => (
            Verdict::ERR,
            Detail::ExecutionError {
                message: message.clone(),
            },
        ),
        ExecOutcome::Success(output) => match fsutil::write(path, output) {
            Ok(()) => (
                Verdict::GEN,
                Detail::Generated {
                    path: path.to_owned(),
                },
            ),
            Err(e) => (
                Verdict::ERR,
                Detail::WriteExpected {
                    message: e.to_string(),
                },
            ),
        },
    };

    TestOutcome {
        testcase_name: t.name().to_owned(),
        verdict,
        execution_time: Some(res.elapsed),
        detail,
        stderr: res.stderr,
    }
}
