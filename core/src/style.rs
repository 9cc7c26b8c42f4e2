use std::{
    fmt::Display,
    io::{self, Write},
    time::Duration,
};

use colored::{Color, Colorize};
use difference::{Changeset, Difference};

use crate::action::Reporter;
use crate::color::{DefaultPalette, SemanticColor};
use crate::duration::{format_duration, round_to_millis};
use crate::testing::{Detail, FsTestcase, RunSummary, TestOutcome, Verdict};

/// Colors used by [`ConsoleReporter`]. With `colorize` off, everything is plain text.
pub struct Theme {
    palette: Box<dyn SemanticColor>,
    colorize: bool,
}

impl Theme {
    pub fn new(colorize: bool) -> Self {
        Self::with_palette(DefaultPalette, colorize)
    }

    pub fn with_palette(palette: impl SemanticColor + 'static, colorize: bool) -> Self {
        Self {
            palette: Box::new(palette),
            colorize,
        }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    pub fn palette(&self) -> &dyn SemanticColor {
        self.palette.as_ref()
    }

    pub fn paint(&self, s: impl Display, color: Color) -> String {
        if self.colorize {
            s.to_string().color(color).to_string()
        } else {
            s.to_string()
        }
    }

    pub fn verdict(&self, verdict: Verdict) -> String {
        self.paint(verdict, self.palette.verdict(verdict))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReportOptions {
    /// Print expected and actual output of every compared test.
    pub verbose: bool,
    /// Do not print the diff of a wrong answer.
    pub silent: bool,
}

/// Prints the progress and the summary of a run in a human readable form.
pub struct ConsoleReporter<W: Write> {
    out: W,
    theme: Theme,
    opts: ReportOptions,
    pattern: String,
    timeout: Duration,
}

const RULE_WIDTH: usize = 50;

impl<W: Write> ConsoleReporter<W> {
    pub fn new(
        out: W,
        theme: Theme,
        opts: ReportOptions,
        pattern: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            out,
            theme,
            opts,
            pattern: pattern.into(),
            timeout,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn print_header(&mut self, num_testcases: usize) -> io::Result<()> {
        writeln!(
            self.out,
            "Found {} input files matching pattern \"{}\" (timeout: {})",
            num_testcases,
            self.pattern,
            format_duration(self.timeout),
        )
    }

    fn print_testcase_name(&mut self, t: &FsTestcase) -> io::Result<()> {
        let name = self.theme.paint(t.name(), self.theme.palette().highlight());
        write!(self.out, "{} - ", name)?;
        self.out.flush()
    }

    fn print_outcome(&mut self, res: &TestOutcome) -> io::Result<()> {
        let verdict = self.theme.verdict(res.verdict);
        match res.execution_time {
            Some(t) => write!(
                self.out,
                "{} [{}]: ",
                verdict,
                format_duration(round_to_millis(t))
            )?,
            None => write!(self.out, "{}: ", verdict)?,
        }

        match &res.detail {
            Detail::Accepted { expected, actual } => {
                writeln!(self.out, "Output matches expected result")?;
                if self.opts.verbose {
                    self.print_full_output(expected, actual, &res.stderr)?;
                }
            }
            Detail::WrongAnswer { expected, actual } => {
                writeln!(self.out, "Output doesn't match")?;
                if self.opts.verbose {
                    self.print_full_output(expected, actual, &res.stderr)?;
                } else if !self.opts.silent {
                    writeln!(self.out, " === Diff:")?;
                    writeln!(self.out, "{}", render_diff(expected, actual, &self.theme))?;
                    writeln!(self.out, " === End Diff (💡 Use -v flag for full output)")?;
                }
            }
            Detail::Timeout { limit } => {
                writeln!(
                    self.out,
                    "Program exceeded {} timeout",
                    format_duration(*limit)
                )?;
            }
            Detail::ExecutionError { message } => {
                writeln!(self.out, "executing program: {}", message)?;
                if !self.opts.silent && !res.stderr.is_empty() {
                    self.print_block("Stderr", &res.stderr)?;
                }
            }
            Detail::ReadExpected { message } => {
                writeln!(self.out, "reading expected output file: {}", message)?;
            }
            Detail::Generated { path } => {
                writeln!(self.out, "Wrote output file {}", path.to_string_lossy())?;
            }
            Detail::WriteExpected { message } => {
                writeln!(self.out, "failed while writing output: {}", message)?;
            }
            Detail::AlreadyExists { path } => {
                writeln!(
                    self.out,
                    "Output file {} found, skipping",
                    path.to_string_lossy()
                )?;
            }
        }
        Ok(())
    }

    fn print_full_output(&mut self, expected: &str, actual: &str, stderr: &str) -> io::Result<()> {
        self.print_block("Expected", expected)?;
        self.print_block("Actual", actual)?;
        if !stderr.is_empty() {
            self.print_block("Stderr", stderr)?;
        }
        Ok(())
    }

    fn print_block(&mut self, title: &str, text: &str) -> io::Result<()> {
        writeln!(self.out, " === {}:", title)?;
        if text.is_empty() {
            writeln!(
                self.out,
                "{}",
                self.theme.paint("<EMPTY>", self.theme.palette().muted())
            )?;
        }
        for line in text.lines() {
            let trimmed = line.trim_end();
            if trimmed.len() == line.len() || !self.theme.colorize {
                writeln!(self.out, "{}", line)?;
                continue;
            }
            let trailing = &line[trimmed.len()..];
            writeln!(
                self.out,
                "{}{}",
                trimmed,
                trailing.on_color(self.theme.palette().error())
            )?;
        }
        writeln!(self.out, " === End {}:", title)
    }

    fn print_summary(&mut self, summary: &RunSummary) -> io::Result<()> {
        writeln!(self.out, "\n{}", "=".repeat(RULE_WIDTH))?;
        let total = summary.num_total;

        if summary.generate_mode {
            writeln!(
                self.out,
                "Generated {}/{} new test files",
                summary.num_generated(),
                total
            )?;
            return writeln!(
                self.out,
                "    - {}/{} tests already exist",
                summary.num_skipped(),
                total
            );
        }

        writeln!(
            self.out,
            "Test Results: {}/{} passed",
            summary.num_passed(),
            total
        )?;
        writeln!(
            self.out,
            "Total execution time: {}",
            format_duration(summary.total_execution_time)
        )?;
        if total > 0 {
            writeln!(
                self.out,
                "Average execution time: {}",
                format_duration(summary.average_execution_time())
            )?;
        }

        if summary.all_passed() {
            let msg = self
                .theme
                .paint("🎉 All tests passed!", self.theme.palette().success());
            writeln!(self.out, "{}", msg)
        } else {
            self.print_failure_line(summary)
        }
    }

    fn print_failure_line(&mut self, summary: &RunSummary) -> io::Result<()> {
        let detail = summary
            .count
            .iter()
            .filter(|(&verdict, _)| !matches!(verdict, Verdict::AC | Verdict::GEN | Verdict::SKIP))
            .map(|(&verdict, &cnt)| format!("{} x{}", self.theme.verdict(verdict), cnt))
            .collect::<Vec<String>>()
            .join(", ");
        let msg = format!("💥 {} test(s) failed", summary.num_failed());
        writeln!(
            self.out,
            "{} ({})",
            self.theme.paint(msg, self.theme.palette().error()),
            detail
        )
    }

    fn report(&mut self, res: io::Result<()>) {
        res.unwrap_or_else(|e| log::warn!("Failed to write report: {}", e));
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn on_start(&mut self, testcases: &[FsTestcase]) {
        let res = self.print_header(testcases.len());
        self.report(res);
    }

    fn on_testcase_start(&mut self, testcase: &FsTestcase) {
        let res = self.print_testcase_name(testcase);
        self.report(res);
    }

    fn on_testcase_end(&mut self, outcome: &TestOutcome) {
        let res = self.print_outcome(outcome);
        self.report(res);
    }

    fn on_finish(&mut self, summary: &RunSummary) {
        let res = self.print_summary(summary);
        self.report(res);
    }
}

/// Line-based diff from `expected` to `actual`.
/// Removed lines are prefixed with `-`, added lines with `+`.
pub fn render_diff(expected: &str, actual: &str, theme: &Theme) -> String {
    let changeset = Changeset::new(expected, actual, "\n");
    let mut lines = Vec::new();
    for diff in &changeset.diffs {
        let (text, prefix, color) = match diff {
            Difference::Same(x) => (x, " ", None),
            Difference::Rem(x) => (x, "-", Some(theme.palette().removed())),
            Difference::Add(x) => (x, "+", Some(theme.palette().added())),
        };
        for line in text.split('\n') {
            let line = format!("{}{}", prefix, line);
            lines.push(match color {
                Some(c) => theme.paint(line, c),
                None => line,
            });
        }
    }
    lines.join("\n")
}
