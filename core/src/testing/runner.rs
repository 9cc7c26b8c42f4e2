use std::{
    io,
    path::{Path, PathBuf},
    process::Stdio,
    time::Duration,
};

use anyhow::{bail, Context};
use tokio::{io::AsyncWriteExt, process::Command};

use super::{result::*, sink::CaptureMode};

#[derive(Debug, Clone)]
pub struct TestRunner {
    program: PathBuf,
    execution_time_limit: Duration,
    capture_mode: CaptureMode,
}

impl TestRunner {
    pub const DEFAULT_EXEC_TIME_LIMIT: Duration = Duration::from_secs(30);

    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            execution_time_limit: Self::DEFAULT_EXEC_TIME_LIMIT,
            capture_mode: CaptureMode::default(),
        }
    }

    pub fn execution_time_limit(mut self, limit: Duration) -> Self {
        self.execution_time_limit = limit;
        self
    }

    pub fn capture_mode(mut self, mode: CaptureMode) -> Self {
        self.capture_mode = mode;
        self
    }

    pub fn get_program(&self) -> &Path {
        &self.program
    }

    pub fn get_exec_time_limit(&self) -> Duration {
        self.execution_time_limit
    }

    pub fn get_capture_mode(&self) -> CaptureMode {
        self.capture_mode
    }

    /// Run the program once with the contents of `input_file` on its stdin.
    ///
    /// Never fails: spawn errors, non-zero exits and I/O errors are reported as
    /// [`ExecOutcome::ExecutionError`], an expired deadline as [`ExecOutcome::Timeout`].
    /// The elapsed time covers spawning up to the moment the outcome is known,
    /// including killing the process on timeout.
    pub async fn run(&self, input_file: impl AsRef<Path>) -> ExecutionResult {
        let input = match fsutil::read_lines(&input_file) {
            Ok(bytes) => bytes,
            Err(e) => {
                return ExecutionResult {
                    outcome: ExecOutcome::ExecutionError(format!(
                        "failed to read input file: {}",
                        e
                    )),
                    elapsed: Duration::ZERO,
                    stderr: String::new(),
                }
            }
        };

        log::debug!(
            "Running {:?} < {:?}",
            self.program,
            input_file.as_ref().to_string_lossy()
        );

        let mut stderr_buf = Vec::new();
        let start_at = tokio::time::Instant::now();

        let outcome = self
            .execute(&input, &mut stderr_buf)
            .await
            .unwrap_or_else(|e| ExecOutcome::ExecutionError(format!("{:#}", e)));

        let elapsed = tokio::time::Instant::now().duration_since(start_at);
        log::debug!("Finished in {:?}: {:?}", elapsed, outcome);

        ExecutionResult {
            outcome,
            elapsed,
            stderr: String::from_utf8_lossy(&stderr_buf).into(),
        }
    }

    async fn execute(&self, input: &[u8], stderr_buf: &mut Vec<u8>) -> anyhow::Result<ExecOutcome> {
        let mut proc = Command::new(&self.program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn '{}'", self.program.to_string_lossy()))?;
        let mut stdin = proc.stdin.take().context("Failed to open stdin")?;
        let mut stdout = proc.stdout.take().context("Failed to open stdout")?;
        let mut stderr = proc.stderr.take().context("Failed to open stderr")?;

        let mut sink = self.capture_mode.new_sink();

        let res = {
            // stdin is moved in so that it gets closed as soon as the input is written
            let fut_stdin = async move {
                match stdin.write_all(input).await {
                    // the program exited (or closed stdin) without reading everything
                    Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
                    res => res,
                }
            };
            let fut_stdout = tokio::io::copy(&mut stdout, &mut sink);
            let fut_stderr = tokio::io::copy(&mut stderr, stderr_buf);
            let fut_exit_status = proc.wait();

            tokio::time::timeout(self.execution_time_limit, async {
                tokio::try_join!(fut_stdin, fut_stdout, fut_stderr, fut_exit_status)
                    .context("Failed to communicate with subprocess")
            })
            .await
        };

        match res {
            Err(_) => {
                proc.kill()
                    .await
                    .unwrap_or_else(|e| log::warn!("Failed to kill TLE process: {:#}", e));
                Ok(ExecOutcome::Timeout)
            }

            Ok(Err(e)) => Err(e),

            Ok(Ok((_, _, _, exit_status))) => {
                if !exit_status.success() {
                    bail!("{}", exit_status);
                }
                Ok(ExecOutcome::Success(sink.into_output()))
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testutil::{sh_script, write_file};

    #[tokio::test]
    async fn should_capture_stdout_as_text() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_file(dir.path(), "a.in", "1 2\n3 4\n");

        let res = TestRunner::new("cat").run(&input).await;
        // the input is fed as joined lines, without the last newline
        assert_eq!(res.outcome, ExecOutcome::Success(b"1 2\n3 4".to_vec()));
        assert_eq!(res.stderr, "");
    }

    #[tokio::test]
    async fn should_capture_stdout_as_digest() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_file(dir.path(), "a.in", "hello\n");

        let res = TestRunner::new("cat")
            .capture_mode(CaptureMode::Digest)
            .run(&input)
            .await;
        assert_eq!(
            res.outcome,
            ExecOutcome::Success(
                b"2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824".to_vec()
            )
        );
    }

    #[tokio::test]
    async fn should_pass_non_utf8_bytes_through() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_file(dir.path(), "a.in", b"caf\xe9\r\n");

        let res = TestRunner::new("cat").run(&input).await;
        assert_eq!(res.outcome, ExecOutcome::Success(b"caf\xe9".to_vec()));
    }

    #[tokio::test]
    async fn should_not_trim_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_file(dir.path(), "a.in", "");
        let prog = sh_script(dir.path(), "prog", "printf '  x  \\n\\n'");

        let res = TestRunner::new(&prog).run(&input).await;
        assert_eq!(res.outcome, ExecOutcome::Success(b"  x  \n\n".to_vec()));
    }

    #[tokio::test]
    async fn should_succeed_even_if_stdin_is_not_read() {
        let dir = tempfile::tempdir().unwrap();
        let big_input = "0123456789\n".repeat(200_000);
        let input = write_file(dir.path(), "a.in", &big_input);

        let res = TestRunner::new("true").run(&input).await;
        assert_eq!(res.outcome, ExecOutcome::Success(Vec::new()));
    }

    #[tokio::test]
    async fn should_be_execution_error_on_nonzero_exit() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_file(dir.path(), "a.in", "1\n");
        let prog = sh_script(dir.path(), "prog", "echo 1; echo oops >&2; exit 42");

        let res = TestRunner::new(&prog).run(&input).await;
        let ExecOutcome::ExecutionError(msg) = &res.outcome else {
            panic!("unexpected outcome: {:?}", res.outcome)
        };
        assert!(msg.contains("42"), "{}", msg);
        assert_eq!(res.stderr, "oops\n");
    }

    #[tokio::test]
    async fn should_be_execution_error_on_spawn_failure() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_file(dir.path(), "a.in", "1\n");

        let res = TestRunner::new(dir.path().join("no-such-program"))
            .run(&input)
            .await;
        let ExecOutcome::ExecutionError(msg) = &res.outcome else {
            panic!("unexpected outcome: {:?}", res.outcome)
        };
        assert!(msg.contains("Failed to spawn"), "{}", msg);
    }

    #[tokio::test]
    async fn should_be_execution_error_on_missing_input() {
        let dir = tempfile::tempdir().unwrap();

        let res = TestRunner::new("cat").run(dir.path().join("a.in")).await;
        let ExecOutcome::ExecutionError(msg) = &res.outcome else {
            panic!("unexpected outcome: {:?}", res.outcome)
        };
        assert!(msg.starts_with("failed to read input file"), "{}", msg);
        assert_eq!(res.elapsed, Duration::ZERO);
    }

    #[tokio::test]
    async fn should_be_timeout_and_kill_the_process() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_file(dir.path(), "a.in", "");
        let pidfile = dir.path().join("pid");
        let prog = sh_script(
            dir.path(),
            "prog",
            &format!("echo $$ > '{}'; exec sleep 10", pidfile.to_string_lossy()),
        );

        let res = TestRunner::new(&prog)
            .execution_time_limit(Duration::from_millis(300))
            .run(&input)
            .await;
        assert_eq!(res.outcome, ExecOutcome::Timeout);
        assert!(res.elapsed >= Duration::from_millis(300), "{:?}", res.elapsed);
        assert!(res.elapsed < Duration::from_secs(5), "{:?}", res.elapsed);

        let pid = std::fs::read_to_string(&pidfile).unwrap();
        let alive = std::process::Command::new("kill")
            .args(["-0", pid.trim()])
            .stderr(Stdio::null())
            .status()
            .unwrap()
            .success();
        assert!(!alive, "process {} is still running", pid.trim());
    }
}
