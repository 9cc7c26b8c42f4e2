use std::time::Duration;

/// How a single execution of the target program ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecOutcome {
    /// Captured stdout (raw bytes, or hex digest in hash mode).
    Success(Vec<u8>),
    Timeout,
    ExecutionError(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub outcome: ExecOutcome,
    pub elapsed: Duration,
    pub stderr: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display)]
pub enum Verdict {
    AC,
    WA,
    TLE,
    ERR,
    GEN,
    SKIP,
}

/// What is shown below the verdict line of a test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detail {
    Accepted {
        expected: String,
        actual: String,
    },
    WrongAnswer {
        expected: String,
        actual: String,
    },
    Timeout {
        limit: Duration,
    },
    ExecutionError {
        message: String,
    },
    ReadExpected {
        message: String,
    },
    Generated {
        path: std::path::PathBuf,
    },
    WriteExpected {
        message: String,
    },
    AlreadyExists {
        path: std::path::PathBuf,
    },
}

/// The judged result of one testcase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOutcome {
    pub testcase_name: String,
    pub verdict: Verdict,
    /// `None` when the program was never run (SKIP).
    pub execution_time: Option<Duration>,
    pub detail: Detail,
    pub stderr: String,
}
