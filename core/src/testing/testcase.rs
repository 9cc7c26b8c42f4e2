use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use super::sink::CaptureMode;

pub const INPUT_SUFFIX: &str = ".in";

/// An input file and the path of its expected-output counterpart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsTestcase {
    name: String,
    input_data_path: PathBuf,
    expected_data_path: PathBuf,
}

impl FsTestcase {
    pub fn new(
        name: impl Into<String>,
        input: impl Into<PathBuf>,
        expected: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            input_data_path: input.into(),
            expected_data_path: expected.into(),
        }
    }

    /// Build a testcase named after its input path, resolving the expected file by convention.
    pub fn from_input_path(input: impl Into<PathBuf>, mode: CaptureMode) -> Self {
        let input = input.into();
        let expected = expected_path(&input, mode);
        let name = input.to_string_lossy().into_owned();
        Self::new(name, input, expected)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input_path(&self) -> &Path {
        &self.input_data_path
    }

    pub fn expected_path(&self) -> &Path {
        &self.expected_data_path
    }
}

/// Strip a trailing `.in` from the path (if any) and append the expected-file extension.
/// ```
/// use harn_core::testing::{expected_path, CaptureMode};
/// use std::path::Path;
///
/// assert_eq!(expected_path("t/01.in", CaptureMode::Text), Path::new("t/01.out"));
/// assert_eq!(expected_path("t/01.in", CaptureMode::Digest), Path::new("t/01.hash"));
/// assert_eq!(expected_path("t/01.txt", CaptureMode::Text), Path::new("t/01.txt.out"));
/// ```
pub fn expected_path(input: impl AsRef<Path>, mode: CaptureMode) -> PathBuf {
    let input = input.as_ref();
    let mut res: OsString = match input.to_str() {
        Some(s) => s.strip_suffix(INPUT_SUFFIX).unwrap_or(s).into(),
        None => input.as_os_str().to_owned(),
    };
    res.push(".");
    res.push(mode.extension());
    res.into()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn should_append_when_no_in_suffix() {
        assert_eq!(expected_path("case1", CaptureMode::Text), Path::new("case1.out"));
        assert_eq!(
            expected_path("dir.in/case1", CaptureMode::Digest),
            Path::new("dir.in/case1.hash")
        );
    }

    #[test]
    fn should_strip_only_the_last_in() {
        assert_eq!(expected_path("a.in.in", CaptureMode::Text), Path::new("a.in.out"));
        assert_eq!(expected_path(".in", CaptureMode::Text), Path::new(".out"));
    }

    #[test]
    fn from_input_path_should_use_path_as_name() {
        let t = FsTestcase::from_input_path("tests/a.in", CaptureMode::Text);
        assert_eq!(t.name(), "tests/a.in");
        assert_eq!(t.input_path(), Path::new("tests/a.in"));
        assert_eq!(t.expected_path(), Path::new("tests/a.out"));
    }
}
