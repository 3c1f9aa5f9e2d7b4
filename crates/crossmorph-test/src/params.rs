//! Regression test parameters and operations

use crate::error::{TestError, TestResult};
use crate::regout_dir;
use crossmorph_core::PixelBuffer;
use std::fs;

/// Regression test mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegTestMode {
    /// Compare results in memory (default)
    #[default]
    Compare,
    /// Also write result buffers to the regout directory for inspection
    Display,
}

impl RegTestMode {
    /// Parse mode from the `REGTEST_MODE` environment variable
    pub fn from_env() -> Self {
        match std::env::var("REGTEST_MODE")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "display" => Self::Display,
            _ => Self::Compare,
        }
    }
}

/// Regression test parameters
///
/// Tracks the test name, the current check index, the mode, and every
/// failure recorded so far. Checks never panic; call [`cleanup`] at the
/// end and assert on its result.
///
/// [`cleanup`]: RegParams::cleanup
pub struct RegParams {
    /// Name of the test (e.g., "crossmorph1")
    pub test_name: String,
    /// Current check index (incremented before each check)
    index: usize,
    pub mode: RegTestMode,
    success: bool,
    failures: Vec<String>,
}

impl RegParams {
    /// Create new regression test parameters
    pub fn new(test_name: &str) -> Self {
        let mode = RegTestMode::from_env();

        eprintln!();
        eprintln!("////////////////////////////////////////////////");
        eprintln!("////////////////   {}_reg   ///////////////", test_name);
        eprintln!("////////////////////////////////////////////////");
        eprintln!("Mode: {:?}", mode);

        Self {
            test_name: test_name.to_string(),
            index: 0,
            mode,
            success: true,
            failures: Vec::new(),
        }
    }

    /// Get the current check index
    pub fn index(&self) -> usize {
        self.index
    }

    /// Check if in display mode
    pub fn display(&self) -> bool {
        self.mode == RegTestMode::Display
    }

    fn fail(&mut self, msg: String) {
        eprintln!("{}", msg);
        self.failures.push(msg);
        self.success = false;
    }

    /// Compare two numeric values within `delta`.
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        self.index += 1;
        let diff = (expected - actual).abs();

        if diff > delta {
            let msg = format!(
                "Failure in {}_reg: value comparison for index {}\n\
                 difference = {} but allowed delta = {}\n\
                 expected = {}, actual = {}",
                self.test_name, self.index, diff, delta, expected, actual
            );
            self.fail(msg);
            false
        } else {
            true
        }
    }

    /// Compare two buffers for exact equality.
    ///
    /// On mismatch the first differing pixel is reported.
    pub fn compare_buffers(&mut self, expected: &PixelBuffer, actual: &PixelBuffer) -> bool {
        self.index += 1;

        if expected.dimensions() != actual.dimensions() {
            let msg = format!(
                "Failure in {}_reg: buffer comparison for index {} - dimension mismatch {} vs {}",
                self.test_name,
                self.index,
                expected.dimensions(),
                actual.dimensions()
            );
            self.fail(msg);
            return false;
        }

        let width = expected.width() as usize;
        let mismatch = expected
            .data()
            .iter()
            .zip(actual.data())
            .position(|(a, b)| a != b);

        if let Some(i) = mismatch {
            let msg = format!(
                "Failure in {}_reg: buffer comparison for index {} - pixel mismatch at ({}, {}): {} vs {}",
                self.test_name,
                self.index,
                i % width,
                i / width,
                expected.data()[i],
                actual.data()[i]
            );
            self.fail(msg);
            return false;
        }

        true
    }

    /// Record a boolean check.
    pub fn check(&mut self, condition: bool, what: &str) -> bool {
        self.index += 1;
        if !condition {
            let msg = format!(
                "Failure in {}_reg: check for index {} - {}",
                self.test_name, self.index, what
            );
            self.fail(msg);
        }
        condition
    }

    /// In display mode, write `buffer` to the regout directory as raw bytes.
    ///
    /// The file is named `<test>.<index>_<w>x<h>.raw` so it can be fed
    /// straight back to the command-line tool.
    pub fn write_buffer(&mut self, buffer: &PixelBuffer) -> TestResult<()> {
        self.index += 1;
        if !self.display() {
            return Ok(());
        }

        fs::create_dir_all(regout_dir())?;
        let path = format!(
            "{}/{}{:02}_{}.raw",
            regout_dir(),
            self.test_name,
            self.index,
            buffer.dimensions()
        );
        crossmorph_io::write_raw(&path, buffer).map_err(|e| TestError::BufferWrite {
            path: path.clone(),
            message: e.to_string(),
        })?;
        eprintln!("Wrote: {}", path);
        Ok(())
    }

    /// Report results; `true` if every check passed.
    pub fn cleanup(self) -> bool {
        if self.success {
            eprintln!("SUCCESS: {}_reg", self.test_name);
        } else {
            eprintln!("FAILURE: {}_reg", self.test_name);
            for failure in &self.failures {
                eprintln!("  {}", failure);
            }
        }
        eprintln!();

        self.success
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn failures(&self) -> &[String] {
        &self.failures
    }
}
