#![forbid(unsafe_code)]

use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use ms_case::{CaseError, TestCase, parse_expected, render_expected, render_input};
use ms_gen::random_case;
use ms_oracle::OracleError;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Solver-loop configuration. Behavior is governed by these fields; there
/// is no environment-variable surface. Building the solver binary is the
/// caller's precondition, not harness logic.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub solver: PathBuf,
    pub work_dir: PathBuf,
    pub samples: usize,
    pub size_jump: usize,
    pub max_value: u64,
    /// Reproduction seed. `None` seeds from OS entropy once per run; the
    /// RNG stream is never reseeded between cases either way.
    pub rng_seed: Option<u64>,
}

impl HarnessConfig {
    /// Stress profile: 50 cases stepping by 20_000 up to 10^6 elements,
    /// values below 10^6.
    #[must_use]
    pub fn default_paths() -> Self {
        Self {
            solver: PathBuf::from("./solver"),
            work_dir: PathBuf::from("."),
            samples: 50,
            size_jump: 20_000,
            max_value: 1_000_000,
            rng_seed: None,
        }
    }

    #[must_use]
    pub fn input_path(&self, size: usize) -> PathBuf {
        self.work_dir.join(format!("test_{size}.dat"))
    }

    #[must_use]
    pub fn expected_path(&self, size: usize) -> PathBuf {
        self.work_dir.join(format!("test_{size}.out"))
    }

    #[must_use]
    pub fn actual_path(&self, size: usize) -> PathBuf {
        self.work_dir.join(format!("test_{size}_exec.out"))
    }

    #[must_use]
    pub fn run_report_path(&self) -> PathBuf {
        self.work_dir.join("run_report.json")
    }

    #[must_use]
    pub fn run_history_path(&self) -> PathBuf {
        self.work_dir.join("run_history.jsonl")
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::default_paths()
    }
}

/// Batch corpus generation; input files only, no oracle and no
/// verification. Materializes reusable samples for standalone benchmarking.
#[derive(Debug, Clone)]
pub struct CorpusConfig {
    pub out_dir: PathBuf,
    pub samples: usize,
    pub size_jump: usize,
    pub max_value: u64,
    pub rng_seed: Option<u64>,
}

impl CorpusConfig {
    /// Lightweight profile: 5 samples stepping by 200_000, values below
    /// 200 so duplicates are dense.
    #[must_use]
    pub fn default_paths() -> Self {
        Self {
            out_dir: PathBuf::from("samples_big"),
            samples: 5,
            size_jump: 200_000,
            max_value: 200,
            rng_seed: None,
        }
    }

    #[must_use]
    pub fn sample_path(&self, sample: usize) -> PathBuf {
        self.out_dir.join(format!("sample_{sample:02}.dat"))
    }
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self::default_paths()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    /// Solver ran and its output matched the oracle byte-for-byte.
    Passed,
    /// Solver ran but its output differed; transient files are retained.
    Wrong,
    /// Solver failed to launch or exited abnormally; files are retained.
    Failed,
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Passed => "passed",
            Self::Wrong => "wrong",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseReport {
    pub size: usize,
    pub query_count: usize,
    pub status: CaseStatus,
    /// Wall-clock milliseconds strictly bracketing the solver invocation.
    /// Present only for cases that reached a comparison.
    pub elapsed_ms: Option<u64>,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub suite: String,
    pub solver: String,
    pub samples: usize,
    pub passed: usize,
    pub wrong: usize,
    pub failed: usize,
    pub results: Vec<CaseReport>,
}

impl RunReport {
    #[must_use]
    pub fn is_green(&self) -> bool {
        self.wrong == 0 && self.failed == 0 && self.samples > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunHistoryEntry {
    pub ts_unix_ms: u64,
    pub suite: String,
    pub solver: String,
    pub samples: usize,
    pub passed: usize,
    pub wrong: usize,
    pub failed: usize,
    pub green: bool,
}

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("configuration field {field} must be at least 1")]
    InvalidConfig { field: &'static str },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Case(#[from] CaseError),
    #[error(transparent)]
    Oracle(#[from] OracleError),
}

// A zero size_jump produces empty arrays and a zero max_value gives the
// array source an empty draw range; both are caller mistakes, surfaced as
// typed errors before any file is touched.
fn validate_schedule(size_jump: usize, max_value: u64) -> Result<(), HarnessError> {
    if size_jump == 0 {
        return Err(HarnessError::InvalidConfig { field: "size_jump" });
    }
    if max_value == 0 {
        return Err(HarnessError::InvalidConfig { field: "max_value" });
    }
    Ok(())
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Runs the full solver loop: `samples` cases on the linear size schedule
/// `size = iteration * size_jump`, one RNG stream across all of them.
///
/// Per-case outcomes are independent; a `Wrong` or `Failed` case never
/// stops the schedule. Only file-system and serialization errors abort
/// the run.
pub fn run_suite(config: &HarnessConfig) -> Result<RunReport, HarnessError> {
    validate_schedule(config.size_jump, config.max_value)?;
    fs::create_dir_all(&config.work_dir)?;
    let mut rng = make_rng(config.rng_seed);

    let mut results = Vec::with_capacity(config.samples);
    for iteration in 1..=config.samples {
        let size = iteration * config.size_jump;
        let case = random_case(&mut rng, size, config.max_value);
        results.push(run_case(config, &case)?);
    }

    let passed = count_status(&results, CaseStatus::Passed);
    let wrong = count_status(&results, CaseStatus::Wrong);
    let failed = count_status(&results, CaseStatus::Failed);

    Ok(RunReport {
        suite: "solver_loop".to_owned(),
        solver: config.solver.display().to_string(),
        samples: results.len(),
        passed,
        wrong,
        failed,
        results,
    })
}

/// Runs one prepared case end-to-end: serialize, compute the oracle
/// answer, invoke the solver with stdin/stdout bound to the transient
/// files, time the invocation, and compare bytes.
///
/// On `Passed` the three transient files are deleted; on `Wrong` and
/// `Failed` they are retained on purpose so the case can be re-driven by
/// hand against the same input.
pub fn run_case(config: &HarnessConfig, case: &TestCase) -> Result<CaseReport, HarnessError> {
    case.validate()?;
    let size = case.size();
    let query_count = case.queries.len();

    let input_path = config.input_path(size);
    let expected_path = config.expected_path(size);
    let actual_path = config.actual_path(size);

    fs::write(&input_path, render_input(case))?;
    let answer = ms_oracle::evaluate(&case.values, &case.queries)?;
    fs::write(&expected_path, render_expected(&answer))?;

    let stdin = File::open(&input_path)?;
    let stdout = File::create(&actual_path)?;

    let started = Instant::now();
    let status = Command::new(&config.solver)
        .stdin(Stdio::from(stdin))
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::null())
        .status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    let status = match status {
        Ok(status) => status,
        Err(err) => {
            // Launch failure is a per-case verdict, not a harness error.
            return Ok(CaseReport {
                size,
                query_count,
                status: CaseStatus::Failed,
                elapsed_ms: None,
                detail: Some(format!("solver failed to launch: {err}")),
            });
        }
    };

    if !status.success() {
        return Ok(CaseReport {
            size,
            query_count,
            status: CaseStatus::Failed,
            elapsed_ms: None,
            detail: Some(format!("solver exited abnormally: {status}")),
        });
    }

    let expected_bytes = fs::read(&expected_path)?;
    let actual_bytes = fs::read(&actual_path)?;

    if expected_bytes == actual_bytes {
        fs::remove_file(&input_path)?;
        fs::remove_file(&expected_path)?;
        fs::remove_file(&actual_path)?;
        return Ok(CaseReport {
            size,
            query_count,
            status: CaseStatus::Passed,
            elapsed_ms: Some(elapsed_ms),
            detail: None,
        });
    }

    Ok(CaseReport {
        size,
        query_count,
        status: CaseStatus::Wrong,
        elapsed_ms: Some(elapsed_ms),
        detail: Some(mismatch_detail(&expected_bytes, &actual_bytes)),
    })
}

/// Token-level description of the first divergence, for the report only.
/// The verdict itself is decided on raw bytes before this runs.
fn mismatch_detail(expected_bytes: &[u8], actual_bytes: &[u8]) -> String {
    let expected_text = String::from_utf8_lossy(expected_bytes);
    let actual_text = String::from_utf8_lossy(actual_bytes);

    let expected = match parse_expected(&expected_text) {
        Ok(values) => values,
        Err(err) => return format!("expected output is malformed: {err}"),
    };
    let actual = match parse_expected(&actual_text) {
        Ok(values) => values,
        Err(err) => return format!("solver output is not a value row: {err}"),
    };

    for (idx, (want, got)) in expected.iter().zip(actual.iter()).enumerate() {
        if want != got {
            return format!("first mismatch at query {idx}: expected {want}, got {got}");
        }
    }
    if expected.len() != actual.len() {
        return format!(
            "value count mismatch: expected {}, got {}",
            expected.len(),
            actual.len()
        );
    }
    // Same tokens, different bytes: whitespace or newline drift.
    "token values agree but byte layout differs (delimiter or newline drift)".to_owned()
}

fn count_status(results: &[CaseReport], status: CaseStatus) -> usize {
    results
        .iter()
        .filter(|result| result.status == status)
        .count()
}

/// Writes the structured run report as pretty JSON under the work dir.
pub fn write_run_report(
    config: &HarnessConfig,
    report: &RunReport,
) -> Result<PathBuf, HarnessError> {
    let path = config.run_report_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, serde_json::to_string_pretty(report)?)?;
    Ok(path)
}

/// Appends a one-row JSONL summary of the run to `run_history.jsonl`.
pub fn append_run_history(
    config: &HarnessConfig,
    report: &RunReport,
) -> Result<PathBuf, HarnessError> {
    let path = config.run_history_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let entry = RunHistoryEntry {
        ts_unix_ms: now_unix_ms(),
        suite: report.suite.clone(),
        solver: report.solver.clone(),
        samples: report.samples,
        passed: report.passed,
        wrong: report.wrong,
        failed: report.failed,
        green: report.is_green(),
    };

    let mut file = fs::OpenOptions::new().create(true).append(true).open(&path)?;
    writeln!(file, "{}", serde_json::to_string(&entry)?)?;
    Ok(path)
}

/// Materializes the batch input corpus: `samples` files on the linear size
/// schedule, input format only. Returns the written paths in order.
pub fn generate_corpus(config: &CorpusConfig) -> Result<Vec<PathBuf>, HarnessError> {
    validate_schedule(config.size_jump, config.max_value)?;
    fs::create_dir_all(&config.out_dir)?;
    let mut rng = make_rng(config.rng_seed);

    let mut written = Vec::with_capacity(config.samples);
    for sample in 1..=config.samples {
        let size = sample * config.size_jump;
        let case = random_case(&mut rng, size, config.max_value);
        let path = config.sample_path(sample);
        fs::write(&path, render_input(&case))?;
        written.push(path);
    }
    Ok(written)
}

fn now_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis() as u64)
        .unwrap_or(0)
}

/// Keeps CLI flag parsing honest about paths that must already exist.
#[must_use]
pub fn solver_is_present(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::{
        CaseReport, CaseStatus, CorpusConfig, HarnessConfig, HarnessError, RunReport,
        generate_corpus, mismatch_detail, run_suite,
    };

    fn report_with(passed: usize, wrong: usize, failed: usize) -> RunReport {
        RunReport {
            suite: "solver_loop".to_owned(),
            solver: "./solver".to_owned(),
            samples: passed + wrong + failed,
            passed,
            wrong,
            failed,
            results: Vec::new(),
        }
    }

    #[test]
    fn default_stress_profile_covers_one_million_elements() {
        let config = HarnessConfig::default_paths();
        assert_eq!(config.samples * config.size_jump, 1_000_000);
        assert_eq!(config.max_value, 1_000_000);
    }

    #[test]
    fn default_corpus_profile_uses_small_value_bound() {
        let config = CorpusConfig::default_paths();
        assert_eq!(config.samples * config.size_jump, 1_000_000);
        assert_eq!(config.max_value, 200);
        assert_eq!(
            config.sample_path(3),
            config.out_dir.join("sample_03.dat")
        );
    }

    #[test]
    fn transient_paths_are_keyed_by_size() {
        let config = HarnessConfig::default_paths();
        assert_eq!(
            config.input_path(20_000),
            config.work_dir.join("test_20000.dat")
        );
        assert_eq!(
            config.expected_path(20_000),
            config.work_dir.join("test_20000.out")
        );
        assert_eq!(
            config.actual_path(20_000),
            config.work_dir.join("test_20000_exec.out")
        );
    }

    #[test]
    fn zero_size_jump_is_rejected_before_any_case_runs() {
        let mut config = HarnessConfig::default_paths();
        config.size_jump = 0;
        let err = run_suite(&config).expect_err("zero size_jump");
        assert!(matches!(
            err,
            HarnessError::InvalidConfig { field: "size_jump" }
        ));
    }

    #[test]
    fn zero_value_bound_is_rejected_before_any_case_runs() {
        let mut config = HarnessConfig::default_paths();
        config.max_value = 0;
        let err = run_suite(&config).expect_err("zero max_value");
        assert!(matches!(
            err,
            HarnessError::InvalidConfig { field: "max_value" }
        ));

        let mut corpus = CorpusConfig::default_paths();
        corpus.max_value = 0;
        let err = generate_corpus(&corpus).expect_err("zero corpus max_value");
        assert!(matches!(
            err,
            HarnessError::InvalidConfig { field: "max_value" }
        ));
    }

    #[test]
    fn green_requires_no_wrong_no_failed_and_nonzero_samples() {
        assert!(report_with(3, 0, 0).is_green());
        assert!(!report_with(2, 1, 0).is_green());
        assert!(!report_with(2, 0, 1).is_green());
        assert!(!report_with(0, 0, 0).is_green());
    }

    #[test]
    fn status_labels_are_stable_for_reports() {
        assert_eq!(CaseStatus::Passed.to_string(), "passed");
        assert_eq!(CaseStatus::Wrong.to_string(), "wrong");
        assert_eq!(CaseStatus::Failed.to_string(), "failed");

        let json = serde_json::to_string(&CaseStatus::Wrong).expect("serialize");
        assert_eq!(json, "\"wrong\"");
    }

    #[test]
    fn case_report_round_trips_through_json() {
        let report = CaseReport {
            size: 40_000,
            query_count: 812,
            status: CaseStatus::Passed,
            elapsed_ms: Some(117),
            detail: None,
        };
        let json = serde_json::to_string(&report).expect("serialize");
        let back: CaseReport = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, report);
    }

    #[test]
    fn mismatch_detail_points_at_first_divergent_value() {
        let detail = mismatch_detail(b"1 3 5\n", b"1 4 5\n");
        assert!(detail.contains("query 1"), "detail={detail}");
        assert!(detail.contains("expected 3"), "detail={detail}");
    }

    #[test]
    fn mismatch_detail_reports_count_drift() {
        let detail = mismatch_detail(b"1 3 5\n", b"1 3\n");
        assert!(detail.contains("count mismatch"), "detail={detail}");
    }

    #[test]
    fn mismatch_detail_flags_newline_only_drift() {
        let detail = mismatch_detail(b"1 3 5\n", b"1 3 5");
        assert!(detail.contains("byte layout"), "detail={detail}");
    }

    #[test]
    fn mismatch_detail_survives_garbage_solver_output() {
        let detail = mismatch_detail(b"1 3 5\n", b"segfault at 0x0");
        assert!(detail.contains("not a value row"), "detail={detail}");
    }
}
