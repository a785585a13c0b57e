//! Command implementations behind the `qcsim` CLI.

use anyhow::{bail, ensure, Context, Result};
use qcsim_core::config::AppConfig;
use qcsim_core::engine::{NullPerturbation, PerturbationSource, SeededPerturbation};
use qcsim_core::report::TextAssessment;
use qcsim_core::scanner::{scan, CrisisAnalysis, CrisisRecord};
use qcsim_io::{read_status, CycleOutcome, ErrorKind, IoError, RunContext, RunStatus};
use std::path::{Path, PathBuf};

/// Config file looked up when `--config` is not given.
pub const DEFAULT_CONFIG: &str = "qcsim.toml";

/// Upper bound on cycles per `advance` invocation.
pub const MAX_CYCLES: u64 = 100_000;

/// Loads the config. An explicit path must exist; the default one may not.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(p) => {
            if !p.exists() {
                bail!("config file {} does not exist", p.display());
            }
            AppConfig::load(p)
        }
        None => AppConfig::load(Path::new(DEFAULT_CONFIG)),
    }
}

#[derive(Debug, Clone)]
pub struct AdvanceOptions {
    pub run_dir: PathBuf,
    /// Overrides `run.seed` from the config.
    pub seed: Option<u64>,
    pub zero_drift: bool,
    pub cycles: u64,
    pub write_report: bool,
}

impl AdvanceOptions {
    #[must_use]
    pub fn new(run_dir: impl Into<PathBuf>) -> Self {
        Self {
            run_dir: run_dir.into(),
            seed: None,
            zero_drift: false,
            cycles: 1,
            write_report: false,
        }
    }
}

/// Advances a run by `opts.cycles` cycles under one lock.
pub fn advance(config: AppConfig, opts: &AdvanceOptions) -> Result<Vec<CycleOutcome>> {
    ensure!(
        (1..=MAX_CYCLES).contains(&opts.cycles),
        "cycles must be between 1 and {MAX_CYCLES}, got {}",
        opts.cycles
    );
    let seed = opts.seed.unwrap_or(config.run.seed);
    let mut source: Box<dyn PerturbationSource> = if opts.zero_drift {
        Box::new(NullPerturbation)
    } else {
        Box::new(SeededPerturbation::new(seed))
    };

    let mut ctx = RunContext::open(&opts.run_dir, config)
        .with_context(|| format!("opening run {}", opts.run_dir.display()))?;
    let mut outcomes = Vec::new();
    for _ in 0..opts.cycles {
        outcomes.push(ctx.advance(source.as_mut())?);
        if opts.write_report {
            ctx.write_report()?;
        }
    }
    ctx.close();
    tracing::info!(
        run_dir = %opts.run_dir.display(),
        cycles = outcomes.len(),
        "advance finished"
    );
    Ok(outcomes)
}

/// Latest persisted cycle, without locking.
pub fn status(run_dir: &Path) -> Result<Option<RunStatus>> {
    Ok(read_status(run_dir)?)
}

/// Writes the markdown report for the current cycle and returns its path.
pub fn report(config: AppConfig, run_dir: &Path) -> Result<PathBuf> {
    if read_status(run_dir)?.is_none() {
        bail!("run {} has not completed a cycle yet", run_dir.display());
    }
    let ctx = RunContext::open(run_dir, config)?;
    let path = ctx.write_report()?;
    ctx.close();
    Ok(path)
}

/// Assesses `text`, or the contents of `file` when given.
pub fn assess(text: Option<&str>, file: Option<&Path>) -> Result<TextAssessment> {
    let owned;
    let text = match (text, file) {
        (Some(t), None) => t,
        (None, Some(f)) => {
            owned = std::fs::read_to_string(f)
                .with_context(|| format!("reading {}", f.display()))?;
            owned.as_str()
        }
        _ => bail!("pass either a text argument or --file"),
    };
    Ok(TextAssessment::assess(text))
}

/// Scans a crisis record stored as JSON.
pub fn scan_file(path: &Path) -> Result<CrisisAnalysis> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let record: CrisisRecord = serde_json::from_str(&content)
        .with_context(|| format!("parsing crisis record {}", path.display()))?;
    Ok(scan(&record))
}

/// Process exit code for a failed command.
#[must_use]
pub fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<IoError>().map(IoError::kind) {
        Some(ErrorKind::InvalidInput) => 2,
        Some(ErrorKind::PersistenceCorrupt) => 3,
        Some(ErrorKind::ConcurrentWriteConflict) => 4,
        Some(ErrorKind::PersistenceMissing | ErrorKind::Io) | None => 1,
    }
}
