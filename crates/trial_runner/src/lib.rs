//! Trial Runner Library
//!
//! Config loading, engine selection and the command bodies behind the
//! `trial_runner` binary.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use trial_core::record::RecordStore;
use trial_core::{
    DirectoryStore, EngineCommand, FramedEngine, MemoryStore, ModelCatalog, OfflineEngine,
    PhysicsEngine, RunReport, ScenarioConfig, TrialController, TrialSummary,
};

/// Install the global subscriber. `RUST_LOG` overrides the `info` default.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();
}

/// Where trial batches are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineTarget {
    Offline,
    Remote(String),
}

/// Load a scenario config and apply command-line overrides.
pub fn load_config(path: &Path, num_trials: Option<u32>, seed: Option<u64>) -> Result<ScenarioConfig> {
    let mut config = ScenarioConfig::from_path(path)
        .with_context(|| format!("Failed to load config: {}", path.display()))?;
    if let Some(n) = num_trials {
        config.general.num_trials = n;
    }
    if let Some(s) = seed {
        config.general.seed = s;
    }
    config
        .validate_scenario()
        .with_context(|| format!("Invalid config: {}", path.display()))?;
    Ok(config)
}

/// Built-in prototypes, extended or overridden by an optional catalog file.
pub fn load_catalog(path: Option<&Path>) -> Result<ModelCatalog> {
    let mut catalog = ModelCatalog::builtin();
    if let Some(path) = path {
        let extra = ModelCatalog::from_path(path)
            .with_context(|| format!("Failed to load catalog: {}", path.display()))?;
        catalog.merge(extra);
    }
    Ok(catalog)
}

/// Run every trial of `config` and write records under `out`.
pub fn run_trials(
    config: ScenarioConfig,
    catalog: ModelCatalog,
    target: &EngineTarget,
    out: &Path,
    json_mirror: bool,
) -> Result<RunReport> {
    let store = DirectoryStore::create(out)
        .with_context(|| format!("Failed to create output directory: {}", out.display()))?
        .with_json_mirror(json_mirror);
    info!(out = %out.display(), ?target, "Processing run");

    match target {
        EngineTarget::Offline => drive(config, catalog, OfflineEngine::new(), store),
        EngineTarget::Remote(addr) => {
            let engine = FramedEngine::connect(addr)
                .with_context(|| format!("Failed to connect to engine at {addr}"))?;
            drive(config, catalog, engine, store)
        }
    }
}

fn drive<E: PhysicsEngine, S: RecordStore>(
    config: ScenarioConfig,
    catalog: ModelCatalog,
    engine: E,
    store: S,
) -> Result<RunReport> {
    let mut controller = TrialController::new(config, catalog, engine, store)?;
    let report = controller.run()?;
    info!(
        written = report.trials_written,
        failed = report.trials_failed,
        "Successfully finished run"
    );
    Ok(report)
}

/// Initialization batch of one trial, built without contacting an engine.
pub fn plan_batch(config: ScenarioConfig, catalog: ModelCatalog, trial_num: u32) -> Result<Vec<EngineCommand>> {
    let mut controller = TrialController::new(config, catalog, OfflineEngine::new(), MemoryStore::new())?;
    let planned = controller
        .plan_trial(trial_num)
        .with_context(|| format!("Failed to plan trial {trial_num}"))?;
    Ok(planned.commands)
}

/// Aggregates for every record stored under `dir`, in trial order.
pub fn summarize_dir(dir: &Path) -> Result<Vec<TrialSummary>> {
    let store = DirectoryStore::open(dir)
        .with_context(|| format!("Failed to open record directory: {}", dir.display()))?;
    let mut summaries = Vec::new();
    for n in store.trial_numbers()? {
        let record = store
            .read_trial(n)
            .with_context(|| format!("Failed to read trial {n}"))?;
        summaries.push(TrialSummary::from_record(&record));
    }
    Ok(summaries)
}

/// The configuration JSON schema, pretty-printed.
pub fn schema_json() -> Result<String> {
    Ok(serde_json::to_string_pretty(&ScenarioConfig::json_schema())?)
}

/// One `name  library  category  LxHxD` line per prototype.
pub fn catalog_lines(catalog: &ModelCatalog) -> Vec<String> {
    catalog
        .iter()
        .map(|p| {
            let d = p.dimensions();
            format!(
                "{:<28} {:<14} {:<12} {:.2}x{:.2}x{:.2}{}",
                p.name,
                p.library,
                p.category,
                d.x,
                d.y,
                d.z,
                if p.flex { "  flex" } else { "" }
            )
        })
        .collect()
}

// ========== Tests ==========
