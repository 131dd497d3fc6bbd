use std::fs;
use std::path::{Path, PathBuf};

use bubbles_core::{
    AggregatedSet, AggregationReport, RankedLists, RankedSourceProvider, Scene, SourceKind,
    SourceLimits, SourceOutcome, aggregate_with_report, export_json, import_json,
};
use rand::Rng;

use crate::config::{Config, DB_FILE, resolve_base_dir};
use crate::error::{Result, StoreError};
use crate::store::{Store, StoreSources};

/// The idea board on disk: configuration plus the idea database.
///
/// Layout:
/// ```text
/// ~/.idea-bubbles/
/// ├── bubbles.toml   (optional)
/// └── ideas.db
/// ```
pub struct Board {
    base_dir: PathBuf,
    config: Config,
    store: Store,
}

impl Board {
    /// Open the board, creating the directory as needed.
    /// `base_dir` overrides `BUBBLES_DATA_DIR` and the home default.
    pub fn open(base_dir: Option<&Path>) -> Result<Self> {
        let base = resolve_base_dir(base_dir);
        fs::create_dir_all(&base)?;

        let config = Config::load(&base)?;
        let store = Store::open(&base.join(DB_FILE))?;
        tracing::debug!(base = %base.display(), "board opened");

        Ok(Self {
            base_dir: base,
            config,
            store,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn db_path(&self) -> PathBuf {
        self.base_dir.join(DB_FILE)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Thread-safe providers for the five ranking queries.
    pub fn sources(&self, seed: Option<u64>) -> StoreSources {
        StoreSources::new(self.db_path()).with_seed(seed)
    }

    /// Fetch all five lists sequentially and merge them.
    pub fn gather(&self, seed: Option<u64>) -> (AggregatedSet, AggregationReport) {
        gather_from(&self.sources(seed), &self.config.sources)
    }

    /// Fresh scene sized and capped per `[display]`.
    pub fn scene_from(&self, set: &AggregatedSet, rng: &mut impl Rng) -> Scene {
        let display = &self.config.display;
        Scene::from_aggregated(set, display.bounds(), display.max_bubbles, rng)
    }

    pub fn export_scene_file(&self, scene: &Scene, path: &Path) -> Result<()> {
        let json = export_json(scene)
            .map_err(|e| StoreError::InvalidData(format!("snapshot encode failed: {e}")))?;
        fs::write(path, json)?;
        tracing::info!(path = %path.display(), bubbles = scene.bubbles().len(), "scene saved");
        Ok(())
    }

    pub fn import_scene_file(&self, path: &Path) -> Result<Scene> {
        let json = fs::read_to_string(path)?;
        import_json(&json).map_err(|e| {
            StoreError::InvalidData(format!("bad snapshot {}: {e}", path.display()))
        })
    }
}

/// Sequential fetch and merge. Failed sources are logged and read as empty.
pub fn gather_from(
    provider: &impl RankedSourceProvider,
    limits: &SourceLimits,
) -> (AggregatedSet, AggregationReport) {
    let lists = RankedLists::fetch_all(provider, limits);
    for kind in SourceKind::ALL {
        if let SourceOutcome::Failed(failure) = lists.get(kind) {
            tracing::warn!(source = %kind, error = %failure.message, "source fetch failed");
        }
    }
    aggregate_with_report(&lists)
}
