//! # Pipeline Files
//!
//! A world recipe in TOML: seed, size, the ordered stage list and the loot
//! tables chests draw from.
//!
//! ```toml
//! seed = 42
//! width = 400
//! height = 240
//! loot_file = "../loot/standard.toml"   # or an inline [loot] table
//!
//! [[stages]]
//! kind = "terrain"
//! dirt_depth = 12
//!
//! [[stages]]
//! kind = "chests"
//! count = 20
//! templates = [{ template = "cavern" }]
//! ```
//!
//! Every stage table takes the fields of its settings struct; omitted fields
//! keep their defaults. Loot tables are validated when the file is loaded,
//! stage settings when the stage runs.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strata_core::World;
use strata_loot::LootRegistry;

use crate::context::GenerationContext;
use crate::error::{ConfigError, ConfigResult};
use crate::pipeline::Pipeline;
use crate::stage::Stage;
use crate::stages::{
    CaveSettings, CaveStage, CavernSettings, CavernStage, ChestSettings, ChestStage, FillSettings,
    FillStage, PoolSettings, PoolStage, RoomStage, RoomStageSettings, TerrainSettings,
    TerrainStage, TunnelSettings, TunnelStage,
};

/// One `[[stages]]` entry, selected by its `kind` field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageConfig {
    /// See [`FillStage`].
    Fill(FillSettings),
    /// See [`TerrainStage`].
    Terrain(TerrainSettings),
    /// See [`CavernStage`].
    Cavern(CavernSettings),
    /// See [`CaveStage`].
    Caves(CaveSettings),
    /// See [`TunnelStage`].
    Tunnels(TunnelSettings),
    /// See [`RoomStage`].
    Rooms(RoomStageSettings),
    /// See [`PoolStage`].
    Pools(PoolSettings),
    /// See [`ChestStage`].
    Chests(ChestSettings),
}

impl StageConfig {
    /// The `kind` string of this entry.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Fill(_) => FillStage::NAME,
            Self::Terrain(_) => TerrainStage::NAME,
            Self::Cavern(_) => CavernStage::NAME,
            Self::Caves(_) => CaveStage::NAME,
            Self::Tunnels(_) => TunnelStage::NAME,
            Self::Rooms(_) => RoomStage::NAME,
            Self::Pools(_) => PoolStage::NAME,
            Self::Chests(_) => ChestStage::NAME,
        }
    }

    /// Builds the stage. `index` is only used in errors.
    ///
    /// # Errors
    ///
    /// Returns `MissingLoot` for a chest stage without loot tables.
    pub fn build(
        &self,
        index: usize,
        loot: Option<&Arc<LootRegistry>>,
    ) -> ConfigResult<Box<dyn Stage>> {
        let stage: Box<dyn Stage> = match self {
            Self::Fill(s) => Box::new(FillStage::new(*s)),
            Self::Terrain(s) => Box::new(TerrainStage::new(*s)),
            Self::Cavern(s) => Box::new(CavernStage::new(*s)),
            Self::Caves(s) => Box::new(CaveStage::new(*s)),
            Self::Tunnels(s) => Box::new(TunnelStage::new(*s)),
            Self::Rooms(s) => Box::new(RoomStage::new(*s)),
            Self::Pools(s) => Box::new(PoolStage::new(*s)),
            Self::Chests(s) => {
                let registry = loot.ok_or(ConfigError::MissingLoot { index })?;
                Box::new(ChestStage::new(s.clone(), Arc::clone(registry)))
            }
        };
        Ok(stage)
    }
}

/// A parsed pipeline file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Seed of the run.
    #[serde(default)]
    pub seed: u64,
    /// World width in columns.
    pub width: usize,
    /// World height in rows.
    pub height: usize,
    /// Stages in run order.
    #[serde(default)]
    pub stages: Vec<StageConfig>,
    /// Inline loot tables.
    #[serde(default)]
    pub loot: Option<LootRegistry>,
    /// Loot tables in a separate file, relative to the pipeline file.
    #[serde(default)]
    pub loot_file: Option<PathBuf>,
}

impl PipelineConfig {
    /// Parses and validates a pipeline document. A `loot_file` is resolved
    /// against the working directory.
    ///
    /// # Errors
    ///
    /// Returns `Parse` for malformed TOML or an unknown stage kind,
    /// `WorldSize` for an empty or oversized world, `Loot` for invalid loot
    /// tables and `MissingLoot` for chest stages with nothing to draw from.
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        Self::parse(source, None)
    }

    /// Reads, parses and validates a pipeline file.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&source, path.parent())
    }

    fn parse(source: &str, base: Option<&Path>) -> ConfigResult<Self> {
        let mut config: Self =
            toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;

        if let Some(file) = &config.loot_file {
            if config.loot.is_some() {
                return Err(ConfigError::Parse(
                    "set either loot_file or [loot], not both".to_string(),
                ));
            }
            let resolved = match base {
                Some(dir) if file.is_relative() => dir.join(file),
                _ => file.clone(),
            };
            tracing::debug!(path = %resolved.display(), "loading loot tables");
            config.loot = Some(LootRegistry::from_path(&resolved)?);
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks the world size, the loot tables and chest stage requirements.
    ///
    /// # Errors
    ///
    /// As [`from_toml_str`](Self::from_toml_str).
    pub fn validate(&self) -> ConfigResult<()> {
        let cells = self.width.checked_mul(self.height);
        let fits = i32::try_from(self.width).is_ok() && i32::try_from(self.height).is_ok();
        if self.width == 0 || self.height == 0 || cells.is_none() || !fits {
            return Err(ConfigError::WorldSize {
                width: self.width,
                height: self.height,
            });
        }
        if let Some(loot) = &self.loot {
            loot.validate()?;
        }
        if self.loot.is_none() {
            let chest_stage = self
                .stages
                .iter()
                .position(|s| matches!(s, StageConfig::Chests(_)));
            if let Some(index) = chest_stage {
                return Err(ConfigError::MissingLoot { index });
            }
        }
        Ok(())
    }

    /// A blank world of the configured size.
    #[must_use]
    pub fn world(&self) -> World {
        World::new(self.width, self.height)
    }

    /// A context seeded with the configured seed.
    #[must_use]
    pub fn context(&self) -> GenerationContext {
        GenerationContext::new(self.seed)
    }

    /// Builds the stages in file order. Chest stages share one registry.
    ///
    /// # Errors
    ///
    /// Returns `MissingLoot` for a chest stage without loot tables.
    pub fn build_pipeline(&self) -> ConfigResult<Pipeline> {
        let loot = self.loot.clone().map(Arc::new);
        let mut pipeline = Pipeline::new();
        for (index, stage) in self.stages.iter().enumerate() {
            pipeline.push(stage.build(index, loot.as_ref())?);
        }
        Ok(pipeline)
    }
}
