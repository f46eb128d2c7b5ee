use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::GridError;
use crate::tile::TileType;

pub const DEFAULT_WIDTH: i32 = 5;
pub const DEFAULT_HEIGHT: i32 = 5;
pub const MIN_RUN_FLOOR: usize = 3;
pub const DEFAULT_MOVE_MS: u64 = 200;

/// Which rows the cascade re-checks after a compaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    /// Sweep upward from the triggering row to the top, settling each row before moving on.
    #[default]
    RowsAbove,
    /// Only settle the triggering row.
    OriginRow,
}

/// The part of the configuration the cascade consults while resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    pub min_run: usize,
    pub scan: ScanMode,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            min_run: MIN_RUN_FLOOR,
            scan: ScanMode::RowsAbove,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub width: i32,
    pub height: i32,
    pub min_run: usize,
    pub palette: Vec<TileType>,
    pub scan: ScanMode,
    pub move_duration_ms: u64,
    pub seed: Option<u64>,
    pub verbose: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            min_run: MIN_RUN_FLOOR,
            palette: vec![TileType::Red, TileType::Green, TileType::Blue, TileType::White],
            scan: ScanMode::RowsAbove,
            move_duration_ms: DEFAULT_MOVE_MS,
            seed: None,
            verbose: false,
        }
    }
}

impl GridConfig {
    pub fn new(width: i32, height: i32, min_run: usize, palette: Vec<TileType>) -> Self {
        Self {
            width,
            height,
            min_run,
            palette,
            ..Self::default()
        }
    }

    pub fn from_json(text: &str) -> Result<Self, GridError> {
        let config: GridConfig =
            serde_json::from_str(text).map_err(|e| GridError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), GridError> {
        if self.width < 1 {
            return Err(GridError::Configuration(format!(
                "width must be at least 1, got {}",
                self.width
            )));
        }
        if self.height < 1 {
            return Err(GridError::Configuration(format!(
                "height must be at least 1, got {}",
                self.height
            )));
        }
        if self.min_run < MIN_RUN_FLOOR {
            return Err(GridError::Configuration(format!(
                "min_run must be at least {MIN_RUN_FLOOR}, got {}",
                self.min_run
            )));
        }
        validate_palette(&self.palette)
    }

    pub fn rules(&self) -> Rules {
        Rules {
            min_run: self.min_run,
            scan: self.scan,
        }
    }

    pub fn move_duration(&self) -> Duration {
        Duration::from_millis(self.move_duration_ms)
    }
}

pub(crate) fn validate_palette(palette: &[TileType]) -> Result<(), GridError> {
    if palette.is_empty() {
        return Err(GridError::Configuration("palette is empty".into()));
    }
    for (i, kind) in palette.iter().enumerate() {
        if palette[..i].contains(kind) {
            return Err(GridError::Configuration(format!(
                "palette lists {kind:?} more than once"
            )));
        }
    }
    Ok(())
}
