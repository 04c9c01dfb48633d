use crate::game::error::NavError;
use crate::game::fixed_math::{fixed_from_f32, FixedNum};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

/// Default location of the navigation config file.
pub const DEFAULT_CONFIG_PATH: &str = "assets/nav_config.ron";

/// How the LOS grid reports tiles regardless of what players actually see.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevealMode {
    /// Report the computed masks.
    #[default]
    Normal,
    /// Every tile is at least `Explored`; `Visible` still follows sight.
    Explored,
    /// Every tile is `Visible` to every player.
    AllVisible,
}

/// Static navigation configuration loaded once at startup.
///
/// These values are user-facing (RON, floats). They are converted into
/// [`NavSettings`] exactly once; changing them mid-match breaks determinism.
#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct NavConfig {
    /// World units per pathfinding/LOS/territory tile.
    pub cell_size: f32,
    /// World units per collision patch. Must be >= `cell_size`.
    pub patch_size: f32,
    /// Node expansions allowed per `find_path`.
    pub search_limit: usize,
    /// Hard cap on search nodes held by one engine.
    pub max_pool_nodes: usize,
    /// Subtract the acceptance radius from every edge cost (legacy movement feel).
    pub radius_edge_bias: bool,
    /// Break equal-f ties in the open list by lower h.
    pub tie_break_on_h: bool,
    pub reveal_mode: RevealMode,
    /// Players tracked by the LOS masks, Gaia included.
    pub max_players: usize,
    /// Solved searches using more than this fraction of the budget log a warning.
    pub log_high_iteration_fraction: f32,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            cell_size: 4.0,
            patch_size: 16.0,
            search_limit: 5000,
            max_pool_nodes: 65_536,
            radius_edge_bias: true,
            tie_break_on_h: true,
            reveal_mode: RevealMode::Normal,
            max_players: 9,
            log_high_iteration_fraction: 0.5,
        }
    }
}

/// Load the config from a RON file, falling back to defaults on any failure.
pub fn load_config(path: &str) -> NavConfig {
    match try_load_config(path) {
        Ok(config) => {
            info!("[CONFIG] Loaded navigation config from {}", path);
            config
        }
        Err(e) => {
            error!("[CONFIG] {}", e);
            error!("[CONFIG] Using default NavConfig");
            NavConfig::default()
        }
    }
}

/// Load the config from a RON file.
pub fn try_load_config(path: &str) -> Result<NavConfig, NavError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| NavError::Config(format!("failed to read {}: {}", path, e)))?;
    parse_config(&contents)
}

/// Parse config text in RON format.
pub fn parse_config(contents: &str) -> Result<NavConfig, NavError> {
    ron::from_str::<NavConfig>(contents)
        .map_err(|e| NavError::Config(format!("failed to parse config: {}", e)))
}

/// Runtime navigation settings with fixed-point values for deterministic simulation.
///
/// Converted from [`NavConfig`] once at load. All clients must build their
/// settings from identical config files before a match starts.
#[derive(Clone, Debug, PartialEq)]
pub struct NavSettings {
    pub cell_size: FixedNum,
    pub patch_size: FixedNum,
    pub search_limit: usize,
    pub max_pool_nodes: usize,
    pub radius_edge_bias: bool,
    pub tie_break_on_h: bool,
    pub reveal_mode: RevealMode,
    pub max_players: usize,
    pub log_high_iteration_fraction: FixedNum,
}

impl From<&NavConfig> for NavSettings {
    fn from(config: &NavConfig) -> Self {
        let mut cell_size = fixed_from_f32(config.cell_size);
        if cell_size <= FixedNum::ZERO {
            warn!("[CONFIG] cell_size {} is not positive, using 1.0", config.cell_size);
            cell_size = FixedNum::ONE;
        }
        let mut patch_size = fixed_from_f32(config.patch_size);
        if patch_size < cell_size {
            warn!(
                "[CONFIG] patch_size {} is smaller than cell_size {}, raising it",
                config.patch_size, config.cell_size
            );
            patch_size = cell_size;
        }
        let max_players = config.max_players.clamp(1, crate::game::types::PlayerId::MAX_PLAYERS);
        if max_players != config.max_players {
            warn!("[CONFIG] max_players {} clamped to {}", config.max_players, max_players);
        }

        Self {
            cell_size,
            patch_size,
            search_limit: config.search_limit,
            max_pool_nodes: config.max_pool_nodes.max(1),
            radius_edge_bias: config.radius_edge_bias,
            tie_break_on_h: config.tie_break_on_h,
            reveal_mode: config.reveal_mode,
            max_players,
            log_high_iteration_fraction: fixed_from_f32(config.log_high_iteration_fraction),
        }
    }
}

impl Default for NavSettings {
    fn default() -> Self {
        Self::from(&NavConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_config_keeps_defaults() {
        let config = parse_config("(cell_size: 2.0, search_limit: 100)").expect("valid RON");
        assert_eq!(config.cell_size, 2.0);
        assert_eq!(config.search_limit, 100);
        assert_eq!(config.patch_size, NavConfig::default().patch_size);
        assert!(config.radius_edge_bias);
    }

    #[test]
    fn test_parse_reveal_mode() {
        let config = parse_config("(reveal_mode: AllVisible)").expect("valid RON");
        assert_eq!(config.reveal_mode, RevealMode::AllVisible);
    }

    #[test]
    fn test_parse_garbage_is_config_error() {
        let err = parse_config("(cell_size: \"wide\")").unwrap_err();
        assert!(matches!(err, NavError::Config(_)));
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let config = load_config("does/not/exist.ron");
        assert_eq!(config.search_limit, NavConfig::default().search_limit);
    }

    #[test]
    fn test_settings_sanitize_sizes() {
        let config = NavConfig {
            cell_size: 8.0,
            patch_size: 2.0,
            max_players: 100,
            ..Default::default()
        };
        let settings = NavSettings::from(&config);
        assert_eq!(settings.cell_size, FixedNum::from_num(8));
        assert_eq!(settings.patch_size, settings.cell_size);
        assert_eq!(settings.max_players, 32);
    }
}
