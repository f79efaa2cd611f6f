use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, types::FrameSize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub frame: FrameSize,
    pub target_fps: u32,
    pub seed: Option<u64>,
    pub high_score_path: PathBuf,
    pub heart: HeartConfig,
    pub pinch: PinchConfig,
    pub mouth: MouthConfig,
    pub food: FoodConfig,
    pub characters: CharacterConfig,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeartVariant {
    Loose,
    Strict,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartConfig {
    pub food_variant: HeartVariant,
    pub characters_variant: HeartVariant,
    pub cooldown_secs: f32,
    /// The heart has to disappear for a frame before it can trigger again.
    pub require_release: bool,
    pub loose: LooseHeartThresholds,
    pub strict: StrictHeartThresholds,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LooseHeartThresholds {
    pub thumb_gap_min: f32,
    pub thumb_gap_max: f32,
    pub index_gap_max: f32,
    pub structure_slack: f32,
    pub thumb_level_max: f32,
    pub required: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrictHeartThresholds {
    pub thumb_dx_max: f32,
    pub thumb_dy_max: f32,
    pub index_dx_max: f32,
    pub index_dy_max: f32,
    pub order_slack: f32,
    pub side_slack: f32,
    pub required: usize,
    pub approximate: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinchConfig {
    pub threshold: f32,
    pub grab_radius: f32,
    pub drag_margin: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MouthConfig {
    /// Lip separation in pixels. Not normalized by face size.
    pub open_threshold: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodConfig {
    pub duration_secs: f32,
    pub spawn_interval_secs: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    pub sprite_scale: f32,
    pub attraction_radius: f32,
    pub eat_radius: f32,
    pub attraction_strength: f32,
    pub points: u32,
    pub spawn_inset: f32,
    pub despawn_margin: f32,
    pub sprite_dir: PathBuf,
    pub sprite_prefix: String,
    pub sprite_count: usize,
    pub high_score_key: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterConfig {
    pub duration_secs: f32,
    pub spawn_interval_secs: f32,
    pub capacity: usize,
    pub base_width: f32,
    pub base_height: f32,
    pub scale: f32,
    pub spawn_width_fraction: f32,
    pub spawn_top: f32,
    pub spawn_bottom_margin: f32,
    pub goal_fraction: f32,
    pub points: u32,
    pub celebration_score: u32,
    pub boundary_margin: f32,
    pub sprite_dir: PathBuf,
    pub sprite_prefix: String,
    pub sprite_count: usize,
    pub placeholder_count: usize,
    pub high_score_key: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            frame: FrameSize::default(),
            target_fps: 30,
            seed: None,
            high_score_path: PathBuf::from("high_score.json"),
            heart: HeartConfig::default(),
            pinch: PinchConfig::default(),
            mouth: MouthConfig::default(),
            food: FoodConfig::default(),
            characters: CharacterConfig::default(),
        }
    }
}

impl Default for HeartConfig {
    fn default() -> Self {
        Self {
            food_variant: HeartVariant::Loose,
            characters_variant: HeartVariant::Strict,
            cooldown_secs: 2.0,
            require_release: true,
            loose: LooseHeartThresholds::default(),
            strict: StrictHeartThresholds::default(),
        }
    }
}

impl Default for LooseHeartThresholds {
    fn default() -> Self {
        Self {
            thumb_gap_min: 0.05,
            thumb_gap_max: 0.30,
            index_gap_max: 0.10,
            structure_slack: 0.08,
            thumb_level_max: 0.10,
            required: 3,
        }
    }
}

impl Default for StrictHeartThresholds {
    fn default() -> Self {
        Self {
            thumb_dx_max: 0.15,
            thumb_dy_max: 0.08,
            index_dx_max: 0.15,
            index_dy_max: 0.08,
            order_slack: 0.02,
            side_slack: 0.05,
            required: 5,
            approximate: 3,
        }
    }
}

impl Default for PinchConfig {
    fn default() -> Self {
        Self {
            threshold: 0.05,
            grab_radius: 100.0,
            drag_margin: 10.0,
        }
    }
}

impl Default for MouthConfig {
    fn default() -> Self {
        Self {
            open_threshold: 15.0,
        }
    }
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            duration_secs: 60.0,
            spawn_interval_secs: 0.8,
            min_speed: 3.6,
            max_speed: 9.6,
            sprite_scale: 5.0,
            attraction_radius: 300.0,
            eat_radius: 50.0,
            attraction_strength: 300.0,
            points: 10,
            spawn_inset: 50.0,
            despawn_margin: 50.0,
            sprite_dir: PathBuf::from("food"),
            sprite_prefix: "snack".to_string(),
            sprite_count: 7,
            high_score_key: "food_eating_high_score".to_string(),
        }
    }
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            duration_secs: 30.0,
            spawn_interval_secs: 1.5,
            capacity: 8,
            base_width: 18.0,
            base_height: 24.0,
            scale: 3.0,
            spawn_width_fraction: 0.3,
            spawn_top: 180.0,
            spawn_bottom_margin: 20.0,
            goal_fraction: 0.7,
            points: 1,
            celebration_score: 10,
            boundary_margin: 10.0,
            sprite_dir: PathBuf::from("cha"),
            sprite_prefix: "cha".to_string(),
            sprite_count: 10,
            placeholder_count: 3,
            high_score_key: "high_score".to_string(),
        }
    }
}

/// Whole milliseconds, so a 0.8 s interval is exactly 800 ms.
fn millis(secs: f32) -> Duration {
    Duration::from_millis((secs.max(0.0) * 1000.0).round() as u64)
}

impl HeartConfig {
    pub fn cooldown(&self) -> Duration {
        millis(self.cooldown_secs)
    }
}

impl FoodConfig {
    pub fn duration(&self) -> Duration {
        millis(self.duration_secs)
    }

    pub fn spawn_interval(&self) -> Duration {
        millis(self.spawn_interval_secs)
    }
}

impl CharacterConfig {
    pub fn duration(&self) -> Duration {
        millis(self.duration_secs)
    }

    pub fn spawn_interval(&self) -> Duration {
        millis(self.spawn_interval_secs)
    }

    pub fn sprite_width(&self) -> f32 {
        self.base_width * self.scale
    }

    pub fn sprite_height(&self) -> f32 {
        self.base_height * self.scale
    }
}

impl GameConfig {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: GameConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_or_default(path: &Path) -> Self {
        match Self::from_path(path) {
            Ok(config) => {
                log::info!("loaded configuration from {}", path.display());
                config
            }
            Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                log::info!("no configuration at {}, using defaults", path.display());
                Self::default()
            }
            Err(err) => {
                log::warn!("{err}; using defaults");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame.width == 0 || self.frame.height == 0 {
            return Err(ConfigError::Invalid("frame size must be non-zero".into()));
        }
        if self.target_fps == 0 {
            return Err(ConfigError::Invalid("target_fps must be positive".into()));
        }
        if !self.heart.cooldown_secs.is_finite() || self.heart.cooldown_secs < 0.0 {
            return Err(ConfigError::Invalid("heart cooldown must be >= 0".into()));
        }
        for (name, value) in [
            ("food.min_speed", self.food.min_speed),
            ("food.max_speed", self.food.max_speed),
            ("food.sprite_scale", self.food.sprite_scale),
            ("food.spawn_inset", self.food.spawn_inset),
            ("characters.scale", self.characters.scale),
            ("characters.spawn_top", self.characters.spawn_top),
            ("characters.spawn_width_fraction", self.characters.spawn_width_fraction),
            ("food.attraction_radius", self.food.attraction_radius),
            ("food.eat_radius", self.food.eat_radius),
            ("food.attraction_strength", self.food.attraction_strength),
            ("food.despawn_margin", self.food.despawn_margin),
            ("characters.base_width", self.characters.base_width),
            ("characters.base_height", self.characters.base_height),
            ("characters.spawn_bottom_margin", self.characters.spawn_bottom_margin),
            ("characters.boundary_margin", self.characters.boundary_margin),
            ("pinch.threshold", self.pinch.threshold),
            ("pinch.grab_radius", self.pinch.grab_radius),
            ("pinch.drag_margin", self.pinch.drag_margin),
            ("mouth.open_threshold", self.mouth.open_threshold),
            ("heart.loose.thumb_gap_min", self.heart.loose.thumb_gap_min),
            ("heart.loose.thumb_gap_max", self.heart.loose.thumb_gap_max),
            ("heart.loose.index_gap_max", self.heart.loose.index_gap_max),
            ("heart.loose.structure_slack", self.heart.loose.structure_slack),
            ("heart.loose.thumb_level_max", self.heart.loose.thumb_level_max),
            ("heart.strict.thumb_dx_max", self.heart.strict.thumb_dx_max),
            ("heart.strict.thumb_dy_max", self.heart.strict.thumb_dy_max),
            ("heart.strict.index_dx_max", self.heart.strict.index_dx_max),
            ("heart.strict.index_dy_max", self.heart.strict.index_dy_max),
            ("heart.strict.order_slack", self.heart.strict.order_slack),
            ("heart.strict.side_slack", self.heart.strict.side_slack),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!("{name} must be finite and >= 0")));
            }
        }
        if self.food.min_speed > self.food.max_speed {
            return Err(ConfigError::Invalid(
                "food min_speed exceeds max_speed".into(),
            ));
        }
        if self.food.eat_radius > self.food.attraction_radius {
            return Err(ConfigError::Invalid(
                "food eat_radius exceeds attraction_radius".into(),
            ));
        }
        for (name, secs) in [
            ("food.duration_secs", self.food.duration_secs),
            ("food.spawn_interval_secs", self.food.spawn_interval_secs),
            ("characters.duration_secs", self.characters.duration_secs),
            (
                "characters.spawn_interval_secs",
                self.characters.spawn_interval_secs,
            ),
        ] {
            if !secs.is_finite() || secs <= 0.0 {
                return Err(ConfigError::Invalid(format!("{name} must be positive")));
            }
        }
        if !(0.0..=1.0).contains(&self.characters.goal_fraction) {
            return Err(ConfigError::Invalid(
                "characters.goal_fraction must lie in [0, 1]".into(),
            ));
        }
        if self.characters.placeholder_count == 0 {
            return Err(ConfigError::Invalid(
                "characters.placeholder_count must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_validate() {
        GameConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"mouth": {{"open_threshold": 22.5}}, "seed": 7}}"#).unwrap();

        let config = GameConfig::from_path(file.path()).unwrap();
        assert_eq!(config.mouth.open_threshold, 22.5);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.pinch, PinchConfig::default());
        assert_eq!(config.characters.capacity, 8);
    }

    #[test]
    fn broken_file_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        assert!(matches!(
            GameConfig::from_path(file.path()),
            Err(ConfigError::Parse { .. })
        ));
        assert_eq!(GameConfig::load_or_default(file.path()), GameConfig::default());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = GameConfig::load_or_default(&dir.path().join("absent.json"));
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn rejects_inverted_radii() {
        let mut config = GameConfig::default();
        config.food.eat_radius = 400.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_non_finite_or_negative_tuning() {
        let mut config = GameConfig::default();
        config.pinch.drag_margin = -10.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = GameConfig::default();
        config.heart.strict.side_slack = f32::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = GameConfig::default();
        config.mouth.open_threshold = -1.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        // too large for f32, parses as infinity
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"food": {{"attraction_strength": 1e39}}}}"#).unwrap();
        assert!(matches!(
            GameConfig::from_path(file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }
}
