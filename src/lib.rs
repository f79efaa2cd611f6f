//! Gesture-driven photobooth games.
//!
//! A landmark source feeds hand and face landmarks into [`gesture`]
//! classifiers; a [`game::GameSession`] turns the readings into spawning,
//! physics, scoring and round lifecycle, and reports what happened as
//! [`types::GameEvent`]s for whatever draws the screen.

pub mod args;
pub mod clock;
pub mod config;
pub mod error;
pub mod game;
pub mod gesture;
pub mod pipeline;
pub mod score;
pub mod sprites;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::GameConfig;
pub use game::{CharacterGame, FoodGame, GameMode, GameSession};
pub use gesture::{FrameReadings, GestureClassifier};
pub use score::{HighScoreStore, JsonHighScoreStore, MemoryHighScoreStore};
pub use types::{GameEvent, GameKind, GamePhase, LandmarkFrame};
