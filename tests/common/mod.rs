#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use photobooth_games::{
    CharacterGame, FoodGame, GameConfig, GameSession, HighScoreStore, ManualClock,
    sprites::{PlaceholderStyle, SpriteCatalog},
    types::{
        FaceLandmarks, HAND_LANDMARK_COUNT, HandLandmarks, INDEX_MCP, INDEX_TIP, LOWER_LIP,
        LandmarkFrame, Point, THUMB_TIP, UPPER_LIP,
    },
};

pub const FRAME: Duration = Duration::from_millis(33);

pub fn config() -> Arc<GameConfig> {
    Arc::new(GameConfig {
        seed: Some(42),
        ..GameConfig::default()
    })
}

pub fn hand(palm: Point, thumb: Point, index: Point) -> HandLandmarks {
    let mut points = [palm; HAND_LANDMARK_COUNT];
    points[THUMB_TIP] = thumb;
    points[INDEX_TIP] = index;
    HandLandmarks::new(points).unwrap()
}

/// One hand with the index knuckle at `knuckle` and thumb/index tips `gap`
/// apart (normalized units).
pub fn pinch_hand(knuckle: Point, gap: f32) -> HandLandmarks {
    let mut points = [knuckle; HAND_LANDMARK_COUNT];
    points[INDEX_MCP] = knuckle;
    points[THUMB_TIP] = Point::new(knuckle.x, knuckle.y - 0.05);
    points[INDEX_TIP] = Point::new(knuckle.x + gap, knuckle.y - 0.05);
    HandLandmarks::new(points).unwrap()
}

pub fn heart_frame() -> LandmarkFrame {
    let left = hand(
        Point::new(0.40, 0.55),
        Point::new(0.47, 0.40),
        Point::new(0.49, 0.55),
    );
    let right = hand(
        Point::new(0.60, 0.55),
        Point::new(0.53, 0.40),
        Point::new(0.51, 0.55),
    );
    LandmarkFrame {
        hands: vec![left, right],
        face: None,
    }
}

pub fn pinch_frame(knuckle: Point, gap: f32) -> LandmarkFrame {
    LandmarkFrame {
        hands: vec![pinch_hand(knuckle, gap)],
        face: None,
    }
}

/// A face whose inner lips are `gap_px` apart on a 480 px tall frame.
pub fn face_frame(mouth: Point, gap_px: f32) -> LandmarkFrame {
    let half = gap_px / 480.0 / 2.0;
    let mut points = vec![Point::new(mouth.x, mouth.y - 0.25); 20];
    points[UPPER_LIP] = Point::new(mouth.x, mouth.y - half);
    points[LOWER_LIP] = Point::new(mouth.x, mouth.y + half);
    LandmarkFrame {
        hands: Vec::new(),
        face: Some(FaceLandmarks::new(points).unwrap()),
    }
}

pub fn food_session(
    config: Arc<GameConfig>,
    store: impl HighScoreStore + 'static,
) -> (GameSession<FoodGame, ManualClock>, ManualClock) {
    let clock = ManualClock::new();
    let mode = FoodGame::new(
        config.clone(),
        SpriteCatalog::placeholders(PlaceholderStyle::Food, 7),
    );
    let session = GameSession::new(config, mode, clock.clone(), Box::new(store));
    (session, clock)
}

pub fn character_session(
    config: Arc<GameConfig>,
    store: impl HighScoreStore + 'static,
) -> (GameSession<CharacterGame, ManualClock>, ManualClock) {
    let clock = ManualClock::new();
    let mode = CharacterGame::new(
        config.clone(),
        SpriteCatalog::placeholders(PlaceholderStyle::Character, 10),
    );
    let session = GameSession::new(config, mode, clock.clone(), Box::new(store));
    (session, clock)
}
