use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

use crate::error::LandmarkError;

pub const HAND_LANDMARK_COUNT: usize = 21;

pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_TIP: usize = 8;

pub const FOREHEAD: usize = 10;
pub const UPPER_LIP: usize = 13;
pub const LOWER_LIP: usize = 14;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn to_pixels(self, size: FrameSize) -> Vec2 {
        Vec2::new(self.x * size.width as f32, self.y * size.height as f32)
    }

    fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (self - other).length()
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn width_f(&self) -> f32 {
        self.width as f32
    }

    pub fn height_f(&self) -> f32 {
        self.height as f32
    }
}

impl Default for FrameSize {
    fn default() -> Self {
        Self::new(640, 480)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HandLandmarks {
    points: [Point; HAND_LANDMARK_COUNT],
}

impl HandLandmarks {
    pub fn new(points: [Point; HAND_LANDMARK_COUNT]) -> Result<Self, LandmarkError> {
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(LandmarkError::NonFinite { index });
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Point; HAND_LANDMARK_COUNT] {
        &self.points
    }

    pub fn thumb_tip(&self) -> Point {
        self.points[THUMB_TIP]
    }

    pub fn index_tip(&self) -> Point {
        self.points[INDEX_TIP]
    }

    pub fn index_mcp(&self) -> Point {
        self.points[INDEX_MCP]
    }

    pub fn mean_x(&self) -> f32 {
        self.points.iter().map(|p| p.x).sum::<f32>() / HAND_LANDMARK_COUNT as f32
    }
}

impl TryFrom<&[Point]> for HandLandmarks {
    type Error = LandmarkError;

    fn try_from(points: &[Point]) -> Result<Self, Self::Error> {
        let points: [Point; HAND_LANDMARK_COUNT] =
            points.try_into().map_err(|_| LandmarkError::HandPointCount {
                expected: HAND_LANDMARK_COUNT,
                actual: points.len(),
            })?;
        Self::new(points)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FaceLandmarks {
    points: Vec<Point>,
}

impl FaceLandmarks {
    pub const MIN_POINTS: usize = LOWER_LIP + 1;

    pub fn new(points: Vec<Point>) -> Result<Self, LandmarkError> {
        if points.len() < Self::MIN_POINTS {
            return Err(LandmarkError::FacePointCount {
                required: Self::MIN_POINTS,
                actual: points.len(),
            });
        }
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(LandmarkError::NonFinite { index });
        }
        Ok(Self { points })
    }

    pub fn upper_lip(&self) -> Point {
        self.points[UPPER_LIP]
    }

    pub fn lower_lip(&self) -> Point {
        self.points[LOWER_LIP]
    }

    pub fn forehead(&self) -> Point {
        self.points[FOREHEAD]
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LandmarkFrame {
    pub hands: Vec<HandLandmarks>,
    pub face: Option<FaceLandmarks>,
}

impl LandmarkFrame {
    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    Food,
    Characters,
}

impl GameKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            GameKind::Food => "Food Eating Game",
            GameKind::Characters => "Move Your Friends",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            GameKind::Food => "🍔 ",
            GameKind::Characters => "🎨 ",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GamePhase {
    Waiting,
    Playing,
    Finished,
}

impl GamePhase {
    pub fn label(&self) -> &'static str {
        match self {
            GamePhase::Waiting => "waiting",
            GamePhase::Playing => "playing",
            GamePhase::Finished => "finished",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandGuide {
    NoHands,
    OneHand,
    TwoHands,
}

impl HandGuide {
    pub fn from_count(count: usize) -> Self {
        match count {
            0 => HandGuide::NoHands,
            1 => HandGuide::OneHand,
            _ => HandGuide::TwoHands,
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            HandGuide::NoHands => "Show your hands to the camera",
            HandGuide::OneHand => "Show both hands to the camera",
            HandGuide::TwoHands => "Thumbs together, index fingers meeting below",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    HeartAccepted { center: Vec2 },
    PhaseChanged { from: GamePhase, to: GamePhase },
    ScoreChanged { score: u32, delta: u32 },
    FoodEaten { id: u64, at: Vec2 },
    CharacterGrabbed { id: u64 },
    CharacterReleased { id: u64, at: Vec2 },
    CharacterScored { id: u64, at: Vec2 },
    AllCharactersMoved,
    SpritePoolReset { size: usize },
    NewRecord { score: u32, previous: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hand_rejects_wrong_point_count() {
        let points = vec![Point::new(0.5, 0.5); 20];
        let err = HandLandmarks::try_from(points.as_slice()).unwrap_err();
        assert_eq!(
            err,
            LandmarkError::HandPointCount {
                expected: 21,
                actual: 20
            }
        );
    }

    #[test]
    fn hand_rejects_nan() {
        let mut points = [Point::new(0.5, 0.5); HAND_LANDMARK_COUNT];
        points[7].y = f32::NAN;
        assert_eq!(
            HandLandmarks::new(points).unwrap_err(),
            LandmarkError::NonFinite { index: 7 }
        );
    }

    #[test]
    fn face_needs_lip_points() {
        let err = FaceLandmarks::new(vec![Point::default(); 14]).unwrap_err();
        assert!(matches!(err, LandmarkError::FacePointCount { .. }));
        assert!(FaceLandmarks::new(vec![Point::default(); 15]).is_ok());
    }

    #[test]
    fn point_projects_to_pixels() {
        let px = Point::new(0.25, 0.5).to_pixels(FrameSize::new(640, 480));
        assert_eq!(px, Vec2::new(160.0, 240.0));
    }

    #[test]
    fn guide_follows_hand_count() {
        assert_eq!(HandGuide::from_count(0), HandGuide::NoHands);
        assert_eq!(HandGuide::from_count(1), HandGuide::OneHand);
        assert_eq!(HandGuide::from_count(3), HandGuide::TwoHands);
    }
}
