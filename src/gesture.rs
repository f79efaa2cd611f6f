use std::{cmp::Ordering, sync::Arc};

use crate::{
    config::{
        GameConfig, HeartVariant, LooseHeartThresholds, MouthConfig, PinchConfig,
        StrictHeartThresholds,
    },
    types::{FaceLandmarks, FrameSize, GameKind, HandGuide, HandLandmarks, LandmarkFrame, Vec2},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeartVerdict {
    Detected,
    Approximate,
    Absent,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeartReading {
    pub satisfied: usize,
    pub total: usize,
    pub verdict: HeartVerdict,
    pub center: Vec2,
}

impl HeartReading {
    pub fn is_heart(&self) -> bool {
        self.verdict == HeartVerdict::Detected
    }

    pub fn describe(&self) -> String {
        match self.verdict {
            HeartVerdict::Detected => format!("heart detected ({}/{})", self.satisfied, self.total),
            HeartVerdict::Approximate => format!("almost a heart ({}/{})", self.satisfied, self.total),
            HeartVerdict::Absent => format!("heart {}/{}", self.satisfied, self.total),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinchReading {
    pub distance: f32,
    pub pinching: bool,
    pub anchor: Vec2,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MouthReading {
    pub distance: f32,
    pub open: bool,
    pub center: Vec2,
    pub forehead: Vec2,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FrameReadings {
    pub hands: Vec<PinchReading>,
    pub heart: Option<HeartReading>,
    pub mouth: Option<MouthReading>,
    pub guide: HandGuide,
}

impl FrameReadings {
    pub fn empty() -> Self {
        Self {
            hands: Vec::new(),
            heart: None,
            mouth: None,
            guide: HandGuide::NoHands,
        }
    }

    pub fn heart_detected(&self) -> bool {
        self.heart.is_some_and(|h| h.is_heart())
    }

    /// The first pinching hand, or the first hand when nobody pinches.
    pub fn primary_hand(&self) -> Option<&PinchReading> {
        self.hands
            .iter()
            .find(|h| h.pinching)
            .or_else(|| self.hands.first())
    }
}

pub struct GestureClassifier {
    config: Arc<GameConfig>,
    heart_variant: HeartVariant,
}

impl GestureClassifier {
    pub fn new(config: Arc<GameConfig>, game: GameKind) -> Self {
        let heart_variant = match game {
            GameKind::Food => config.heart.food_variant,
            GameKind::Characters => config.heart.characters_variant,
        };
        Self {
            config,
            heart_variant,
        }
    }

    pub fn heart_variant(&self) -> HeartVariant {
        self.heart_variant
    }

    pub fn classify(&self, frame: &LandmarkFrame) -> FrameReadings {
        let size = self.config.frame;

        let hands = frame
            .hands
            .iter()
            .map(|hand| classify_pinch(hand, &self.config.pinch, size))
            .collect();

        let heart = match frame.hands.as_slice() {
            [a, b, ..] => {
                let reading = classify_heart(a, b, self.heart_variant, &self.config, size);
                log::debug!("{}", reading.describe());
                Some(reading)
            }
            _ => None,
        };

        let mouth = frame
            .face
            .as_ref()
            .map(|face| classify_mouth(face, &self.config.mouth, size));

        FrameReadings {
            hands,
            heart,
            mouth,
            guide: HandGuide::from_count(frame.hands.len()),
        }
    }
}

/// Orders two hands by where they appear on screen: the one with the lower
/// mean x is the left hand. Ties fall back to comparing the raw points so the
/// result does not depend on argument order.
pub fn assign_hands<'a>(
    a: &'a HandLandmarks,
    b: &'a HandLandmarks,
) -> (&'a HandLandmarks, &'a HandLandmarks) {
    let order = a
        .mean_x()
        .partial_cmp(&b.mean_x())
        .unwrap_or(Ordering::Equal)
        .then_with(|| compare_points(a, b));
    if order == Ordering::Greater {
        (b, a)
    } else {
        (a, b)
    }
}

fn compare_points(a: &HandLandmarks, b: &HandLandmarks) -> Ordering {
    a.points()
        .iter()
        .zip(b.points().iter())
        .map(|(p, q)| {
            p.x.partial_cmp(&q.x)
                .unwrap_or(Ordering::Equal)
                .then(p.y.partial_cmp(&q.y).unwrap_or(Ordering::Equal))
        })
        .find(|o| *o != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

pub fn loose_heart_predicates(
    left: &HandLandmarks,
    right: &HandLandmarks,
    t: &LooseHeartThresholds,
) -> [bool; 5] {
    let (lt, li) = (left.thumb_tip(), left.index_tip());
    let (rt, ri) = (right.thumb_tip(), right.index_tip());
    let thumb_gap = lt.distance(rt);
    let index_gap = li.distance(ri);

    [
        thumb_gap > t.thumb_gap_min && thumb_gap < t.thumb_gap_max,
        index_gap < t.index_gap_max,
        lt.y < li.y + t.structure_slack,
        rt.y < ri.y + t.structure_slack,
        (lt.y - rt.y).abs() < t.thumb_level_max,
    ]
}

pub fn strict_heart_predicates(
    left: &HandLandmarks,
    right: &HandLandmarks,
    t: &StrictHeartThresholds,
) -> [bool; 8] {
    let (lt, li) = (left.thumb_tip(), left.index_tip());
    let (rt, ri) = (right.thumb_tip(), right.index_tip());

    [
        // thumbs meet at the top of the heart
        (lt.x - rt.x).abs() < t.thumb_dx_max,
        (lt.y - rt.y).abs() < t.thumb_dy_max,
        // index tips meet at the bottom
        (li.x - ri.x).abs() < t.index_dx_max,
        (li.y - ri.y).abs() < t.index_dy_max,
        li.y > lt.y - t.order_slack,
        ri.y > rt.y - t.order_slack,
        lt.x <= rt.x + t.side_slack,
        li.x <= ri.x + t.side_slack,
    ]
}

pub fn classify_heart(
    a: &HandLandmarks,
    b: &HandLandmarks,
    variant: HeartVariant,
    config: &GameConfig,
    size: FrameSize,
) -> HeartReading {
    let (left, right) = assign_hands(a, b);

    let (satisfied, total, required, approximate) = match variant {
        HeartVariant::Loose => {
            let t = &config.heart.loose;
            let checks = loose_heart_predicates(left, right, t);
            (count(&checks), checks.len(), t.required, None)
        }
        HeartVariant::Strict => {
            let t = &config.heart.strict;
            let checks = strict_heart_predicates(left, right, t);
            (count(&checks), checks.len(), t.required, Some(t.approximate))
        }
    };

    let verdict = if satisfied >= required {
        HeartVerdict::Detected
    } else if approximate.is_some_and(|min| satisfied >= min) {
        HeartVerdict::Approximate
    } else {
        HeartVerdict::Absent
    };

    let lt = left.thumb_tip().to_pixels(size);
    let rt = right.thumb_tip().to_pixels(size);

    HeartReading {
        satisfied,
        total,
        verdict,
        center: (lt + rt) * 0.5,
    }
}

fn count(checks: &[bool]) -> usize {
    checks.iter().filter(|c| **c).count()
}

pub fn pinch_distance(hand: &HandLandmarks) -> f32 {
    hand.thumb_tip().distance(hand.index_tip())
}

pub fn classify_pinch(hand: &HandLandmarks, config: &PinchConfig, size: FrameSize) -> PinchReading {
    let distance = pinch_distance(hand);
    PinchReading {
        distance,
        pinching: distance < config.threshold,
        anchor: hand.index_mcp().to_pixels(size),
    }
}

pub fn mouth_distance(face: &FaceLandmarks, size: FrameSize) -> f32 {
    (face.upper_lip().y - face.lower_lip().y).abs() * size.height_f()
}

pub fn mouth_center(face: &FaceLandmarks, size: FrameSize) -> Vec2 {
    let upper = face.upper_lip();
    let lower = face.lower_lip();
    Vec2::new(
        upper.x * size.width_f(),
        (upper.y + lower.y) / 2.0 * size.height_f(),
    )
}

pub fn classify_mouth(face: &FaceLandmarks, config: &MouthConfig, size: FrameSize) -> MouthReading {
    let distance = mouth_distance(face, size);
    MouthReading {
        distance,
        open: distance > config.open_threshold,
        center: mouth_center(face, size),
        forehead: face.forehead().to_pixels(size),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::types::{
        FaceLandmarks, HAND_LANDMARK_COUNT, HandLandmarks, INDEX_MCP, INDEX_TIP, LOWER_LIP, Point,
        THUMB_TIP, UPPER_LIP,
    };

    pub fn hand(palm: Point, thumb: Point, index: Point) -> HandLandmarks {
        let mut points = [palm; HAND_LANDMARK_COUNT];
        points[THUMB_TIP] = thumb;
        points[INDEX_TIP] = index;
        HandLandmarks::new(points).unwrap()
    }

    pub fn pinch_hand(knuckle: Point, gap: f32) -> HandLandmarks {
        let mut points = [knuckle; HAND_LANDMARK_COUNT];
        points[INDEX_MCP] = knuckle;
        points[THUMB_TIP] = Point::new(knuckle.x, knuckle.y - 0.05);
        points[INDEX_TIP] = Point::new(knuckle.x + gap, knuckle.y - 0.05);
        HandLandmarks::new(points).unwrap()
    }

    pub fn face(upper_lip: Point, lower_lip: Point) -> FaceLandmarks {
        let mut points = vec![Point::new(0.5, 0.3); 20];
        points[UPPER_LIP] = upper_lip;
        points[LOWER_LIP] = lower_lip;
        FaceLandmarks::new(points).unwrap()
    }

    pub fn heart_hands() -> (HandLandmarks, HandLandmarks) {
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
        (left, right)
    }

    pub fn apart_hands() -> (HandLandmarks, HandLandmarks) {
        let left = hand(
            Point::new(0.10, 0.80),
            Point::new(0.12, 0.90),
            Point::new(0.15, 0.60),
        );
        let right = hand(
            Point::new(0.90, 0.20),
            Point::new(0.88, 0.10),
            Point::new(0.85, 0.05),
        );
        (left, right)
    }
}
