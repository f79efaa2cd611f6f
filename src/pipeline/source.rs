use std::{collections::VecDeque, mem};

use crate::types::{FaceLandmarks, HandLandmarks, LandmarkFrame};

pub const MAX_HANDS: usize = 2;

pub trait LandmarkSource: Send {
    fn advance(&mut self) -> bool;

    fn next_hands(&mut self) -> Vec<HandLandmarks>;

    fn next_face(&mut self) -> Option<FaceLandmarks>;

    fn next_frame(&mut self) -> Option<LandmarkFrame> {
        if !self.advance() {
            return None;
        }
        let mut hands = self.next_hands();
        hands.truncate(MAX_HANDS);
        Some(LandmarkFrame {
            hands,
            face: self.next_face(),
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct ScriptedSource {
    frames: VecDeque<LandmarkFrame>,
    current: LandmarkFrame,
}

impl ScriptedSource {
    pub fn new(frames: impl IntoIterator<Item = LandmarkFrame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            current: LandmarkFrame::empty(),
        }
    }
}

impl LandmarkSource for ScriptedSource {
    fn advance(&mut self) -> bool {
        match self.frames.pop_front() {
            Some(frame) => {
                self.current = frame;
                true
            }
            None => false,
        }
    }

    fn next_hands(&mut self) -> Vec<HandLandmarks> {
        mem::take(&mut self.current.hands)
    }

    fn next_face(&mut self) -> Option<FaceLandmarks> {
        self.current.face.take()
    }
}
