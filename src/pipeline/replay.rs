use std::{
    fs::File,
    io::{self, BufRead, BufReader, Write},
    path::Path,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::source::LandmarkSource;
use crate::types::{FaceLandmarks, HandLandmarks, LandmarkFrame, Point};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordedFrame {
    #[serde(default)]
    pub hands: Vec<Vec<[f32; 2]>>,
    #[serde(default)]
    pub face: Option<Vec<[f32; 2]>>,
}

impl RecordedFrame {
    pub fn into_frame(self) -> LandmarkFrame {
        let hands = self
            .hands
            .iter()
            .filter_map(|raw| {
                let points = to_points(raw);
                match HandLandmarks::try_from(points.as_slice()) {
                    Ok(hand) => Some(hand),
                    Err(err) => {
                        log::warn!("dropping hand: {err}");
                        None
                    }
                }
            })
            .collect();

        let face = self
            .face
            .and_then(|raw| match FaceLandmarks::new(to_points(&raw)) {
                Ok(face) => Some(face),
                Err(err) => {
                    log::warn!("dropping face: {err}");
                    None
                }
            });

        LandmarkFrame { hands, face }
    }
}

impl From<&LandmarkFrame> for RecordedFrame {
    fn from(frame: &LandmarkFrame) -> Self {
        Self {
            hands: frame
                .hands
                .iter()
                .map(|hand| hand.points().iter().map(|p| [p.x, p.y]).collect())
                .collect(),
            face: frame
                .face
                .as_ref()
                .map(|face| face.points().iter().map(|p| [p.x, p.y]).collect()),
        }
    }
}

fn to_points(raw: &[[f32; 2]]) -> Vec<Point> {
    raw.iter().map(|[x, y]| Point::new(*x, *y)).collect()
}

pub struct ReplaySource<R> {
    lines: io::Lines<R>,
    line_no: usize,
    current: LandmarkFrame,
}

impl ReplaySource<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open replay {}", path.display()))?;
        log::info!("replaying landmarks from {}", path.display());
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> ReplaySource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            current: LandmarkFrame::empty(),
        }
    }
}

impl<R: BufRead + Send> LandmarkSource for ReplaySource<R> {
    fn advance(&mut self) -> bool {
        loop {
            let line = match self.lines.next() {
                None => return false,
                Some(Ok(line)) => line,
                Some(Err(err)) => {
                    log::warn!("replay read failed after line {}: {err}", self.line_no);
                    return false;
                }
            };
            self.line_no += 1;
            if line.trim().is_empty() {
                continue;
            }

            self.current = match serde_json::from_str::<RecordedFrame>(&line) {
                Ok(recorded) => recorded.into_frame(),
                Err(err) => {
                    log::warn!("replay line {} is malformed: {err}", self.line_no);
                    LandmarkFrame::empty()
                }
            };
            return true;
        }
    }

    fn next_hands(&mut self) -> Vec<HandLandmarks> {
        std::mem::take(&mut self.current.hands)
    }

    fn next_face(&mut self) -> Option<FaceLandmarks> {
        self.current.face.take()
    }
}

pub struct Recorder<W: Write> {
    writer: W,
}

impl<W: Write> Recorder<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn record(&mut self, frame: &LandmarkFrame) -> Result<()> {
        serde_json::to_writer(&mut self.writer, &RecordedFrame::from(frame))
            .context("failed to encode landmark frame")?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::gesture::fixtures;

    #[test]
    fn recording_plays_back() {
        let (a, b) = fixtures::heart_hands();
        let face = fixtures::face(Point::new(0.5, 0.6), Point::new(0.5, 0.65));
        let frames = vec![
            LandmarkFrame {
                hands: vec![a, b],
                face: None,
            },
            LandmarkFrame::empty(),
            LandmarkFrame {
                hands: Vec::new(),
                face: Some(face),
            },
        ];

        let mut recorder = Recorder::new(Vec::new());
        for frame in &frames {
            recorder.record(frame).unwrap();
        }
        let bytes = recorder.into_inner();

        let mut source = ReplaySource::new(Cursor::new(bytes));
        let replayed: Vec<LandmarkFrame> = std::iter::from_fn(|| source.next_frame()).collect();
        assert_eq!(replayed, frames);
    }

    #[test]
    fn malformed_lines_become_empty_frames() {
        let input = "{\"hands\": [[[0.1, 0.2]]]}\nnot json\n\n{}\n";
        let mut source = ReplaySource::new(Cursor::new(input));

        // a hand with one point is rejected, the frame survives
        let first = source.next_frame().unwrap();
        assert!(first.hands.is_empty());
        assert_eq!(source.next_frame().unwrap(), LandmarkFrame::empty());
        assert_eq!(source.next_frame().unwrap(), LandmarkFrame::empty());
        assert!(source.next_frame().is_none());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ReplaySource::open(&dir.path().join("nope.jsonl")).is_err());
    }
}
