use std::{collections::HashSet, sync::Arc, time::Duration};

use rand::{Rng, rngs::StdRng, seq::SliceRandom};

use super::{GameMode, TickContext};
use crate::{
    config::GameConfig,
    gesture::{FrameReadings, PinchReading},
    sprites::SpriteCatalog,
    types::{FrameSize, GameEvent, GameKind, Vec2},
};

#[derive(Clone, Debug)]
pub struct CharacterPool {
    available: Vec<usize>,
    used: Vec<usize>,
}

impl CharacterPool {
    pub fn new(size: usize) -> Self {
        Self {
            available: (0..size).rev().collect(),
            used: Vec::with_capacity(size),
        }
    }

    pub fn size(&self) -> usize {
        self.available.len() + self.used.len()
    }

    pub fn available(&self) -> &[usize] {
        &self.available
    }

    pub fn used(&self) -> &[usize] {
        &self.used
    }

    pub fn reset(&mut self, rng: &mut StdRng) {
        let size = self.size();
        self.refill(size, rng);
    }

    /// Draws the next sprite index. The flag is set when the pool had run dry
    /// and was reshuffled to serve this draw.
    pub fn draw(&mut self, rng: &mut StdRng) -> Option<(usize, bool)> {
        let mut reshuffled = false;
        if self.available.is_empty() {
            if self.used.is_empty() {
                return None;
            }
            self.reset(rng);
            reshuffled = true;
        }
        let sprite = self.available.pop()?;
        self.used.push(sprite);
        Some((sprite, reshuffled))
    }

    fn refill(&mut self, size: usize, rng: &mut StdRng) {
        self.used.clear();
        self.available.clear();
        self.available.extend(0..size);
        self.available.shuffle(rng);
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Character {
    pub id: u64,
    pub sprite: usize,
    pub position: Vec2,
    pub size: Vec2,
    pub dragging: bool,
    pub scored: bool,
}

impl Character {
    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }

    fn clamp_to(&mut self, frame: FrameSize, margin: f32) {
        let max_x = (frame.width_f() - self.size.x + margin).max(-margin);
        let max_y = (frame.height_f() - self.size.y + margin).max(-margin);
        self.position.x = self.position.x.clamp(-margin, max_x);
        self.position.y = self.position.y.clamp(-margin, max_y);
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Grip {
    pinching: bool,
    held: Option<u64>,
}

pub struct CharacterGame {
    config: Arc<GameConfig>,
    catalog: SpriteCatalog,
    pool: CharacterPool,
    characters: Vec<Character>,
    scored: HashSet<u64>,
    next_id: u64,
    last_spawn_at: Option<Duration>,
    grip: Grip,
    celebrated: bool,
}

impl CharacterGame {
    pub fn new(config: Arc<GameConfig>, catalog: SpriteCatalog) -> Self {
        let pool = CharacterPool::new(catalog.len());
        Self {
            config,
            catalog,
            pool,
            characters: Vec::new(),
            scored: HashSet::new(),
            next_id: 0,
            last_spawn_at: None,
            grip: Grip::default(),
            celebrated: false,
        }
    }

    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn catalog(&self) -> &SpriteCatalog {
        &self.catalog
    }

    pub fn pool(&self) -> &CharacterPool {
        &self.pool
    }

    pub fn held(&self) -> Option<u64> {
        self.grip.held
    }

    pub fn goal_x(&self, frame: FrameSize) -> f32 {
        frame.width_f() * self.config.characters.goal_fraction
    }

    pub fn spawn(&mut self, ctx: &mut TickContext<'_>) -> Option<u64> {
        let cfg = &self.config.characters;
        if self.characters.len() >= cfg.capacity {
            return None;
        }

        let (sprite, reshuffled) = self.pool.draw(ctx.rng)?;
        if reshuffled {
            log::info!("all {} characters used, reshuffling", self.pool.size());
            ctx.emit(GameEvent::SpritePoolReset {
                size: self.pool.size(),
            });
        }

        let size = Vec2::new(cfg.sprite_width(), cfg.sprite_height());
        let frame = ctx.frame;
        let max_x = (frame.width_f() * cfg.spawn_width_fraction - size.x).max(1.0);
        let max_y = (frame.height_f() - size.y - cfg.spawn_bottom_margin)
            .max(cfg.spawn_top + 20.0);
        let position = Vec2::new(
            ctx.rng.gen_range(0.0..=max_x),
            ctx.rng.gen_range(cfg.spawn_top..=max_y),
        );

        let id = self.next_id;
        self.next_id += 1;
        let name = self
            .catalog
            .get(sprite)
            .map(|s| s.name.as_str())
            .unwrap_or("?");
        log::debug!("character {id} ({name}) at ({:.0}, {:.0})", position.x, position.y);

        self.characters.push(Character {
            id,
            sprite,
            position,
            size,
            dragging: false,
            scored: false,
        });
        Some(id)
    }

    /// Pinch start grabs the nearest character within reach of the index
    /// knuckle; a held pinch drags it; opening the pinch or losing every hand
    /// drops it where it is.
    pub fn track_hand(&mut self, hand: Option<&PinchReading>, ctx: &mut TickContext<'_>) {
        let Some(hand) = hand else {
            if self.grip.pinching {
                log::debug!("hands lost, releasing");
            }
            self.release(ctx);
            return;
        };

        if !hand.pinching {
            if self.grip.pinching {
                self.release(ctx);
            }
            return;
        }

        if !self.grip.pinching {
            self.grip.pinching = true;
            self.grip.held = self.nearest_within(hand.anchor, self.config.pinch.grab_radius);
            if let Some(id) = self.grip.held {
                if let Some(character) = self.find_mut(id) {
                    character.dragging = true;
                }
                log::debug!("grabbed character {id}");
                ctx.emit(GameEvent::CharacterGrabbed { id });
            }
        }

        if let Some(id) = self.grip.held {
            let margin = self.config.pinch.drag_margin;
            let frame = ctx.frame;
            if let Some(character) = self.find_mut(id) {
                character.position = hand.anchor - character.size * 0.5;
                character.clamp_to(frame, margin);
            }
        }
    }

    fn release(&mut self, ctx: &mut TickContext<'_>) {
        let grip = std::mem::take(&mut self.grip);
        let Some(id) = grip.held else {
            return;
        };
        if let Some(character) = self.find_mut(id) {
            character.dragging = false;
            let at = character.position;
            log::debug!("released character {id} at ({:.0}, {:.0})", at.x, at.y);
            ctx.emit(GameEvent::CharacterReleased { id, at });
        }
    }

    fn nearest_within(&self, point: Vec2, radius: f32) -> Option<u64> {
        self.characters
            .iter()
            .map(|c| (c.id, c.center().distance(point)))
            .filter(|(_, d)| *d < radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    fn find_mut(&mut self, id: u64) -> Option<&mut Character> {
        self.characters.iter_mut().find(|c| c.id == id)
    }

    pub fn score_crossings(&mut self, ctx: &mut TickContext<'_>) {
        let cfg = &self.config.characters;
        let goal = ctx.frame.width_f() * cfg.goal_fraction;

        for character in &mut self.characters {
            if character.dragging || character.position.x < goal {
                continue;
            }
            if !self.scored.insert(character.id) {
                continue;
            }
            character.scored = true;
            ctx.award(cfg.points);
            log::info!("character {} reached the goal, score {}", character.id, ctx.score());
            ctx.emit(GameEvent::CharacterScored {
                id: character.id,
                at: character.center(),
            });

            if !self.celebrated && ctx.score() >= cfg.celebration_score {
                self.celebrated = true;
                log::info!("🎉 all characters moved");
                ctx.emit(GameEvent::AllCharactersMoved);
            }
        }

        let margin = cfg.boundary_margin;
        for character in self.characters.iter_mut().filter(|c| !c.dragging) {
            character.clamp_to(ctx.frame, margin);
        }
    }
}

impl GameMode for CharacterGame {
    fn kind(&self) -> GameKind {
        GameKind::Characters
    }

    fn round_length(&self) -> Duration {
        self.config.characters.duration()
    }

    fn reset(&mut self, ctx: &mut TickContext<'_>) {
        self.characters.clear();
        self.scored.clear();
        self.last_spawn_at = None;
        self.grip = Grip::default();
        self.celebrated = false;
        self.pool.reset(ctx.rng);
    }

    fn update(&mut self, readings: &FrameReadings, ctx: &mut TickContext<'_>) {
        self.track_hand(readings.primary_hand(), ctx);

        let interval = self.config.characters.spawn_interval();
        let due = self
            .last_spawn_at
            .is_none_or(|last| ctx.now.saturating_sub(last) >= interval);
        if due {
            self.spawn(ctx);
            self.last_spawn_at = Some(ctx.now);
        }

        self.score_crossings(ctx);
    }

    fn finish(&mut self) {
        self.grip = Grip::default();
        for character in &mut self.characters {
            character.dragging = false;
        }
    }

    fn entity_count(&self) -> usize {
        self.characters.len()
    }
}
