use std::{sync::Arc, time::Duration};

use rand::Rng;

use super::{GameMode, TickContext};
use crate::{
    config::GameConfig,
    gesture::FrameReadings,
    sprites::SpriteCatalog,
    types::{FrameSize, GameEvent, GameKind, Vec2},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnEdge {
    Top,
    Left,
    Right,
}

impl SpawnEdge {
    const ALL: [SpawnEdge; 3] = [SpawnEdge::Top, SpawnEdge::Left, SpawnEdge::Right];

    pub fn velocity(self, speed: f32) -> Vec2 {
        match self {
            SpawnEdge::Top => Vec2::new(0.0, speed),
            SpawnEdge::Left => Vec2::new(speed, speed * 0.5),
            SpawnEdge::Right => Vec2::new(-speed, speed * 0.5),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Food {
    pub id: u64,
    pub sprite: usize,
    pub position: Vec2,
    pub size: Vec2,
    pub speed: f32,
    pub edge: SpawnEdge,
    pub eaten: bool,
}

impl Food {
    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }

    pub fn fall(&mut self) {
        self.position = self.position + self.edge.velocity(self.speed);
    }

    pub fn is_off_screen(&self, frame: FrameSize, margin: f32) -> bool {
        self.position.y > frame.height_f()
            || self.position.x < -(self.size.x + margin)
            || self.position.x > frame.width_f() + margin
    }
}

pub struct FoodGame {
    config: Arc<GameConfig>,
    catalog: SpriteCatalog,
    foods: Vec<Food>,
    next_id: u64,
    last_spawn_at: Duration,
    mouth_open: bool,
}

impl FoodGame {
    pub fn new(config: Arc<GameConfig>, catalog: SpriteCatalog) -> Self {
        Self {
            config,
            catalog,
            foods: Vec::new(),
            next_id: 0,
            last_spawn_at: Duration::ZERO,
            mouth_open: false,
        }
    }

    pub fn foods(&self) -> &[Food] {
        &self.foods
    }

    pub fn catalog(&self) -> &SpriteCatalog {
        &self.catalog
    }

    pub fn mouth_open(&self) -> bool {
        self.mouth_open
    }

    pub fn spawn(&mut self, ctx: &mut TickContext<'_>) -> u64 {
        let cfg = &self.config.food;
        let frame = ctx.frame;

        let sprite = ctx.rng.gen_range(0..self.catalog.len().max(1));
        let size = match self.catalog.get(sprite) {
            Some(s) => Vec2::new(s.width() as f32, s.height() as f32) * cfg.sprite_scale,
            None => Vec2::new(16.0, 16.0) * cfg.sprite_scale,
        };
        let speed = ctx.rng.gen_range(cfg.min_speed..=cfg.max_speed.max(cfg.min_speed));
        let edge = SpawnEdge::ALL[ctx.rng.gen_range(0..SpawnEdge::ALL.len())];

        let inset = cfg.spawn_inset;
        let position = match edge {
            SpawnEdge::Top => {
                let max_x = (frame.width_f() - size.x - inset).max(inset);
                Vec2::new(ctx.rng.gen_range(inset..=max_x), -size.y)
            }
            SpawnEdge::Left | SpawnEdge::Right => {
                let max_y = (frame.height_f() * 0.5).max(inset);
                let y = ctx.rng.gen_range(inset..=max_y);
                let x = if edge == SpawnEdge::Left {
                    -size.x
                } else {
                    frame.width_f()
                };
                Vec2::new(x, y)
            }
        };

        let id = self.next_id;
        self.next_id += 1;
        log::debug!("food {id} spawned from {edge:?} at ({:.0}, {:.0})", position.x, position.y);
        self.foods.push(Food {
            id,
            sprite,
            position,
            size,
            speed,
            edge,
            eaten: false,
        });
        id
    }

    /// Pulls every snack within the attraction radius toward `mouth` with a
    /// quadratic falloff, then eats the ones that started the frame inside
    /// the eat radius.
    pub fn attract_and_eat(&mut self, mouth: Vec2, ctx: &mut TickContext<'_>) {
        let cfg = &self.config.food;
        let mut eaten = Vec::new();

        for food in self.foods.iter_mut().filter(|f| !f.eaten) {
            let center = food.center();
            let distance = center.distance(mouth);

            if distance > 0.0 && distance < cfg.attraction_radius {
                let falloff = (cfg.attraction_radius - distance) / cfg.attraction_radius;
                let step = (cfg.attraction_strength * falloff * falloff).min(distance);
                food.position = food.position + (mouth - center) * (step / distance);
            }

            if distance < cfg.eat_radius {
                food.eaten = true;
                eaten.push(food.id);
            }
        }

        self.foods.retain(|f| !f.eaten);
        for id in eaten {
            ctx.award(cfg.points);
            ctx.emit(GameEvent::FoodEaten { id, at: mouth });
        }
    }
}

impl GameMode for FoodGame {
    fn kind(&self) -> GameKind {
        GameKind::Food
    }

    fn round_length(&self) -> Duration {
        self.config.food.duration()
    }

    fn reset(&mut self, ctx: &mut TickContext<'_>) {
        self.foods.clear();
        self.last_spawn_at = ctx.now;
        self.mouth_open = false;
    }

    fn update(&mut self, readings: &FrameReadings, ctx: &mut TickContext<'_>) {
        if ctx.now.saturating_sub(self.last_spawn_at) >= self.config.food.spawn_interval() {
            self.spawn(ctx);
            self.last_spawn_at = ctx.now;
        }

        let margin = self.config.food.despawn_margin;
        for food in &mut self.foods {
            food.fall();
        }
        self.foods.retain(|f| !f.is_off_screen(ctx.frame, margin));

        let was_open = self.mouth_open;
        self.mouth_open = readings.mouth.is_some_and(|m| m.open);
        if self.mouth_open != was_open {
            log::debug!("mouth {}", if self.mouth_open { "opened" } else { "closed" });
        }

        if let Some(mouth) = readings.mouth.filter(|m| m.open) {
            self.attract_and_eat(mouth.center, ctx);
        }
    }

    fn finish(&mut self) {
        self.mouth_open = false;
    }

    fn entity_count(&self) -> usize {
        self.foods.len()
    }
}
