use std::{ops::Range, path::Path};

use image::{Rgba, RgbaImage};

use crate::error::SpriteError;

const CHARACTER_PLACEHOLDER_SIZE: (u32, u32) = (18, 24);
const FOOD_PLACEHOLDER_SIZE: u32 = 16;

#[derive(Clone, Debug)]
pub struct Sprite {
    pub id: usize,
    pub name: String,
    pub image: RgbaImage,
    pub placeholder: bool,
}

impl Sprite {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaceholderStyle {
    Character,
    Food,
}

#[derive(Clone, Debug)]
pub struct SpriteCatalog {
    sprites: Vec<Sprite>,
}

impl SpriteCatalog {
    pub fn load_numbered(
        dir: &Path,
        prefix: &str,
        count: usize,
    ) -> Result<Vec<Sprite>, SpriteError> {
        if !dir.is_dir() {
            return Err(SpriteError::MissingDirectory(dir.to_path_buf()));
        }

        let mut sprites = Vec::with_capacity(count);
        for id in 1..=count {
            let name = format!("{prefix}{id}");
            let path = dir.join(format!("{name}.png"));
            if !path.exists() {
                log::warn!("sprite {} not found", path.display());
                continue;
            }
            match decode(&path) {
                Ok(image) => {
                    log::debug!(
                        "loaded {} ({}x{})",
                        path.display(),
                        image.width(),
                        image.height()
                    );
                    sprites.push(Sprite {
                        id,
                        name,
                        image,
                        placeholder: false,
                    });
                }
                Err(err) => log::warn!("{err}"),
            }
        }
        Ok(sprites)
    }

    pub fn load_or_placeholders(
        dir: &Path,
        prefix: &str,
        count: usize,
        style: PlaceholderStyle,
        placeholder_count: usize,
    ) -> Self {
        let sprites = match Self::load_numbered(dir, prefix, count) {
            Ok(sprites) => sprites,
            Err(err) => {
                log::warn!("{err}");
                Vec::new()
            }
        };

        if sprites.is_empty() {
            log::warn!(
                "no sprites loaded from {}, generating {placeholder_count} placeholders",
                dir.display()
            );
            return Self::placeholders(style, placeholder_count);
        }

        log::info!("loaded {} sprites from {}", sprites.len(), dir.display());
        Self { sprites }
    }

    pub fn placeholders(style: PlaceholderStyle, count: usize) -> Self {
        let sprites = (1..=count.max(1))
            .map(|id| {
                let (name, image) = match style {
                    PlaceholderStyle::Character => {
                        (format!("default{id}"), placeholder_character(id))
                    }
                    PlaceholderStyle::Food => (format!("snack{id}"), placeholder_food(id)),
                };
                Sprite {
                    id,
                    name,
                    image,
                    placeholder: true,
                }
            })
            .collect();
        Self { sprites }
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Sprite> {
        self.sprites.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sprite> {
        self.sprites.iter()
    }
}

fn decode(path: &Path) -> Result<RgbaImage, SpriteError> {
    image::open(path)
        .map(|img| img.into_rgba8())
        .map_err(|source| SpriteError::Decode {
            path: path.to_path_buf(),
            source,
        })
}

fn fill(image: &mut RgbaImage, rows: Range<u32>, cols: Range<u32>, color: Rgba<u8>) {
    for y in rows {
        for x in cols.clone() {
            image.put_pixel(x, y, color);
        }
    }
}

fn placeholder_character(id: usize) -> RgbaImage {
    let (w, h) = CHARACTER_PLACEHOLDER_SIZE;
    let mut image = RgbaImage::new(w, h);

    let (body, eyes, mouth) = if id == 1 {
        (
            Rgba([100, 150, 255, 255]),
            Rgba([255, 255, 255, 255]),
            Rgba([255, 100, 100, 255]),
        )
    } else {
        (
            Rgba([255, 150, 200, 255]),
            Rgba([50, 50, 50, 255]),
            Rgba([255, 255, 255, 255]),
        )
    };

    fill(&mut image, 6..18, 4..14, body);
    fill(&mut image, 10..12, 7..9, eyes);
    fill(&mut image, 10..12, 10..12, eyes);
    fill(&mut image, 14..16, 8..11, mouth);
    image
}

fn placeholder_food(id: usize) -> RgbaImage {
    const PALETTE: [[u8; 3]; 7] = [
        [255, 200, 220],
        [173, 216, 230],
        [200, 255, 200],
        [221, 160, 221],
        [175, 238, 238],
        [255, 220, 150],
        [255, 170, 120],
    ];
    let [r, g, b] = PALETTE[(id - 1) % PALETTE.len()];
    let size = FOOD_PLACEHOLDER_SIZE;
    let radius = size as f32 / 2.0;

    RgbaImage::from_fn(size, size, |x, y| {
        let dx = x as f32 + 0.5 - radius;
        let dy = y as f32 + 0.5 - radius;
        if dx * dx + dy * dy <= radius * radius {
            Rgba([r, g, b, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}
