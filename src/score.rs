use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use serde_json::{Map, Value};

use crate::error::StoreError;

pub trait HighScoreStore: Send {
    fn load(&self) -> Result<u32, StoreError>;
    fn save(&mut self, score: u32) -> Result<(), StoreError>;
}

pub fn load_or_zero(store: &dyn HighScoreStore) -> u32 {
    match store.load() {
        Ok(score) => score,
        Err(err) => {
            log::warn!("{err}; starting from a high score of 0");
            0
        }
    }
}

/// One JSON object shared by every game, one key per game. Saving rewrites
/// only this store's key and keeps the others.
#[derive(Clone, Debug)]
pub struct JsonHighScoreStore {
    path: PathBuf,
    key: String,
}

impl JsonHighScoreStore {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_object(&self) -> Result<Map<String, Value>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Ok(Map::new()),
            Err(source) => Err(StoreError::Json {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

impl HighScoreStore for JsonHighScoreStore {
    fn load(&self) -> Result<u32, StoreError> {
        let object = self.read_object()?;
        Ok(object
            .get(&self.key)
            .and_then(Value::as_u64)
            .map(|score| u32::try_from(score).unwrap_or(u32::MAX))
            .unwrap_or(0))
    }

    fn save(&mut self, score: u32) -> Result<(), StoreError> {
        // A corrupt file is replaced rather than blocking the save.
        let mut object = match self.read_object() {
            Ok(object) => object,
            Err(StoreError::Json { .. }) => Map::new(),
            Err(err) => return Err(err),
        };
        object.insert(self.key.clone(), Value::from(score));

        let content = serde_json::to_string_pretty(&Value::Object(object)).map_err(|source| {
            StoreError::Json {
                path: self.path.clone(),
                source,
            }
        })?;
        fs::write(&self.path, content).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemoryHighScoreStore {
    scores: Arc<Mutex<HashMap<String, u32>>>,
    key: String,
}

impl MemoryHighScoreStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            scores: Arc::default(),
            key: key.into(),
        }
    }

    pub fn with_score(key: impl Into<String>, score: u32) -> Self {
        let store = Self::new(key);
        store.set(score);
        store
    }

    pub fn get(&self) -> u32 {
        self.scores
            .lock()
            .map(|scores| scores.get(&self.key).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    fn set(&self, score: u32) {
        if let Ok(mut scores) = self.scores.lock() {
            scores.insert(self.key.clone(), score);
        }
    }
}

impl HighScoreStore for MemoryHighScoreStore {
    fn load(&self) -> Result<u32, StoreError> {
        Ok(self.get())
    }

    fn save(&mut self, score: u32) -> Result<(), StoreError> {
        self.set(score);
        Ok(())
    }
}
