use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::GameKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum GameArg {
    /// Open your mouth to eat falling snacks
    Food,
    /// Pinch characters and drag them to the right
    Characters,
}

impl From<GameArg> for GameKind {
    fn from(arg: GameArg) -> Self {
        match arg {
            GameArg::Food => GameKind::Food,
            GameArg::Characters => GameKind::Characters,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Which game to play
    #[arg(short, long, value_enum, default_value_t = GameArg::Food)]
    pub game: GameArg,

    /// JSON-lines landmark recording to play through the game
    #[arg(short, long)]
    pub replay: PathBuf,

    /// Game config (JSON); defaults are used when absent
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// High score file, overriding the config
    #[arg(long)]
    pub scores: Option<PathBuf>,

    /// Directory holding the sprite folders
    #[arg(long, default_value = ".")]
    pub assets: PathBuf,

    /// RNG seed for reproducible spawns and shuffles (frame timing still follows the wall clock)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Frames per second, overriding the config
    #[arg(long)]
    pub fps: Option<u32>,

    /// Exit after the first round finishes
    #[arg(long, default_value_t = false)]
    pub once: bool,
}
