use std::{
    sync::{Arc, atomic::Ordering},
    thread,
};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use crossbeam_channel::unbounded;
use photobooth_games::{
    CharacterGame, FoodGame, GameConfig, GameEvent, GameKind, GameMode, GamePhase,
    JsonHighScoreStore, SystemClock,
    args::Args,
    game::GameSession,
    pipeline::{LandmarkSource, ReplaySource, RunSummary, Runner},
    sprites::{PlaceholderStyle, SpriteCatalog},
};

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => GameConfig::load_or_default(path),
        None => GameConfig::default(),
    };
    if let Some(path) = &args.scores {
        config.high_score_path = path.clone();
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(fps) = args.fps {
        config.target_fps = fps;
    }
    config.validate().context("invalid settings")?;
    let config = Arc::new(config);

    let source = ReplaySource::open(&args.replay)?;
    let kind = GameKind::from(args.game);
    log::info!("{}{} selected", kind.emoji(), kind.display_name());

    let summary = match kind {
        GameKind::Food => {
            let catalog = SpriteCatalog::load_or_placeholders(
                &args.assets.join(&config.food.sprite_dir),
                &config.food.sprite_prefix,
                config.food.sprite_count,
                PlaceholderStyle::Food,
                config.food.sprite_count,
            );
            let mode = FoodGame::new(config.clone(), catalog);
            play(config.clone(), mode, &config.food.high_score_key, source, args.once)?
        }
        GameKind::Characters => {
            let catalog = SpriteCatalog::load_or_placeholders(
                &args.assets.join(&config.characters.sprite_dir),
                &config.characters.sprite_prefix,
                config.characters.sprite_count,
                PlaceholderStyle::Character,
                config.characters.placeholder_count,
            );
            let mode = CharacterGame::new(config.clone(), catalog);
            play(
                config.clone(),
                mode,
                &config.characters.high_score_key,
                source,
                args.once,
            )?
        }
    };

    println!(
        "{} frames, phase {}, score {}, best {}{}",
        summary.frames,
        summary.phase.label(),
        summary.score,
        summary.high_score,
        if summary.new_record { " (new record!)" } else { "" }
    );
    Ok(())
}

fn play<M: GameMode>(
    config: Arc<GameConfig>,
    mode: M,
    score_key: &str,
    source: impl LandmarkSource + 'static,
    once: bool,
) -> Result<RunSummary> {
    let store = JsonHighScoreStore::new(&config.high_score_path, score_key);
    log::info!("high scores in {}", store.path().display());
    let session = GameSession::new(config.clone(), mode, SystemClock::new(), Box::new(store));

    let (events_tx, events_rx) = unbounded();
    let mut runner = Runner::new(config, session).with_events(events_tx);
    let quit = runner.quit_handle();

    let printer = thread::spawn(move || {
        for event in events_rx {
            print_event(&event);
            if once
                && matches!(
                    event,
                    GameEvent::PhaseChanged {
                        to: GamePhase::Finished,
                        ..
                    }
                )
            {
                quit.store(true, Ordering::SeqCst);
            }
        }
    });

    let summary = runner.run_source(source)?;
    drop(runner);
    printer
        .join()
        .map_err(|_| anyhow!("event printer thread panicked"))?;
    Ok(summary)
}

fn print_event(event: &GameEvent) {
    match event {
        GameEvent::HeartAccepted { center } => {
            println!("💖 heart at ({:.0}, {:.0})", center.x, center.y)
        }
        GameEvent::PhaseChanged { from, to } => println!("{} -> {}", from.label(), to.label()),
        GameEvent::ScoreChanged { score, delta } => println!("+{delta} = {score}"),
        GameEvent::FoodEaten { id, .. } => println!("😋 ate snack {id}"),
        GameEvent::CharacterGrabbed { id } => println!("✊ grabbed {id}"),
        GameEvent::CharacterReleased { id, .. } => println!("🖐 released {id}"),
        GameEvent::CharacterScored { id, .. } => println!("⭐ character {id} made it"),
        GameEvent::AllCharactersMoved => println!("🎉 everyone moved!"),
        GameEvent::SpritePoolReset { size } => println!("🔄 all {size} characters used"),
        GameEvent::NewRecord { score, previous } => {
            println!("🏆 new record {score} (was {previous})")
        }
    }
}
