use std::{
    fs::{File, OpenOptions},
    io,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Env, Target};

use speed_clicker::{
    app::App,
    constants::{DEFAULT_STORE_PATH, DEFAULT_TICK_RATE_MS, DEFAULT_WINDOW_MS},
    ui, Engine, EngineConfig, JsonFileStore, KeyValueStore, MemoryStore, ScoreStore,
};

/// Measure your clicking speed in the terminal.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Trailing window the rate is counted over, in milliseconds
    #[arg(long, default_value_t = DEFAULT_WINDOW_MS, value_parser = clap::value_parser!(u64).range(1..))]
    window_ms: u64,

    /// How often the rate is re-evaluated, in milliseconds
    #[arg(long, default_value_t = DEFAULT_TICK_RATE_MS, value_parser = clap::value_parser!(u64).range(1..))]
    tick_ms: u64,

    /// Key-value file holding the high score
    #[arg(long, default_value = DEFAULT_STORE_PATH)]
    store: PathBuf,

    /// Keep the high score in memory only
    #[arg(long)]
    no_persist: bool,

    /// Write logs here (the terminal is taken by the game)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print the stored high score and exit
    #[arg(long)]
    show_best: bool,
}

// Append so earlier sessions' logs survive
fn open_log_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn init_logging(path: Option<&PathBuf>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = open_log_file(path)
        .with_context(|| format!("Error opening log file {}", path.display()))?;
    env_logger::Builder::from_env(Env::default().default_filter_or("speed_clicker=info"))
        .target(Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_ref())?;

    let store: Box<dyn KeyValueStore> = if args.no_persist {
        Box::new(MemoryStore::new())
    } else {
        Box::new(JsonFileStore::new(&args.store))
    };

    if args.show_best {
        let best = ScoreStore::new(store).load();
        println!("{}", best.value);
        return Ok(());
    }

    let config = EngineConfig::new(args.window_ms, args.tick_ms).context("Invalid configuration")?;
    let engine = Engine::new(config, store);

    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    ctrlc::set_handler(move || flag.store(false, Ordering::SeqCst))
        .context("Error installing Ctrl-C handler")?;

    if !args.no_persist {
        log::info!("using store {}", args.store.display());
    }
    ui::run(App::new(engine), running).context("Error in terminal interface")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn log_file_keeps_earlier_sessions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("speed_clicker.log");

        writeln!(open_log_file(&path).unwrap(), "first session").unwrap();
        writeln!(open_log_file(&path).unwrap(), "second session").unwrap();

        let body = std::fs::read_to_string(&path).unwrap();
        assert_eq!(body, "first session\nsecond session\n");
    }
}
