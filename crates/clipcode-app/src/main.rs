use clap::Parser;
use clipcode_app::{base_dir, index_json, load_settings, AppConfig, Args, ROOT_ENV};
use clipcode_core::MappingIndex;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let base = base_dir();
    let args = Args::parse();
    let settings = load_settings(&base)?;
    let config = AppConfig::resolve(
        args,
        std::env::var(ROOT_ENV).ok(),
        std::env::var(EnvFilter::DEFAULT_ENV).ok(),
        settings,
        &base,
    );

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.log_filter)?)
        .init();

    let index = MappingIndex::build(&config.root_dir);
    if config.list {
        println!("{}", index_json(&index)?);
        return Ok(());
    }

    run(index)
}

#[cfg(windows)]
fn run(index: MappingIndex) -> anyhow::Result<()> {
    use anyhow::Context;
    use clipcode_app::spawn_key_source;
    use clipcode_core::clipboard::WindowsClipboard;
    use clipcode_core::{keyboard_hook, Engine};
    use std::sync::Arc;

    let (tx, rx) = crossbeam_channel::unbounded();
    let mut engine = Engine::new(index, Arc::new(WindowsClipboard));

    let hook_thread = spawn_key_source(move || {
        tracing::info!("Hook thread started");
        keyboard_hook::install_hook(tx)?;
        Ok(|| {
            keyboard_hook::run_event_loop();
            keyboard_hook::uninstall_hook();
        })
    })
    .context("installing the keyboard hook")?;

    tracing::info!("Application started.");
    tracing::info!("Modes available:");
    tracing::info!("1. Simultaneous: Hold Ctrl + C + <Digit> + <Char>");
    tracing::info!("2. Sequential: Press Ctrl+C (release), then <Digit>, then <Char>");

    engine.run(rx);
    hook_thread
        .join()
        .map_err(|_| anyhow::anyhow!("hook thread panicked"))
}

#[cfg(not(windows))]
fn run(_index: MappingIndex) -> anyhow::Result<()> {
    anyhow::bail!("the global keyboard hook is only available on Windows; use --list to inspect the index")
}
