use anyhow::Context;
use clap::Parser;
use clipcode_core::{Code, MappingIndex};
use crossbeam_channel::bounded;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

/// Name of the optional settings file next to the executable.
pub const SETTINGS_FILE: &str = "clipcode.json";
pub const ROOT_ENV: &str = "CLIPCODE_ROOT";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub root_dir: Option<PathBuf>,
    pub log_filter: Option<String>,
}

/// Reads `clipcode.json` from `dir`. A missing file yields defaults; a
/// malformed one is an error.
pub fn load_settings(dir: &Path) -> anyhow::Result<Settings> {
    let path = dir.join(SETTINGS_FILE);
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content =
        fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

/// Copies indexed text snippets to the clipboard from key chords and sequences
#[derive(Parser, Debug, Default, Clone, PartialEq, Eq)]
#[command(name = "clipcode", version)]
pub struct Args {
    /// Print the code index as JSON and exit
    #[arg(short, long)]
    pub list: bool,

    /// Snippet root directory
    #[arg(value_name = "ROOT")]
    pub root: Option<PathBuf>,
}

/// Effective startup configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub root_dir: PathBuf,
    pub log_filter: String,
    pub list: bool,
}

impl AppConfig {
    /// Root precedence: argument, `CLIPCODE_ROOT`, settings file, `base_dir`.
    /// Log filter precedence: `RUST_LOG`, settings file, `info`.
    pub fn resolve(
        args: Args,
        env_root: Option<String>,
        env_log: Option<String>,
        settings: Settings,
        base_dir: &Path,
    ) -> Self {
        let root_dir = args
            .root
            .or_else(|| env_root.filter(|s| !s.is_empty()).map(PathBuf::from))
            .or(settings.root_dir)
            .map(|p| if p.is_relative() { base_dir.join(p) } else { p })
            .unwrap_or_else(|| base_dir.to_path_buf());
        let log_filter = env_log
            .filter(|s| !s.is_empty())
            .or(settings.log_filter)
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Self {
            root_dir,
            log_filter,
            list: args.list,
        }
    }
}

/// Directory of the running executable, falling back to the working directory.
pub fn base_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

#[derive(Debug, Serialize)]
pub struct IndexEntry<'a> {
    pub code: &'a Code,
    pub chord: String,
    pub path: &'a Path,
}

/// JSON listing of the index, in code order.
pub fn index_json(index: &MappingIndex) -> anyhow::Result<String> {
    let entries: Vec<IndexEntry<'_>> = index
        .iter()
        .map(|(code, path)| IndexEntry {
            code,
            chord: clipcode_core::registrar::chord_trigger(code),
            path,
        })
        .collect();
    Ok(serde_json::to_string_pretty(&entries)?)
}

/// Runs a blocking key source on its own thread.
///
/// `install` runs on the new thread and returns the loop to block in. Its
/// result is reported back before this returns, so a source that fails to
/// come up surfaces as an error here instead of dying quietly.
pub fn spawn_key_source<I, L>(install: I) -> anyhow::Result<JoinHandle<()>>
where
    I: FnOnce() -> anyhow::Result<L> + Send + 'static,
    L: FnOnce(),
{
    let (ready_tx, ready_rx) = bounded::<anyhow::Result<()>>(1);
    let handle = thread::spawn(move || match install() {
        Ok(run_loop) => {
            let _ = ready_tx.send(Ok(()));
            run_loop();
        }
        Err(e) => {
            let _ = ready_tx.send(Err(e));
        }
    });

    match ready_rx.recv() {
        Ok(Ok(())) => Ok(handle),
        Ok(Err(e)) => {
            let _ = handle.join();
            Err(e)
        }
        Err(_) => {
            let _ = handle.join();
            anyhow::bail!("key source thread exited before it was ready")
        }
    }
}
