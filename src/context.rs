//! Shell history and host description sent along with every query.

use crate::types::QueryContext;
use regex::Regex;
use std::{
    env, fs,
    path::{Path, PathBuf},
    process::Command,
    sync::OnceLock,
};

pub const SYSTEM_INFO_UNAVAILABLE: &str = "System info unavailable";

pub fn gather() -> QueryContext {
    QueryContext {
        history: read_history(),
        system_info: system_info(),
    }
}

fn history_path() -> Option<PathBuf> {
    env::var_os("HISTFILE")
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(".bash_history")))
}

pub fn read_history() -> Vec<String> {
    match history_path() {
        Some(path) => read_history_file(&path),
        None => Vec::new(),
    }
}

/// Missing or unreadable history is not an error; the query just goes out without it.
pub fn read_history_file(path: &Path) -> Vec<String> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "no shell history");
            return Vec::new();
        }
    };

    String::from_utf8_lossy(&bytes)
        .lines()
        .map(strip_zsh_timestamp)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

// zsh extended history: ": 1700000000:0;git status"
fn strip_zsh_timestamp(line: &str) -> &str {
    if line.starts_with(": ") {
        if let Some((_, cmd)) = line.split_once(';') {
            return cmd;
        }
    }
    line
}

fn ansi_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\x1B\[[0-?]*[ -/]*[@-~]").expect("ansi regex is valid"))
}

pub fn strip_ansi(text: &str) -> String {
    ansi_re().replace_all(text, "").into_owned()
}

fn run_for_text(program: &str, args: &[&str]) -> Option<String> {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn system_info() -> String {
    run_for_text("neofetch", &["--stdout"])
        .map(|s| strip_ansi(&s))
        .or_else(|| run_for_text("uname", &["-a"]))
        .unwrap_or_else(|| {
            tracing::debug!("neofetch and uname both unavailable");
            SYSTEM_INFO_UNAVAILABLE.to_string()
        })
}
