use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use termlinks::config::types::Config;
use termlinks::link::buffer::wrap_text;
use termlinks::link::cache::LinkValidationCache;
use termlinks::link::resolver::FsPathResolver;
use termlinks::link::{DetectorOptions, LocalLinkDetector, TerminalLink};
use termlinks::workspace::WorkspaceFolders;

fn main() {
    // Handle --print-default-config before any other initialization
    if std::env::args().any(|a| a == "--print-default-config") {
        print!("{}", Config::print_default());
        return;
    }

    env_logger::init();

    if let Err(e) = run() {
        log::error!("termlinks error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let config_path = dirs_config_path();
    let config = match Config::load(&config_path) {
        Ok(cfg) => {
            log::info!("Config loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            log::warn!("Config load error ({}), using defaults", e);
            Config::default()
        }
    };

    let options = DetectorOptions::from_config(&config);
    let cwd = std::env::current_dir().context("reading current directory")?;

    // Without configured folders the working directory is the workspace.
    let folders = if config.workspace.folders.is_empty() {
        vec![cwd.clone()]
    } else {
        config.workspace.folders.clone()
    };
    let workspace = WorkspaceFolders::from_paths(&folders, config.workspace.ignore_path_casing)?;
    let resolver = FsPathResolver::new(cwd, options.os).with_home(dirs_home());
    let columns = options.columns;
    let detector = LocalLinkDetector::new(
        options,
        resolver,
        workspace,
        Arc::new(LinkValidationCache::new()),
    );

    let inputs: Vec<PathBuf> = std::env::args()
        .skip(1)
        .filter(|a| !a.starts_with("--"))
        .map(PathBuf::from)
        .collect();

    let mut row = 0;
    let mut scan = |reader: &mut dyn BufRead| -> anyhow::Result<()> {
        for line in reader.lines() {
            let line = line?;
            let rows = wrap_text(&line, columns);
            let end = row + rows.len() - 1;
            for link in pollster::block_on(detector.detect(&rows, row, end))? {
                println!("{}", format_link(&link));
            }
            row = end + 1;
        }
        Ok(())
    };

    if inputs.is_empty() {
        scan(&mut std::io::stdin().lock())?;
    } else {
        for path in &inputs {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening {}", path.display()))?;
            scan(&mut BufReader::new(file))?;
        }
    }
    Ok(())
}

fn format_link(link: &TerminalLink) -> String {
    let range = &link.buffer_range;
    format!(
        "{}:{}-{}:{} {} {} {}",
        range.start.y, range.start.x, range.end.y, range.end.x, link.link_type, link.text, link.uri
    )
}

/// Get the config file path (~/.config/termlinks/config.toml).
fn dirs_config_path() -> PathBuf {
    dirs_home()
        .join(".config")
        .join("termlinks")
        .join("config.toml")
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}
