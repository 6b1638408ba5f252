use std::fs;
use std::path::{Path, PathBuf};

use mistlock_core::{LogProcessor, parse_file};
use mistlock_types::EncounterSummary;
use rayon::prelude::*;

/// Parse, process, and summarize each file; batch parallelism lives here,
/// one independent processor per log.
pub fn info(files: &[PathBuf], json: bool) -> Result<(), String> {
    if files.is_empty() {
        return Err("no files given".to_string());
    }

    let summaries: Vec<(PathBuf, Result<EncounterSummary, String>)> = files
        .par_iter()
        .map(|path| {
            let summary = summarize(path);
            (path.clone(), summary)
        })
        .collect();

    let mut failures = 0usize;
    for (path, summary) in summaries {
        match summary {
            Ok(summary) if json => {
                let line = serde_json::to_string(&summary)
                    .map_err(|e| format!("serializing summary: {e}"))?;
                println!("{line}");
            }
            Ok(summary) => print_summary(&path, &summary),
            Err(error) => {
                failures += 1;
                eprintln!("{}: {error}", path.display());
            }
        }
    }

    if failures > 0 {
        return Err(format!("{failures} file(s) failed"));
    }
    Ok(())
}

fn summarize(path: &Path) -> Result<EncounterSummary, String> {
    let raw = parse_file(path).map_err(|e| e.to_string())?;
    let log = LogProcessor::new()
        .process(&raw)
        .map_err(|e| e.to_string())?;
    Ok(log.analyzer().summary())
}

fn print_summary(path: &Path, summary: &EncounterSummary) {
    println!("{}", path.display());
    let kind = summary
        .kind
        .map(|k| format!(" [{}]", k.label()))
        .unwrap_or_default();
    println!("  {}{kind}", summary.encounter);
    println!(
        "  {} | {} | {:.1}s",
        summary.result.label(),
        summary.mode.label(),
        summary.duration_ms as f64 / 1000.0
    );
    for player in &summary.players {
        println!(
            "  [{}] {} ({})",
            player.subgroup, player.character, player.account
        );
    }
}

pub fn anonymize(file: &Path, out: &Path) -> Result<(), String> {
    edit(file, out, mistlock_core::anonymize_players)
}

pub fn strip_guilds(file: &Path, out: &Path) -> Result<(), String> {
    edit(file, out, mistlock_core::strip_guild_records)
}

fn edit(
    file: &Path,
    out: &Path,
    operation: fn(&[u8]) -> Result<Vec<u8>, mistlock_core::EditError>,
) -> Result<(), String> {
    let bytes = fs::read(file).map_err(|e| format!("reading {}: {e}", file.display()))?;
    let edited = operation(&bytes).map_err(|e| e.to_string())?;
    fs::write(out, &edited).map_err(|e| format!("writing {}: {e}", out.display()))?;
    println!(
        "{} -> {} ({} bytes)",
        file.display(),
        out.display(),
        edited.len()
    );
    Ok(())
}
