//! One-shot media and edit runs from the command line.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{info, warn};

use automator_config::Config;
use automator_protocols::{AspectRatio, JobKind, JobPhase, JobSnapshot, LogStatus, QueueItem, TabRef};
use automator_queue::Orchestrator;

use crate::cli::RunTarget;
use crate::server::{Runtime, build_runtime};

const PROGRESS_INTERVAL: Duration = Duration::from_secs(1);

/// Run a media job over `images` and wait for it to finish.
pub(crate) async fn run_media(
    config: Config,
    images: Vec<PathBuf>,
    aspect_ratio: Option<AspectRatio>,
    output_folder: Option<String>,
    target: RunTarget,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut run_config = config.media.run_config();
    if let Some(ratio) = aspect_ratio {
        run_config.aspect_ratio = ratio;
    }
    if let Some(folder) = output_folder {
        run_config.output_folder = folder;
    }

    let items: Vec<QueueItem> = images
        .iter()
        .enumerate()
        .map(|(index, path)| QueueItem::from_path(index, path))
        .collect();

    let runtime = build_runtime(&config).await?;
    let tab = resolve_tab(&runtime, target.tab).await?;

    println!(
        "Generating {} videos ({}) in tab {}",
        items.len(),
        run_config.aspect_ratio,
        tab
    );
    runtime
        .orchestrator
        .start_media(items, run_config, tab)
        .await?;

    finish(&runtime.orchestrator, JobKind::Media, !target.no_export).await
}

/// Run an edit job over `prompts` and wait for it to finish.
pub(crate) async fn run_edit(
    config: Config,
    prompts: Vec<String>,
    delay: Option<u64>,
    output_folder: Option<String>,
    target: RunTarget,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut run_config = config.edit.run_config();
    if let Some(delay) = delay {
        run_config.delay_secs = delay;
    }
    if let Some(folder) = output_folder {
        run_config.output_folder = folder;
    }

    let runtime = build_runtime(&config).await?;
    let tab = resolve_tab(&runtime, target.tab).await?;

    println!("Submitting {} edit prompts in tab {}", prompts.len(), tab);
    runtime
        .orchestrator
        .start_edit(prompts, run_config, tab)
        .await?;

    finish(&runtime.orchestrator, JobKind::Edit, !target.no_export).await
}

/// Merge prompts given as flags with those read from `file`.
///
/// Blank lines and surrounding whitespace are dropped.
pub(crate) fn collect_prompts(
    mut prompts: Vec<String>,
    file: Option<&Path>,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    if let Some(file) = file {
        let content = std::fs::read_to_string(file)?;
        prompts.extend(parse_prompts(&content));
    }
    prompts.retain(|p| !p.trim().is_empty());
    if prompts.is_empty() {
        return Err("No prompts given: use --prompt or --prompts-file".into());
    }
    Ok(prompts)
}

fn parse_prompts(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

async fn resolve_tab(
    runtime: &Runtime,
    tab: Option<String>,
) -> Result<TabRef, Box<dyn std::error::Error>> {
    match tab {
        Some(id) => Ok(TabRef::new(id)),
        None => Ok(runtime.tabs.find_tab().await?),
    }
}

/// Follow the job until it terminates, then export its artifacts.
///
/// Ctrl-C stops the job at the next item boundary.
async fn finish(
    orchestrator: &Orchestrator,
    kind: JobKind,
    export: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = follow(orchestrator, kind).await?;

    if let Some(error) = &snapshot.last_error {
        warn!("{} job ended with error: {}", kind, error);
    }

    if export && snapshot.artifact_count > 0 {
        let (count, folder) = orchestrator.export_all(kind).await?;
        println!("Exported {} files into {}", count, folder);
    }

    match snapshot.phase {
        JobPhase::Aborted => Err(snapshot
            .last_error
            .unwrap_or_else(|| format!("{} job aborted", kind))
            .into()),
        _ => Ok(()),
    }
}

async fn follow(
    orchestrator: &Orchestrator,
    kind: JobKind,
) -> Result<JobSnapshot, Box<dyn std::error::Error>> {
    let mut printed: HashMap<String, LogStatus> = HashMap::new();
    let mut interval = tokio::time::interval(PROGRESS_INTERVAL);
    let mut stop_requested = false;

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            signal = tokio::signal::ctrl_c(), if !stop_requested => {
                signal?;
                info!("Stop requested from the terminal");
                println!("Stopping after the current item...");
                stop_requested = true;
                if let Err(e) = orchestrator.stop(kind).await {
                    warn!("Stop failed: {}", e);
                }
            }
        }

        let snapshot = orchestrator.state(kind);
        for line in progress_lines(&snapshot, &mut printed) {
            println!("{}", line);
        }
        if snapshot.phase.is_terminal() {
            println!("{} job {}", kind, phase_name(snapshot.phase));
            return Ok(snapshot);
        }
    }
}

/// Lines for log entries whose status changed since the last call.
fn progress_lines(snapshot: &JobSnapshot, printed: &mut HashMap<String, LogStatus>) -> Vec<String> {
    let mut lines = Vec::new();
    for entry in &snapshot.log {
        if printed.get(&entry.label) == Some(&entry.status) {
            continue;
        }
        printed.insert(entry.label.clone(), entry.status);

        let line = match (&entry.status, &entry.error) {
            (LogStatus::Failed, Some(error)) => format!("  [failed] {}: {}", entry.label, error),
            (status, _) => format!("  [{}] {}", status_name(*status), entry.label),
        };
        lines.push(line);
    }
    lines
}

fn status_name(status: LogStatus) -> &'static str {
    match status {
        LogStatus::Pending => "pending",
        LogStatus::Processing => "processing",
        LogStatus::Completed => "completed",
        LogStatus::Failed => "failed",
    }
}

fn phase_name(phase: JobPhase) -> &'static str {
    match phase {
        JobPhase::Idle => "idle",
        JobPhase::Running => "running",
        JobPhase::Paused => "paused",
        JobPhase::Completed => "completed",
        JobPhase::Stopped => "stopped",
        JobPhase::Aborted => "aborted",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use automator_protocols::{JobSettings, LogEntry, MediaRunConfig};
    use std::io::Write;

    fn snapshot(log: Vec<LogEntry>) -> JobSnapshot {
        JobSnapshot {
            kind: JobKind::Media,
            phase: JobPhase::Running,
            processing: true,
            paused: false,
            cursor: 0,
            total: 2,
            current_label: None,
            log,
            settings: JobSettings::Media(MediaRunConfig::default()),
            artifact_count: 0,
            last_error: None,
        }
    }

    #[test]
    fn test_parse_prompts_skips_blank_lines() {
        let prompts = parse_prompts("make it red\n\n  add a hat  \n\t\nnight scene\n");
        assert_eq!(prompts, vec!["make it red", "add a hat", "night scene"]);
    }

    #[test]
    fn test_collect_prompts_merges_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "from file").unwrap();

        let prompts =
            collect_prompts(vec!["from flag".to_string()], Some(file.path())).unwrap();
        assert_eq!(prompts, vec!["from flag", "from file"]);
    }

    #[test]
    fn test_collect_prompts_requires_one() {
        assert!(collect_prompts(vec!["   ".to_string()], None).is_err());
    }

    #[test]
    fn test_progress_lines_only_report_changes() {
        let mut printed = HashMap::new();

        let first = snapshot(vec![LogEntry::new("a.png", LogStatus::Processing, None)]);
        assert_eq!(progress_lines(&first, &mut printed), vec!["  [processing] a.png"]);
        assert!(progress_lines(&first, &mut printed).is_empty());

        let second = snapshot(vec![
            LogEntry::new("a.png", LogStatus::Completed, None),
            LogEntry::new("b.png", LogStatus::Failed, Some("Timeout".to_string())),
        ]);
        assert_eq!(
            progress_lines(&second, &mut printed),
            vec!["  [completed] a.png", "  [failed] b.png: Timeout"]
        );
    }
}
