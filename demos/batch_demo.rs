use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use spider_dispatch::{FnWorker, RunRequest, SpiderSettings, TaskDefinition, TaskDispatcher, WorkerError};

// Usage: batch_demo [task names...]
// Reads spider.toml (or $SPIDER_SETTINGS) for paths, then runs the named
// tasks, or every enabled task when no names are given.
// demos/prompts/macbook_prompt.txt is left out on purpose: macbook_air_m1
// logs a missing-prompt warning and runs with an empty prompt.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings_path = std::env::var("SPIDER_SETTINGS").unwrap_or_else(|_| "spider.toml".to_string());
    let settings = SpiderSettings::load(&settings_path)?;
    let debug_limit = settings.debug_limit;

    // stands in for the browser scraper: pretends to walk a few listing pages
    let worker = FnWorker::new(|task: TaskDefinition, debug_limit: usize| async move {
        debug!("[{}] task document: {}", task.task_name, task.to_value());
        let pages = task.param("max_pages").and_then(|v| v.as_u64()).unwrap_or(1);
        let mut processed = 0u64;
        for page in 1..=pages {
            sleep(Duration::from_millis(200)).await;
            processed += 3;
            info!("[{}] page {} done", task.task_name, page);
            if debug_limit > 0 && processed >= debug_limit as u64 {
                processed = debug_limit as u64;
                break;
            }
        }
        Ok::<u64, WorkerError>(processed)
    });

    let dispatcher = TaskDispatcher::new(settings, Arc::new(worker));
    let names: Vec<String> = std::env::args().skip(1).collect();

    let total = match RunRequest::from_names(names) {
        RunRequest::Named(names) if names.len() == 1 => {
            dispatcher.run(RunRequest::One(names[0].clone()), debug_limit).await?
        }
        request => {
            let task_names = match &request {
                RunRequest::Named(names) => Some(names.as_slice()),
                _ => None,
            };
            let report = dispatcher.run_batch(task_names, debug_limit).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            report.total_processed
        }
    };

    info!("Processed {} new items in total", total);
    Ok(())
}
