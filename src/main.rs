use anyhow::Context;
use timetable_scraper::config::{Config, SourceKind};
use timetable_scraper::logging::{init_logging, LoggerConfig};
use timetable_scraper::pipeline::Pipeline;
use timetable_scraper::sink::{DocumentSink, JsonDirSink, MemorySink};
use timetable_scraper::source::{FixtureSource, LiveSource, PageSource};
use timetable_scraper::{log_info, log_warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::from_file(&config_path)
        .with_context(|| format!("failed to load {}", config_path))?;
    init_logging(LoggerConfig::from_log_config(&config.logging)?)?;

    log_info!("[main] Starting timetable scraper...");
    log_info!(
        "[main] Subjects: {}, term: {}, test run: {}",
        if config.scrape.subjects.is_empty() {
            "all".to_string()
        } else {
            config.scrape.subjects.join(", ")
        },
        config
            .scrape
            .term
            .map_or_else(|| "any".to_string(), |term| term.to_string()),
        config.scrape.test_run
    );

    let source: Box<dyn PageSource> = match config.scrape.source {
        SourceKind::Live => Box::new(LiveSource::new(&config)?),
        SourceKind::Fixtures => {
            log_info!("[main] Replaying pages from {}", config.scrape.fixture_dir);
            Box::new(FixtureSource::new(&config.scrape.fixture_dir))
        }
    };

    let sink: Box<dyn DocumentSink> = if config.scrape.dry_run {
        log_warn!("[main] Dry run: classes will not be persisted");
        Box::new(MemorySink::new())
    } else {
        Box::new(JsonDirSink::new(&config.sink.directory)?)
    };

    let report = Pipeline::new(&config, source.as_ref(), sink.as_ref())
        .run()
        .await?;

    log_info!(
        "[main] Scraper completed: {} classes found, {} saved, {} location warnings",
        report.records.len(),
        report.written,
        report.warnings.len()
    );
    Ok(())
}
