//! The `keepsake` binary: wires configuration, storage, the database and
//! the AI clients together once at startup and drives the pipeline.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use uuid::Uuid;

use keepsake_core::{AppConfig, IngestProgress, MediaRecord};
use keepsake_db::RecordStore;
use keepsake_enrich::{
    AnthropicAnalyzer, Enricher, LiveClient, ReplicateImageGenerator, RetryPolicy,
};
use keepsake_pipeline::{
    cluster_records, AssetPublisher, IngestPipeline, IngestRequest, RecordEditor, RecordPatch,
};
use keepsake_processing::{FfmpegSampler, MediaSource};
use keepsake_storage::create_storage;

#[derive(Parser)]
#[command(name = "keepsake", about = "Personal media library", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest a video, or a set of photos with --photos.
    Ingest {
        /// Video file to ingest.
        file: Option<PathBuf>,
        /// Photo files to ingest as one record.
        #[arg(long, num_args = 1.., conflicts_with = "file")]
        photos: Vec<PathBuf>,
        /// Retell the memory as a generated four-page comic.
        #[arg(long)]
        comic: bool,
        /// Skip AI analysis and generation for this ingest.
        #[arg(long)]
        no_magic: bool,
        /// Place the record in a named folder (excludes it from automatic
        /// clustering).
        #[arg(long)]
        folder: Option<String>,
    },
    /// List all records, newest first.
    List,
    /// Show one record in full.
    Show { id: Uuid },
    /// Edit a record's text, folder, cover or page order.
    Edit {
        id: Uuid,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, conflicts_with = "clear_folder")]
        folder: Option<String>,
        #[arg(long)]
        clear_folder: bool,
        /// Page URL to promote to cover.
        #[arg(long)]
        cover: Option<String>,
        /// New page order (existing page URLs only).
        #[arg(long, num_args = 1..)]
        pages: Vec<String>,
    },
    /// Delete a record and its published assets.
    Delete { id: Uuid },
    /// Show the clustered timeline.
    Clusters,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("keepsake=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env();

    let pool = keepsake_db::connect(&config.database_path)
        .await
        .context("opening database")?;
    let store = RecordStore::new(pool);
    let storage = create_storage(&config).await.context("opening storage")?;
    let publisher = AssetPublisher::new(storage);

    match cli.command {
        Command::Ingest {
            file,
            photos,
            comic,
            no_magic,
            folder,
        } => {
            let source = if photos.is_empty() {
                MediaSource::Video(file.context("provide a video file or --photos")?)
            } else {
                MediaSource::Photos(photos)
            };
            ingest(&config, store, publisher, source, comic, no_magic, folder).await?;
        }
        Command::List => {
            for record in store.load_all().await? {
                println!(
                    "{}  {:5}  {}  {}{}",
                    record.id,
                    record.media_type.to_string(),
                    record.created_at.format("%Y-%m-%d"),
                    record.title,
                    record
                        .folder_name
                        .as_deref()
                        .map(|f| format!("  [{}]", f))
                        .unwrap_or_default()
                );
            }
        }
        Command::Show { id } => match store.load(id).await? {
            Some(record) => print_record(&record),
            None => bail!("no record with id {}", id),
        },
        Command::Edit {
            id,
            title,
            description,
            folder,
            clear_folder,
            cover,
            pages,
        } => {
            let patch = RecordPatch {
                title,
                description,
                folder: if clear_folder {
                    Some(None)
                } else {
                    folder.map(Some)
                },
                cover_url: cover,
                pages: if pages.is_empty() { None } else { Some(pages) },
            };
            let editor = RecordEditor::new(store, publisher);
            let updated = editor.apply(id, patch).await?;
            print_record(&updated);
        }
        Command::Delete { id } => {
            let editor = RecordEditor::new(store, publisher);
            if editor.delete(id).await? {
                println!("Deleted {}", id);
            } else {
                bail!("no record with id {}", id);
            }
        }
        Command::Clusters => {
            for cluster in cluster_records(store.load_all().await?) {
                let marker = if cluster.user_named { "folder" } else { "auto" };
                println!("{} ({}, {} records)", cluster.label, marker, cluster.records.len());
                for record in &cluster.records {
                    println!(
                        "    {}  {}  {}",
                        record.id,
                        record.created_at.format("%Y-%m-%d"),
                        record.title
                    );
                }
            }
        }
    }

    Ok(())
}

async fn ingest(
    config: &AppConfig,
    store: RecordStore,
    publisher: AssetPublisher,
    source: MediaSource,
    comic: bool,
    no_magic: bool,
    folder: Option<String>,
) -> Result<()> {
    let credentials_present =
        config.anthropic_api_key.is_some() && config.replicate_api_token.is_some();
    let magic = config.magic_enabled && !no_magic && credentials_present;

    if comic && !magic {
        bail!("comic generation needs AI enrichment: set ANTHROPIC_API_KEY and REPLICATE_API_TOKEN and leave magic on");
    }
    if config.magic_enabled && !no_magic && !credentials_present {
        tracing::warn!("AI credentials missing, ingesting with placeholder metadata");
    }

    let analyzer = AnthropicAnalyzer::new(
        config.anthropic_api_key.clone().unwrap_or_default(),
        config.anthropic_model.clone(),
    )?;
    let generator = ReplicateImageGenerator::new(
        config.replicate_api_token.clone().unwrap_or_default(),
        config.replicate_image_model.clone(),
    )?;
    let enricher = Enricher::new(
        Arc::new(LiveClient::new(analyzer, generator)),
        RetryPolicy {
            max_attempts: config.retry_max_attempts,
            initial_delay: Duration::from_millis(config.retry_initial_delay_ms),
        },
        Duration::from_millis(config.comic_page_delay_ms),
    );
    let sampler = Arc::new(FfmpegSampler::new(
        config.ffmpeg_path.clone(),
        config.ffprobe_path.clone(),
        Duration::from_secs(config.extraction_timeout_secs),
    ));
    let pipeline = IngestPipeline::new(sampler, enricher, publisher, store, config.sample_count);

    let (tx, mut rx) = watch::channel(IngestProgress::idle());
    let printer = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let progress = *rx.borrow();
            println!("  [{:>3}%] {}", progress.percent, progress.stage);
        }
    });

    let request = IngestRequest {
        source,
        comic,
        magic,
        folder_name: folder,
    };
    let result = pipeline.ingest(request, &tx).await;
    drop(tx);
    let _ = printer.await;

    let record = result?;
    println!("Ingested {}  {}", record.id, record.title);
    Ok(())
}

fn print_record(record: &MediaRecord) {
    println!("id:          {}", record.id);
    println!("title:       {}", record.title);
    println!("type:        {}", record.media_type);
    println!("created:     {}", record.created_at.to_rfc3339());
    if let Some(end) = record.end_date {
        println!("ends:        {}", end.to_rfc3339());
    }
    println!("ai status:   {}", record.ai_status);
    if let Some(folder) = &record.folder_name {
        println!("folder:      {}", folder);
    }
    if !record.genre.is_empty() {
        println!("genre:       {}", record.genre.join(", "));
    }
    println!("score:       {}", record.match_score);
    println!("thumbnail:   {}", record.thumbnail_url);
    println!("main asset:  {}", record.main_asset_url);
    for (i, page) in record.pages.iter().enumerate() {
        let cover = if record.cover_index() == Some(i) {
            "  (cover)"
        } else {
            ""
        };
        println!("page {}:      {}{}", i, page, cover);
    }
    println!();
    println!("{}", record.description);
}
