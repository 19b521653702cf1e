mod cli;

use wardrobe::{
    ai::OutfitRequest,
    config::{self, masked, persist::CredentialUpdate, Config},
    pipeline::{UploadFile, UploadStage},
    storage::schema_sql,
    Wardrobe,
};
use wardrobe_common::ItemId;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, SettingsAction};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG if set, otherwise pick defaults from the verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "wardrobe=debug,wardrobe_common=debug".to_string()
        } else {
            "wardrobe=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Upload { files } => block_on(upload(files, config_path)),
        Commands::List => block_on(list(config_path)),
        Commands::Recommend { occasion, weather } => block_on(recommend(
            OutfitRequest::new(occasion.as_deref(), weather.as_deref()),
            config_path,
        )),
        Commands::Show { id } => block_on(show(ItemId::from(id), config_path)),
        Commands::Reanalyze { id } => block_on(reanalyze(ItemId::from(id), config_path)),
        Commands::Remove { id } => block_on(remove(ItemId::from(id), config_path)),
        Commands::Schema => print_schema(config_path),
        Commands::Settings { action } => match action {
            SettingsAction::Show => show_settings(config_path),
            SettingsAction::Set {
                gemini_key,
                supabase_url,
                supabase_key,
            } => set_settings(
                config_path,
                CredentialUpdate {
                    gemini_api_key: gemini_key,
                    supabase_url,
                    supabase_key,
                },
            ),
        },
        Commands::Version => {
            println!("wardrobe {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn block_on<F: std::future::Future<Output = Result<()>>>(future: F) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(future)
}

fn open(config_path: Option<&Path>) -> Result<Wardrobe> {
    let config = config::load_config_or_default(config_path)?;
    Ok(Wardrobe::from_config(&config)?)
}

async fn upload(paths: Vec<PathBuf>, config_path: Option<&Path>) -> Result<()> {
    // Credentials are checked before any file is touched
    let wardrobe = open(config_path)?;
    wardrobe.require_vision()?;

    let mut files = Vec::with_capacity(paths.len());
    let mut unreadable = 0;
    for path in &paths {
        match UploadFile::read(path).await {
            Ok(file) => files.push(file),
            Err(e) => {
                eprintln!("Skipping {}: {}", path.display(), e);
                unreadable += 1;
            }
        }
    }

    let report = wardrobe
        .upload_batch(files, |progress| {
            let label = match &progress.stage {
                UploadStage::Compressing => "compressing".to_string(),
                UploadStage::Uploading { .. } => "uploading".to_string(),
                UploadStage::Analyzing => "analyzing".to_string(),
                UploadStage::Persisted(id) => format!("done (id {})", id),
                UploadStage::Failed(reason) => format!("failed: {}", reason),
            };
            println!(
                "Processing file {} of {} ({}): {}",
                progress.index, progress.total, progress.file, label
            );
        })
        .await?;

    let failed = report.failed + unreadable;
    println!("\nUploaded {} file(s), {} failed", report.succeeded, failed);

    if failed > 0 {
        anyhow::bail!("{} file(s) failed to upload", failed);
    }
    Ok(())
}

async fn list(config_path: Option<&Path>) -> Result<()> {
    let cards = open(config_path)?.catalog().await?;

    if cards.is_empty() {
        println!("No items yet. Add some with `wardrobe upload`.");
        return Ok(());
    }
    for card in &cards {
        println!("{}", card);
    }
    println!("\n{} item(s)", cards.len());
    Ok(())
}

async fn recommend(request: OutfitRequest, config_path: Option<&Path>) -> Result<()> {
    let view = open(config_path)?.recommend(&request).await?;
    println!("{}", view);
    Ok(())
}

async fn show(id: ItemId, config_path: Option<&Path>) -> Result<()> {
    let item = open(config_path)?.item(&id).await?;
    println!("{}", serde_json::to_string_pretty(&item)?);
    Ok(())
}

async fn reanalyze(id: ItemId, config_path: Option<&Path>) -> Result<()> {
    let analysis = open(config_path)?.reanalyze(&id).await?;
    println!("Item {} is now available", id);
    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}

async fn remove(id: ItemId, config_path: Option<&Path>) -> Result<()> {
    open(config_path)?.remove(&id).await?;
    println!("Removed item {}", id);
    Ok(())
}

fn print_schema(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    print!("{}", schema_sql(&config.storage.table, &config.storage.bucket));
    Ok(())
}

fn show_settings(config_path: Option<&Path>) -> Result<()> {
    let path = config::settings_path(config_path);
    let config: Config = config::load_config_or_default(config_path)?;
    let creds = &config.credentials;

    println!("Settings file: {}", path.display());
    println!("  gemini_api_key: {}", masked(creds.gemini_api_key.as_deref()));
    println!("  supabase_url:   {}", creds.supabase_url);
    println!("  supabase_key:   {}", masked(creds.supabase_key.as_deref()));
    println!("  model:          {}", config.gemini.model);
    println!(
        "  storage:        bucket {}, table {}",
        config.storage.bucket, config.storage.table
    );
    println!(
        "  compression:    max width {}px, quality {}",
        config.compression.max_width, config.compression.quality
    );
    Ok(())
}

fn set_settings(config_path: Option<&Path>, update: CredentialUpdate) -> Result<()> {
    let path = config::settings_path(config_path);
    let written = config::persist::save_credentials(&path, &update)
        .with_context(|| format!("Failed to save settings to {}", path.display()))?;

    if written.is_empty() {
        println!("Nothing to update; stored settings unchanged");
    } else {
        println!("Saved {} to {}", written.join(", "), path.display());
    }
    Ok(())
}
