mod catalog;
mod cli;

use crate::cli::{related_options, Cli, Command};
use anyhow::bail;
use clap::Parser;
use serde::Serialize;
use tracing::info;
use webvault_cache::MokaItemCache;
use webvault_detail::DetailService;
use webvault_storage::InMemoryRepository;
use webvault_store::{
    FilePreferenceStorage, MemoryPreferenceStorage, PageStore, PreferenceStorage,
};

type Service = DetailService<InMemoryRepository, MokaItemCache>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Cli::parse();
    webvault_telemetry::init(config.log_format.into())?;

    let records = catalog::load(config.catalog.as_deref())?;
    info!(
        records = records.len(),
        log_format = %config.log_format,
        "catalog loaded"
    );

    let repository = InMemoryRepository::with_records(records);
    let service = DetailService::new(repository, MokaItemCache::from(config.cache_config()));

    match config.command {
        Command::Show { id } => print_json(&service.get_by_id(&id).await?)?,
        Command::Related {
            id,
            strategy,
            limit,
            min_score,
            include_ads,
            include_self,
        } => {
            let options = related_options(strategy, limit, min_score, include_ads, include_self);
            print_json(&service.get_related(&id, &options).await?)?;
        }
        Command::Visit { id } => print_json(&service.track_visit(&id).await)?,
        Command::Page { id, visit } => match config.preferences_dir {
            Some(dir) => run_page(service, FilePreferenceStorage::new(dir), &id, visit).await?,
            None => run_page(service, MemoryPreferenceStorage::new(), &id, visit).await?,
        },
    }

    Ok(())
}

async fn run_page<S: PreferenceStorage>(
    service: Service,
    storage: S,
    id: &str,
    visit: bool,
) -> anyhow::Result<()> {
    let store = PageStore::new(service, storage);

    store.load_detail(id, false).await;
    if visit {
        store.track_visit(id).await;
    }
    store.end_session();

    let state = store.state();
    print_json(&state)?;

    if let Some(message) = state.errors.detail {
        bail!(message);
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
