use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::Value;

use lexdesk::{
    assign::{Assigner, FieldErrorCollector},
    config::{AppConfig, StoreBackend},
    registry::{EntityRegistration, find_entity, registered_entities},
    store::{DocumentStore, store_from_config},
};

use crate::output::OutputManager;

async fn read_body(path: &Path) -> Result<Value> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("{} is not valid JSON", path.display()))
}

fn lookup(entity: &str) -> Result<&'static EntityRegistration> {
    find_entity(entity).with_context(|| format!("unknown entity `{entity}`, run `lexdesk entities` to list them"))
}

pub async fn handle_patch(entity: &str, file: &Path, output: &OutputManager) -> Result<()> {
    let registration = lookup(entity)?;
    let body = read_body(file).await?;
    let update = (registration.decode_update)(body)?;

    if update.is_empty() {
        output.warning("no fields present, the update would not change anything");
    }
    output.document(&Value::Object(update))
}

/// With `save`, the record is inserted into the store `save` configures.
pub async fn handle_create(
    entity: &str,
    file: &Path,
    save: Option<&AppConfig>,
    output: &OutputManager,
) -> Result<()> {
    let registration = lookup(entity)?;
    let body = read_body(file).await?;
    let created = (registration.create)(body)?;

    output.document(&created.dto)?;
    let Some(config) = save else {
        output.success(&format!("{} is valid", registration.entity));
        return Ok(());
    };

    let store = store_from_config(config).await.context("failed to open the configured store")?;
    if store.backend() == StoreBackend::Memory {
        output.warning("the memory backend does not outlive this process");
    }
    store
        .insert(registration.collection, created.id, created.document)
        .await
        .with_context(|| format!("failed to save {} {}", registration.entity, created.id))?;
    output.success(&format!("saved {} {} to {}", registration.entity, created.id, registration.collection));
    Ok(())
}

pub async fn handle_assign(entity: &str, file: &Path, strict: bool, output: &OutputManager) -> Result<()> {
    let registration = lookup(entity)?;
    let Value::Object(source) = read_body(file).await? else {
        bail!("{} must contain a JSON object", file.display());
    };

    let collector = FieldErrorCollector::new();
    let assigner = Assigner::with_handler(collector.clone());
    let assigned = (registration.assign)(&source, &assigner)?;

    output.document(&assigned.record)?;
    output.field_errors(&collector.take())?;

    let report = assigned.report;
    let summary = format!(
        "{} applied, {} defaulted, {} untouched, {} error(s)",
        report.applied, report.defaulted, report.untouched, report.errors
    );
    if report.is_clean() {
        output.success(&summary);
    } else if strict {
        bail!("{summary}");
    } else {
        output.warning(&summary);
    }
    Ok(())
}

pub fn handle_config(config: &AppConfig, output: &OutputManager) -> Result<()> {
    output.heading("Configuration");
    output.key_value("store.backend", &format!("{:?}", config.store.backend).to_lowercase());
    output.key_value("store.prefix", &config.store.prefix);
    if config.store.backend == StoreBackend::Redis {
        let url = config.redis_url()?;
        output.key_value("store.url", &url);
    } else {
        output.key_value("store.url", &config.store.url);
    }
    output.key_value("assign.strict", &config.assign.strict.to_string());
    output.key_value("logging.filter", &config.logging.filter);
    Ok(())
}

pub fn handle_entities(output: &OutputManager) {
    let mut entries: Vec<&EntityRegistration> = registered_entities().collect();
    entries.sort_by_key(|registration| registration.entity);

    output.heading("Entities");
    for registration in entries {
        output.bullet(&format!("{} ({})", registration.entity, registration.collection));
    }
    output.info("entities can be named by entity or collection");
}
