//! Datasource history handlers.

use anyhow::{Context, Result};
use dashgate_core::history::{DataSourceHistory, format_timestamp, pretty_data};

use crate::cli::{Server, prompt};

pub async fn history(server: &Server, uid: &str) -> Result<()> {
    let mut history = DataSourceHistory::new(server.connect()?);
    history.load(uid).await?;

    if let Some(ds) = history.datasource() {
        println!("{} ({}, id {})", ds.name, ds.kind, ds.id);
    }
    if history.versions().is_empty() {
        println!("No saved versions.");
        return Ok(());
    }
    println!("{:<10} {:<20}", "VERSION", "SAVED (UTC)");
    for version in history.versions() {
        println!("{:<10} {:<20}", version.version, format_timestamp(version.timestamp));
    }
    Ok(())
}

pub async fn view(server: &Server, uid: &str, version: &str) -> Result<()> {
    let mut history = DataSourceHistory::new(server.connect()?);
    history.load(uid).await?;

    let snapshot = history.view(version).await?;
    println!(
        "Version {} saved {} UTC",
        snapshot.version,
        format_timestamp(snapshot.timestamp)
    );
    println!("{}", pretty_data(snapshot));
    Ok(())
}

pub async fn restore(server: &Server, uid: &str, version: &str, yes: bool) -> Result<()> {
    let mut history = DataSourceHistory::new(server.connect()?);
    history.load(uid).await?;

    let target = history
        .find(version)
        .cloned()
        .with_context(|| format!("Version {version} not found for '{uid}'"))?;

    if !yes {
        let answer = prompt::line(&format!(
            "Restore '{uid}' to version {} from {} UTC? [y/N] ",
            target.version,
            format_timestamp(target.timestamp)
        ))?;
        if !answer.eq_ignore_ascii_case("y") {
            println!("Restore cancelled.");
            return Ok(());
        }
    }

    history.restore(&target).await?;
    for notice in history.take_notices() {
        eprintln!("✓ {notice}");
    }
    println!("✓ Restored '{uid}' to version {}", target.version);
    Ok(())
}
