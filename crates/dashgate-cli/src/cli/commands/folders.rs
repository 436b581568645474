//! Folder command handlers.

use anyhow::{Result, bail};
use dashgate_core::api::Backend;
use dashgate_core::config::Config;
use dashgate_core::folders::{FolderPicker, FolderPickerProps};
use dashgate_core::notice::{Notice, NoticeLevel};
use dashgate_types::{FolderChoice, FolderOption};

use crate::cli::{PickArgs, Server, prompt};

pub async fn search(server: &Server, config: &Config, query: &str) -> Result<()> {
    let picker = FolderPicker::new(server.connect()?, FolderPickerProps::from_config(config));
    let options = picker.options(query).await?;

    if options.is_empty() {
        println!("No folders found.");
        return Ok(());
    }
    for option in &options {
        println!("{:>6}  {}", format_id(option.value), option.label);
    }
    Ok(())
}

pub async fn create(server: &Server, config: &Config, title: &str) -> Result<()> {
    if title.trim().is_empty() {
        bail!("Folder title cannot be empty");
    }

    let mut picker = FolderPicker::new(server.connect()?, FolderPickerProps::from_config(config));
    let folder = picker.create_folder(title.trim()).await?;
    report(picker.take_notices());

    match folder.value {
        Some(id) if id > -1 => {
            println!("✓ Created folder '{}' (id {id})", folder.label);
            Ok(())
        }
        _ => bail!("Folder '{}' could not be created", title.trim()),
    }
}

pub async fn pick(server: &Server, config: &Config, args: &PickArgs) -> Result<()> {
    let props = FolderPickerProps {
        enable_reset: args.enable_reset,
        initial_title: args.initial_title.clone(),
        initial_folder_id: args.initial_id,
        dashboard_id: args.dashboard_id,
        ..FolderPickerProps::from_config(config)
    };
    let mut picker = FolderPicker::new(server.connect()?, props);

    let initial = picker.initial_value().await?;
    let default = default_option(&picker, initial.as_ref(), args.initial_id);

    let folders = picker.folders().to_vec();
    for (i, option) in folders.iter().enumerate() {
        let marker = if default.as_ref() == Some(option) { "*" } else { " " };
        println!("{marker} {}. {}", i + 1, option.label);
    }

    let input = prompt::line("Folder number or new folder title (empty keeps *): ")?;
    let selection = parse_selection(&input, &folders).or(default);

    let choice = picker.choose(selection).await?;
    report(picker.take_notices());

    match choice {
        Some(FolderChoice { id, title }) => println!("✓ Selected '{title}' (id {})", format_id(id)),
        None => println!("Folder unchanged."),
    }
    Ok(())
}

/// Option preselected when the picker opens.
fn default_option(
    picker: &FolderPicker<impl Backend>,
    initial: Option<&FolderChoice>,
    initial_id: Option<i64>,
) -> Option<FolderOption> {
    let wanted = initial.map_or(initial_id, |choice| choice.id);
    picker
        .folders()
        .iter()
        .find(|o| o.value == wanted && (wanted.is_some() || !o.label.is_empty()))
        .cloned()
}

/// A number picks a listed folder; any other text is a folder to create.
fn parse_selection(input: &str, folders: &[FolderOption]) -> Option<FolderOption> {
    if input.is_empty() {
        return None;
    }
    match input.parse::<usize>() {
        Ok(n) if (1..=folders.len()).contains(&n) => Some(folders[n - 1].clone()),
        _ => Some(FolderOption::custom(input)),
    }
}

fn format_id(id: Option<i64>) -> String {
    id.map_or_else(|| "-".to_string(), |id| id.to_string())
}

fn report(notices: Vec<Notice>) {
    for notice in notices {
        match notice.level {
            NoticeLevel::Success => eprintln!("✓ {notice}"),
            NoticeLevel::Warning | NoticeLevel::Error => eprintln!("! {notice}"),
        }
    }
}
