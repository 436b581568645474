//! Folder picker: type-ahead search, inline creation and default selection.

use dashgate_types::{Folder, FolderChoice, FolderHit, FolderOption};
use serde_json::json;

use crate::api::{ApiResult, Backend, from_value};
use crate::config::Config;
use crate::notice::Notice;

pub const SEARCH_PATH: &str = "/api/search";
pub const FOLDERS_PATH: &str = "/api/folders";

/// Caller-supplied picker settings.
#[derive(Debug, Clone)]
pub struct FolderPickerProps {
    /// Label of the root folder (id 0).
    pub root_name: String,
    /// Offer a "keep current" entry labeled `initial_title`.
    pub enable_reset: bool,
    pub initial_title: String,
    pub initial_folder_id: Option<i64>,
    /// Set when picking for an already saved dashboard.
    pub dashboard_id: Option<i64>,
    /// Editors can save into the root folder.
    pub is_editor: bool,
}

impl Default for FolderPickerProps {
    fn default() -> Self {
        Self {
            root_name: "General".to_string(),
            enable_reset: false,
            initial_title: String::new(),
            initial_folder_id: None,
            dashboard_id: None,
            is_editor: true,
        }
    }
}

impl FolderPickerProps {
    pub fn from_config(config: &Config) -> Self {
        Self {
            root_name: config.folders.root_name.clone(),
            is_editor: config.folders.is_editor,
            ..Default::default()
        }
    }

    fn root_option(&self) -> FolderOption {
        FolderOption::new(self.root_name.clone(), Some(0))
    }

    fn reset_option(&self) -> FolderOption {
        FolderOption::new(self.initial_title.clone(), None)
    }
}

pub struct FolderPicker<B> {
    backend: B,
    props: FolderPickerProps,
    folders: Vec<FolderOption>,
    notices: Vec<Notice>,
}

impl<B: Backend> FolderPicker<B> {
    pub fn new(backend: B, props: FolderPickerProps) -> Self {
        Self {
            backend,
            props,
            folders: Vec::new(),
            notices: Vec::new(),
        }
    }

    /// Options loaded by [`FolderPicker::initial_value`].
    pub fn folders(&self) -> &[FolderOption] {
        &self.folders
    }

    /// Drains notices raised since the last call.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Searches editable folders matching `query`.
    ///
    /// Editors get the root folder first when its name matches the query
    /// prefix; with reset enabled an empty query also offers the initial
    /// title ahead of everything.
    ///
    /// # Errors
    /// Returns an error if the search request fails.
    pub async fn options(&self, query: &str) -> ApiResult<Vec<FolderOption>> {
        let params = [
            ("query", query.to_string()),
            ("type", "dash-folder".to_string()),
            ("permission", "Edit".to_string()),
        ];
        let hits: Vec<FolderHit> = from_value(self.backend.get(SEARCH_PATH, &params).await?)?;
        tracing::debug!(query, hits = hits.len(), "folder search");

        let mut options: Vec<FolderOption> = hits.into_iter().map(FolderOption::from).collect();

        if self.props.is_editor
            && self
                .props
                .root_name
                .to_lowercase()
                .starts_with(&query.to_lowercase())
        {
            options.insert(0, self.props.root_option());
        }

        if self.props.enable_reset && query.is_empty() && !self.props.initial_title.is_empty() {
            options.insert(0, self.props.reset_option());
        }

        Ok(options)
    }

    /// Resolves a picked entry into the folder to report.
    ///
    /// No selection means the root folder; a free-text entry is created
    /// first. Entries without a valid id (reset entry, failed creation)
    /// report nothing.
    ///
    /// # Errors
    /// Returns an error if folder creation fails at the transport level.
    pub async fn choose(&mut self, selection: Option<FolderOption>) -> ApiResult<Option<FolderChoice>> {
        let folder = match selection {
            None => self.props.root_option(),
            Some(option) if option.is_new => self.create_folder(&option.label).await?,
            Some(option) => option,
        };

        Ok(match folder.value {
            Some(id) if id > -1 => Some(FolderChoice {
                id: Some(id),
                title: folder.label,
            }),
            _ => None,
        })
    }

    /// Creates a folder named `title`.
    ///
    /// A response without a usable id yields a `-1` "Not created" entry and
    /// an error notice.
    ///
    /// # Errors
    /// Returns an error if the request fails.
    pub async fn create_folder(&mut self, title: &str) -> ApiResult<FolderOption> {
        let created: Folder =
            from_value(self.backend.post(FOLDERS_PATH, &json!({ "title": title })).await?)?;

        if created.id > -1 {
            tracing::info!(id = created.id, title = %created.title, "folder created");
            self.notices.push(Notice::success("Folder Created", "OK"));
            Ok(FolderOption::new(created.title, Some(created.id)))
        } else {
            tracing::warn!(title, "folder could not be created");
            self.notices.push(Notice::error("Folder could not be created"));
            Ok(FolderOption::new("Not created", Some(-1)))
        }
    }

    /// Picks the folder to preselect when the picker opens.
    ///
    /// Returns the choice only when it differs from `initial_folder_id`.
    ///
    /// # Errors
    /// Returns an error if the initial search fails.
    pub async fn initial_value(&mut self) -> ApiResult<Option<FolderChoice>> {
        let options = self.options("").await?;
        self.folders.clone_from(&options);

        let props = &self.props;
        let explicit = match props.initial_folder_id {
            Some(id) if id != 0 => options.iter().find(|o| o.value == Some(id)).cloned(),
            None if props.enable_reset && !props.initial_title.is_empty() => {
                Some(props.reset_option())
            }
            _ => None,
        };

        let folder = explicit.unwrap_or_else(|| {
            if props.is_editor {
                props.root_option()
            } else if props.dashboard_id.is_some() {
                // Never move a saved dashboard into a folder the user did not pick.
                props.reset_option()
            } else {
                options
                    .first()
                    .cloned()
                    .unwrap_or_else(|| props.reset_option())
            }
        });

        if folder.value == props.initial_folder_id {
            return Ok(None);
        }
        Ok(Some(FolderChoice {
            id: folder.value,
            title: folder.label,
        }))
    }
}
