use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Oldest store layout that is still understood
pub const STORE_VERSION: u32 = 2;

/// Keys of the viewer position inside [`Bookmark::view_data`]
pub const VIEW_PAGE: &str = "page";
pub const VIEW_PAN_X: &str = "pan_x";
pub const VIEW_PAN_Y: &str = "pan_y";
pub const VIEW_ZOOM_LEVEL: &str = "zoom_level";
pub const VIEW_ROTATION: &str = "rotation";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub title: String,
    /// Page number (1-based)
    pub page: usize,
    pub created_on: DateTime<Utc>,
    #[serde(default)]
    pub view_data: BTreeMap<String, i64>,
    /// Automatic "where I left off" record rather than a user bookmark
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub last_view: bool,
}

impl Bookmark {
    pub fn new(title: impl Into<String>, page: usize) -> Self {
        Self {
            title: title.into(),
            page,
            created_on: Utc::now(),
            view_data: BTreeMap::new(),
            last_view: false,
        }
    }

    pub fn last_view(page: usize) -> Self {
        Self {
            last_view: true,
            ..Self::new("last view", page)
        }
    }

    #[must_use]
    pub fn with_view(mut self, key: &str, value: i64) -> Self {
        self.view_data.insert(key.to_string(), value);
        self
    }

    pub fn view(&self, key: &str) -> Option<i64> {
        self.view_data.get(key).copied()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileBookmarks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_view: Option<Bookmark>,
    #[serde(default)]
    pub bookmarks: Vec<Bookmark>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookmarkStore {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    files: BTreeMap<String, FileBookmarks>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_file: Option<String>,
    #[serde(skip)]
    file_path: Option<PathBuf>,
}

impl BookmarkStore {
    pub fn ephemeral() -> Self {
        Self {
            version: STORE_VERSION,
            files: BTreeMap::new(),
            last_file: None,
            file_path: None,
        }
    }

    pub fn with_file(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: Some(file_path.into()),
            ..Self::ephemeral()
        }
    }

    pub fn load_or_ephemeral(file_path: Option<&Path>) -> Self {
        match file_path {
            Some(path) => Self::load_from_file(path).unwrap_or_else(|e| {
                log::error!("Failed to load bookmarks from {}: {}", path.display(), e);
                Self::with_file(path)
            }),
            None => Self::ephemeral(),
        }
    }

    /// Read the store at `file_path`. A missing file gives an empty store;
    /// unparsable or outdated content is reset to an empty store.
    pub fn load_from_file(file_path: &Path) -> anyhow::Result<Self> {
        if !file_path.exists() {
            return Ok(Self::with_file(file_path));
        }
        let content = fs::read_to_string(file_path)?;
        let mut store = match serde_json::from_str::<Self>(&content) {
            Ok(store) if store.version >= STORE_VERSION => store,
            Ok(store) => {
                warn!(
                    "Bookmarks file {} has version {}, starting over",
                    file_path.display(),
                    store.version
                );
                Self::ephemeral()
            }
            Err(e) => {
                warn!("Corrupted bookmarks file {}: {e}", file_path.display());
                Self::ephemeral()
            }
        };
        store.file_path = Some(file_path.to_path_buf());
        Ok(store)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        match &self.file_path {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                let content = serde_json::to_string_pretty(self)?;
                fs::write(path, content)?;
                Ok(())
            }
            None => {
                // Ephemeral stores don't save to disk
                Ok(())
            }
        }
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            log::error!("Failed to save bookmarks: {}", e);
        }
    }

    pub fn last_view(&self, document: &str) -> Option<&Bookmark> {
        self.files.get(document)?.last_view.as_ref()
    }

    pub fn bookmarks(&self, document: &str) -> &[Bookmark] {
        self.files
            .get(document)
            .map(|f| f.bookmarks.as_slice())
            .unwrap_or_default()
    }

    /// Append a user bookmark, or replace the last view when
    /// `bookmark.last_view` is set
    pub fn add_bookmark(&mut self, document: &str, bookmark: Bookmark) {
        let file = self.files.entry(document.to_string()).or_default();
        if bookmark.last_view {
            file.last_view = Some(bookmark);
        } else {
            file.bookmarks.push(bookmark);
        }
        self.persist();
    }

    pub fn remove_bookmark(&mut self, document: &str, index: usize) -> Option<Bookmark> {
        let file = self.files.get_mut(document)?;
        if index >= file.bookmarks.len() {
            return None;
        }
        let removed = file.bookmarks.remove(index);
        self.persist();
        Some(removed)
    }

    /// Replace the user bookmarks of `document`; its last view is kept
    pub fn set_bookmarks(&mut self, document: &str, bookmarks: Vec<Bookmark>) {
        let file = self.files.entry(document.to_string()).or_default();
        file.bookmarks = bookmarks.into_iter().filter(|b| !b.last_view).collect();
        self.persist();
    }

    pub fn last_file(&self) -> Option<&str> {
        self.last_file.as_deref()
    }

    pub fn set_last_file(&mut self, document: &str) {
        self.last_file = Some(document.to_string());
        self.persist();
    }

    /// Drop every record
    pub fn clear(&mut self) {
        self.files.clear();
        self.last_file = None;
        self.persist();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FileBookmarks)> {
        self.files.iter()
    }
}
