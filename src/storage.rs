//! Persistence for saved documents.
//!
//! The store is deliberately small: documents are keyed by sequential ids, and every write
//! goes through validation so an interim placeholder or an unknown format can never be
//! saved. `MemStorage` keeps everything in memory; other backends implement
//! [`DocumentStore`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::document::Document;
use crate::{Error, Result};

pub const DEFAULT_TITLE: &str = "Untitled Document";
pub const DEFAULT_FORMAT: &str = "script";

/// Document formats the editor knows how to dictate into.
pub const FORMATS: &[&str] = &[DEFAULT_FORMAT];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDocument {
    pub id: u64,
    pub title: String,
    pub content: Document,
    pub format: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating a document. Everything has a default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewDocument {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default)]
    pub content: Document,

    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for NewDocument {
    fn default() -> Self {
        Self {
            title: default_title(),
            content: Document::new(),
            format: default_format(),
        }
    }
}

/// A partial update. Absent fields are left as they are.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentPatch {
    pub title: Option<String>,
    pub content: Option<Document>,
    pub format: Option<String>,
}

fn default_title() -> String {
    DEFAULT_TITLE.to_owned()
}

fn default_format() -> String {
    DEFAULT_FORMAT.to_owned()
}

pub trait DocumentStore {
    fn get(&self, id: u64) -> Option<StoredDocument>;

    /// All documents, ordered by id.
    fn list(&self) -> Vec<StoredDocument>;

    fn create(&mut self, new: NewDocument) -> Result<StoredDocument>;

    /// Apply `patch` to document `id`. Fails with [`Error::NotFound`] for unknown ids.
    fn update(&mut self, id: u64, patch: DocumentPatch) -> Result<StoredDocument>;

    /// Remove document `id`, returning whether it existed.
    fn delete(&mut self, id: u64) -> bool;
}

#[derive(Debug)]
pub struct MemStorage {
    documents: BTreeMap<u64, StoredDocument>,
    next_id: u64,
}

impl Default for MemStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemStorage {
    pub fn new() -> Self {
        Self {
            documents: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl DocumentStore for MemStorage {
    fn get(&self, id: u64) -> Option<StoredDocument> {
        self.documents.get(&id).cloned()
    }

    fn list(&self) -> Vec<StoredDocument> {
        self.documents.values().cloned().collect()
    }

    fn create(&mut self, new: NewDocument) -> Result<StoredDocument> {
        validate_title(&new.title)?;
        validate_format(&new.format)?;
        validate_content(&new.content)?;

        let id = self.next_id;
        self.next_id += 1;

        let now = Utc::now();
        let doc = StoredDocument {
            id,
            title: new.title,
            content: new.content,
            format: new.format,
            created_at: now,
            updated_at: now,
        };
        self.documents.insert(id, doc.clone());
        debug!(id, "document created");
        Ok(doc)
    }

    fn update(&mut self, id: u64, patch: DocumentPatch) -> Result<StoredDocument> {
        if let Some(title) = &patch.title {
            validate_title(title)?;
        }
        if let Some(format) = &patch.format {
            validate_format(format)?;
        }
        if let Some(content) = &patch.content {
            validate_content(content)?;
        }

        let doc = self.documents.get_mut(&id).ok_or(Error::NotFound(id))?;
        if let Some(title) = patch.title {
            doc.title = title;
        }
        if let Some(content) = patch.content {
            doc.content = content;
        }
        if let Some(format) = patch.format {
            doc.format = format;
        }
        doc.updated_at = Utc::now();

        debug!(id, "document updated");
        Ok(doc.clone())
    }

    fn delete(&mut self, id: u64) -> bool {
        let existed = self.documents.remove(&id).is_some();
        debug!(id, existed, "document delete");
        existed
    }
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::validation("title must not be empty"));
    }
    Ok(())
}

fn validate_format(format: &str) -> Result<()> {
    if !FORMATS.contains(&format) {
        return Err(Error::validation(format!(
            "unknown format '{format}' (expected one of: {})",
            FORMATS.join(", ")
        )));
    }
    Ok(())
}

fn validate_content(content: &Document) -> Result<()> {
    if content.has_interim() {
        return Err(Error::validation(
            "content contains an interim placeholder and cannot be persisted",
        ));
    }
    Ok(())
}
