//! Storage module for persisting crawl output
//!
//! This module defines the records produced per crawled page and the
//! storage seam (`ContentStore`/`SiteWriter`), with a local filesystem
//! backend that writes one text artifact per page.

mod filesystem;
mod traits;

pub use filesystem::FsStore;
pub use traits::{ContentStore, SiteWriter, StorageError, StorageResult};

use serde::{Deserialize, Serialize};

/// Everything captured for one successfully fetched page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,
    pub title: String,
    pub base_content: String,
    pub dynamic_states: Vec<DynamicState>,
}

/// Content captured after driving one control into one state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicState {
    pub element_type: ElementType,
    pub element_info: ElementInfo,
    pub content: String,
}

impl DynamicState {
    /// Label used in page artifacts, e.g. `region = Option B`
    pub fn label(&self) -> String {
        let info = &self.element_info;
        let control = if !info.name.is_empty() {
            info.name.as_str()
        } else if !info.id.is_empty() {
            info.id.as_str()
        } else {
            "(unnamed)"
        };
        let option = if info.option_text.is_empty() {
            info.option_value.as_str()
        } else {
            info.option_text.as_str()
        };
        format!("{} = {}", control, option)
    }
}

/// Kind of interactive control that produced a dynamic state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    Select,
}

impl ElementType {
    /// Heading used in page artifacts
    pub fn heading(&self) -> &'static str {
        match self {
            Self::Select => "SELECT",
        }
    }
}

/// Identifies the control and the option that was chosen
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementInfo {
    pub name: String,
    pub id: String,
    pub option_value: String,
    pub option_text: String,
}
