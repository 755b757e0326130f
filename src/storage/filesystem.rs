//! Local filesystem backend
//!
//! Layout:
//!
//! ```text
//! <root>/
//!   batch_summary.json
//!   example.com/
//!     index.txt
//!     about.txt
//!     crawl_summary.txt
//!     crawl_summary.json
//! ```

use super::{ContentStore, PageRecord, SiteWriter, StorageError, StorageResult};
use crate::crawler::{BatchResult, CrawlSummary};
use crate::output::{
    artifact_stem, format_batch_json, format_page_text, format_summary_json, format_summary_text,
    SUMMARY_JSON_FILE, SUMMARY_TEXT_FILE,
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};
use url::Url;

/// Writes crawl output under a root directory, one subdirectory per seed
#[derive(Debug)]
pub struct FsStore {
    root: PathBuf,
    batch_file: String,
    /// Site directories handed out in this process, so two seeds never share one
    claimed: Mutex<HashSet<PathBuf>>,
}

impl FsStore {
    /// Creates a store rooted at `root`
    ///
    /// # Arguments
    ///
    /// * `root` - Output directory; created on first use
    /// * `batch_file` - File name of the batch summary inside `root`
    pub fn new(root: impl Into<PathBuf>, batch_file: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            batch_file: batch_file.into(),
            claimed: Mutex::new(HashSet::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn claimed(&self) -> MutexGuard<'_, HashSet<PathBuf>> {
        self.claimed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Directory name for a seed: host without `www.` plus path, `/` mapped to `_`
pub fn site_dir_name(seed: &Url) -> String {
    let host = seed.host_str().unwrap_or("site");
    let host = host.strip_prefix("www.").unwrap_or(host);

    let mut raw = match seed.port() {
        Some(port) => format!("{}_{}", host, port),
        None => host.to_string(),
    };
    let path = seed.path().trim_matches('/');
    if !path.is_empty() {
        raw.push('_');
        raw.push_str(&path.replace('/', "_"));
    }

    let name = sanitize_filename::sanitize(&raw);
    if name.is_empty() {
        "site".to_string()
    } else {
        name
    }
}

impl ContentStore for FsStore {
    fn open_site(&self, seed: &Url) -> StorageResult<Box<dyn SiteWriter>> {
        let base = site_dir_name(seed);

        let dir = {
            let mut claimed = self.claimed();
            let mut n = 1;
            loop {
                let candidate = if n == 1 {
                    self.root.join(&base)
                } else {
                    self.root.join(format!("{}-{}", base, n))
                };
                if claimed.insert(candidate.clone()) {
                    break candidate;
                }
                n += 1;
            }
        };

        std::fs::create_dir_all(&dir)?;
        info!("Created output directory: {}", dir.display());

        Ok(Box::new(FsSiteWriter {
            dir,
            used_names: HashSet::new(),
        }))
    }

    fn write_batch(&self, batch: &BatchResult) -> StorageResult<String> {
        std::fs::create_dir_all(&self.root)?;
        let path = self.root.join(&self.batch_file);
        std::fs::write(&path, format_batch_json(batch)?)?;
        info!("Batch summary saved to {}", path.display());
        Ok(path.display().to_string())
    }
}

/// Writes the artifacts of one site into its directory
#[derive(Debug)]
pub struct FsSiteWriter {
    dir: PathBuf,
    used_names: HashSet<String>,
}

impl FsSiteWriter {
    /// Picks an unused artifact name, suffixing `-2`, `-3`, ... on collision
    fn unique_name(&mut self, stem: &str) -> String {
        let mut n = 1;
        loop {
            let name = if n == 1 {
                format!("{}.txt", stem)
            } else {
                format!("{}-{}.txt", stem, n)
            };
            let reserved = name == SUMMARY_TEXT_FILE;
            if !reserved && self.used_names.insert(name.clone()) {
                return name;
            }
            n += 1;
        }
    }
}

impl SiteWriter for FsSiteWriter {
    fn location(&self) -> String {
        self.dir.display().to_string()
    }

    fn write_page(&mut self, page: &PageRecord) -> StorageResult<String> {
        let url = Url::parse(&page.url)
            .map_err(|e| StorageError::InvalidLocation(format!("{}: {}", page.url, e)))?;
        let name = self.unique_name(&artifact_stem(&url));
        let path = self.dir.join(&name);

        std::fs::write(&path, format_page_text(page))?;
        debug!("Saved {} to {}", page.url, path.display());
        Ok(name)
    }

    fn write_summary(&mut self, summary: &CrawlSummary) -> StorageResult<String> {
        let text_path = self.dir.join(SUMMARY_TEXT_FILE);
        std::fs::write(&text_path, format_summary_text(summary))?;
        std::fs::write(
            self.dir.join(SUMMARY_JSON_FILE),
            format_summary_json(summary)?,
        )?;

        info!("Crawl summary saved to {}", text_path.display());
        Ok(text_path.display().to_string())
    }
}
