//! Locale word corpus backed by `assets/locales/<tag>/<category>.txt` files.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock, RwLock};

use mocksmith_core::Locale;
use tracing::warn;

use crate::errors::GenerationError;

/// Capability to fetch locale-specific vocabulary.
pub trait WordSource: Send + Sync {
    /// Lines for `category`, walking the locale fallback chain; empty when none exist.
    fn wordlist(&self, locale: &Locale, category: &str) -> Vec<String>;

    fn clear_cache(&self);
}

#[derive(Debug, Clone)]
enum AssetEntry {
    Lines(Arc<Vec<String>>),
    Missing,
}

#[derive(Debug)]
pub struct AssetCorpus {
    root: PathBuf,
    cache: RwLock<BTreeMap<String, AssetEntry>>,
}

impl AssetCorpus {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lines of one asset file relative to the corpus root; `None` when it does not exist.
    pub fn load_lines(&self, relative: &str) -> Result<Option<Arc<Vec<String>>>, GenerationError> {
        if let Some(entry) = self.cached(relative) {
            return Ok(match entry {
                AssetEntry::Lines(values) => Some(values),
                AssetEntry::Missing => None,
            });
        }

        let entry = Self::read_lines(&self.root.join(relative))?;
        let mut cache = self
            .cache
            .write()
            .map_err(|_| GenerationError::Asset("asset cache poisoned".to_string()))?;
        cache.insert(relative.to_string(), entry.clone());

        Ok(match entry {
            AssetEntry::Lines(values) => Some(values),
            AssetEntry::Missing => None,
        })
    }

    pub fn cached_len(&self) -> usize {
        self.cache.read().map(|cache| cache.len()).unwrap_or(0)
    }

    fn cached(&self, relative: &str) -> Option<AssetEntry> {
        let cache = self.cache.read().ok()?;
        cache.get(relative).cloned()
    }

    fn read_lines(path: &Path) -> Result<AssetEntry, GenerationError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(AssetEntry::Missing);
            }
            Err(err) => {
                return Err(GenerationError::Asset(format!(
                    "failed to read asset {}: {}",
                    path.display(),
                    err
                )));
            }
        };

        let values = contents
            .lines()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| line.to_string())
            .collect();

        Ok(AssetEntry::Lines(Arc::new(values)))
    }
}

impl WordSource for AssetCorpus {
    fn wordlist(&self, locale: &Locale, category: &str) -> Vec<String> {
        for tag in locale.fallback_chain() {
            let relative = format!("locales/{tag}/{category}.txt");
            match self.load_lines(&relative) {
                Ok(Some(values)) if !values.is_empty() => return values.as_ref().clone(),
                Ok(_) => continue,
                Err(err) => {
                    warn!(asset = %relative, error = %err, "skipping unreadable corpus file");
                }
            }
        }
        Vec::new()
    }

    fn clear_cache(&self) {
        match self.cache.write() {
            Ok(mut cache) => cache.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }
}

/// Corpus shipped with this crate.
pub fn asset_corpus() -> &'static AssetCorpus {
    static CORPUS: OnceLock<AssetCorpus> = OnceLock::new();
    CORPUS.get_or_init(|| {
        let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets");
        AssetCorpus::new(root)
    })
}

/// Shared handle to the bundled corpus for components that own an `Arc<dyn WordSource>`.
pub fn default_word_source() -> Arc<dyn WordSource> {
    static SOURCE: OnceLock<Arc<BundledCorpus>> = OnceLock::new();
    SOURCE.get_or_init(|| Arc::new(BundledCorpus)).clone()
}

struct BundledCorpus;

impl WordSource for BundledCorpus {
    fn wordlist(&self, locale: &Locale, category: &str) -> Vec<String> {
        asset_corpus().wordlist(locale, category)
    }

    fn clear_cache(&self) {
        asset_corpus().clear_cache();
    }
}
