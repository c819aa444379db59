use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use rspolib::{POEntry, POFile, pofile};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::CatalogError;

// @module: Gettext catalog loading, mutation and persistence

// @const: Flag marking a translation that needs review
const FUZZY_FLAG: &str = "fuzzy";

// @const: Shape of every non-blank PO line: comment, keyword with a quoted string, or continuation
static PO_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(?:#.*|(?:msgctxt|msgid|msgid_plural|msgstr(?:\[\d+\])?)\s+".*"|".*")$"#).unwrap()
});

// @struct: Loaded PO catalog
pub struct Catalog {
    // @field: Parsed catalog, comments and obsolete entries included
    inner: POFile,

    // @field: File the catalog was read from
    path: PathBuf,
}

// @struct: Entry counts for the run summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub total: usize,
    pub translated: usize,
    pub fuzzy: usize,
    pub untranslated: usize,
}

impl fmt::Display for CatalogStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} entries ({} translated, {} fuzzy, {} untranslated)",
            self.total, self.translated, self.fuzzy, self.untranslated
        )
    }
}

/// Reject content the PO grammar cannot describe, reporting the first bad line
fn check_line_shapes(content: &str) -> Result<(), String> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || PO_LINE_REGEX.is_match(line) {
            continue;
        }
        return Err(format!("malformed line {}: {}", index + 1, line));
    }

    Ok(())
}

fn is_fuzzy(entry: &POEntry) -> bool {
    entry.flags.iter().any(|flag| flag == FUZZY_FLAG)
}

fn is_singular(entry: &POEntry) -> bool {
    entry.msgid_plural.is_none()
}

fn has_empty_msgstr(entry: &POEntry) -> bool {
    entry.msgstr.as_deref().map_or(true, str::is_empty)
}

fn is_translated(entry: &POEntry) -> bool {
    if is_singular(entry) {
        !has_empty_msgstr(entry)
    } else {
        entry.msgstr_plural.first().is_some_and(|form| !form.is_empty())
    }
}

impl Catalog {
    // @creates: Catalog parsed from a PO file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let load_error = |message: String| CatalogError::Load {
            path: path.to_path_buf(),
            message,
        };

        if !path.is_file() {
            return Err(load_error("file does not exist".to_string()));
        }

        let content = fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
        check_line_shapes(&content).map_err(load_error)?;
        let inner = pofile(content.as_str()).map_err(|e| load_error(e.to_string()))?;

        debug!("Loaded {} entries from {}", inner.entries.len(), path.display());

        Ok(Self {
            inner,
            path: path.to_path_buf(),
        })
    }

    /// Path the catalog was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Value of the `Language` header, empty when the header is absent
    pub fn declared_language(&self) -> String {
        self.inner
            .metadata
            .get("Language")
            .map(|language| language.trim().to_string())
            .unwrap_or_default()
    }

    fn active_entries(&self) -> impl Iterator<Item = &POEntry> {
        self.inner.entries.iter().filter(|entry| !entry.obsolete)
    }

    fn active_entries_mut(&mut self) -> impl Iterator<Item = &mut POEntry> {
        self.inner.entries.iter_mut().filter(|entry| !entry.obsolete)
    }

    /// Number of live entries, header and obsolete entries excluded
    pub fn len(&self) -> usize {
        self.active_entries().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_eligible(entry: &POEntry) -> bool {
        is_singular(entry) && !entry.msgid.is_empty() && !is_fuzzy(entry) && has_empty_msgstr(entry)
    }

    // @returns: Unique source strings of untranslated entries, first occurrence order
    pub fn eligible_entries(&self) -> Vec<String> {
        let mut seen = HashSet::new();

        self.active_entries()
            .filter(|entry| Self::is_eligible(entry))
            .map(|entry| entry.msgid.clone())
            .filter(|msgid| seen.insert(msgid.clone()))
            .collect()
    }

    /// Set `translated_text` on every untranslated singular entry whose source
    /// is exactly `source_text`
    ///
    /// Returns the number of entries updated. Zero is not an error: the source
    /// may have been deduplicated away or already filled in.
    pub fn apply(&mut self, source_text: &str, translated_text: &str) -> usize {
        if translated_text.is_empty() {
            return 0;
        }

        let mut updated = 0;
        for entry in self.active_entries_mut() {
            if !is_singular(entry) || entry.msgid != source_text || !has_empty_msgstr(entry) {
                continue;
            }
            entry.msgstr = Some(translated_text.to_string());
            updated += 1;
        }

        if updated == 0 {
            warn!(
                "No untranslated entry matches '{}' in {}; translation dropped",
                source_text,
                self.path.display()
            );
        }

        updated
    }

    /// Remove the fuzzy flag from every entry, returning how many were flagged
    pub fn strip_review_flag(&mut self) -> usize {
        let mut cleared = 0;

        for entry in self.active_entries_mut() {
            if is_fuzzy(entry) {
                entry.flags.retain(|flag| flag != FUZZY_FLAG);
                cleared += 1;
            }
        }

        cleared
    }

    pub fn stats(&self) -> CatalogStats {
        let mut stats = CatalogStats::default();

        for entry in self.active_entries() {
            stats.total += 1;
            if is_fuzzy(entry) {
                stats.fuzzy += 1;
            } else if is_translated(entry) {
                stats.translated += 1;
            } else {
                stats.untranslated += 1;
            }
        }

        stats
    }

    /// Write the catalog back to the file it came from
    pub fn save(&self) -> Result<(), CatalogError> {
        self.save_to(&self.path)
    }

    // @writes: Catalog to an arbitrary path
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), CatalogError> {
        let path = path.as_ref();

        fs::write(path, self.inner.to_string()).map_err(|e| CatalogError::Save {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        debug!("Saved catalog to {}", path.display());
        Ok(())
    }
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("path", &self.path)
            .field("language", &self.declared_language())
            .field("entries", &self.len())
            .finish()
    }
}
