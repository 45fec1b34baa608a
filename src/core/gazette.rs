// LogAtlas - core/gazette.rs
//
// Country alias lookup table.
//
// The table is a tab-separated file with one row per country alias, in the
// column order of `GazetteRow`. Rows are indexed by slug; when two rows share
// a slug the later row replaces the earlier one.
//
// A process-wide instance can be loaded once with `init_global` and read
// from any thread afterwards through `global`.

use crate::core::geo::slugify_name;
use crate::util::constants;
use crate::util::error::GazetteError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;

/// One row of the country lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GazetteRow {
    pub country_id: String,
    pub country_al3id: String,
    pub country_numid: Option<i64>,
    pub tld_id: String,
    pub geonames_id: String,
    pub name: String,
    /// Lookup key. Derived from `name` when the cell is empty.
    pub slug: String,
    pub alt_name: Option<String>,
}

/// Slug-indexed country aliases.
#[derive(Debug, Default)]
pub struct CountryGazette {
    by_slug: HashMap<String, GazetteRow>,
    duplicate_slugs: usize,
}

static GLOBAL: OnceLock<CountryGazette> = OnceLock::new();

impl CountryGazette {
    /// Load the table at `path`. Set `has_headers` when the first row is a
    /// header row to skip.
    pub fn load(path: &Path, has_headers: bool) -> Result<Self, GazetteError> {
        let file = File::open(path).map_err(|e| GazetteError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let gazette = Self::read(file, has_headers, Some(path))?;

        tracing::info!(
            path = %path.display(),
            slugs = gazette.len(),
            duplicates = gazette.duplicate_slugs,
            "Country gazette loaded"
        );
        Ok(gazette)
    }

    /// Load a table from any reader.
    pub fn from_reader<R: Read>(reader: R, has_headers: bool) -> Result<Self, GazetteError> {
        Self::read(reader, has_headers, None)
    }

    fn read<R: Read>(
        reader: R,
        has_headers: bool,
        path: Option<&Path>,
    ) -> Result<Self, GazetteError> {
        // Columns are positional: a header row, when present, is skipped
        // rather than used to map columns by name.
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(constants::GAZETTE_DELIMITER)
            .has_headers(false)
            .quoting(false)
            .from_reader(reader);
        let csv_err = |e: csv::Error| GazetteError::Csv {
            path: path.map(Path::to_path_buf),
            source: e,
        };

        let mut gazette = Self::default();
        for record in csv_reader.records().skip(usize::from(has_headers)) {
            let row: GazetteRow = record.map_err(csv_err)?.deserialize(None).map_err(csv_err)?;
            gazette.insert(row);
        }
        Ok(gazette)
    }

    fn insert(&mut self, mut row: GazetteRow) {
        if row.slug.trim().is_empty() {
            row.slug = slugify_name(&row.name);
        }
        if let Some(previous) = self.by_slug.insert(row.slug.clone(), row) {
            self.duplicate_slugs += 1;
            tracing::debug!(
                slug = %previous.slug,
                replaced = %previous.name,
                "Duplicate gazette slug; later row wins"
            );
        }
    }

    /// Row for an exact slug.
    pub fn get(&self, slug: &str) -> Option<&GazetteRow> {
        self.by_slug.get(slug)
    }

    /// Row for a free-text country name, matched by its slug.
    pub fn resolve(&self, name: &str) -> Option<&GazetteRow> {
        self.get(&slugify_name(name))
    }

    /// Number of distinct slugs.
    pub fn len(&self) -> usize {
        self.by_slug.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_slug.is_empty()
    }

    /// Number of rows that replaced an earlier row with the same slug.
    pub fn duplicate_slugs(&self) -> usize {
        self.duplicate_slugs
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GazetteRow)> {
        self.by_slug.iter().map(|(slug, row)| (slug.as_str(), row))
    }

    /// Load the process-wide gazette on first call.
    ///
    /// Later calls return the instance that is already loaded without
    /// reading `path`. Call this before sharing the gazette across threads.
    pub fn init_global(path: &Path, has_headers: bool) -> Result<&'static Self, GazetteError> {
        if let Some(existing) = GLOBAL.get() {
            return Ok(existing);
        }
        let loaded = Self::load(path, has_headers)?;
        Ok(GLOBAL.get_or_init(|| loaded))
    }

    /// The process-wide gazette, if `init_global` has succeeded.
    pub fn global() -> Option<&'static Self> {
        GLOBAL.get()
    }
}
