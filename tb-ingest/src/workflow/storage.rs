// Checkpoint storage
//
// Stage artifacts are whole-file JSON snapshots written atomically (temp file
// + rename); a snapshot's presence marks its stage complete. Resolution also
// keeps an append-only JSONL journal, one durable line per resolved recipe,
// so an interrupted run resumes at the first unresolved recipe.

use crate::types::{RecipeProducts, RecipeRecord, ResolvedRecipe, TrendingRecipe};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tb_common::config::ArtifactLayout;
use tb_common::{Error, Result};
use tracing::{debug, info, warn};

pub const TRENDING_FILE: &str = "trending_recipes.json";
pub const JOURNAL_FILE: &str = "recipe_journal.jsonl";
pub const COMBINED_INGREDIENTS_FILE: &str = "recipe_data.json";
pub const COMBINED_PRODUCTS_FILE: &str = "recipe_product_data.json";
pub const TWO_STAGE_INGREDIENTS_FILE: &str = "recipe_ingredients.json";
pub const TWO_STAGE_PRODUCTS_FILE: &str = "recipe_product_ingredients.json";

#[derive(Serialize, Deserialize)]
struct TrendingArtifact {
    trending_recipes: Vec<(String, i64)>,
}

#[derive(Serialize, Deserialize)]
struct IngredientsArtifact {
    recipe_ingredients: Map<String, Value>,
}

#[derive(Serialize)]
struct CombinedProductRow<'a> {
    name: &'a str,
    growth: i64,
    ingredients: Vec<i64>,
}

#[derive(Serialize)]
struct TwoStageProductRow<'a> {
    recipe: &'a str,
    ingredients: Vec<i64>,
}

/// Artifact folder for one layout
pub struct CheckpointStore {
    dir: PathBuf,
    layout: ArtifactLayout,
}

impl CheckpointStore {
    pub fn new(dir: impl Into<PathBuf>, layout: ArtifactLayout) -> Self {
        Self {
            dir: dir.into(),
            layout,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn layout(&self) -> ArtifactLayout {
        self.layout
    }

    pub fn trending_path(&self) -> PathBuf {
        self.dir.join(TRENDING_FILE)
    }

    pub fn journal_path(&self) -> PathBuf {
        self.dir.join(JOURNAL_FILE)
    }

    pub fn ingredients_path(&self) -> PathBuf {
        match self.layout {
            ArtifactLayout::Combined => self.dir.join(COMBINED_INGREDIENTS_FILE),
            ArtifactLayout::TwoStage => self.dir.join(TWO_STAGE_INGREDIENTS_FILE),
        }
    }

    pub fn products_path(&self) -> PathBuf {
        match self.layout {
            ArtifactLayout::Combined => self.dir.join(COMBINED_PRODUCTS_FILE),
            ArtifactLayout::TwoStage => self.dir.join(TWO_STAGE_PRODUCTS_FILE),
        }
    }

    pub fn trending_complete(&self) -> bool {
        self.trending_path().exists()
    }

    pub fn ingredients_complete(&self) -> bool {
        self.ingredients_path().exists()
    }

    // ------------------------------------------------------------------
    // Trending stage
    // ------------------------------------------------------------------

    pub fn load_trending(&self) -> Result<Option<Vec<TrendingRecipe>>> {
        let Some(artifact) = read_json::<TrendingArtifact>(&self.trending_path())? else {
            return Ok(None);
        };
        Ok(Some(
            artifact
                .trending_recipes
                .into_iter()
                .map(|(name, growth)| TrendingRecipe::new(name, growth))
                .collect(),
        ))
    }

    pub fn save_trending(&self, trending: &[TrendingRecipe]) -> Result<()> {
        let artifact = TrendingArtifact {
            trending_recipes: trending
                .iter()
                .map(|t| (t.name.clone(), t.growth_pct))
                .collect(),
        };
        write_json_atomic(&self.trending_path(), &artifact)
    }

    // ------------------------------------------------------------------
    // Resolution stage
    // ------------------------------------------------------------------

    /// Load the resolution artifact
    ///
    /// The two-stage artifact has no growth figures; they are taken from
    /// `trending` by name (0 for names not listed there).
    pub fn load_ingredients(&self, trending: &[TrendingRecipe]) -> Result<Option<Vec<RecipeRecord>>> {
        let path = self.ingredients_path();
        match self.layout {
            ArtifactLayout::Combined => read_json::<Vec<RecipeRecord>>(&path),
            ArtifactLayout::TwoStage => {
                let Some(artifact) = read_json::<IngredientsArtifact>(&path)? else {
                    return Ok(None);
                };
                let growth: HashMap<&str, i64> = trending
                    .iter()
                    .map(|t| (t.name.as_str(), t.growth_pct))
                    .collect();

                artifact
                    .recipe_ingredients
                    .into_iter()
                    .map(|(name, ingredients)| {
                        let ingredients: Vec<String> = serde_json::from_value(ingredients)?;
                        Ok(RecipeRecord {
                            growth: growth.get(name.as_str()).copied().unwrap_or(0),
                            name,
                            ingredients,
                        })
                    })
                    .collect::<Result<Vec<_>>>()
                    .map(Some)
            }
        }
    }

    pub fn save_ingredients(&self, records: &[RecipeRecord]) -> Result<()> {
        let path = self.ingredients_path();
        match self.layout {
            ArtifactLayout::Combined => write_json_atomic(&path, &records),
            ArtifactLayout::TwoStage => {
                let mut recipe_ingredients = Map::new();
                for record in records {
                    recipe_ingredients.insert(
                        record.name.clone(),
                        serde_json::to_value(&record.ingredients)?,
                    );
                }
                write_json_atomic(&path, &IngredientsArtifact { recipe_ingredients })
            }
        }
    }

    /// Recipes already resolved by an interrupted run, keyed by name
    ///
    /// Lines that fail to decode (a write torn by a crash) are skipped.
    pub fn load_journal(&self) -> Result<HashMap<String, ResolvedRecipe>> {
        let path = self.journal_path();
        let mut entries = HashMap::new();
        if !path.exists() {
            return Ok(entries);
        }

        let reader = BufReader::new(fs::File::open(&path)?);
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<ResolvedRecipe>(&line) {
                Ok(entry) => {
                    entries.entry(entry.name.clone()).or_insert(entry);
                }
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        line = index + 1,
                        error = %e,
                        "Skipping unreadable journal line"
                    );
                }
            }
        }

        info!(path = %path.display(), entries = entries.len(), "Loaded resolution journal");
        Ok(entries)
    }

    /// Append one resolved recipe and sync it to disk
    pub fn append_journal(&self, resolved: &ResolvedRecipe) -> Result<()> {
        let mut line = serde_json::to_vec(resolved)?;
        line.push(b'\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.journal_path())?;
        file.write_all(&line)?;
        file.sync_data()?;

        debug!(recipe = %resolved.name, "Journaled resolved recipe");
        Ok(())
    }

    /// Drop the journal once the stage artifact holds its content
    pub fn clear_journal(&self) -> Result<()> {
        match fs::remove_file(self.journal_path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    // ------------------------------------------------------------------
    // Matching stage
    // ------------------------------------------------------------------

    pub fn save_products(&self, products: &[RecipeProducts]) -> Result<()> {
        let path = self.products_path();
        match self.layout {
            ArtifactLayout::Combined => {
                let rows: Vec<_> = products
                    .iter()
                    .map(|p| CombinedProductRow {
                        name: &p.name,
                        growth: p.growth,
                        ingredients: p.product_ids.iter().copied().collect(),
                    })
                    .collect();
                write_json_atomic(&path, &rows)
            }
            ArtifactLayout::TwoStage => {
                let rows: Vec<_> = products
                    .iter()
                    .map(|p| TwoStageProductRow {
                        recipe: &p.name,
                        ingredients: p.product_ids.iter().copied().collect(),
                    })
                    .collect();
                write_json_atomic(&path, &rows)
            }
        }
    }
}

/// Read a JSON artifact; `None` when the file does not exist
fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)?;
    let value = serde_json::from_str(&content).map_err(|e| {
        Error::InvalidInput(format!("Unreadable checkpoint {}: {}", path.display(), e))
    })?;

    info!(path = %path.display(), "Loaded checkpoint");
    Ok(Some(value))
}

/// Write pretty JSON (four-space indent) via temp file + rename
///
/// The temp file is synced before the rename, so a renamed artifact always
/// has its data on disk when the journal is dropped afterwards.
fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::InvalidInput(format!("Invalid artifact path {}", path.display())))?;
    let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));

    let mut file = fs::File::create(&tmp_path)?;
    file.write_all(&buf)?;
    file.sync_all()?;
    drop(file);
    fs::rename(&tmp_path, path)?;

    info!(path = %path.display(), bytes = buf.len(), "Wrote checkpoint");
    Ok(())
}
