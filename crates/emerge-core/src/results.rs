//! Result data model: one [`FileResult`] per scanned file, one [`EntityResult`]
//! per lexically scoped entity found inside it.
//!
//! Results live in a [`ResultSet`] arena and refer to each other through
//! [`FileId`] / [`EntityId`] handles, so an entity's back-reference to its file
//! is a plain index instead of a pointer.

use crate::analysis::Analysis;
use crate::error::{Error, Result};
use crate::language::LanguageType;
use crate::statistics::StatisticsKey;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Metric key → numeric or structured value, filled by the metrics pass.
pub type Metrics = BTreeMap<String, serde_json::Value>;

/// Stable handle of a [`FileResult`] inside a [`ResultSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct FileId(pub usize);

/// Stable handle of an [`EntityResult`] inside a [`ResultSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(pub usize);

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file#{}", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

/// Everything a file reader knows about a file before extraction.
#[derive(Debug, Clone, Default)]
pub struct ScannedFile {
    /// Path on disk.
    pub scanned_file_name: String,
    /// Path relative to the analysis root; doubles as the unique key.
    pub relative_file_path_to_analysis: String,
    pub absolute_name: String,
    pub display_name: String,
    pub module_name: String,
    /// Identifier of the language parser that produced this file.
    pub scanned_by: String,
    pub scanned_language: Option<LanguageType>,
    /// Raw tokens including `"\n"` markers.
    pub scanned_tokens: Vec<String>,
}

/// The most basic result of a file scan: identity, raw tokens, annotation slots.
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    #[serde(skip)]
    analysis: Arc<Analysis>,
    scanned_file_name: String,
    relative_file_path_to_analysis: String,
    relative_analysis_path: PathBuf,
    absolute_name: String,
    display_name: String,
    unique_name: String,
    module_name: String,
    scanned_by: String,
    scanned_language: LanguageType,
    scanned_tokens: Vec<String>,
    scanned_import_dependencies: Vec<String>,
    metrics: Metrics,
}

impl FileResult {
    /// Build a file result, checking only that the required fields are present.
    pub fn create(analysis: Arc<Analysis>, file: ScannedFile) -> Result<Self> {
        if file.scanned_file_name.is_empty() {
            return Err(Error::MissingField {
                field: "scanned_file_name",
            });
        }
        if file.relative_file_path_to_analysis.is_empty() {
            return Err(Error::MissingField {
                field: "relative_file_path_to_analysis",
            });
        }
        let Some(scanned_language) = file.scanned_language else {
            return Err(Error::MissingField {
                field: "scanned_language",
            });
        };

        let relative_analysis_path = Path::new(&file.relative_file_path_to_analysis)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Ok(Self {
            analysis,
            scanned_file_name: file.scanned_file_name,
            unique_name: file.relative_file_path_to_analysis.clone(),
            relative_file_path_to_analysis: file.relative_file_path_to_analysis,
            relative_analysis_path,
            absolute_name: file.absolute_name,
            display_name: file.display_name,
            module_name: file.module_name,
            scanned_by: file.scanned_by,
            scanned_language,
            scanned_tokens: file.scanned_tokens,
            scanned_import_dependencies: Vec::new(),
            metrics: Metrics::new(),
        })
    }

    pub fn analysis(&self) -> &Arc<Analysis> {
        &self.analysis
    }

    pub fn scanned_file_name(&self) -> &str {
        &self.scanned_file_name
    }

    pub fn relative_file_path_to_analysis(&self) -> &str {
        &self.relative_file_path_to_analysis
    }

    /// Changing the relative path does not move `relative_analysis_path`,
    /// which is fixed at construction.
    pub fn set_relative_file_path_to_analysis(&mut self, value: impl Into<String>) {
        self.relative_file_path_to_analysis = value.into();
    }

    pub fn relative_analysis_path(&self) -> &Path {
        &self.relative_analysis_path
    }

    pub fn absolute_name(&self) -> &str {
        &self.absolute_name
    }

    pub fn set_absolute_name(&mut self, value: impl Into<String>) {
        self.absolute_name = value.into();
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn set_display_name(&mut self, value: impl Into<String>) {
        self.display_name = value.into();
    }

    pub fn unique_name(&self) -> &str {
        &self.unique_name
    }

    pub fn set_unique_name(&mut self, value: impl Into<String>) {
        self.unique_name = value.into();
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn set_module_name(&mut self, value: impl Into<String>) {
        self.module_name = value.into();
    }

    pub fn scanned_by(&self) -> &str {
        &self.scanned_by
    }

    pub fn scanned_language(&self) -> LanguageType {
        self.scanned_language
    }

    pub fn scanned_tokens(&self) -> &[String] {
        &self.scanned_tokens
    }

    pub fn scanned_import_dependencies(&self) -> &[String] {
        &self.scanned_import_dependencies
    }

    pub fn set_scanned_import_dependencies(&mut self, value: Vec<String>) {
        self.scanned_import_dependencies = value;
    }

    pub fn scanned_import_dependencies_mut(&mut self) -> &mut Vec<String> {
        &mut self.scanned_import_dependencies
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn set_metrics(&mut self, value: Metrics) {
        self.metrics = value;
    }

    pub fn metrics_mut(&mut self) -> &mut Metrics {
        &mut self.metrics
    }
}

impl fmt::Display for FileResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "File result: {}", self.unique_name)?;
        writeln!(f, "  tokens: {}", self.scanned_tokens.len())?;
        writeln!(
            f,
            "  import dependencies: {:?}",
            self.scanned_import_dependencies
        )?;
        writeln!(f, "  scanned by: {}", self.scanned_by)?;
        writeln!(f, "  module name: {}", self.module_name)?;
        write!(f, "  metrics: {:?}", self.metrics)
    }
}

/// The source of one extracted entity (e.g. a class) plus its annotation slots.
#[derive(Debug, Clone, Serialize)]
pub struct EntityResult {
    #[serde(skip)]
    analysis: Arc<Analysis>,
    scanned_file_name: String,
    entity_name: String,
    unique_name: String,
    absolute_name: String,
    display_name: String,
    module_name: String,
    scanned_by: String,
    scanned_language: LanguageType,
    scanned_tokens: Vec<String>,
    scanned_import_dependencies: Vec<String>,
    scanned_inheritance_dependencies: Vec<String>,
    metrics: Metrics,
    parent_file_result: FileId,
}

impl EntityResult {
    /// Create an entity found inside `parent`, which lives at handle `parent_id`.
    ///
    /// The absolute name is always `parent.absolute_name + "/" + entity_name`.
    pub fn from_file_scope(
        parent: &FileResult,
        parent_id: FileId,
        entity_name: impl Into<String>,
        scanned_tokens: Vec<String>,
    ) -> Self {
        let entity_name = entity_name.into();
        Self {
            analysis: Arc::clone(&parent.analysis),
            scanned_file_name: parent.scanned_file_name.clone(),
            absolute_name: format!("{}/{}", parent.absolute_name, entity_name),
            display_name: entity_name.clone(),
            unique_name: entity_name.clone(),
            entity_name,
            module_name: parent.module_name.clone(),
            scanned_by: parent.scanned_by.clone(),
            scanned_language: parent.scanned_language,
            scanned_tokens,
            scanned_import_dependencies: Vec::new(),
            scanned_inheritance_dependencies: Vec::new(),
            metrics: Metrics::new(),
            parent_file_result: parent_id,
        }
    }

    pub fn analysis(&self) -> &Arc<Analysis> {
        &self.analysis
    }

    pub fn scanned_file_name(&self) -> &str {
        &self.scanned_file_name
    }

    pub fn entity_name(&self) -> &str {
        &self.entity_name
    }

    pub fn set_entity_name(&mut self, value: impl Into<String>) {
        self.entity_name = value.into();
    }

    pub fn unique_name(&self) -> &str {
        &self.unique_name
    }

    pub fn set_unique_name(&mut self, value: impl Into<String>) {
        self.unique_name = value.into();
    }

    pub fn absolute_name(&self) -> &str {
        &self.absolute_name
    }

    pub fn set_absolute_name(&mut self, value: impl Into<String>) {
        self.absolute_name = value.into();
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn set_display_name(&mut self, value: impl Into<String>) {
        self.display_name = value.into();
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn set_module_name(&mut self, value: impl Into<String>) {
        self.module_name = value.into();
    }

    pub fn scanned_by(&self) -> &str {
        &self.scanned_by
    }

    pub fn scanned_language(&self) -> LanguageType {
        self.scanned_language
    }

    pub fn scanned_tokens(&self) -> &[String] {
        &self.scanned_tokens
    }

    pub fn scanned_import_dependencies(&self) -> &[String] {
        &self.scanned_import_dependencies
    }

    pub fn set_scanned_import_dependencies(&mut self, value: Vec<String>) {
        self.scanned_import_dependencies = value;
    }

    pub fn scanned_import_dependencies_mut(&mut self) -> &mut Vec<String> {
        &mut self.scanned_import_dependencies
    }

    pub fn scanned_inheritance_dependencies(&self) -> &[String] {
        &self.scanned_inheritance_dependencies
    }

    pub fn set_scanned_inheritance_dependencies(&mut self, value: Vec<String>) {
        self.scanned_inheritance_dependencies = value;
    }

    pub fn scanned_inheritance_dependencies_mut(&mut self) -> &mut Vec<String> {
        &mut self.scanned_inheritance_dependencies
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn set_metrics(&mut self, value: Metrics) {
        self.metrics = value;
    }

    pub fn metrics_mut(&mut self) -> &mut Metrics {
        &mut self.metrics
    }

    pub fn parent_file_result(&self) -> FileId {
        self.parent_file_result
    }

    /// Point this entity at another file. Prefer [`ResultSet::reparent`],
    /// which checks the handle.
    pub fn set_parent_file_result(&mut self, parent: FileId) {
        self.parent_file_result = parent;
    }
}

impl fmt::Display for EntityResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Entity result: {}", self.unique_name)?;
        writeln!(f, "  entity name: {}", self.entity_name)?;
        writeln!(f, "  tokens: {}", self.scanned_tokens.len())?;
        writeln!(
            f,
            "  import dependencies: {:?}",
            self.scanned_import_dependencies
        )?;
        writeln!(
            f,
            "  inheritance dependencies: {:?}",
            self.scanned_inheritance_dependencies
        )?;
        writeln!(f, "  scanned by: {}", self.scanned_by)?;
        writeln!(f, "  module name: {}", self.module_name)?;
        write!(f, "  metrics: {:?}", self.metrics)
    }
}

/// Arena owning all results of one analysis run.
#[derive(Debug, Default)]
pub struct ResultSet {
    files: Vec<FileResult>,
    entities: Vec<EntityResult>,
    /// Unique key (relative path at registration time) → file handle.
    file_index: BTreeMap<String, FileId>,
    /// File handle → entity handles, in insertion order.
    entity_index: BTreeMap<FileId, Vec<EntityId>>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file result under its relative path.
    pub fn add_file(&mut self, file: FileResult) -> Result<FileId> {
        let key = file.relative_file_path_to_analysis.clone();
        if self.file_index.contains_key(&key) {
            return Err(Error::DuplicateFile { unique_key: key });
        }
        let id = FileId(self.files.len());
        file.analysis
            .statistics
            .increment(StatisticsKey::ExtractedFileResults);
        self.files.push(file);
        self.file_index.insert(key, id);
        Ok(id)
    }

    /// Take ownership of extracted entities. Each one must point at a known file;
    /// if any does not, nothing is added.
    pub fn add_entities(
        &mut self,
        entities: impl IntoIterator<Item = EntityResult>,
    ) -> Result<Vec<EntityId>> {
        let entities: Vec<EntityResult> = entities.into_iter().collect();
        if let Some(orphan) = entities
            .iter()
            .find(|e| e.parent_file_result.0 >= self.files.len())
        {
            return Err(Error::UnknownFile(orphan.parent_file_result.0));
        }

        let mut ids = Vec::with_capacity(entities.len());
        for entity in entities {
            let parent = entity.parent_file_result;
            let id = EntityId(self.entities.len());
            self.entities.push(entity);
            self.entity_index.entry(parent).or_default().push(id);
            ids.push(id);
        }
        Ok(ids)
    }

    pub fn file(&self, id: FileId) -> Option<&FileResult> {
        self.files.get(id.0)
    }

    pub fn file_mut(&mut self, id: FileId) -> Option<&mut FileResult> {
        self.files.get_mut(id.0)
    }

    pub fn entity(&self, id: EntityId) -> Option<&EntityResult> {
        self.entities.get(id.0)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut EntityResult> {
        self.entities.get_mut(id.0)
    }

    /// Look up a file by the relative path it was registered with.
    pub fn find_file(&self, relative_path: &str) -> Option<FileId> {
        self.file_index.get(relative_path).copied()
    }

    /// Resolve an entity's back-reference.
    pub fn parent_of(&self, id: EntityId) -> Option<&FileResult> {
        let entity = self.entity(id)?;
        self.file(entity.parent_file_result)
    }

    /// Entities whose parent is `file`, in the order they were added.
    pub fn entities_of(&self, file: FileId) -> impl Iterator<Item = (EntityId, &EntityResult)> {
        self.entity_index
            .get(&file)
            .into_iter()
            .flatten()
            .filter_map(|id| self.entities.get(id.0).map(|e| (*id, e)))
    }

    /// Move an entity under another file.
    pub fn reparent(&mut self, entity: EntityId, new_parent: FileId) -> Result<()> {
        if new_parent.0 >= self.files.len() {
            return Err(Error::UnknownFile(new_parent.0));
        }
        let Some(target) = self.entities.get_mut(entity.0) else {
            return Err(Error::UnknownEntity(entity.0));
        };
        let old_parent = target.parent_file_result;
        target.parent_file_result = new_parent;

        if let Some(ids) = self.entity_index.get_mut(&old_parent) {
            ids.retain(|id| *id != entity);
            if ids.is_empty() {
                self.entity_index.remove(&old_parent);
            }
        }
        self.entity_index.entry(new_parent).or_default().push(entity);
        Ok(())
    }

    pub fn files(&self) -> impl Iterator<Item = (FileId, &FileResult)> {
        self.files.iter().enumerate().map(|(i, f)| (FileId(i), f))
    }

    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &EntityResult)> {
        self.entities
            .iter()
            .enumerate()
            .map(|(i, e)| (EntityId(i), e))
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanned(relative: &str) -> ScannedFile {
        ScannedFile {
            scanned_file_name: format!("/repo/{relative}"),
            relative_file_path_to_analysis: relative.to_string(),
            absolute_name: relative.to_string(),
            display_name: relative.rsplit('/').next().unwrap_or(relative).to_string(),
            module_name: "app".to_string(),
            scanned_by: "java".to_string(),
            scanned_language: Some(LanguageType::Java),
            scanned_tokens: vec!["class".into(), "A".into(), "{".into(), "}".into()],
        }
    }

    #[test]
    fn test_create_derives_relative_analysis_path() {
        let file = FileResult::create(Analysis::new("t"), scanned("src/app/Main.java")).unwrap();
        assert_eq!(file.relative_analysis_path(), Path::new("src/app"));
        assert_eq!(file.unique_name(), "src/app/Main.java");
    }

    #[test]
    fn test_relative_analysis_path_is_fixed() {
        let mut file =
            FileResult::create(Analysis::new("t"), scanned("src/app/Main.java")).unwrap();
        file.set_relative_file_path_to_analysis("other/Main.java");
        assert_eq!(file.relative_analysis_path(), Path::new("src/app"));
        assert_eq!(file.relative_file_path_to_analysis(), "other/Main.java");
    }

    #[test]
    fn test_root_level_file_has_empty_analysis_path() {
        let file = FileResult::create(Analysis::new("t"), scanned("Main.java")).unwrap();
        assert_eq!(file.relative_analysis_path(), Path::new(""));
    }

    #[test]
    fn test_create_rejects_missing_fields() {
        let mut file = scanned("Main.java");
        file.scanned_file_name.clear();
        let err = FileResult::create(Analysis::new("t"), file).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingField {
                field: "scanned_file_name"
            }
        ));

        let mut file = scanned("Main.java");
        file.scanned_language = None;
        let err = FileResult::create(Analysis::new("t"), file).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingField {
                field: "scanned_language"
            }
        ));

        // other identity fields may be empty
        let mut file = scanned("Main.java");
        file.display_name.clear();
        file.module_name.clear();
        file.scanned_by.clear();
        assert!(FileResult::create(Analysis::new("t"), file).is_ok());
    }

    #[test]
    fn test_entity_copies_parent_identity() {
        let file = FileResult::create(Analysis::new("t"), scanned("src/A.java")).unwrap();
        let entity = EntityResult::from_file_scope(&file, FileId(0), "A", vec!["class".into()]);
        assert_eq!(entity.absolute_name(), "src/A.java/A");
        assert_eq!(entity.unique_name(), "A");
        assert_eq!(entity.display_name(), "A");
        assert_eq!(entity.module_name(), "app");
        assert_eq!(entity.scanned_by(), "java");
        assert!(entity.scanned_inheritance_dependencies().is_empty());
        assert!(entity.metrics().is_empty());
        assert!(Arc::ptr_eq(entity.analysis(), file.analysis()));
    }

    #[test]
    fn test_display_summarizes() {
        let file = FileResult::create(Analysis::new("t"), scanned("src/A.java")).unwrap();
        let text = file.to_string();
        assert!(text.starts_with("File result: src/A.java"));
        assert!(text.contains("tokens: 4"));
    }
}
