//! Comment filtering and scope-based entity extraction for emerge.
//!
//! Turns a file's raw token stream into comment-free tokens, finds entity
//! declarations through keyword + grammar matching, and captures each entity's
//! token span by tracking scope depth.

pub mod comments;
pub mod grammar;
pub mod languages;
pub mod scopes;
pub mod tokenizer;

use emerge_core::Error;
use emerge_core::results::{EntityResult, FileId, ResultSet};
use languages::LanguageRegistry;
use rayon::prelude::*;

/// Outcome of extracting every file of a result set.
#[derive(Debug, Default)]
pub struct ParallelExtraction {
    /// Entities of all files, grouped by file in file order.
    pub entities: Vec<EntityResult>,
    /// Files whose extraction failed on a configuration error.
    pub failures: Vec<(FileId, Error)>,
    /// Files with no parser registered for their language.
    pub skipped: Vec<FileId>,
}

/// Extract entities from all files in parallel, one rayon task per file.
///
/// The parser is looked up by the file's `scanned_by` name first, then by its
/// language tag.
pub fn generate_entity_results_parallel(
    results: &ResultSet,
    registry: &LanguageRegistry,
) -> ParallelExtraction {
    let files: Vec<_> = results.files().collect();

    let outcomes: Vec<_> = files
        .par_iter()
        .map(|(id, file)| {
            let parser = registry
                .get(file.scanned_by())
                .or_else(|| registry.for_language(file.scanned_language()));
            (*id, parser.map(|p| p.parse(file, *id)))
        })
        .collect();

    let mut extraction = ParallelExtraction::default();
    for (id, outcome) in outcomes {
        match outcome {
            Some(Ok(entities)) => extraction.entities.extend(entities),
            Some(Err(e)) => extraction.failures.push((id, e)),
            None => {
                tracing::debug!(file = %id, "no parser for file, skipping");
                extraction.skipped.push(id);
            }
        }
    }
    extraction
}
