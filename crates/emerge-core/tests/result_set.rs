use emerge_core::Error;
use emerge_core::analysis::Analysis;
use emerge_core::language::LanguageType;
use emerge_core::results::*;
use emerge_core::statistics::StatisticsKey;
use std::sync::Arc;

fn make_file(analysis: &Arc<Analysis>, relative: &str) -> FileResult {
    FileResult::create(
        Arc::clone(analysis),
        ScannedFile {
            scanned_file_name: format!("/work/{relative}"),
            relative_file_path_to_analysis: relative.to_string(),
            absolute_name: relative.to_string(),
            display_name: relative.to_string(),
            module_name: "pkg".to_string(),
            scanned_by: "kotlin".to_string(),
            scanned_language: Some(LanguageType::Kotlin),
            scanned_tokens: Vec::new(),
        },
    )
    .unwrap()
}

#[test]
fn test_add_file_indexes_by_relative_path() {
    let analysis = Analysis::new("run");
    let mut results = ResultSet::new();
    let id = results.add_file(make_file(&analysis, "src/A.kt")).unwrap();

    assert_eq!(results.find_file("src/A.kt"), Some(id));
    assert_eq!(results.file(id).unwrap().unique_name(), "src/A.kt");
    assert_eq!(
        analysis
            .statistics
            .get(StatisticsKey::ExtractedFileResults),
        1
    );
}

#[test]
fn test_duplicate_file_rejected() {
    let analysis = Analysis::new("run");
    let mut results = ResultSet::new();
    results.add_file(make_file(&analysis, "src/A.kt")).unwrap();
    let err = results.add_file(make_file(&analysis, "src/A.kt")).unwrap_err();
    assert!(matches!(err, Error::DuplicateFile { .. }));
    assert_eq!(results.file_count(), 1);
}

#[test]
fn test_entities_resolve_parent() {
    let analysis = Analysis::new("run");
    let mut results = ResultSet::new();
    let file_id = results.add_file(make_file(&analysis, "src/A.kt")).unwrap();
    let file = results.file(file_id).unwrap();
    let entities = vec![
        EntityResult::from_file_scope(file, file_id, "A", vec!["class".into()]),
        EntityResult::from_file_scope(file, file_id, "B", vec!["class".into()]),
    ];
    let ids = results.add_entities(entities).unwrap();

    assert_eq!(ids.len(), 2);
    let parent = results.parent_of(ids[1]).unwrap();
    assert_eq!(parent.relative_file_path_to_analysis(), "src/A.kt");
    let names: Vec<&str> = results
        .entities_of(file_id)
        .map(|(_, e)| e.entity_name())
        .collect();
    assert_eq!(names, ["A", "B"]);
}

#[test]
fn test_absolute_name_follows_parent() {
    let analysis = Analysis::new("run");
    let mut results = ResultSet::new();
    let file_id = results.add_file(make_file(&analysis, "src/A.kt")).unwrap();
    let file = results.file(file_id).unwrap();
    let entity = EntityResult::from_file_scope(file, file_id, "Foo", Vec::new());
    let ids = results.add_entities([entity]).unwrap();

    let entity = results.entity(ids[0]).unwrap();
    let parent = results.parent_of(ids[0]).unwrap();
    assert_eq!(
        entity.absolute_name(),
        format!("{}/{}", parent.absolute_name(), entity.entity_name())
    );
}

#[test]
fn test_add_entities_rejects_unknown_parent() {
    let analysis = Analysis::new("run");
    let file = make_file(&analysis, "src/A.kt");
    let orphan = EntityResult::from_file_scope(&file, FileId(7), "A", Vec::new());

    let mut results = ResultSet::new();
    let err = results.add_entities([orphan]).unwrap_err();
    assert!(matches!(err, Error::UnknownFile(7)));
}

#[test]
fn test_add_entities_is_all_or_nothing() {
    let analysis = Analysis::new("run");
    let mut results = ResultSet::new();
    let file_id = results.add_file(make_file(&analysis, "src/A.kt")).unwrap();
    let file = results.file(file_id).unwrap();
    let good = EntityResult::from_file_scope(file, file_id, "A", Vec::new());
    let orphan = EntityResult::from_file_scope(file, FileId(9), "B", Vec::new());

    let err = results.add_entities([good, orphan]).unwrap_err();
    assert!(matches!(err, Error::UnknownFile(9)));
    assert_eq!(results.entity_count(), 0);
    assert_eq!(results.entities_of(file_id).count(), 0);
}

#[test]
fn test_reparent_moves_entity() {
    let analysis = Analysis::new("run");
    let mut results = ResultSet::new();
    let a = results.add_file(make_file(&analysis, "src/A.kt")).unwrap();
    let b = results.add_file(make_file(&analysis, "src/B.kt")).unwrap();
    let file_a = results.file(a).unwrap();
    let entity = EntityResult::from_file_scope(file_a, a, "X", Vec::new());
    let ids = results.add_entities([entity]).unwrap();

    results.reparent(ids[0], b).unwrap();
    assert_eq!(results.entity(ids[0]).unwrap().parent_file_result(), b);
    assert_eq!(results.entities_of(a).count(), 0);
    assert_eq!(results.entities_of(b).count(), 1);

    assert!(matches!(
        results.reparent(ids[0], FileId(9)),
        Err(Error::UnknownFile(9))
    ));
    assert!(matches!(
        results.reparent(EntityId(4), a),
        Err(Error::UnknownEntity(4))
    ));
}

#[test]
fn test_annotation_slots_are_writable() {
    let analysis = Analysis::new("run");
    let mut results = ResultSet::new();
    let file_id = results.add_file(make_file(&analysis, "src/A.kt")).unwrap();
    let file = results.file(file_id).unwrap();
    let entity = EntityResult::from_file_scope(file, file_id, "A", Vec::new());
    let ids = results.add_entities([entity]).unwrap();

    let file = results.file_mut(file_id).unwrap();
    file.set_scanned_import_dependencies(vec!["kotlin.io".to_string()]);
    file.metrics_mut()
        .insert("sloc".to_string(), serde_json::json!(42));
    file.set_unique_name("A.kt");

    let entity = results.entity_mut(ids[0]).unwrap();
    entity
        .scanned_inheritance_dependencies_mut()
        .push("Base".to_string());
    entity.set_unique_name("pkg.A");

    assert_eq!(results.file(file_id).unwrap().metrics()["sloc"], 42);
    assert_eq!(results.file(file_id).unwrap().unique_name(), "A.kt");
    // the lookup key is fixed at registration time
    assert_eq!(results.find_file("src/A.kt"), Some(file_id));
    let entity = results.entity(ids[0]).unwrap();
    assert_eq!(entity.scanned_inheritance_dependencies(), ["Base"]);
    assert_eq!(entity.unique_name(), "pkg.A");
}

#[test]
fn test_results_serialize_without_analysis() {
    let analysis = Analysis::new("run");
    let file = make_file(&analysis, "src/A.kt");
    let json = serde_json::to_value(&file).unwrap();
    assert_eq!(json["relative_file_path_to_analysis"], "src/A.kt");
    assert_eq!(json["scanned_language"], "kotlin");
    assert!(json.get("analysis").is_none());
}
