use orrery_core::datadir::DataArea;
use orrery_core::kerneldb::{refresh_kernel_db, KernelDbError};
use orrery_pvl::Document;
use std::path::Path;

const RUN_TIME: &str = "2026-08-23T12:00:00";

fn touch(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, b"").unwrap();
}

/// Data area with two leapsecond kernels and two versioned PCKs.
fn test_area() -> (DataArea, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    touch(&root.join("base/kernels/lsk/naif0010.tls"));
    touch(&root.join("base/kernels/lsk/naif0012.tls"));
    touch(&root.join("cassini/kernels/pck/cpck0001.tpc"));
    touch(&root.join("cassini/kernels/pck/cpck0002.tpc"));
    (DataArea::new(root), dir)
}

fn source_db() -> Document {
    Document::parse(
        r#"
Object = TargetAttitudeShape
  RunTime = 2020-01-01T00:00:00
  Group = Dependencies
    LeapsecondKernel = $base/kernels/lsk/naif0008.tls
  End_Group
  Group = Selection
    File = $cassini/kernels/pck/cpck????.tpc
    Time = ("2004 JAN 01", "2004 FEB 01")
  End_Group
  Group = Selection
    File = $cassini/kernels/pck/cpck05Feb2004.tpc
  End_Group
End_Object
End
"#,
    )
    .expect("parse")
}

#[test]
fn versioned_selection_appears_twice_with_resolved_copy() {
    let (area, _dir) = test_area();
    let out = refresh_kernel_db(&source_db(), &area, RUN_TIME).expect("refresh");

    let main = out.find_object("TargetAttitudeShape").expect("object");
    let selections: Vec<_> = main
        .groups
        .iter()
        .filter(|g| g.is_named("Selection"))
        .collect();
    assert_eq!(selections.len(), 3);

    // Original versioned group, byte-for-byte from the source.
    let original = selections[0];
    assert_eq!(
        original.find_keyword("File").unwrap().values,
        vec!["$cassini/kernels/pck/cpck????.tpc".to_string()]
    );
    assert!(original.comments.is_empty());

    // Resolved copy for legacy consumers: highest match, comment attached,
    // other keywords untouched.
    let resolved = selections[1];
    assert_eq!(
        resolved.find_keyword("File").unwrap().values,
        vec!["$cassini/kernels/pck/cpck0002.tpc".to_string()]
    );
    assert!(!resolved.comments.is_empty());
    assert_eq!(
        resolved.find_keyword("Time").unwrap().values,
        vec!["2004 JAN 01".to_string(), "2004 FEB 01".to_string()]
    );
}

#[test]
fn concrete_selection_passes_through_once() {
    let (area, _dir) = test_area();
    let out = refresh_kernel_db(&source_db(), &area, RUN_TIME).expect("refresh");

    let main = out.find_object("TargetAttitudeShape").expect("object");
    let concrete: Vec<_> = main
        .groups
        .iter()
        .filter(|g| {
            g.is_named("Selection")
                && g.find_keyword("File")
                    .is_some_and(|k| k.values == vec!["$cassini/kernels/pck/cpck05Feb2004.tpc"])
        })
        .collect();
    assert_eq!(concrete.len(), 1, "no rewritten duplicate for concrete paths");
    assert!(concrete[0].comments.is_empty());
}

#[test]
fn run_time_and_leapsecond_dependency_are_fresh() {
    let (area, _dir) = test_area();
    let out = refresh_kernel_db(&source_db(), &area, RUN_TIME).expect("refresh");

    let main = out.find_object("TargetAttitudeShape").expect("object");
    assert_eq!(
        main.find_keyword("RunTime").unwrap().values,
        vec![RUN_TIME.to_string()]
    );

    let dependencies: Vec<_> = main
        .groups
        .iter()
        .filter(|g| g.is_named("Dependencies"))
        .collect();
    assert_eq!(dependencies.len(), 1, "stale Dependencies group not carried");
    assert_eq!(
        dependencies[0].find_keyword("LeapsecondKernel").unwrap().values,
        vec!["$base/kernels/lsk/naif0012.tls".to_string()]
    );
}

#[test]
fn missing_target_object_is_fatal() {
    let (area, _dir) = test_area();
    let db = Document::parse("Object = SomethingElse\nEnd_Object\nEnd\n").expect("parse");
    match refresh_kernel_db(&db, &area, RUN_TIME) {
        Err(KernelDbError::MissingSection) => {}
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn missing_leapsecond_kernel_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    touch(&dir.path().join("cassini/kernels/pck/cpck0001.tpc"));
    std::fs::create_dir_all(dir.path().join("base/kernels/lsk")).unwrap();
    let area = DataArea::new(dir.path());

    match refresh_kernel_db(&source_db(), &area, RUN_TIME) {
        Err(KernelDbError::Leapsecond { .. }) => {}
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn unmatched_versioned_selection_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    touch(&dir.path().join("base/kernels/lsk/naif0012.tls"));
    std::fs::create_dir_all(dir.path().join("cassini/kernels/pck")).unwrap();
    let area = DataArea::new(dir.path());

    match refresh_kernel_db(&source_db(), &area, RUN_TIME) {
        Err(KernelDbError::SelectionFile { .. }) => {}
        other => panic!("unexpected: {other:?}"),
    }
}
