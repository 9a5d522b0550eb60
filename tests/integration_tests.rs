//! Workspace integration: parse a kernel database from disk, refresh it,
//! write the result, and read it back.

use orrery_core::datadir::DataArea;
use orrery_core::kerneldb::refresh_kernel_db;
use orrery_core::versioned::VersionedPath;
use orrery_pvl::Document;
use std::path::Path;

fn touch(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, b"").unwrap();
}

#[test]
fn refresh_round_trips_through_the_data_area() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    touch(&root.join("base/kernels/lsk/naif0012.tls"));
    touch(&root.join("cassini/kernels/pck/cpck0003.tpc"));
    let area = DataArea::new(root);

    // Seed the data area with an existing kernel database version.
    let db_template = VersionedPath::new(area.expand("$cassini/kernels/pck/kernels.????.db"));
    let input_path = root.join("cassini/kernels/pck/kernels.0001.db");
    std::fs::write(
        &input_path,
        "Object = TargetAttitudeShape\n  Group = Selection\n    File = $cassini/kernels/pck/cpck????.tpc\n  End_Group\nEnd_Object\nEnd\n",
    )
    .unwrap();
    assert_eq!(db_template.highest().unwrap(), input_path);

    // Refresh and write to the next allocated version.
    let text = std::fs::read_to_string(&input_path).unwrap();
    let db = Document::parse(&text).unwrap();
    let latest = refresh_kernel_db(&db, &area, "2026-08-23T12:00:00").unwrap();
    let output_path = db_template.next().unwrap();
    assert_eq!(output_path, root.join("cassini/kernels/pck/kernels.0002.db"));
    std::fs::write(&output_path, latest.to_string()).unwrap();

    // The written file is the new highest version and round-trips.
    assert_eq!(db_template.highest().unwrap(), output_path);
    let reread = Document::parse(&std::fs::read_to_string(&output_path).unwrap()).unwrap();
    assert_eq!(reread, latest);

    let main = reread.find_object("TargetAttitudeShape").unwrap();
    assert_eq!(
        main.find_keyword("RunTime").unwrap().values,
        vec!["2026-08-23T12:00:00".to_string()]
    );
    assert_eq!(
        main.find_group("Dependencies")
            .unwrap()
            .find_keyword("LeapsecondKernel")
            .unwrap()
            .values,
        vec!["$base/kernels/lsk/naif0012.tls".to_string()]
    );
    let selections: Vec<_> = main
        .groups
        .iter()
        .filter(|g| g.is_named("Selection"))
        .collect();
    assert_eq!(selections.len(), 2);
    assert_eq!(
        selections[1].find_keyword("File").unwrap().values,
        vec!["$cassini/kernels/pck/cpck0003.tpc".to_string()]
    );
}
