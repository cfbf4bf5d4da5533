mod common;

use common::{fixture, request, seeded};
use inv_core::{AssignMode, DuplicatePolicy, ImportRequest, SessionError, SessionEvent, SheetRow};

#[tokio::test]
async fn mixed_rows_import_and_skip() {
    let mut fx = fixture().await;
    let rows: Vec<SheetRow> = vec![
        ["12345", "SILLA"].into_iter().collect(),
        ["abc", "MESA"].into_iter().collect(),
        SheetRow::default(),
        ["0.5", "LAMPARA"].into_iter().collect(),
    ];
    let request = ImportRequest::new("mixto.xlsx", rows).with_area_label("AREA 3 ALMACEN");

    let summary = fx
        .session
        .import_spreadsheet(request, DuplicatePolicy::Ask)
        .await
        .unwrap();

    assert_eq!(summary.area, "3");
    assert_eq!(summary.imported, 2);
    assert_eq!(summary.skipped_rows(), 1);
    assert_eq!(summary.skipped[0].key_cell, "abc");
    assert!(fx.session.state().asset("12345").is_some());
    assert!(fx.session.state().asset("0.5").is_some());
    assert!(
        fx.session
            .state()
            .activity_log
            .last()
            .unwrap()
            .ends_with("Área 3: 2 bienes cargados. 1 filas omitidas.")
    );
}

#[tokio::test]
async fn same_file_is_refused_under_ask() {
    let mut fx = seeded().await;
    let before = fx.session.state().clone();

    let err = fx
        .session
        .import_spreadsheet(request("area7.xlsx", "7", &["10003"]), DuplicatePolicy::Ask)
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::DuplicateSourceFile { ref file_name } if file_name == "area7.xlsx"));
    assert!(err.needs_confirmation());
    assert_eq!(fx.session.state(), &before);
    assert!(!fx.session.is_importing());
}

#[tokio::test]
async fn append_keeps_both_imports() {
    let mut fx = seeded().await;
    fx.session
        .import_spreadsheet(request("area7.xlsx", "7", &["10003"]), DuplicatePolicy::Append)
        .await
        .unwrap();

    assert_eq!(fx.session.state().area_assets("7").count(), 3);
}

#[tokio::test]
async fn replace_drops_earlier_assets_of_the_file() {
    let mut fx = seeded().await;
    fx.session.assign("20001", AssignMode::Locate).unwrap();

    let summary = fx
        .session
        .import_spreadsheet(request("area7.xlsx", "7", &["10003"]), DuplicatePolicy::Replace)
        .await
        .unwrap();

    assert_eq!(summary.replaced, 2);
    let state = fx.session.state();
    assert!(state.asset("10001").is_none());
    assert!(state.asset("10003").is_some());
    assert!(state.asset("20001").unwrap().is_located());
    assert!(fx.session.is_probable_duplicate("10003"));
    assert!(!fx.session.is_probable_duplicate("10001"));
}

#[tokio::test]
async fn empty_grid_is_rejected_without_changes() {
    let mut fx = seeded().await;
    let before = fx.session.state().clone();

    let err = fx
        .session
        .import_sheet_grid("vacio.xlsx", Vec::new(), DuplicatePolicy::Ask)
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::Ingest(_)));
    assert_eq!(fx.session.state(), &before);
}

#[tokio::test]
async fn import_records_area_and_notifies() {
    let mut fx = fixture().await;
    let events = fx.session.subscribe();
    let request = request("area5.xlsx", "5", &["50001"]).with_responsible("MARIA PEREZ", "JEFA");

    fx.session
        .import_spreadsheet(request, DuplicatePolicy::Ask)
        .await
        .unwrap();

    let state = fx.session.state();
    assert_eq!(state.areas, ["5"]);
    assert_eq!(state.area_names.get("5").map(String::as_str), Some("AREA 5 OFICINAS"));
    assert_eq!(state.area_directory.get("5").unwrap().name, "MARIA PEREZ");

    let imported: Vec<SessionEvent> = events
        .try_iter()
        .filter(|e| matches!(e, SessionEvent::DataImported { .. }))
        .collect();
    assert_eq!(
        imported,
        [SessionEvent::DataImported {
            source_file: "area5.xlsx".into(),
            area: "5".into(),
            imported: 1,
            skipped: 0,
        }]
    );
}

#[tokio::test]
async fn import_reopens_a_completed_area() {
    let mut fx = seeded().await;
    fx.session.assign("10001", AssignMode::Locate).unwrap();
    fx.session.assign("10002", AssignMode::Locate).unwrap();
    assert!(fx.session.state().is_area_marked_complete("7"));

    fx.session
        .import_spreadsheet(request("area7-b.xlsx", "7", &["10003"]), DuplicatePolicy::Ask)
        .await
        .unwrap();
    assert!(!fx.session.state().is_area_marked_complete("7"));
}

#[tokio::test]
async fn csv_export_of_a_list_is_importable() {
    let mut fx = fixture().await;
    let path = fx.dir.path().join("area9.csv");
    let mut csv = String::new();
    for _ in 0..6 {
        csv.push_str(",,,,,,,,,,,\n");
    }
    csv.push_str(",,,,,,,,,,,LIBRO C\n");
    csv.push_str(",,,,,,,,,,,\n");
    csv.push_str(",,,,,,,,,,,\n");
    csv.push_str("AREA 9 BODEGA,,,,,,,,,,,\n");
    csv.push_str("CLAVE,DESCRIPCION,,,,,,,,,,\n");
    csv.push_str("90001,ESCRITORIO,,,,,,,,,,\n");
    std::fs::write(&path, csv).unwrap();

    let summary = fx
        .session
        .import_csv_file(&path, DuplicatePolicy::Ask)
        .await
        .unwrap();

    assert_eq!(summary.source_file, "area9.csv");
    assert_eq!(summary.area, "9");
    assert_eq!(summary.imported, 1);
    assert_eq!(fx.session.state().asset("90001").unwrap().list_type, "LIBRO C");
}

#[tokio::test]
async fn import_status_is_visible_outside_the_session() {
    let mut fx = fixture().await;
    let status = fx.session.import_status();
    let mut seen_active = Vec::new();

    fx.session
        .import_spreadsheet_with_progress(
            request("area5.xlsx", "5", &["50001", "50002"]),
            DuplicatePolicy::Ask,
            |_| seen_active.push(status.is_active()),
        )
        .await
        .unwrap();

    assert!(!seen_active.is_empty());
    assert!(seen_active.iter().all(|active| *active));
    assert!(!status.is_active());

    let handle = fx.session.into_handle();
    let locked = handle.lock().await;
    assert!(!status.is_active());
    drop(locked);
}
