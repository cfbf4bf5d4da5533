//! Export, restore and the read-only lockout.

mod common;

use common::{fixture, seeded};
use inv_core::{AssignMode, ExportKind, PhotoTarget, SessionError, SessionEvent};

#[tokio::test]
async fn final_package_restores_read_only() {
    let mut source = seeded().await;
    source.session.assign("10001", AssignMode::Locate).unwrap();
    source
        .session
        .attach_photo(&PhotoTarget::Inventory("10001".into()), b"jpeg")
        .await
        .unwrap();

    let package = source.session.export_package(ExportKind::Final).await.unwrap();
    assert!(package.file_name.starts_with("inventario-FINALIZADO-"));
    assert_eq!(package.photos, 1);
    assert!(!source.session.is_read_only());

    let mut target = fixture().await;
    let events = target.session.subscribe();
    let summary = target.session.restore_package(&package.bytes).await.unwrap();

    assert!(summary.read_only);
    assert_eq!(summary.photos, 1);
    assert!(target.session.is_read_only());
    assert!(target.session.state().asset("10001").unwrap().is_located());
    assert_eq!(
        target
            .session
            .photo(&PhotoTarget::Inventory("10001".into()))
            .await
            .unwrap()
            .as_deref(),
        Some(&b"jpeg"[..])
    );
    assert!(
        events
            .try_iter()
            .any(|e| e == SessionEvent::SessionRestored { read_only: true })
    );

    assert!(matches!(
        target.session.unassign("10001"),
        Err(SessionError::ReadOnly)
    ));
    assert!(target.session.export_package(ExportKind::Backup).await.is_ok());
}

#[tokio::test]
async fn backup_package_restores_editable() {
    let mut source = seeded().await;
    let package = source.session.export_package(ExportKind::Backup).await.unwrap();

    let mut target = fixture().await;
    let summary = target.session.restore_package(&package.bytes).await.unwrap();
    assert!(!summary.read_only);
    assert_eq!(target.session.state().inventory.len(), 3);
    assert!(target.session.is_probable_duplicate("20001"));
    target.session.assign("20001", AssignMode::Locate).unwrap();
}

#[tokio::test]
async fn garbage_package_leaves_session_untouched() {
    let mut fx = seeded().await;
    let before = fx.session.state().clone();

    let err = fx.session.restore_package(b"not a zip").await.unwrap_err();
    assert!(matches!(err, SessionError::Archive(_)));
    assert_eq!(fx.session.state(), &before);
    assert!(!fx.session.is_importing());
}

#[tokio::test]
async fn failed_save_locks_the_session() {
    let mut fx = seeded().await;
    let events = fx.session.subscribe();
    fx.backend.set_quota(Some(1));

    assert!(matches!(fx.session.save(), Err(SessionError::Persistence(_))));
    assert!(fx.session.is_read_only());
    assert!(events.try_iter().any(|e| e == SessionEvent::ReadOnlyEntered));

    let before = fx.session.state().asset("10002").unwrap().clone();
    assert!(matches!(
        fx.session.assign("10002", AssignMode::Locate),
        Err(SessionError::ReadOnly)
    ));
    assert_eq!(fx.session.state().asset("10002").unwrap(), &before);
}

#[tokio::test]
async fn failed_save_after_workflow_keeps_the_change() {
    let mut fx = seeded().await;
    let events = fx.session.subscribe();
    fx.backend.set_quota(Some(1));

    fx.session.assign("10001", AssignMode::Locate).unwrap();
    assert!(fx.session.state().asset("10001").unwrap().is_located());
    assert!(fx.session.is_read_only());
    assert!(fx.session.last_save_error().is_some());

    fx.session.assign("10001", AssignMode::Locate).unwrap_err();
    let entered = events
        .try_iter()
        .filter(|e| *e == SessionEvent::ReadOnlyEntered)
        .count();
    assert_eq!(entered, 1);
}

#[tokio::test]
async fn failed_restore_write_announces_read_only() {
    let mut source = seeded().await;
    let package = source.session.export_package(ExportKind::Backup).await.unwrap();

    let mut target = fixture().await;
    let events = target.session.subscribe();
    target.backend.set_quota(Some(1));

    let err = target.session.restore_package(&package.bytes).await.unwrap_err();
    assert!(matches!(err, SessionError::ReadOnly));
    assert!(target.session.is_read_only());
    assert!(target.session.state().inventory.is_empty());
    assert!(target.session.last_save_error().is_some());
    assert!(!target.session.is_importing());

    let events: Vec<_> = events.try_iter().collect();
    assert!(events.contains(&SessionEvent::ReadOnlyEntered));
    assert!(
        !events
            .iter()
            .any(|e| matches!(e, SessionEvent::SessionRestored { .. }))
    );
}

#[tokio::test]
async fn factory_reset_recovers_from_read_only() {
    let mut fx = seeded().await;
    fx.backend.set_quota(Some(1));
    fx.session.save().unwrap_err();
    fx.backend.set_quota(None);

    fx.session.factory_reset().await.unwrap();
    assert!(!fx.session.is_read_only());
    assert!(fx.session.state().inventory.is_empty());
    assert!(fx.session.last_save_error().is_none());
}
