//! End-to-end archive update flows against a wiremock release host.

use crate::common::{make_tree, tar_gz_bytes, zip_bytes};
use upkeep::{ArchiveLayout, UpdateCheck, UpdateOptions, UpdateOutcome, UpkeepError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MARKER: &str = ".upkeep-url";

/// Mounts the pointer redirect and the archive body, returning the
/// fingerprint (the versioned archive URL).
async fn mount_release(server: &MockServer, asset: &str, bytes: Vec<u8>) -> String {
    let versioned_url = format!("{}/releases/{asset}", server.uri());

    Mock::given(method("GET"))
        .and(path("/latest"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", versioned_url.as_str()))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/releases/{asset}")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes))
        .mount(server)
        .await;

    versioned_url
}

#[tokio::test]
async fn full_update_with_wrapping_tar_gz() {
    crate::common::init_tracing();
    let server = MockServer::start().await;
    let archive = tar_gz_bytes(&[("app/run.sh", "#!/bin/sh\necho v2\n"), ("app/data.txt", "v2")]);
    let fingerprint = mount_release(&server, "app-1.2.3.tar.gz", archive).await;

    let temp = tempfile::tempdir().unwrap();
    let install = temp.path().join("app");
    make_tree(&install, &[("old.txt", "v1")]);

    let options =
        UpdateOptions::new(format!("{}/latest", server.uri())).install_dir(&install);

    let outcome = upkeep::update(&options).await.unwrap();
    assert_eq!(
        outcome,
        UpdateOutcome::Installed {
            fingerprint: fingerprint.clone()
        }
    );

    // New tree is live, the wrapping directory was stripped
    assert_eq!(
        std::fs::read_to_string(install.join("run.sh")).unwrap(),
        "#!/bin/sh\necho v2\n"
    );
    assert_eq!(std::fs::read_to_string(install.join("data.txt")).unwrap(), "v2");

    // Old tree is gone, marker records the fingerprint, no backup remains
    assert!(!install.join("old.txt").exists());
    assert_eq!(std::fs::read_to_string(install.join(MARKER)).unwrap(), fingerprint);
    assert!(!temp.path().join("app.bak").exists());
}

#[tokio::test]
async fn noop_when_fingerprint_matches_marker() {
    crate::common::init_tracing();
    let server = MockServer::start().await;
    let versioned_url = format!("{}/releases/app-1.2.3.tar.gz", server.uri());

    Mock::given(method("GET"))
        .and(path("/latest"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("Location", versioned_url.as_str()),
        )
        .mount(&server)
        .await;

    // The archive endpoint must never be hit
    Mock::given(method("GET"))
        .and(path("/releases/app-1.2.3.tar.gz"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let temp = tempfile::tempdir().unwrap();
    let install = temp.path().join("app");
    make_tree(&install, &[("current.txt", "v1")]);
    std::fs::write(install.join(MARKER), format!("{versioned_url}\n")).unwrap();

    let options =
        UpdateOptions::new(format!("{}/latest", server.uri())).install_dir(&install);

    let outcome = upkeep::update(&options).await.unwrap();
    assert_eq!(outcome, UpdateOutcome::AlreadyCurrent);

    // Installation untouched
    assert_eq!(std::fs::read_to_string(install.join("current.txt")).unwrap(), "v1");
}

#[tokio::test]
async fn pointer_that_does_not_redirect_fails_resolution() {
    crate::common::init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_string("a body, not a redirect"))
        .mount(&server)
        .await;

    let temp = tempfile::tempdir().unwrap();
    let install = temp.path().join("app");
    make_tree(&install, &[("current.txt", "v1")]);

    let options =
        UpdateOptions::new(format!("{}/latest", server.uri())).install_dir(&install);

    let err = upkeep::update(&options).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<UpkeepError>(),
        Some(UpkeepError::ResolutionFailed { .. })
    ));

    // No marker was created or modified
    assert!(!install.join(MARKER).exists());
    assert_eq!(std::fs::read_to_string(install.join("current.txt")).unwrap(), "v1");
}

#[tokio::test]
async fn check_reports_available_then_up_to_date() {
    crate::common::init_tracing();
    let server = MockServer::start().await;
    let versioned_url = format!("{}/releases/app-2.0.0.tar.gz", server.uri());

    Mock::given(method("GET"))
        .and(path("/latest"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("Location", versioned_url.as_str()),
        )
        .mount(&server)
        .await;

    let temp = tempfile::tempdir().unwrap();
    let install = temp.path().join("app");
    make_tree(&install, &[("current.txt", "v1")]);

    let options =
        UpdateOptions::new(format!("{}/latest", server.uri())).install_dir(&install);

    assert_eq!(
        upkeep::check(&options).await.unwrap(),
        UpdateCheck::UpdateAvailable {
            fingerprint: versioned_url.clone()
        }
    );

    std::fs::write(install.join(MARKER), &versioned_url).unwrap();
    assert_eq!(upkeep::check(&options).await.unwrap(), UpdateCheck::UpToDate);
}

#[tokio::test]
async fn flat_zip_archive_installs_at_root() {
    crate::common::init_tracing();
    let server = MockServer::start().await;
    let archive = zip_bytes(&[("run.sh", "#!/bin/sh\n"), ("data.txt", "flat")]);
    let fingerprint = mount_release(&server, "app-0.9.0.zip", archive).await;

    let temp = tempfile::tempdir().unwrap();
    let install = temp.path().join("app");
    make_tree(&install, &[("old.txt", "v1")]);

    let options =
        UpdateOptions::new(format!("{}/latest", server.uri())).install_dir(&install);

    let outcome = upkeep::update(&options).await.unwrap();
    assert_eq!(outcome, UpdateOutcome::Installed { fingerprint });

    // Two top-level entries means auto-detect keeps the unpacked root
    assert_eq!(std::fs::read_to_string(install.join("data.txt")).unwrap(), "flat");
    assert!(install.join("run.sh").exists());
    assert!(!install.join("old.txt").exists());
}

#[tokio::test]
async fn forced_wrapping_rejects_flat_archive() {
    crate::common::init_tracing();
    let server = MockServer::start().await;
    let archive = tar_gz_bytes(&[("one.txt", "1"), ("two.txt", "2")]);
    mount_release(&server, "app-1.0.0.tar.gz", archive).await;

    let temp = tempfile::tempdir().unwrap();
    let install = temp.path().join("app");
    make_tree(&install, &[("current.txt", "v1")]);

    let options = UpdateOptions::new(format!("{}/latest", server.uri()))
        .install_dir(&install)
        .layout(ArchiveLayout::Wrapped);

    let err = upkeep::update(&options).await.unwrap_err();
    match err.downcast_ref::<UpkeepError>() {
        Some(UpkeepError::ArchiveRootMismatch { found }) => assert_eq!(*found, 2),
        other => panic!("expected ArchiveRootMismatch, got {other:?}"),
    }

    // The live tree was never touched
    assert_eq!(std::fs::read_to_string(install.join("current.txt")).unwrap(), "v1");
    assert!(!temp.path().join("app.bak").exists());
}

#[tokio::test]
async fn recheck_aborts_when_pointer_moves_mid_update() {
    crate::common::init_tracing();
    let server = MockServer::start().await;
    let first_url = format!("{}/releases/app-1.0.0.tar.gz", server.uri());
    let moved_url = format!("{}/releases/app-1.0.1.tar.gz", server.uri());

    // First probe resolves to 1.0.0, every later probe to 1.0.1
    Mock::given(method("GET"))
        .and(path("/latest"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", first_url.as_str()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/latest"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", moved_url.as_str()))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/releases/app-1.0.0.tar.gz"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(tar_gz_bytes(&[("app/run.sh", "#!/bin/sh\n")])),
        )
        .mount(&server)
        .await;

    let temp = tempfile::tempdir().unwrap();
    let install = temp.path().join("app");
    make_tree(&install, &[("current.txt", "v1")]);

    let options = UpdateOptions::new(format!("{}/latest", server.uri()))
        .install_dir(&install)
        .recheck_before_install(true);

    let err = upkeep::update(&options).await.unwrap_err();
    match err.downcast_ref::<UpkeepError>() {
        Some(UpkeepError::FingerprintMoved { expected, found }) => {
            assert_eq!(expected, &first_url);
            assert_eq!(found, &moved_url);
        }
        other => panic!("expected FingerprintMoved, got {other:?}"),
    }

    // Aborted before step 1 of the swap: live tree intact, no backup
    assert_eq!(std::fs::read_to_string(install.join("current.txt")).unwrap(), "v1");
    assert!(!temp.path().join("app.bak").exists());
}
