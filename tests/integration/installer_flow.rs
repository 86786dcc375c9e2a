//! Swap-window guarantees of the atomic installer, driven through the
//! public API.

use crate::common::make_tree;
use upkeep::UpkeepError;
use upkeep::installer::{activate, backup_path};

#[test]
fn successful_swap_replaces_tree_and_leaves_no_backup() {
    let temp = tempfile::tempdir().unwrap();
    let install = temp.path().join("app");
    let candidate = temp.path().join("candidate");
    make_tree(&install, &[("bin/app", "old-binary"), ("conf.toml", "old")]);
    make_tree(
        &candidate,
        &[("bin/app", "new-binary"), ("conf.toml", "new"), (".upkeep-url", "https://example.com/v2")],
    );

    activate(&install, &candidate).unwrap();

    assert_eq!(std::fs::read_to_string(install.join("bin/app")).unwrap(), "new-binary");
    assert_eq!(std::fs::read_to_string(install.join("conf.toml")).unwrap(), "new");
    assert_eq!(
        std::fs::read_to_string(install.join(".upkeep-url")).unwrap(),
        "https://example.com/v2"
    );
    assert!(!backup_path(&install).exists());
}

#[test]
fn step_failures_are_distinguishable() {
    let temp = tempfile::tempdir().unwrap();

    // Step 1: nothing at the installation path yet
    let missing_install = temp.path().join("never-installed");
    let candidate = temp.path().join("candidate");
    make_tree(&candidate, &[("app.txt", "new")]);

    let step1 = activate(&missing_install, &candidate).unwrap_err();
    assert!(matches!(
        step1.downcast_ref::<UpkeepError>(),
        Some(UpkeepError::BackupFailed { .. })
    ));

    // Step 2: live tree renamed aside, then the candidate vanishes
    let install = temp.path().join("app");
    make_tree(&install, &[("app.txt", "old")]);
    let gone = temp.path().join("vanished-candidate");

    let step2 = activate(&install, &gone).unwrap_err();
    match step2.downcast_ref::<UpkeepError>() {
        Some(UpkeepError::ActivateFailed { backup, .. }) => {
            // The unsafe intermediate state is fully described: the
            // installation path is gone and the named backup has the tree
            assert!(!install.exists());
            assert_eq!(
                std::fs::read_to_string(backup.join("app.txt")).unwrap(),
                "old"
            );
        }
        other => panic!("expected ActivateFailed, got {other:?}"),
    }
}
