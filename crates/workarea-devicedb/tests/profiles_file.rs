use std::fs;

use tempfile::TempDir;
use workarea_devicedb::{DeviceError, DeviceManager, DeviceProfile, MachineProfileProvider};

#[test]
fn test_load_profiles_document() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("profiles.json");
    fs::write(
        &path,
        r#"{
            "active": "k40",
            "profiles": [
                {"id": "k40", "name": "K40 Laser",
                 "x_axis": {"speed": 9000.0},
                 "y_axis": {"speed": 7200.0},
                 "z_axis": {"speed": 100.0}},
                {"id": "prusa", "name": "Prusa"}
            ]
        }"#,
    )
    .unwrap();

    let manager = DeviceManager::load(&path).unwrap();
    assert_eq!(manager.profile_count(), 2);

    let speeds = manager.axis_speeds().unwrap();
    assert_eq!(speeds.x, 9000.0);
    assert_eq!(speeds.y, 7200.0);
    assert_eq!(speeds.z, 100.0);
}

#[test]
fn test_active_must_exist() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("profiles.json");
    fs::write(&path, r#"{"active": "ghost", "profiles": []}"#).unwrap();
    assert!(matches!(
        DeviceManager::load(&path),
        Err(DeviceError::ProfileNotFound(_))
    ));
}

#[test]
fn test_save_and_reload() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("profiles.json");

    let mut profile = DeviceProfile::new("router", "Router");
    profile.x_axis.speed = 2500.0;
    let manager = DeviceManager::with_profile(profile).unwrap();
    manager.save_to(&path).unwrap();

    let reloaded = DeviceManager::load(&path).unwrap();
    assert_eq!(reloaded.active_profile().unwrap().id, "router");
    assert_eq!(reloaded.axis_speeds().unwrap().x, 2500.0);
    reloaded.save().unwrap();
}

#[test]
fn test_corrupt_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("profiles.json");
    fs::write(&path, "[").unwrap();
    assert!(matches!(
        DeviceManager::load(&path),
        Err(DeviceError::SerializationError(_))
    ));
}
