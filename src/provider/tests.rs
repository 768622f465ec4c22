use super::*;
use crate::error::SettingsError;
use crate::migrate::MigrationOutcome;
use crate::paths::Root;
use crate::serializer::Format;
use local::StoreOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Bounds {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
}

fn known() -> KnownTypes {
    KnownTypes::new().register::<Bounds>("bounds")
}

fn options(root: &Path, format: Format) -> StoreOptions {
    StoreOptions {
        root: Root::Dir(root.to_path_buf()),
        vendor: "NewVendor".into(),
        product: "App".into(),
        original_vendor: "OldVendor".into(),
        original_product: "OldApp".into(),
        filename: format!("settings.{}", format.extension()),
        format,
        ..StoreOptions::default()
    }
}

fn sample() -> SettingsMap {
    let bounds = Bounds {
        x: -8,
        y: 0,
        width: 1280,
        height: 720,
    };
    let mut map = SettingsMap::new();
    map.insert("startup".into(), SettingValue::Bool(false));
    map.insert("desktops".into(), SettingValue::Int(6));
    map.insert("scale".into(), SettingValue::Float(1.25));
    map.insert("wallpaper".into(), SettingValue::Text("C:\\pics\\a.png".into()));
    map.insert(
        "window".into(),
        SettingValue::custom("bounds", &bounds).unwrap(),
    );
    map
}

async fn fill(provider: &DictionaryProvider<LocalStore>, map: &SettingsMap) {
    for (key, value) in map {
        provider.set(key.clone(), value.clone()).await.unwrap();
    }
}

/// Writes `map` to the legacy location the way an old install would have.
async fn seed_legacy(root: &Path, format: Format, map: &SettingsMap) -> PathBuf {
    let mut legacy_opts = options(root, format);
    legacy_opts.vendor = "OldVendor".into();
    legacy_opts.product = "OldApp".into();
    let old = LocalSettingsProvider::new(&legacy_opts, known());
    fill(&old, map).await;
    old.save().await.unwrap();
    old.file_path().unwrap().to_path_buf()
}

#[tokio::test]
async fn test_round_trip_both_formats() {
    for format in [Format::Json, Format::Toml] {
        let tmp = TempDir::new().unwrap();
        let writer = LocalSettingsProvider::new(&options(tmp.path(), format), known());
        fill(&writer, &sample()).await;
        writer.save().await.unwrap();

        let reader = LocalSettingsProvider::new(&options(tmp.path(), format), known());
        reader.load().await.unwrap();
        assert_eq!(reader.snapshot().await, sample(), "format {}", format);
    }
}

#[tokio::test]
async fn test_load_without_file_is_empty() {
    let tmp = TempDir::new().unwrap();
    let provider = LocalSettingsProvider::new(&options(tmp.path(), Format::Json), known());
    provider.set("stale", true).await.unwrap();

    provider.load().await.unwrap();

    assert!(provider.is_empty().await);
    assert!(provider.available());
    assert!(!provider.file_path().unwrap().exists());
}

#[tokio::test]
async fn test_save_replaces_whole_document() {
    let tmp = TempDir::new().unwrap();
    let provider = LocalSettingsProvider::new(&options(tmp.path(), Format::Json), known());
    fill(&provider, &sample()).await;
    provider.save().await.unwrap();

    provider.clear().await;
    provider.set("only", 1i64).await.unwrap();
    provider.save().await.unwrap();

    let reader = LocalSettingsProvider::new(&options(tmp.path(), Format::Json), known());
    reader.load().await.unwrap();
    assert_eq!(reader.keys().await, vec!["only".to_string()]);

    let leftovers: Vec<_> = fs::read_dir(provider.file_path().unwrap().parent().unwrap())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn test_migrates_legacy_settings() {
    let tmp = TempDir::new().unwrap();
    let legacy_path = seed_legacy(tmp.path(), Format::Json, &sample()).await;
    let legacy_bytes = fs::read(&legacy_path).unwrap();

    let provider = LocalSettingsProvider::new(&options(tmp.path(), Format::Json), known());
    assert_eq!(provider.legacy_path(), Some(legacy_path.as_path()));
    let outcome = provider.load_or_migrate().await.unwrap();

    assert_eq!(
        outcome,
        MigrationOutcome::Migrated {
            from: legacy_path.clone()
        }
    );
    assert_eq!(provider.snapshot().await, sample());
    assert!(provider.file_path().unwrap().exists());
    assert_eq!(fs::read(&legacy_path).unwrap(), legacy_bytes);

    let reader = LocalSettingsProvider::new(&options(tmp.path(), Format::Json), known());
    reader.load().await.unwrap();
    assert_eq!(reader.snapshot().await, sample());
}

#[tokio::test]
async fn test_current_file_blocks_migration() {
    let tmp = TempDir::new().unwrap();
    seed_legacy(tmp.path(), Format::Json, &sample()).await;

    let current = LocalSettingsProvider::new(&options(tmp.path(), Format::Json), known());
    current.set("mine", "yes").await.unwrap();
    current.save().await.unwrap();

    let provider = LocalSettingsProvider::new(&options(tmp.path(), Format::Json), known());
    let outcome = provider.load_or_migrate().await.unwrap();

    assert_eq!(outcome, MigrationOutcome::Loaded);
    assert_eq!(provider.keys().await, vec!["mine".to_string()]);
}

#[tokio::test]
async fn test_fresh_start_creates_no_file() {
    let tmp = TempDir::new().unwrap();
    let provider = LocalSettingsProvider::new(&options(tmp.path(), Format::Toml), known());

    let outcome = provider.load_or_migrate().await.unwrap();

    assert_eq!(outcome, MigrationOutcome::Fresh);
    assert!(provider.is_empty().await);
    assert!(!provider.file_path().unwrap().exists());
}

#[tokio::test]
async fn test_corrupt_legacy_is_abandoned() {
    let tmp = TempDir::new().unwrap();
    let provider = LocalSettingsProvider::new(&options(tmp.path(), Format::Json), known());
    let legacy_path = provider.legacy_path().unwrap().to_path_buf();
    fs::create_dir_all(legacy_path.parent().unwrap()).unwrap();
    fs::write(&legacy_path, b"<settings>not json</settings>").unwrap();

    let outcome = provider.load_or_migrate().await.unwrap();

    assert!(matches!(outcome, MigrationOutcome::Abandoned { .. }));
    assert!(provider.is_empty().await);
    assert!(!provider.file_path().unwrap().exists());
}

#[tokio::test]
async fn test_unknown_type_in_file_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let writer = LocalSettingsProvider::new(&options(tmp.path(), Format::Json), known());
    fill(&writer, &sample()).await;
    writer.save().await.unwrap();

    let strict = LocalSettingsProvider::new(&options(tmp.path(), Format::Json), KnownTypes::new());
    let err = strict.load().await.unwrap_err();
    assert!(matches!(err, SettingsError::UnknownType { ref kind, .. } if kind == "bounds"));
}

#[tokio::test]
async fn test_set_rejects_unknown_kind() {
    let tmp = TempDir::new().unwrap();
    let provider = LocalSettingsProvider::new(&options(tmp.path(), Format::Json), known());
    let value = SettingValue::Custom {
        kind: "color".into(),
        data: serde_json::json!("#fff"),
    };
    assert!(provider.set("accent", value).await.is_err());
    assert!(provider.get("accent").await.is_none());
}

#[tokio::test]
async fn test_unavailable_provider_is_inert() {
    let tmp = TempDir::new().unwrap();
    let blocker = tmp.path().join("blocker");
    fs::write(&blocker, b"file, not a directory").unwrap();

    let provider = LocalSettingsProvider::new(&options(&blocker, Format::Json), known());
    assert!(!provider.available());
    assert!(provider.file_path().is_none());

    provider.set("a", 1i64).await.unwrap();
    provider.save().await.unwrap();
    provider.load().await.unwrap();
    assert!(provider.is_empty().await);
    assert_eq!(fs::read(&blocker).unwrap(), b"file, not a directory");
}

#[tokio::test]
async fn test_export_and_import() {
    let tmp = TempDir::new().unwrap();
    let provider = LocalSettingsProvider::new(&options(tmp.path(), Format::Json), known());
    fill(&provider, &sample()).await;

    let backup = tmp.path().join("backups").join("nightly.json");
    provider.export(&backup).await.unwrap();
    assert!(backup.exists());
    assert!(!provider.file_path().unwrap().exists());

    provider.clear().await;
    assert!(provider.import(&backup).await.unwrap());
    assert_eq!(provider.snapshot().await, sample());
    assert!(!provider.file_path().unwrap().exists());

    let missing = tmp.path().join("nope.json");
    assert!(!provider.import(&missing).await.unwrap());
    assert_eq!(provider.snapshot().await, sample());
}

#[tokio::test]
async fn test_accessors() {
    let provider = DictionaryProvider::new(MemoryStore::new("/mem/settings"), Arc::new(known()));
    assert!(provider.set("a", 1i64).await.unwrap().is_none());
    assert_eq!(provider.set("a", 2i64).await.unwrap(), Some(SettingValue::Int(1)));
    assert_eq!(provider.get("a").await, Some(SettingValue::Int(2)));
    assert_eq!(provider.len().await, 1);
    assert_eq!(provider.remove("a").await, Some(SettingValue::Int(2)));
    assert!(provider.is_empty().await);
}

#[tokio::test]
async fn test_memory_backend_round_trip() {
    let provider = DictionaryProvider::new(MemoryStore::new("/mem/settings"), Arc::new(known()));
    for (key, value) in sample() {
        provider.set(key, value).await.unwrap();
    }
    provider.save().await.unwrap();
    provider.clear().await;
    provider.load().await.unwrap();
    assert_eq!(provider.snapshot().await, sample());
}

fn tmp_leftovers(dir: &Path) -> Vec<PathBuf> {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.to_string_lossy().ends_with(".tmp"))
        .collect()
}

#[tokio::test]
async fn test_non_finite_float_never_reaches_disk() {
    let tmp = TempDir::new().unwrap();
    let provider = LocalSettingsProvider::new(&options(tmp.path(), Format::Json), known());
    provider.set("scale", 1.5f64).await.unwrap();

    let err = provider.set("ratio", f64::INFINITY).await.unwrap_err();
    assert!(matches!(err, SettingsError::NonFiniteFloat { .. }));
    provider.save().await.unwrap();

    let reader = LocalSettingsProvider::new(&options(tmp.path(), Format::Json), known());
    reader.load().await.unwrap();
    assert_eq!(reader.keys().await, vec!["scale".to_string()]);
}

#[tokio::test]
async fn test_failed_load_blocks_save_until_reload() {
    let tmp = TempDir::new().unwrap();
    let provider = LocalSettingsProvider::new(&options(tmp.path(), Format::Json), known());
    let path = provider.file_path().unwrap().to_path_buf();
    fs::write(&path, b"{ broken").unwrap();

    assert!(provider.load().await.is_err());
    assert!(provider.load_failed());
    provider.set("only", 1i64).await.unwrap();
    assert!(matches!(provider.save().await, Err(SettingsError::LoadFailed)));
    assert_eq!(fs::read(&path).unwrap(), b"{ broken");

    fs::remove_file(&path).unwrap();
    provider.load().await.unwrap();
    assert!(!provider.load_failed());
    provider.set("only", 1i64).await.unwrap();
    provider.save().await.unwrap();
    assert!(path.exists());
}

#[tokio::test]
async fn test_toml_store_keeps_optional_fields() {
    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Tray {
        icon: Option<String>,
        visible: bool,
    }

    let tmp = TempDir::new().unwrap();
    let opts = options(tmp.path(), Format::Toml);
    let registry = || known().register::<Tray>("tray");
    let tray = Tray {
        icon: None,
        visible: true,
    };

    let writer = LocalSettingsProvider::new(&opts, registry());
    writer
        .set("tray", SettingValue::custom("tray", &tray).unwrap())
        .await
        .unwrap();
    writer.save().await.unwrap();

    let reader = LocalSettingsProvider::new(&opts, registry());
    reader.load().await.unwrap();
    let loaded = reader.get("tray").await.unwrap();
    assert_eq!(loaded.decode_custom::<Tray>("tray"), Some(tray));
}

#[tokio::test]
async fn test_export_into_uncreatable_dir_is_skipped() {
    let tmp = TempDir::new().unwrap();
    let provider = LocalSettingsProvider::new(&options(tmp.path(), Format::Json), known());
    fill(&provider, &sample()).await;
    let blocker = tmp.path().join("blocker");
    fs::write(&blocker, b"file").unwrap();
    let target = blocker.join("sub").join("x.json");

    provider.export(&target).await.unwrap();

    assert!(!target.exists());
    assert!(!blocker.join("sub").exists());
    assert_eq!(fs::read(&blocker).unwrap(), b"file");
    assert!(tmp_leftovers(tmp.path()).is_empty());
}

#[tokio::test]
async fn test_failed_rename_removes_temp_file() {
    let tmp = TempDir::new().unwrap();
    let provider = LocalSettingsProvider::new(&options(tmp.path(), Format::Json), known());
    fill(&provider, &sample()).await;
    let occupied = tmp.path().join("occupied.json");
    fs::create_dir(&occupied).unwrap();
    fs::write(occupied.join("keep"), b"x").unwrap();

    let err = provider.export(&occupied).await.unwrap_err();

    assert!(matches!(err, SettingsError::Io { .. }));
    assert!(occupied.join("keep").exists());
    assert!(tmp_leftovers(tmp.path()).is_empty());
}

#[tokio::test]
async fn test_memory_backend_rejects_unregistered_kind() {
    let store = MemoryStore::new("/mem/settings");
    let mut stored = SettingsMap::new();
    stored.insert(
        "accent".into(),
        SettingValue::Custom {
            kind: "color".into(),
            data: serde_json::json!("#fff"),
        },
    );
    store.insert("/mem/settings", stored.clone());
    store.insert("/mem/backup", stored);
    let provider = DictionaryProvider::new(store, Arc::new(known()));
    provider.set("kept", true).await.unwrap();

    assert!(matches!(
        provider.load().await,
        Err(SettingsError::UnknownType { .. })
    ));
    assert!(provider.import(Path::new("/mem/backup")).await.is_err());
    assert_eq!(provider.keys().await, vec!["kept".to_string()]);
}
