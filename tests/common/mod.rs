//! Common test utilities for iconpack-dl integration tests

use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use std::sync::Once;

use iconpack_dl::AchievementIcons;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const APP_ID: &str = "440";

static TRACING: Once = Once::new();

/// Route engine logs to the test harness (`RUST_LOG=iconpack_dl=debug`)
pub fn init_tracing() {
    TRACING.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .init();
    });
}

/// Bytes served for an icon file name
pub fn icon_bytes(name: &str) -> Vec<u8> {
    format!("JPEG:{name}").into_bytes()
}

/// Serve `names` with 200 and `missing` with 404 under `/{APP_ID}/`
pub async fn mount_icons(server: &MockServer, names: &[&str], missing: &[&str]) {
    for name in names {
        Mock::given(method("GET"))
            .and(path(format!("/{APP_ID}/{name}")))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(icon_bytes(name)))
            .mount(server)
            .await;
    }
    for name in missing {
        Mock::given(method("GET"))
            .and(path(format!("/{APP_ID}/{name}")))
            .respond_with(ResponseTemplate::new(404))
            .mount(server)
            .await;
    }
}

/// Achievement with both icons named after `stem`
pub fn achievement(stem: &str) -> AchievementIcons {
    AchievementIcons {
        api_name: format!("ACH_{}", stem.to_uppercase()),
        icon: Some(format!("{stem}.jpg")),
        icon_gray: Some(format!("{stem}_gray.jpg")),
    }
}

/// Every entry of a zip, keyed by path
pub fn read_zip(bytes: &[u8]) -> BTreeMap<String, Vec<u8>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut entries = BTreeMap::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).unwrap();
        let mut buf = Vec::new();
        file.read_to_end(&mut buf).unwrap();
        entries.insert(file.name().to_string(), buf);
    }
    entries
}
