use std::sync::Arc;

use super::*;
use crate::{
    assets::store::PhotoAsset,
    color::{lut::Lut3d, params::ColorPatch},
    geometry::config::{CanvasMode, FitMode, GeometryPatch},
};

#[test]
fn geometry_manifest_uses_camel_case_keys() {
    let mut store: AssetStore<GeometryConfig> = AssetStore::new();
    store.add([PhotoAsset::new("a.jpg", vec![0u8])]);
    store.update_active_config(&GeometryPatch {
        offset_x: Some(-12.5),
        canvas_mode: Some(CanvasMode::Portrait),
        ..GeometryPatch::default()
    });
    let json: serde_json::Value =
        serde_json::from_str(&store.to_manifest().to_json_pretty().unwrap()).unwrap();
    assert_eq!(json["tool"], "frame");
    let cfg = &json["entries"][0]["config"];
    assert_eq!(cfg["offsetX"], -12.5);
    assert_eq!(cfg["fitMode"], "cover");
    assert_eq!(cfg["canvasMode"], "portrait");
}

#[test]
fn manifest_restores_by_name_in_order() {
    let mut source: AssetStore<GeometryConfig> = AssetStore::new();
    let ids = source.add([
        PhotoAsset::new("dup.jpg", vec![0u8]),
        PhotoAsset::new("dup.jpg", vec![0u8]),
    ]);
    source.select(ids[1]);
    source.update_active_config(&GeometryPatch {
        fit_mode: Some(FitMode::Fill),
        ..GeometryPatch::default()
    });
    let text = source.to_manifest().to_json_pretty().unwrap();

    let mut target: AssetStore<GeometryConfig> = AssetStore::new();
    let tids = target.add([
        PhotoAsset::new("dup.jpg", vec![0u8]),
        PhotoAsset::new("other.jpg", vec![0u8]),
        PhotoAsset::new("dup.jpg", vec![0u8]),
    ]);
    let manifest = ConfigManifest::from_json(&text).unwrap();
    assert_eq!(target.apply_manifest(&manifest).unwrap(), 2);
    assert_eq!(target.config(tids[0]).unwrap().fit_mode, FitMode::Cover);
    assert_eq!(target.config(tids[2]).unwrap().fit_mode, FitMode::Fill);
}

#[test]
fn color_manifest_keeps_existing_lut() {
    let mut store: AssetStore<ColorConfig> = AssetStore::new();
    let ids = store.add([PhotoAsset::new("c.jpg", vec![0u8])]);
    store.update_active_config(
        &ColorPatch::param("saturation", -40.0).with_lut(Some(Arc::new(Lut3d::identity(2)))),
    );
    let manifest = store.to_manifest();
    store.update_active_config(&ColorPatch::param("saturation", 0.0));

    store.apply_manifest(&manifest).unwrap();
    let cfg = store.config(ids[0]).unwrap();
    assert_eq!(cfg.params.saturation, -40.0);
    assert!(cfg.lut.is_some());
}

#[test]
fn wrong_tool_or_version_is_rejected() {
    let frame: ConfigManifest<GeometryConfig> = ConfigManifest {
        version: MANIFEST_VERSION,
        tool: ToolKind::Frame,
        entries: vec![],
    };
    let text = frame.to_json_pretty().unwrap();
    let err = ConfigManifest::<ColorConfig>::from_json(&text).unwrap_err();
    assert!(err.to_string().contains("frame tool"));

    let stale = text.replace("\"version\": 1", "\"version\": 9");
    assert!(ConfigManifest::<GeometryConfig>::from_json(&stale).is_err());
}
