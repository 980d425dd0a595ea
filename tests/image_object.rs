//! End-to-end resolution through the public API.
//!
//! Config and library come from files, URLs from the Photon builder, the
//! same wiring the CLI uses.

use breakfit::config::{ConfigError, load_config};
use breakfit::library::JsonLibrary;
use breakfit::markup;
use breakfit::resolve::Resolver;
use breakfit::sizes::SizeRequest;
use breakfit::transform::{CdnParams, PhotonCdn, TransformArgs, TransformRegistry};
use breakfit::types::ImageRef;
use std::fs;
use tempfile::TempDir;

const CONFIG: &str = r#"
[[breakpoints]]
name = "mobile"
max = 640

[[breakpoints]]
name = "tablet"
min = 640

[[breakpoints]]
name = "desktop"
min = 1040
pixel_density = 2

[[image_sizes]]
name = "thumb"

[[image_sizes.breakpoints]]
breakpoint = "mobile"
width = 400
height = 225
quality = 75

[[image_sizes.breakpoints]]
breakpoint = "desktop"
width = 800
height = 450
default = true

[[image_sizes]]
name = "banner"

[[image_sizes.breakpoints]]
breakpoint = "tablet"
width = 1040
height = 300
callback = "letterbox"

[[image_sizes.breakpoints]]
breakpoint = "desktop"
width = 1280
height = 400
crop = false
"#;

const LIBRARY: &str = r#"{
    "1": { "url": "https://example.com/uploads/wide.jpg", "width": 2000, "height": 1000 },
    "2": { "url": "https://example.com/uploads/square.jpg", "width": 1000, "height": 1000 }
}"#;

fn setup() -> (TempDir, Resolver<JsonLibrary, PhotonCdn>) {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("breakfit.toml");
    let library_path = tmp.path().join("library.json");
    fs::write(&config_path, CONFIG).unwrap();
    fs::write(&library_path, LIBRARY).unwrap();

    let config = load_config(&config_path).unwrap();
    let library = JsonLibrary::from_path(&library_path).unwrap();
    let registry = TransformRegistry::new().with("letterbox", |args: &TransformArgs| CdnParams {
        fit: Some((args.width, args.height)),
        ..Default::default()
    });
    let resolver =
        Resolver::with_transforms(config, registry, library, PhotonCdn::new()).unwrap();
    (tmp, resolver)
}

fn thumb() -> SizeRequest {
    SizeRequest::Named("thumb".into())
}

#[test]
fn thumb_on_landscape_image() {
    let (_tmp, resolver) = setup();
    let object = resolver.image_object(&ImageRef::Attachment(1), &thumb());

    assert_eq!(object.id, "1");
    let mobile = &object.get("mobile").unwrap().src;
    assert_eq!(
        mobile.url,
        "https://example.com/uploads/wide.jpg?w=400&crop=0,0,100,225px&quality=75"
    );
    assert_eq!(
        mobile.url2x,
        "https://example.com/uploads/wide.jpg?w=800&crop=0,0,100,450px&quality=75"
    );
    assert!(object.get("tablet").is_none());
    assert!(object.get("desktop").unwrap().src.default);
}

#[test]
fn thumb_on_square_image_is_center_cropped() {
    let (_tmp, resolver) = setup();
    let object = resolver.image_object(&ImageRef::Attachment(2), &thumb());
    assert_eq!(
        object.get("desktop").unwrap().src.url,
        // 1000x1000 at 800 wide is 800 tall: (800 - 450) / 2 = 175
        "https://example.com/uploads/square.jpg?w=800&crop=0,175px,100,450px"
    );
}

#[test]
fn registered_callback_and_disabled_crop() {
    let (_tmp, resolver) = setup();
    let object = resolver.image_object(&ImageRef::Attachment(1), &SizeRequest::Named("banner".into()));
    assert_eq!(
        object.get("tablet").unwrap().src.url,
        "https://example.com/uploads/wide.jpg?fit=1040,300"
    );
    assert_eq!(
        object.get("desktop").unwrap().src.url,
        "https://example.com/uploads/wide.jpg?w=1280"
    );
}

#[test]
fn raw_dimensions_follow_breakpoint_widths() {
    let (_tmp, resolver) = setup();
    let object = resolver.image_object(&ImageRef::Attachment(1), &SizeRequest::Dimensions(2000, 1000));
    let widths: Vec<_> = object.sizes.iter().map(|s| (s.name.as_str(), s.src.width)).collect();
    // tablet is min-only and sized to the next tier
    assert_eq!(widths, vec![("mobile", 640), ("tablet", 1040), ("desktop", 1040)]);
}

#[test]
fn unknown_image_degrades_without_failing() {
    let (_tmp, resolver) = setup();
    let object = resolver.image_object(&ImageRef::Attachment(404), &thumb());
    assert_eq!(object.sizes.len(), 2);
    assert!(object.sizes.iter().all(|s| s.src.url.is_empty()));
    assert_eq!(markup::srcset(&object), "");
}

#[test]
fn external_url_image() {
    let (_tmp, resolver) = setup();
    let image: ImageRef = "https://elsewhere.test/cat.jpg".parse().unwrap();
    let object = resolver.image_object(&image, &thumb());
    assert_eq!(object.id, "external_url");
    assert_eq!(
        object.get("desktop").unwrap().src.url,
        "https://elsewhere.test/cat.jpg?w=800&crop=0,0,100,450px"
    );
}

#[test]
fn json_shape() {
    let (_tmp, resolver) = setup();
    let object = resolver.image_object(&ImageRef::Attachment(1), &thumb());
    let json: serde_json::Value = serde_json::to_value(&object).unwrap();

    assert_eq!(json["id"], "1");
    assert_eq!(json["sizes"]["mobile"]["size"]["max"], 640);
    assert_eq!(json["sizes"]["mobile"]["src"]["width"], 400);
    assert_eq!(json["sizes"]["desktop"]["src"]["default"], true);
    assert_eq!(json["sizes"]["desktop"]["size"]["pixel_density"], 2);
    assert!(json["args"].as_object().unwrap().is_empty());
}

#[test]
fn srcset_sizes_and_picture() {
    let (_tmp, resolver) = setup();
    let image = ImageRef::Attachment(1);
    let object = resolver.image_object(&image, &thumb());

    assert_eq!(
        markup::sizes(&object),
        "(max-width: 640px) 400px,(min-width: 1040px) 800px,800px"
    );
    assert!(markup::srcset(&object).ends_with("?w=800&crop=0,0,100,450px 800w"));

    let fallback = resolver.fallback_src(&image, &object);
    let html = markup::render_picture(&object, &fallback, &thumb(), &Default::default()).into_string();
    assert_eq!(html.matches("<source").count(), 2);
    // desktop asks for pixel density 2
    assert!(html.contains("900px 2x\""));
}

#[test]
fn breakpoint_urls_by_density() {
    let (_tmp, resolver) = setup();
    let image = ImageRef::Attachment(1);
    let urls = resolver.breakpoint_urls(&image, &thumb(), 2);
    assert_eq!(urls.len(), 2);
    assert!(urls[0].1.contains("w=800"));
    assert_eq!(
        resolver.breakpoint_url(&image, &thumb(), "desktop", 1).as_deref(),
        Some("https://example.com/uploads/wide.jpg?w=800&crop=0,0,100,450px")
    );
}

#[test]
fn bad_config_is_rejected_at_startup() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("breakfit.toml");
    fs::write(&path, "[[breakpoints]]\nname = \"floating\"\n").unwrap();
    assert!(matches!(load_config(&path), Err(ConfigError::Validation(_))));
}

#[test]
fn zero_quality_is_rejected_at_startup() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("breakfit.toml");
    fs::write(&path, CONFIG.replace("quality = 75", "quality = 0")).unwrap();
    assert!(matches!(load_config(&path), Err(ConfigError::Validation(_))));
}

#[test]
fn cdn_base_rebases_attachment_urls() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("breakfit.toml");
    fs::write(&config_path, CONFIG).unwrap();
    let library = JsonLibrary::from_json(
        r#"{"1": {"url": "HTTPS://Example.com/uploads/wide.jpg#hero", "width": 2000, "height": 1000}}"#,
    )
    .unwrap();
    let resolver = Resolver::new(
        load_config(&config_path).unwrap(),
        library,
        PhotonCdn::with_base_url("https://i0.cdn.test"),
    )
    .unwrap();
    let object = resolver.image_object(&ImageRef::Attachment(1), &thumb());
    assert_eq!(
        object.get("desktop").unwrap().src.url,
        "https://i0.cdn.test/example.com/uploads/wide.jpg?w=800&crop=0,0,100,450px#hero"
    );
}

#[test]
fn unknown_default_transform_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("breakfit.toml");
    fs::write(&path, "default_transform = \"sepia\"\n").unwrap();
    let config = load_config(&path).unwrap();
    let result = Resolver::new(config, JsonLibrary::default(), PhotonCdn::new());
    assert!(result.is_err());
}
