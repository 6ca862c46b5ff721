mod common;

use agency_pdf::raster::{
    AssetSource, RasterImage, Rasterizer, SoftwareRasterizer, fit_scale, load_or_fallback, rasterize,
    rasterize_or_fallback, read_source_bytes,
};
use agency_pdf::Error;

const LOGO_W: f32 = 1264.17;
const LOGO_H: f32 = 217.92;

#[test]
fn svg_logo_fits_header_box_without_distortion() {
    let svg = common::svg_logo(LOGO_W, LOGO_H);
    let image = rasterize(&SoftwareRasterizer, &svg, 600, 120).expect("rasterize svg");

    assert!(image.width() <= 600 && image.height() <= 120);
    assert_eq!(image.width(), 600);
    let expected_h = image.width() as f32 * LOGO_H / LOGO_W;
    assert!(
        (image.height() as f32 - expected_h).abs() <= 1.0,
        "height {} vs expected {expected_h:.2}",
        image.height()
    );

    // Embedded bytes decode to the advertised size.
    let decoded = image::load_from_memory(image.png_bytes()).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (image.width(), image.height()));
}

#[test]
fn bitmaps_are_never_upscaled() {
    let small = common::png_bytes(100, 50);
    let image = rasterize(&SoftwareRasterizer, &small, 600, 120).unwrap();
    assert_eq!((image.width(), image.height()), (100, 50));

    let wide = common::png_bytes(2000, 400);
    let image = rasterize(&SoftwareRasterizer, &wide, 600, 120).unwrap();
    assert_eq!((image.width(), image.height()), (600, 120));
}

#[test]
fn scale_is_limited_by_the_tighter_side() {
    assert_eq!(fit_scale(100.0, 100.0, 50.0, 200.0), 0.5);
    assert_eq!(fit_scale(100.0, 100.0, 400.0, 300.0), 1.0);
    assert_eq!(fit_scale(0.0, 100.0, 400.0, 300.0), 0.0);
}

#[test]
fn undecodable_source_is_an_asset_error() {
    let rasterizer = SoftwareRasterizer;
    match rasterizer.decode(b"definitely not an image") {
        Err(Error::AssetLoad(_)) => {}
        Err(other) => panic!("expected AssetLoad, got {other}"),
        Ok(_) => panic!("garbage decoded"),
    }
    assert!(matches!(rasterizer.decode(b""), Err(Error::AssetLoad(_))));
    assert!(matches!(
        rasterizer.decode(b"<svg xmlns=\"http://www.w3.org/2000/svg\"><rect"),
        Err(Error::AssetLoad(_))
    ));
}

#[test]
fn failures_degrade_to_text_fallback() {
    let _ = env_logger::try_init();
    let fallback = rasterize_or_fallback(&SoftwareRasterizer, "logo", Some(&b"\x89PNG broken"[..]), 600, 120).unwrap();
    assert!(fallback.is_none());

    let missing = AssetSource::Reference("tests/fixtures/does-not-exist.svg".into());
    let fallback = load_or_fallback(&SoftwareRasterizer, "logo", Some(&missing), 600, 120).unwrap();
    assert!(fallback.is_none());

    let none = load_or_fallback(&SoftwareRasterizer, "logo", None, 600, 120).unwrap();
    assert!(none.is_none());
}

#[test]
fn data_uri_sources_resolve() {
    let png = common::png_bytes(8, 8);
    let image = RasterImage::from_png(png.clone()).unwrap();
    let uri = image.to_data_uri();
    assert!(uri.starts_with("data:image/png;base64,"));
    assert_eq!(read_source_bytes(&uri).unwrap(), png);

    let source = AssetSource::Reference(uri);
    let loaded = load_or_fallback(&SoftwareRasterizer, "logo", Some(&source), 600, 120)
        .unwrap()
        .expect("data URI logo");
    assert_eq!((loaded.width(), loaded.height()), (8, 8));

    assert!(matches!(read_source_bytes("data:image/png;base64"), Err(Error::AssetLoad(_))));
}

#[test]
fn percent_encoded_svg_uri_decodes() {
    let svg = String::from_utf8(common::svg_logo(200.0, 40.0)).unwrap();
    let encoded = svg
        .replace('%', "%25")
        .replace('<', "%3C")
        .replace('>', "%3E")
        .replace('"', "%22")
        .replace('#', "%23")
        .replace(' ', "%20")
        .replace('\n', "%0A");
    let uri = format!("data:image/svg+xml,{encoded}");
    assert_eq!(read_source_bytes(&uri).unwrap(), svg.as_bytes());

    let source = AssetSource::Reference(uri);
    let loaded = load_or_fallback(&SoftwareRasterizer, "logo", Some(&source), 100, 100)
        .unwrap()
        .expect("percent-encoded SVG logo");
    assert_eq!((loaded.width(), loaded.height()), (100, 20));
}
