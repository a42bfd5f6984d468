use super::*;

#[test]
fn rect_from_xywh_round_trips_extents() {
    let r = Rect::from_xywh(10, 20, 300, 40);
    assert_eq!(r.right, 310);
    assert_eq!(r.bottom, 60);
    assert_eq!(r.width(), 300);
    assert_eq!(r.height(), 40);
    assert!(!r.is_empty());
    assert!(Rect::default().is_empty());
    assert!(Rect::from_xywh(0, 0, -3, 4).is_empty());
}

#[test]
fn pixel_format_parses_names_prefixes_and_codes() {
    assert_eq!(
        PixelFormat::parse("PIXEL_FORMAT_RGB_565").unwrap(),
        PixelFormat::Rgb565
    );
    assert_eq!(PixelFormat::parse("LA_88").unwrap(), PixelFormat::La88);
    assert_eq!(PixelFormat::parse("1").unwrap(), PixelFormat::Rgba8888);
    assert_eq!(PixelFormat::parse("-3").unwrap(), PixelFormat::Translucent);
    assert!(PixelFormat::parse("PIXEL_FORMAT_YUV").is_err());
    assert!(PixelFormat::parse("99").is_err());
}

#[test]
fn pixel_format_codes_are_consistent() {
    for code in [-4, -3, -2, -1, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11] {
        let f = PixelFormat::from_code(code).unwrap();
        assert_eq!(f.code(), code, "{}", f.name());
    }
}

#[test]
fn bytes_per_pixel_matches_layouts() {
    assert_eq!(PixelFormat::Rgba8888.bytes_per_pixel(), 4);
    assert_eq!(PixelFormat::Opaque.bytes_per_pixel(), 4);
    assert_eq!(PixelFormat::Rgb888.bytes_per_pixel(), 3);
    assert_eq!(PixelFormat::Rgb565.bytes_per_pixel(), 2);
    assert_eq!(PixelFormat::L8.bytes_per_pixel(), 1);
    assert_eq!(PixelFormat::None.bytes_per_pixel(), 0);
}

#[test]
fn channel_config_follows_format() {
    let c = PixelFormat::Rgb565.channel_config().unwrap();
    assert_eq!((c.red, c.green, c.blue, c.alpha), (5, 6, 5, 0));
    let c = PixelFormat::Opaque.channel_config().unwrap();
    assert_eq!(c.alpha, 0);
    assert!(PixelFormat::A8.channel_config().is_none());
}

#[test]
fn pixel_format_serde_uses_platform_names() {
    let s = serde_json::to_string(&PixelFormat::Rgbx8888).unwrap();
    assert_eq!(s, "\"RGBX_8888\"");
    let f: PixelFormat = serde_json::from_str("\"RGB_332\"").unwrap();
    assert_eq!(f, PixelFormat::Rgb332);
}
