use super::*;

#[test]
fn origin_default_is_center() {
    assert_eq!(RoiOrigin::default(), RoiOrigin::Center);
}

#[test]
fn origin_display_matches_metadata_strings() {
    let cases = [
        (RoiOrigin::Center, "center"),
        (RoiOrigin::TopLeft, "top left"),
        (RoiOrigin::TopRight, "top right"),
        (RoiOrigin::BottomLeft, "bottom left"),
        (RoiOrigin::BottomRight, "bottom right"),
    ];
    for (origin, expected) in cases {
        assert_eq!(origin.to_string(), expected);
        assert_eq!(expected.parse::<RoiOrigin>().unwrap(), origin);
    }
}

#[test]
fn origin_parse_unknown_rejects() {
    let err = "middle".parse::<RoiOrigin>().unwrap_err();
    assert_eq!(err, UnknownOrigin("middle".into()));
}

#[test]
fn origin_parse_is_case_sensitive() {
    assert!("Top Left".parse::<RoiOrigin>().is_err());
}

#[test]
fn origin_serde_uses_metadata_strings() {
    let json = serde_json::to_string(&RoiOrigin::BottomRight).unwrap();
    assert_eq!(json, "\"bottom right\"");
    let back: RoiOrigin = serde_json::from_str("\"top right\"").unwrap();
    assert_eq!(back, RoiOrigin::TopRight);
}

#[test]
fn origin_all_variants_distinct() {
    for (i, a) in RoiOrigin::ALL.iter().enumerate() {
        for (j, b) in RoiOrigin::ALL.iter().enumerate() {
            assert_eq!(i == j, a == b);
        }
    }
}
