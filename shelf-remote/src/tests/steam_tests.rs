use super::*;

#[test]
fn parse_owned_games_response() {
    let text = r#"{"response": {"game_count": 2, "games": [
        {"appid": 1, "name": "Diablo", "playtime_forever": 120,
         "img_icon_url": "abc", "has_community_visible_stats": true},
        {"appid": 9, "name": "Unknown Game XYZ", "playtime_forever": 0}
    ]}}"#;
    let records = parse_owned_games(text).unwrap();
    assert_eq!(
        records,
        vec![
            OwnedRecord::new(StorePlatform::Steam, 1, "Diablo"),
            OwnedRecord::new(StorePlatform::Steam, 9, "Unknown Game XYZ"),
        ]
    );
}

#[test]
fn private_profile_has_no_games() {
    let records = parse_owned_games(r#"{"response": {}}"#).unwrap();
    assert!(records.is_empty());
}

#[test]
fn malformed_response_fails() {
    let err = parse_owned_games("<html>Forbidden</html>").unwrap_err();
    assert!(matches!(err, RemoteError::Json(_)));
}
