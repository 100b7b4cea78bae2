//! Public codec helpers: URL-safe transform and the canonical timestamp.

use chrono::FixedOffset;
use esia_auth::services::codec::{base64url_decode, timestamp_from_millis};
use esia_auth::{timestamp_now, url_safe};

#[test]
fn url_safe_reference_value() {
    assert_eq!(url_safe("1+2+3+4/5/6/7="), "1-2-3-4_5_6_7");
}

#[test]
fn url_safe_removes_only_first_padding_character() {
    assert_eq!(url_safe("QQ=="), "QQ=");
    assert_eq!(base64url_decode(&url_safe("QQ==")).unwrap(), b"A".to_vec());
}

#[test]
fn timestamp_reference_value() {
    let vladivostok = FixedOffset::east_opt(10 * 3600).unwrap();
    assert_eq!(
        timestamp_from_millis(1_537_788_645_624, vladivostok).unwrap(),
        "2018.09.24 21:30:45 +1000"
    );
}

#[test]
fn timestamp_negative_offset_keeps_sign() {
    let new_york = FixedOffset::west_opt(5 * 3600).unwrap();
    assert_eq!(
        timestamp_from_millis(1_537_788_645_624, new_york).unwrap(),
        "2018.09.24 06:30:45 -0500"
    );
}

#[test]
fn timestamp_now_has_canonical_shape() {
    let now = timestamp_now();
    assert_eq!(now.len(), 25);
    assert_eq!(&now[4..5], ".");
    assert_eq!(&now[10..11], " ");
    assert!(matches!(&now[20..21], "+" | "-"));
}
