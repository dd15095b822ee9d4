//! ACL policy parsing and wire rendering.

use gcl_storage::{AclPolicy, StorageError};
use std::str::FromStr;

#[test]
fn all_cli_names_parse() {
    let cases = [
        ("private", AclPolicy::Private),
        ("public-read", AclPolicy::PublicRead),
        ("public-read-write", AclPolicy::PublicReadWrite),
        ("authenticated-read", AclPolicy::AuthenticatedRead),
        ("bucket-owner-read", AclPolicy::BucketOwnerRead),
        ("bucket-owner-full-control", AclPolicy::BucketOwnerFullControl),
    ];
    for (name, expected) in cases {
        assert_eq!(AclPolicy::from_str(name).unwrap(), expected);
    }
}

#[test]
fn unknown_name_is_config_error_naming_the_alternatives() {
    let err = AclPolicy::from_str("world-writable").unwrap_err();
    match err {
        StorageError::Config(msg) => {
            assert!(msg.contains("world-writable"));
            assert!(msg.contains("bucket-owner-full-control"));
        }
        other => panic!("expected Config error, got {other:?}"),
    }
}

#[test]
fn case_matters() {
    assert!(AclPolicy::from_str("Private").is_err());
    assert!(AclPolicy::from_str("PUBLIC-READ").is_err());
}

#[test]
fn query_values_are_camel_case() {
    assert_eq!(AclPolicy::Private.as_query_value(), "private");
    assert_eq!(AclPolicy::PublicRead.as_query_value(), "publicRead");
    assert_eq!(
        AclPolicy::BucketOwnerFullControl.as_query_value(),
        "bucketOwnerFullControl"
    );
}

#[test]
fn display_round_trips_through_from_str() {
    for name in AclPolicy::NAMES {
        let acl = AclPolicy::from_str(name).unwrap();
        assert_eq!(acl.to_string(), name);
    }
}

#[test]
fn default_is_private() {
    assert_eq!(AclPolicy::default(), AclPolicy::Private);
}
