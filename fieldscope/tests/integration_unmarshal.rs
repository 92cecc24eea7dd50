//! End-to-end tests for the unmarshal path.
//!
//! These tests exercise:
//! - zeroing of fields the caller may not write,
//! - write protection at every depth, and
//! - the guarantee that a failed call leaves the destination untouched.

#![cfg(feature = "json")]

use std::collections::BTreeMap;

use fieldscope::{Json, PermissionSet, ScopeEngine, ScopeError, Scoped};
use serde::Deserialize;

#[derive(Debug, Default, Clone, PartialEq, Scoped, Deserialize)]
#[serde(default)]
struct Credentials {
    username: String,
    #[scope("admin")]
    password: String,
    #[scope("admin,owner")]
    role: String,
}

mod scenario {
    use super::*;

    #[test]
    fn malicious_password_is_zeroed() {
        let payload = br#"{"username":"mallory","password":"pwned","role":"root"}"#;
        let mut dest = Credentials::default();
        fieldscope::unmarshal(payload, &mut dest, &PermissionSet::from(["public"])).unwrap();
        assert_eq!(dest.username, "mallory");
        assert_eq!(dest.password, "");
        assert_eq!(dest.role, "");
    }

    #[test]
    fn permitted_fields_are_written() {
        let payload = br#"{"username":"ada","password":"s3cret","role":"editor"}"#;
        let mut dest = Credentials::default();
        fieldscope::unmarshal(payload, &mut dest, &PermissionSet::from(["owner"])).unwrap();
        assert_eq!(dest.password, "");
        assert_eq!(dest.role, "editor");

        fieldscope::unmarshal(payload, &mut dest, &PermissionSet::from(["admin"])).unwrap();
        assert_eq!(dest.password, "s3cret");
    }

    #[test]
    fn previous_destination_contents_are_replaced() {
        let mut dest = Credentials {
            username: "old".into(),
            password: "old-password".into(),
            role: "old-role".into(),
        };
        fieldscope::unmarshal(br#"{"username":"new"}"#, &mut dest, &PermissionSet::new())
            .unwrap();
        assert_eq!(dest, Credentials {
            username: "new".into(),
            ..Credentials::default()
        });
    }
}

mod write_protection {
    use super::*;

    #[derive(Debug, Default, Scoped, Deserialize)]
    #[serde(default)]
    struct Team {
        name: String,
        members: Vec<Credentials>,
        leads: BTreeMap<String, Credentials>,
        #[scope("admin")]
        budget: u64,
        deputy: Option<Box<Credentials>>,
    }

    const PAYLOAD: &[u8] = br#"{
        "name": "core",
        "members": [
            {"username": "a", "password": "p1", "role": "root"},
            {"username": "b", "password": "p2"}
        ],
        "leads": {"x": {"username": "c", "password": "p3"}},
        "budget": 1000000,
        "deputy": {"username": "d", "password": "p4"}
    }"#;

    #[test]
    fn nested_restricted_fields_are_zeroed() {
        let mut team = Team::default();
        fieldscope::unmarshal(PAYLOAD, &mut team, &PermissionSet::new()).unwrap();

        assert_eq!(team.name, "core");
        assert_eq!(team.budget, 0);
        assert!(team.members.iter().all(|member| member.password.is_empty()));
        assert!(team.members.iter().all(|member| member.role.is_empty()));
        assert_eq!(team.members[1].username, "b");
        assert_eq!(team.leads["x"].password, "");
        let deputy = team.deputy.expect("deputy decoded");
        assert_eq!(deputy.username, "d");
        assert_eq!(deputy.password, "");
    }

    #[test]
    fn every_unwritable_field_is_default_for_every_permission_set() {
        let cases: [&[&str]; 4] = [&[], &["owner"], &["admin"], &["admin", "owner"]];
        for names in cases {
            let permissions = PermissionSet::from(names);
            let mut team = Team::default();
            fieldscope::unmarshal(PAYLOAD, &mut team, &permissions).unwrap();

            let schema = fieldscope::schema_for::<Credentials>().unwrap();
            for member in &team.members {
                for field in schema.fields() {
                    if field.is_writable(&permissions) {
                        continue;
                    }
                    let value = match field.name() {
                        "password" => &member.password,
                        "role" => &member.role,
                        other => panic!("unexpected restricted field {other}"),
                    };
                    assert!(value.is_empty(), "{} leaked with {permissions:?}", field.name());
                }
            }
        }
    }

    #[test]
    fn sanitize_can_be_called_directly() {
        let mut creds = Credentials {
            username: "ada".into(),
            password: "hunter2".into(),
            role: "admin".into(),
        };
        fieldscope::sanitize(&mut creds, &PermissionSet::from(["owner"])).unwrap();
        assert_eq!(creds.password, "");
        assert_eq!(creds.role, "admin");
    }
}

mod withheld_fields {
    use super::*;

    // No `#[serde(default)]`: absent restricted fields must still decode.
    #[derive(Debug, Default, Clone, PartialEq, Scoped, Deserialize)]
    struct Patient {
        id: u64,
        #[scope("admin")]
        ssn: String,
        #[scope("admin")]
        notes: Vec<String>,
        visits: Vec<Visit>,
    }

    #[derive(Debug, Default, Clone, PartialEq, Scoped, Deserialize)]
    struct Visit {
        date: String,
        #[scope("clinician")]
        diagnosis: Option<String>,
    }

    fn patient() -> Patient {
        Patient {
            id: 1,
            ssn: "078-05-1120".into(),
            notes: vec!["allergic".into()],
            visits: vec![Visit {
                date: "2026-01-02".into(),
                diagnosis: Some("flu".into()),
            }],
        }
    }

    #[test]
    fn narrower_marshal_output_reads_back() {
        let viewer = PermissionSet::from(["viewer"]);
        let bytes = fieldscope::marshal(&patient(), &viewer).unwrap();
        assert_eq!(bytes, br#"{"id":1,"visits":[{"date":"2026-01-02"}]}"#);

        let mut dest = patient();
        fieldscope::unmarshal(&bytes, &mut dest, &viewer).unwrap();
        assert_eq!(dest, Patient {
            id: 1,
            visits: vec![Visit {
                date: "2026-01-02".into(),
                diagnosis: None,
            }],
            ..Patient::default()
        });
    }

    #[test]
    fn round_trip_without_serde_default() {
        let permissions = PermissionSet::from(["admin", "clinician"]);
        let bytes = fieldscope::marshal(&patient(), &permissions).unwrap();
        let mut dest = Patient::default();
        fieldscope::unmarshal(&bytes, &mut dest, &permissions).unwrap();
        assert_eq!(dest, patient());
    }

    #[test]
    fn missing_writable_fields_are_still_decode_errors() {
        let mut dest = patient();
        let err = fieldscope::unmarshal(
            br#"{"visits":[]}"#,
            &mut dest,
            &PermissionSet::from(["admin"]),
        )
        .unwrap_err();
        assert!(matches!(err, ScopeError::Decode(_)));
        assert_eq!(dest, patient());
    }
}

mod fail_closed {
    use super::*;

    fn original() -> Credentials {
        Credentials {
            username: "keep".into(),
            password: "keep".into(),
            role: "keep".into(),
        }
    }

    #[test]
    fn malformed_payload_is_a_decode_error() {
        let mut dest = original();
        let err = fieldscope::unmarshal(b"{not json", &mut dest, &PermissionSet::new())
            .unwrap_err();
        match err {
            ScopeError::Decode(err) => assert_eq!(err.format(), "json"),
            other => panic!("expected a decode error, got {other:?}"),
        }
        assert_eq!(dest, original());
    }

    #[test]
    fn wrongly_typed_payload_leaves_dest_untouched() {
        let mut dest = original();
        let result = fieldscope::unmarshal(
            br#"{"username": 5}"#,
            &mut dest,
            &PermissionSet::from(["admin"]),
        );
        assert!(result.is_err());
        assert_eq!(dest, original());
    }

    #[test]
    fn depth_limit_failure_leaves_dest_untouched() {
        #[derive(Debug, Default, PartialEq, Scoped, Deserialize)]
        struct Wrapper {
            inner: Credentials,
        }

        let engine = ScopeEngine::builder(Json::compact()).max_depth(1).build();
        let mut dest = Wrapper {
            inner: original(),
        };
        let err = engine
            .unmarshal(
                br#"{"inner":{"username":"x"}}"#,
                &mut dest,
                &PermissionSet::new(),
            )
            .unwrap_err();
        assert!(matches!(err, ScopeError::Schema(_)));
        assert_eq!(dest.inner, original());
    }
}
