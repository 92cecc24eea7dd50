//! End-to-end tests for the marshal path.
//!
//! These tests exercise:
//! - scope evaluation against permission sets,
//! - omission of unsatisfied fields at every depth, and
//! - the properties of the redacted copy (monotonicity, no leaks, idempotence).

#![cfg(feature = "json")]

use std::collections::{BTreeMap, HashMap};

use fieldscope::{
    Json, OpaqueValue, PermissionSet, Redacted, ScopeEngine, ScopeError, Scoped, Unscoped,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Default, Clone, Scoped, Deserialize)]
struct Person {
    id: u64,
    #[scope("public")]
    name: String,
    #[scope("admin+pii")]
    ssn: String,
    #[scope("compliance,admin+pii")]
    compliance_id: String,
}

fn person() -> Person {
    Person {
        id: 1,
        name: "Ada".into(),
        ssn: "078-05-1120".into(),
        compliance_id: "C-42".into(),
    }
}

fn perms(names: &[&str]) -> PermissionSet {
    PermissionSet::from(names)
}

fn keys(copy: &Redacted) -> Vec<String> {
    copy.value()
        .as_object()
        .map(|object| object.keys().cloned().collect())
        .unwrap_or_default()
}

mod scenario {
    use super::*;

    #[test]
    fn admin_and_pii_see_everything_but_public_fields() {
        let copy = fieldscope::filter(&person(), &perms(&["admin", "pii"])).unwrap();
        assert_eq!(keys(&copy), ["id", "ssn", "compliance_id"]);
        assert!(!copy.contains_key("name"));
    }

    #[test]
    fn compliance_alone_satisfies_its_clause() {
        let copy = fieldscope::filter(&person(), &perms(&["compliance"])).unwrap();
        assert_eq!(keys(&copy), ["id", "compliance_id"]);
    }

    #[test]
    fn half_a_conjunction_is_not_enough() {
        let copy = fieldscope::filter(&person(), &perms(&["admin"])).unwrap();
        assert_eq!(keys(&copy), ["id"]);
    }

    #[test]
    fn no_permissions_still_marshal() {
        let bytes = fieldscope::marshal(&person(), &PermissionSet::new()).unwrap();
        assert_eq!(bytes, br#"{"id":1}"#);
    }

    #[test]
    fn marshal_never_mutates_the_source() {
        let source = person();
        fieldscope::marshal(&source, &PermissionSet::new()).unwrap();
        assert_eq!(source.ssn, "078-05-1120");
        assert_eq!(source.name, "Ada");
    }
}

mod properties {
    use super::*;

    const UNIVERSE: [&str; 4] = ["public", "admin", "pii", "compliance"];

    fn subsets() -> Vec<PermissionSet> {
        (0_u32..1 << UNIVERSE.len())
            .map(|mask| {
                UNIVERSE
                    .iter()
                    .enumerate()
                    .filter(|(bit, _)| mask & (1 << bit) != 0)
                    .map(|(_, name)| *name)
                    .collect()
            })
            .collect()
    }

    #[test]
    fn visibility_is_monotonic_in_permissions() {
        let all = subsets();
        for small in &all {
            for large in all.iter().filter(|large| small.is_subset(large)) {
                let small_keys = keys(&fieldscope::filter(&person(), small).unwrap());
                let large_keys = keys(&fieldscope::filter(&person(), large).unwrap());
                assert!(
                    small_keys.iter().all(|key| large_keys.contains(key)),
                    "{small:?} -> {small_keys:?} not within {large:?} -> {large_keys:?}"
                );
            }
        }
    }

    #[test]
    fn withheld_fields_leave_no_trace_in_bytes() {
        for permissions in subsets() {
            let bytes = fieldscope::marshal(&person(), &permissions).unwrap();
            let text = String::from_utf8(bytes).unwrap();
            let copy = fieldscope::filter(&person(), &permissions).unwrap();
            if !copy.contains_key("ssn") {
                assert!(!text.contains("ssn"), "{text}");
                assert!(!text.contains("078-05-1120"), "{text}");
            }
            if !copy.contains_key("name") {
                assert!(!text.contains("Ada"), "{text}");
            }
        }
    }

    #[test]
    fn filtering_is_idempotent() {
        for permissions in subsets() {
            let copy = fieldscope::filter(&person(), &permissions).unwrap();
            assert_eq!(copy.rescope(&permissions).unwrap(), copy);
        }
    }

    #[test]
    fn round_trip_under_equal_permissions() {
        let permissions = perms(&["public", "admin", "pii"]);
        let bytes = fieldscope::marshal(&person(), &permissions).unwrap();
        let mut decoded = Person::default();
        fieldscope::unmarshal(&bytes, &mut decoded, &permissions).unwrap();
        assert_eq!(decoded.name, "Ada");
        assert_eq!(decoded.ssn, "078-05-1120");
        assert_eq!(decoded.compliance_id, "C-42");
    }
}

mod nesting {
    use super::*;

    #[derive(Debug, Default, Scoped)]
    struct Address {
        city: String,
        #[scope("pii")]
        street: String,
    }

    #[derive(Debug, Default, Scoped)]
    struct Customer {
        id: u64,
        billing: Address,
        shipping: Option<Address>,
        history: Vec<Address>,
        by_label: BTreeMap<String, Address>,
        #[scope("pii")]
        aliases: HashMap<String, Vec<Address>>,
    }

    fn address(city: &str) -> Address {
        Address {
            city: city.into(),
            street: format!("1 {city} Way"),
        }
    }

    fn customer() -> Customer {
        Customer {
            id: 5,
            billing: address("Oslo"),
            shipping: None,
            history: vec![address("Rome"), address("Lima")],
            by_label: BTreeMap::from([("home".to_owned(), address("Kyiv"))]),
            aliases: HashMap::from([("old".to_owned(), vec![address("Pune")])]),
        }
    }

    #[test]
    fn nested_fields_are_filtered_at_every_depth() {
        let copy = fieldscope::filter(&customer(), &PermissionSet::new()).unwrap();
        assert_eq!(
            copy.value(),
            &json!({
                "id": 5,
                "billing": {"city": "Oslo"},
                "shipping": null,
                "history": [{"city": "Rome"}, {"city": "Lima"}],
                "by_label": {"home": {"city": "Kyiv"}},
            })
        );
    }

    #[test]
    fn granted_permissions_reach_nested_fields() {
        let copy = fieldscope::filter(&customer(), &PermissionSet::from(["pii"])).unwrap();
        assert_eq!(copy.value()["billing"]["street"], json!("1 Oslo Way"));
        assert_eq!(copy.value()["aliases"]["old"][0]["street"], json!("1 Pune Way"));
    }

    #[test]
    fn collections_of_composites_are_filtered() {
        let customers = vec![customer(), customer()];
        let copy = fieldscope::filter(&customers, &PermissionSet::new()).unwrap();
        assert_eq!(copy.value()[1]["billing"], json!({"city": "Oslo"}));
        assert_eq!(copy.rescope(&PermissionSet::new()).unwrap(), copy);
    }
}

mod serde_interop {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Unscoped)]
    struct Money {
        cents: i64,
        currency: String,
    }

    #[derive(Debug, Default, Scoped, Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Invoice {
        invoice_id: u64,
        #[serde(rename = "total")]
        #[scope("billing")]
        total_amount: Option<Money>,
        #[serde(skip)]
        internal_note: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        line_items: Vec<String>,
        #[scope(opaque)]
        raw: (u8, u8),
        tags: OpaqueValue<Vec<&'static str>>,
        extra: Value,
    }

    fn invoice() -> Invoice {
        Invoice {
            invoice_id: 3,
            total_amount: Some(Money {
                cents: 1999,
                currency: "EUR".into(),
            }),
            internal_note: "do not send".into(),
            line_items: Vec::new(),
            raw: (1, 2),
            tags: OpaqueValue(vec!["a"]),
            extra: json!({"any": ["thing"]}),
        }
    }

    #[test]
    fn serde_renames_and_skips_are_honored() {
        let copy = fieldscope::filter(&invoice(), &PermissionSet::from(["billing"])).unwrap();
        assert_eq!(
            copy.value(),
            &json!({
                "invoiceId": 3,
                "total": {"cents": 1999, "currency": "EUR"},
                "raw": [1, 2],
                "tags": ["a"],
                "extra": {"any": ["thing"]},
            })
        );
    }

    #[test]
    fn renamed_restricted_field_is_omitted() {
        let copy = fieldscope::filter(&invoice(), &PermissionSet::new()).unwrap();
        assert!(!copy.contains_key("total"));
        assert!(!copy.contains_key("totalAmount"));
    }

    #[test]
    fn redacted_copy_serializes_through_serde() {
        let copy = fieldscope::filter(&invoice(), &PermissionSet::new()).unwrap();
        let text = serde_json::to_string(&copy).unwrap();
        assert!(text.starts_with(r#"{"invoiceId":3,"raw":[1,2]"#), "{text}");
    }
}

mod engine {
    use super::*;

    #[derive(Debug, Default, Scoped)]
    struct Tree {
        label: String,
        children: Vec<Tree>,
    }

    fn chain(length: usize) -> Tree {
        (0..length).fold(Tree::default(), |child, depth| Tree {
            label: format!("n{depth}"),
            children: vec![child],
        })
    }

    #[test]
    fn pretty_json_engine() {
        let engine = ScopeEngine::new(Json::pretty());
        let bytes = engine.marshal(&person(), &PermissionSet::new()).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "{\n  \"id\": 1\n}");
    }

    #[test]
    fn deep_values_hit_the_depth_limit() {
        let engine = ScopeEngine::builder(Json::compact()).max_depth(8).build();
        assert!(engine.marshal(&chain(6), &PermissionSet::new()).is_ok());
        let err = engine.marshal(&chain(20), &PermissionSet::new()).unwrap_err();
        assert!(matches!(err, ScopeError::Schema(_)));
    }

    #[test]
    fn self_referential_types_preflight() {
        let engine = ScopeEngine::new(Json::compact());
        let schemas = engine.preflight::<Tree>().unwrap();
        assert_eq!(schemas.len(), 1);
        assert_eq!(schemas[0].fields().len(), 2);
    }
}
