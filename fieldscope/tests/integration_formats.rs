//! Scoped round-trips through the non-JSON formats.

#![cfg(any(feature = "yaml", feature = "toml"))]

use fieldscope::{PermissionSet, Scoped};
use serde::Deserialize;

#[derive(Debug, Default, Clone, PartialEq, Scoped, Deserialize)]
#[serde(default)]
struct Server {
    host: String,
    port: u16,
    #[scope("ops")]
    admin_token: String,
    #[scope("ops")]
    replicas: Vec<Replica>,
}

#[derive(Debug, Default, Clone, PartialEq, Scoped, Deserialize)]
#[serde(default)]
struct Replica {
    region: String,
    #[scope("ops+audit")]
    internal_ip: String,
}

fn server() -> Server {
    Server {
        host: "db.internal".into(),
        port: 5432,
        admin_token: "t0k3n".into(),
        replicas: vec![Replica {
            region: "eu".into(),
            internal_ip: "10.0.0.4".into(),
        }],
    }
}

#[cfg(feature = "yaml")]
mod yaml {
    use fieldscope::{ScopeEngine, Yaml};

    use super::*;

    #[test]
    fn marshal_omits_withheld_fields() {
        let engine = ScopeEngine::new(Yaml);
        let bytes = engine.marshal(&server(), &PermissionSet::new()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "host: db.internal\nport: 5432\n");
    }

    #[test]
    fn unmarshal_zeroes_unwritable_fields() {
        let engine = ScopeEngine::new(Yaml);
        let payload = b"host: evil\nport: 1\nadmin_token: stolen\nreplicas:\n- region: us\n  internal_ip: 1.2.3.4\n";
        let mut dest = Server::default();
        engine
            .unmarshal(payload, &mut dest, &PermissionSet::from(["ops"]))
            .unwrap();
        assert_eq!(dest.admin_token, "stolen");
        assert_eq!(dest.replicas[0].region, "us");
        assert_eq!(dest.replicas[0].internal_ip, "");
    }

    #[test]
    fn round_trip_under_equal_permissions() {
        let engine = ScopeEngine::new(Yaml);
        let permissions = PermissionSet::from(["ops", "audit"]);
        let bytes = engine.marshal(&server(), &permissions).unwrap();
        let mut dest = Server::default();
        engine.unmarshal(&bytes, &mut dest, &permissions).unwrap();
        assert_eq!(dest, server());
    }
}

#[cfg(feature = "toml")]
mod toml {
    use fieldscope::{ScopeEngine, ScopeError, Toml};

    use super::*;

    #[test]
    fn marshal_omits_withheld_fields() {
        let engine = ScopeEngine::new(Toml);
        let bytes = engine.marshal(&server(), &PermissionSet::new()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("host = \"db.internal\""));
        assert!(!text.contains("admin_token"));
        assert!(!text.contains("replicas"));
    }

    #[test]
    fn round_trip_under_equal_permissions() {
        let engine = ScopeEngine::new(Toml);
        let permissions = PermissionSet::from(["ops", "audit"]);
        let bytes = engine.marshal(&server(), &permissions).unwrap();
        let mut dest = Server::default();
        engine.unmarshal(&bytes, &mut dest, &permissions).unwrap();
        assert_eq!(dest, server());
    }

    #[test]
    fn invalid_toml_is_a_decode_error() {
        let engine = ScopeEngine::new(Toml);
        let mut dest = server();
        let err = engine
            .unmarshal(b"host = ", &mut dest, &PermissionSet::new())
            .unwrap_err();
        assert!(matches!(err, ScopeError::Decode(ref err) if err.format() == "toml"));
        assert_eq!(dest, server());
    }
}
