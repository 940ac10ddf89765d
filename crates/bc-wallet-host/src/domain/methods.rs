//! Page method classification and parameter validation.
//!
//! Three groups:
//! - Open: `connect` (always permitted, approval-gated)
//! - Granted: `getAccounts`, `signMessage` (require a connection grant)
//! - Storage: `ipfs_*` (no grant check, passed to the storage collaborator)
//!
//! Params are validated here so malformed requests fail fast with
//! `InvalidParams` before any surface opens or collaborator runs.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use shared_types::{BridgeError, StoreRequest};

/// Prefix shared by every storage method.
pub const STORAGE_PREFIX: &str = "ipfs_";

/// A page method with validated params.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Connect,
    GetAccounts,
    SignMessage { message: String },
    Storage(StorageMethod),
}

/// Storage methods (`ipfs_*`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageMethod {
    GetCurrentNode,
    GetNodes,
    SwitchNode { node_id: String },
    Add(StoreRequest),
    Get { cid: String },
    TestConnection { node_id: String },
}

#[derive(Deserialize)]
struct SignParams {
    message: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeParams {
    node_id: Option<String>,
}

#[derive(Deserialize)]
struct CidParams {
    cid: Option<String>,
}

impl Method {
    /// Classify `name` and validate `params`.
    pub fn parse(name: &str, params: &Value) -> Result<Self, BridgeError> {
        match name {
            "connect" => Ok(Method::Connect),
            "getAccounts" => Ok(Method::GetAccounts),
            "signMessage" => {
                let p: SignParams = decode(params)?;
                let message = p
                    .message
                    .ok_or_else(|| BridgeError::InvalidParams("message is required".into()))?;
                Ok(Method::SignMessage { message })
            }
            _ if name.starts_with(STORAGE_PREFIX) => {
                StorageMethod::parse(name, params).map(Method::Storage)
            }
            other => Err(BridgeError::UnsupportedMethod(other.to_string())),
        }
    }

    /// Whether the calling origin must hold a grant.
    pub fn requires_grant(&self) -> bool {
        matches!(self, Method::GetAccounts | Method::SignMessage { .. })
    }

    /// Method name, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Method::Connect => "connect",
            Method::GetAccounts => "getAccounts",
            Method::SignMessage { .. } => "signMessage",
            Method::Storage(m) => m.name(),
        }
    }
}

impl StorageMethod {
    fn parse(name: &str, params: &Value) -> Result<Self, BridgeError> {
        match name {
            "ipfs_getCurrentNode" => Ok(StorageMethod::GetCurrentNode),
            "ipfs_getNodes" => Ok(StorageMethod::GetNodes),
            "ipfs_switchNode" => Ok(StorageMethod::SwitchNode {
                node_id: node_id(params)?,
            }),
            "ipfs_testConnection" => Ok(StorageMethod::TestConnection {
                node_id: node_id(params)?,
            }),
            "ipfs_add" => {
                let request: StoreRequest = decode(params)?;
                if request.content.is_empty() {
                    return Err(BridgeError::InvalidParams("content is required".into()));
                }
                Ok(StorageMethod::Add(request))
            }
            "ipfs_get" => {
                let p: CidParams = decode(params)?;
                match p.cid {
                    Some(cid) if !cid.is_empty() => Ok(StorageMethod::Get { cid }),
                    _ => Err(BridgeError::InvalidParams("cid is required".into())),
                }
            }
            other => Err(BridgeError::UnsupportedMethod(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StorageMethod::GetCurrentNode => "ipfs_getCurrentNode",
            StorageMethod::GetNodes => "ipfs_getNodes",
            StorageMethod::SwitchNode { .. } => "ipfs_switchNode",
            StorageMethod::Add(_) => "ipfs_add",
            StorageMethod::Get { .. } => "ipfs_get",
            StorageMethod::TestConnection { .. } => "ipfs_testConnection",
        }
    }
}

fn node_id(params: &Value) -> Result<String, BridgeError> {
    let p: NodeParams = decode(params)?;
    match p.node_id {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(BridgeError::InvalidParams("nodeId is required".into())),
    }
}

/// Decode params, treating `null` as an empty object.
fn decode<T: DeserializeOwned>(params: &Value) -> Result<T, BridgeError> {
    let params = if params.is_null() {
        Value::Object(Default::default())
    } else {
        params.clone()
    };
    serde_json::from_value(params).map_err(|e| BridgeError::InvalidParams(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_core_methods() {
        assert_eq!(Method::parse("connect", &json!({})).unwrap(), Method::Connect);
        assert_eq!(Method::parse("getAccounts", &Value::Null).unwrap(), Method::GetAccounts);
        assert_eq!(
            Method::parse("signMessage", &json!({"message": "hello"})).unwrap(),
            Method::SignMessage { message: "hello".into() }
        );
    }

    #[test]
    fn test_sign_requires_message() {
        assert!(matches!(
            Method::parse("signMessage", &json!({})),
            Err(BridgeError::InvalidParams(_))
        ));
        assert!(matches!(
            Method::parse("signMessage", &json!({"message": 42})),
            Err(BridgeError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_unknown_methods() {
        assert_eq!(
            Method::parse("eth_sendTransaction", &json!({})),
            Err(BridgeError::UnsupportedMethod("eth_sendTransaction".into()))
        );
        assert_eq!(
            Method::parse("ipfs_pin", &json!({})),
            Err(BridgeError::UnsupportedMethod("ipfs_pin".into()))
        );
    }

    #[test]
    fn test_storage_params() {
        assert_eq!(
            Method::parse("ipfs_switchNode", &json!({"nodeId": "3"})).unwrap(),
            Method::Storage(StorageMethod::SwitchNode { node_id: "3".into() })
        );
        assert!(matches!(
            Method::parse("ipfs_switchNode", &json!({"nodeId": ""})),
            Err(BridgeError::InvalidParams(_))
        ));
        assert!(matches!(
            Method::parse("ipfs_testConnection", &json!({})),
            Err(BridgeError::InvalidParams(_))
        ));
        assert!(matches!(
            Method::parse("ipfs_get", &json!({"cid": ""})),
            Err(BridgeError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_add_params() {
        let parsed = Method::parse(
            "ipfs_add",
            &json!({"content": "hi", "name": "a.txt", "type": "text/plain"}),
        )
        .unwrap();
        match parsed {
            Method::Storage(StorageMethod::Add(request)) => {
                assert_eq!(request.name.as_deref(), Some("a.txt"));
                assert_eq!(request.mime_type.as_deref(), Some("text/plain"));
                assert_eq!(request.effective_size(), 2);
            }
            other => panic!("unexpected {:?}", other),
        }

        assert!(matches!(
            Method::parse("ipfs_add", &json!({"content": ""})),
            Err(BridgeError::InvalidParams(_))
        ));
        assert!(matches!(
            Method::parse("ipfs_add", &json!({})),
            Err(BridgeError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_classification() {
        assert!(!Method::Connect.requires_grant());
        assert!(Method::GetAccounts.requires_grant());
        assert!(!Method::Storage(StorageMethod::GetNodes).requires_grant());
        assert_eq!(Method::GetAccounts.name(), "getAccounts");
        assert_eq!(Method::Storage(StorageMethod::GetNodes).name(), "ipfs_getNodes");
    }
}
