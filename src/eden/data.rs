use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/*
{
    "tokens": [
        {
            "id": "6f1c...i0",
            "inscriptionNumber": 41234,
            "collectionSymbol": "quantum_cats",
            "listed": true,
            "listedAt": "2024-03-01T10:00:00.000Z",
            "listedPrice": 2500000,
            "meta": {
                "name": "Quantum Cat #12",
                "collection_page_img_url": "https://..."
            },
            ...
        }
    ]
}
*/
#[derive(Debug, PartialEq, Deserialize)]
pub struct TokensResponse {
    pub tokens: Vec<Token>,

    #[serde(flatten)]
    pub remaining: std::collections::HashMap<String, Value>,
}

/// One upstream token, kept exactly as it was received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(pub Map<String, Value>);

/// The reduced view of a [`Token`] handed out to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedToken {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inscription_number: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    pub listed: Value,
    pub listed_at: Value,
    pub listed_price: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_symbol: Option<Value>,
    pub image_url: Value,
}

/// Mirrors the truthiness the marketplace frontends apply to optional fields:
/// `null`, `false`, zero and the empty string count as unset.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn truthy_or(value: Option<&Value>, default: Value) -> Value {
    match value {
        Some(v) if is_truthy(v) => v.clone(),
        _ => default,
    }
}

impl Token {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn meta(&self, key: &str) -> Option<&Value> {
        self.0.get("meta")?.as_object()?.get(key)
    }

    pub fn project(&self) -> ProjectedToken {
        ProjectedToken {
            id: self.get("id").cloned(),
            inscription_number: self.get("inscriptionNumber").cloned(),
            name: self.meta("name").cloned(),
            listed: truthy_or(self.get("listed"), Value::Bool(false)),
            listed_at: truthy_or(self.get("listedAt"), Value::Null),
            listed_price: truthy_or(self.get("listedPrice"), Value::Null),
            collection_symbol: self.get("collectionSymbol").cloned(),
            image_url: truthy_or(self.meta("collection_page_img_url"), Value::Null),
        }
    }
}

impl From<&Token> for ProjectedToken {
    fn from(value: &Token) -> Self {
        value.project()
    }
}
