//! Request description types

use serde_json::{Map, Value};

/// Caller-supplied key/value data sent as body or query parameters
///
/// Values may be scalars or nested structures; nested values are flattened
/// to bracket-keyed pairs (`user[name]=x`) when placed on the wire, and the
/// event payload always carries the full map.
pub type FieldMap = Map<String, Value>;

/// Flatten a field map into wire-ready key/value pairs
///
/// Nested objects and arrays become bracket keys (`user[name]=x`,
/// `tags[0]=a`), the same shape `http_build_query` gives a form-encoded
/// nested array. Nulls encode as empty values.
pub(crate) fn flatten_fields(fields: &FieldMap) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (name, value) in fields {
        push_pairs(&mut pairs, name.clone(), value);
    }
    pairs
}

fn push_pairs(pairs: &mut Vec<(String, String)>, key: String, value: &Value) {
    match value {
        Value::Object(map) => {
            for (name, nested) in map {
                push_pairs(pairs, format!("{key}[{name}]"), nested);
            }
        }
        Value::Array(items) => {
            for (index, nested) in items.iter().enumerate() {
                push_pairs(pairs, format!("{key}[{index}]"), nested);
            }
        }
        Value::String(text) => pairs.push((key, text.clone())),
        Value::Null => pairs.push((key, String::new())),
        other => pairs.push((key, other.to_string())),
    }
}

/// Where the fields of a request are placed on the wire
///
/// With [`Placement::None`] the fields are still reported in the published
/// event payload, they just never reach the transport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Placement {
    /// Fields are not sent
    #[default]
    None,
    /// Fields are sent as a url-encoded form body
    Body,
    /// Fields are sent as the query string
    Query,
    /// Fields are sent both as the body and the query string
    BodyAndQuery,
}

impl Placement {
    pub(crate) fn in_body(self) -> bool {
        matches!(self, Placement::Body | Placement::BodyAndQuery)
    }

    pub(crate) fn in_query(self) -> bool {
        matches!(self, Placement::Query | Placement::BodyAndQuery)
    }

    /// The same placement with body placement switched on
    pub(crate) fn with_body(self) -> Self {
        match self {
            Placement::None | Placement::Body => Placement::Body,
            Placement::Query | Placement::BodyAndQuery => Placement::BodyAndQuery,
        }
    }
}

/// Redirect-following policy
///
/// Always present in the configuration; disabled by default. When enabled,
/// redirects are followed up to `max_hops` hops, the Referer header is sent
/// when `referer` is set, and only http/https targets are followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectPolicy {
    /// Whether redirects are followed at all
    pub enabled: bool,
    /// Maximum redirect hops before the chain is cut
    pub max_hops: usize,
    /// Send a Referer header while following redirects
    pub referer: bool,
}

impl Default for RedirectPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            max_hops: 10,
            referer: true,
        }
    }
}

impl RedirectPolicy {
    /// An enabled policy with the default hop limit
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    /// Translate into a reqwest redirect policy
    ///
    /// Non-http(s) redirect targets stop the chain rather than erroring, so
    /// the caller still sees the last reachable response.
    pub(crate) fn to_reqwest(&self) -> reqwest::redirect::Policy {
        if !self.enabled {
            return reqwest::redirect::Policy::none();
        }
        let max_hops = self.max_hops;
        reqwest::redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() > max_hops {
                attempt.stop()
            } else if !matches!(attempt.url().scheme(), "http" | "https") {
                attempt.stop()
            } else {
                attempt.follow()
            }
        })
    }
}

/// Basic-auth credentials passed through to the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Auth {
    /// Username
    pub username: String,
    /// Password, when the scheme requires one
    pub password: Option<String>,
}

impl Auth {
    /// Credentials with a password
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Some(password.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_flatten_fields_scalars() {
        let fields: FieldMap = [
            ("name".to_string(), json!("x")),
            ("age".to_string(), json!(3)),
            ("active".to_string(), json!(true)),
            ("note".to_string(), json!(null)),
        ]
        .into_iter()
        .collect();

        let pairs = flatten_fields(&fields);
        assert_eq!(pairs.len(), 4);
        assert!(pairs.contains(&("name".to_string(), "x".to_string())));
        assert!(pairs.contains(&("age".to_string(), "3".to_string())));
        assert!(pairs.contains(&("active".to_string(), "true".to_string())));
        assert!(pairs.contains(&("note".to_string(), String::new())));
    }

    #[test]
    fn test_flatten_fields_nested_object_uses_bracket_keys() {
        let fields: FieldMap = [("user".to_string(), json!({"name": "x", "age": 3}))]
            .into_iter()
            .collect();

        let pairs = flatten_fields(&fields);
        assert_eq!(pairs.len(), 2);
        assert!(pairs.contains(&("user[name]".to_string(), "x".to_string())));
        assert!(pairs.contains(&("user[age]".to_string(), "3".to_string())));
    }

    #[test]
    fn test_flatten_fields_array_gets_indexed_keys() {
        let fields: FieldMap = [("tags".to_string(), json!(["a", "b"]))]
            .into_iter()
            .collect();

        assert_eq!(
            flatten_fields(&fields),
            vec![
                ("tags[0]".to_string(), "a".to_string()),
                ("tags[1]".to_string(), "b".to_string()),
            ]
        );
    }

    #[test]
    fn test_flatten_fields_deep_nesting() {
        let fields: FieldMap = [("a".to_string(), json!({"b": {"c": "d"}}))]
            .into_iter()
            .collect();

        assert_eq!(
            flatten_fields(&fields),
            vec![("a[b][c]".to_string(), "d".to_string())]
        );
    }

    #[test]
    fn test_placement_default_is_none() {
        assert_eq!(Placement::default(), Placement::None);
        assert!(!Placement::None.in_body());
        assert!(!Placement::None.in_query());
    }

    #[test]
    fn test_placement_body_and_query() {
        assert!(Placement::Body.in_body());
        assert!(!Placement::Body.in_query());
        assert!(Placement::Query.in_query());
        assert!(Placement::BodyAndQuery.in_body());
        assert!(Placement::BodyAndQuery.in_query());
    }

    #[test]
    fn test_placement_with_body() {
        assert_eq!(Placement::None.with_body(), Placement::Body);
        assert_eq!(Placement::Query.with_body(), Placement::BodyAndQuery);
        assert_eq!(Placement::Body.with_body(), Placement::Body);
        assert_eq!(Placement::BodyAndQuery.with_body(), Placement::BodyAndQuery);
    }

    #[test]
    fn test_redirect_policy_defaults() {
        let policy = RedirectPolicy::default();
        assert!(!policy.enabled);
        assert_eq!(policy.max_hops, 10);
        assert!(policy.referer);
    }

    #[test]
    fn test_redirect_policy_enabled() {
        let policy = RedirectPolicy::enabled();
        assert!(policy.enabled);
        assert_eq!(policy.max_hops, 10);
    }

    #[test]
    fn test_auth_new() {
        let auth = Auth::new("user", "secret");
        assert_eq!(auth.username, "user");
        assert_eq!(auth.password.as_deref(), Some("secret"));
    }
}
