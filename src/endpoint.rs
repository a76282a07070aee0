//! Typed endpoint descriptors.
//!
//! An endpoint declares where it lives ([`RestApi`]), which HTTP method it
//! uses and the payload types it sends and receives ([`Endpoint`]). Paths
//! are derived from a parent path and the last path component.

use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::ClientError;

/// Request payload for endpoints that send nothing meaningful; encodes as `{}`.
pub type EmptyPayload = BTreeMap<String, String>;

/// Dispatch method of an endpoint.
///
/// `None` marks a descriptor that must never be dispatched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    None,
}

/// Location of a REST resource.
pub trait RestApi {
    fn path_components(&self) -> &[String];

    fn parent_path(&self) -> &str;

    /// Parent path joined with the last path component, or the parent path
    /// alone when there are no components.
    fn path(&self) -> String {
        match self.path_components().last() {
            Some(last) => join_path(self.parent_path(), last),
            None => self.parent_path().to_owned(),
        }
    }
}

/// A dispatchable endpoint with fixed request and response types.
pub trait Endpoint: RestApi + Send + Sync {
    type In: Serialize + Send + Sync;
    type Out: DeserializeOwned + Send;

    fn method(&self) -> Method;

    /// Decodes a raw response body. Defaults to JSON.
    fn decode(&self, data: &[u8]) -> Result<Self::Out, ClientError> {
        serde_json::from_slice(data).map_err(ClientError::Deserialization)
    }
}

/// Joins `parent` and `component` with `/`, skipping empty sides.
pub fn join_path(parent: &str, component: &str) -> String {
    [parent, component]
        .into_iter()
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Ordered path components collected one at a time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathComponents(Vec<String>);

impl PathComponents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, component: impl Into<String>) {
        self.0.push(component.into());
    }

    #[must_use]
    pub fn with(mut self, component: impl Into<String>) -> Self {
        self.push(component);
        self
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::{EmptyPayload, Endpoint, Method, PathComponents, RestApi, join_path};
    use crate::ClientError;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct User {
        id: u64,
        name: String,
    }

    struct Route {
        parent: String,
        components: Vec<String>,
    }

    impl Route {
        fn new(parent: &str, components: &[&str]) -> Self {
            Self {
                parent: parent.to_owned(),
                components: components.iter().map(|c| (*c).to_owned()).collect(),
            }
        }
    }

    impl RestApi for Route {
        fn path_components(&self) -> &[String] {
            &self.components
        }

        fn parent_path(&self) -> &str {
            &self.parent
        }
    }

    impl Endpoint for Route {
        type In = EmptyPayload;
        type Out = User;

        fn method(&self) -> Method {
            Method::Get
        }
    }

    #[test]
    fn path_joins_parent_and_last_component() {
        assert_eq!(Route::new("users", &["42"]).path(), "users/42");
    }

    #[test]
    fn path_uses_only_the_last_component() {
        assert_eq!(Route::new("users", &["7", "8", "42"]).path(), "users/42");
    }

    #[test]
    fn path_without_components_is_parent_path() {
        assert_eq!(Route::new("users", &[]).path(), "users");
        assert_eq!(Route::new("", &[]).path(), "");
        assert_eq!(Route::new("/v1/", &[]).path(), "/v1/");
    }

    #[test]
    fn empty_segments_are_dropped() {
        assert_eq!(Route::new("", &["42"]).path(), "42");
        assert_eq!(Route::new("users", &[""]).path(), "users");
        assert_eq!(Route::new("", &[""]).path(), "");
    }

    #[test]
    fn join_path_is_plain_concatenation() {
        assert_eq!(join_path("api/v1", "items"), "api/v1/items");
        assert_eq!(join_path("api/", "items"), "api//items");
    }

    #[test]
    fn path_is_stable_across_calls() {
        let route = Route::new("users", &["42"]);
        assert_eq!(route.path(), route.path());
    }

    #[test]
    fn default_decode_round_trips_json() {
        let user = User {
            id: 42,
            name: "Ada".to_owned(),
        };
        let bytes = serde_json::to_vec(&user).expect("encode");
        let decoded = Route::new("users", &["42"]).decode(&bytes).expect("decode");
        assert_eq!(decoded, user);
    }

    #[test]
    fn default_decode_rejects_malformed_json() {
        let error = Route::new("users", &[])
            .decode(b"{\"id\":")
            .expect_err("malformed json");
        assert!(matches!(error, ClientError::Deserialization(_)));
    }

    #[test]
    fn empty_payload_encodes_as_empty_object() {
        let encoded = serde_json::to_string(&EmptyPayload::new()).expect("encode");
        assert_eq!(encoded, "{}");
    }

    #[test]
    fn path_components_builder_keeps_order() {
        let mut components = PathComponents::new().with("a").with("b");
        components.push("c");
        assert_eq!(components.as_slice(), ["a", "b", "c"]);
        assert_eq!(components.into_vec(), vec!["a", "b", "c"]);
    }
}
