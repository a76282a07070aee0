use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::ClientError;
use crate::endpoint::{Endpoint, Method, RestApi};

type Decoder<Out> = dyn Fn(&[u8]) -> Result<Out, ClientError> + Send + Sync;

/// Type-erased [`Endpoint`] with request type `In` and response type `Out`.
///
/// Captures the wrapped endpoint's path, method and decoder, so endpoints of
/// different concrete types can share a collection. A custom
/// [`Endpoint::decode`] on the wrapped endpoint is preserved.
pub struct AnyEndpoint<In, Out> {
    path_components: Vec<String>,
    parent_path: String,
    method: Method,
    decoder: Arc<Decoder<Out>>,
    _input: PhantomData<fn(In)>,
}

impl<In, Out> AnyEndpoint<In, Out>
where
    In: Serialize + Send + Sync + 'static,
    Out: DeserializeOwned + Send + 'static,
{
    pub fn new<E>(endpoint: E) -> Self
    where
        E: Endpoint<In = In, Out = Out> + 'static,
    {
        let path_components = endpoint.path_components().to_vec();
        let parent_path = endpoint.parent_path().to_owned();
        let method = endpoint.method();
        Self {
            path_components,
            parent_path,
            method,
            decoder: Arc::new(move |data: &[u8]| endpoint.decode(data)),
            _input: PhantomData,
        }
    }
}

impl<In, Out> Clone for AnyEndpoint<In, Out> {
    fn clone(&self) -> Self {
        Self {
            path_components: self.path_components.clone(),
            parent_path: self.parent_path.clone(),
            method: self.method,
            decoder: Arc::clone(&self.decoder),
            _input: PhantomData,
        }
    }
}

impl<In, Out> fmt::Debug for AnyEndpoint<In, Out> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyEndpoint")
            .field("path_components", &self.path_components)
            .field("parent_path", &self.parent_path)
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

impl<In, Out> RestApi for AnyEndpoint<In, Out> {
    fn path_components(&self) -> &[String] {
        &self.path_components
    }

    fn parent_path(&self) -> &str {
        &self.parent_path
    }
}

impl<In, Out> Endpoint for AnyEndpoint<In, Out>
where
    In: Serialize + Send + Sync,
    Out: DeserializeOwned + Send,
{
    type In = In;
    type Out = Out;

    fn method(&self) -> Method {
        self.method
    }

    fn decode(&self, data: &[u8]) -> Result<Out, ClientError> {
        (self.decoder)(data)
    }
}
