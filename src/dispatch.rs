use crate::ClientError;
use crate::client::RestClient;
use crate::endpoint::{Endpoint, Method};
use crate::transport::HttpExchange;

impl<E: HttpExchange> RestClient<E> {
    /// Calls `endpoint` with `input` and decodes the response into its output type.
    ///
    /// `Get` endpoints ignore `input`; `Post` endpoints send it as JSON. The
    /// path is resolved relative to the base URL.
    ///
    /// # Panics
    ///
    /// Panics when the endpoint's method is [`Method::None`]; such descriptors
    /// are not dispatchable.
    pub async fn dispatch<T>(&self, endpoint: &T, input: &T::In) -> Result<T::Out, ClientError>
    where
        T: Endpoint + ?Sized,
    {
        let path = endpoint.path();
        let data = match endpoint.method() {
            Method::Get => self.get_data(&path).await?,
            Method::Post => self.post_json(&path, input).await?,
            Method::None => panic!("cannot dispatch endpoint '{path}' with method None"),
        };
        endpoint.decode(&data)
    }
}
