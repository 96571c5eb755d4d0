//! Send-and-decode helpers on the transport seam

use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::client::{BufferedResponse, Transport};
use crate::error::{ProviderError, ProviderErrorModel, SendError};

/// Typed send-and-decode on any [`Transport`].
///
/// A 2xx response decodes into the success type; anything else decodes into
/// the caller's error model and comes back as
/// [`SendError::Provider`](crate::SendError::Provider).
#[async_trait]
pub trait SendJson: Transport {
    /// Send a request and decode the body as `T` on success or `E` on
    /// failure.
    async fn send_json<T, E>(&self, request: reqwest::Request) -> Result<T, SendError<E>>
    where
        T: DeserializeOwned + Send,
        E: ProviderErrorModel + DeserializeOwned + fmt::Debug + Send,
    {
        self.send_json_with(request, |_: &T, _: &BufferedResponse| true)
            .await
    }

    /// Like [`send_json`](SendJson::send_json), with a business-level success
    /// check on top of the status code.
    ///
    /// When `is_success` rejects a decoded 2xx body, the same buffered body
    /// is re-decoded as `E` and the call fails as a provider error.
    async fn send_json_with<T, E, F>(
        &self,
        request: reqwest::Request,
        is_success: F,
    ) -> Result<T, SendError<E>>
    where
        T: DeserializeOwned + Send,
        E: ProviderErrorModel + DeserializeOwned + fmt::Debug + Send,
        F: Fn(&T, &BufferedResponse) -> bool + Send,
    {
        let response = self.execute(request).await?;

        if !response.status.is_success() {
            return Err(SendError::Provider(classify(&response)?));
        }

        // A literal `null` body decodes to None and counts as a failure; a
        // malformed body is a Decode error instead.
        let decoded: Option<T> = response.json()?;
        match decoded {
            Some(value) if is_success(&value, &response) => Ok(value),
            _ => Err(SendError::Provider(classify(&response)?)),
        }
    }

    /// Send a request whose only interesting outcome is success or failure.
    async fn send_unit<E>(&self, request: reqwest::Request) -> Result<(), SendError<E>>
    where
        E: ProviderErrorModel + DeserializeOwned + fmt::Debug + Send,
    {
        self.send_unit_with(request, |_: &BufferedResponse| true)
            .await
    }

    /// Like [`send_unit`](SendJson::send_unit), with a business-level success
    /// check on the raw response.
    async fn send_unit_with<E, F>(
        &self,
        request: reqwest::Request,
        is_success: F,
    ) -> Result<(), SendError<E>>
    where
        E: ProviderErrorModel + DeserializeOwned + fmt::Debug + Send,
        F: Fn(&BufferedResponse) -> bool + Send,
    {
        let response = self.execute(request).await?;

        if !response.status.is_success() || !is_success(&response) {
            return Err(SendError::Provider(classify(&response)?));
        }

        Ok(())
    }
}

impl<C: Transport + ?Sized> SendJson for C {}

/// Build the provider failure for a classified call.
///
/// An absent payload (empty body or literal `null`) yields the `"Unknown"`
/// code; a malformed payload propagates as a decode error.
fn classify<E>(response: &BufferedResponse) -> Result<ProviderError<E>, SendError<E>>
where
    E: ProviderErrorModel + DeserializeOwned + fmt::Debug,
{
    warn!(
        status = response.status.as_u16(),
        url = %response.url,
        "api call failed, handling provider error"
    );

    let model = decode_error_model(&response.body)?;
    Ok(ProviderError::from_model(model, response.status))
}

fn decode_error_model<E: DeserializeOwned>(body: &[u8]) -> serde_json::Result<Option<E>> {
    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    serde_json::from_slice(body).map(Some)
}
