use crate::error::{CatalogError, Validate};
use crate::utils::logging::with_pretty_json_debug;
use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

/// JSON body that has already passed [`Validate`].
pub(crate) struct ValidJson<T>(pub(crate) T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Serialize,
{
    type Rejection = CatalogError;

    /// Malformed bodies and failed checks both become 400 validation errors
    /// (`From<JsonRejection> for CatalogError` covers the former).
    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<T>::from_request(req, &()).await?;

        with_pretty_json_debug(&body, |pretty_body| {
            debug!(body = %pretty_body, "[API] Extracted request body");
        });

        body.validate()?;
        Ok(ValidJson(body))
    }
}
