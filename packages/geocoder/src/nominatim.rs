//! Nominatim / OpenStreetMap reverse geocoder client.
//!
//! The public instance allows **1 request per second** and requires an
//! identifying `User-Agent`. Rate limiting is the caller's job (see
//! [`crate::rate_limit`]); this client only enforces a per-request timeout.
//!
//! See <https://nominatim.org/release-docs/develop/api/Reverse/>

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::{GeocodeError, ReverseAddress, ReverseGeocoder};

/// Reverse geocoder backed by a Nominatim `/reverse` endpoint.
#[derive(Debug, Clone)]
pub struct NominatimReverse {
    client: reqwest::Client,
    base_url: String,
    zoom: u8,
}

impl NominatimReverse {
    /// Creates a client for the `/reverse` endpoint at `base_url`.
    ///
    /// `zoom` sets the address detail level (16 is street level, 14
    /// neighbourhood).
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        user_agent: &str,
        timeout: Duration,
        zoom: u8,
    ) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.to_owned(),
            zoom,
        })
    }

    /// The endpoint this client queries.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimReverse {
    async fn reverse(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<ReverseAddress>, GeocodeError> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("format", "jsonv2".to_string()),
                ("addressdetails", "1".to_string()),
                ("zoom", self.zoom.to_string()),
            ])
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }
        if !status.is_success() {
            return Err(GeocodeError::Status {
                status: status.as_u16(),
            });
        }

        let body: serde_json::Value = resp.json().await.map_err(map_reqwest_error)?;
        parse_response(&body)
    }
}

fn map_reqwest_error(e: reqwest::Error) -> GeocodeError {
    if e.is_timeout() {
        GeocodeError::Timeout
    } else {
        GeocodeError::Http(e)
    }
}

/// Parses a Nominatim `jsonv2` reverse response.
///
/// `{"error": "Unable to geocode"}` means no address at that point and maps
/// to `Ok(None)`. Non-string component values (Nominatim never sends them,
/// but proxies might) are skipped.
fn parse_response(body: &serde_json::Value) -> Result<Option<ReverseAddress>, GeocodeError> {
    let obj = body.as_object().ok_or_else(|| GeocodeError::Parse {
        message: "Nominatim response is not an object".to_string(),
    })?;

    if let Some(error) = obj.get("error") {
        log::debug!("Nominatim: no address ({error})");
        return Ok(None);
    }

    let components = match obj.get("address") {
        None | Some(serde_json::Value::Null) => BTreeMap::new(),
        Some(serde_json::Value::Object(address)) => address
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_owned())))
            .collect(),
        Some(_) => {
            return Err(GeocodeError::Parse {
                message: "Nominatim 'address' is not an object".to_string(),
            });
        }
    };

    let display_name = obj
        .get("display_name")
        .and_then(serde_json::Value::as_str)
        .map(String::from);

    Ok(Some(ReverseAddress {
        display_name,
        components,
    }))
}
