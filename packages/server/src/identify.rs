//! Identification service proxy.
//!
//! Forwards a base64-encoded photo to the Plant.id identification API
//! and passes the JSON response through to the caller untouched. The
//! only guarding added over the raw call is a typed error for network
//! failures and non-2xx responses.

use serde_json::json;

use crate::UpstreamServiceError;

/// Plant.id v3 identification endpoint.
const PLANT_ID_URL: &str = "https://api.plant.id/v3/identification";

/// Detail fields requested alongside the taxonomic candidates.
const PLANT_ID_DETAILS: &str = "url,common_names,name_authority,wiki_description,taxonomy";

/// Submits one photo for identification and returns the raw response.
///
/// # Errors
///
/// Returns [`UpstreamServiceError`] when the request fails, the service
/// answers with a non-2xx status, or the body is not JSON.
pub async fn identify_photo(
    client: &reqwest::Client,
    api_key: &str,
    image_base64: &str,
) -> Result<serde_json::Value, UpstreamServiceError> {
    let response = client
        .post(PLANT_ID_URL)
        .query(&[("details", PLANT_ID_DETAILS)])
        .header("Api-Key", api_key)
        .json(&json!({ "images": [image_base64] }))
        .send()
        .await
        .map_err(|e| UpstreamServiceError::new(format!("request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(UpstreamServiceError::new(format!(
            "identification service returned {status}"
        )));
    }

    response
        .json()
        .await
        .map_err(|e| UpstreamServiceError::new(format!("unparseable response body: {e}")))
}
