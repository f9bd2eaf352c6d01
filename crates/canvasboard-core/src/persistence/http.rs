//! HTTP client for the storage API.

use super::{
    BoxFuture, CanvasApi, CanvasDocument, CanvasEnvelope, CanvasListEnvelope, ErrorEnvelope,
    NewCanvas, PersistenceError, PersistenceResult, SaveCanvasEnvelope,
};
use crate::config::ClientConfig;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

/// Talks to a running storage server over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCanvasApi {
    client: Client,
    base_url: Url,
}

impl HttpCanvasApi {
    /// Create a client for the configured server.
    pub fn new(config: &ClientConfig) -> PersistenceResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                PersistenceError::Transient(format!("Failed to create HTTP client: {e}"))
            })?;
        let base_url = Url::parse(&config.api_url).map_err(|e| {
            PersistenceError::Validation(format!("Invalid API URL {:?}: {e}", config.api_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(PersistenceError::Validation(format!(
                "Invalid API URL {:?}",
                config.api_url
            )));
        }
        Ok(Self { client, base_url })
    }

    /// `{base}/api/{segments...}` with each segment percent-encoded.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("api").extend(segments);
        }
        url
    }
}

/// Map a non-success reply onto the error taxonomy.
fn classify(status: StatusCode, message: String) -> PersistenceError {
    match status {
        StatusCode::NOT_FOUND => PersistenceError::NotFound(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            PersistenceError::Validation(message)
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            PersistenceError::Unauthorized(message)
        }
        _ => PersistenceError::Transient(message),
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> PersistenceResult<T> {
    let status = response.status();
    if !status.is_success() {
        let message = match response.json::<ErrorEnvelope>().await {
            Ok(body) => body.message,
            Err(_) => status.to_string(),
        };
        log::warn!("storage API replied {status}: {message}");
        return Err(classify(status, message));
    }
    response
        .json()
        .await
        .map_err(|e| PersistenceError::Transient(format!("Invalid response: {e}")))
}

fn transport(e: reqwest::Error) -> PersistenceError {
    PersistenceError::Transient(e.to_string())
}

impl CanvasApi for HttpCanvasApi {
    fn create_canvas(
        &self,
        token: &str,
        canvas: NewCanvas,
    ) -> BoxFuture<'_, PersistenceResult<CanvasDocument>> {
        let request = self
            .client
            .post(self.url(&["canvas"]))
            .bearer_auth(token)
            .json(&canvas);
        Box::pin(async move {
            let response = request.send().await.map_err(transport)?;
            let body: SaveCanvasEnvelope = decode(response).await?;
            log::info!("{}", body.message);
            Ok(body.canvas)
        })
    }

    fn list_canvases(
        &self,
        token: &str,
        user_id: &str,
    ) -> BoxFuture<'_, PersistenceResult<Vec<CanvasDocument>>> {
        let request = self
            .client
            .get(self.url(&["canvas", user_id]))
            .bearer_auth(token);
        Box::pin(async move {
            let response = request.send().await.map_err(transport)?;
            let body: CanvasListEnvelope = decode(response).await?;
            Ok(body.canvases)
        })
    }

    fn get_canvas(
        &self,
        token: &str,
        user_id: &str,
        canvas_id: &str,
    ) -> BoxFuture<'_, PersistenceResult<CanvasDocument>> {
        let request = self
            .client
            .get(self.url(&["canvas", user_id, canvas_id]))
            .bearer_auth(token);
        Box::pin(async move {
            let response = request.send().await.map_err(transport)?;
            let body: CanvasEnvelope = decode(response).await?;
            Ok(body.canvas)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_status() {
        assert!(matches!(
            classify(StatusCode::NOT_FOUND, "User not found".into()),
            PersistenceError::NotFound(m) if m == "User not found"
        ));
        assert!(matches!(
            classify(StatusCode::BAD_REQUEST, String::new()),
            PersistenceError::Validation(_)
        ));
        assert!(matches!(
            classify(StatusCode::FORBIDDEN, String::new()),
            PersistenceError::Unauthorized(_)
        ));
        assert!(matches!(
            classify(StatusCode::INTERNAL_SERVER_ERROR, String::new()),
            PersistenceError::Transient(_)
        ));
    }

    #[test]
    fn test_url_joins_base() {
        let config = ClientConfig {
            api_url: "http://localhost:5000/".into(),
            ..ClientConfig::default()
        };
        let api = HttpCanvasApi::new(&config).unwrap();
        assert_eq!(
            api.url(&["canvas", "u1"]).as_str(),
            "http://localhost:5000/api/canvas/u1"
        );
    }

    #[test]
    fn test_url_encodes_segments() {
        let config = ClientConfig {
            api_url: "http://example.test/prefix".into(),
            ..ClientConfig::default()
        };
        let api = HttpCanvasApi::new(&config).unwrap();
        let url = api.url(&["canvas", "a/b?c", "x y"]);
        assert_eq!(url.path(), "/prefix/api/canvas/a%2Fb%3Fc/x%20y");
        assert!(url.query().is_none());
    }

    #[test]
    fn test_rejects_unparseable_base() {
        let config = ClientConfig {
            api_url: "not a url".into(),
            ..ClientConfig::default()
        };
        assert!(matches!(
            HttpCanvasApi::new(&config),
            Err(PersistenceError::Validation(_))
        ));
    }
}
