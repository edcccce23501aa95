/// TMDB movie details provider
///
/// API Flow: `GET /3/movie/{id}?api_key=..&language=..` returns genres, vote
/// average, overview, release date and poster path in one call.
use crate::{
    error::MetadataError,
    models::{ItemId, MetadataRecord, TmdbMovieDetails},
    services::providers::MetadataProvider,
};
use reqwest::Client as HttpClient;
use std::time::Duration;

const USER_AGENT: &str = concat!("reelmatch-api/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    language: String,
    artwork_base_url: String,
}

impl TmdbProvider {
    /// Creates a provider whose HTTP client gives up after `request_timeout`
    pub fn new(
        api_key: String,
        api_url: String,
        language: String,
        artwork_base_url: String,
        request_timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http_client = HttpClient::builder()
            .user_agent(USER_AGENT)
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            language,
            artwork_base_url,
        })
    }

    fn details_url(&self, id: &ItemId) -> String {
        format!("{}/3/movie/{}", self.api_url, id)
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn fetch_details(&self, id: &ItemId) -> Result<MetadataRecord, MetadataError> {
        let response = self
            .http_client
            .get(self.details_url(id))
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("language", self.language.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::debug!(item_id = %id, status = %status, "TMDB returned non-success status");
            return Err(MetadataError::Status(status.as_u16()));
        }

        let response_text = response.text().await?;

        let details: TmdbMovieDetails = serde_json::from_str(&response_text).map_err(|e| {
            tracing::debug!(
                item_id = %id,
                error = %e,
                "Failed to deserialize TMDB response"
            );
            MetadataError::Malformed(e.to_string())
        })?;

        let record = MetadataRecord::from_tmdb(details, &self.artwork_base_url);

        tracing::debug!(
            item_id = %id,
            categories = record.categories.len(),
            provider = "tmdb",
            "Metadata fetched"
        );

        Ok(record)
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Path, http::StatusCode, response::IntoResponse, routing::get, Router};

    async fn movie(Path(id): Path<String>) -> axum::response::Response {
        match id.as_str() {
            "27205" => axum::Json(serde_json::json!({
                "id": 27205,
                "genres": [{"id": 28, "name": "Action"}, {"id": 878, "name": "Science Fiction"}],
                "vote_average": 8.4,
                "overview": "Cobb steals secrets from dreams.",
                "release_date": "2010-07-15",
                "poster_path": "/inception.jpg"
            }))
            .into_response(),
            "500" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
            "garbage" => "<html>not json</html>".into_response(),
            _ => StatusCode::NOT_FOUND.into_response(),
        }
    }

    async fn spawn_fake_tmdb() -> String {
        let app = Router::new().route("/3/movie/:id", get(movie));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn provider(api_url: String) -> TmdbProvider {
        TmdbProvider::new(
            "test_key".to_string(),
            api_url,
            "en-US".to_string(),
            "https://image.tmdb.org/t/p/w500".to_string(),
            Duration::from_secs(2),
        )
        .unwrap()
    }

    #[test]
    fn test_details_url_trims_trailing_slash() {
        let provider = provider("https://api.themoviedb.org/".to_string());
        assert_eq!(
            provider.details_url(&ItemId::from("550")),
            "https://api.themoviedb.org/3/movie/550"
        );
    }

    #[tokio::test]
    async fn test_fetch_details_success() {
        let provider = provider(spawn_fake_tmdb().await);

        let record = provider.fetch_details(&ItemId::from("27205")).await.unwrap();
        assert_eq!(record.categories, vec!["Action", "Science Fiction"]);
        assert_eq!(record.score, Some(8.4));
        assert_eq!(record.release_year, Some(2010));
        assert_eq!(
            record.artwork_url.as_deref(),
            Some("https://image.tmdb.org/t/p/w500/inception.jpg")
        );
    }

    #[tokio::test]
    async fn test_fetch_details_not_found() {
        let provider = provider(spawn_fake_tmdb().await);

        let err = provider.fetch_details(&ItemId::from("1")).await.unwrap_err();
        assert!(matches!(err, MetadataError::Status(404)));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_fetch_details_server_error_is_transient() {
        let provider = provider(spawn_fake_tmdb().await);

        let err = provider.fetch_details(&ItemId::from("500")).await.unwrap_err();
        assert!(matches!(err, MetadataError::Status(500)));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_fetch_details_malformed_body() {
        let provider = provider(spawn_fake_tmdb().await);

        let err = provider
            .fetch_details(&ItemId::from("garbage"))
            .await
            .unwrap_err();
        assert!(matches!(err, MetadataError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_fetch_details_connection_refused() {
        let provider = provider("http://127.0.0.1:1".to_string());

        let err = provider.fetch_details(&ItemId::from("27205")).await.unwrap_err();
        assert!(matches!(err, MetadataError::Http(_)));
    }
}
