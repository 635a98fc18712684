use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use serde::{Deserialize, Serialize};

use crate::{
    api::Geocoder,
    config::Config,
    entities::Coordinates,
    error::{invalid_input_error, upstream_error, Error},
};

#[derive(Clone, Debug)]
pub struct NominatimClient {
    inner: reqwest::Client,
    base: String,
    user_agent: String,
    region_hint: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
}

impl NominatimClient {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let inner = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner,
            base: config.geocoder_base.trim_end_matches('/').into(),
            user_agent: config.user_agent.clone(),
            region_hint: config.region_hint.clone(),
        })
    }

    fn query_for(&self, address: &str) -> String {
        match &self.region_hint {
            Some(hint) => format!("{} {}", address, hint),
            None => address.into(),
        }
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    #[tracing::instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<Coordinates>, Error> {
        let url = format!("{}/search", self.base);

        let res = self
            .inner
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .query(&[("format", "json"), ("limit", "1")])
            .query(&[("q", self.query_for(query))])
            .send()
            .await?;

        let status_code = res.status().as_u16();

        if (400..500).contains(&status_code) {
            return Err(invalid_input_error());
        } else if status_code != 200 {
            return Err(upstream_error());
        }

        let data: Vec<SearchResult> = res.json().await?;

        tracing::debug!(
            "{} candidate(s), first: {:?}",
            data.len(),
            data.first().map(|r| &r.display_name)
        );

        data.iter().map(to_coordinates).collect()
    }
}

fn to_coordinates(result: &SearchResult) -> Result<Coordinates, Error> {
    let latitude = result.lat.trim().parse().map_err(|_| upstream_error())?;
    let longitude = result.lon.trim().parse().map_err(|_| upstream_error())?;

    Ok(Coordinates::new(latitude, longitude))
}

#[cfg(test)]
fn fixture_client(base: String) -> NominatimClient {
    NominatimClient::new(&Config {
        geocoder_base: base,
        ..Config::default()
    })
    .unwrap()
}

#[test]
fn search_appends_region_hint_and_identifies_itself() {
    use axum::{extract::Query, http::HeaderMap, routing::get, Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    tokio_test::block_on(async {
        let app = Router::new().route(
            "/search",
            get(
                |Query(params): Query<HashMap<String, String>>, headers: HeaderMap| async move {
                    let agent = headers
                        .get("user-agent")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();

                    if params.get("q").map(String::as_str) == Some("India Gate India")
                        && params.get("limit").map(String::as_str) == Some("1")
                        && agent == "SheSafe/1.0 (contact@example.com)"
                    {
                        Json(json!([
                            { "lat": "28.6129", "lon": "77.2295", "display_name": "India Gate" }
                        ]))
                    } else {
                        Json(json!([]))
                    }
                },
            ),
        );

        let client = fixture_client(crate::external::serve_fixture(app).await);

        let found = client.search("India Gate").await.unwrap();
        assert_eq!(found, vec![Coordinates::new(28.6129, 77.2295)]);

        let missing = client.search("Atlantis").await.unwrap();
        assert!(missing.is_empty());
    });
}

#[test]
fn search_reports_upstream_failures() {
    use axum::{http::StatusCode, routing::get, Json, Router};
    use serde_json::json;

    tokio_test::block_on(async {
        let down = Router::new().route(
            "/search",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
        );
        let client = fixture_client(crate::external::serve_fixture(down).await);
        assert_eq!(client.search("Saket").await, Err(upstream_error()));

        let garbled = Router::new().route(
            "/search",
            get(|| async { Json(json!([{ "lat": "north", "lon": "77.2" }])) }),
        );
        let client = fixture_client(crate::external::serve_fixture(garbled).await);
        assert_eq!(client.search("Saket").await, Err(upstream_error()));
    });
}
