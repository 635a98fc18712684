use async_trait::async_trait;
use geo_types::LineString;
use serde::{Deserialize, Serialize};

use crate::{
    api::RoutePlanner,
    config::Config,
    entities::{Coordinates, RouteCandidate},
    error::{invalid_input_error, upstream_error, Error},
};

#[derive(Clone, Debug)]
pub struct OsrmClient {
    inner: reqwest::Client,
    base: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Response {
    code: String,
    #[serde(default)]
    routes: Vec<Route>,
    message: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Route {
    geometry: Geometry,
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    duration: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Geometry {
    coordinates: Vec<(f64, f64)>,
}

impl From<Route> for RouteCandidate {
    fn from(route: Route) -> Self {
        Self {
            geometry: LineString::from(route.geometry.coordinates),
            distance: route.distance,
            duration: route.duration,
        }
    }
}

impl OsrmClient {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let inner = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            inner,
            base: config.router_base.trim_end_matches('/').into(),
        })
    }
}

#[async_trait]
impl RoutePlanner for OsrmClient {
    #[tracing::instrument(skip(self))]
    async fn find_routes(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<Vec<RouteCandidate>, Error> {
        let url = format!(
            "{}/route/v1/driving/{};{}",
            self.base,
            origin.lon_lat(),
            destination.lon_lat()
        );

        let res = self
            .inner
            .get(url)
            .query(&[("overview", "full"), ("geometries", "geojson")])
            .send()
            .await?;

        let status_code = res.status().as_u16();

        if status_code >= 500 {
            return Err(upstream_error());
        }

        // OSRM answers unroutable requests with a 400 and a JSON body
        let data: Response = match res.json().await {
            Ok(data) => data,
            Err(_) if status_code >= 400 => return Err(invalid_input_error()),
            Err(err) => return Err(err.into()),
        };

        match (status_code, data.code.as_str()) {
            (_, "NoRoute") | (_, "NoSegment") => {
                tracing::info!("no route: {:?}", data.message);
                Ok(vec![])
            }
            (200, "Ok") => Ok(data.routes.into_iter().map(RouteCandidate::from).collect()),
            (400..=499, _) => Err(invalid_input_error()),
            _ => Err(upstream_error()),
        }
    }
}

#[cfg(test)]
fn fixture_client(base: String) -> OsrmClient {
    OsrmClient::new(&Config {
        router_base: base,
        ..Config::default()
    })
    .unwrap()
}

#[test]
fn find_routes_orders_coordinates_lon_lat() {
    use axum::{
        extract::{Path, Query},
        routing::get,
        Json, Router,
    };
    use serde_json::json;
    use std::collections::HashMap;

    tokio_test::block_on(async {
        let app = Router::new().route(
            "/route/v1/driving/:coordinates",
            get(
                |Path(coordinates): Path<String>,
                 Query(params): Query<HashMap<String, String>>| async move {
                    let full_geojson = params.get("overview").map(String::as_str) == Some("full")
                        && params.get("geometries").map(String::as_str) == Some("geojson");

                    if coordinates == "77.209,28.6139;77.2295,28.6129" && full_geojson {
                        Json(json!({
                            "code": "Ok",
                            "routes": [{
                                "geometry": {
                                    "type": "LineString",
                                    "coordinates": [[77.209, 28.6139], [77.22, 28.61], [77.2295, 28.6129]]
                                },
                                "distance": 2875.4,
                                "duration": 412.9
                            }]
                        }))
                    } else {
                        Json(json!({ "code": "InvalidQuery", "routes": [] }))
                    }
                },
            ),
        );

        let client = fixture_client(crate::external::serve_fixture(app).await);

        let routes = client
            .find_routes(
                Coordinates::new(28.6139, 77.2090),
                Coordinates::new(28.6129, 77.2295),
            )
            .await
            .unwrap();

        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].geometry.0.len(), 3);
        assert_eq!(routes[0].geometry.0[0].x, 77.209);
        assert_eq!(routes[0].distance, 2875.4);
    });
}

#[test]
fn unroutable_request_yields_no_candidates() {
    use axum::{http::StatusCode, routing::get, Json, Router};
    use serde_json::json;

    tokio_test::block_on(async {
        let app = Router::new().route(
            "/route/v1/driving/:coordinates",
            get(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "code": "NoRoute", "message": "Impossible route between points" })),
                )
            }),
        );

        let client = fixture_client(crate::external::serve_fixture(app).await);

        let routes = client
            .find_routes(Coordinates::new(51.5034, -0.1276), Coordinates::new(40.7128, -74.0060))
            .await
            .unwrap();

        assert!(routes.is_empty());
    });
}

#[test]
fn server_errors_are_upstream_errors() {
    use axum::{http::StatusCode, routing::get, Router};

    tokio_test::block_on(async {
        let app = Router::new().route(
            "/route/v1/driving/:coordinates",
            get(|| async { StatusCode::BAD_GATEWAY }),
        );

        let client = fixture_client(crate::external::serve_fixture(app).await);

        let result = client
            .find_routes(Coordinates::new(0.0, 0.0), Coordinates::new(1.0, 1.0))
            .await;

        assert_eq!(result, Err(upstream_error()));
    });
}
