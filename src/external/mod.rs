pub mod nominatim;
pub mod osrm;

pub use nominatim::NominatimClient;
pub use osrm::OsrmClient;

#[cfg(test)]
pub(crate) async fn serve_fixture(app: axum::Router) -> String {
    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], 0));
    let server = axum::Server::bind(&addr).serve(app.into_make_service());
    let base = format!("http://{}", server.local_addr());

    tokio::spawn(server);

    base
}
