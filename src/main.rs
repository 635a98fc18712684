use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

use saferoute::config::Config;
use saferoute::controller::{Collaborators, ControllerOptions, Outcome, RouteMapController};
use saferoute::entities::{SafetyReport, ShareLink, TripDetails};
use saferoute::error::Error;
use saferoute::external::{NominatimClient, OsrmClient};
use saferoute::platform::{LogNotifier, MemoryHost, SimulatedSensor};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt::init();
    dotenv::dotenv().ok();

    let mut args = std::env::args().skip(1);
    let (origin, destination) = match (args.next(), args.next()) {
        (Some(origin), Some(destination)) => (origin, destination),
        _ => {
            eprintln!("usage: saferoute <origin> <destination>");
            std::process::exit(2);
        }
    };

    let config = Config::env()?;
    let options = ControllerOptions::default();
    let host = Arc::new(MemoryHost::new(["map"]));

    let controller = RouteMapController::new(
        Collaborators {
            geocoder: Arc::new(NominatimClient::new(&config)?),
            planner: Arc::new(OsrmClient::new(&config)?),
            sensor: Arc::new(SimulatedSensor::new(
                options.default_center,
                0.0005,
                Duration::from_secs(2),
            )?),
            host: host.clone(),
            notifier: Arc::new(LogNotifier),
        },
        options,
    );

    controller.initialize("map")?;

    let trigger = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
    let outcome = controller.request_route(&origin, &destination, trigger).await;

    match &outcome {
        Outcome::Rendered(summary) => println!(
            "route: {} points, {:.1} km, {:.0} min",
            summary.points,
            summary.distance / 1000.0,
            summary.duration / 60.0
        ),
        Outcome::Failed(err) => println!("{}", err.message),
        other => tracing::info!("nothing rendered: {:?}", other),
    }

    if let Some(probe) = host.probe("map") {
        let surface = probe.snapshot();
        tracing::info!(
            "map has {} marker(s), {} line(s)",
            surface.markers.len(),
            surface.polylines.len()
        );
    }

    let report = SafetyReport::sample(&mut rand::thread_rng());
    println!("safety: {} ({})", report.score, report.rating.label());
    for recommendation in &report.recommendations {
        println!("  - {}", recommendation);
    }

    let trip = TripDetails::new(origin, destination);
    if let Some(link) = ShareLink::build(&trip, Some(report.score)) {
        println!("\n{}", link.clipboard_text());
    }

    controller.teardown();

    Ok(())
}
