mod options;
mod state;
#[cfg(test)]
mod testing;

pub use options::ControllerOptions;
pub use state::Status;

use std::sync::{Arc, Mutex, Weak};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::{
    api::{
        DynGeocoder, DynMapHost, DynNotifier, DynPositionSensor, DynRoutePlanner, MapSurface,
    },
    entities::{AddressPair, Coordinates, Marker, OverlayId, Polyline, RoutePath, Side},
    error::{address_not_found_error, route_not_found_error, Error},
    helpers::lock,
    platform::sensor::PositionSubscription,
};

#[derive(Clone)]
pub struct Collaborators {
    pub geocoder: DynGeocoder,
    pub planner: DynRoutePlanner,
    pub sensor: DynPositionSensor,
    pub host: DynMapHost,
    pub notifier: DynNotifier,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    EmptyAddress,
    Unchanged,
    NotReady,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RouteSummary {
    pub origin: Coordinates,
    pub destination: Coordinates,
    pub points: usize,
    pub distance: f64,
    pub duration: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Skipped(SkipReason),
    Rendered(RouteSummary),
    /// The error has already been shown to the user.
    Failed(Error),
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct RouteRequest {
    addresses: AddressPair,
    trigger: u64,
}

#[derive(Default)]
struct Overlays {
    user: Option<OverlayId>,
    start: Option<OverlayId>,
    destination: Option<OverlayId>,
    route: Option<OverlayId>,
}

struct Watch {
    subscription: Option<PositionSubscription>,
    task: JoinHandle<()>,
}

#[derive(Default)]
struct Shared {
    surface: Option<Box<dyn MapSurface>>,
    status: Status,
    follow_user: bool,
    overlays: Overlays,
    last_request: Option<RouteRequest>,
    // bumped on initialize and teardown; position continuations from an older epoch are dropped
    epoch: u64,
    // bumped on every accepted request and on teardown; route continuations holding an older ticket are dropped
    ticket: u64,
    watch: Option<Watch>,
}

struct Inner {
    id: Uuid,
    collaborators: Collaborators,
    options: ControllerOptions,
    shared: Mutex<Shared>,
}

/// Every clone drives the same map. The map is torn down when the last clone is dropped.
#[derive(Clone)]
pub struct RouteMapController {
    inner: Arc<Inner>,
}

impl RouteMapController {
    pub fn new(collaborators: Collaborators, options: ControllerOptions) -> Self {
        let shared = Shared {
            follow_user: true,
            ..Shared::default()
        };

        Self {
            inner: Arc::new(Inner {
                id: Uuid::new_v4(),
                collaborators,
                options,
                shared: Mutex::new(shared),
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn status(&self) -> Status {
        lock(&self.inner.shared).status
    }

    pub fn follow_user(&self) -> bool {
        lock(&self.inner.shared).follow_user
    }

    /// Attaches a map surface for `container` and starts position sensing. Must be called
    /// from within a Tokio runtime.
    #[tracing::instrument(skip(self), fields(controller = %self.inner.id))]
    pub fn initialize(&self, container: &str) -> Result<(), Error> {
        let epoch = {
            let mut shared = lock(&self.inner.shared);

            if shared.surface.is_some() {
                tracing::debug!("already initialized");
                return Ok(());
            }

            let mut surface = match self.inner.collaborators.host.create_surface(container) {
                Ok(surface) => surface,
                Err(err) => {
                    tracing::warn!("cannot create map surface: {}", err);
                    return Err(err);
                }
            };

            let options = &self.inner.options;
            surface.set_view(options.default_center, options.default_zoom);
            surface.add_tile_layer(options.tile_layer.clone());

            shared.status.initialize()?;
            shared.surface = Some(surface);
            shared.epoch += 1;
            shared.epoch
        };

        self.start_sensing(epoch);

        tracing::info!("map ready");

        Ok(())
    }

    pub fn set_follow_user(&self, enabled: bool) {
        lock(&self.inner.shared).follow_user = enabled;
    }

    pub fn apply_position(&self, position: Coordinates) -> bool {
        self.inner.apply_position(None, position, false)
    }

    /// Resolves both addresses, draws start and destination markers and the driving path between them.
    ///
    /// Failures are reported through the notifier and returned as [`Outcome::Failed`]. A call with
    /// the same addresses and `trigger` as the last accepted one is skipped without network traffic;
    /// pass a new trigger (e.g. a timestamp) to force another run.
    #[tracing::instrument(skip(self), fields(controller = %self.inner.id))]
    pub async fn request_route(&self, origin: &str, destination: &str, trigger: u64) -> Outcome {
        let addresses = AddressPair::new(origin, destination);

        let (origin_query, destination_query) = match addresses.trimmed() {
            Some((o, d)) => (o.to_string(), d.to_string()),
            None => {
                tracing::debug!("blank address, nothing to resolve");
                return Outcome::Skipped(SkipReason::EmptyAddress);
            }
        };

        let request = RouteRequest { addresses, trigger };

        let ticket = {
            let mut shared = lock(&self.inner.shared);

            if shared.surface.is_none() {
                tracing::debug!("no map attached");
                return Outcome::Skipped(SkipReason::NotReady);
            }

            if shared.last_request.as_ref() == Some(&request) {
                tracing::debug!("unchanged request");
                return Outcome::Skipped(SkipReason::Unchanged);
            }

            if let Err(err) = shared.status.begin_resolving() {
                tracing::warn!("cannot start resolving: {}", err);
                return Outcome::Skipped(SkipReason::NotReady);
            }

            shared.last_request = Some(request);
            shared.ticket += 1;
            shared.ticket
        };

        let geocoder = &self.inner.collaborators.geocoder;
        let (origin_result, destination_result) = futures::future::join(
            geocoder.search(&origin_query),
            geocoder.search(&destination_query),
        )
        .await;

        if !self.inner.is_current(ticket) {
            tracing::debug!("discarding geocoding results");
            return Outcome::Cancelled;
        }

        let origin = match first_candidate(Side::Origin, origin_result) {
            Ok(coordinates) => coordinates,
            Err(err) => return self.inner.fail(ticket, err),
        };
        let destination = match first_candidate(Side::Destination, destination_result) {
            Ok(coordinates) => coordinates,
            Err(err) => return self.inner.fail(ticket, err),
        };

        if !self.inner.place_route_markers(ticket, origin, destination) {
            return Outcome::Cancelled;
        }

        let routes = self
            .inner
            .collaborators
            .planner
            .find_routes(origin, destination)
            .await;

        if !self.inner.is_current(ticket) {
            tracing::debug!("discarding routing results");
            return Outcome::Cancelled;
        }

        let path = match routes {
            Ok(routes) => routes.first().map(RoutePath::from),
            Err(err) => {
                tracing::warn!("route request failed: {}", err);
                None
            }
        };

        match path {
            Some(path) if !path.is_empty() => self.inner.render_path(ticket, origin, destination, path),
            _ => self.inner.fail(ticket, route_not_found_error()),
        }
    }

    /// Stops position sensing and disposes the map surface. Safe to call any number of times.
    pub fn teardown(&self) {
        self.inner.teardown();
    }

    fn start_sensing(&self, epoch: u64) {
        let sensor = self.inner.collaborators.sensor.clone();

        let subscription = match sensor.watch() {
            Ok(subscription) => Some(subscription),
            Err(err) => {
                tracing::warn!("position watch unavailable: {}", err);
                None
            }
        };

        let stream = subscription.as_ref().map(PositionSubscription::handle);
        let inner = Arc::downgrade(&self.inner);

        let task = tokio::spawn(async move {
            match sensor.current_position().await {
                Ok(position) => {
                    apply_reading(&inner, epoch, position, true);
                }
                Err(err) => tracing::warn!("initial position error: {}", err),
            }

            let stream = match stream {
                Some(stream) => stream,
                None => return,
            };

            while let Some(reading) = stream.next().await {
                match reading {
                    Ok(position) => {
                        if !apply_reading(&inner, epoch, position, false) {
                            break;
                        }
                    }
                    Err(err) => tracing::warn!("position watch error: {}", err),
                }
            }
        });

        let mut shared = lock(&self.inner.shared);

        if shared.epoch == epoch {
            shared.watch = Some(Watch { subscription, task });
        } else {
            // torn down in the meantime
            if let Some(subscription) = subscription {
                subscription.cancel();
            }
            task.abort();
        }
    }
}

fn apply_reading(inner: &Weak<Inner>, epoch: u64, position: Coordinates, initial: bool) -> bool {
    match inner.upgrade() {
        Some(inner) => inner.apply_position(Some(epoch), position, initial),
        None => false,
    }
}

fn first_candidate(
    side: Side,
    result: Result<Vec<Coordinates>, Error>,
) -> Result<Coordinates, Error> {
    match result {
        Ok(candidates) => candidates
            .into_iter()
            .next()
            .ok_or_else(|| address_not_found_error(side)),
        Err(err) => {
            tracing::warn!("{} lookup failed: {}", side, err);
            Err(address_not_found_error(side))
        }
    }
}

impl Inner {
    fn is_current(&self, ticket: u64) -> bool {
        let shared = lock(&self.shared);
        shared.ticket == ticket && shared.surface.is_some()
    }

    fn apply_position(&self, epoch: Option<u64>, position: Coordinates, initial: bool) -> bool {
        let mut shared = lock(&self.shared);

        if epoch.map_or(false, |epoch| epoch != shared.epoch) {
            return false;
        }

        let follow_user = shared.follow_user;
        let Shared {
            surface, overlays, ..
        } = &mut *shared;

        let surface = match surface.as_mut() {
            Some(surface) => surface,
            None => return false,
        };

        match overlays.user {
            Some(id) => surface.move_marker(id, position),
            None => {
                let marker = Marker::new(position)
                    .with_title("You")
                    .with_popup("You are here");
                overlays.user = Some(surface.add_marker(marker));
            }
        }

        if follow_user {
            if initial {
                surface.set_view(position, self.options.follow_zoom);
            } else {
                surface.pan_to(position);
            }
        }

        true
    }

    fn place_route_markers(&self, ticket: u64, origin: Coordinates, destination: Coordinates) -> bool {
        let mut shared = lock(&self.shared);

        if shared.ticket != ticket {
            return false;
        }

        let Shared {
            surface, overlays, ..
        } = &mut *shared;

        let surface = match surface.as_mut() {
            Some(surface) => surface,
            None => return false,
        };

        for id in [
            overlays.route.take(),
            overlays.start.take(),
            overlays.destination.take(),
        ]
        .into_iter()
        .flatten()
        {
            surface.remove_overlay(id);
        }

        overlays.start = Some(surface.add_marker(Marker::new(origin).with_popup("Start").open_popup()));
        overlays.destination =
            Some(surface.add_marker(Marker::new(destination).with_popup("Destination")));

        true
    }

    fn render_path(
        &self,
        ticket: u64,
        origin: Coordinates,
        destination: Coordinates,
        path: RoutePath,
    ) -> Outcome {
        let mut shared = lock(&self.shared);

        if shared.ticket != ticket {
            return Outcome::Cancelled;
        }

        let Shared {
            surface,
            overlays,
            status,
            ..
        } = &mut *shared;

        let surface = match surface.as_mut() {
            Some(surface) => surface,
            None => return Outcome::Cancelled,
        };

        let polyline = Polyline {
            points: path.points.clone(),
            style: self.options.route_style.clone(),
        };
        overlays.route = Some(surface.add_polyline(polyline));

        if let Some(bounds) = path.bounds() {
            surface.fit_bounds(bounds, self.options.fit_padding);
        }

        if let Err(err) = status.finish() {
            tracing::warn!("unexpected status {:?}: {}", status, err);
        }

        tracing::info!(
            "route rendered: {} points, {:.0} m",
            path.points.len(),
            path.distance
        );

        Outcome::Rendered(RouteSummary {
            origin,
            destination,
            points: path.points.len(),
            distance: path.distance,
            duration: path.duration,
        })
    }

    fn fail(&self, ticket: u64, err: Error) -> Outcome {
        {
            let mut shared = lock(&self.shared);

            if shared.ticket != ticket || shared.surface.is_none() {
                return Outcome::Cancelled;
            }

            if let Err(state_err) = shared.status.fail() {
                tracing::warn!("unexpected status {:?}: {}", shared.status, state_err);
            }
        }

        tracing::info!("route request failed: {}", err);
        self.collaborators.notifier.notify(&err);

        Outcome::Failed(err)
    }

    fn teardown(&self) {
        let (surface, watch) = {
            let mut shared = lock(&self.shared);

            shared.epoch += 1;
            shared.ticket += 1;
            shared.status.teardown();
            shared.overlays = Overlays::default();
            shared.last_request = None;

            (shared.surface.take(), shared.watch.take())
        };

        if let Some(watch) = watch {
            if let Some(subscription) = watch.subscription {
                subscription.cancel();
            }
            watch.task.abort();
        }

        if let Some(mut surface) = surface {
            surface.dispose();
            tracing::info!(controller = %self.id, "torn down");
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[test]
fn resolvable_pair_renders_one_path_and_two_markers() {
    use crate::controller::testing::{Harness, CONNAUGHT_PLACE, INDIA_GATE};
    use crate::entities::Padding;

    tokio_test::block_on(async {
        let h = Harness::delhi();
        assert_eq!(h.controller.status(), Status::Uninitialized);

        h.controller.initialize("map").unwrap();
        assert_eq!(h.controller.status(), Status::Ready);

        let outcome = h
            .controller
            .request_route("Connaught Place", "India Gate", 1)
            .await;

        match outcome {
            Outcome::Rendered(summary) => {
                assert_eq!(summary.origin, CONNAUGHT_PLACE);
                assert_eq!(summary.destination, INDIA_GATE);
                assert_eq!(summary.points, 3);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(h.controller.status(), Status::Rendered);

        let surface = h.surface();
        assert_eq!(surface.polylines.len(), 1);
        assert_eq!(surface.markers.len(), 2);
        assert_eq!(surface.marker_with_popup("Start").unwrap().position, CONNAUGHT_PLACE);
        assert!(surface.marker_with_popup("Start").unwrap().popup_open);
        assert_eq!(surface.marker_with_popup("Destination").unwrap().position, INDIA_GATE);

        let line = surface.polylines.values().next().unwrap();
        assert_eq!(line.points.first(), Some(&CONNAUGHT_PLACE));
        assert_eq!(line.points.last(), Some(&INDIA_GATE));
        assert_eq!(line.style.color, "#8a2be2");

        let (_, padding) = surface.fitted.unwrap();
        assert_eq!(padding, Padding::uniform(50));
        assert!(h.notifier.notices().is_empty());

        // a forced re-run replaces the overlays instead of stacking them
        h.controller
            .request_route("Connaught Place", "India Gate", 2)
            .await;

        let surface = h.surface();
        assert_eq!(surface.polylines.len(), 1);
        assert_eq!(surface.markers.len(), 2);
        assert_eq!(h.geocoder.calls(), 4);
        assert_eq!(h.planner.calls(), 2);
    });
}

#[test]
fn request_passes_through_resolving() {
    use crate::controller::testing::{rajpath, settle, FakeGeocoder, FakePlanner, Harness};
    use crate::controller::testing::{CONNAUGHT_PLACE, INDIA_GATE};
    use std::sync::Arc;
    use tokio::sync::Semaphore;

    tokio_test::block_on(async {
        let gate = Arc::new(Semaphore::new(0));
        let h = Harness::new(
            FakeGeocoder::new()
                .knows("Connaught Place", CONNAUGHT_PLACE)
                .knows("India Gate", INDIA_GATE)
                .gated(gate.clone()),
            FakePlanner::with(vec![rajpath()]),
        );
        h.controller.initialize("map").unwrap();

        let controller = h.controller.clone();
        let pending = tokio::spawn(async move {
            controller
                .request_route("Connaught Place", "India Gate", 1)
                .await
        });

        settle().await;
        assert_eq!(h.controller.status(), Status::Resolving);
        assert_eq!(h.geocoder.calls(), 2);

        gate.add_permits(2);
        let outcome = pending.await.unwrap();

        assert!(matches!(outcome, Outcome::Rendered(_)));
        assert_eq!(h.controller.status(), Status::Rendered);
    });
}

#[test]
fn unresolvable_destination_is_named_and_nothing_is_drawn() {
    use crate::controller::testing::{rajpath, FakeGeocoder, FakePlanner, Harness};
    use crate::controller::testing::{CONNAUGHT_PLACE, INDIA_GATE};

    tokio_test::block_on(async {
        let h = Harness::new(
            FakeGeocoder::new()
                .knows("Connaught Place", CONNAUGHT_PLACE)
                .knows("India Gate", INDIA_GATE),
            FakePlanner::with(vec![rajpath()]),
        );
        h.controller.initialize("map").unwrap();

        let outcome = h
            .controller
            .request_route("Connaught Place", "Atlantis", 1)
            .await;

        let expected = address_not_found_error(Side::Destination);
        assert_eq!(outcome, Outcome::Failed(expected.clone()));
        assert_eq!(h.notifier.notices(), vec![expected]);
        assert_eq!(h.controller.status(), Status::Errored);
        assert_eq!(h.planner.calls(), 0);

        let surface = h.surface();
        assert!(surface.polylines.is_empty());
        assert!(surface.markers.is_empty());

        // errored is not terminal
        let outcome = h
            .controller
            .request_route("Connaught Place", "India Gate", 2)
            .await;
        assert!(matches!(outcome, Outcome::Rendered(_)));
    });
}

#[test]
fn failed_origin_lookup_is_reported_as_origin_not_found() {
    use crate::controller::testing::{rajpath, FakeGeocoder, FakePlanner, Harness, INDIA_GATE};

    tokio_test::block_on(async {
        let h = Harness::new(
            FakeGeocoder::new()
                .broken_for("Connaught Place")
                .knows("India Gate", INDIA_GATE),
            FakePlanner::with(vec![rajpath()]),
        );
        h.controller.initialize("map").unwrap();

        let outcome = h
            .controller
            .request_route("Connaught Place", "India Gate", 1)
            .await;

        assert_eq!(outcome, Outcome::Failed(address_not_found_error(Side::Origin)));
        assert_eq!(h.notifier.notices().len(), 1);
        assert!(h.surface().markers.is_empty());
    });
}

#[test]
fn blank_address_makes_no_network_calls() {
    use crate::controller::testing::Harness;

    tokio_test::block_on(async {
        let h = Harness::delhi();
        h.controller.initialize("map").unwrap();
        let draw_calls = h.surface().draw_calls;

        let outcome = h
            .controller
            .request_route("10 Downing Street, London", "", 1)
            .await;
        assert_eq!(outcome, Outcome::Skipped(SkipReason::EmptyAddress));

        let outcome = h.controller.request_route("   ", "India Gate", 2).await;
        assert_eq!(outcome, Outcome::Skipped(SkipReason::EmptyAddress));

        assert_eq!(h.geocoder.calls(), 0);
        assert_eq!(h.surface().draw_calls, draw_calls);
        assert_eq!(h.controller.status(), Status::Ready);
    });
}

#[test]
fn missing_route_keeps_markers_and_notifies_once() {
    use crate::controller::testing::{FakeGeocoder, FakePlanner, Harness};
    use crate::controller::testing::{CONNAUGHT_PLACE, INDIA_GATE};

    tokio_test::block_on(async {
        let h = Harness::new(
            FakeGeocoder::new()
                .knows("Connaught Place", CONNAUGHT_PLACE)
                .knows("India Gate", INDIA_GATE),
            FakePlanner::with(vec![]),
        );
        h.controller.initialize("map").unwrap();

        let outcome = h
            .controller
            .request_route("Connaught Place", "India Gate", 1)
            .await;

        assert_eq!(outcome, Outcome::Failed(route_not_found_error()));
        assert_eq!(h.notifier.notices(), vec![route_not_found_error()]);
        assert_eq!(h.controller.status(), Status::Errored);

        let surface = h.surface();
        assert!(surface.polylines.is_empty());
        assert!(surface.marker_with_popup("Start").is_some());
        assert!(surface.marker_with_popup("Destination").is_some());
    });
}

#[test]
fn routing_failure_reads_as_missing_route() {
    use crate::controller::testing::{FakeGeocoder, FakePlanner, Harness};
    use crate::controller::testing::{CONNAUGHT_PLACE, INDIA_GATE};

    tokio_test::block_on(async {
        let h = Harness::new(
            FakeGeocoder::new()
                .knows("Connaught Place", CONNAUGHT_PLACE)
                .knows("India Gate", INDIA_GATE),
            FakePlanner::broken(),
        );
        h.controller.initialize("map").unwrap();

        let outcome = h
            .controller
            .request_route("Connaught Place", "India Gate", 1)
            .await;

        assert_eq!(outcome, Outcome::Failed(route_not_found_error()));
        assert_eq!(h.surface().markers.len(), 2);
    });
}

#[test]
fn unchanged_trigger_does_not_repeat_lookups() {
    use crate::controller::testing::Harness;

    tokio_test::block_on(async {
        let h = Harness::delhi();
        h.controller.initialize("map").unwrap();

        h.controller
            .request_route("Connaught Place", "India Gate", 42)
            .await;
        let again = h
            .controller
            .request_route("Connaught Place", "India Gate", 42)
            .await;

        assert_eq!(again, Outcome::Skipped(SkipReason::Unchanged));
        assert_eq!(h.geocoder.calls(), 2);
        assert_eq!(h.planner.calls(), 1);

        h.controller
            .request_route("Connaught Place", "India Gate", 43)
            .await;
        assert_eq!(h.geocoder.calls(), 4);
    });
}

#[test]
fn teardown_during_request_leaves_disposed_surface_untouched() {
    use crate::controller::testing::{rajpath, settle, FakeGeocoder, FakePlanner, Harness};
    use crate::controller::testing::{CONNAUGHT_PLACE, INDIA_GATE};
    use std::sync::Arc;
    use tokio::sync::Semaphore;

    tokio_test::block_on(async {
        let gate = Arc::new(Semaphore::new(0));
        let h = Harness::new(
            FakeGeocoder::new()
                .knows("Connaught Place", CONNAUGHT_PLACE)
                .knows("India Gate", INDIA_GATE)
                .gated(gate.clone()),
            FakePlanner::with(vec![rajpath()]),
        );
        h.controller.initialize("map").unwrap();
        let probe = h.host.probe("map").unwrap();

        let controller = h.controller.clone();
        let pending = tokio::spawn(async move {
            controller
                .request_route("Connaught Place", "India Gate", 1)
                .await
        });

        settle().await;
        h.controller.teardown();
        gate.add_permits(2);

        assert_eq!(pending.await.unwrap(), Outcome::Cancelled);

        let surface = probe.snapshot();
        assert!(surface.disposed);
        assert_eq!(surface.late_calls, 0);
        assert!(surface.markers.is_empty());
        assert_eq!(h.planner.calls(), 0);
        assert!(h.notifier.notices().is_empty());
        assert_eq!(h.controller.status(), Status::Uninitialized);
    });
}

#[test]
fn teardown_while_routing_discards_the_route() {
    use crate::controller::testing::{rajpath, settle, FakePlanner, Harness};
    use crate::controller::testing::{FakeGeocoder, CONNAUGHT_PLACE, INDIA_GATE};
    use std::sync::Arc;
    use tokio::sync::Semaphore;

    tokio_test::block_on(async {
        let gate = Arc::new(Semaphore::new(0));
        let h = Harness::new(
            FakeGeocoder::new()
                .knows("Connaught Place", CONNAUGHT_PLACE)
                .knows("India Gate", INDIA_GATE),
            FakePlanner::with(vec![rajpath()]).gated(gate.clone()),
        );
        h.controller.initialize("map").unwrap();
        let probe = h.host.probe("map").unwrap();

        let controller = h.controller.clone();
        let pending = tokio::spawn(async move {
            controller
                .request_route("Connaught Place", "India Gate", 1)
                .await
        });

        settle().await;
        assert_eq!(h.planner.calls(), 1);
        assert_eq!(probe.snapshot().markers.len(), 2);

        h.controller.teardown();
        gate.add_permits(1);

        assert_eq!(pending.await.unwrap(), Outcome::Cancelled);

        let surface = probe.snapshot();
        assert!(surface.disposed);
        assert_eq!(surface.late_calls, 0);
        assert!(surface.polylines.is_empty());
        assert!(h.notifier.notices().is_empty());
    });
}

#[test]
fn newer_request_supersedes_outstanding_one() {
    use crate::controller::testing::{rajpath, settle, FakeGeocoder, FakePlanner, Harness};
    use crate::controller::testing::{CONNAUGHT_PLACE, INDIA_GATE};
    use std::sync::Arc;
    use tokio::sync::Semaphore;

    tokio_test::block_on(async {
        let gate = Arc::new(Semaphore::new(0));
        let h = Harness::new(
            FakeGeocoder::new()
                .knows("Connaught Place", CONNAUGHT_PLACE)
                .knows("India Gate", INDIA_GATE)
                .gated(gate.clone()),
            FakePlanner::with(vec![rajpath()]),
        );
        h.controller.initialize("map").unwrap();

        let first = {
            let controller = h.controller.clone();
            tokio::spawn(async move {
                controller
                    .request_route("Connaught Place", "India Gate", 1)
                    .await
            })
        };
        settle().await;

        let second = {
            let controller = h.controller.clone();
            tokio::spawn(async move {
                controller
                    .request_route("Connaught Place", "India Gate", 2)
                    .await
            })
        };
        settle().await;

        gate.add_permits(4);

        assert_eq!(first.await.unwrap(), Outcome::Cancelled);
        assert!(matches!(second.await.unwrap(), Outcome::Rendered(_)));

        let surface = h.surface();
        assert_eq!(surface.markers.len(), 2);
        assert_eq!(surface.polylines.len(), 1);
        assert_eq!(h.planner.calls(), 1);
    });
}

#[test]
fn teardown_is_idempotent_and_blocks_requests() {
    use crate::controller::testing::Harness;

    tokio_test::block_on(async {
        let h = Harness::delhi();

        h.controller.teardown();
        h.controller.initialize("map").unwrap();
        h.controller.teardown();
        h.controller.teardown();

        assert!(h.surface().disposed);
        assert_eq!(h.controller.status(), Status::Uninitialized);

        let outcome = h
            .controller
            .request_route("Connaught Place", "India Gate", 1)
            .await;
        assert_eq!(outcome, Outcome::Skipped(SkipReason::NotReady));
        assert_eq!(h.geocoder.calls(), 0);

        // a fresh surface after re-initializing
        h.controller.initialize("map").unwrap();
        assert!(!h.surface().disposed);
        assert!(matches!(
            h.controller
                .request_route("Connaught Place", "India Gate", 1)
                .await,
            Outcome::Rendered(_)
        ));
    });
}

#[test]
fn missing_container_leaves_controller_uninitialized() {
    use crate::controller::testing::Harness;
    use crate::error::container_unavailable_error;

    tokio_test::block_on(async {
        let h = Harness::delhi();

        assert_eq!(
            h.controller.initialize("sidebar"),
            Err(container_unavailable_error("sidebar"))
        );
        assert_eq!(h.controller.status(), Status::Uninitialized);
        assert!(!h.controller.apply_position(Coordinates::new(0.0, 0.0)));
    });
}

#[test]
fn follow_user_controls_recentering() {
    use crate::controller::testing::Harness;

    tokio_test::block_on(async {
        let h = Harness::delhi();
        h.controller.initialize("map").unwrap();
        let default_center = ControllerOptions::default().default_center;

        h.controller.set_follow_user(false);
        let here = Coordinates::new(28.5245, 77.1855);
        assert!(h.controller.apply_position(here));

        let surface = h.surface();
        assert_eq!(surface.center, Some(default_center));
        assert_eq!(surface.marker_with_popup("You are here").unwrap().position, here);

        h.controller.set_follow_user(true);
        let there = Coordinates::new(28.5355, 77.3910);
        h.controller.apply_position(there);

        let surface = h.surface();
        assert_eq!(surface.center, Some(there));
        assert_eq!(surface.markers.len(), 1);
        assert_eq!(surface.marker_with_popup("You are here").unwrap().position, there);
    });
}

#[test]
fn position_stream_moves_marker_until_teardown() {
    use crate::controller::testing::{settle, FakeGeocoder, FakePlanner, Harness, ManualSensor};

    tokio_test::block_on(async {
        let start = Coordinates::new(28.6139, 77.2090);
        let h = Harness::with_sensor(
            FakeGeocoder::new(),
            FakePlanner::with(vec![]),
            ManualSensor::at(start),
        );
        h.controller.initialize("map").unwrap();
        settle().await;

        let surface = h.surface();
        assert_eq!(surface.center, Some(start));
        assert_eq!(surface.zoom, Some(15));

        let moved = Coordinates::new(28.6200, 77.2100);
        h.sensor.push(moved).await;
        settle().await;

        let surface = h.surface();
        assert_eq!(surface.center, Some(moved));
        assert_eq!(surface.marker_with_popup("You are here").unwrap().position, moved);

        assert!(!h.sensor.is_cancelled());
        h.controller.teardown();
        assert!(h.sensor.is_cancelled());
    });
}

#[test]
fn dropping_last_handle_tears_down() {
    use crate::controller::testing::Harness;

    tokio_test::block_on(async {
        let h = Harness::delhi();
        h.controller.initialize("map").unwrap();

        let probe = h.host.probe("map").unwrap();
        let clone = h.controller.clone();

        drop(h.controller);
        assert!(!probe.snapshot().disposed);

        drop(clone);
        assert!(probe.snapshot().disposed);
    });
}
