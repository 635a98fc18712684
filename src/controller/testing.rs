use async_channel::Sender;
use async_trait::async_trait;
use geo_types::LineString;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

use super::{Collaborators, ControllerOptions, RouteMapController};
use crate::{
    api::{Geocoder, Notifier, PositionSensor, RoutePlanner},
    entities::{Coordinates, RouteCandidate},
    error::{sensing_unavailable_error, upstream_error, Error},
    platform::{
        memory::{MemoryHost, SurfaceState},
        sensor::{PositionSubscription, Reading},
    },
};

pub const CONNAUGHT_PLACE: Coordinates = Coordinates {
    latitude: 28.6315,
    longitude: 77.2167,
};

pub const INDIA_GATE: Coordinates = Coordinates {
    latitude: 28.6129,
    longitude: 77.2295,
};

pub fn rajpath() -> RouteCandidate {
    RouteCandidate {
        geometry: LineString::from(vec![
            (77.2167, 28.6315),
            (77.2190, 28.6250),
            (77.2295, 28.6129),
        ]),
        distance: 3120.0,
        duration: 540.0,
    }
}

#[derive(Default)]
pub struct FakeGeocoder {
    answers: HashMap<String, Vec<Coordinates>>,
    broken: HashSet<String>,
    gate: Option<Arc<Semaphore>>,
    calls: AtomicUsize,
}

impl FakeGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn knows(mut self, query: &str, coordinates: Coordinates) -> Self {
        self.answers.insert(query.into(), vec![coordinates]);
        self
    }

    pub fn broken_for(mut self, query: &str) -> Self {
        self.broken.insert(query.into());
        self
    }

    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn search(&self, query: &str) -> Result<Vec<Coordinates>, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }

        if self.broken.contains(query) {
            return Err(upstream_error());
        }

        Ok(self.answers.get(query).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct FakePlanner {
    routes: Vec<RouteCandidate>,
    broken: bool,
    gate: Option<Arc<Semaphore>>,
    calls: AtomicUsize,
}

impl FakePlanner {
    pub fn with(routes: Vec<RouteCandidate>) -> Self {
        Self {
            routes,
            ..Self::default()
        }
    }

    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RoutePlanner for FakePlanner {
    async fn find_routes(
        &self,
        _origin: Coordinates,
        _destination: Coordinates,
    ) -> Result<Vec<RouteCandidate>, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }

        if self.broken {
            return Err(upstream_error());
        }

        Ok(self.routes.clone())
    }
}

#[derive(Default)]
pub struct ManualSensor {
    current: Option<Coordinates>,
    sender: Mutex<Option<Sender<Reading>>>,
}

impl ManualSensor {
    pub fn at(position: Coordinates) -> Self {
        Self {
            current: Some(position),
            ..Self::default()
        }
    }

    pub async fn push(&self, position: Coordinates) {
        let sender = self.sender.lock().unwrap().clone().unwrap();
        sender.send(Ok(position)).await.unwrap();
    }

    pub fn is_cancelled(&self) -> bool {
        self.sender
            .lock()
            .unwrap()
            .as_ref()
            .map_or(false, |s| s.is_closed())
    }
}

#[async_trait]
impl PositionSensor for ManualSensor {
    async fn current_position(&self) -> Result<Coordinates, Error> {
        self.current.ok_or_else(sensing_unavailable_error)
    }

    fn watch(&self) -> Result<PositionSubscription, Error> {
        let (tx, subscription) = PositionSubscription::channel();
        *self.sender.lock().unwrap() = Some(tx);
        Ok(subscription)
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Error>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Error> {
        self.notices.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: &Error) {
        self.notices.lock().unwrap().push(notice.clone());
    }
}

pub struct Harness {
    pub controller: RouteMapController,
    pub geocoder: Arc<FakeGeocoder>,
    pub planner: Arc<FakePlanner>,
    pub sensor: Arc<ManualSensor>,
    pub host: Arc<MemoryHost>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    pub fn new(geocoder: FakeGeocoder, planner: FakePlanner) -> Self {
        Self::with_sensor(geocoder, planner, ManualSensor::default())
    }

    pub fn with_sensor(geocoder: FakeGeocoder, planner: FakePlanner, sensor: ManualSensor) -> Self {
        let geocoder = Arc::new(geocoder);
        let planner = Arc::new(planner);
        let sensor = Arc::new(sensor);
        let host = Arc::new(MemoryHost::new(["map"]));
        let notifier = Arc::new(RecordingNotifier::default());

        let controller = RouteMapController::new(
            Collaborators {
                geocoder: geocoder.clone(),
                planner: planner.clone(),
                sensor: sensor.clone(),
                host: host.clone(),
                notifier: notifier.clone(),
            },
            ControllerOptions::default(),
        );

        Self {
            controller,
            geocoder,
            planner,
            sensor,
            host,
            notifier,
        }
    }

    pub fn delhi() -> Self {
        Self::new(
            FakeGeocoder::new()
                .knows("Connaught Place", CONNAUGHT_PLACE)
                .knows("India Gate", INDIA_GATE),
            FakePlanner::with(vec![rajpath()]),
        )
    }

    pub fn surface(&self) -> SurfaceState {
        self.host.probe("map").unwrap().snapshot()
    }
}

pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}
