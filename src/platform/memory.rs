use geo_types::Rect;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::{
    api::{MapHost, MapSurface},
    entities::{Coordinates, Marker, OverlayId, Padding, Polyline, TileLayer},
    error::{container_unavailable_error, Error},
    helpers::lock,
};

#[derive(Clone, Debug, Default)]
pub struct SurfaceState {
    pub center: Option<Coordinates>,
    pub zoom: Option<u8>,
    pub tile_layers: Vec<TileLayer>,
    pub markers: HashMap<OverlayId, Marker>,
    pub polylines: HashMap<OverlayId, Polyline>,
    pub fitted: Option<(Rect<f64>, Padding)>,
    pub draw_calls: usize,
    pub disposed: bool,
    pub late_calls: usize,
}

impl SurfaceState {
    pub fn marker_with_popup(&self, popup: &str) -> Option<&Marker> {
        self.markers
            .values()
            .find(|m| m.popup.as_deref() == Some(popup))
    }
}

#[derive(Clone, Debug)]
pub struct SurfaceProbe(Arc<Mutex<SurfaceState>>);

impl SurfaceProbe {
    pub fn snapshot(&self) -> SurfaceState {
        lock(&self.0).clone()
    }
}

/// Headless map surface that keeps its overlays in memory and logs every draw call.
#[derive(Debug)]
pub struct MemorySurface {
    container: String,
    state: Arc<Mutex<SurfaceState>>,
}

impl MemorySurface {
    pub fn new(container: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            state: Arc::new(Mutex::new(SurfaceState::default())),
        }
    }

    pub fn probe(&self) -> SurfaceProbe {
        SurfaceProbe(self.state.clone())
    }

    fn draw<T>(&self, op: &str, f: impl FnOnce(&mut SurfaceState) -> T) -> T {
        let mut state = lock(&self.state);

        if state.disposed {
            state.late_calls += 1;
            tracing::warn!("{} on disposed surface {:?}", op, self.container);
        } else {
            state.draw_calls += 1;
            tracing::debug!("{} on {:?}", op, self.container);
        }

        f(&mut state)
    }
}

impl MapSurface for MemorySurface {
    fn set_view(&mut self, center: Coordinates, zoom: u8) {
        self.draw("set_view", |s| {
            s.center = Some(center);
            s.zoom = Some(zoom);
        })
    }

    fn pan_to(&mut self, center: Coordinates) {
        self.draw("pan_to", |s| s.center = Some(center))
    }

    fn fit_bounds(&mut self, bounds: Rect<f64>, padding: Padding) {
        self.draw("fit_bounds", |s| {
            s.center = Some(Coordinates::from(bounds.center()));
            s.fitted = Some((bounds, padding));
        })
    }

    fn add_tile_layer(&mut self, layer: TileLayer) {
        self.draw("add_tile_layer", |s| s.tile_layers.push(layer))
    }

    fn add_marker(&mut self, marker: Marker) -> OverlayId {
        self.draw("add_marker", |s| {
            let id = OverlayId::new();
            s.markers.insert(id, marker);
            id
        })
    }

    fn move_marker(&mut self, id: OverlayId, position: Coordinates) {
        self.draw("move_marker", |s| {
            if let Some(marker) = s.markers.get_mut(&id) {
                marker.position = position;
            }
        })
    }

    fn add_polyline(&mut self, polyline: Polyline) -> OverlayId {
        self.draw("add_polyline", |s| {
            let id = OverlayId::new();
            s.polylines.insert(id, polyline);
            id
        })
    }

    fn remove_overlay(&mut self, id: OverlayId) {
        self.draw("remove_overlay", |s| {
            s.markers.remove(&id);
            s.polylines.remove(&id);
        })
    }

    fn dispose(&mut self) {
        let mut state = lock(&self.state);

        state.markers.clear();
        state.polylines.clear();
        state.tile_layers.clear();
        state.disposed = true;

        tracing::info!("disposed surface {:?}", self.container);
    }
}

#[derive(Debug, Default)]
pub struct MemoryHost {
    containers: HashSet<String>,
    probes: Mutex<HashMap<String, SurfaceProbe>>,
}

impl MemoryHost {
    pub fn new<I, S>(containers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            containers: containers.into_iter().map(Into::into).collect(),
            probes: Mutex::new(HashMap::new()),
        }
    }

    pub fn probe(&self, container: &str) -> Option<SurfaceProbe> {
        lock(&self.probes).get(container).cloned()
    }
}

impl MapHost for MemoryHost {
    fn create_surface(&self, container: &str) -> Result<Box<dyn MapSurface>, Error> {
        if !self.containers.contains(container) {
            return Err(container_unavailable_error(container));
        }

        let surface = MemorySurface::new(container);
        lock(&self.probes).insert(container.into(), surface.probe());

        Ok(Box::new(surface))
    }
}

#[test]
fn overlays_come_and_go() {
    let mut surface = MemorySurface::new("map");
    let probe = surface.probe();

    let id = surface.add_marker(Marker::new(Coordinates::new(1.0, 2.0)).with_popup("Start"));
    surface.move_marker(id, Coordinates::new(3.0, 4.0));
    assert_eq!(
        probe.snapshot().marker_with_popup("Start").unwrap().position,
        Coordinates::new(3.0, 4.0)
    );

    surface.remove_overlay(id);
    assert!(probe.snapshot().markers.is_empty());
    assert_eq!(probe.snapshot().draw_calls, 3);
}

#[test]
fn calls_after_dispose_are_counted() {
    let mut surface = MemorySurface::new("map");
    let probe = surface.probe();

    surface.dispose();
    surface.pan_to(Coordinates::new(0.0, 0.0));

    let state = probe.snapshot();
    assert!(state.disposed);
    assert_eq!(state.draw_calls, 0);
    assert_eq!(state.late_calls, 1);
}

#[test]
fn unknown_container_is_unavailable() {
    let host = MemoryHost::new(["map"]);

    assert!(host.create_surface("map").is_ok());
    assert!(host.probe("map").is_some());
    assert_eq!(
        host.create_surface("sidebar").err(),
        Some(container_unavailable_error("sidebar"))
    );
}
