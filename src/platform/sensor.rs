use async_channel::{Receiver, Sender};
use async_trait::async_trait;
use rand_distr::{Distribution, Normal};
use std::time::Duration;

use crate::{
    api::PositionSensor,
    entities::Coordinates,
    error::{invalid_input_error, sensing_unavailable_error, Error},
};

pub type Reading = Result<Coordinates, Error>;

/// Receiving end of a position stream. The stream stops once the subscription is cancelled.
#[derive(Debug)]
pub struct PositionSubscription {
    receiver: Receiver<Reading>,
}

impl PositionSubscription {
    pub fn channel() -> (Sender<Reading>, Self) {
        let (tx, rx) = async_channel::unbounded();
        (tx, Self { receiver: rx })
    }

    pub async fn next(&self) -> Option<Reading> {
        self.receiver.recv().await.ok()
    }

    pub fn cancel(&self) {
        self.receiver.close();
    }

    pub fn is_cancelled(&self) -> bool {
        self.receiver.is_closed()
    }

    pub fn handle(&self) -> Self {
        Self {
            receiver: self.receiver.clone(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct NoSensor;

#[async_trait]
impl PositionSensor for NoSensor {
    async fn current_position(&self) -> Result<Coordinates, Error> {
        Err(sensing_unavailable_error())
    }

    fn watch(&self) -> Result<PositionSubscription, Error> {
        Err(sensing_unavailable_error())
    }
}

#[derive(Clone, Debug)]
pub struct SimulatedSensor {
    origin: Coordinates,
    step: Normal<f64>,
    interval: Duration,
}

impl SimulatedSensor {
    /// `step_degrees` is the standard deviation of each move.
    pub fn new(origin: Coordinates, step_degrees: f64, interval: Duration) -> Result<Self, Error> {
        if !(step_degrees.is_finite() && step_degrees >= 0.0) {
            return Err(invalid_input_error());
        }

        let step = Normal::new(0.0, step_degrees).map_err(|_| invalid_input_error())?;

        Ok(Self {
            origin,
            step,
            interval,
        })
    }
}

#[async_trait]
impl PositionSensor for SimulatedSensor {
    async fn current_position(&self) -> Result<Coordinates, Error> {
        Ok(self.origin)
    }

    #[tracing::instrument(skip(self))]
    fn watch(&self) -> Result<PositionSubscription, Error> {
        let (tx, subscription) = PositionSubscription::channel();
        let (step, interval) = (self.step, self.interval);
        let mut position = self.origin;

        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;

                let (d_lat, d_lng) = {
                    let mut rng = rand::thread_rng();
                    (step.sample(&mut rng), step.sample(&mut rng))
                };
                position = Coordinates::new(position.latitude + d_lat, position.longitude + d_lng);

                if tx.send(Ok(position)).await.is_err() {
                    tracing::debug!("position watch cancelled");
                    break;
                }
            }
        });

        Ok(subscription)
    }
}

#[test]
fn no_sensor_is_unavailable() {
    tokio_test::block_on(async {
        assert_eq!(
            NoSensor.current_position().await,
            Err(sensing_unavailable_error())
        );
        assert!(NoSensor.watch().is_err());
    });
}

#[test]
fn simulated_sensor_walks_near_origin_until_cancelled() {
    tokio_test::block_on(async {
        let origin = Coordinates::new(28.6139, 77.2090);
        let sensor = SimulatedSensor::new(origin, 0.0001, Duration::from_millis(1)).unwrap();

        assert_eq!(sensor.current_position().await, Ok(origin));

        let subscription = sensor.watch().unwrap();
        for _ in 0..3 {
            let reading = subscription.next().await.unwrap().unwrap();
            assert!((reading.latitude - origin.latitude).abs() < 0.1);
            assert!((reading.longitude - origin.longitude).abs() < 0.1);
        }

        subscription.handle().cancel();
        assert!(subscription.is_cancelled());

        // drains whatever was buffered before the close, then ends
        while subscription.next().await.is_some() {}
    });
}

#[test]
fn negative_or_non_finite_step_is_rejected() {
    let origin = Coordinates::new(0.0, 0.0);

    for step in [-1.0, -0.0001, f64::NAN, f64::INFINITY] {
        let result = SimulatedSensor::new(origin, step, Duration::from_secs(1));
        assert_eq!(result.unwrap_err(), invalid_input_error());
    }

    assert!(SimulatedSensor::new(origin, 0.0, Duration::from_secs(1)).is_ok());
}
