use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{invalid_state_error, Error};

pub const HOLD_DURATION_SECS: i64 = 3;

pub const NOTIFIED_NOTICE: &str =
    "Emergency services have been notified and contacts alerted with your location. Stay safe.";

/// Simulated alert button state. Nothing is dispatched anywhere.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmergencyPanel {
    pub status: Status,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Status {
    Collapsed,
    Expanded,
    Activating { started_at: DateTime<Utc> },
    Notified { at: DateTime<Utc> },
}

impl Status {
    pub fn name(&self) -> String {
        match self {
            Self::Collapsed => "collapsed".into(),
            Self::Expanded => "expanded".into(),
            Self::Activating { started_at: _ } => "activating".into(),
            Self::Notified { at: _ } => "notified".into(),
        }
    }
}

impl Default for EmergencyPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl EmergencyPanel {
    pub fn new() -> Self {
        Self {
            status: Status::Collapsed,
        }
    }

    pub fn is_activating(&self) -> bool {
        matches!(self.status, Status::Activating { .. })
    }

    #[tracing::instrument]
    pub fn press(&mut self, now: DateTime<Utc>) -> Result<(), Error> {
        match self.status {
            Status::Collapsed => {
                self.status = Status::Expanded;
                Ok(())
            }
            Status::Expanded | Status::Notified { at: _ } => {
                self.status = Status::Activating { started_at: now };
                Ok(())
            }
            Status::Activating { started_at: _ } => Err(invalid_state_error()),
        }
    }

    #[tracing::instrument]
    pub fn dismiss(&mut self) -> Result<(), Error> {
        match self.status {
            Status::Collapsed => Err(invalid_state_error()),
            _ => {
                self.status = Status::Collapsed;
                Ok(())
            }
        }
    }

    #[tracing::instrument]
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<&'static str, Error> {
        match self.status {
            Status::Activating { started_at }
                if now >= started_at + Duration::seconds(HOLD_DURATION_SECS) =>
            {
                self.status = Status::Notified { at: now };
                tracing::info!("simulated emergency alert completed");
                Ok(NOTIFIED_NOTICE)
            }
            _ => Err(invalid_state_error()),
        }
    }
}

#[test]
fn two_presses_and_a_hold_notify() {
    let start = Utc::now();
    let mut panel = EmergencyPanel::new();

    panel.press(start).unwrap();
    assert_eq!(panel.status, Status::Expanded);

    panel.press(start).unwrap();
    assert!(panel.is_activating());

    // still holding
    assert!(panel.complete(start + Duration::seconds(1)).is_err());
    assert!(panel.press(start + Duration::seconds(1)).is_err());

    let notice = panel.complete(start + Duration::seconds(3)).unwrap();
    assert_eq!(notice, NOTIFIED_NOTICE);
    assert_eq!(panel.status.name(), "notified");

    // panel is still open, so the next press activates straight away
    let again = start + Duration::seconds(10);
    panel.press(again).unwrap();
    assert_eq!(panel.status, Status::Activating { started_at: again });
}

#[test]
fn dismiss_from_any_open_state() {
    let start = Utc::now();
    let mut panel = EmergencyPanel::new();
    assert!(panel.dismiss().is_err());

    panel.press(start).unwrap();
    panel.dismiss().unwrap();
    assert_eq!(panel.status, Status::Collapsed);

    panel.press(start).unwrap();
    panel.press(start).unwrap();
    panel.dismiss().unwrap();
    assert_eq!(panel.status, Status::Collapsed);
    assert!(panel.complete(start + Duration::seconds(3)).is_err());

    panel.press(start).unwrap();
    panel.press(start).unwrap();
    panel.complete(start + Duration::seconds(3)).unwrap();
    panel.dismiss().unwrap();
    assert_eq!(panel.status, Status::Collapsed);
}
