use serde::{Deserialize, Serialize};

use crate::error::{invalid_state_error, Error};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Uninitialized,
    Ready,
    Resolving,
    Rendered,
    Errored,
}

impl Default for Status {
    fn default() -> Self {
        Self::Uninitialized
    }
}

impl Status {
    pub fn name(&self) -> String {
        match self {
            Self::Uninitialized => "uninitialized".into(),
            Self::Ready => "ready".into(),
            Self::Resolving => "resolving".into(),
            Self::Rendered => "rendered".into(),
            Self::Errored => "errored".into(),
        }
    }

    pub fn initialize(&mut self) -> Result<(), Error> {
        match self {
            Self::Uninitialized => {
                *self = Self::Ready;
                Ok(())
            }
            _ => Err(invalid_state_error()),
        }
    }

    pub fn begin_resolving(&mut self) -> Result<(), Error> {
        match self {
            Self::Ready | Self::Resolving | Self::Rendered | Self::Errored => {
                *self = Self::Resolving;
                Ok(())
            }
            Self::Uninitialized => Err(invalid_state_error()),
        }
    }

    pub fn finish(&mut self) -> Result<(), Error> {
        match self {
            Self::Resolving => {
                *self = Self::Rendered;
                Ok(())
            }
            _ => Err(invalid_state_error()),
        }
    }

    pub fn fail(&mut self) -> Result<(), Error> {
        match self {
            Self::Resolving => {
                *self = Self::Errored;
                Ok(())
            }
            _ => Err(invalid_state_error()),
        }
    }

    pub fn teardown(&mut self) {
        *self = Self::Uninitialized;
    }
}

#[test]
fn errored_is_not_terminal() {
    let mut status = Status::default();

    assert!(status.begin_resolving().is_err());

    status.initialize().unwrap();
    status.begin_resolving().unwrap();
    status.fail().unwrap();
    assert_eq!(status, Status::Errored);

    status.begin_resolving().unwrap();
    status.finish().unwrap();
    assert_eq!(status.name(), "rendered");

    assert!(status.initialize().is_err());
    status.teardown();
    assert_eq!(status, Status::Uninitialized);
}
