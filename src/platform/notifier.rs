use crate::{api::Notifier, error::Error};

#[derive(Clone, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: &Error) {
        if notice.is_user_facing() {
            tracing::warn!("{}", notice.message);
        } else {
            tracing::error!("{}", notice);
        }
    }
}
