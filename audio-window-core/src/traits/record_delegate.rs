use crate::models::error::AudioError;
use crate::models::state::RecordState;

/// Event delegate for audio record notifications.
///
/// State changes are reported from the thread driving the record; errors
/// from the capture callback arrive on the device's thread. Keep both
/// methods short and non-blocking.
pub trait RecordDelegate: Send + Sync {
    /// Called when the record state changes.
    fn on_state_changed(&self, state: &RecordState);

    /// Called when a captured chunk is dropped.
    fn on_error(&self, error: &AudioError);
}
