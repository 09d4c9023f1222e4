use maybe_sync::{MaybeSend, MaybeSync};

/// Notifies the application that the map state changed and it should be redrawn.
pub trait Messenger: MaybeSend + MaybeSync {
    /// Requests a new frame.
    fn request_redraw(&self);
}
