//! Spawning of background tasks on the platform runtime.

use std::future::Future;

#[cfg(not(target_arch = "wasm32"))]
use maybe_sync::MaybeSend;

/// Runs the future in the background on the tokio runtime the caller is in.
///
/// # Panics
///
/// Panics if called outside of a tokio runtime context.
#[cfg(not(target_arch = "wasm32"))]
pub fn spawn<T>(future: T)
where
    T: Future + MaybeSend + 'static,
    T::Output: MaybeSend + 'static,
{
    tokio::spawn(future);
}

/// Runs the future in the background on the browser event loop.
#[cfg(target_arch = "wasm32")]
pub fn spawn<T>(future: T)
where
    T: Future + 'static,
    T::Output: 'static,
{
    wasm_bindgen_futures::spawn_local(async {
        future.await;
    });
}
