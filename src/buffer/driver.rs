//! Change-subscription driver
//!
//! Subscribes to the page cursor and to an options channel and dispatches
//! each change to the matching trigger. Every dispatch runs on its own task
//! so an invalidation never waits behind a slow fetch; the buffer's in-flight
//! guard and epoch tags keep the overlapping calls consistent.

use super::handle::PaginationBuffer;
use crate::fetch::PageFetcher;
use crate::types::RequestOptions;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

impl<F> PaginationBuffer<F>
where
    F: PageFetcher + 'static,
{
    /// Spawn a task reacting to cursor moves and to new values on
    /// `options_rx`. The task ends when the options sender is dropped.
    ///
    /// Handlers are detached. Aborting the returned handle stops dispatching
    /// new changes, but handlers already dispatched run to completion so a
    /// started fetch is always merged or rolled back.
    pub fn spawn_driver(&self, mut options_rx: watch::Receiver<RequestOptions>) -> JoinHandle<()> {
        let buffer = self.clone();
        let mut page_rx = self.inner.cursor.subscribe();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    changed = page_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let page = *page_rx.borrow_and_update();
                        debug!(page, "Frontend page changed");

                        let buffer = buffer.clone();
                        tokio::spawn(async move {
                            if let Err(e) = buffer.on_frontend_page_change().await {
                                warn!(page, error = %e, "Frontend page trigger failed");
                            }
                        });
                    }
                    changed = options_rx.changed() => {
                        if changed.is_err() {
                            debug!("Options sender dropped, stopping driver");
                            break;
                        }
                        let options = options_rx.borrow_and_update().clone();

                        let buffer = buffer.clone();
                        tokio::spawn(async move {
                            if let Err(e) = buffer.set_request_options(options).await {
                                warn!(error = %e, "Request options trigger failed");
                            }
                        });
                    }
                }
            }
        })
    }
}
