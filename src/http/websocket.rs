//! Upgraded connection tunnelling.
//!
//! Once the upstream answers `101 Switching Protocols`, both connections are
//! taken over from hyper and bytes are copied in each direction until one side
//! closes. Frames are never parsed, so any upgrade protocol works, WebSocket
//! included.
//!
//! ```text
//! Client ←──── raw bytes ────→ Proxy ←──── raw bytes ────→ Backend
//! ```

use hyper::upgrade::OnUpgrade;
use hyper_util::rt::TokioIo;
use tokio::io::copy_bidirectional;

/// Spawn the copy task for an accepted upgrade.
pub fn tunnel(client: OnUpgrade, upstream: OnUpgrade) {
    tokio::spawn(async move {
        let (client, upstream) = match tokio::try_join!(client, upstream) {
            Ok(pair) => pair,
            Err(e) => {
                tracing::warn!(error = %e, "Connection upgrade failed");
                return;
            }
        };

        let mut client = TokioIo::new(client);
        let mut upstream = TokioIo::new(upstream);
        match copy_bidirectional(&mut client, &mut upstream).await {
            Ok((from_client, from_upstream)) => {
                tracing::debug!(from_client, from_upstream, "Upgraded connection closed");
            }
            Err(e) => {
                tracing::debug!(error = %e, "Upgraded connection ended with error");
            }
        }
    });
}
