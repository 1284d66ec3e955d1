use chrono::Utc;
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::auth::token_fetch::fetch_token;
use crate::cache::token::Token;
use crate::error::Result;
use crate::observability::metrics::get_metrics;
use crate::session::Session;

impl Session {
    /// Make sure the cached token is usable, fetching a new one when it is
    /// expired or was never fetched. Safe to call repeatedly.
    pub async fn authenticate(&self) -> Result<()> {
        self.valid_token().await.map(|_| ())
    }

    /// Reuse-or-refresh under the token lock and hand back a copy of the
    /// token to send. On failure the cached token is left as it was.
    pub(crate) async fn valid_token(&self) -> Result<Token> {
        let metrics = get_metrics();
        let mut cached = self.token.lock().await;

        if cached.is_valid_at(Utc::now()) {
            metrics.token_reuse.inc();
            debug!(expires_at = %cached.expiration_time, "reusing cached token");
            return Ok(cached.clone());
        }

        debug!(expired_at = %cached.expiration_time, "token expired or never fetched, refreshing");
        metrics.token_fetch.inc();
        let start = Instant::now();
        let fetched = fetch_token(self.client(), self.connection()).await;
        metrics
            .request_duration
            .with_label_values(&["token_fetch"])
            .observe(start.elapsed().as_secs_f64());

        match fetched {
            Ok(token) => {
                info!(
                    expire_in = token.expire_in,
                    expires_at = %token.expiration_time,
                    "token refreshed"
                );
                *cached = token;
                Ok(cached.clone())
            }
            Err(e) => {
                metrics.token_fetch_failures.with_label_values(&[e.kind()]).inc();
                error!(error = %e, "token refresh failed");
                Err(e)
            }
        }
    }
}
