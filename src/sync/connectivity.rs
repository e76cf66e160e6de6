use log::{debug, info, warn};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Probe the API host with a TCP connect every `every`, publishing whether it
/// is reachable. The task stops when `cancel` fires; receivers then see the
/// channel close.
pub fn spawn_reachability_probe(
    api_url: &Url,
    every: Duration,
    cancel: CancellationToken,
) -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);

    let Some(target) = probe_target(api_url) else {
        warn!("Cannot probe {api_url}: no host");
        return rx;
    };

    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let reachable = is_reachable(&target, every).await;
            tx.send_if_modified(|current| {
                if *current == reachable {
                    return false;
                }
                info!("API host {target} is {}", if reachable { "reachable" } else { "unreachable" });
                *current = reachable;
                true
            });
        }
        debug!("Reachability probe for {target} stopped");
    });

    rx
}

/// `host:port` for a URL, using the scheme's default port.
fn probe_target(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    let port = url.port_or_known_default()?;
    Some(format!("{host}:{port}"))
}

async fn is_reachable(target: &str, limit: Duration) -> bool {
    match timeout(limit, TcpStream::connect(target)).await {
        Ok(Ok(_)) => true,
        Ok(Err(e)) => {
            debug!("Probe of {target} failed: {e}");
            false
        }
        Err(_) => false,
    }
}
