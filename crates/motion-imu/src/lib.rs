pub mod filter;
pub mod mock;
pub mod pipeline;
pub mod protocol;
pub mod rotation;
pub mod types;

use anyhow::Result;
use mock::SyntheticMotion;
use protocol::ProtocolParser;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use types::SensorEvent;

/// How long to wait for the event stream endpoint before giving up.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Where events are coming from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Stream,
    Synthetic,
}

/// Client for a motion event source.
///
/// A background task reads and decodes events; the owner drains them on its
/// own thread with `drain`, so all processing of the events happens there.
pub struct MotionClient {
    event_rx: mpsc::UnboundedReceiver<SensorEvent>,
    kind: SourceKind,
    task: tokio::task::JoinHandle<()>,
}

impl MotionClient {
    /// Connect to a newline-delimited JSON event stream at `addr` (`host:port`).
    pub async fn connect(addr: &str) -> Result<Self> {
        tracing::info!(%addr, "Connecting to motion event stream");

        let stream = tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect(addr))
            .await
            .map_err(|_| anyhow::anyhow!("Timed out connecting to {addr}"))??;
        tracing::info!("Connected to motion event stream");

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(stream_read_loop(stream, event_tx));

        Ok(Self {
            event_rx,
            kind: SourceKind::Stream,
            task,
        })
    }

    /// Create a client fed by the synthetic generator at `rate_hz`.
    pub fn mock(rate_hz: f64) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(synthetic_loop(SyntheticMotion::new(rate_hz), event_tx));
        Self {
            event_rx,
            kind: SourceKind::Synthetic,
            task,
        }
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Take every event received so far without blocking.
    pub fn drain(&mut self) -> Vec<SensorEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.event_rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Wait for the next event. `None` once the source has shut down.
    pub async fn recv(&mut self) -> Option<SensorEvent> {
        self.event_rx.recv().await
    }
}

impl Drop for MotionClient {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Background task: read the TCP stream, decode lines, forward events.
async fn stream_read_loop(mut stream: TcpStream, event_tx: mpsc::UnboundedSender<SensorEvent>) {
    let mut parser = ProtocolParser::new();
    let mut buf = [0u8; 4096];
    let mut event_count: u64 = 0;

    loop {
        match stream.read(&mut buf).await {
            Ok(0) => {
                tracing::warn!("Motion event stream closed");
                break;
            }
            Ok(n) => {
                parser.push_data(&buf[..n]);

                while let Some(result) = parser.next_event() {
                    match result {
                        Ok(event) => {
                            if event_tx.send(event).is_err() {
                                return;
                            }
                            event_count += 1;
                            if event_count % 1000 == 0 {
                                tracing::debug!(event_count, "Motion events received");
                            }
                        }
                        Err(e) => {
                            tracing::trace!(?e, "Skipping undecodable line");
                        }
                    }
                }
            }
            Err(e) => {
                tracing::error!(?e, "Motion stream read error");
                break;
            }
        }
    }
}

/// Background task: emit synthetic events at the generator's rate.
async fn synthetic_loop(mut synth: SyntheticMotion, event_tx: mpsc::UnboundedSender<SensorEvent>) {
    let mut interval = tokio::time::interval(Duration::from_secs_f64(1.0 / synth.rate_hz()));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    tracing::info!(rate_hz = synth.rate_hz(), "Synthetic motion source started");

    loop {
        interval.tick().await;
        for event in synth.next_events() {
            if event_tx.send(event).is_err() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;
    use types::AttitudeAngles;

    #[tokio::test]
    async fn stream_client_forwards_decoded_events() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket
                .write_all(b"{\"type\":\"orientation\",\"alpha\":90,\"beta\":0,\"gamma\":0}\n")
                .await
                .unwrap();
            socket.write_all(b"garbage\n").await.unwrap();
            socket
                .write_all(b"{\"type\":\"motion\",\"acceleration\":{\"x\":1,\"y\":2,\"z\":3}}\n")
                .await
                .unwrap();
        });

        let mut client = MotionClient::connect(&addr).await.unwrap();
        assert_eq!(client.kind(), SourceKind::Stream);

        let first = client.recv().await.unwrap();
        assert_eq!(
            first,
            SensorEvent::Orientation(AttitudeAngles::new(90.0, 0.0, 0.0))
        );

        let SensorEvent::Motion(sample) = client.recv().await.unwrap() else {
            panic!("expected motion event");
        };
        assert_eq!(sample.acceleration, glam::DVec3::new(1.0, 2.0, 3.0));

        server.await.unwrap();
        // Server hung up: the channel closes.
        assert!(client.recv().await.is_none());
    }

    #[tokio::test]
    async fn connect_to_closed_port_fails() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        assert!(MotionClient::connect(&addr).await.is_err());
    }

    #[tokio::test]
    async fn mock_client_produces_events() {
        let mut client = MotionClient::mock(200.0);
        assert_eq!(client.kind(), SourceKind::Synthetic);

        let first = client.recv().await.unwrap();
        assert!(matches!(first, SensorEvent::Orientation(_)));
        let second = client.recv().await.unwrap();
        assert!(matches!(second, SensorEvent::Motion(_)));

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(!client.drain().is_empty());
    }

    #[tokio::test]
    async fn mock_client_survives_out_of_range_rates() {
        for rate in [1e12, f64::INFINITY, f64::NAN] {
            let mut client = MotionClient::mock(rate);
            let first = client.recv().await;
            assert!(matches!(first, Some(SensorEvent::Orientation(_))), "rate={rate}");
        }
    }
}
