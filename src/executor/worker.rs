//! Per-connection send/receive/close loop

use super::barrier::CompletionGuard;
use super::events::{EventSink, WorkerEvent, WorkerExit};
use super::shutdown::ShutdownSignal;
use crate::error::WorkerError;
use crate::models::{Payload, RttObservation, RunConfig};
use crate::types::WorkerId;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::time::{interval_at, MissedTickBehavior};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Connection = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Close code reported when the peer's close frame carried none
const NO_STATUS_RECEIVED: u16 = 1005;

/// Longest period handed to the ticker; anything above can overflow `Instant`
const MAX_TICK_INTERVAL: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 30);

/// Owns one connection for the lifetime of a run.
///
/// The peer is expected to answer every send with exactly one data frame
/// before the next send; there are no sequence numbers.
pub struct Worker {
    id: WorkerId,
    config: Arc<RunConfig>,
    payload: Payload,
    shutdown: ShutdownSignal,
    completion: CompletionGuard,
    sink: Arc<dyn EventSink>,
}

impl Worker {
    pub fn new(
        id: WorkerId,
        config: Arc<RunConfig>,
        payload: Payload,
        shutdown: ShutdownSignal,
        completion: CompletionGuard,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            id,
            config,
            payload,
            shutdown,
            completion,
            sink,
        }
    }

    pub fn id(&self) -> WorkerId {
        self.id
    }

    /// Run until shutdown or the first transport failure.
    ///
    /// The connection is dropped before the barrier is checked in, on every
    /// exit path.
    pub async fn run(self) {
        let Worker {
            id,
            config,
            payload,
            mut shutdown,
            completion,
            sink,
        } = self;

        let exit = drive(id, &config, &payload, &mut shutdown, sink.as_ref()).await;

        sink.record(WorkerEvent::Finished { id, exit }).await;
        completion.arrive();
    }
}

async fn drive(
    id: WorkerId,
    config: &RunConfig,
    payload: &Payload,
    shutdown: &mut ShutdownSignal,
    sink: &dyn EventSink,
) -> WorkerExit {
    let mut socket = match connect_async(config.target_url().as_str()).await {
        Ok((socket, _response)) => socket,
        Err(e) => {
            let error = WorkerError::Dial(e);
            sink.record(WorkerEvent::Failed { id, error }).await;
            return WorkerExit::DialFailed;
        }
    };
    sink.record(WorkerEvent::Connected { id }).await;

    let period = config.tick_interval().min(MAX_TICK_INTERVAL);
    let mut ticker = interval_at(tokio::time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match round_trip(id, &mut socket, payload).await {
                    Ok(observation) => sink.record(WorkerEvent::Rtt(observation)).await,
                    Err(error) => {
                        let exit = exit_for(&error);
                        sink.record(WorkerEvent::Failed { id, error }).await;
                        return exit;
                    }
                }
            }
            _ = shutdown.signaled() => {
                // The peer's close reply is not awaited
                return match socket.send(Message::Close(Some(close_frame(id)))).await {
                    Ok(()) => {
                        sink.record(WorkerEvent::Closed { id }).await;
                        WorkerExit::Shutdown
                    }
                    Err(e) => {
                        let error = WorkerError::WriteClose(e);
                        sink.record(WorkerEvent::Failed { id, error }).await;
                        WorkerExit::CloseFailed
                    }
                };
            }
        }
    }
}

/// Normal closure, reason is the worker id in decimal
fn close_frame(id: WorkerId) -> CloseFrame {
    CloseFrame {
        code: CloseCode::Normal,
        reason: id.to_string().into(),
    }
}

/// Exit reported for a failed round trip
fn exit_for(error: &WorkerError) -> WorkerExit {
    match error {
        WorkerError::Write(_) => WorkerExit::SendFailed,
        _ => WorkerExit::ReceiveFailed,
    }
}

/// One tick: send the payload and wait for its echo
async fn round_trip(
    id: WorkerId,
    socket: &mut Connection,
    payload: &Payload,
) -> Result<RttObservation, WorkerError> {
    let sent_at = Instant::now();
    socket.send(payload.to_message()).await.map_err(WorkerError::Write)?;

    await_reply(socket).await?;
    let received_at = Instant::now();

    Ok(RttObservation::new(id, sent_at, received_at))
}

/// Wait for the next data frame; control frames are not replies
async fn await_reply(socket: &mut Connection) -> Result<(), WorkerError> {
    loop {
        match socket.next().await {
            Some(Ok(Message::Text(_) | Message::Binary(_))) => return Ok(()),
            Some(Ok(Message::Close(frame))) => {
                let code = frame
                    .map(|frame| u16::from(frame.code))
                    .unwrap_or(NO_STATUS_RECEIVED);
                return Err(WorkerError::PeerClosed { code });
            }
            Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => continue,
            Some(Err(e)) => return Err(WorkerError::Read(e)),
            None => return Err(WorkerError::StreamEnded),
        }
    }
}
