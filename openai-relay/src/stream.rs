//! Server-sent event decoding.
//!
//! Three layers:
//! - [`SseLineDecoder`] - byte buffer to `data:` frames, no I/O
//! - [`EventStream`] - a [`Stream`] of decoded [`Envelope`]s over a byte stream
//! - [`StreamDecoder`] - drives an [`EventStream`] on a task and reports through
//!   callbacks
//!
//! Only `data:` lines are interpreted. `data: [DONE]` ends the stream. A frame
//! that fails to decode is reported as [`Error::StreamDecode`] and the stream
//! keeps going; a connection failure is reported as [`Error::StreamTransport`]
//! and ends it.

use std::fmt;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use pin_project_lite::pin_project;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::envelope::Envelope;
use crate::error::{Error, Result};
use crate::transport::ByteStream;

const DONE: &str = "[DONE]";

/// A single interpreted SSE line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseFrame {
    /// Payload of a `data:` line.
    Data(String),
    /// The `data: [DONE]` sentinel.
    Done,
}

/// Incremental `data:` line extractor.
///
/// Bytes go in through [`feed`](Self::feed) in chunks of any size; complete
/// lines come out of [`next_frame`](Self::next_frame). Lines end at `\n`, with
/// an optional preceding `\r`. Text is decoded per complete line, so chunk
/// boundaries may fall anywhere, including inside a UTF-8 sequence.
#[derive(Debug, Default)]
pub struct SseLineDecoder {
    buffer: BytesMut,
    scanned: usize,
    done: bool,
}

impl SseLineDecoder {
    /// Creates an empty decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends raw bytes. Ignored once the sentinel has been seen.
    pub fn feed(&mut self, chunk: &[u8]) {
        if !self.done {
            self.buffer.extend_from_slice(chunk);
        }
    }

    /// Whether `data: [DONE]` has been seen.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.done
    }

    /// Returns the next frame from the buffered complete lines.
    pub fn next_frame(&mut self) -> Option<SseFrame> {
        while !self.done {
            let Some(pos) = self.buffer[self.scanned..].iter().position(|&b| b == b'\n') else {
                self.scanned = self.buffer.len();
                return None;
            };
            let line = self.buffer.split_to(self.scanned + pos + 1);
            self.scanned = 0;
            if let Some(frame) = self.interpret(&line) {
                return Some(frame);
            }
        }
        None
    }

    /// Interprets whatever is left in the buffer as a final, unterminated line.
    pub fn finish(&mut self) -> Option<SseFrame> {
        if self.done || self.buffer.is_empty() {
            return None;
        }
        let line = self.buffer.split();
        self.scanned = 0;
        self.interpret(&line)
    }

    fn interpret(&mut self, raw: &[u8]) -> Option<SseFrame> {
        let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        let line = String::from_utf8_lossy(raw);

        let data = line.strip_prefix("data:")?;
        let data = data.strip_prefix(' ').unwrap_or(data);

        if data.trim() == DONE {
            self.done = true;
            self.buffer.clear();
            return Some(SseFrame::Done);
        }
        Some(SseFrame::Data(data.to_owned()))
    }
}

/// Decodes one `data:` payload.
fn decode_frame<T: DeserializeOwned>(data: &str) -> Result<Envelope<T>> {
    serde_json::from_str(data).map_err(|e| {
        warn!("Failed to parse SSE chunk: {e}, data: {data}");
        Error::stream_decode(format!("{e}: {data}"))
    })
}

pin_project! {
    /// A [`Stream`] of decoded events.
    ///
    /// Yields `Ok(envelope)` per well-formed frame, `Err(StreamDecode)` per
    /// malformed frame, and at most one final `Err(StreamTransport)`. Ends after
    /// `data: [DONE]` or when the connection closes. Dropping it closes the
    /// connection.
    pub struct EventStream<T, S = ByteStream> {
        #[pin]
        inner: S,
        decoder: SseLineDecoder,
        finished: bool,
        _marker: PhantomData<fn() -> T>,
    }
}

impl<T, S> fmt::Debug for EventStream<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("decoder", &self.decoder)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl<T, S> EventStream<T, S>
where
    S: Stream<Item = Result<Bytes>>,
{
    /// Wraps a raw byte stream.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            decoder: SseLineDecoder::new(),
            finished: false,
            _marker: PhantomData,
        }
    }
}

impl<T, S> Stream for EventStream<T, S>
where
    T: DeserializeOwned,
    S: Stream<Item = Result<Bytes>>,
{
    type Item = Result<Envelope<T>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        loop {
            if *this.finished {
                return Poll::Ready(None);
            }

            match this.decoder.next_frame() {
                Some(SseFrame::Data(data)) => return Poll::Ready(Some(decode_frame(&data))),
                Some(SseFrame::Done) => {
                    debug!("Stream reached [DONE]");
                    *this.finished = true;
                    return Poll::Ready(None);
                }
                None => {}
            }

            match this.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) => this.decoder.feed(&chunk),
                Poll::Ready(Some(Err(e))) => {
                    *this.finished = true;
                    return Poll::Ready(Some(Err(Error::stream_transport(e.to_string()))));
                }
                Poll::Ready(None) => {
                    *this.finished = true;
                    debug!("Stream closed without [DONE]");
                    if let Some(SseFrame::Data(data)) = this.decoder.finish() {
                        return Poll::Ready(Some(decode_frame(&data)));
                    }
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Lifecycle of a [`StreamDecoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    /// Not yet connected.
    Idle,
    /// Receiving events.
    Connected,
    /// Finished, failed or disconnected. Terminal.
    Completed,
}

impl DecoderState {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::Connected,
            _ => Self::Completed,
        }
    }

    const fn as_u8(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Connected => 1,
            Self::Completed => 2,
        }
    }
}

#[derive(Debug)]
struct Shared {
    state: AtomicU8,
    cancelled: AtomicBool,
    // Held for the whole of every callback.
    delivery: Mutex<()>,
}

impl Shared {
    fn set(&self, state: DecoderState) {
        self.state.store(state.as_u8(), Ordering::SeqCst);
    }

    fn get(&self) -> DecoderState {
        DecoderState::from_u8(self.state.load(Ordering::SeqCst))
    }

    fn cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Runs `callback` unless cancelled. Returns `false` if it was skipped.
    fn deliver(&self, callback: impl FnOnce()) -> bool {
        let _guard = self.delivery.lock().unwrap_or_else(PoisonError::into_inner);
        if self.cancelled() {
            return false;
        }
        callback();
        true
    }

    /// Waits out a running callback, then blocks all later ones.
    fn cancel(&self) {
        let _guard = self.delivery.lock().unwrap_or_else(PoisonError::into_inner);
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

/// Callback-driven stream consumer.
///
/// [`connect`](Self::connect) spawns a tokio task that pulls the
/// [`EventStream`] and calls `on_event` for every item, in order, then
/// `on_complete` once if the stream ended normally (sentinel or clean close).
/// After a [`Error::StreamTransport`] event `on_complete` is not called.
///
/// A decoder connects once. Dropping it disconnects.
#[derive(Debug)]
pub struct StreamDecoder {
    shared: Arc<Shared>,
    task: Option<JoinHandle<()>>,
}

impl Default for StreamDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamDecoder {
    /// Creates an idle decoder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: AtomicU8::new(DecoderState::Idle.as_u8()),
                cancelled: AtomicBool::new(false),
                delivery: Mutex::new(()),
            }),
            task: None,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> DecoderState {
        self.shared.get()
    }

    /// Starts delivering events from `stream`.
    ///
    /// Callbacks run on the spawned task.
    ///
    /// # Errors
    ///
    /// [`Error::StreamBusy`] if the decoder is not idle, and
    /// [`Error::InvalidRequest`] when called outside a tokio runtime.
    pub fn connect<T, S, E, C>(
        &mut self,
        stream: EventStream<T, S>,
        mut on_event: E,
        on_complete: C,
    ) -> Result<()>
    where
        T: DeserializeOwned + Send + 'static,
        S: Stream<Item = Result<Bytes>> + Send + 'static,
        E: FnMut(Result<Envelope<T>>) + Send + 'static,
        C: FnOnce() + Send + 'static,
    {
        if self.state() != DecoderState::Idle {
            return Err(Error::StreamBusy);
        }
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| Error::invalid_request(format!("No tokio runtime: {e}")))?;

        self.shared.set(DecoderState::Connected);
        let shared = Arc::clone(&self.shared);

        let task = handle.spawn(async move {
            let mut stream = Box::pin(stream);
            let mut failed = false;

            while let Some(item) = stream.next().await {
                failed = matches!(item, Err(Error::StreamTransport(_)));
                if !shared.deliver(|| on_event(item)) {
                    return;
                }
            }

            shared.set(DecoderState::Completed);
            if failed {
                debug!("Stream ended with a transport error");
            } else {
                shared.deliver(on_complete);
            }
        });
        self.task = Some(task);

        Ok(())
    }

    /// Stops the stream. No callback runs after this returns.
    ///
    /// If a callback is running on another thread, this waits for it to
    /// return.
    pub fn disconnect(&mut self) {
        self.shared.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
        if self.state() == DecoderState::Connected {
            debug!("Stream disconnected");
        }
        self.shared.set(DecoderState::Completed);
    }

    /// Waits until the stream task has finished.
    pub async fn finished(&mut self) {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for StreamDecoder {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            self.shared.cancel();
            task.abort();
        }
    }
}
