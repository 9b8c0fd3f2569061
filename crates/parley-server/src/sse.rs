//! Server-sent-events framing for run streams.

use std::convert::Infallible;

use axum::body::Body;
use axum::http::{header, HeaderValue};
use axum::response::Response;
use bytes::Bytes;
use futures::StreamExt;
use parley_runtime::{RunStream, StreamEvent};
use tokio::sync::mpsc;

const SSE_CHANNEL_CAPACITY: usize = 64;

/// Frame one event as an SSE chunk. Events without a payload (`end`) get an
/// empty data line, which clients must tolerate per the SSE format.
pub fn sse_frame(event: &StreamEvent) -> Bytes {
    let payload = event.payload_json().unwrap_or_default();
    Bytes::from(format!("event: {}\ndata: {}\n\n", event.event_name(), payload))
}

/// Build the streaming HTTP response for a run.
///
/// A relay task pumps run events into a bounded byte channel feeding the
/// response body. If the client disconnects, the relay's send fails and the
/// relay stops reading, which closes the run's sink. If the run aborts, the
/// relay stops without a terminal `end` frame and the connection is simply
/// dropped.
pub fn run_stream_response(run: RunStream) -> Response {
    let (tx, rx) = mpsc::channel::<Bytes>(SSE_CHANNEL_CAPACITY);
    let thread_id = run.thread_id;
    let mut events = run.events;

    tokio::spawn(async move {
        while let Some(item) = events.next().await {
            match item {
                Ok(event) => {
                    if tx.send(sse_frame(&event)).await.is_err() {
                        tracing::debug!(thread_id = %thread_id, "client left the run stream");
                        break;
                    }
                }
                Err(error) => {
                    tracing::warn!(thread_id = %thread_id, error = %error, "run stream aborted");
                    break;
                }
            }
        }
    });

    let body = Body::from_stream(async_stream::stream! {
        let mut rx = rx;
        while let Some(chunk) = rx.recv().await {
            yield Ok::<Bytes, Infallible>(chunk);
        }
    });

    let mut response = Response::new(body);
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/event-stream"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_contract::executor::OutputChunk;

    #[test]
    fn frames_data_event() {
        let event = StreamEvent::data(OutputChunk::new(serde_json::json!({"n": 1})));
        assert_eq!(&sse_frame(&event)[..], b"event: data\ndata: {\"n\":1}\n\n");
    }

    #[test]
    fn frames_metadata_event() {
        let event = StreamEvent::metadata("run-1");
        assert_eq!(
            &sse_frame(&event)[..],
            b"event: metadata\ndata: {\"run_id\":\"run-1\"}\n\n"
        );
    }

    #[test]
    fn frames_error_event_with_fixed_payload() {
        let frame = sse_frame(&StreamEvent::internal_error());
        let text = std::str::from_utf8(&frame).unwrap();
        assert_eq!(
            text,
            "event: error\ndata: {\"status_code\":500,\"message\":\"Internal Server Error\"}\n\n"
        );
    }

    #[test]
    fn frames_end_event_with_empty_data_line() {
        assert_eq!(&sse_frame(&StreamEvent::End)[..], b"event: end\ndata: \n\n");
    }
}
