//! Outgoing HTTP response façade.
//!
//! A [`Response`] wraps the transport's [`ResponseSink`] and lets exactly one
//! terminal write through. Whoever writes first wins: once a response has
//! been sent, every further `send`, `json` or `status` call returns `Ok(())`
//! without touching the transport. Middleware unwinding after the handler
//! can therefore never corrupt what the client already received.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use serde::Serialize;

use crate::error::Error;
use crate::transport::{Outgoing, ResponseSink};

const TEXT_PLAIN: &str = "text/plain";
const APPLICATION_JSON: &str = "application/json";

/// The write-once response handle given to middleware and handlers.
///
/// Clones share the same underlying sink, so a write through any clone
/// marks all of them as sent.
///
/// ```rust,no_run
/// # use switchyard::{Request, Response, Error};
/// async fn hello(_req: Request, res: Response) -> Result<(), Error> {
///     res.send("hello")?;
///     res.send("ignored")  // already sent: no-op
/// }
/// ```
#[derive(Clone)]
pub struct Response {
    state: Arc<Mutex<State>>,
}

struct State {
    sink: Option<Box<dyn ResponseSink>>,
    status: Option<u16>,
}

impl Response {
    pub(crate) fn new(sink: Box<dyn ResponseSink>) -> Self {
        Self { state: Arc::new(Mutex::new(State { sink: Some(sink), status: None })) }
    }

    /// `200 OK` with a `text/plain` body.
    pub fn send(&self, text: impl Into<String>) -> Result<(), Error> {
        self.finish(200, Some(TEXT_PLAIN), text.into())
    }

    /// `200 OK` with an `application/json` body.
    ///
    /// The string is sent as-is: it is not parsed, validated or re-encoded.
    /// Use [`json_value`](Self::json_value) to serialise a value instead.
    pub fn json(&self, json: impl Into<String>) -> Result<(), Error> {
        self.finish(200, Some(APPLICATION_JSON), json.into())
    }

    /// `200 OK` with `value` serialised by serde_json.
    ///
    /// Serialisation runs before the sent check; a serialisation failure is
    /// returned as an error and nothing is written.
    pub fn json_value<T: Serialize + ?Sized>(&self, value: &T) -> Result<(), Error> {
        let body = serde_json::to_vec(value)?;
        self.finish(200, Some(APPLICATION_JSON), body)
    }

    /// Arbitrary status code with `message` as the body. `Content-Type` is
    /// left to the transport.
    pub fn status(&self, code: u16, message: impl Into<String>) -> Result<(), Error> {
        self.finish(code, None, message.into())
    }

    /// Whether a terminal write has already taken effect.
    pub fn is_sent(&self) -> bool {
        self.lock().sink.is_none()
    }

    /// The status code that was sent, if any.
    pub fn status_code(&self) -> Option<u16> {
        self.lock().status
    }

    pub(crate) fn finish(
        &self,
        status: u16,
        content_type: Option<&'static str>,
        body: impl Into<Bytes>,
    ) -> Result<(), Error> {
        let mut state = self.lock();
        let Some(sink) = state.sink.take() else {
            return Ok(());
        };
        state.status = Some(status);
        drop(state);

        sink.write(Outgoing { status, content_type, body: body.into() })
    }

    // A panic while holding the lock cannot leave `State` half-updated.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Response")
            .field("sent", &self.is_sent())
            .field("status", &self.status_code())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<Outgoing>>>);

    impl ResponseSink for Recorder {
        fn write(self: Box<Self>, response: Outgoing) -> Result<(), Error> {
            self.0.lock().unwrap().push(response);
            Ok(())
        }
    }

    struct Broken;

    impl ResponseSink for Broken {
        fn write(self: Box<Self>, _response: Outgoing) -> Result<(), Error> {
            Err(Error::Closed)
        }
    }

    fn recorded() -> (Response, Recorder) {
        let recorder = Recorder::default();
        (Response::new(Box::new(recorder.clone())), recorder)
    }

    #[test]
    fn send_is_plain_text() {
        let (res, rec) = recorded();
        res.send("hi").unwrap();
        let out = rec.0.lock().unwrap();
        assert_eq!(
            out[0],
            Outgoing { status: 200, content_type: Some("text/plain"), body: Bytes::from("hi") }
        );
    }

    #[test]
    fn json_passes_text_through() {
        let (res, rec) = recorded();
        res.json("{not json").unwrap();
        let out = rec.0.lock().unwrap();
        assert_eq!(out[0].content_type, Some("application/json"));
        assert_eq!(out[0].body, Bytes::from("{not json"));
    }

    #[test]
    fn json_value_serialises() {
        let (res, rec) = recorded();
        res.json_value(&serde_json::json!({ "id": 1 })).unwrap();
        assert_eq!(rec.0.lock().unwrap()[0].body, Bytes::from(r#"{"id":1}"#));
    }

    #[test]
    fn status_leaves_content_type_to_transport() {
        let (res, rec) = recorded();
        res.status(418, "teapot").unwrap();
        let out = rec.0.lock().unwrap();
        assert_eq!(out[0].status, 418);
        assert_eq!(out[0].content_type, None);
        assert_eq!(res.status_code(), Some(418));
    }

    #[test]
    fn first_writer_wins() {
        let (res, rec) = recorded();
        let clone = res.clone();
        assert!(!res.is_sent());

        res.status(201, "created").unwrap();
        clone.send("again").unwrap();
        res.json("{}").unwrap();
        clone.status(500, "late").unwrap();

        let out = rec.0.lock().unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].status, 201);
        assert!(clone.is_sent());
        assert_eq!(clone.status_code(), Some(201));
    }

    #[test]
    fn failed_write_still_counts_as_sent() {
        let res = Response::new(Box::new(Broken));
        assert!(matches!(res.send("x"), Err(Error::Closed)));
        assert!(res.is_sent());
        assert!(res.send("y").is_ok());
    }
}
