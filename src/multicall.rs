//! Batching of several calls into a single `system.multicall` request.
//!
//! The server answers a multicall with an array holding one entry per call: a one-element array
//! wrapping the result on success, or a fault struct on failure.

use crate::error::DecodeError;
use crate::{Fault, Request, Response, Value};

use tracing::{debug, warn};

/// Name of the XML-RPC method that executes a batch of calls.
pub const MULTICALL_METHOD: &str = "system.multicall";

/// An ordered batch of calls sent as one `system.multicall` request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MulticallBatch<'a> {
    calls: Vec<Request<'a>>,
}

impl<'a> MulticallBatch<'a> {
    pub fn new() -> Self {
        MulticallBatch { calls: Vec::new() }
    }

    /// Appends a call to the batch.
    pub fn push(&mut self, request: Request<'a>) -> &mut Self {
        self.calls.push(request);
        self
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Builds the `system.multicall` request, whose only argument is an array of
    /// `{methodName, params}` structs in batch order.
    pub fn into_request(self) -> Request<'static> {
        debug!(calls = self.calls.len(), "batching calls into {}", MULTICALL_METHOD);

        let calls = self.calls.into_iter().map(Request::into_multicall_struct).collect::<Vec<_>>();
        Request::new(MULTICALL_METHOD).arg(Value::Array(calls))
    }

    /// Splits the value returned for this batch into one `Response` per call.
    pub fn split_response(&self, value: Value) -> Result<Vec<Response>, DecodeError> {
        let responses = split_multicall(value)?;
        if responses.len() != self.calls.len() {
            warn!(expected = self.calls.len(), got = responses.len(), "multicall result count mismatch");
            return Err(DecodeError::MalformedMulticall(format!(
                "expected {} results, got {}",
                self.calls.len(),
                responses.len()
            )));
        }
        Ok(responses)
    }
}

impl<'a> Extend<Request<'a>> for MulticallBatch<'a> {
    fn extend<I: IntoIterator<Item = Request<'a>>>(&mut self, iter: I) {
        self.calls.extend(iter);
    }
}

impl<'a> FromIterator<Request<'a>> for MulticallBatch<'a> {
    fn from_iter<I: IntoIterator<Item = Request<'a>>>(iter: I) -> Self {
        MulticallBatch { calls: iter.into_iter().collect() }
    }
}

impl<'a> Request<'a> {
    /// Creates a `system.multicall` request performing all of `requests`.
    pub fn new_multicall<'r, I>(requests: I) -> Request<'static>
    where
        'a: 'r,
        I: IntoIterator<Item = &'r Request<'a>>,
    {
        requests.into_iter().cloned().collect::<MulticallBatch>().into_request()
    }
}

/// Splits the value returned by `system.multicall` into the individual responses.
///
/// Each entry must either be an array holding exactly one value (the result), or a fault struct.
pub fn split_multicall(value: Value) -> Result<Vec<Response>, DecodeError> {
    let entries = match value {
        Value::Array(entries) => entries,
        other => {
            return Err(DecodeError::MalformedMulticall(format!("expected an array, got {:?}", other)));
        }
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| match entry {
            Value::Array(mut result) if result.len() == 1 => Ok(Ok(result.remove(0))),
            Value::Struct(_) => Fault::from_value(&entry).map(Err).ok_or_else(|| {
                DecodeError::MalformedMulticall(format!("entry {} is a struct but not a fault", index))
            }),
            other => Err(DecodeError::MalformedMulticall(format!(
                "entry {} is neither a one-element array nor a fault: {:?}",
                index, other
            ))),
        })
        .collect()
}
