use crate::Request;

use std::error::Error;
use std::io::Read;

/// Request and response transport abstraction.
///
/// The `Transport` trait provides a way to send a `Request` to a server and to receive the
/// corresponding response. A `Transport` implementor is passed to [`Request::call`] in order to use
/// it to perform that request.
///
/// This crate only encodes and decodes messages, it does not ship a transport. XML-RPC is usually
/// carried by an HTTP POST with `Content-Type: text/xml`; implement this trait on top of the HTTP
/// client of your choice. Retrying failed requests is up to the implementation as well.
///
/// [`Request::call`]: struct.Request.html#method.call
pub trait Transport {
    /// The response stream returned by `transmit`.
    type Stream: Read;

    /// Transmits an XML-RPC request and returns the server's response.
    ///
    /// The request body can be obtained with [`Request::write_as_xml`]. The response is returned
    /// as a `Self::Stream` - some type implementing the `Read` trait. The library will read all of
    /// the data and parse it as a response. It must be UTF-8 encoded XML, otherwise the call will
    /// fail.
    ///
    /// # Errors
    ///
    /// If a transport error occurs, it should be returned as a boxed error - the library will then
    /// return an appropriate [`RequestError`] to the caller.
    ///
    /// [`Request::write_as_xml`]: struct.Request.html#method.write_as_xml
    /// [`RequestError`]: enum.RequestError.html
    fn transmit(self, request: &Request) -> Result<Self::Stream, Box<dyn Error + Send + Sync>>;
}
