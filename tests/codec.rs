//! Drives requests through a scripted transport, the way a binding layer would.

use xmlrpc_codec::{
    decode_document, DateTime, Element, EncodeError, Fault, MulticallBatch, Request, RequestError, Transport, Value,
    MULTICALL_METHOD,
};

use std::cell::RefCell;
use std::error::Error;
use std::io::Cursor;

/// Records the request body and answers with a canned response.
struct Scripted<'a> {
    sent: &'a RefCell<Vec<String>>,
    response: Result<&'static str, &'static str>,
}

impl<'a> Transport for Scripted<'a> {
    type Stream = Cursor<Vec<u8>>;

    fn transmit(self, request: &Request) -> Result<Self::Stream, Box<dyn Error + Send + Sync>> {
        let mut body = Vec::new();
        request.write_as_xml(&mut body)?;
        self.sent.borrow_mut().push(String::from_utf8(body)?);

        let response = self.response?;
        Ok(Cursor::new(response.as_bytes().to_vec()))
    }
}

fn respond<'a>(sent: &'a RefCell<Vec<String>>, response: &'static str) -> Scripted<'a> {
    Scripted { sent, response: Ok(response) }
}

#[test]
fn calls_a_method() {
    let sent = RefCell::new(Vec::new());
    let result = Request::new("pow")
        .arg(2)
        .arg(8)
        .call(respond(
            &sent,
            "<methodResponse><params><param><value><int>256</int></value></param></params></methodResponse>",
        ))
        .unwrap();

    assert_eq!(result.as_i64(), Some(256));
    assert_eq!(
        sent.borrow()[0],
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?><methodCall><methodName>pow</methodName><params>"#,
            "<param><value><int>2</int></value></param><param><value><int>8</int></value></param>",
            "</params></methodCall>"
        )
    );
}

#[test]
fn reports_faults() {
    let sent = RefCell::new(Vec::new());
    let err = Request::new("pow")
        .arg("BLA")
        .call(respond(
            &sent,
            r#"<?xml version="1.0"?>
<methodResponse><fault><value><struct>
  <member><name>faultCode</name><value><int>1</int></value></member>
  <member><name>faultString</name><value><string>&lt;class 'TypeError'&gt;</string></value></member>
</struct></value></fault></methodResponse>"#,
        ))
        .unwrap_err();

    let fault = err.fault().expect("returned error was not a fault");
    assert_eq!(fault, &Fault::new(1, "<class 'TypeError'>"));
}

#[test]
fn reports_transport_and_parse_errors() {
    let sent = RefCell::new(Vec::new());

    let err = Request::new("x")
        .call(Scripted { sent: &sent, response: Err("connection refused") })
        .unwrap_err();
    assert!(matches!(err, RequestError::Transport(_)));
    assert_eq!(err.to_string(), "transport error: connection refused");

    let err = Request::new("x").call(respond(&sent, "<html>nope</html>")).unwrap_err();
    assert!(matches!(err, RequestError::Decode(_)));

    let sent_before = sent.borrow().len();
    let err = Request::new("").call(respond(&sent, "")).unwrap_err();
    assert!(matches!(err, RequestError::Encode(EncodeError::EmptyMethodName)), "{:?}", err);
    let err = Request::new("at")
        .arg(DateTime::new(10000, 1, 1, 0, 0, 0))
        .call(respond(&sent, ""))
        .unwrap_err();
    assert!(matches!(err, RequestError::Encode(EncodeError::YearOutOfRange(10000))), "{:?}", err);
    // nothing was sent for requests that can't be encoded
    assert_eq!(sent.borrow().len(), sent_before);
}

#[test]
fn performs_a_multicall() {
    let sent = RefCell::new(Vec::new());

    let mut batch = MulticallBatch::new();
    batch
        .push(Request::new("pow").arg(2).arg(4))
        .push(Request::new("add").arg(2).arg(4))
        .push(Request::new("doesn't exist"));
    let request = batch.clone().into_request();

    let result = request
        .call(respond(
            &sent,
            r#"<?xml version="1.0"?>
<methodResponse><params><param><value><array><data>
  <value><array><data><value><int>16</int></value></data></array></value>
  <value><array><data><value><int>6</int></value></data></array></value>
  <value><struct>
    <member><name>faultCode</name><value><int>1</int></value></member>
    <member><name>faultString</name><value><string>method "doesn't exist" is not supported</string></value></member>
  </struct></value>
</data></array></value></param></params></methodResponse>"#,
        ))
        .unwrap();

    let sent = sent.borrow();
    let body = &sent[0];
    assert!(body.contains(&format!("<methodName>{}</methodName>", MULTICALL_METHOD)));
    assert!(body.contains("<member><name>methodName</name><value><string><![CDATA[pow]]></string></value></member>"));

    let responses = batch.split_response(result).unwrap();
    assert_eq!(responses[0], Ok(Value::Int(16)));
    assert_eq!(responses[1], Ok(Value::Int(6)));
    assert_eq!(responses[2].as_ref().unwrap_err().code(), 1);
}

#[test]
fn decodes_a_parsed_document() {
    let root = Element::parse_str(
        "<methodResponse><params><param><value><boolean>1</boolean></value></param></params></methodResponse>",
    )
    .unwrap();

    assert_eq!(decode_document(&root).unwrap(), Ok(Value::Bool(true)));
}
