//! Behavioural tests for the framed lookup dispatch loop.

use std::cell::RefCell;
use std::io::Write;
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use nsdir_config::{DirectoryConfig, SocketEndpoint};
use nsdir_proto::{
    Entry, FieldWriter, MAX_REQUEST_BYTES, PROTOCOL_VERSION, RequestCode, Response,
    ResponseStatus, encode_request,
};

use crate::discovery::PublishedConfig;
use crate::dispatch::{
    DirectoryClient, DirectoryError, DispatchConnectionHandler, DispatchTable, LookupKey,
    SearchRequest,
};
use crate::transport::{ListenerHandle, SocketListener};

use super::behaviour::strip_quotes;

/// Directory holding a single user and no groups.
struct SingleUserDirectory;

impl DirectoryClient for SingleUserDirectory {
    fn search(
        &self,
        _directory: &DirectoryConfig,
        request: &SearchRequest,
    ) -> Result<Vec<Entry>, DirectoryError> {
        match request.key() {
            LookupKey::Name(name) if name == "alice" => {
                Ok(vec![Entry::new().with_attribute("uid", ["alice"])])
            }
            _ => Ok(Vec::new()),
        }
    }
}

#[fixture]
fn test_handler() -> Arc<DispatchConnectionHandler> {
    let published = Arc::new(PublishedConfig::new(DirectoryConfig::default()));
    Arc::new(DispatchConnectionHandler::new(
        DispatchTable::standard(),
        Arc::new(SingleUserDirectory),
        published,
    ))
}

struct DispatchWorld {
    handler: Arc<DispatchConnectionHandler>,
    listener: Option<ListenerHandle>,
    client: Option<TcpStream>,
    address: Option<SocketAddr>,
    response: Option<Response>,
}

impl DispatchWorld {
    fn with_handler(handler: Arc<DispatchConnectionHandler>) -> Self {
        Self {
            handler,
            listener: None,
            client: None,
            address: None,
            response: None,
        }
    }

    fn start_listener(&mut self) {
        let listener =
            SocketListener::bind(&SocketEndpoint::tcp("127.0.0.1", 0)).expect("bind listener");
        self.address = listener.local_addr();
        self.listener = Some(
            listener
                .start(self.handler.clone())
                .expect("start listener"),
        );
        let stream = TcpStream::connect(self.address.expect("address set")).expect("connect");
        stream
            .set_read_timeout(Some(Duration::from_secs(2)))
            .expect("set read timeout");
        self.client = Some(stream);
    }

    /// Writes one frame and reads the response on the same channel.
    fn exchange(&mut self, frame: &[u8]) {
        let stream = self.client.as_mut().expect("connection established");
        stream.write_all(frame).expect("write request");
        stream.flush().expect("flush");
        self.response = Some(Response::read_from(stream).expect("read response"));
    }

    fn response(&self) -> &Response {
        self.response.as_ref().expect("response received")
    }
}

impl Drop for DispatchWorld {
    fn drop(&mut self) {
        drop(self.client.take());
        if let Some(handle) = self.listener.take() {
            handle.shutdown();
            let _ = handle.join();
        }
    }
}

fn raw_frame(code: i32, body: &[u8]) -> Vec<u8> {
    let mut frame = Vec::new();
    frame.extend_from_slice(&PROTOCOL_VERSION.to_be_bytes());
    frame.extend_from_slice(&code.to_be_bytes());
    let len = u32::try_from(body.len()).expect("body length fits");
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(body);
    frame
}

#[fixture]
fn world(test_handler: Arc<DispatchConnectionHandler>) -> RefCell<DispatchWorld> {
    RefCell::new(DispatchWorld::with_handler(test_handler))
}

#[given("a daemon connection is established")]
fn given_daemon_connection(world: &RefCell<DispatchWorld>) {
    world.borrow_mut().start_listener();
}

#[when("a passwd lookup for {name} is sent")]
fn when_passwd_lookup(world: &RefCell<DispatchWorld>, name: String) {
    let mut body = FieldWriter::new();
    body.put_string(strip_quotes(&name)).expect("name fits");
    let frame = encode_request(RequestCode::PasswdByName, &body.into_bytes()).expect("encode");
    world.borrow_mut().exchange(&frame);
}

#[when("a group enumeration is sent")]
fn when_group_enumeration(world: &RefCell<DispatchWorld>) {
    let frame = encode_request(RequestCode::GroupAll, &[]).expect("encode");
    world.borrow_mut().exchange(&frame);
}

#[when("a request with code {code} is sent")]
fn when_unknown_code(world: &RefCell<DispatchWorld>, code: i32) {
    world.borrow_mut().exchange(&raw_frame(code, b"ignored"));
}

#[when("an oversized passwd lookup is sent")]
fn when_oversized_lookup(world: &RefCell<DispatchWorld>) {
    let body = vec![b'a'; MAX_REQUEST_BYTES + 1];
    world
        .borrow_mut()
        .exchange(&raw_frame(RequestCode::PasswdByName.code(), &body));
}

#[then("the response status is {status}")]
fn then_status(world: &RefCell<DispatchWorld>, status: String) -> Result<(), String> {
    let expected = match status.as_str() {
        "success" => ResponseStatus::Success,
        "not found" => ResponseStatus::NotFound,
        "unknown request" => ResponseStatus::UnknownRequest,
        "protocol violation" => ResponseStatus::ProtocolViolation,
        other => return Err(format!("unsupported status '{other}'")),
    };
    let actual = world.borrow().response().status;
    if actual == expected {
        Ok(())
    } else {
        Err(format!("expected {expected:?}, got {actual:?}"))
    }
}

#[then("the response carries {count} entry")]
fn then_entry_count(world: &RefCell<DispatchWorld>, count: usize) {
    assert_eq!(world.borrow().response().entries.len(), count);
}

#[then("the response carries {count} entries")]
fn then_entries_count(world: &RefCell<DispatchWorld>, count: usize) {
    assert_eq!(world.borrow().response().entries.len(), count);
}

#[scenario(path = "tests/features/lookup_dispatch.feature")]
fn lookup_dispatch(#[from(world)] world: RefCell<DispatchWorld>) {
    drop(world);
}
