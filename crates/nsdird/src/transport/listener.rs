//! Accept loop for the client channel endpoint.

use std::io;
use std::net::{TcpListener, ToSocketAddrs};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};

use nsdir_config::SocketEndpoint;

use super::{ConnectionHandler, ConnectionStream, LISTENER_TARGET, ListenerError};

#[cfg(unix)]
use std::fs;
#[cfg(unix)]
use std::os::unix::fs::FileTypeExt;
#[cfg(unix)]
use std::os::unix::net::{UnixListener, UnixStream};
#[cfg(unix)]
use std::path::Path;

const IDLE_POLL: Duration = Duration::from_millis(25);
const ERROR_PAUSE: Duration = Duration::from_millis(150);
const ACCEPT_THREAD: &str = "nsdird-accept";
const CHANNEL_THREAD: &str = "nsdird-channel";

/// Client endpoint that is bound but not yet accepting.
///
/// Dropping a listener bound to a Unix socket removes the socket file, so
/// every exit path after a successful bind leaves the filesystem clean.
#[derive(Debug)]
pub(crate) struct SocketListener {
    endpoint: SocketEndpoint,
    acceptor: Acceptor,
}

#[derive(Debug)]
enum Acceptor {
    Tcp(TcpListener),
    #[cfg(unix)]
    Unix(UnixListener),
}

impl Acceptor {
    fn set_nonblocking(&self) -> io::Result<()> {
        match self {
            Self::Tcp(listener) => listener.set_nonblocking(true),
            #[cfg(unix)]
            Self::Unix(listener) => listener.set_nonblocking(true),
        }
    }

    /// Returns the next pending channel, or `None` when nobody is waiting.
    fn poll(&self) -> io::Result<Option<ConnectionStream>> {
        let accepted = match self {
            Self::Tcp(listener) => listener.accept().and_then(|(stream, _)| {
                stream.set_nonblocking(false)?;
                Ok(ConnectionStream::Tcp(stream))
            }),
            #[cfg(unix)]
            Self::Unix(listener) => listener.accept().and_then(|(stream, _)| {
                stream.set_nonblocking(false)?;
                Ok(ConnectionStream::Unix(stream))
            }),
        };
        match accepted {
            Ok(stream) => Ok(Some(stream)),
            Err(error) if error.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(error) => Err(error),
        }
    }
}

impl SocketListener {
    /// Binds `endpoint`.
    ///
    /// A Unix socket file left behind by a previous run is replaced; one
    /// that still answers belongs to a live daemon and is refused.
    pub(crate) fn bind(endpoint: &SocketEndpoint) -> Result<Self, ListenerError> {
        let acceptor = match endpoint {
            SocketEndpoint::Tcp { host, port } => Acceptor::Tcp(bind_tcp(endpoint, host, *port)?),
            #[cfg(unix)]
            SocketEndpoint::Unix { path } => Acceptor::Unix(bind_unix(path.as_std_path())?),
            #[cfg(not(unix))]
            SocketEndpoint::Unix { .. } => {
                return Err(ListenerError::UnsupportedUnix {
                    endpoint: endpoint.to_string(),
                });
            }
        };
        Ok(Self {
            endpoint: endpoint.clone(),
            acceptor,
        })
    }

    #[cfg(test)]
    pub(crate) fn local_addr(&self) -> Option<std::net::SocketAddr> {
        match &self.acceptor {
            Acceptor::Tcp(listener) => listener.local_addr().ok(),
            #[cfg(unix)]
            Acceptor::Unix(_) => None,
        }
    }

    /// Moves the listener onto a background accept thread.
    ///
    /// Each accepted channel is served on its own thread, so one slow client
    /// never holds up the others.
    pub(crate) fn start(
        self,
        handler: Arc<dyn ConnectionHandler>,
    ) -> Result<ListenerHandle, ListenerError> {
        self.acceptor
            .set_nonblocking()
            .map_err(|source| ListenerError::Configure { source })?;
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let thread = thread::Builder::new()
            .name(ACCEPT_THREAD.to_owned())
            .spawn(move || self.accept_until(&flag, &handler))
            .map_err(|source| ListenerError::Spawn { source })?;
        Ok(ListenerHandle {
            stop,
            thread: Some(thread),
        })
    }

    fn accept_until(self, stop: &AtomicBool, handler: &Arc<dyn ConnectionHandler>) {
        info!(
            target: LISTENER_TARGET,
            endpoint = %self.endpoint,
            "accepting lookup clients"
        );
        // Repeated identical accept failures are logged once.
        let mut last_failure = None::<io::ErrorKind>;
        while !stop.load(Ordering::SeqCst) {
            match self.acceptor.poll() {
                Ok(Some(stream)) => {
                    last_failure = None;
                    spawn_channel(stream, handler);
                }
                Ok(None) => thread::sleep(IDLE_POLL),
                Err(error) => {
                    if last_failure.replace(error.kind()) != Some(error.kind()) {
                        warn!(
                            target: LISTENER_TARGET,
                            %error,
                            "failed to accept client channel"
                        );
                    }
                    thread::sleep(ERROR_PAUSE);
                }
            }
        }
        info!(
            target: LISTENER_TARGET,
            endpoint = %self.endpoint,
            "stopped accepting lookup clients"
        );
    }

    #[cfg(unix)]
    fn remove_socket_file(&self) {
        let SocketEndpoint::Unix { path } = &self.endpoint else {
            return;
        };
        if let Err(error) = fs::remove_file(path.as_std_path())
            && error.kind() != io::ErrorKind::NotFound
        {
            warn!(
                target: LISTENER_TARGET,
                %error,
                %path,
                "failed to remove unix socket file"
            );
        }
    }
}

impl Drop for SocketListener {
    fn drop(&mut self) {
        #[cfg(unix)]
        self.remove_socket_file();
    }
}

/// Handle to the background accept thread.
///
/// Dropping the handle asks the thread to stop without waiting for it.
pub(crate) struct ListenerHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl ListenerHandle {
    pub(crate) fn shutdown(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Stops accepting and waits for the accept thread to release the
    /// endpoint. Channels already being served finish on their own threads.
    pub(crate) fn join(mut self) -> Result<(), ListenerError> {
        self.shutdown();
        match self.thread.take() {
            Some(thread) => thread.join().map_err(|_| ListenerError::AcceptPanicked),
            None => Ok(()),
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn spawn_channel(stream: ConnectionStream, handler: &Arc<dyn ConnectionHandler>) {
    let handler = Arc::clone(handler);
    let transport = stream.transport();
    match thread::Builder::new()
        .name(CHANNEL_THREAD.to_owned())
        .spawn(move || handler.handle(stream))
    {
        Ok(_) => debug!(target: LISTENER_TARGET, transport, "client channel accepted"),
        Err(error) => warn!(
            target: LISTENER_TARGET,
            %error,
            "failed to spawn client channel thread"
        ),
    }
}

fn bind_tcp(endpoint: &SocketEndpoint, host: &str, port: u16) -> Result<TcpListener, ListenerError> {
    let unresolved = |source: Option<io::Error>| ListenerError::Unresolved {
        endpoint: endpoint.to_string(),
        source,
    };
    let addr = (host, port)
        .to_socket_addrs()
        .map_err(|error| unresolved(Some(error)))?
        .next()
        .ok_or_else(|| unresolved(None))?;
    TcpListener::bind(addr).map_err(|source| ListenerError::bind(addr, source))
}

/// What currently occupies a Unix socket path.
#[cfg(unix)]
#[derive(Debug, PartialEq, Eq)]
enum Occupant {
    Nothing,
    StaleSocket,
    LiveSocket,
    OtherFile,
}

#[cfg(unix)]
fn occupant_of(path: &Path) -> Result<Occupant, ListenerError> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Occupant::Nothing),
        Err(error) => return Err(ListenerError::reclaim(path.display(), error)),
    };
    if !metadata.file_type().is_socket() {
        return Ok(Occupant::OtherFile);
    }
    match UnixStream::connect(path) {
        Ok(_) => Ok(Occupant::LiveSocket),
        Err(error)
            if matches!(
                error.kind(),
                io::ErrorKind::ConnectionRefused | io::ErrorKind::NotFound
            ) =>
        {
            Ok(Occupant::StaleSocket)
        }
        Err(error) => Err(ListenerError::reclaim(path.display(), error)),
    }
}

#[cfg(unix)]
fn bind_unix(path: &Path) -> Result<UnixListener, ListenerError> {
    match occupant_of(path)? {
        Occupant::Nothing => {}
        Occupant::StaleSocket => {
            debug!(
                target: LISTENER_TARGET,
                path = %path.display(),
                "replacing stale unix socket"
            );
            fs::remove_file(path).map_err(|source| ListenerError::reclaim(path.display(), source))?;
        }
        Occupant::LiveSocket => {
            return Err(ListenerError::SocketInUse {
                path: path.display().to_string(),
            });
        }
        Occupant::OtherFile => {
            return Err(ListenerError::NotASocket {
                path: path.display().to_string(),
            });
        }
    }
    UnixListener::bind(path).map_err(|source| ListenerError::bind(path.display(), source))
}
