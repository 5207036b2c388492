//! Fake daemon for exercising the Unix transport.
//!
//! [`FakeDaemon`] binds a listener inside a temporary directory, accepts a
//! single connection, records the NUL-terminated request, and then behaves
//! according to the scripted [`Reply`]. After replying it reports whether the
//! client closed its end, which is how tests observe descriptor cleanup.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::thread;
use std::time::{Duration, Instant};

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

const ACCEPT_DEADLINE: Duration = Duration::from_secs(2);

/// Scripted behaviour once a request has been read.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Write the bytes and close the connection.
    Close(Vec<u8>),
    /// Write the bytes, then keep the connection open for the duration.
    Hold(Vec<u8>, Duration),
}

impl Reply {
    /// Replies with `text` and closes.
    #[must_use]
    pub fn text(text: &str) -> Self {
        Self::Close(text.as_bytes().to_vec())
    }

    /// Never replies; holds the connection open for `duration`.
    #[must_use]
    pub const fn silent(duration: Duration) -> Self {
        Self::Hold(Vec::new(), duration)
    }
}

/// What the fake daemon observed on its single connection.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Session {
    /// Request bytes up to, but excluding, the NUL terminator. `None` when no
    /// client connected before the accept deadline.
    pub request: Option<Vec<u8>>,
    /// True when the request arrived with its NUL terminator.
    pub terminated: bool,
    /// True when the client closed its end while the daemon was holding.
    pub client_closed: bool,
}

impl Session {
    /// Request decoded as UTF-8, lossily.
    #[must_use]
    pub fn request_text(&self) -> Option<String> {
        self.request
            .as_deref()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

/// Single-connection daemon stand-in listening on a temporary socket.
pub struct FakeDaemon {
    _dir: TempDir,
    path: Utf8PathBuf,
    handle: Option<thread::JoinHandle<io::Result<Session>>>,
}

impl FakeDaemon {
    /// Binds the socket and starts serving `reply` on a background thread.
    ///
    /// # Errors
    ///
    /// Returns an error when the temporary directory or listener cannot be
    /// created.
    pub fn spawn(reply: Reply) -> io::Result<Self> {
        let dir = TempDir::new()?;
        let path = Utf8PathBuf::from_path_buf(dir.path().join("xenon.sock")).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidInput, "temporary path is not UTF-8")
        })?;
        let listener = UnixListener::bind(path.as_std_path())?;
        listener.set_nonblocking(true)?;
        let handle = thread::spawn(move || serve(&listener, &reply));
        Ok(Self {
            _dir: dir,
            path,
            handle: Some(handle),
        })
    }

    /// Socket path clients should dial.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Waits for the serving thread and returns what it observed.
    ///
    /// # Errors
    ///
    /// Returns an error when serving failed or the thread panicked.
    pub fn finish(mut self) -> io::Result<Session> {
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| io::Error::other("fake daemon thread panicked"))?,
            None => Ok(Session::default()),
        }
    }
}

impl Drop for FakeDaemon {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn serve(listener: &UnixListener, reply: &Reply) -> io::Result<Session> {
    let deadline = Instant::now() + ACCEPT_DEADLINE;
    loop {
        match listener.accept() {
            Ok((stream, _)) => return respond(stream, reply),
            Err(ref error) if error.kind() == io::ErrorKind::WouldBlock => {
                if Instant::now() >= deadline {
                    // Nobody connected; tests asserting "no connection" rely on this.
                    return Ok(Session::default());
                }
                thread::sleep(Duration::from_millis(5));
            }
            Err(error) => return Err(error),
        }
    }
}

fn respond(stream: UnixStream, reply: &Reply) -> io::Result<Session> {
    stream.set_nonblocking(false)?;

    let mut request = Vec::new();
    {
        let mut reader = BufReader::new(stream.try_clone()?);
        reader.read_until(0, &mut request)?;
    }
    let terminated = request.last() == Some(&0);
    if terminated {
        request.pop();
    }

    let mut session = Session {
        request: Some(request),
        terminated,
        client_closed: false,
    };
    let mut stream = stream;
    match reply {
        Reply::Close(bytes) => {
            stream.write_all(bytes)?;
            stream.flush()?;
        }
        Reply::Hold(bytes, duration) => {
            stream.write_all(bytes)?;
            stream.flush()?;
            session.client_closed = wait_for_close(&mut stream, *duration)?;
        }
    }
    Ok(session)
}

fn wait_for_close(stream: &mut UnixStream, duration: Duration) -> io::Result<bool> {
    stream.set_read_timeout(Some(duration))?;
    let mut buffer = [0_u8; 16];
    match stream.read(&mut buffer) {
        Ok(0) => Ok(true),
        Ok(_) => Ok(false),
        Err(error)
            if matches!(
                error.kind(),
                io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
            ) =>
        {
            Ok(false)
        }
        Err(error) if error.kind() == io::ErrorKind::ConnectionReset => Ok(true),
        Err(error) => Err(error),
    }
}
