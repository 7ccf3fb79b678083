//! Threaded TCP front-end over a shared world
//!
//! A [`Runner`] steps the world on its own thread, locking it around every
//! full `step()`. The [`Server`] accepts clients and serves each on its own
//! thread; every request copies a [`Snapshot`](crate::simulation::engine::Snapshot)
//! under the same lock, so a reply never mixes positions from two ticks.
//!
//! Either side can be stopped between steps: [`Runner::stop`] (or a step
//! bound) ends the stepping thread, a [`ShutdownHandle`] ends the accept loop.

use std::io::{BufRead, BufReader, Write};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, trace, warn};

use crate::network::codec::{self, MASS_HEADER, SPRING_HEADER};
use crate::simulation::engine::{SharedWorld, World};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 7783; // 'M' = 77, 'S' = 83

/// Lock the world even if a previous holder panicked mid-read
fn lock(world: &SharedWorld) -> MutexGuard<'_, World> {
    world.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Build the reply payload for one request line
///
/// `mass` and `spring` return the matching message; anything else gets an
/// empty payload.
pub fn respond(world: &SharedWorld, request: &str) -> Vec<u8> {
    match request.trim() {
        MASS_HEADER => codec::encode_masses(&lock(world).snapshot()).into_bytes(),
        SPRING_HEADER => codec::encode_springs(&lock(world).snapshot()).into_bytes(),
        _ => Vec::new(),
    }
}

/// Serve one client until it disconnects or sends `exit` / `quit`
pub fn handle_client(stream: TcpStream, world: SharedWorld) -> std::io::Result<()> {
    let peer = stream.peer_addr()?;
    let mut writer = stream.try_clone()?;
    let reader = BufReader::new(stream);

    for line in reader.lines() {
        let request = line?;
        debug!(%peer, %request, "request received");
        if codec::is_control(&request) {
            break;
        }
        let payload = respond(&world, &request);
        codec::write_frame(&mut writer, &payload)?;
        trace!(%peer, "sent {} bytes", payload.len());
    }
    writer.flush()?;
    info!(%peer, "client session closed");
    Ok(())
}

/// Steps a shared world on a background thread until stopped
pub struct Runner {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<u64>>,
}

impl Runner {
    /// Start stepping; `pace` sleeps between steps (zero runs flat out)
    ///
    /// With `limit`, the thread also ends on its own after that many steps.
    pub fn spawn(world: SharedWorld, pace: Duration, limit: Option<u64>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let handle = thread::spawn(move || {
            let mut steps = 0u64;
            while !flag.load(Ordering::Acquire) && limit.map_or(true, |n| steps < n) {
                lock(&world).step();
                steps += 1;
                if !pace.is_zero() {
                    thread::sleep(pace);
                }
            }
            debug!(steps, "runner finished");
            steps
        });
        Self {
            stop,
            handle: Some(handle),
        }
    }

    /// Stop after the step in progress and return how many steps ran
    pub fn stop(self) -> u64 {
        self.stop.store(true, Ordering::Release);
        self.wait()
    }

    /// Block until the runner ends by itself; only returns for a bounded runner
    pub fn wait(mut self) -> u64 {
        self.handle
            .take()
            .and_then(|h| h.join().ok())
            .unwrap_or_default()
    }
}

impl Drop for Runner {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

// pause after a failed accept, e.g. when out of file descriptors
const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

/// Accepts clients and spawns a handler thread for each
pub struct Server {
    listener: TcpListener,
    world: SharedWorld,
    running: Arc<AtomicBool>,
}

/// Ends a [`Server::serve`] loop from another thread
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    running: Arc<AtomicBool>,
    addr: SocketAddr,
}

impl ShutdownHandle {
    /// Clear the running flag and wake the blocked `accept`
    pub fn shutdown(&self) {
        if self.running.swap(false, Ordering::AcqRel) {
            if let Err(e) = TcpStream::connect(self.addr) {
                debug!(addr = %self.addr, error = %e, "wake-up connection failed");
            }
        }
    }
}

impl Server {
    pub fn bind(addr: impl ToSocketAddrs, world: SharedWorld) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr)?;
        info!(addr = %listener.local_addr()?, "server listening");
        Ok(Self {
            listener,
            world,
            running: Arc::new(AtomicBool::new(true)),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Handle that stops `serve`; usable once the server moved to its own thread
    pub fn shutdown_handle(&self) -> std::io::Result<ShutdownHandle> {
        let mut addr = self.listener.local_addr()?;
        if addr.ip().is_unspecified() {
            let loopback: IpAddr = match addr {
                SocketAddr::V4(_) => Ipv4Addr::LOCALHOST.into(),
                SocketAddr::V6(_) => Ipv6Addr::LOCALHOST.into(),
            };
            addr.set_ip(loopback);
        }
        Ok(ShutdownHandle {
            running: Arc::clone(&self.running),
            addr,
        })
    }

    fn spawn_session(&self, stream: TcpStream, addr: SocketAddr) -> JoinHandle<()> {
        info!(%addr, "accepted connection");
        let world = Arc::clone(&self.world);
        thread::spawn(move || {
            if let Err(e) = handle_client(stream, world) {
                warn!(%addr, error = %e, "client handler failed");
            }
        })
    }

    /// Accept one client and serve it on a new thread
    pub fn accept_one(&self) -> std::io::Result<JoinHandle<()>> {
        let (stream, addr) = self.listener.accept()?;
        Ok(self.spawn_session(stream, addr))
    }

    /// Accept clients until a [`ShutdownHandle`] fires; returns how many were served
    ///
    /// A failed accept is logged and retried, it never ends the loop.
    pub fn serve(&self) -> usize {
        let mut clients = 0;
        while self.running.load(Ordering::Acquire) {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    if !self.running.load(Ordering::Acquire) {
                        break;
                    }
                    self.spawn_session(stream, addr);
                    clients += 1;
                }
                Err(e) => {
                    warn!(error = %e, "accept failed");
                    thread::sleep(ACCEPT_BACKOFF);
                }
            }
        }
        info!(clients, "server stopped");
        clients
    }
}
