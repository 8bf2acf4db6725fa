//! In-memory transports connecting a `Server` thread to `Session`s.

#![allow(dead_code)]

use std::{
    io,
    net::SocketAddr,
    sync::{Arc, Mutex},
    thread,
    time::Duration,
};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use urest::{
    ClientTransport, Config, ErrorKind, FragmentSize, Header, Outcome, Received, Registry, Result,
    Server, ServerTransport, Session,
};

pub const SERVER_TIMEOUT: Duration = Duration::from_millis(100);
pub const CLIENT_TIMEOUT: Duration = Duration::from_millis(500);

fn disconnected() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "peer hung up")
}

fn copy_into(buffer: &mut [u8], frame: &[u8]) -> Received {
    buffer[..frame.len()].copy_from_slice(frame);
    Received::Datagram(frame.len())
}

pub struct ChannelServerTransport {
    inbound: Receiver<Vec<u8>>,
    outbound: Sender<Vec<u8>>,
}

impl ServerTransport for ChannelServerTransport {
    fn receive(&mut self, buffer: &mut [u8]) -> io::Result<Received> {
        match self.inbound.recv_timeout(SERVER_TIMEOUT) {
            Ok(frame) => Ok(copy_into(buffer, &frame)),
            Err(RecvTimeoutError::Timeout) => Ok(Received::Timeout),
            Err(RecvTimeoutError::Disconnected) => Err(disconnected()),
        }
    }

    fn send(&mut self, payload: &[u8]) -> io::Result<()> {
        self.outbound.send(payload.to_vec()).map_err(|_| disconnected())
    }
}

/// Rewrites an outgoing frame; returning false drops it.
pub type Tamper = Box<dyn FnMut(usize, &mut Vec<u8>) -> bool + Send>;

pub struct ChannelClientTransport {
    outbound: Sender<Vec<u8>>,
    inbound: Receiver<Vec<u8>>,
    log: Mutex<Vec<Vec<u8>>>,
    tamper: Mutex<Option<Tamper>>,
}

impl ChannelClientTransport {
    /// Headers of every frame the client sent, after tampering.
    pub fn sent_headers(&self) -> Vec<Header> {
        self.log.lock().unwrap().iter().map(|frame| Header::decode(frame).unwrap()).collect()
    }

    pub fn clear_log(&self) {
        self.log.lock().unwrap().clear();
    }

    pub fn set_tamper(&self, tamper: Tamper) {
        *self.tamper.lock().unwrap() = Some(tamper);
    }
}

impl ClientTransport for ChannelClientTransport {
    fn exchange(&self, _addr: &SocketAddr, request: &[u8], reply: &mut [u8]) -> io::Result<Received> {
        let mut frame = request.to_vec();
        let mut log = self.log.lock().unwrap();
        let index = log.len();
        let keep = match self.tamper.lock().unwrap().as_mut() {
            Some(tamper) => tamper(index, &mut frame),
            None => true,
        };
        log.push(frame.clone());
        drop(log);

        if keep {
            self.outbound.send(frame).map_err(|_| disconnected())?;
        }
        match self.inbound.recv_timeout(CLIENT_TIMEOUT) {
            Ok(frame) => Ok(copy_into(reply, &frame)),
            Err(RecvTimeoutError::Timeout) => Ok(Received::Timeout),
            Err(RecvTimeoutError::Disconnected) => Err(disconnected()),
        }
    }
}

/// A server running on its own thread, reachable through `transport`.
pub struct Loopback {
    pub transport: Arc<ChannelClientTransport>,
    outcomes: Receiver<Result<Outcome>>,
}

impl Loopback {
    pub fn start(registry: Registry) -> Self {
        Self::start_with_config(registry, Config::default())
    }

    pub fn start_with_config(registry: Registry, config: Config) -> Self {
        let (to_server, server_inbound) = unbounded();
        let (to_client, client_inbound) = unbounded();
        let (outcome_sender, outcomes) = unbounded();

        let transport = ChannelServerTransport { inbound: server_inbound, outbound: to_client };
        let mut server = Server::with_config(transport, registry, config);
        // exits once the client side of the channels is gone
        thread::spawn(move || loop {
            match server.handle_request() {
                Ok(Outcome::Idle) => {}
                Err(ErrorKind::IOError(_)) => break,
                result => {
                    if outcome_sender.send(result).is_err() {
                        break;
                    }
                }
            }
        });

        let transport = Arc::new(ChannelClientTransport {
            outbound: to_server,
            inbound: client_inbound,
            log: Mutex::new(Vec::new()),
            tamper: Mutex::new(None),
        });
        Self { transport, outcomes }
    }

    pub fn session(&self, frag_size: FragmentSize) -> Session<ChannelClientTransport> {
        let mut config = Config::default();
        config.client_receive_timeout = CLIENT_TIMEOUT;
        self.session_with_config(frag_size, config)
    }

    pub fn session_with_config(
        &self,
        frag_size: FragmentSize,
        config: Config,
    ) -> Session<ChannelClientTransport> {
        let remote = "127.0.0.1:4677".parse().unwrap();
        Session::new(self.transport.clone(), remote, frag_size, config)
    }

    /// Outcome of the next exchange the server finished.
    pub fn next_outcome(&self) -> Result<Outcome> {
        self.outcomes.recv_timeout(Duration::from_secs(5)).expect("server reported no outcome")
    }
}
