use tracing::{debug, trace, warn};
use urest_core::{
    config::Config,
    constants::MAX_FRAME_SIZE,
    error::{ErrorKind, Result},
    transport::{Received, ServerTransport},
};
use urest_protocol::{
    decode_frame, encode_frame_into, rewrite_as_ack, Admission, ContentType, ExchangeGuard,
    FragmentSize, Fragmenter, Header, MessageType, MethodMajor, Reassembled, Reassembler, Status,
    StatusCode, Verb,
};

use crate::{
    body::Body,
    registry::{Registry, Route},
};

/// How one call to [`Server::handle_request`] ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No request was pending.
    Idle,
    /// A handler ran and its response was delivered.
    Completed {
        /// Name of the resource that handled the request
        resource: String,
        /// Requested verb
        verb: Verb,
        /// Status of the final response fragment
        status: StatusCode,
    },
    /// A PING was answered.
    Pinged,
    /// The request was answered with an error status and not dispatched.
    Rejected(StatusCode),
}

enum Reception {
    Idle,
    Rejected(StatusCode),
    Complete {
        request: Vec<u8>,
        // header of fragment 0, which decides how the request is dispatched
        first: Header,
        // header of the final fragment, already carrying the exchange token
        last: Header,
    },
}

/// Serves one exchange at a time over a datagram transport.
///
/// An exchange runs to completion before the next datagram is looked at:
///
/// ```text
/// AWAIT_FRAGMENT -> DISPATCH -> INVOKE -> SEND_RESPONSE_FRAGMENT -> DONE
///       ^   | CONTINUE                          ^   | CONTINUE
///       +---+                                   +---+
/// ```
pub struct Server<T: ServerTransport> {
    transport: T,
    registry: Registry,
    config: Config,
    /// Inbound scratch buffer, reused for every receive
    datagram: Vec<u8>,
    /// Outbound frame, cleared before every send
    outgoing: Vec<u8>,
}

impl<T: ServerTransport> std::fmt::Debug for Server<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .field("transport", &"<transport>")
            .finish()
    }
}

impl<T: ServerTransport> Server<T> {
    /// Creates a server with default configuration.
    pub fn new(transport: T, registry: Registry) -> Self {
        Self::with_config(transport, registry, Config::default())
    }

    /// Creates a server with custom configuration.
    pub fn with_config(transport: T, registry: Registry, config: Config) -> Self {
        let datagram = vec![0; config.max_datagram_size.max(MAX_FRAME_SIZE)];
        Self { transport, registry, config, datagram, outgoing: Vec::with_capacity(MAX_FRAME_SIZE) }
    }

    /// Resources this server dispatches to.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Underlying transport, mutably.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Handles requests forever. Failed exchanges are logged and dropped.
    pub fn serve(&mut self) -> ! {
        loop {
            match self.handle_request() {
                Ok(Outcome::Idle) => {}
                Ok(outcome) => debug!("Exchange finished: {:?}", outcome),
                Err(err) => warn!("Exchange aborted: {}", err),
            }
        }
    }

    /// Runs at most one exchange.
    ///
    /// Returns `Outcome::Idle` if a receive times out before the request is
    /// complete; a partial request is dropped without a reply. Errors mean
    /// the exchange was abandoned without a final reply.
    pub fn handle_request(&mut self) -> Result<Outcome> {
        let mut guard = ExchangeGuard::new(self.config.retry_budget);

        let (request, first, last) = match self.receive_request(&mut guard)? {
            Reception::Idle => return Ok(Outcome::Idle),
            Reception::Rejected(status) => return Ok(Outcome::Rejected(status)),
            Reception::Complete { request, first, last } => (request, first, last),
        };

        let verb = match admissible_verb(&first) {
            Ok(verb) => verb,
            Err(status) => {
                warn!("Rejecting request with {} (header {:?})", status, first);
                send_ack(&mut self.transport, &mut self.outgoing, &last, status, &[])?;
                return Ok(Outcome::Rejected(status.code()));
            }
        };

        let route = self.registry.dispatch(&request, verb);
        // acked before any handler runs
        let status = route.status();
        send_ack(&mut self.transport, &mut self.outgoing, &last, status, &[])?;

        let (resource, response) = match route {
            Route::Handler { resource, handler } => {
                debug!(
                    "{} {} -> {} ({} bytes)",
                    verb,
                    String::from_utf8_lossy(&request),
                    resource.name(),
                    request.len()
                );
                let mut body = Body::from_request(request, self.config.max_request_len)?;
                handler.handle(&mut body);
                (resource.name().to_owned(), body.into_bytes())
            }
            Route::Ping => {
                trace!("PING on exchange {:#06x}", last.token);
                return Ok(Outcome::Pinged);
            }
            Route::NotFound => {
                warn!("{} {}: not found", verb, String::from_utf8_lossy(&request));
                return Ok(Outcome::Rejected(status.code()));
            }
            Route::NotAllowed(resource) => {
                warn!("{} not allowed on {}", verb, resource.name());
                return Ok(Outcome::Rejected(status.code()));
            }
        };

        self.send_response(&mut guard, first.frag_size, &response)?;
        debug!("Exchange {:#06x} complete, {} response bytes", last.token, response.len());
        Ok(Outcome::Completed { resource, verb, status: Status::OK.code() })
    }

    fn receive_request(&mut self, guard: &mut ExchangeGuard) -> Result<Reception> {
        let max_request_len = self.config.max_request_len;
        let mut reassembly: Option<(Header, Reassembler)> = None;

        loop {
            let len = match self.transport.receive(&mut self.datagram)? {
                Received::Datagram(len) if len > 0 => len,
                _ => {
                    if let Some((first, _)) = &reassembly {
                        debug!(
                            "Exchange {:#06x} abandoned waiting for fragment {}",
                            first.token,
                            guard.expected_sequence()
                        );
                    }
                    return Ok(Reception::Idle);
                }
            };

            let (header, payload) = match decode_frame(&self.datagram[..len]) {
                Ok(frame) => frame,
                Err(ErrorKind::DecodingError(kind)) => {
                    warn!("Undecodable header field {:?}, answering {}", kind, Status::BAD_REQUEST);
                    let header_len = rewrite_as_ack(&mut self.datagram[..len], Status::BAD_REQUEST)?;
                    self.transport.send(&self.datagram[..header_len])?;
                    return Ok(Reception::Rejected(Status::BAD_REQUEST.code()));
                }
                Err(err) => return Err(err),
            };
            trace!(
                "Fragment seq {} token {:#06x}, {} payload bytes",
                header.sequence,
                header.token,
                payload.len()
            );

            if guard.admit(&header)? == Admission::Retry {
                continue;
            }

            let token = match guard.token() {
                Some(token) => token,
                None => {
                    let token = ExchangeGuard::mint_token();
                    guard.bind(header.frag_size, token);
                    debug!(
                        "Exchange {:#06x} started with {} byte frames",
                        token,
                        header.frag_size.frame_len()
                    );
                    token
                }
            };
            let reply = header.with_token(token);

            let (first, reassembler) = reassembly.get_or_insert_with(|| {
                (reply, Reassembler::new(header.frag_size, max_request_len))
            });
            let first = *first;
            let progress = reassembler.push(payload);

            match progress {
                Ok(Reassembled::Incomplete) => {
                    send_ack(&mut self.transport, &mut self.outgoing, &reply, Status::CONTINUE, &[])?;
                    guard.advance();
                }
                Ok(Reassembled::Complete) => {
                    guard.advance();
                    let request =
                        reassembly.take().map(|(_, reassembler)| reassembler.into_bytes()).unwrap_or_default();
                    return Ok(Reception::Complete { request, first, last: reply });
                }
                Err(ErrorKind::RequestTooLong { max }) => {
                    warn!("Request on exchange {:#06x} exceeds {} bytes", token, max);
                    send_ack(&mut self.transport, &mut self.outgoing, &reply, Status::TOO_LONG, &[])?;
                    return Ok(Reception::Rejected(Status::TOO_LONG.code()));
                }
                Err(ErrorKind::PayloadTooLarge { len, capacity }) => {
                    warn!("Fragment of {} bytes exceeds the negotiated {}", len, capacity);
                    send_ack(&mut self.transport, &mut self.outgoing, &reply, Status::BAD_REQUEST, &[])?;
                    return Ok(Reception::Rejected(Status::BAD_REQUEST.code()));
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Answers each pull frame with the next response chunk.
    ///
    /// A missing pull charges the retry budget like an out-of-order one.
    fn send_response(
        &mut self,
        guard: &mut ExchangeGuard,
        frag_size: FragmentSize,
        response: &[u8],
    ) -> Result<()> {
        let fragmenter = Fragmenter::new(response, frag_size);
        let mut index = 0;

        loop {
            let len = match self.transport.receive(&mut self.datagram)? {
                Received::Datagram(len) if len > 0 => len,
                _ => {
                    trace!("Timed out waiting for pull {}", guard.expected_sequence());
                    guard.charge_retry(ErrorKind::RequestFailed)?;
                    continue;
                }
            };

            let (pull, _) = decode_frame(&self.datagram[..len])?;
            if guard.admit(&pull)? == Admission::Retry {
                continue;
            }

            let chunk = fragmenter.fragment(index).unwrap_or_default();
            let is_last = fragmenter.is_last(index);
            let status = if is_last { Status::OK } else { Status::CONTINUE };
            send_ack(&mut self.transport, &mut self.outgoing, &pull, status, chunk)?;
            guard.advance();
            index += 1;

            if is_last {
                return Ok(());
            }
        }
    }
}

/// Checks the first fragment's header before anything is dispatched.
fn admissible_verb(header: &Header) -> std::result::Result<Verb, Status> {
    if header.msg_type != MessageType::Request {
        return Err(Status::BAD_REQUEST);
    }
    if header.method_major != MethodMajor::Verb || header.content_type != ContentType::Flat {
        return Err(Status::NOT_ACCEPTABLE);
    }
    Verb::try_from(header.method_minor).map_err(|_| Status::NOT_ALLOWED)
}

fn send_ack<T: ServerTransport>(
    transport: &mut T,
    outgoing: &mut Vec<u8>,
    request: &Header,
    status: Status,
    payload: &[u8],
) -> Result<()> {
    encode_frame_into(outgoing, &request.ack(status), payload)?;
    trace!("Ack {} seq {} with {} payload bytes", status.code(), request.sequence, payload.len());
    transport.send(outgoing)?;
    Ok(())
}
