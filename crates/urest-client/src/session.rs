use std::{net::SocketAddr, sync::Arc};

use tracing::{debug, trace, warn};
use urest_core::{
    config::Config,
    constants::{HEADER_SIZE, UNASSIGNED_TOKEN},
    error::{DecodingErrorKind, ErrorKind, Result},
    transport::{ClientTransport, Received},
};
use urest_protocol::{
    decode_frame, encode_frame_into, is_final_fragment, ExchangeGuard, FragmentSize, Fragmenter,
    Header, MessageType, MethodMajor, Status, StatusCode, Verb,
};
use urest_utilities::resolve_host;

/// A client bound to one server and one frame size.
///
/// Each call runs a complete exchange: the request goes out fragment by
/// fragment, each one waiting for its acknowledgment, then the response is
/// pulled back with empty frames. Sessions sharing a transport take turns;
/// only one exchange is in flight per session.
pub struct Session<T: ClientTransport> {
    transport: Arc<T>,
    remote: SocketAddr,
    frag_size: FragmentSize,
    config: Config,
    outgoing: Vec<u8>,
    reply: Vec<u8>,
}

impl<T: ClientTransport> std::fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("remote", &self.remote)
            .field("frag_size", &self.frag_size)
            .field("config", &self.config)
            .finish()
    }
}

impl<T: ClientTransport> Session<T> {
    /// Resolves `host` and binds a session to it with default configuration.
    pub fn link(transport: Arc<T>, host: &str, port: u16, frag_size: FragmentSize) -> Result<Self> {
        Self::link_with_config(transport, host, port, frag_size, Config::default())
    }

    /// Resolves `host` and binds a session to it with custom configuration.
    pub fn link_with_config(
        transport: Arc<T>,
        host: &str,
        port: u16,
        frag_size: FragmentSize,
        config: Config,
    ) -> Result<Self> {
        let remote = resolve_host(host, port)?;
        debug!("Linked {}:{} ({}) with {} byte frames", host, port, remote, frag_size.frame_len());
        Ok(Self::new(transport, remote, frag_size, config))
    }

    /// Binds a session to an already resolved address.
    pub fn new(transport: Arc<T>, remote: SocketAddr, frag_size: FragmentSize, config: Config) -> Self {
        let reply = vec![0; config.max_datagram_size.max(frag_size.frame_len())];
        Self { transport, remote, frag_size, config, outgoing: Vec::with_capacity(frag_size.frame_len()), reply }
    }

    /// Server address.
    pub fn remote_addr(&self) -> SocketAddr {
        self.remote
    }

    /// Frame size every exchange of this session uses.
    pub fn frag_size(&self) -> FragmentSize {
        self.frag_size
    }

    /// Shared transport.
    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// Sends a GET and collects the response into `response`.
    pub fn get(&mut self, request: &[u8], response: &mut Vec<u8>) -> Result<StatusCode> {
        self.request(Verb::Get, request, response)
    }

    /// Sends a POST and collects the response into `response`.
    pub fn post(&mut self, request: &[u8], response: &mut Vec<u8>) -> Result<StatusCode> {
        self.request(Verb::Post, request, response)
    }

    /// Sends a PUT and collects the response into `response`.
    pub fn put(&mut self, request: &[u8], response: &mut Vec<u8>) -> Result<StatusCode> {
        self.request(Verb::Put, request, response)
    }

    /// Sends a DELETE and collects the response into `response`.
    pub fn delete(&mut self, request: &[u8], response: &mut Vec<u8>) -> Result<StatusCode> {
        self.request(Verb::Delete, request, response)
    }

    /// Checks the server is alive; a live server answers 131.
    pub fn ping(&mut self) -> Result<StatusCode> {
        self.request(Verb::Ping, b"", &mut Vec::new())
    }

    /// Runs one exchange with `verb`.
    ///
    /// `response` is cleared first and holds at most `max_response_len` bytes
    /// afterwards. Wire statuses, errors included, come back as `Ok`; `Err`
    /// means the exchange itself broke down.
    pub fn request(&mut self, verb: Verb, request: &[u8], response: &mut Vec<u8>) -> Result<StatusCode> {
        response.clear();

        let mut guard = ExchangeGuard::new(self.config.retry_budget);
        guard.bind_frag_size(self.frag_size);

        let fragmenter = Fragmenter::new(request, self.frag_size);
        debug!(
            "{} {} to {} in {} fragments",
            verb,
            String::from_utf8_lossy(request),
            self.remote,
            fragmenter.fragment_count()
        );

        let mut token = UNASSIGNED_TOKEN;
        for (index, chunk) in fragmenter.chunks().enumerate() {
            let header = Header::request(self.frag_size, verb, token, guard.expected_sequence());
            let (reply, _) = self.round_trip(&header, chunk, &guard)?;
            if index == 0 {
                token = reply.token;
                guard.bind(self.frag_size, token);
            }
            guard.advance();

            let status = reply.status_code();
            if reply.method_major != MethodMajor::Info {
                debug!("{} {} answered {} while sending", verb, self.remote, status);
                return Ok(status);
            }
            match reply.status() {
                Some(Status::CONTINUE) if !fragmenter.is_last(index) => {}
                Some(Status::PROCESSING) => break,
                _ => return Ok(status),
            }
        }

        self.pull_response(verb, token, &mut guard, response)
    }

    fn pull_response(
        &mut self,
        verb: Verb,
        token: u16,
        guard: &mut ExchangeGuard,
        response: &mut Vec<u8>,
    ) -> Result<StatusCode> {
        loop {
            let header = Header::request(self.frag_size, verb, token, guard.expected_sequence());
            let (reply, len) = self.round_trip(&header, &[], guard)?;
            guard.advance();

            let status = reply.status_code();
            if status.is_client_error() || status.is_server_error() {
                debug!("{} {} answered {} while pulling", verb, self.remote, status);
                return Ok(status);
            }

            let payload = &self.reply[HEADER_SIZE..][..len];
            let room = self.config.max_response_len.saturating_sub(response.len());
            if payload.len() > room {
                warn!(
                    "Response exceeds {} bytes, dropping {} bytes",
                    self.config.max_response_len,
                    payload.len() - room
                );
            }
            response.extend_from_slice(&payload[..payload.len().min(room)]);

            if is_final_fragment(len, self.frag_size) {
                debug!("{} {} answered {} with {} bytes", verb, self.remote, status, response.len());
                return Ok(status);
            }
        }
    }

    /// Sends one frame and returns the validated reply header and its payload length.
    fn round_trip(
        &mut self,
        header: &Header,
        payload: &[u8],
        guard: &ExchangeGuard,
    ) -> Result<(Header, usize)> {
        encode_frame_into(&mut self.outgoing, header, payload)?;
        trace!("Sending seq {} with {} payload bytes", header.sequence, payload.len());

        let len = match self.transport.exchange(&self.remote, &self.outgoing, &mut self.reply)? {
            Received::Datagram(len) if len > 0 => len,
            _ => {
                warn!("No reply from {} to seq {}", self.remote, header.sequence);
                return Err(ErrorKind::RequestFailed);
            }
        };

        let (reply, reply_payload) = decode_frame(&self.reply[..len])?;
        guard.validate(&reply)?;
        if reply.msg_type != MessageType::Ack {
            warn!(
                "Reply to seq {} from {} is a {:?}, not an ACK",
                header.sequence, self.remote, reply.msg_type
            );
            return Err(ErrorKind::DecodingError(DecodingErrorKind::MessageType));
        }
        trace!(
            "Reply seq {} status {} with {} payload bytes",
            reply.sequence,
            reply.status_code(),
            reply_payload.len()
        );
        Ok((reply, reply_payload.len()))
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::VecDeque, sync::Mutex};

    use urest_protocol::status::ServerError;

    use super::*;

    const SIZE: FragmentSize = FragmentSize::Bytes16;
    const TOKEN: u16 = 0x4242;

    /// Answers each request with the next scripted datagram; `None` is a timeout.
    #[derive(Default)]
    struct ScriptedTransport {
        replies: Mutex<VecDeque<Option<Vec<u8>>>>,
        sent: Mutex<Vec<Vec<u8>>>,
    }

    impl ScriptedTransport {
        fn reply(self, sequence: u16, status: Status, payload: &[u8]) -> Self {
            self.reply_with(Header::request(SIZE, Verb::Get, TOKEN, sequence).ack(status), payload)
        }

        fn reply_with(self, header: Header, payload: &[u8]) -> Self {
            let mut frame = Vec::new();
            encode_frame_into(&mut frame, &header, payload).unwrap();
            self.replies.lock().unwrap().push_back(Some(frame));
            self
        }

        fn timeout(self) -> Self {
            self.replies.lock().unwrap().push_back(None);
            self
        }

        fn sent(&self) -> Vec<(Header, Vec<u8>)> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|frame| {
                    let (header, payload) = decode_frame(frame).unwrap();
                    (header, payload.to_vec())
                })
                .collect()
        }
    }

    impl ClientTransport for ScriptedTransport {
        fn exchange(&self, _addr: &SocketAddr, request: &[u8], reply: &mut [u8]) -> std::io::Result<Received> {
            self.sent.lock().unwrap().push(request.to_vec());
            match self.replies.lock().unwrap().pop_front().flatten() {
                Some(frame) => {
                    reply[..frame.len()].copy_from_slice(&frame);
                    Ok(Received::Datagram(frame.len()))
                }
                None => Ok(Received::Timeout),
            }
        }
    }

    fn session(transport: ScriptedTransport) -> Session<ScriptedTransport> {
        Session::new(Arc::new(transport), "127.0.0.1:4677".parse().unwrap(), SIZE, Config::default())
    }

    #[test]
    fn test_send_then_pull() {
        // "/lights/light1" is [10][4]; the response "value updated!" is [10][4]
        let transport = ScriptedTransport::default()
            .reply(0, Status::CONTINUE, b"")
            .reply(1, Status::PROCESSING, b"")
            .reply(2, Status::CONTINUE, b"value upda")
            .reply(3, Status::OK, b"ted!");
        let mut session = session(transport);

        let mut response = Vec::new();
        let status = session.put(b"/lights/light1", &mut response).unwrap();
        assert_eq!(status, 200);
        assert_eq!(response, b"value updated!");

        let sent = session.transport().sent();
        let sequences: Vec<u16> = sent.iter().map(|(header, _)| header.sequence).collect();
        assert_eq!(sequences, vec![0, 1, 2, 3]);
        assert_eq!(sent[0].0.token, UNASSIGNED_TOKEN);
        assert!(sent[1..].iter().all(|(header, _)| header.token == TOKEN));
        assert!(sent.iter().all(|(header, _)| header.verb() == Some(Verb::Put)));
        assert!(sent.iter().all(|(header, _)| header.msg_type == MessageType::Request));
        assert_eq!(sent[0].1, b"/lights/li");
        assert_eq!(sent[1].1, b"ght1");
        assert!(sent[2].1.is_empty() && sent[3].1.is_empty());
    }

    #[test]
    fn test_exact_multiple_request_sends_empty_terminator() {
        let transport = ScriptedTransport::default()
            .reply(0, Status::CONTINUE, b"")
            .reply(1, Status::PROCESSING, b"")
            .reply(2, Status::OK, b"");
        let mut session = session(transport);

        let mut response = vec![1, 2, 3];
        assert_eq!(session.get(b"0123456789", &mut response).unwrap(), 200);
        assert!(response.is_empty());

        let sent = session.transport().sent();
        assert_eq!(sent.len(), 3);
        assert!(sent[1].1.is_empty());
    }

    #[test]
    fn test_error_status_ends_send_phase() {
        let transport = ScriptedTransport::default().reply(0, Status::NOT_FOUND, b"");
        let mut session = session(transport);

        let mut response = Vec::new();
        assert_eq!(session.delete(b"/nope", &mut response).unwrap(), 404);
        assert_eq!(session.transport().sent().len(), 1);
    }

    #[test]
    fn test_timeout_fails_request() {
        let transport = ScriptedTransport::default().reply(0, Status::CONTINUE, b"").timeout();
        let mut session = session(transport);
        let mut response = Vec::new();
        assert!(matches!(session.post(b"/lights/light1", &mut response), Err(ErrorKind::RequestFailed)));
    }

    #[test]
    fn test_reply_with_wrong_sequence_fails() {
        let transport = ScriptedTransport::default().reply(1, Status::CONTINUE, b"");
        let mut session = session(transport);
        let mut response = Vec::new();
        assert!(matches!(
            session.get(b"/lights/light1", &mut response),
            Err(ErrorKind::SequenceMismatch { expected: 0, received: 1 })
        ));
    }

    #[test]
    fn test_reply_with_other_token_fails() {
        let stray = Header::request(SIZE, Verb::Get, TOKEN + 1, 1).ack(Status::PROCESSING);
        let transport = ScriptedTransport::default().reply(0, Status::CONTINUE, b"").reply_with(stray, b"");
        let mut session = session(transport);
        let mut response = Vec::new();
        assert!(matches!(session.get(b"/lights/light1", &mut response), Err(ErrorKind::WrongToken { .. })));
    }

    #[test]
    fn test_reply_with_other_frame_size_fails() {
        let stray = Header::request(FragmentSize::Bytes32, Verb::Get, TOKEN, 0).ack(Status::PROCESSING);
        let transport = ScriptedTransport::default().reply_with(stray, b"");
        let mut session = session(transport);
        let mut response = Vec::new();
        assert!(matches!(session.get(b"/a", &mut response), Err(ErrorKind::FragmentSizeMismatch)));
    }

    #[test]
    fn test_reflected_request_is_not_a_reply() {
        let reflected = Header::request(SIZE, Verb::Get, TOKEN, 0);
        let transport = ScriptedTransport::default().reply_with(reflected, b"");
        let mut session = session(transport);
        let mut response = Vec::new();
        assert!(matches!(
            session.get(b"/a", &mut response),
            Err(ErrorKind::DecodingError(DecodingErrorKind::MessageType))
        ));
    }

    #[test]
    fn test_response_truncated_to_max_len() {
        let transport = ScriptedTransport::default()
            .reply(0, Status::PROCESSING, b"")
            .reply(1, Status::CONTINUE, b"0123456789")
            .reply(2, Status::OK, b"abc");
        let mut config = Config::default();
        config.max_response_len = 12;
        let mut session =
            Session::new(Arc::new(transport), "127.0.0.1:4677".parse().unwrap(), SIZE, config);

        let mut response = Vec::new();
        assert_eq!(session.get(b"/a", &mut response).unwrap(), 200);
        assert_eq!(response, b"0123456789ab");
    }

    #[test]
    fn test_error_status_while_pulling() {
        let transport = ScriptedTransport::default()
            .reply(0, Status::PROCESSING, b"")
            .reply(1, Status::CONTINUE, b"0123456789")
            .reply(2, Status::ServerError(ServerError::Internal), b"");
        let mut session = session(transport);
        let mut response = Vec::new();
        assert_eq!(session.get(b"/a", &mut response).unwrap(), 500);
        assert_eq!(response, b"0123456789");
    }

    #[test]
    fn test_ping() {
        let ack = Header::request(SIZE, Verb::Ping, TOKEN, 0).ack(Status::PING_ACK);
        let transport = ScriptedTransport::default().reply_with(ack, b"");
        let mut session = session(transport);
        assert_eq!(session.ping().unwrap(), 131);

        let sent = session.transport().sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0.verb(), Some(Verb::Ping));
        assert!(sent[0].1.is_empty());
    }
}
