use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use super::message::{
    self, Incoming, CLIENT_MAX_VERSION, CLIENT_MIN_VERSION, NO_REQUEST,
};
use super::wire::{self, FieldReader, FrameBuffer, API_SIGN};
use super::{GatewayError, HistoricalBarsRequest, HistoricalSource};
use crate::Bar;

/// Where and as whom to connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub host: String,
    pub port: u16,
    pub client_id: i32,
    /// Applies to the handshake and to each request. `None` waits forever.
    pub timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host: String::from("127.0.0.1"),
            port: 4002,
            client_id: 5,
            timeout: Some(Duration::from_secs(120)),
        }
    }
}

impl SessionConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// One live API session with the gateway.
///
/// Requests are strictly sequential; the session holds no state besides the
/// socket, the negotiated server version and the request id counter.
#[derive(Debug)]
pub struct GatewaySession {
    stream: TcpStream,
    frames: FrameBuffer,
    server_version: i32,
    connection_time: String,
    accounts: Option<String>,
    next_req_id: i64,
    timeout: Option<Duration>,
}

impl GatewaySession {
    /// Opens the socket, negotiates the protocol version and starts the API.
    ///
    /// # Errors
    ///
    /// Returns a connection error if the gateway is unreachable, the handshake
    /// is malformed or times out, or the client id is rejected.
    pub async fn connect(config: &SessionConfig) -> Result<Self, GatewayError> {
        let address = config.address();
        let establish = Self::establish(config, &address);

        let session = match config.timeout {
            Some(limit) => tokio::time::timeout(limit, establish).await.map_err(|_| {
                GatewayError::connection(format!(
                    "handshake with {address} did not complete within {} ms",
                    limit.as_millis()
                ))
            })??,
            None => establish.await?,
        };

        tracing::info!(
            address = %address,
            client_id = config.client_id,
            server_version = session.server_version,
            connection_time = %session.connection_time,
            accounts = session.accounts.as_deref().unwrap_or(""),
            "connected to gateway"
        );
        Ok(session)
    }

    async fn establish(config: &SessionConfig, address: &str) -> Result<Self, GatewayError> {
        let stream = TcpStream::connect(address).await.map_err(|error| {
            GatewayError::connection(format!("cannot reach gateway at {address}: {error}"))
        })?;
        if let Err(error) = stream.set_nodelay(true) {
            tracing::debug!(%error, "could not disable Nagle on gateway socket");
        }

        let mut session = Self {
            stream,
            frames: FrameBuffer::new(),
            server_version: 0,
            connection_time: String::new(),
            accounts: None,
            next_req_id: 1,
            timeout: config.timeout,
        };

        session.negotiate_version().await.map_err(handshake_failure)?;
        session.start_api(config.client_id).await?;
        Ok(session)
    }

    async fn negotiate_version(&mut self) -> Result<(), GatewayError> {
        let mut hello = API_SIGN.to_vec();
        hello.extend(wire::frame(
            format!("v{CLIENT_MIN_VERSION}..{CLIENT_MAX_VERSION}").as_bytes(),
        ));
        wire::write_frame(&mut self.stream, &hello).await?;

        let fields = self.frames.read_message(&mut self.stream).await?;
        let mut reader = FieldReader::new(&fields);
        let server_version = reader.next_i32()?;
        if !(CLIENT_MIN_VERSION..=CLIENT_MAX_VERSION).contains(&server_version) {
            return Err(GatewayError::protocol(format!(
                "server version {server_version} outside supported range \
                 {CLIENT_MIN_VERSION}..{CLIENT_MAX_VERSION}"
            )));
        }

        self.server_version = server_version;
        self.connection_time = reader.next_str().unwrap_or_default().to_owned();
        Ok(())
    }

    /// Sends START_API and waits for the first NEXT_VALID_ID, which the
    /// gateway only sends once it has accepted the client id.
    async fn start_api(&mut self, client_id: i32) -> Result<(), GatewayError> {
        let frame = message::encode_start_api(self.server_version, client_id);
        wire::write_frame(&mut self.stream, &frame)
            .await
            .map_err(handshake_failure)?;

        loop {
            let fields = self
                .frames
                .read_message(&mut self.stream)
                .await
                .map_err(handshake_failure)?;

            match message::decode(self.server_version, &fields).map_err(handshake_failure)? {
                Incoming::NextValidId(_) => return Ok(()),
                Incoming::ManagedAccounts(accounts) => {
                    tracing::debug!(%accounts, "gateway reported managed accounts");
                    self.accounts = Some(accounts);
                }
                Incoming::Error(notice) if notice.is_connection_level() => {
                    return Err(GatewayError::connection(format!(
                        "gateway rejected client id {client_id}: {}",
                        notice.message
                    ))
                    .with_code(notice.code));
                }
                Incoming::Error(notice) => {
                    tracing::debug!(code = notice.code, message = %notice.message, "gateway notice");
                }
                other => tracing::trace!(?other, "ignoring message during handshake"),
            }
        }
    }

    pub const fn server_version(&self) -> i32 {
        self.server_version
    }

    pub fn connection_time(&self) -> &str {
        &self.connection_time
    }

    /// Issues one historical request and waits for its bars.
    ///
    /// # Errors
    ///
    /// - request error when the gateway rejects the request
    /// - timeout when no reply arrives in time; the request is cancelled
    /// - connection error when the session drops
    pub async fn historical_bars(
        &mut self,
        req: &HistoricalBarsRequest,
    ) -> Result<Vec<Bar>, GatewayError> {
        let req_id = self.next_req_id;
        self.next_req_id += 1;

        tracing::trace!(req_id, end = %req.end, "requesting historical bars");
        let frame = message::encode_historical_request(self.server_version, req_id, req);
        wire::write_frame(&mut self.stream, &frame).await?;

        let Some(limit) = self.timeout else {
            return self.collect_bars(req_id).await;
        };

        let waited = tokio::time::timeout(limit, self.collect_bars(req_id)).await;
        match waited {
            Ok(result) => result,
            Err(_) => {
                self.cancel(req_id).await;
                Err(GatewayError::timeout(format!(
                    "no historical data for request {req_id} within {} ms",
                    limit.as_millis()
                )))
            }
        }
    }

    async fn collect_bars(&mut self, req_id: i64) -> Result<Vec<Bar>, GatewayError> {
        loop {
            let fields = self.frames.read_message(&mut self.stream).await?;
            match message::decode(self.server_version, &fields)? {
                Incoming::HistoricalData { req_id: id, bars } if id == req_id => return Ok(bars),
                Incoming::Error(notice) if notice.is_informational() => {
                    tracing::debug!(
                        req_id = notice.req_id,
                        code = notice.code,
                        message = %notice.message,
                        "gateway notice"
                    );
                }
                Incoming::Error(notice) if notice.req_id == req_id => {
                    if notice.is_no_data() {
                        tracing::debug!(req_id, message = %notice.message, "no data in window");
                        return Ok(Vec::new());
                    }
                    return Err(notice.into_error());
                }
                Incoming::Error(notice) if notice.is_connection_level() => {
                    return Err(notice.into_error());
                }
                Incoming::Error(notice) if notice.req_id == NO_REQUEST => {
                    tracing::debug!(code = notice.code, message = %notice.message, "gateway notice");
                }
                Incoming::Error(notice) => {
                    tracing::debug!(
                        req_id = notice.req_id,
                        code = notice.code,
                        "ignoring error for a superseded request"
                    );
                }
                other => tracing::trace!(?other, "ignoring unrelated message"),
            }
        }
    }

    async fn cancel(&mut self, req_id: i64) {
        let frame = message::encode_cancel_historical(req_id);
        if let Err(error) = wire::write_frame(&mut self.stream, &frame).await {
            tracing::warn!(req_id, %error, "failed to cancel timed-out request");
        }
    }

    /// Closes the socket. Failures are logged; the session is gone either way.
    pub async fn disconnect(mut self) {
        if let Err(error) = self.stream.shutdown().await {
            tracing::debug!(%error, "gateway socket shutdown reported an error");
        }
        tracing::info!("disconnected from gateway");
    }
}

impl HistoricalSource for GatewaySession {
    fn fetch_bars<'a>(
        &'a mut self,
        req: &'a HistoricalBarsRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Bar>, GatewayError>> + Send + 'a>> {
        Box::pin(self.historical_bars(req))
    }
}

fn handshake_failure(error: GatewayError) -> GatewayError {
    match error.kind() {
        super::GatewayErrorKind::Connection => error,
        _ => GatewayError::connection(format!("gateway handshake failed: {}", error.message())),
    }
}
