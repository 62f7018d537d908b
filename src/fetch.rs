//! Signed platform requests packaged as pool tasks.
//!
//! [`PlatformTransport`] is the only dependency on an HTTP stack. [`FetchTask`] signs its
//! parameters when a worker picks it up (so the timestamp is fresh), performs one GET, and hands
//! the raw response to a caller-supplied handler. Decoding the platform's payload is left to that
//! handler; [`PlatformResponse::json`] helps with path-aware errors.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	error::TransportError,
	sign::{Params, RequestSigner},
	task::{Task, TaskResult},
};

/// Blocking transport able to issue a GET request.
///
/// Implementations must be `Send + Sync + 'static` so one instance can be shared by every
/// worker behind an [`Arc`].
pub trait PlatformTransport
where
	Self: 'static + Send + Sync,
{
	/// Performs a GET against `url` and returns the status plus body, whatever the status.
	///
	/// Only failures to obtain a response at all are errors, usually [`TransportError::Network`].
	fn get(&self, url: &Url) -> Result<PlatformResponse>;
}

/// Status and body of a platform response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlatformResponse {
	/// HTTP status code.
	pub status: u16,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl PlatformResponse {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Decodes the body as JSON, reporting the failing field path on error.
	pub fn json<T>(&self) -> Result<T, TransportError>
	where
		T: DeserializeOwned,
	{
		let mut de = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut de).map_err(|source| TransportError::Decode { source })
	}
}

/// Callback receiving a successful response on the worker thread.
pub type ResponseHandler = Box<dyn FnOnce(PlatformResponse) -> TaskResult + Send>;

/// One signed GET request, runnable on a [`WorkerPool`](crate::pool::WorkerPool).
pub struct FetchTask<T>
where
	T: ?Sized,
{
	endpoint: Url,
	params: Params,
	signer: Arc<RequestSigner>,
	transport: Arc<T>,
	handler: ResponseHandler,
}
impl<T> FetchTask<T>
where
	T: ?Sized + PlatformTransport,
{
	/// Creates a task for `endpoint`.
	///
	/// Query pairs already present on `endpoint` are moved into the signed parameter set;
	/// explicit `params` win on conflicts. The default handler discards the body.
	pub fn new(
		mut endpoint: Url,
		params: Params,
		signer: Arc<RequestSigner>,
		transport: Arc<T>,
	) -> Self {
		let mut merged: Params = endpoint.query_pairs().into_owned().collect();

		merged.extend(params);
		endpoint.set_query(None);

		Self { endpoint, params: merged, signer, transport, handler: Box::new(|_| Ok(())) }
	}

	/// Sets the callback that receives the successful response.
	pub fn on_response<F>(mut self, handler: F) -> Self
	where
		F: 'static + Send + FnOnce(PlatformResponse) -> TaskResult,
	{
		self.handler = Box::new(handler);

		self
	}

	/// Returns the unsigned parameters this task will sign.
	pub fn params(&self) -> &Params {
		&self.params
	}

	/// Signs the parameters as of `at` and returns the full request URL.
	pub fn signed_url_at(&self, at: OffsetDateTime) -> Url {
		let mut url = self.endpoint.clone();

		self.signer.sign_at(self.params.clone(), at).apply_to(&mut url);

		url
	}
}
impl<T> Task for FetchTask<T>
where
	T: ?Sized + PlatformTransport,
{
	fn execute(self: Box<Self>) -> TaskResult {
		let url = self.signed_url_at(OffsetDateTime::now_utc());
		let Self { transport, handler, .. } = *self;
		let response = transport.get(&url)?;

		if !response.is_success() {
			return Err(TransportError::Status { status: response.status }.into());
		}

		handler(response)
	}
}
impl<T> Debug for FetchTask<T>
where
	T: ?Sized,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("FetchTask")
			.field("endpoint", &self.endpoint.as_str())
			.field("params", &self.params)
			.finish()
	}
}

/// Blocking reqwest client implementing [`PlatformTransport`].
///
/// Most platforms reject requests without a browser-like `User-Agent`; configure one on the
/// wrapped client via [`ReqwestTransport::with_client`].
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub reqwest::blocking::Client);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing blocking client.
	pub fn with_client(client: reqwest::blocking::Client) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl PlatformTransport for ReqwestTransport {
	fn get(&self, url: &Url) -> Result<PlatformResponse> {
		let response = self.0.get(url.clone()).send()?;
		let status = response.status().as_u16();
		let body = response.bytes()?.to_vec();

		Ok(PlatformResponse { status, body })
	}
}
