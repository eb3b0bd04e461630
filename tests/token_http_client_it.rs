// std
use std::{
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	pin::Pin,
	sync::Arc,
};
// crates.io
use parking_lot::Mutex;
// self
use oauth2_gitea::{
	error::{ConfigError, Error, TokenEndpointError, TransportError},
	flows::{Broker, CallbackParams},
	http::{ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
	oauth::{
		TransportErrorMapper,
		oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse},
	},
	provider::{GiteaOptions, GiteaStrategy, ProviderStrategy},
};

#[derive(Debug)]
enum FakeTransportError {
	Throttled,
}
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Throttled => write!(f, "Transport throttled."),
		}
	}
}
impl StdError for FakeTransportError {}

#[derive(Clone, Copy)]
struct FakeHttpClient {
	status: u16,
}
impl FakeHttpClient {
	fn throttled(status: u16) -> Self {
		Self { status }
	}
}
impl TokenHttpClient for FakeHttpClient {
	type Handle = FakeHttpHandle;
	type TransportError = FakeTransportError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		FakeHttpHandle { slot, status: self.status }
	}
}

struct FakeHttpHandle {
	slot: ResponseMetadataSlot,
	status: u16,
}
impl<'a> AsyncHttpClient<'a> for FakeHttpHandle {
	type Error = HttpClientError<FakeTransportError>;
	type Future = Pin<
		Box<dyn std::future::Future<Output = Result<HttpResponse, Self::Error>> + 'a + Send + Sync>,
	>;

	fn call(&'a self, _request: HttpRequest) -> Self::Future {
		let slot = self.slot.clone();
		let status = self.status;

		Box::pin(async move {
			assert!(
				slot.take().is_none(),
				"ResponseMetadataSlot must be clear before dispatching a request."
			);
			slot.store(ResponseMetadata {
				status: Some(status),
				body: Some(b"slow down".to_vec()),
			});

			Err(HttpClientError::Reqwest(Box::new(FakeTransportError::Throttled)))
		})
	}
}

#[derive(Clone, Default)]
struct RecordingTransportErrorMapper {
	metadata: Arc<Mutex<Vec<Option<ResponseMetadata>>>>,
}
impl RecordingTransportErrorMapper {
	fn recorded_metadata(&self) -> Vec<Option<ResponseMetadata>> {
		self.metadata.lock().clone()
	}
}
impl TransportErrorMapper<FakeTransportError> for RecordingTransportErrorMapper {
	fn map_transport_error(
		&self,
		strategy: &dyn ProviderStrategy,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<FakeTransportError>,
	) -> Error {
		let status = meta.and_then(|value| value.status);

		self.metadata.lock().push(meta.cloned());

		assert_eq!(strategy.descriptor().id.as_ref(), "gitea");

		match err {
			HttpClientError::Reqwest(inner) => TokenEndpointError::Unexpected {
				message: format!("Fake transport error: {inner}"),
				status,
			}
			.into(),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			other => TransportError::Other(format!("Unhandled HTTP client error variant: {other:?}"))
				.into(),
		}
	}
}

fn build_broker(
	status: u16,
	mapper: Arc<RecordingTransportErrorMapper>,
) -> Broker<FakeHttpClient, RecordingTransportErrorMapper> {
	let options = GiteaOptions::new(
		"throttled-client",
		"throttled-secret",
		"https://app.example.com/callback",
		"https://git.example.com",
	);
	let http_client = Arc::new(FakeHttpClient::throttled(status));
	let strategy: Arc<dyn ProviderStrategy> = Arc::new(
		GiteaStrategy::<FakeHttpClient>::with_http_client(&options, http_client.clone()),
	);

	Broker::with_http_client(
		strategy,
		options.client_id.clone(),
		options.callback_url.clone(),
		http_client,
		mapper,
	)
	.with_client_secret(options.client_secret.expose())
}

async fn authenticate_throttled(
	broker: &Broker<FakeHttpClient, RecordingTransportErrorMapper>,
) -> Error {
	let session = broker.start_authorization().expect("Authorization should start successfully.");
	let callback = CallbackParams {
		code: Some("throttled-code".into()),
		state: Some(session.state.clone()),
		..Default::default()
	};

	broker
		.authenticate(&session, &callback)
		.await
		.expect_err("Throttled requests should fail.")
}

#[tokio::test]
async fn fake_token_http_client_surfaces_metadata() {
	let broker = build_broker(429, Arc::default());

	match authenticate_throttled(&broker).await {
		Error::TokenEndpoint(TokenEndpointError::Unexpected { status, message }) => {
			assert_eq!(status, Some(429));
			assert_eq!(message, "Fake transport error: Transport throttled.");
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}
}

#[tokio::test]
async fn fake_mapper_captures_response_metadata() {
	let mapper = Arc::new(RecordingTransportErrorMapper::default());
	let broker = build_broker(503, mapper.clone());
	let _ = authenticate_throttled(&broker).await;
	let observed = mapper.recorded_metadata();

	assert_eq!(observed.len(), 1, "Mapper must record a single request.");

	let meta = observed
		.first()
		.and_then(|value| value.clone())
		.expect("Response metadata should be recorded exactly once.");

	assert_eq!(meta.status, Some(503));
	assert_eq!(meta.body.as_deref(), Some(&b"slow down"[..]));
}
