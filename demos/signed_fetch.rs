//! Fetches three pages of a creator's uploads through the worker pool, signing every request,
//! then prints the newest items with relative timestamps. A local mock server stands in for the
//! platform.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use parking_lot::Mutex;
use serde::Deserialize;
use url::Url;
// self
use wbi_pool::{
	feed::{FeedItem, FeedList, RelativeTime},
	fetch::{FetchTask, PlatformTransport, ReqwestTransport},
	obs::LogConfig,
	pool::WorkerPool,
	sign::{KeyPair, RequestSigner, SIGNATURE_PARAM, params},
};

#[derive(Deserialize)]
struct Page {
	data: PageData,
}

#[derive(Deserialize)]
struct PageData {
	items: Vec<FeedItem>,
}

fn main() -> Result<()> {
	color_eyre::install()?;
	LogConfig::from_env().install()?;

	let server = MockServer::start();
	let now = time::OffsetDateTime::now_utc().unix_timestamp();
	let search_mock = server.mock(|when, then| {
		when.method(GET).path("/x/space/wbi/arc/search").query_param_exists(SIGNATURE_PARAM);
		then.status(200).header("content-type", "application/json").body(format!(
			"{{\"code\":0,\"data\":{{\"items\":[\
			{{\"id\":\"BV1xx411c7mD\",\"title\":\"Launch day\",\"author\":\"demo\",\"posted_at\":{}}},\
			{{\"id\":\"BV1yy411c7mE\",\"title\":\"Patch notes\",\"author\":\"demo\",\"posted_at\":{}}}]}}}}",
			now - 90,
			now - 86_400 * 3,
		));
	});
	let endpoint = Url::parse(&server.url("/x/space/wbi/arc/search"))?;
	let keys = KeyPair::new("7cd084941338484aae1ad9425b84077c", "4932caff0ff746eab6f01bf08b70ac45")?;
	let signer = Arc::new(RequestSigner::new(keys));
	let transport: Arc<dyn PlatformTransport> = Arc::new(ReqwestTransport::default());
	let collected = Arc::new(Mutex::new(FeedList::default()));
	let pool = WorkerPool::new(4);

	pool.start()?;

	for page in 1..=3 {
		let collected = collected.clone();
		let task = FetchTask::new(
			endpoint.clone(),
			params([("mid", "12345".to_owned()), ("pn", page.to_string()), ("ps", "2".to_owned())]),
			signer.clone(),
			transport.clone(),
		)
		.on_response(move |response| {
			collected.lock().extend(response.json::<Page>()?.data.items);

			Ok(())
		});

		pool.submit(task)?;
	}

	pool.wait_with_callback(|| println!("All pages fetched."));
	pool.stop();

	let formatter = RelativeTime::new();
	let newest = collected.lock().clone().sort_by_newest().limit(3);

	for item in newest.iter() {
		println!("{} {} ({})", item.id, item.title, formatter.format(item.posted_at));
	}

	search_mock.assert_calls(3);

	Ok(())
}
