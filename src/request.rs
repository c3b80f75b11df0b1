use std::time::Duration;

use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, USER_AGENT},
};

pub fn new(timeout: Duration) -> anyhow::Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static("artfetch/0.1"));
    Ok(Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()?)
}
