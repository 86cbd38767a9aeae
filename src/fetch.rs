//! Blocking HTTP fetch primitive shared by every client module.
//!
//! Response caching (and its TTL) is a deployment concern layered outside
//! this crate; callers never observe whether a body came from cache.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;

use crate::error::{Result, TdError};

const USER_AGENT: &str = concat!("chess-club-td/", env!("CARGO_PKG_VERSION"));
const TIMEOUT_SECS: u64 = 30;

pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()?;
        Ok(Self { client })
    }

    /// GET a URL and return the body. Non-2xx statuses are errors.
    pub fn get_text(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(TdError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text()?)
    }

    /// GET a URL and decode the JSON body.
    pub fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        Ok(serde_json::from_str(&self.get_text(url)?)?)
    }
}
