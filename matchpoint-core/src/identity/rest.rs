use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{IdentityDirectory, IdentityError, IdentityPage, Result, PAGE_SIZE};
use crate::store::Uid;

/// An identity directory backed by a REST API.
///
/// Listing follows `GET {base}/accounts?pageSize=N&pageToken=T`, bulk deletion
/// goes through `POST {base}/accounts:batchDelete`.
pub struct RestDirectory {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    uids: Vec<Uid>,
    next_page_token: Option<String>,
}

#[derive(Debug, Serialize)]
struct BatchDeleteRequest<'a> {
    uids: &'a [Uid],
}

impl RestDirectory {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

fn internal(error: reqwest::Error) -> IdentityError {
    IdentityError::Internal(Box::new(error))
}

#[async_trait]
impl IdentityDirectory for RestDirectory {
    async fn list_page(&self, page_token: Option<&str>) -> Result<IdentityPage> {
        let mut request = self
            .client
            .get(format!("{}/accounts", self.base_url))
            .query(&[("pageSize", PAGE_SIZE.to_string())]);

        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response: ListResponse = request
            .send()
            .await
            .map_err(internal)?
            .error_for_status()
            .map_err(internal)?
            .json()
            .await
            .map_err(internal)?;

        Ok(IdentityPage {
            uids: response.uids,
            next_token: response.next_page_token,
        })
    }

    async fn delete_users(&self, uids: &[Uid]) -> Result<()> {
        self.client
            .post(format!("{}/accounts:batchDelete", self.base_url))
            .json(&BatchDeleteRequest { uids })
            .send()
            .await
            .map_err(internal)?
            .error_for_status()
            .map_err(internal)?;

        Ok(())
    }
}
