use reqwest::{
    header::{ETAG, IF_MATCH},
    Client, Response, StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};

use super::{
    DocumentStore, FriendsList, InvitationsList, ManagerList, Result, StoreError, Uid, UserRecord,
    Versioned,
};
use async_trait::async_trait;

/// A document store backed by a path-addressed REST API.
///
/// Documents live at `{base}/{collection}/{id}`. Versioned reads take the
/// revision from the `ETag` header, and versioned writes send it back via
/// `If-Match`, so a concurrent writer surfaces as `412 Precondition Failed`.
pub struct RestStore {
    client: Client,
    base_url: String,
}

impl RestStore {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn doc_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.base_url, collection, id)
    }

    async fn get_doc<T>(&self, collection: &'static str, id: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self
            .client
            .get(self.doc_url(collection, id))
            .send()
            .await
            .map_err(internal)?;

        check_status(response, collection, id)?
            .json()
            .await
            .map_err(internal)
    }

    async fn get_versioned<T>(&self, collection: &'static str, id: &str) -> Result<Versioned<T>>
    where
        T: DeserializeOwned,
    {
        let response = self
            .client
            .get(self.doc_url(collection, id))
            .send()
            .await
            .map_err(internal)?;

        let response = check_status(response, collection, id)?;

        let revision = response
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
            .ok_or_else(|| {
                StoreError::Internal(format!("{collection}/{id} response had no ETag").into())
            })?;

        let doc = response.json().await.map_err(internal)?;

        Ok(Versioned { doc, revision })
    }

    async fn put_doc<T>(
        &self,
        collection: &'static str,
        id: &str,
        doc: &T,
        revision: &str,
    ) -> Result<()>
    where
        T: Serialize,
    {
        let response = self
            .client
            .put(self.doc_url(collection, id))
            .header(IF_MATCH, revision)
            .json(doc)
            .send()
            .await
            .map_err(internal)?;

        check_status(response, collection, id).map(|_| ())
    }

    async fn delete_doc(&self, collection: &'static str, id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.doc_url(collection, id))
            .send()
            .await
            .map_err(internal)?;

        check_status(response, collection, id).map(|_| ())
    }
}

fn internal(error: reqwest::Error) -> StoreError {
    StoreError::Internal(Box::new(error))
}

fn check_status(response: Response, collection: &'static str, id: &str) -> Result<Response> {
    match response.status() {
        status if status.is_success() => Ok(response),
        StatusCode::NOT_FOUND => Err(StoreError::NotFound {
            collection,
            id: id.to_string(),
        }),
        StatusCode::PRECONDITION_FAILED => Err(StoreError::Conflict {
            collection,
            id: id.to_string(),
        }),
        status => Err(StoreError::Internal(
            format!("{collection}/{id} request failed with status {status}").into(),
        )),
    }
}

#[async_trait]
impl DocumentStore for RestStore {
    async fn user_by_id(&self, uid: &str) -> Result<UserRecord> {
        self.get_doc("users", uid).await
    }

    async fn users_by_display_name(&self, display_name: &str) -> Result<Vec<UserRecord>> {
        let response = self
            .client
            .get(format!("{}/users", self.base_url))
            .query(&[("displayName", display_name)])
            .send()
            .await
            .map_err(internal)?;

        check_status(response, "users", display_name)?
            .json()
            .await
            .map_err(internal)
    }

    async fn list_user_ids(&self) -> Result<Vec<Uid>> {
        let response = self
            .client
            .get(format!("{}/users", self.base_url))
            .send()
            .await
            .map_err(internal)?;

        let users: Vec<UserRecord> = check_status(response, "users", "*")?
            .json()
            .await
            .map_err(internal)?;

        Ok(users.into_iter().map(|u| u.uid).collect())
    }

    async fn delete_user(&self, uid: &str) -> Result<()> {
        self.delete_doc("users", uid).await
    }

    async fn friends_by_id(&self, uid: &str) -> Result<FriendsList> {
        self.get_doc("friends", uid).await
    }

    async fn delete_friends(&self, uid: &str) -> Result<()> {
        self.delete_doc("friends", uid).await
    }

    async fn invitations_by_id(&self, uid: &str) -> Result<Versioned<InvitationsList>> {
        self.get_versioned("invitations", uid).await
    }

    async fn update_invitations(
        &self,
        uid: &str,
        list: &InvitationsList,
        revision: &str,
    ) -> Result<()> {
        self.put_doc("invitations", uid, list, revision).await
    }

    async fn delete_invitations(&self, uid: &str) -> Result<()> {
        self.delete_doc("invitations", uid).await
    }

    async fn managers_by_id(&self, uid: &str) -> Result<Versioned<ManagerList>> {
        self.get_versioned("managers", uid).await
    }

    async fn update_managers(&self, uid: &str, list: &ManagerList, revision: &str) -> Result<()> {
        self.put_doc("managers", uid, list, revision).await
    }

    async fn delete_managers(&self, uid: &str) -> Result<()> {
        self.delete_doc("managers", uid).await
    }
}
