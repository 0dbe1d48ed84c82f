//! CRUD over one REST collection.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::transport::RequestDescriptor;

/// List/get/create/update/delete for the collection at `base`.
///
/// `M` is the model returned, `C` the create payload, `U` the partial update.
pub struct ResourceService<M, C, U> {
    client: ApiClient,
    base: &'static str,
    _types: PhantomData<fn() -> (M, C, U)>,
}

impl<M, C, U> Clone for ResourceService<M, C, U> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            base: self.base,
            _types: PhantomData,
        }
    }
}

impl<M, C, U> ResourceService<M, C, U>
where
    M: DeserializeOwned,
    C: Serialize,
    U: Serialize,
{
    pub fn new(client: ApiClient, base: &'static str) -> Self {
        Self {
            client,
            base,
            _types: PhantomData,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn base(&self) -> &'static str {
        self.base
    }

    pub(crate) fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.base, id)
    }

    pub async fn list(&self) -> ApiResult<Vec<M>> {
        self.client.get(self.base).await
    }

    pub async fn get(&self, id: &str) -> ApiResult<M> {
        self.client.get(&self.item_path(id)).await
    }

    pub async fn create(&self, input: &C) -> ApiResult<M> {
        self.client
            .send_json(&RequestDescriptor::post(self.base), input)
            .await
    }

    /// Partial update (`PATCH`).
    pub async fn update(&self, id: &str, input: &U) -> ApiResult<M> {
        self.client
            .send_json(&RequestDescriptor::patch(self.item_path(id)), input)
            .await
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.client
            .fetch(&RequestDescriptor::delete(self.item_path(id)))
            .await
    }
}
