// Typed endpoint calls against the snip server.
// Pure boundary shim: translation between HTTP and the cache's contract,
// no business logic.

use crate::error::{Result, SnipError};
use crate::state::pager::PageSource;

use super::client::ApiClient;
use super::types::{Ad, AdRequest, AdSummary, EditLinkRequest, Link, NewLinkRequest, ServerConfig};

impl ApiClient {
    /// Fetch one page of links, newest-first, continuing after the given
    /// shortlink. The server sends the window oldest-first, so the batch is
    /// reversed here before anyone else sees it.
    pub async fn fetch_links(&self, page_size: usize, after: Option<&str>) -> Result<Vec<Link>> {
        let mut params = vec![("page_size", page_size.to_string())];
        if let Some(key) = after {
            params.push(("page_after", key.to_string()));
        }
        let response = self.get_with_params("api/all", &params).await?;
        let mut batch: Vec<Link> = response.json().await.map_err(SnipError::Api)?;
        batch.reverse();
        Ok(batch)
    }

    /// Fetch one page of ads, same contract as [`fetch_links`].
    ///
    /// [`fetch_links`]: ApiClient::fetch_links
    pub async fn fetch_ads(&self, page_size: usize, after: Option<i64>) -> Result<Vec<Ad>> {
        let mut params = vec![("page_size", page_size.to_string())];
        if let Some(id) = after {
            params.push(("page_after", id.to_string()));
        }
        let response = self.get_with_params("api/ads", &params).await?;
        let mut batch: Vec<Ad> = response.json().await.map_err(SnipError::Api)?;
        batch.reverse();
        Ok(batch)
    }

    /// Create a link. The endpoint answers with the bare shortlink, so the
    /// stored record is echoed back by pulling the top of the collection.
    pub async fn create_link(&self, payload: &NewLinkRequest) -> Result<Link> {
        let response = self.post_json("api/new", payload).await?;
        let _shortlink = response.text().await.map_err(SnipError::Api)?;
        self.fetch_links(1, None)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| SnipError::Other("created link missing from server listing".into()))
    }

    /// Edit a link in place. The response body carries nothing of interest;
    /// the caller patches its cache with the fields it sent.
    pub async fn edit_link(&self, payload: &EditLinkRequest) -> Result<()> {
        self.put_json("api/edit", payload).await.map(|_| ())
    }

    pub async fn delete_link(&self, shortlink: &str) -> Result<()> {
        self.delete(&format!("api/del/{shortlink}")).await.map(|_| ())
    }

    /// Create an ad; the server echoes the stored record including its
    /// assigned id.
    pub async fn create_ad(&self, payload: &AdRequest) -> Result<Ad> {
        let response = self.post_json("api/ads", payload).await?;
        response.json().await.map_err(SnipError::Api)
    }

    pub async fn update_ad(&self, id: i64, payload: &AdRequest) -> Result<Ad> {
        let response = self.put_json(&format!("api/ads/{id}"), payload).await?;
        response.json().await.map_err(SnipError::Api)
    }

    pub async fn delete_ad(&self, id: i64) -> Result<()> {
        self.delete(&format!("api/ads/{id}")).await.map(|_| ())
    }

    /// The selectable ads projection, refetched in full every time.
    pub async fn fetch_selectable_ads(&self) -> Result<Vec<AdSummary>> {
        let response = self.get("api/ads/selectable").await?;
        response.json().await.map_err(SnipError::Api)
    }

    pub async fn fetch_config(&self) -> Result<ServerConfig> {
        let response = self.get("api/getconfig").await?;
        response.json().await.map_err(SnipError::Api)
    }

    /// Current role for this session: "admin", "public", or "nobody".
    pub async fn whoami(&self) -> Result<String> {
        let response = self.get("api/whoami").await?;
        response.text().await.map_err(SnipError::Api)
    }
}

impl PageSource<Link> for ApiClient {
    async fn fetch_page(&self, page_size: usize, after: Option<&String>) -> Result<Vec<Link>> {
        self.fetch_links(page_size, after.map(String::as_str)).await
    }
}

impl PageSource<Ad> for ApiClient {
    async fn fetch_page(&self, page_size: usize, after: Option<&i64>) -> Result<Vec<Ad>> {
        self.fetch_ads(page_size, after.copied()).await
    }
}
