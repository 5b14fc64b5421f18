//! Workflow manager REST backend.

use std::{marker::PhantomData, sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, trace};

use crate::{
    HttpConfig, PipeforgeError, Result,
    backend::{Backend, BackendInit, Collection, MarkupSource, ResourceIden},
    model::{ActionModel, AlgorithmModel, MarkupPage, MarkupQuery, PipelineModel, TaskModel},
};

const MARKUP_PATH: &str = "markup/get-markup-results-filtered";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Read,
    Write,
    Delete,
}

/// Turns a failure status into the matching error kind.
///
/// The workflow manager reports "still in use" on delete as a server error,
/// so any failure of a delete other than 404 is a conflict.
async fn check_status(
    res: Response,
    op: Op,
    what: &str,
) -> Result<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let body = res.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        format!("{} failed with status {}", what, status)
    } else {
        body
    };
    debug!("{} -> {}: {}", what, status, message);

    let err = match status {
        StatusCode::NOT_FOUND => PipeforgeError::NotFound(message),
        StatusCode::CONFLICT => PipeforgeError::Conflict(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => PipeforgeError::Validation(message),
        _ if op == Op::Delete => PipeforgeError::Conflict(message),
        _ => PipeforgeError::Network(format!("{} failed with status {}: {}", what, status, message)),
    };
    Err(err)
}

/// REST backend talking to a workflow manager instance.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_millis(config.timeout_ms)).build()?;
        Self::with_client(client, &config.base_url)
    }

    pub fn with_client(
        client: Client,
        base_url: &str,
    ) -> Result<Self> {
        // relative joins need the trailing slash
        let base = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&base).map_err(|err| PipeforgeError::Config(format!("invalid base url '{}': {}", base_url, err)))?;

        Ok(Self {
            client,
            base_url,
        })
    }

    fn collection<T: ResourceIden>(&self) -> HttpCollection<T> {
        HttpCollection {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            _item: PhantomData,
        }
    }

    pub fn algorithms(&self) -> Arc<dyn Collection<Item = AlgorithmModel>> {
        Arc::new(self.collection::<AlgorithmModel>())
    }

    pub fn actions(&self) -> Arc<dyn Collection<Item = ActionModel>> {
        Arc::new(self.collection::<ActionModel>())
    }

    pub fn tasks(&self) -> Arc<dyn Collection<Item = TaskModel>> {
        Arc::new(self.collection::<TaskModel>())
    }

    pub fn pipelines(&self) -> Arc<dyn Collection<Item = PipelineModel>> {
        Arc::new(self.collection::<PipelineModel>())
    }

    pub fn markup(&self) -> Arc<dyn MarkupSource> {
        Arc::new(self.clone())
    }
}

impl BackendInit for HttpBackend {
    fn init(
        &self,
        backend: &Backend,
    ) {
        backend.register(self.algorithms());
        backend.register(self.actions());
        backend.register(self.tasks());
        backend.register(self.pipelines());
        backend.register_markup(self.markup());
    }
}

#[async_trait]
impl MarkupSource for HttpBackend {
    async fn markup_results(
        &self,
        query: &MarkupQuery,
    ) -> Result<MarkupPage> {
        trace!("http::markup_results({:?})", query);
        let url = self.base_url.join(MARKUP_PATH).map_err(|err| PipeforgeError::Config(err.to_string()))?;
        let res = self.client.get(url).query(&query.params()).send().await?;
        let res = check_status(res, Op::Read, "markup results").await?;
        Ok(res.json::<MarkupPage>().await?)
    }
}

struct HttpCollection<T> {
    client: Client,
    base_url: Url,
    _item: PhantomData<fn() -> T>,
}

impl<T: ResourceIden> HttpCollection<T> {
    fn url(
        &self,
        name: Option<&str>,
    ) -> Result<Url> {
        let mut url = self.base_url.join(T::iden().as_ref()).map_err(|err| PipeforgeError::Config(err.to_string()))?;
        if let Some(name) = name {
            url.path_segments_mut().map_err(|_| PipeforgeError::Config(format!("base url {} cannot have path segments", self.base_url)))?.push(name);
        }
        Ok(url)
    }
}

#[async_trait]
impl<T> Collection for HttpCollection<T>
where
    T: ResourceIden + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    type Item = T;

    async fn list(&self) -> Result<Vec<T>> {
        let resource = T::iden();
        trace!("http::list({})", resource.as_ref());
        let res = self.client.get(self.url(None)?).send().await?;
        let res = check_status(res, Op::Read, resource.as_ref()).await?;
        Ok(res.json::<Vec<T>>().await?)
    }

    async fn find(
        &self,
        name: &str,
    ) -> Result<T> {
        let resource = T::iden();
        trace!("http::find({}, {})", resource.as_ref(), name);
        let res = self.client.get(self.url(Some(name))?).send().await?;
        let res = match check_status(res, Op::Read, resource.as_ref()).await {
            Err(PipeforgeError::NotFound(_)) => {
                return Err(PipeforgeError::NotFound(format!("{} not found: {}.", resource.kind(), name)));
            }
            other => other?,
        };
        Ok(res.json::<T>().await?)
    }

    async fn create(
        &self,
        item: &T,
    ) -> Result<()> {
        let resource = T::iden();
        trace!("http::create({})", resource.as_ref());
        let res = self.client.post(self.url(None)?).json(item).send().await?;
        check_status(res, Op::Write, resource.as_ref()).await?;
        Ok(())
    }

    async fn delete(
        &self,
        name: &str,
    ) -> Result<()> {
        let resource = T::iden();
        trace!("http::delete({}, {})", resource.as_ref(), name);
        let res = self.client.delete(self.url(None)?).query(&[("name", name)]).send().await?;
        check_status(res, Op::Delete, resource.as_ref()).await?;
        Ok(())
    }
}
