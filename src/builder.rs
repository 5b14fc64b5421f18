use std::sync::Arc;

use crate::{Backend, Config, Editor, Result};

#[derive(Default)]
pub struct EditorBuilder {
    config: Config,
    backend: Option<Arc<Backend>>,
}

impl EditorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(
        mut self,
        config: Config,
    ) -> Self {
        self.config = config;
        self
    }

    /// Uses `backend` instead of the one the configuration selects.
    pub fn backend(
        mut self,
        backend: Arc<Backend>,
    ) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Builds the editor. Its catalogs are empty until `reload` is called.
    pub fn build(&self) -> Result<Editor> {
        let backend = match &self.backend {
            Some(backend) => backend.clone(),
            None => Arc::new(Backend::from_config(&self.config)?),
        };
        Editor::new(&backend, self.config.algorithm_cache_capacity)
    }
}
