use serde::{Deserialize, Serialize};

/// A rendered markup output of a job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkupResult {
    pub id: i64,
    pub job_id: i64,
    #[serde(default)]
    pub media_id: i64,
    #[serde(default)]
    pub action_history: Option<String>,
    #[serde(default)]
    pub output_path: Option<String>,
    #[serde(default)]
    pub source_medium: Option<String>,
    #[serde(default)]
    pub is_image: bool,
    #[serde(default)]
    pub file_exists: bool,
}

/// One page of markup results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkupPage {
    /// Number of results before the search filter.
    pub records_total: usize,
    /// Number of results after the search filter, across all pages.
    pub records_filtered: usize,
    /// Results in the requested page.
    #[serde(default)]
    pub media: Vec<MarkupResult>,
}

/// Parameters of a markup results request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupQuery {
    pub job_id: Option<i64>,
    /// 1-based page number
    pub page: usize,
    pub page_len: usize,
    pub search: Option<String>,
}

impl Default for MarkupQuery {
    fn default() -> Self {
        Self {
            job_id: None,
            page: 1,
            page_len: 10,
            search: None,
        }
    }
}

impl MarkupQuery {
    pub fn with_job(job_id: i64) -> Self {
        Self {
            job_id: Some(job_id),
            ..Default::default()
        }
    }

    pub fn page(
        mut self,
        page: usize,
        page_len: usize,
    ) -> Self {
        self.page = page;
        self.page_len = page_len;
        self
    }

    pub fn search(
        mut self,
        search: impl Into<String>,
    ) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Query string pairs as the workflow manager expects them.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(job_id) = self.job_id {
            params.push(("jobId", job_id.to_string()));
        }
        params.push(("page", self.page.to_string()));
        params.push(("pageLen", self.page_len.to_string()));
        if let Some(search) = &self.search {
            params.push(("search", search.clone()));
        }
        params
    }
}
