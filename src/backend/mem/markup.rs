use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    Result,
    backend::{
        MarkupSource,
        mem::{MemData, read},
    },
    model::{MarkupPage, MarkupQuery, MarkupResult},
};

pub(super) struct MemMarkup {
    data: Arc<MemData>,
}

impl MemMarkup {
    pub(super) fn new(data: Arc<MemData>) -> Self {
        Self {
            data,
        }
    }
}

/// Case-insensitive match on job id, source medium and action history.
fn matches_search(
    result: &MarkupResult,
    search: &str,
) -> bool {
    let contains = |field: &Option<String>| field.as_deref().map(|v| v.to_lowercase().contains(search)).unwrap_or(false);
    result.job_id.to_string().contains(search) || contains(&result.source_medium) || contains(&result.action_history)
}

#[async_trait]
impl MarkupSource for MemMarkup {
    async fn markup_results(
        &self,
        query: &MarkupQuery,
    ) -> Result<MarkupPage> {
        let rows = read(&self.data.markup);

        // newest first
        let for_job: Vec<&MarkupResult> = rows.iter().rev().filter(|r| query.job_id.is_none_or(|job| r.job_id == job)).collect();
        let records_total = for_job.len();

        let search = query.search.as_deref().map(|s| s.trim().to_lowercase()).unwrap_or_default();
        let filtered: Vec<&MarkupResult> = for_job.into_iter().filter(|r| search.is_empty() || matches_search(r, &search)).collect();
        let records_filtered = filtered.len();

        let start = query.page.max(1).saturating_sub(1).saturating_mul(query.page_len).min(records_filtered);
        let end = start.saturating_add(query.page_len).min(records_filtered);

        Ok(MarkupPage {
            records_total,
            records_filtered,
            media: filtered[start..end].iter().map(|r| (*r).clone()).collect(),
        })
    }
}
