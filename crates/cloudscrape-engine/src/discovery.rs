//! Dimension discovery: which concrete series exist for a rule.

use cloudscrape_core::{DimensionSet, MetricRule};
use tracing::debug;

use crate::api::ListMetricsRequest;
use crate::error::ScrapeResult;
use crate::upstream::Upstream;

/// Resolve the dimension sets a rule should be fetched for.
///
/// A rule without dimension names yields exactly one empty set and makes
/// no upstream call. Otherwise pages are fetched sequentially until the
/// continuation token runs out; combinations with a different number of
/// dimensions than requested are dropped, then the rule's selection
/// filter applies. Result order follows response order across pages.
pub async fn discover(upstream: &Upstream<'_>, rule: &MetricRule) -> ScrapeResult<Vec<DimensionSet>> {
    let Some(names) = rule.dimensions.as_ref() else {
        return Ok(vec![DimensionSet::empty()]);
    };

    let mut request = ListMetricsRequest {
        namespace: rule.namespace.clone(),
        metric_name: rule.metric_name.clone(),
        dimension_names: names.clone(),
        next_token: None,
    };

    let mut found = Vec::new();
    let mut pages = 0usize;
    loop {
        let page = upstream.list_metrics(&request).await?;
        pages += 1;

        found.extend(
            page.metrics
                .into_iter()
                .filter(|set| set.len() == names.len())
                .filter(|set| rule.select.matches(set)),
        );

        match page.next_token {
            Some(token) => request.next_token = Some(token),
            None => break,
        }
    }

    debug!(
        namespace = %rule.namespace,
        metric = %rule.metric_name,
        pages,
        matched = found.len(),
        "dimension discovery complete"
    );
    Ok(found)
}
