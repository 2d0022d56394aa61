//! Shared helpers for cross-crate HR tests.

use std::sync::Arc;

use anyhow::{Result, ensure};
use products_hr::{
    CountMode, EntityService, HrConfig, HrModule, ListQuery, Record, service::total_pages,
};

/// Module without simulated latency.
pub fn instant_module(count_mode: CountMode) -> HrModule {
    HrModule::new(HrConfig {
        simulate_latency: false,
        count_mode,
        ..HrConfig::default()
    })
}

/// Walk every page of `query` and return the concatenated items along with
/// the reported total.
pub async fn collect_all_pages<T: Record>(
    service: Arc<dyn EntityService<T>>,
    query: ListQuery,
) -> Result<(Vec<T>, usize)> {
    let first = service.list(&query).await?;
    let total = first.total;
    let pages = total_pages(total, query.page_size);
    let mut items = first.items;
    for page in 2..=pages {
        let next = ListQuery {
            page,
            ..query.clone()
        };
        let result = service.list(&next).await?;
        ensure!(
            result.items.len() <= query.page_size as usize,
            "page {page} overflowed"
        );
        ensure!(result.total == total, "total changed between pages");
        items.extend(result.items);
    }
    Ok((items, total))
}

pub fn ids<T: Record>(items: &[T]) -> Vec<String> {
    items.iter().map(|item| item.id().to_string()).collect()
}
