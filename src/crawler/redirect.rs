//! Redirect chain resolution
//!
//! A redirect chain is the list of URLs requested for one fetch, in order,
//! followed by the URL about to be requested. Each adjacent pair becomes an
//! edge in the crawl graph.

use crate::graph::LinkGraph;
use crate::url::normalize_url;
use crate::CrawlError;

/// Records the hops of a redirect chain in `graph`
///
/// Every hop is normalized before the graph is touched, so a chain with one
/// bad hop leaves no trace. Identifiers of hops that were already seen are
/// reused. Returns the number of edges recorded.
pub fn resolve_redirect_chain<S: AsRef<str>>(
    graph: &mut LinkGraph,
    chain: &[S],
    terminal: &str,
) -> Result<usize, CrawlError> {
    let hops = chain
        .iter()
        .map(|hop| hop.as_ref())
        .chain(std::iter::once(terminal))
        .map(normalize_url)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            tracing::debug!("Skipping redirect chain ending at {}: {}", terminal, e);
            CrawlError::InvalidRedirectTarget
        })?;

    let mut recorded = 0;
    for pair in hops.windows(2) {
        let (from_id, _) = graph.lookup_or_allocate(&pair[0]);
        let (to_id, _) = graph.lookup_or_allocate(&pair[1]);
        graph.add_node(from_id, &pair[0]);
        graph.add_node(to_id, &pair[1]);
        graph.add_edge(from_id, to_id);
        recorded += 1;
    }

    Ok(recorded)
}
