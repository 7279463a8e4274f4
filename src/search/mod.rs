use std::cmp::Ordering;

use tracing::{debug, info, warn};

use crate::models::builder::{BuilderView, SearchResponse};
use crate::models::talent::Passport;
use crate::state::AppState;
use crate::talent::{TalentClient, TalentError, is_wallet_address};

pub const NO_MATCH_MESSAGE: &str =
    "No builders found matching your criteria. Try broadening your search.";

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("failed to retrieve builder {id}: {source}")]
    Lookup {
        id: String,
        #[source]
        source: TalentError,
    },
}

/// Run one search request end to end: interpret the query, pick the lookup
/// path, collect and rank records, and assemble the reply payload.
pub async fn execute(
    state: &AppState,
    query: &str,
    limit: usize,
) -> Result<SearchResponse, SearchError> {
    assert!(limit > 0, "Search limit must be positive");

    let interpretation = state.llm.interpret(query).await;
    if interpretation.is_degraded() {
        info!("Interpretation degraded; serving unfiltered listing");
    }
    let filter = interpretation.into_filter();

    if filter.wants_direct_lookup() {
        return direct_lookup(&state.talent, &filter.id).await;
    }

    let keyword = filter.keyword().map(normalize_keyword);
    let passports =
        collect_passports(&state.talent, keyword.as_deref(), limit, state.page_size).await;
    let mut ranked = rank_by_score(passports, filter.min_score);

    if state.search.enrich_credentials {
        ranked.truncate(state.search.enrich_top_n);
        enrich_credentials(&state.talent, &mut ranked).await;
    }

    let builders: Vec<BuilderView> = ranked.into_iter().map(BuilderView::from).collect();
    let content = describe_results(builders.len(), filter.min_score);
    Ok(SearchResponse { content, builders })
}

/// Single-record path. A lookup that does not resolve fails the whole
/// request; there is no fallback to the listing.
async fn direct_lookup(talent: &TalentClient, id: &str) -> Result<SearchResponse, SearchError> {
    let kind = if is_wallet_address(id) {
        "wallet address"
    } else {
        "passport id"
    };
    info!(%id, kind, "Direct builder lookup");

    let passport = talent
        .fetch_passport(id)
        .await
        .map_err(|source| SearchError::Lookup {
            id: id.to_string(),
            source,
        })?;

    let builder = BuilderView::from(passport);
    let content = format!("Found builder {}", builder.name);
    Ok(SearchResponse {
        content,
        builders: vec![builder],
    })
}

/// Sequentially walk listing pages until the limit is covered, a page comes
/// back short (end of data), or a page fetch fails. A failed page ends the
/// walk with whatever has been accumulated; it is not an error.
async fn collect_passports(
    talent: &TalentClient,
    keyword: Option<&str>,
    limit: usize,
    page_size: u32,
) -> Vec<Passport> {
    let pages = pages_needed(limit, page_size);
    let mut collected: Vec<Passport> = Vec::with_capacity(limit);

    for page in 1..=pages {
        let listing = match talent.fetch_passports_page(keyword, page, page_size).await {
            Ok(listing) => listing,
            Err(err) => {
                warn!(page, "Stopping pagination after failed page fetch: {err}");
                break;
            }
        };

        let fetched = listing.passports.len();
        collected.extend(listing.passports);
        debug!(
            page = listing.pagination.current_page,
            last_page = listing.pagination.last_page,
            fetched,
            total = listing.pagination.total,
            collected = collected.len(),
            "Fetched listing page"
        );

        if fetched < page_size as usize {
            break;
        }
    }

    collected.truncate(limit);
    collected
}

fn pages_needed(limit: usize, page_size: u32) -> u32 {
    assert!(page_size > 0, "Page size must be positive");
    let pages = limit.div_ceil(page_size as usize);
    assert!(pages <= u32::MAX as usize, "Page count exceeds bounds");
    pages as u32
}

/// Retain records meeting the inclusive score bound and order them by score
/// descending. The sort is stable, so equal scores keep fetch order.
fn rank_by_score(mut passports: Vec<Passport>, min_score: Option<f64>) -> Vec<Passport> {
    if let Some(bound) = min_score {
        passports.retain(|passport| passport.score >= bound);
    }
    passports.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    passports
}

/// Fetch credential records for each surviving passport. The calls are
/// independent, so they run as concurrent tasks; a failed fetch keeps the
/// credentials the listing already delivered.
async fn enrich_credentials(talent: &TalentClient, passports: &mut [Passport]) {
    let mut handles = Vec::with_capacity(passports.len());
    for passport in passports.iter() {
        let talent = talent.clone();
        let passport_id = passport.passport_id;
        handles.push(tokio::spawn(async move {
            talent.fetch_credentials(passport_id).await
        }));
    }

    for (index, handle) in handles.into_iter().enumerate() {
        match handle.await {
            Ok(Ok(credentials)) => passports[index].credentials = Some(credentials),
            Ok(Err(err)) => warn!(
                passport_id = passports[index].passport_id,
                "Credential enrichment failed: {err}"
            ),
            Err(join_err) => warn!("Credential enrichment task failed to join: {join_err}"),
        }
    }
}

/// Keyword searches use the bare username: a trailing ".eth" suffix and a
/// leading "@" are stripped before hitting the listing endpoint.
fn normalize_keyword(name: &str) -> String {
    let trimmed = name.trim();
    let lowered = trimmed.to_ascii_lowercase();
    let without_suffix = if lowered.ends_with(".eth") {
        &trimmed[..trimmed.len() - 4]
    } else {
        trimmed
    };
    without_suffix
        .strip_prefix('@')
        .unwrap_or(without_suffix)
        .to_string()
}

fn describe_results(count: usize, min_score: Option<f64>) -> String {
    if count == 0 {
        return NO_MATCH_MESSAGE.to_string();
    }
    match min_score {
        Some(bound) => {
            format!("Found {count} builders with score >= {bound}, sorted by highest score")
        }
        None => format!("Found {count} builders, sorted by highest score"),
    }
}
