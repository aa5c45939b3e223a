use crate::models::ListingData;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_LIMIT: usize = 50;
/// The `categoria` value that selects featured listings instead of a category.
pub const FEATURED_CATEGORY: &str = "destaque";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum QueryError {
    #[error("O parâmetro 'slug' não pode ser vazio")]
    EmptySlug,
}

/// Raw query-string parameters of `GET /api/empresas`.
///
/// Everything is kept as text so that empty or non-numeric values degrade to
/// "absent" instead of failing deserialization.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct ListingParams {
    pub categoria: Option<String>,
    pub bairro: Option<String>,
    pub busca: Option<String>,
    pub destaque: Option<String>,
    pub limit: Option<String>,
    pub slug: Option<String>,
    pub admin: Option<String>,
    pub lat: Option<String>,
    pub lng: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Approved and active listings only.
    Public,
    /// Every status; used by administrative views.
    All,
}

impl Visibility {
    pub fn admits(self, listing: &ListingData) -> bool {
        match self {
            Visibility::Public => listing.is_publicly_visible(),
            Visibility::All => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    Featured,
    Id(String),
}

/// A lower-cased, trimmed, non-empty free-text term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm(String);

impl SearchTerm {
    pub fn new(raw: &str) -> Option<Self> {
        let term = raw.trim().to_lowercase();
        (!term.is_empty()).then_some(SearchTerm(term))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive substring match against name, description or any tag.
    pub fn matches(&self, listing: &ListingData) -> bool {
        let hit = |text: &str| text.to_lowercase().contains(&self.0);
        hit(&listing.name)
            || listing.description.as_deref().map_or(false, hit)
            || listing.tags.iter().any(|tag| hit(tag))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BrowseFilter {
    visibility: Visibility,
    category: Option<CategoryFilter>,
    neighborhood: Option<String>,
    search: Option<SearchTerm>,
    featured_only: bool,
    limit: usize,
}

/// A filter over the listing collection.
#[derive(Debug, Clone, PartialEq)]
pub enum ListingQuery {
    /// Exact slug lookup; every other filter is ignored.
    Slug { slug: String, visibility: Visibility },
    Browse(BrowseFilter),
}

impl ListingQuery {
    pub fn by_slug(slug: &str, visibility: Visibility) -> Result<Self, QueryError> {
        let slug = slug.trim();
        if slug.is_empty() {
            return Err(QueryError::EmptySlug);
        }
        Ok(ListingQuery::Slug { slug: slug.to_string(), visibility })
    }

    pub fn browse(visibility: Visibility, max_limit: usize) -> Self {
        ListingQuery::Browse(BrowseFilter::new(visibility, max_limit))
    }

    /// Translates raw query-string parameters. A non-empty `slug` wins over
    /// everything else; empty strings count as absent.
    pub fn from_params(params: &ListingParams, max_limit: usize) -> Result<Self, QueryError> {
        let visibility = if flag(&params.admin) { Visibility::All } else { Visibility::Public };

        if let Some(slug) = non_empty(&params.slug) {
            return Self::by_slug(slug, visibility);
        }

        let mut filter = BrowseFilter::new(visibility, max_limit);

        filter.category = non_empty(&params.categoria).map(|c| {
            if c == FEATURED_CATEGORY {
                CategoryFilter::Featured
            } else {
                CategoryFilter::Id(c.to_string())
            }
        });
        filter.neighborhood = non_empty(&params.bairro).map(str::to_string);
        filter.search = params.busca.as_deref().and_then(SearchTerm::new);
        filter.featured_only = flag(&params.destaque);
        filter.limit = parse_limit(params.limit.as_deref(), max_limit);

        Ok(ListingQuery::Browse(filter))
    }

    pub fn visibility(&self) -> Visibility {
        match self {
            ListingQuery::Slug { visibility, .. } => *visibility,
            ListingQuery::Browse(filter) => filter.visibility,
        }
    }

    pub fn limit(&self) -> usize {
        match self {
            ListingQuery::Slug { .. } => 1,
            ListingQuery::Browse(filter) => filter.limit,
        }
    }

    pub fn matches(&self, listing: &ListingData) -> bool {
        if !self.visibility().admits(listing) {
            return false;
        }
        match self {
            ListingQuery::Slug { slug, .. } => listing.slug == *slug,
            ListingQuery::Browse(filter) => filter.matches(listing),
        }
    }
}

impl BrowseFilter {
    fn new(visibility: Visibility, max_limit: usize) -> Self {
        BrowseFilter {
            visibility,
            category: None,
            neighborhood: None,
            search: None,
            featured_only: false,
            limit: DEFAULT_LIMIT.min(max_limit.max(1)),
        }
    }

    pub fn matching(mut self, term: SearchTerm) -> Self {
        self.search = Some(term);
        self
    }

    pub fn featured_only(mut self) -> Self {
        self.featured_only = true;
        self
    }

    fn matches(&self, listing: &ListingData) -> bool {
        let category_ok = match &self.category {
            None => true,
            Some(CategoryFilter::Featured) => listing.featured,
            Some(CategoryFilter::Id(id)) => listing.category_id.as_deref() == Some(id.as_str()),
        };
        let neighborhood_ok = self
            .neighborhood
            .as_deref()
            .map_or(true, |n| listing.neighborhood.as_deref() == Some(n));
        let featured_ok = !self.featured_only || listing.featured;
        let search_ok = self.search.as_ref().map_or(true, |term| term.matches(listing));

        category_ok && neighborhood_ok && featured_ok && search_ok
    }
}

impl ListingQuery {
    /// Gives access to the browse builder methods; slug queries pass through.
    pub fn refine(self, f: impl FnOnce(BrowseFilter) -> BrowseFilter) -> Self {
        match self {
            ListingQuery::Browse(filter) => ListingQuery::Browse(f(filter)),
            slug => slug,
        }
    }
}

/// Parses `limit`, falling back to the default on absent or non-numeric input
/// and clamping to `1..=max_limit`.
pub fn parse_limit(raw: Option<&str>, max_limit: usize) -> usize {
    let max_limit = max_limit.max(1);
    raw.map(str::trim)
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(DEFAULT_LIMIT)
        .clamp(1, max_limit)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn flag(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim) == Some("true")
}
