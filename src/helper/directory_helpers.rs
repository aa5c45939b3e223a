use crate::errors::AppError;
use crate::helper::geo_helpers::haversine_km;
use crate::helper::sanitization_helpers::{slugify, strip_all_html, strip_optional};
use crate::models::db_operations::listings_db_operations;
use crate::models::listing_query::{ListingQuery, Visibility};
use crate::models::workflow::{apply_listing_action, ListingAction, WorkflowError};
use crate::models::{ContactInfo, Listing, ListingData, ModerationStatus};
use chrono::{DateTime, Utc};
use redb::Database;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/empresas`: what a business owner fills in.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct ListingDraft {
    pub nome: Option<String>,
    pub slug: Option<String>,
    pub descricao: Option<String>,
    pub categoria_id: Option<String>,
    pub bairro: Option<String>,
    pub endereco: Option<String>,
    pub cidade: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(flatten)]
    pub contact: ContactInfo,
    pub logo: Option<String>,
    #[serde(default)]
    pub imagens: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub user_id: Option<String>,
}

/// A listing with administrative overrides, as accepted by the import path.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct ListingSeed {
    #[serde(flatten)]
    pub draft: ListingDraft,
    pub status: Option<ModerationStatus>,
    pub ativa: Option<bool>,
    pub destaque: Option<bool>,
    pub visualizacoes: Option<u64>,
}

/// Body of `PATCH /api/empresas`.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct ListingPatch {
    pub acao: Option<String>,
    pub status: Option<ModerationStatus>,
    pub ativa: Option<bool>,
    pub motivo_bloqueio: Option<String>,
    pub motivo_rejeicao: Option<String>,
    pub destaque: Option<bool>,
    pub admin_id: Option<String>,
    #[serde(flatten)]
    pub profile: ProfilePatch,
}

/// Self-service profile fields. An empty string clears an optional field.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct ProfilePatch {
    pub nome: Option<String>,
    pub descricao: Option<String>,
    pub categoria_id: Option<String>,
    pub bairro: Option<String>,
    pub endereco: Option<String>,
    pub cidade: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub telefone: Option<String>,
    pub whatsapp: Option<String>,
    pub email: Option<String>,
    pub site: Option<String>,
    pub instagram: Option<String>,
    pub facebook: Option<String>,
    pub logo: Option<String>,
    pub imagens: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
}

/// A listing as returned by the API: its banner image and, when the caller
/// sent coordinates, its distance from them.
#[derive(Debug, Serialize, Clone)]
pub struct ListingView {
    #[serde(flatten)]
    pub listing: Listing,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distancia_km: Option<f64>,
}

fn clean_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|item| strip_all_html(item))
        .filter(|item| !item.is_empty())
        .collect()
}

fn draft_to_listing(draft: &ListingDraft, now: DateTime<Utc>) -> Result<ListingData, AppError> {
    let name = strip_optional(draft.nome.as_deref())
        .ok_or_else(|| AppError::validation("Informe o nome da empresa"))?;

    let slug = draft
        .slug
        .as_deref()
        .map(slugify)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| slugify(&name));
    let slug = if slug.is_empty() { "empresa".to_string() } else { slug };

    Ok(ListingData {
        name,
        slug,
        description: strip_optional(draft.descricao.as_deref()),
        category_id: strip_optional(draft.categoria_id.as_deref()),
        neighborhood: strip_optional(draft.bairro.as_deref()),
        address: strip_optional(draft.endereco.as_deref()),
        city: strip_optional(draft.cidade.as_deref()),
        latitude: draft.latitude,
        longitude: draft.longitude,
        contact: ContactInfo {
            phone: strip_optional(draft.contact.phone.as_deref()),
            whatsapp: strip_optional(draft.contact.whatsapp.as_deref()),
            email: strip_optional(draft.contact.email.as_deref()),
            website: strip_optional(draft.contact.website.as_deref()),
            instagram: strip_optional(draft.contact.instagram.as_deref()),
            facebook: strip_optional(draft.contact.facebook.as_deref()),
        },
        logo: strip_optional(draft.logo.as_deref()),
        images: clean_list(&draft.imagens),
        tags: clean_list(&draft.tags),
        owner_id: strip_optional(draft.user_id.as_deref()),
        status: ModerationStatus::Pending,
        active: false,
        featured: false,
        block_reason: None,
        rejection_reason: None,
        views: 0,
        created_at: now,
        updated_at: now,
    })
}

/// Registers a new listing awaiting moderation.
pub fn create(db: &Database, draft: &ListingDraft) -> Result<Listing, AppError> {
    let listing = draft_to_listing(draft, Utc::now())?;
    Ok(listings_db_operations::create_listing(db, listing)?)
}

/// Administrative import: like `create`, but honours explicit status, active,
/// featured and view-counter values.
pub fn seed(db: &Database, seed: &ListingSeed) -> Result<Listing, AppError> {
    let mut listing = draft_to_listing(&seed.draft, Utc::now())?;
    if let Some(status) = seed.status {
        listing.status = status;
    }
    listing.active = seed.ativa.unwrap_or(listing.status == ModerationStatus::Approved);
    listing.featured = seed.destaque.unwrap_or(false);
    listing.views = seed.visualizacoes.unwrap_or(0);
    Ok(listings_db_operations::create_listing(db, listing)?)
}

/// Featured first, then newest.
fn sort_for_display(listings: &mut [Listing]) {
    listings.sort_by(|a, b| {
        b.data
            .featured
            .cmp(&a.data.featured)
            .then_with(|| b.data.created_at.cmp(&a.data.created_at))
    });
}

/// Runs a listing query. "No results" is an empty vector, never an error.
pub fn list(db: &Database, query: &ListingQuery) -> Result<Vec<Listing>, AppError> {
    if let ListingQuery::Slug { slug, .. } = query {
        let found = listings_db_operations::read_listing_by_slug(db, slug)?;
        return Ok(found.into_iter().filter(|l| query.matches(&l.data)).collect());
    }

    let mut listings: Vec<Listing> = listings_db_operations::read_all_listings(db)?
        .into_iter()
        .filter(|l| query.matches(&l.data))
        .collect();
    sort_for_display(&mut listings);
    listings.truncate(query.limit());
    Ok(listings)
}

pub fn get_by_slug(db: &Database, slug: &str, visibility: Visibility) -> Result<Listing, AppError> {
    let query = ListingQuery::by_slug(slug, visibility)?;
    list(db, &query)?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::not_found("Empresa não encontrada"))
}

pub fn with_distance(listings: Vec<Listing>, origin: Option<(f64, f64)>) -> Vec<ListingView> {
    listings
        .into_iter()
        .map(|listing| {
            let distancia_km = match (origin, listing.data.latitude, listing.data.longitude) {
                (Some((lat, lng)), Some(l_lat), Some(l_lng)) => Some(haversine_km(lat, lng, l_lat, l_lng)),
                _ => None,
            };
            let banner = listing.data.banner().map(str::to_string);
            ListingView { listing, banner, distancia_km }
        })
        .collect()
}

fn parse_action_name(name: &str, patch: &ListingPatch) -> Result<ListingAction, WorkflowError> {
    match name.trim() {
        "aprovar" => Ok(ListingAction::Approve),
        "rejeitar" => ListingAction::reject(patch.motivo_rejeicao.as_deref()),
        "bloquear" => ListingAction::block(patch.motivo_bloqueio.as_deref()),
        "desbloquear" => Ok(ListingAction::Unblock),
        "destacar" => Ok(ListingAction::ToggleFeatured),
        other => Err(WorkflowError::UnknownAction(other.to_string())),
    }
}

fn status_transition(patch: &ListingPatch, current: &ListingData) -> Result<Option<ListingAction>, WorkflowError> {
    match (patch.status, patch.ativa) {
        (Some(ModerationStatus::Pending), _) => Err(WorkflowError::UnknownAction("status=pendente".to_string())),
        (Some(ModerationStatus::Rejected), _) => ListingAction::reject(patch.motivo_rejeicao.as_deref()).map(Some),
        (_, Some(false)) => ListingAction::block(patch.motivo_bloqueio.as_deref()).map(Some),
        (Some(ModerationStatus::Approved), _) | (None, Some(true)) => {
            let action = if current.is_blocked() { ListingAction::Unblock } else { ListingAction::Approve };
            Ok(Some(action))
        }
        (None, None) => Ok(None),
    }
}

/// Maps a PATCH body onto at most one workflow action, given the listing's
/// current state. An explicit `acao` wins over the status fields. A `destaque`
/// that differs from the stored flag counts as a second action when another
/// one was requested, and the body is refused.
pub fn resolve_action(patch: &ListingPatch, current: &ListingData) -> Result<Option<ListingAction>, WorkflowError> {
    let requested = match patch.acao.as_deref().filter(|a| !a.trim().is_empty()) {
        Some(name) => Some(parse_action_name(name, patch)?),
        None => status_transition(patch, current)?,
    };
    let flips_featured = matches!(patch.destaque, Some(featured) if featured != current.featured);

    match requested {
        Some(ListingAction::ToggleFeatured) => Ok(Some(ListingAction::ToggleFeatured)),
        Some(_) if flips_featured => Err(WorkflowError::ConflictingActions),
        Some(action) => Ok(Some(action)),
        None if flips_featured => Ok(Some(ListingAction::ToggleFeatured)),
        None => Ok(None),
    }
}

fn set_text(target: &mut Option<String>, value: &Option<String>) {
    if let Some(value) = value {
        *target = strip_optional(Some(value.as_str()));
    }
}

fn apply_profile(listing: &mut ListingData, profile: &ProfilePatch) -> Result<(), AppError> {
    if let Some(name) = &profile.nome {
        listing.name = strip_optional(Some(name.as_str()))
            .ok_or_else(|| AppError::validation("O nome da empresa não pode ficar vazio"))?;
    }
    set_text(&mut listing.description, &profile.descricao);
    set_text(&mut listing.category_id, &profile.categoria_id);
    set_text(&mut listing.neighborhood, &profile.bairro);
    set_text(&mut listing.address, &profile.endereco);
    set_text(&mut listing.city, &profile.cidade);
    set_text(&mut listing.contact.phone, &profile.telefone);
    set_text(&mut listing.contact.whatsapp, &profile.whatsapp);
    set_text(&mut listing.contact.email, &profile.email);
    set_text(&mut listing.contact.website, &profile.site);
    set_text(&mut listing.contact.instagram, &profile.instagram);
    set_text(&mut listing.contact.facebook, &profile.facebook);
    set_text(&mut listing.logo, &profile.logo);
    if profile.latitude.is_some() {
        listing.latitude = profile.latitude;
    }
    if profile.longitude.is_some() {
        listing.longitude = profile.longitude;
    }
    if let Some(images) = &profile.imagens {
        listing.images = clean_list(images);
    }
    if let Some(tags) = &profile.tags {
        listing.tags = clean_list(tags);
    }
    Ok(())
}

/// Applies a PATCH body: at most one workflow transition plus any profile
/// changes, all in one write. Returns the stored listing and the transition
/// that was applied, if any.
pub fn update(
    db: &Database,
    id: &str,
    patch: &ListingPatch,
) -> Result<(Listing, Option<ListingAction>), AppError> {
    let mut applied = None;
    let now = Utc::now();
    let updated = listings_db_operations::update_listing(db, id, |listing: &mut ListingData| {
        let action = resolve_action(patch, listing)?;
        if let Some(action) = &action {
            apply_listing_action(listing, action, now)?;
        }
        apply_profile(listing, &patch.profile)?;
        listing.updated_at = now;
        applied = action;
        Ok::<(), AppError>(())
    })?
    .ok_or_else(|| AppError::not_found("Empresa não encontrada"))?;
    Ok((updated, applied))
}

/// Applies one workflow transition by id.
pub fn apply_transition(db: &Database, id: &str, action: &ListingAction) -> Result<Listing, AppError> {
    let now = Utc::now();
    listings_db_operations::update_listing(db, id, |listing: &mut ListingData| {
        apply_listing_action(listing, action, now).map_err(AppError::from)
    })?
    .ok_or_else(|| AppError::not_found("Empresa não encontrada"))
}

pub fn delete(db: &Database, id: &str) -> Result<Listing, AppError> {
    listings_db_operations::delete_listing(db, id)?.ok_or_else(|| AppError::not_found("Empresa não encontrada"))
}

pub fn record_view(db: &Database, id: &str) -> Result<u64, AppError> {
    listings_db_operations::increment_views(db, id)?.ok_or_else(|| AppError::not_found("Empresa não encontrada"))
}
