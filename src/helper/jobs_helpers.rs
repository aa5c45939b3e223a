use crate::errors::AppError;
use crate::helper::sanitization_helpers::strip_optional;
use crate::models::db_operations::{jobs_db_operations, listings_db_operations};
use crate::models::listing_query::{parse_limit, SearchTerm};
use crate::models::{JobOffer, JobOfferData, Listing};
use chrono::Utc;
use redb::Database;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct JobParams {
    #[serde(rename = "empresaId")]
    pub empresa_id: Option<String>,
    pub busca: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct JobDraft {
    pub empresa_id: Option<String>,
    pub titulo: Option<String>,
    pub descricao: Option<String>,
    pub tipo: Option<String>,
    pub salario: Option<String>,
}

/// The bits of a listing shown next to each job offer.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ListingSummary {
    pub id: String,
    pub nome: String,
    pub slug: String,
    pub logo: Option<String>,
    pub bairro: Option<String>,
    pub whatsapp: Option<String>,
}

impl From<&Listing> for ListingSummary {
    fn from(listing: &Listing) -> Self {
        ListingSummary {
            id: listing.id.clone(),
            nome: listing.data.name.clone(),
            slug: listing.data.slug.clone(),
            logo: listing.data.logo.clone(),
            bairro: listing.data.neighborhood.clone(),
            whatsapp: listing.data.contact.whatsapp.clone(),
        }
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct JobView {
    #[serde(flatten)]
    pub offer: JobOffer,
    pub empresa: ListingSummary,
}

/// Job offers whose listing is publicly visible, newest first.
pub fn list_jobs(db: &Database, params: &JobParams, max_limit: usize) -> Result<Vec<JobView>, AppError> {
    let visible: HashMap<String, ListingSummary> = listings_db_operations::read_all_listings(db)?
        .iter()
        .filter(|l| l.data.is_publicly_visible())
        .map(|l| (l.id.clone(), ListingSummary::from(l)))
        .collect();

    let listing_filter = strip_optional(params.empresa_id.as_deref());
    let search = params.busca.as_deref().and_then(SearchTerm::new);
    let limit = parse_limit(params.limit.as_deref(), max_limit);

    let jobs = jobs_db_operations::read_all_job_offers(db)?
        .into_iter()
        .filter(|job| listing_filter.as_deref().map_or(true, |id| job.data.listing_id == id))
        .filter(|job| {
            search.as_ref().map_or(true, |term| {
                job.data.title.to_lowercase().contains(term.as_str())
                    || job.data.description.to_lowercase().contains(term.as_str())
            })
        })
        .filter_map(|job| {
            let empresa = visible.get(&job.data.listing_id)?.clone();
            Some(JobView { offer: job, empresa })
        })
        .take(limit)
        .collect();
    Ok(jobs)
}

pub fn create_job(db: &Database, draft: &JobDraft) -> Result<JobOffer, AppError> {
    let required = |value: &Option<String>, message: &str| {
        strip_optional(value.as_deref()).ok_or_else(|| AppError::validation(message))
    };
    let listing_id = required(&draft.empresa_id, "Informe a empresa")?;
    if listings_db_operations::read_listing(db, &listing_id)?.is_none() {
        return Err(AppError::not_found("Empresa não encontrada"));
    }

    let offer = JobOfferData {
        listing_id,
        title: required(&draft.titulo, "Informe o título da vaga")?,
        description: required(&draft.descricao, "Informe a descrição da vaga")?,
        kind: required(&draft.tipo, "Informe o tipo da vaga")?,
        salary: strip_optional(draft.salario.as_deref()),
        created_at: Utc::now(),
    };
    Ok(jobs_db_operations::create_job_offer(db, offer)?)
}

pub fn delete_job(db: &Database, id: &str) -> Result<(), AppError> {
    if jobs_db_operations::delete_job_offer(db, id)? {
        Ok(())
    } else {
        Err(AppError::not_found("Vaga não encontrada"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper::directory_helpers::{self, ListingDraft};
    use crate::models::workflow::ListingAction;
    use crate::setup::db_setup::setup_documents_in_memory;

    fn listing(db: &Database, name: &str, approved: bool) -> Listing {
        let draft = ListingDraft { nome: Some(name.into()), ..Default::default() };
        let created = directory_helpers::create(db, &draft).unwrap();
        if approved {
            directory_helpers::apply_transition(db, &created.id, &ListingAction::Approve).unwrap()
        } else {
            created
        }
    }

    fn job(listing_id: &str, title: &str) -> JobDraft {
        JobDraft {
            empresa_id: Some(listing_id.into()),
            titulo: Some(title.into()),
            descricao: Some("Atendimento ao público".into()),
            tipo: Some("CLT".into()),
            salario: None,
        }
    }

    #[test]
    fn only_jobs_of_visible_listings_are_listed() {
        let db = setup_documents_in_memory().unwrap();
        let open = listing(&db, "Mercado Sol", true);
        let hidden = listing(&db, "Loja Nova", false);
        create_job(&db, &job(&open.id, "Caixa")).unwrap();
        create_job(&db, &job(&hidden.id, "Vendedor")).unwrap();

        let jobs = list_jobs(&db, &JobParams::default(), 200).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].offer.data.title, "Caixa");
        assert_eq!(jobs[0].empresa.slug, "mercado-sol");
    }

    #[test]
    fn jobs_filter_by_listing_and_search() {
        let db = setup_documents_in_memory().unwrap();
        let a = listing(&db, "Mercado Sol", true);
        let b = listing(&db, "Padaria Lua", true);
        create_job(&db, &job(&a.id, "Caixa")).unwrap();
        create_job(&db, &job(&b.id, "Padeiro")).unwrap();

        let by_listing = JobParams { empresa_id: Some(b.id.clone()), ..Default::default() };
        assert_eq!(list_jobs(&db, &by_listing, 200).unwrap()[0].offer.data.title, "Padeiro");

        let by_search = JobParams { busca: Some("CAIXA".into()), ..Default::default() };
        let found = list_jobs(&db, &by_search, 200).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].empresa.id, a.id);
    }

    #[test]
    fn jobs_need_an_existing_listing() {
        let db = setup_documents_in_memory().unwrap();
        let missing = uuid::Uuid::new_v4().to_string();
        assert!(matches!(create_job(&db, &job(&missing, "Caixa")), Err(AppError::NotFound(_))));
        assert!(matches!(delete_job(&db, &missing), Err(AppError::NotFound(_))));
    }
}
