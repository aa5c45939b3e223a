use crate::models::db_operations::{insert_document, remove_document, scan_documents, DbError, VAGAS};
use crate::models::{JobOffer, JobOfferData};
use redb::Database;

pub fn create_job_offer(db: &Database, offer: JobOfferData) -> Result<JobOffer, DbError> {
    insert_document(db, VAGAS, offer)
}

/// Every stored offer, newest first.
pub fn read_all_job_offers(db: &Database) -> Result<Vec<JobOffer>, DbError> {
    let mut offers: Vec<JobOffer> = scan_documents(db, VAGAS)?;
    offers.sort_by(|a, b| b.data.created_at.cmp(&a.data.created_at));
    Ok(offers)
}

pub fn delete_job_offer(db: &Database, id: &str) -> Result<bool, DbError> {
    remove_document(db, VAGAS, id)
}
