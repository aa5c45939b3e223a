use crate::models::db_operations::{
    id_to_string, load_document, modify_document, parse_id, put_document, read_document,
    scan_documents, DbError, EMPRESAS, SLUG_INDEX,
};
use crate::models::{Listing, ListingData, Record};
use chrono::Utc;
use redb::{Database, ReadableTable, WriteTransaction};
use uuid::Uuid;

fn slug_is_taken(txn: &WriteTransaction, slug: &str) -> Result<bool, DbError> {
    let index = txn.open_table(SLUG_INDEX)?;
    let taken = index.get(slug)?.is_some();
    Ok(taken)
}

/// Picks the first free slug among `base`, `base-2`, `base-3`, ...
fn claim_slug(txn: &WriteTransaction, base: &str) -> Result<String, DbError> {
    if !slug_is_taken(txn, base)? {
        return Ok(base.to_string());
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}-{}", base, n);
        if !slug_is_taken(txn, &candidate)? {
            return Ok(candidate);
        }
        n += 1;
    }
}

/// Stores a new listing and registers its slug. A taken slug gets a numeric
/// suffix; the slug actually used is returned inside the record.
pub fn create_listing(db: &Database, mut listing: ListingData) -> Result<Listing, DbError> {
    let id = Uuid::new_v4();
    let id_bytes = id.into_bytes();

    let write_txn = db.begin_write()?;
    listing.slug = claim_slug(&write_txn, &listing.slug)?;
    put_document(&write_txn, EMPRESAS, &id_bytes, &listing)?;
    {
        let mut index = write_txn.open_table(SLUG_INDEX)?;
        index.insert(listing.slug.as_str(), &id_bytes)?;
    }
    write_txn.commit()?;

    Ok(Record { id: id.to_string(), data: listing })
}

pub fn read_listing(db: &Database, id: &str) -> Result<Option<Listing>, DbError> {
    read_document(db, EMPRESAS, id)
}

pub fn read_listing_by_slug(db: &Database, slug: &str) -> Result<Option<Listing>, DbError> {
    let read_txn = db.begin_read()?;
    let index = read_txn.open_table(SLUG_INDEX)?;
    let id_bytes = match index.get(slug)? {
        Some(guard) => *guard.value(),
        None => return Ok(None),
    };

    let listings = read_txn.open_table(EMPRESAS)?;
    let listing = match listings.get(&id_bytes)? {
        Some(json) => Some(Record { id: id_to_string(&id_bytes), data: serde_json::from_str(json.value())? }),
        None => {
            log::warn!("Slug '{}' points at a missing listing", slug);
            None
        }
    };
    Ok(listing)
}

pub fn read_all_listings(db: &Database) -> Result<Vec<Listing>, DbError> {
    scan_documents(db, EMPRESAS)
}

/// Read-modify-write of one listing. The slug is immutable once assigned.
pub fn update_listing<E, F>(db: &Database, id: &str, mutate: F) -> Result<Option<Listing>, E>
where
    E: From<DbError>,
    F: FnOnce(&mut ListingData) -> Result<(), E>,
{
    modify_document(db, EMPRESAS, id, |listing: &mut ListingData| {
        let slug = listing.slug.clone();
        mutate(listing)?;
        listing.slug = slug;
        Ok(())
    })
}

pub fn increment_views(db: &Database, id: &str) -> Result<Option<u64>, DbError> {
    let updated = modify_document(db, EMPRESAS, id, |listing: &mut ListingData| {
        listing.views = listing.views.saturating_add(1);
        listing.updated_at = Utc::now();
        Ok::<(), DbError>(())
    })?;
    Ok(updated.map(|record| record.data.views))
}

/// Hard delete of a listing and its slug entry. Posts and job offers that
/// reference it are left in place.
pub fn delete_listing(db: &Database, id: &str) -> Result<Option<Listing>, DbError> {
    let id_bytes = parse_id(id)?;
    let write_txn = db.begin_write()?;
    let listing: Option<ListingData> = load_document(&write_txn, EMPRESAS, &id_bytes)?;
    if let Some(listing) = &listing {
        let mut listings = write_txn.open_table(EMPRESAS)?;
        listings.remove(&id_bytes)?;
        let mut index = write_txn.open_table(SLUG_INDEX)?;
        index.remove(listing.slug.as_str())?;
    }
    write_txn.commit()?;
    Ok(listing.map(|data| Record { id: id_to_string(&id_bytes), data }))
}
