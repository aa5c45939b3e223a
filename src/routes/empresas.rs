use crate::config::Config;
use crate::errors::AppError;
use crate::helper::directory_helpers::{self, ListingDraft, ListingPatch};
use crate::helper::{admin_helpers, geo_helpers};
use crate::middleware::ActingAdmin;
use crate::models::admin_actions;
use crate::models::listing_query::{ListingParams, ListingQuery};
use crate::models::workflow::ListingAction;
use crate::models::Listing;
use crate::routes::{ok_message, parse_body, preflight, require_body, required_param};
use actix_web::{http::Method, web, HttpResponse};
use redb::Database;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Deserialize)]
pub struct IdQuery {
    id: Option<String>,
    action: Option<String>,
}

pub fn config_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/empresas")
            .route(web::get().to(list_listings))
            .route(web::post().to(create_listing))
            .route(web::patch().to(update_listing))
            .route(web::delete().to(delete_listing))
            .route(web::method(Method::OPTIONS).to(preflight)),
    );
}

fn describe(action: &ListingAction, listing: &Listing) -> String {
    match action {
        ListingAction::Block { reason } | ListingAction::Reject { reason } => {
            format!("{} (motivo: {})", listing.data.name, reason)
        }
        ListingAction::ToggleFeatured => {
            let state = if listing.data.featured { "destacada" } else { "sem destaque" };
            format!("{} ({})", listing.data.name, state)
        }
        _ => listing.data.name.clone(),
    }
}

async fn list_listings(
    db: web::Data<Database>,
    config: web::Data<Config>,
    query: web::Query<ListingParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let listing_query = ListingQuery::from_params(&params, config.max_result_limit)?;
    let origin = geo_helpers::parse_coordinates(params.lat.as_deref(), params.lng.as_deref());

    if let ListingQuery::Slug { slug, visibility } = listing_query {
        let listing = web::block(move || directory_helpers::get_by_slug(&db, &slug, visibility)).await??;
        let view = directory_helpers::with_distance(vec![listing], origin).pop();
        return Ok(HttpResponse::Ok().json(view));
    }

    let listings = web::block(move || directory_helpers::list(&db, &listing_query)).await??;
    Ok(HttpResponse::Ok().json(directory_helpers::with_distance(listings, origin)))
}

async fn create_listing(
    db: web::Data<Database>,
    query: web::Query<IdQuery>,
    body: Result<web::Json<Value>, actix_web::Error>,
) -> Result<HttpResponse, AppError> {
    if query.action.as_deref() == Some("visualizar") {
        let id = required_param(&query.id, "id")?;
        let views = web::block(move || directory_helpers::record_view(&db, &id)).await??;
        return Ok(HttpResponse::Ok().json(json!({ "visualizacoes": views })));
    }

    let draft: ListingDraft = parse_body(require_body(body)?)?;
    let listing = web::block(move || directory_helpers::create(&db, &draft)).await??;
    Ok(HttpResponse::Created().json(listing))
}

async fn update_listing(
    db: web::Data<Database>,
    query: web::Query<IdQuery>,
    admin: ActingAdmin,
    body: web::Json<ListingPatch>,
) -> Result<HttpResponse, AppError> {
    let id = required_param(&query.id, "id")?;
    let patch = body.into_inner();
    let admin_id = admin.or_body(patch.admin_id.as_deref());

    let listing = web::block(move || {
        let (listing, action) = directory_helpers::update(&db, &id, &patch)?;
        if let Some(action) = action {
            admin_helpers::record_admin_action(
                &db,
                admin_id.as_deref(),
                action.log_code(),
                "empresa",
                &listing.id,
                describe(&action, &listing),
            );
        }
        Ok::<_, AppError>(listing)
    })
    .await??;

    Ok(HttpResponse::Ok().json(listing))
}

async fn delete_listing(
    db: web::Data<Database>,
    query: web::Query<IdQuery>,
    admin: ActingAdmin,
) -> Result<HttpResponse, AppError> {
    let id = required_param(&query.id, "id")?;
    web::block(move || {
        let removed = directory_helpers::delete(&db, &id)?;
        admin_helpers::record_admin_action(
            &db,
            admin.id(),
            admin_actions::DELETE_LISTING,
            "empresa",
            &removed.id,
            removed.data.name.clone(),
        );
        Ok::<_, AppError>(())
    })
    .await??;

    Ok(ok_message("Empresa excluída"))
}
