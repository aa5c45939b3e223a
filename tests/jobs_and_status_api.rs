#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::{json, Value};

#[actix_web::test]
async fn status_reports_the_database_name() {
    let app = test_app!();

    let req = test::TestRequest::get().uri("/api/status").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "status": "ok", "database": "aqui-guaira-test" }));
}

#[actix_web::test]
async fn job_offers_follow_listing_visibility() {
    let app = test_app!();

    let mut listing_ids = Vec::new();
    for name in ["Supermercado Bom Preço", "Oficina do Zé"] {
        let req = test::TestRequest::post()
            .uri("/api/empresas")
            .set_json(json!({ "nome": name, "whatsapp": "44988887777" }))
            .to_request();
        let listing: Value = test::call_and_read_body_json(&app, req).await;
        listing_ids.push(listing["id"].as_str().unwrap().to_string());
    }
    let req = test::TestRequest::patch()
        .uri(&format!("/api/empresas?id={}", listing_ids[0]))
        .set_json(json!({ "acao": "aprovar" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let mut job_ids = Vec::new();
    for (listing_id, title) in [(&listing_ids[0], "Repositor"), (&listing_ids[1], "Mecânico")] {
        let req = test::TestRequest::post()
            .uri("/api/vagas")
            .set_json(json!({
                "empresa_id": listing_id,
                "titulo": title,
                "descricao": "Vaga em tempo integral",
                "tipo": "CLT",
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let job: Value = test::read_body_json(resp).await;
        job_ids.push(job["id"].as_str().unwrap().to_string());
    }

    let req = test::TestRequest::get().uri("/api/vagas").to_request();
    let jobs: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(jobs.as_array().unwrap().len(), 1);
    assert_eq!(jobs[0]["titulo"], "Repositor");
    assert_eq!(jobs[0]["empresa"]["nome"], "Supermercado Bom Preço");
    assert_eq!(jobs[0]["empresa"]["whatsapp"], "44988887777");

    let req = test::TestRequest::post()
        .uri("/api/vagas")
        .set_json(json!({ "empresa_id": listing_ids[0], "titulo": "Caixa" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::delete().uri(&format!("/api/vagas?id={}", job_ids[0])).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::delete().uri(&format!("/api/vagas?id={}", job_ids[0])).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
