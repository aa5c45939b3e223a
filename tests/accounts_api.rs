#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::{json, Value};

#[actix_web::test]
async fn register_and_login() {
    let app = test_app!();

    let req = test::TestRequest::post()
        .uri("/api/auth?action=register")
        .set_json(json!({ "email": " Ana@Guaira.PR ", "senha": "segredo", "nome": "Ana" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let account: Value = test::read_body_json(resp).await;
    assert_eq!(account["email"], "ana@guaira.pr");
    assert_eq!(account["nome"], "Ana");
    assert!(account.get("senha_hash").is_none());

    let req = test::TestRequest::post()
        .uri("/api/auth?action=register")
        .set_json(json!({ "email": "ana@guaira.pr", "senha": "outra" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/auth?action=login")
        .set_json(json!({ "email": "ANA@guaira.pr", "senha": "segredo" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let logged: Value = test::read_body_json(resp).await;
    assert_eq!(logged["id"], account["id"]);
    assert_eq!(logged["is_admin"], false);

    let req = test::TestRequest::post()
        .uri("/api/auth?action=login")
        .set_json(json!({ "email": "ana@guaira.pr", "senha": "errada" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/auth?action=login")
        .set_json(json!({ "email": "ana@guaira.pr" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post().uri("/api/auth").set_json(json!({})).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn admin_manages_accounts_and_sees_stats() {
    let app = test_app!();

    let mut ids = Vec::new();
    for email in ["ana@guaira.pr", "beto@guaira.pr"] {
        let req = test::TestRequest::post()
            .uri("/api/auth?action=register")
            .set_json(json!({ "email": email, "senha": "segredo" }))
            .to_request();
        let account: Value = test::call_and_read_body_json(&app, req).await;
        ids.push(account["id"].as_str().unwrap().to_string());
    }

    let req = test::TestRequest::get().uri("/api/admin?action=usuarios").to_request();
    let users: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(users.as_array().unwrap().len(), 2);
    assert!(users[0].get("senha_hash").is_none());

    let req = test::TestRequest::patch()
        .uri(&format!("/api/admin?action=toggle_admin&id={}", ids[0]))
        .insert_header(("X-Admin-Id", common::ADMIN_ID))
        .to_request();
    let toggled: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(toggled["is_admin"], true);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/admin?action=usuario&id={}", ids[1]))
        .insert_header(("X-Admin-Id", common::ADMIN_ID))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/admin?action=usuario&id={}", ids[1]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/api/empresas")
        .set_json(json!({ "nome": "Farmácia Popular" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::get().uri("/api/admin?action=stats").to_request();
    let stats: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(stats["total_usuarios"], 1);
    assert_eq!(stats["total_admins"], 1);
    assert_eq!(stats["total_empresas"], 1);
    assert_eq!(stats["empresas_pendentes"], 1);
    assert_eq!(stats["empresas_ativas"], 0);
    assert_eq!(stats["total_posts"], 0);

    let req = test::TestRequest::get().uri("/api/admin?action=logs&limit=1").to_request();
    let logs: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(logs.as_array().unwrap().len(), 1);
    assert_eq!(logs[0]["acao"], "excluir_usuario");

    let req = test::TestRequest::get().uri("/api/admin?action=desconhecida").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn log_entries_can_be_appended_directly() {
    let app = test_app!();

    let req = test::TestRequest::post()
        .uri("/api/admin")
        .set_json(json!({
            "admin_id": common::ADMIN_ID,
            "acao": "aprovar_empresa",
            "entidade_tipo": "empresa",
            "entidade_id": "abc",
            "detalhes": "Aprovada pelo painel",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/admin")
        .set_json(json!({ "admin_id": common::ADMIN_ID, "entidade_tipo": "empresa" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get().uri("/api/admin?action=logs").to_request();
    let logs: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(logs.as_array().unwrap().len(), 1);
    assert_eq!(logs[0]["detalhes"], "Aprovada pelo painel");
}
