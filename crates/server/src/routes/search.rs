use actix_web::{post, web, HttpRequest, HttpResponse};

use crate::auth::bearer_token;
use crate::error::ApiResult;
use crate::state::AppState;

/// Rank a remote table against a query text
#[post("/search")]
pub async fn search(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<std::sync::Arc<AppState>>,
) -> ApiResult<HttpResponse> {
    let matches = state.search.handle(bearer_token(&req), &body).await?;
    Ok(HttpResponse::Ok().json(matches))
}

#[cfg(test)]
mod tests {
    use crate::routes::configure;
    use crate::test_support::{serve_table, test_state, EMOTIONS_TABLE, TOKEN};
    use crate::types::ErrorResponse;
    use actix_web::http::header::AUTHORIZATION;
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App};
    use serde_json::json;

    #[actix_web::test]
    async fn test_search_returns_ranked_matches() {
        let scratch = tempfile::tempdir().unwrap();
        let base = serve_table(EMOTIONS_TABLE).await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_state(&base, scratch.path())))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/search")
            .insert_header((AUTHORIZATION, format!("Bearer {}", TOKEN)))
            .set_json(json!({"table_handle": "QmEmotions", "query_text": "sad", "limit": 2}))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body.as_array().unwrap().len(), 2);
        assert_eq!(body[0]["id"], "2");
        assert_eq!(body[0]["score"], 1.0);
    }

    #[actix_web::test]
    async fn test_search_unauthorized() {
        let scratch = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_state("http://127.0.0.1:9", scratch.path())))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/search")
            .set_json(json!({"table_handle": "QmEmotions", "query_text": "sad"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error, "unauthorized");
    }

    #[actix_web::test]
    async fn test_search_invalid_limit() {
        let scratch = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_state("http://127.0.0.1:9", scratch.path())))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/search")
            .insert_header((AUTHORIZATION, format!("Bearer {}", TOKEN)))
            .set_json(json!({"table_handle": "QmEmotions", "query_text": "sad", "limit": 0}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_search_remote_unavailable() {
        let scratch = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_state("http://127.0.0.1:9", scratch.path())))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/search")
            .insert_header((AUTHORIZATION, format!("Bearer {}", TOKEN)))
            .set_json(json!({"embeddings_file_hash": "QmEmotions", "text": "sad"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error, "remote_unavailable");
        assert!(body.message.contains("QmEmotions"));
        assert!(!body.message.contains("127.0.0.1"), "{}", body.message);
        assert!(std::fs::read_dir(scratch.path()).unwrap().next().is_none());
    }
}
