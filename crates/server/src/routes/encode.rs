use actix_multipart::Multipart;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{post, web, HttpRequest, HttpResponse};
use futures::StreamExt;
use simsearch_common::SimSearchError;
use simsearch_vector::{read_corpus, EmbeddingTable};
use tracing::info;

use crate::auth::bearer_token;
use crate::error::ApiResult;
use crate::state::AppState;
use crate::types::EncodeTextRequest;

/// Upper bound on an uploaded corpus
const MAX_CORPUS_BYTES: usize = 16 * 1024 * 1024;

/// Embed a single text
#[post("/encode")]
pub async fn encode(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<std::sync::Arc<AppState>>,
) -> ApiResult<HttpResponse> {
    state.search.auth().verify(bearer_token(&req))?;

    let request: EncodeTextRequest = serde_json::from_slice(&body)
        .map_err(|e| SimSearchError::invalid_request(format!("malformed request body: {}", e)))?;
    let text = request
        .text
        .ok_or_else(|| SimSearchError::invalid_request("'text' is required"))?;

    let vector = state.search.embedder().embed(&text).await?;
    Ok(HttpResponse::Ok().json(vector))
}

/// Embed an uploaded `id,text` CSV and return the `id,embedding` table
#[post("/encode_csv")]
pub async fn encode_csv(
    req: HttpRequest,
    mut payload: Multipart,
    state: web::Data<std::sync::Arc<AppState>>,
) -> ApiResult<HttpResponse> {
    state.search.auth().verify(bearer_token(&req))?;

    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = payload.next().await {
        let mut field = field.map_err(multipart_error)?;
        let disposition = field.content_disposition();
        if disposition.get_name() != Some("file") {
            continue;
        }

        let filename = disposition
            .get_filename()
            .and_then(|name| std::path::Path::new(name).file_name())
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        if !filename.to_lowercase().ends_with(".csv") {
            return Err(SimSearchError::invalid_request("file must be a .csv upload").into());
        }

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(multipart_error)?;
            if data.len() + chunk.len() > MAX_CORPUS_BYTES {
                return Err(SimSearchError::invalid_request("uploaded corpus is too large").into());
            }
            data.extend_from_slice(&chunk);
        }
        upload = Some((filename, data));
    }

    let (filename, data) = upload.ok_or_else(|| SimSearchError::invalid_request("no file uploaded"))?;

    let corpus = read_corpus(data.as_slice())?;
    let table = EmbeddingTable::build(&corpus, state.search.embedder().as_ref()).await?;
    let csv = table.to_csv_bytes()?;

    info!("Encoded {} ({} records)", filename, table.len());

    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(format!("embeddings_{}", filename))],
        })
        .body(csv))
}

fn multipart_error(e: actix_multipart::MultipartError) -> SimSearchError {
    SimSearchError::invalid_request(format!("malformed upload: {}", e))
}

#[cfg(test)]
mod tests {
    use crate::routes::configure;
    use crate::test_support::{test_state, TOKEN};
    use actix_web::http::header::{AUTHORIZATION, CONTENT_TYPE};
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App};
    use serde_json::json;
    use simsearch_vector::EmbeddingTable;

    const BOUNDARY: &str = "simsearch-boundary";

    fn multipart_body(filename: &str, content: &str) -> String {
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\nContent-Type: text/csv\r\n\r\n{c}\r\n--{b}--\r\n",
            b = BOUNDARY,
            f = filename,
            c = content
        )
    }

    #[actix_web::test]
    async fn test_encode_single_text() {
        let scratch = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_state("http://127.0.0.1:9", scratch.path())))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/encode")
            .insert_header((AUTHORIZATION, format!("Bearer {}", TOKEN)))
            .set_json(json!({"text": "angry"}))
            .to_request();
        let body: Vec<f32> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, vec![-1.0, 0.0]);
    }

    #[actix_web::test]
    async fn test_encode_requires_auth() {
        let scratch = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_state("http://127.0.0.1:9", scratch.path())))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/encode")
            .set_json(json!({"text": "angry"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_encode_csv_returns_table() {
        let scratch = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_state("http://127.0.0.1:9", scratch.path())))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/encode_csv")
            .insert_header((AUTHORIZATION, format!("Bearer {}", TOKEN)))
            .insert_header((CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY)))
            .set_payload(multipart_body("emotions.csv", "id,text\n1,happy\n2,sad\n3,angry"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = test::read_body(resp).await;
        let table = EmbeddingTable::load(body.as_ref()).unwrap();
        assert_eq!(table.ids().collect::<Vec<_>>(), vec!["1", "2", "3"]);
        assert_eq!(table.records()[2].vector, vec![-1.0, 0.0]);
    }

    #[actix_web::test]
    async fn test_encode_csv_duplicate_ids() {
        let scratch = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_state("http://127.0.0.1:9", scratch.path())))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/encode_csv")
            .insert_header((AUTHORIZATION, format!("Bearer {}", TOKEN)))
            .insert_header((CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY)))
            .set_payload(multipart_body("dup.csv", "id,text\n1,happy\n1,sad"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
