use std::path::{Component, Path, PathBuf};

use actix_multipart::{Field, Multipart};
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{get, post, web, HttpResponse};
use futures::TryStreamExt;
use log::{error, info, warn};
use serde::Serialize;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::ApiError;

const FILE_FIELD: &str = "file";

#[derive(Serialize, Debug)]
pub struct StoredFile {
    pub filename: String,
    pub originalname: Option<String>,
    pub mimetype: Option<String>,
    pub size: u64,
}

#[derive(Serialize)]
struct UploadResponse {
    message: &'static str,
    file: StoredFile,
}

/// Resolves `filename` inside `dir`, refusing anything that is not a single
/// plain path segment.
fn upload_path(dir: &Path, filename: &str) -> Option<PathBuf> {
    let mut components = Path::new(filename).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) => Some(dir.join(name)),
        _ => None,
    }
}

async fn write_field(field: &mut Field, path: &Path) -> Result<u64, ApiError> {
    let mut file = fs::File::create(path).await?;
    let mut size = 0u64;
    while let Some(chunk) = field.try_next().await? {
        file.write_all(&chunk).await?;
        size += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(size)
}

#[post("/files/upload")]
pub async fn upload_file(
    config: web::Data<AppConfig>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    info!("POST /files/upload");
    fs::create_dir_all(&config.upload_dir).await?;

    while let Some(mut field) = payload.try_next().await? {
        if field.name() != Some(FILE_FIELD) {
            while field.try_next().await?.is_some() {}
            continue;
        }

        let filename = Uuid::new_v4().simple().to_string();
        let path = config.upload_dir.join(&filename);
        let originalname = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_owned);
        let mimetype = field.content_type().map(|mime| mime.to_string());

        let size = match write_field(&mut field, &path).await {
            Ok(size) => size,
            Err(e) => {
                error!("File upload errored: {}", e);
                let _ = fs::remove_file(&path).await;
                return Err(e);
            }
        };

        let stored = StoredFile {
            filename,
            originalname,
            mimetype,
            size,
        };
        info!("File uploaded successfully: {:?}", stored);
        return Ok(HttpResponse::Ok().json(UploadResponse {
            message: "File uploaded successfully",
            file: stored,
        }));
    }

    Err(ApiError::validation("No file uploaded"))
}

#[get("/files/download/{filename}")]
pub async fn download_file(
    config: web::Data<AppConfig>,
    filename: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let filename = filename.into_inner();
    let path = upload_path(&config.upload_dir, &filename).ok_or(ApiError::FileNotFound)?;
    info!("File download started: {}", path.display());

    let file = match fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("File not found: {}", path.display());
            return Err(ApiError::FileNotFound);
        }
        Err(e) => return Err(e.into()),
    };
    if !file.metadata().await?.is_file() {
        warn!("Not a regular file: {}", path.display());
        return Err(ApiError::FileNotFound);
    }

    info!("File download streaming: {}", path.display());
    Ok(HttpResponse::Ok()
        .content_type("application/octet-stream")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(filename)],
        })
        .streaming(ReaderStream::new(file)))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(upload_file).service(download_file);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use actix_web::body::{BodySize, MessageBody};
    use actix_web::http::{header, StatusCode};
    use actix_web::{test, App};
    use serde_json::{json, Value};
    use tempfile::TempDir;

    use crate::configure_app;
    use crate::handlers::testing::{config_data, init_logging, store_data};
    use crate::store::MemoryStore;

    const BOUNDARY: &str = "----inventory-test-boundary";

    fn multipart_body(field: &str, filename: &str, content: &str) -> String {
        format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             {content}\r\n\
             --{BOUNDARY}--\r\n"
        )
    }

    fn upload_request(body: String) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/files/upload")
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(body)
    }

    fn config_in(dir: &TempDir) -> AppConfig {
        AppConfig {
            upload_dir: dir.path().to_path_buf(),
            ..AppConfig::default()
        }
    }

    #[actix_web::test]
    async fn upload_path_accepts_only_plain_names() {
        let dir = Path::new("/srv/uploads");
        assert_eq!(
            upload_path(dir, "abc123"),
            Some(PathBuf::from("/srv/uploads/abc123"))
        );
        for bad in ["../etc/passwd", "a/b", "..", ".", "/etc/passwd", ""] {
            assert_eq!(upload_path(dir, bad), None, "{bad} was accepted");
        }
    }

    #[actix_web::test]
    async fn upload_then_download() {
        init_logging();
        let dir = TempDir::new().unwrap();
        let store = Arc::new(MemoryStore::default());
        let app = test::init_service(
            App::new().configure(configure_app(store_data(&store), config_data(config_in(&dir)))),
        )
        .await;

        let req = upload_request(multipart_body("file", "testfile.txt", "test file content"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "File uploaded successfully");
        assert_eq!(body["file"]["originalname"], "testfile.txt");
        assert_eq!(body["file"]["size"], 17);
        let filename = body["file"]["filename"].as_str().unwrap().to_string();
        assert_eq!(filename.len(), 32);
        assert!(dir.path().join(&filename).exists());

        let req = test::TestRequest::get()
            .uri(&format!("/files/download/{filename}"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/octet-stream"
        );
        let bytes = test::read_body(resp).await;
        assert_eq!(&bytes[..], b"test file content");
    }

    #[actix_web::test]
    async fn upload_without_file_field_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(MemoryStore::default());
        let app = test::init_service(
            App::new().configure(configure_app(store_data(&store), config_data(config_in(&dir)))),
        )
        .await;

        let req = upload_request(multipart_body("attachment", "x.txt", "data")).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "message": "No file uploaded" }));
    }

    #[actix_web::test]
    async fn download_streams_large_files() {
        let dir = TempDir::new().unwrap();
        let content = vec![b'x'; 3 * 1024 * 1024];
        std::fs::write(dir.path().join("large.bin"), &content).unwrap();
        let store = Arc::new(MemoryStore::default());
        let app = test::init_service(
            App::new().configure(configure_app(store_data(&store), config_data(config_in(&dir)))),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/files/download/large.bin")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(matches!(resp.response().body().size(), BodySize::Stream));
        let bytes = test::read_body(resp).await;
        assert_eq!(bytes.len(), content.len());
    }

    #[actix_web::test]
    async fn download_of_missing_file_is_404() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(MemoryStore::default());
        let app = test::init_service(
            App::new().configure(configure_app(store_data(&store), config_data(config_in(&dir)))),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/files/download/does-not-exist")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "message": "File not found" }));

        std::fs::create_dir(dir.path().join("nested")).unwrap();
        let req = test::TestRequest::get().uri("/files/download/nested").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
