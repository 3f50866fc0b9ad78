use actix_multipart::Multipart;
use actix_web::{post, web, HttpResponse};
use futures::TryStreamExt;
use std::env;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

const ALLOWED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// POST /api/upload - Upload d'une image (multipart)
/// Accessible sans session: les vendeurs anonymes ajoutent aussi des photos
/// Le fichier est stocké sous UPLOAD_DIR avec un nom UUID, servi via /uploads
#[post("")]
pub async fn upload_image(mut payload: Multipart) -> HttpResponse {
    let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "public/uploads".to_string());

    while let Ok(Some(mut field)) = payload.try_next().await {
        // 1. Nom de fichier original → extension
        let original_name = match field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
        {
            Some(name) => name.to_string(),
            None => continue, // champ texte, pas un fichier
        };

        let extension = Path::new(&original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        let extension = match extension {
            Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => ext,
            _ => {
                return HttpResponse::BadRequest().json(serde_json::json!({
                    "error": "Invalid file type. Allowed: jpg, jpeg, png, gif, webp"
                }));
            }
        };

        // 2. Nom unique sur le disque
        let filename = format!("{}.{}", Uuid::new_v4(), extension);
        let filepath = format!("{}/{}", upload_dir, filename);

        // 3. Écrire les chunks
        let mut file = match tokio::fs::File::create(&filepath).await {
            Ok(file) => file,
            Err(e) => {
                return HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": format!("Failed to store file: {}", e)
                }));
            }
        };

        while let Ok(Some(chunk)) = field.try_next().await {
            if let Err(e) = file.write_all(&chunk).await {
                return HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": format!("Failed to store file: {}", e)
                }));
            }
        }

        // Un seul fichier par requête
        return HttpResponse::Created().json(serde_json::json!({
            "url": format!("/uploads/{}", filename)
        }));
    }

    HttpResponse::BadRequest().json(serde_json::json!({
        "error": "No file field in request"
    }))
}

pub fn upload_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/upload")
            .service(upload_image)
    );
}
