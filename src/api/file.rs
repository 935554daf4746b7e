use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rocket::{
    delete,
    form::{Form, FromForm},
    fs::TempFile,
    get, post, routes,
    serde::json::Json,
    tokio::io::AsyncReadExt,
    Route,
};
use rocket_okapi::{
    okapi::openapi3::OpenApi, openapi, openapi_get_routes_spec, settings::OpenApiSettings,
};
use schemars::JsonSchema;
use serde::Deserialize;

use crate::{
    api::MessageResponse,
    auth::AdminUser,
    db::{
        models::{ChatbotFile, NewChatbotFile},
        services::FileDbService,
        DbConnection,
    },
    errors::ApiError,
};

const DEFAULT_FILE_TYPE: &str = "application/octet-stream";

pub fn get_routes(settings: &OpenApiSettings) -> (Vec<Route>, OpenApi) {
    openapi_get_routes_spec![settings: get_all_files, delete_files]
}

/// Undocumented file routes: multipart upload
pub fn get_undocumented_routes() -> Vec<Route> {
    routes![upload_files]
}

/// List all uploaded files (without their content)
#[openapi(tag = "Files")]
#[get("/")]
async fn get_all_files(
    _admin: AdminUser,
    mut db: DbConnection,
) -> Result<Json<Vec<ChatbotFile>>, ApiError> {
    let files = FileDbService::new(&mut db).find_all().await?;

    Ok(Json(files))
}

#[derive(FromForm)]
struct FileUpload<'r> {
    files: Vec<TempFile<'r>>,
}

/// Upload files (multipart field `files`, repeatable). Files are stored unattached.
#[post("/", data = "<upload>")]
async fn upload_files(
    _admin: AdminUser,
    mut db: DbConnection,
    upload: Form<FileUpload<'_>>,
) -> Result<Json<Vec<ChatbotFile>>, ApiError> {
    if upload.files.is_empty() {
        return Err(ApiError::BadRequest("No files uploaded".to_owned()));
    }

    let mut saved = Vec::with_capacity(upload.files.len());
    for file in upload.files.iter() {
        let file_name = file
            .raw_name()
            .map(|name| name.dangerous_unsafe_unsanitized_raw().as_str().to_owned())
            .or_else(|| file.name().map(str::to_owned))
            .unwrap_or_else(|| "upload".to_owned());
        let file_type = file
            .content_type()
            .map(|content_type| content_type.to_string())
            .unwrap_or_else(|| DEFAULT_FILE_TYPE.to_owned());
        let file_size = i32::try_from(file.len())
            .map_err(|_| ApiError::BadRequest(format!("File too large: {}", file_name)))?;
        let content = read_file(file).await?;

        let created = FileDbService::new(&mut db)
            .create(NewChatbotFile {
                chatbot_id: None,
                file_name: &file_name,
                file_type: &file_type,
                file_content: &BASE64.encode(&content),
                file_size,
            })
            .await?;
        saved.push(created);
    }
    rocket::info!("Uploaded {} files", saved.len());

    Ok(Json(saved))
}

async fn read_file(file: &TempFile<'_>) -> Result<Vec<u8>, ApiError> {
    let mut reader = Box::pin(
        file.open()
            .await
            .map_err(|e| ApiError::Server(format!("Couldn't open upload: {}", e)))?,
    );
    let mut content = Vec::new();
    reader
        .read_to_end(&mut content)
        .await
        .map_err(|e| ApiError::Server(format!("Couldn't read upload: {}", e)))?;

    Ok(content)
}

#[derive(JsonSchema, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileDeleteInput {
    file_ids: Vec<i32>,
}

/// Delete files by ID
#[openapi(tag = "Files")]
#[delete("/", data = "<input>")]
async fn delete_files(
    _admin: AdminUser,
    mut db: DbConnection,
    input: Json<FileDeleteInput>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = FileDbService::new(&mut db).delete_many(&input.file_ids).await?;
    rocket::info!("Deleted {} files", deleted.len());

    Ok(Json(MessageResponse::new("Files deleted successfully")))
}
