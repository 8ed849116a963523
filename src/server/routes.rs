use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use super::{auth::AuthUser, error::ApiError, state::AppState};
use crate::database::db;
use crate::export::json::FlashcardExport;
use crate::models::{
    CreateFlashcard, Flashcard, FlashcardPage, ListFlashcards, ReviewSessionResponse,
    ReviewUpdateResponse, UpdateCardReview, UpdateFlashcard,
};

#[derive(Debug, Default, Deserialize)]
pub struct SessionQuery {
    limit: Option<u32>,
}

fn flashcard_not_found() -> ApiError {
    ApiError::NotFound("Flashcard not found or access denied.".to_string())
}

fn flashcard_id(path: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|_| ApiError::BadRequest("Flashcard ID must be a valid UUID.".to_string()))
}

/// `GET /review/session?limit=`: the due cards for one review session.
pub async fn review_session_handler(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    query: Result<Query<SessionQuery>, QueryRejection>,
) -> Result<Json<ReviewSessionResponse>, ApiError> {
    // An anonymous caller gets 401 whatever the query says
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) if user.is_some() => {
            return Err(ApiError::BadRequest(rejection.body_text()));
        }
        Err(_) => SessionQuery::default(),
    };

    let user_id = user.map(|u| u.0);
    let cards = state
        .with_db(move |conn| Ok(db::select_due_cards(conn, user_id, query.limit, Utc::now())?))
        .await?;

    Ok(Json(ReviewSessionResponse { cards }))
}

/// `POST /review/update`: applies the Leitner rule to one card.
pub async fn review_update_handler(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    body: Result<Json<UpdateCardReview>, JsonRejection>,
) -> Result<Json<ReviewUpdateResponse>, ApiError> {
    let Json(update) = body.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    let next = state
        .with_db(move |conn| {
            Ok(db::apply_review(conn, user_id, update.flashcard_id, update.knew_it, Utc::now())?)
        })
        .await?;

    Ok(Json(ReviewUpdateResponse {
        flashcard_id: update.flashcard_id,
        leitner_box: next.next_box,
        review_due_at: next.next_due_at,
    }))
}

pub async fn create_flashcard_handler(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    body: Result<Json<CreateFlashcard>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(command) = body.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    command
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let card = state
        .with_db(move |conn| Ok(db::create_flashcard(conn, user_id, &command, Utc::now())?))
        .await?;

    Ok((StatusCode::CREATED, Json(card)))
}

pub async fn list_flashcards_handler(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    query: Result<Query<ListFlashcards>, QueryRejection>,
) -> Result<Json<FlashcardPage>, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    query
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let page = state
        .with_db(move |conn| Ok(db::list_flashcards(conn, user_id, &query)?))
        .await?;
    Ok(Json(page))
}

pub async fn get_flashcard_handler(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Flashcard>, ApiError> {
    let id = flashcard_id(path)?;

    state
        .with_db(move |conn| Ok(db::get_flashcard(conn, user_id, id)?))
        .await?
        .map(Json)
        .ok_or_else(flashcard_not_found)
}

/// `PATCH /flashcards/{id}`: malformed JSON and bodies without a known field are 400,
/// field rule violations are 422.
pub async fn update_flashcard_handler(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Flashcard>, ApiError> {
    let id = flashcard_id(path)?;
    let Json(body) =
        body.map_err(|_| ApiError::BadRequest("Invalid JSON in request body.".to_string()))?;

    if !body.is_object() {
        return Err(ApiError::BadRequest("Request body must be a JSON object.".to_string()));
    }

    let update: UpdateFlashcard =
        serde_json::from_value(body).map_err(|e| ApiError::Unprocessable(e.to_string()))?;
    if update.is_empty() {
        return Err(ApiError::BadRequest(
            "Request body cannot be empty. Provide at least one field to update.".to_string(),
        ));
    }
    update
        .validate()
        .map_err(|e| ApiError::Unprocessable(e.to_string()))?;

    state
        .with_db(move |conn| Ok(db::update_flashcard(conn, user_id, id, &update, Utc::now())?))
        .await?
        .map(Json)
        .ok_or_else(flashcard_not_found)
}

pub async fn delete_flashcard_handler(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let id = flashcard_id(path)?;

    let deleted = state
        .with_db(move |conn| Ok(db::delete_flashcard(conn, user_id, id)?))
        .await?;
    if !deleted {
        return Err(flashcard_not_found());
    }

    Ok(Json(json!({ "message": "Flashcard deleted successfully." })))
}

pub async fn export_flashcards_handler(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<FlashcardExport>, ApiError> {
    let cards = state
        .with_db(move |conn| Ok(db::get_all_flashcards(conn, user_id)?))
        .await?;

    Ok(Json(FlashcardExport::from_flashcards(&cards, Utc::now())))
}

pub async fn import_flashcards_handler(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    body: Result<Json<FlashcardExport>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(export) = body.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    export.validate()?;

    let imported = state
        .with_db(move |conn| {
            Ok(db::import_flashcards(conn, user_id, &export.flashcards, Utc::now())?)
        })
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "importedCount": imported }))))
}
