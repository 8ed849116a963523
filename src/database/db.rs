//! Database operations for the flashcard service
//!
//! Handles SQLite initialization, CRUD operations for flashcards, selection of the cards
//! due for review, and applying a review outcome to a card's Leitner box.
//!
//! Timestamps are stored as INTEGER unix milliseconds, identifiers as TEXT UUIDs.

use crate::models::{
    CreateFlashcard, Flashcard, FlashcardPage, LeitnerState, ListFlashcards, Pagination,
    ReviewCard, SchedulerError, UpdateFlashcard, compute_next_state,
    leitner::{MAX_BOX, MIN_BOX},
    review_data::{DEFAULT_SESSION_LIMIT, MAX_SESSION_LIMIT},
};
use chrono::{DateTime, SubsecRound, Utc};
use log::{debug, info};
use rusqlite::{Connection, OptionalExtension, Row, params, types::Type};
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error("Flashcard not found: {0}")]
    FlashcardNotFound(Uuid),
}

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Error, Debug)]
pub enum SelectorError {
    #[error("No authenticated user")]
    NotAuthenticated,

    #[error("Limit {0} is outside the range 1..=100")]
    InvalidLimit(u32),

    #[error(transparent)]
    Db(#[from] DbError),
}

const FLASHCARD_COLUMNS: &str = "id, user_id, front, back, part_of_speech, leitner_box, \
     review_due_at, created_at, updated_at";

/// Opens (or creates) the database file and makes sure the schema exists.
pub fn init_database(path: impl AsRef<Path>) -> Result<Connection> {
    let conn = Connection::open(path.as_ref())?;
    create_schema(&conn)?;
    info!("Database ready at {}", path.as_ref().display());
    Ok(conn)
}

/// In-memory database with the full schema, used by tests.
pub fn init_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    create_schema(&conn)?;
    Ok(conn)
}

fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS flashcards (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                front TEXT NOT NULL,
                back TEXT NOT NULL,
                part_of_speech TEXT,
                leitner_box INTEGER NOT NULL DEFAULT {MIN_BOX}
                    CHECK (leitner_box BETWEEN {MIN_BOX} AND {MAX_BOX}),
                review_due_at INTEGER NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )"
        ),
        (),
    )?;

    // Due-card lookups always filter by owner and due date
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_flashcards_user_due
         ON flashcards (user_id, review_due_at)",
        (),
    )?;

    Ok(())
}

fn to_millis(time: DateTime<Utc>) -> i64 {
    time.timestamp_millis()
}

/// Drops sub-millisecond digits so returned values match what a later read gives back.
fn stored_precision(time: DateTime<Utc>) -> DateTime<Utc> {
    time.trunc_subsecs(3)
}

fn uuid_column(row: &Row, idx: usize) -> rusqlite::Result<Uuid> {
    let text: String = row.get(idx)?;
    Uuid::parse_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn time_column(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let millis: i64 = row.get(idx)?;
    DateTime::from_timestamp_millis(millis)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, millis))
}

fn row_to_flashcard(row: &Row) -> rusqlite::Result<Flashcard> {
    Ok(Flashcard {
        id: uuid_column(row, 0)?,
        user_id: uuid_column(row, 1)?,
        front: row.get(2)?,
        back: row.get(3)?,
        part_of_speech: row.get(4)?,
        leitner_box: row.get(5)?,
        review_due_at: time_column(row, 6)?,
        created_at: time_column(row, 7)?,
        updated_at: time_column(row, 8)?,
    })
}

fn insert_flashcard(conn: &Connection, card: &Flashcard) -> Result<()> {
    conn.execute(
        "INSERT INTO flashcards (id, user_id, front, back, part_of_speech, leitner_box,
                                 review_due_at, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            card.id.to_string(),
            card.user_id.to_string(),
            card.front,
            card.back,
            card.part_of_speech,
            card.leitner_box,
            to_millis(card.review_due_at),
            to_millis(card.created_at),
            to_millis(card.updated_at),
        ],
    )?;
    Ok(())
}

/// Adds a flashcard for a user. New cards start in box 1 and are due immediately.
pub fn create_flashcard(
    conn: &Connection,
    user_id: Uuid,
    command: &CreateFlashcard,
    now: DateTime<Utc>,
) -> Result<Flashcard> {
    let now = stored_precision(now);
    let card = Flashcard::new(
        user_id,
        command.front.clone(),
        command.back.clone(),
        command.part_of_speech.clone(),
        now,
    );
    insert_flashcard(conn, &card)?;
    debug!("Flashcard {} created for user {}", card.id, user_id);
    Ok(card)
}

/// Adds many flashcards in one transaction. Either all of them are stored or none.
pub fn import_flashcards(
    conn: &Connection,
    user_id: Uuid,
    commands: &[CreateFlashcard],
    now: DateTime<Utc>,
) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    for command in commands {
        create_flashcard(&tx, user_id, command, now)?;
    }
    tx.commit()?;

    info!("Imported {} flashcards for user {}", commands.len(), user_id);
    Ok(commands.len())
}

/// Retrieves one flashcard. Cards of other users are reported as missing.
pub fn get_flashcard(conn: &Connection, user_id: Uuid, id: Uuid) -> Result<Option<Flashcard>> {
    let card = conn
        .query_row(
            &format!("SELECT {FLASHCARD_COLUMNS} FROM flashcards WHERE id = ?1 AND user_id = ?2"),
            params![id.to_string(), user_id.to_string()],
            row_to_flashcard,
        )
        .optional()?;
    Ok(card)
}

/// Retrieves every flashcard of a user, oldest first
pub fn get_all_flashcards(conn: &Connection, user_id: Uuid) -> Result<Vec<Flashcard>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {FLASHCARD_COLUMNS} FROM flashcards
         WHERE user_id = ?1
         ORDER BY created_at ASC, id ASC"
    ))?;

    let flashcards = stmt
        .query_map(params![user_id.to_string()], row_to_flashcard)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(flashcards)
}

/// Counts all stored flashcards, across users
pub fn count_flashcards(conn: &Connection) -> Result<u64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM flashcards", [], |row| row.get(0))?;
    Ok(count as u64)
}

/// Retrieves one page of a user's flashcards in the requested order
///
/// The query is expected to be validated already.
pub fn list_flashcards(
    conn: &Connection,
    user_id: Uuid,
    query: &ListFlashcards,
) -> Result<FlashcardPage> {
    let total_items: i64 = conn.query_row(
        "SELECT COUNT(*) FROM flashcards WHERE user_id = ?1",
        params![user_id.to_string()],
        |row| row.get(0),
    )?;

    // Column and direction come from enums, never from raw user input
    let mut stmt = conn.prepare(&format!(
        "SELECT {FLASHCARD_COLUMNS} FROM flashcards
         WHERE user_id = ?1
         ORDER BY {} {}, id ASC
         LIMIT ?2 OFFSET ?3",
        query.sort_by.column(),
        query.order.keyword(),
    ))?;

    let data = stmt
        .query_map(
            params![user_id.to_string(), query.page_size, query.offset()],
            row_to_flashcard,
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(FlashcardPage {
        data,
        pagination: Pagination::new(query.page, query.page_size, total_items as u64),
    })
}

/// Applies a partial edit to a flashcard. Returns `None` if the user has no such card.
pub fn update_flashcard(
    conn: &Connection,
    user_id: Uuid,
    id: Uuid,
    update: &UpdateFlashcard,
    now: DateTime<Utc>,
) -> Result<Option<Flashcard>> {
    let now = stored_precision(now);
    let tx = conn.unchecked_transaction()?;

    let Some(mut card) = get_flashcard(&tx, user_id, id)? else {
        return Ok(None);
    };

    if let Some(front) = &update.front {
        card.front = front.clone();
    }
    if let Some(back) = &update.back {
        card.back = back.clone();
    }
    if let Some(part_of_speech) = &update.part_of_speech {
        card.part_of_speech = part_of_speech.clone();
    }
    card.updated_at = now;

    tx.execute(
        "UPDATE flashcards
         SET front = ?1, back = ?2, part_of_speech = ?3, updated_at = ?4
         WHERE id = ?5 AND user_id = ?6",
        params![
            card.front,
            card.back,
            card.part_of_speech,
            to_millis(now),
            id.to_string(),
            user_id.to_string(),
        ],
    )?;
    tx.commit()?;

    Ok(Some(card))
}

/// Deletes a flashcard. Returns false if the user has no such card.
pub fn delete_flashcard(conn: &Connection, user_id: Uuid, id: Uuid) -> Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM flashcards WHERE id = ?1 AND user_id = ?2",
        params![id.to_string(), user_id.to_string()],
    )?;
    Ok(deleted > 0)
}

/// Retrieves the cards a user should review now
///
/// Returns at most `limit` cards (default 50, allowed 1..=100) whose `review_due_at`
/// is not after `now`, ordered by `review_due_at` (oldest first) and then by id.
pub fn select_due_cards(
    conn: &Connection,
    user_id: Option<Uuid>,
    limit: Option<u32>,
    now: DateTime<Utc>,
) -> std::result::Result<Vec<ReviewCard>, SelectorError> {
    let user_id = user_id.ok_or(SelectorError::NotAuthenticated)?;
    let limit = limit.unwrap_or(DEFAULT_SESSION_LIMIT);
    if !(1..=MAX_SESSION_LIMIT).contains(&limit) {
        return Err(SelectorError::InvalidLimit(limit));
    }

    let mut stmt = conn
        .prepare(&format!(
            "SELECT {FLASHCARD_COLUMNS} FROM flashcards
             WHERE user_id = ?1 AND review_due_at <= ?2
             ORDER BY review_due_at ASC, id ASC
             LIMIT ?3"
        ))
        .map_err(DbError::from)?;

    let cards = stmt
        .query_map(
            params![user_id.to_string(), to_millis(now), limit],
            row_to_flashcard,
        )
        .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
        .map_err(DbError::from)?;

    Ok(cards.into_iter().map(ReviewCard::from).collect())
}

/// Records a review: moves the card to its next Leitner box and due date
///
/// Reading the current box and writing the new one happen in a single transaction.
pub fn apply_review(
    conn: &Connection,
    user_id: Uuid,
    flashcard_id: Uuid,
    knew_it: bool,
    now: DateTime<Utc>,
) -> Result<LeitnerState> {
    let now = stored_precision(now);
    let tx = conn.unchecked_transaction()?;

    let current_box: i32 = tx
        .query_row(
            "SELECT leitner_box FROM flashcards WHERE id = ?1 AND user_id = ?2",
            params![flashcard_id.to_string(), user_id.to_string()],
            |row| row.get(0),
        )
        .optional()?
        .ok_or(DbError::FlashcardNotFound(flashcard_id))?;

    let next = compute_next_state(current_box, knew_it, now)?;

    tx.execute(
        "UPDATE flashcards
         SET leitner_box = ?1, review_due_at = ?2, updated_at = ?3
         WHERE id = ?4 AND user_id = ?5",
        params![
            next.next_box,
            to_millis(next.next_due_at),
            to_millis(now),
            flashcard_id.to_string(),
            user_id.to_string(),
        ],
    )?;
    tx.commit()?;

    info!(
        "Review of {} applied: box {} -> {}, due {}",
        flashcard_id, current_box, next.next_box, next.next_due_at
    );
    Ok(next)
}
