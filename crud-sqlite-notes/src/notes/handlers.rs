use rusqlite::{ffi, named_params, params, Row};
use uuid::Uuid;

use crate::{
    db::{self, DB},
    Error, Result,
};

use super::{Note, WriteNote};

const MAX_SLUG_ATTEMPTS: usize = 3;

impl<'a> TryFrom<&Row<'a>> for Note {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'a>) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            slug: row.get(2)?,
            date: row.get(3)?,
            content: row.get(4)?,
            labels: row.get(5)?,
        })
    }
}

pub fn new_slug() -> String {
    format!("note-{}", Uuid::now_v7().simple())
}

fn is_unique_violation(error: &rusqlite::Error) -> bool {
    matches!(error, rusqlite::Error::SqliteFailure(e, _) if e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE)
}

pub async fn find_notes(db: DB) -> Result<Vec<Note>> {
    db.call(|conn| {
        let notes = conn
            .prepare("SELECT id, title, slug, date, content, labels FROM notes ORDER BY date DESC, id DESC")?
            .query_map([], |row| Note::try_from(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(notes)
    })
    .await
    .map_err(db::Error::from)
    .map_err(Error::from)
}

pub async fn get_note(db: DB, slug: String) -> Result<Note> {
    db.call(move |conn| {
        let note = conn.query_row(
            "SELECT id, title, slug, date, content, labels FROM notes WHERE slug = ?",
            params![slug],
            |row| Note::try_from(row),
        )?;
        Ok(note)
    })
    .await
    .map_err(db::Error::from)
    .map_err(|e| e.not_found_message("Note not found"))
    .map_err(Error::from)
}

/// Inserts a note and returns its slug. A slug taken by another note is
/// regenerated a bounded number of times.
pub async fn create_note(db: DB, note: WriteNote) -> Result<String> {
    insert_note(db, note, new_slug).await
}

async fn insert_note(db: DB, WriteNote { title, content, labels }: WriteNote, make_slug: fn() -> String) -> Result<String> {
    let slug = db
        .call(move |conn| {
            let date = chrono::Utc::now();
            let mut attempt = 0;
            loop {
                attempt += 1;
                let slug = make_slug();
                let inserted = conn.execute(
                    r#"INSERT INTO notes (title, slug, date, content, labels)
                    VALUES (:title, :slug, :date, :content, :labels)"#,
                    named_params! {
                        ":title": title,
                        ":slug": slug,
                        ":date": date,
                        ":content": content,
                        ":labels": labels,
                    },
                );
                match inserted {
                    Ok(_) => return Ok(slug),
                    Err(e) if is_unique_violation(&e) && attempt < MAX_SLUG_ATTEMPTS => {
                        tracing::warn!(slug = %slug, attempt, "slug already taken, retrying");
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        })
        .await
        .map_err(db::Error::from)?;

    tracing::debug!(slug = %slug, "note created");
    Ok(slug)
}

/// Zero matched rows is reported as not found.
pub async fn update_note(db: DB, slug: String, WriteNote { title, content, labels }: WriteNote) -> Result<Note> {
    db.call(move |conn| {
        conn.query_row(
            r#"UPDATE notes SET title = ?, content = ?, labels = ?
            WHERE slug = ?
            RETURNING id, title, slug, date, content, labels"#,
            params![title, content, labels, slug],
            |row| Note::try_from(row),
        )
        .map_err(|e| e.into())
    })
    .await
    .map_err(db::Error::from)
    .map_err(|e| e.not_found_message("Note not found"))
    .map_err(Error::from)
}

/// Deleting a missing note is not an error.
pub async fn delete_note(db: DB, slug: String) -> Result<()> {
    let deleted = db
        .call(move |conn| conn.execute("DELETE FROM notes WHERE slug = ?", params![slug]).map_err(|e| e.into()))
        .await
        .map_err(db::Error::from)?;

    tracing::debug!(deleted, "note deleted");
    Ok(())
}
