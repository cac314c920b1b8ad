//! SQLite-backed local record store and document catalog.
//!
//! Provides persistent storage for:
//! - Reconciled alerts, experts, news articles and projects, one table each
//! - Document catalog entries with their stable identifiers

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DatabaseError, Result};
use crate::reconcile::{
    AlertRecord, DocumentDescriptor, ExpertRecord, LocalRecord, LocalRecordKind, NewsRecord,
    ProjectRecord,
};

use super::{data_dir, migrations, DocumentCatalog, RecordStore, UpsertOutcome};

/// A document as known to the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub remote_id: i64,
    pub uuid: Uuid,
    pub title: Option<String>,
    pub thumbnail_url: Option<String>,
    pub original_format_url: Option<String>,
    pub descriptor: DocumentDescriptor,
    pub updated_at: DateTime<Utc>,
}

/// SQLite database holding everything the harvester writes locally.
pub struct Database {
    conn: Connection,
}

fn table(kind: LocalRecordKind) -> &'static str {
    match kind {
        LocalRecordKind::Alert => "alerts",
        LocalRecordKind::Expert => "experts",
        LocalRecordKind::News => "news",
        LocalRecordKind::Project => "projects",
    }
}

fn stored_date(text: Option<String>) -> Option<DateTime<Utc>> {
    text.and_then(|t| DateTime::parse_from_rfc3339(&t).ok())
        .map(|d| d.with_timezone(&Utc))
}

fn corrupt(what: &str, remote_id: i64, err: impl std::fmt::Display) -> DatabaseError {
    DatabaseError::QueryFailed(format!("corrupt {what} for document {remote_id}: {err}"))
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/pdn-harvester/harvester.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("harvester.db");
        Ok(Self::open_at(&path)?)
    }

    /// Open (or create) the database file at `path`.
    pub fn open_at(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, DatabaseError> {
        migrations::migrate(&conn).map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Number of stored records of `kind`.
    pub fn count(&self, kind: LocalRecordKind) -> Result<u64, DatabaseError> {
        let n: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", table(kind)),
            [],
            |row| row.get(0),
        )?;
        Ok(n as u64)
    }

    /// Number of documents in the catalog.
    pub fn catalog_len(&self) -> Result<u64, DatabaseError> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM document_catalog", [], |row| row.get(0))?;
        Ok(n as u64)
    }

    fn exists(conn: &Connection, table: &str, remote_id: i64) -> rusqlite::Result<bool> {
        conn.query_row(
            &format!("SELECT 1 FROM {table} WHERE remote_id = ?1"),
            [remote_id],
            |_| Ok(()),
        )
        .optional()
        .map(|found| found.is_some())
    }
}

impl RecordStore for Database {
    fn upsert(&self, record: &LocalRecord) -> Result<UpsertOutcome, DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        let existed = Self::exists(&tx, table(record.kind()), record.remote_id())?;

        match record {
            LocalRecord::Alert(r) => tx.execute(
                "INSERT INTO alerts (remote_id, content, countries, date_received, ignored, subject, uuid, source_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(remote_id) DO UPDATE SET
                    content = excluded.content,
                    countries = excluded.countries,
                    date_received = excluded.date_received,
                    ignored = excluded.ignored,
                    subject = excluded.subject,
                    uuid = excluded.uuid,
                    source_id = excluded.source_id",
                params![
                    r.remote_id,
                    r.content,
                    r.countries,
                    r.date_received.map(|d| d.to_rfc3339()),
                    r.ignore,
                    r.subject,
                    r.uuid,
                    r.source_id,
                ],
            )?,
            LocalRecord::Expert(r) => tx.execute(
                "INSERT INTO experts (remote_id, name, title, country, country_code, email, ministry, country_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(remote_id) DO UPDATE SET
                    name = excluded.name,
                    title = excluded.title,
                    country = excluded.country,
                    country_code = excluded.country_code,
                    email = excluded.email,
                    ministry = excluded.ministry,
                    country_id = excluded.country_id",
                params![
                    r.remote_id,
                    r.name,
                    r.title,
                    r.country,
                    r.country_code,
                    r.email,
                    r.ministry,
                    r.country_id,
                ],
            )?,
            LocalRecord::News(r) => tx.execute(
                "INSERT INTO news (remote_id, source_id, title, url, country, country_code, date, source)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(remote_id) DO UPDATE SET
                    source_id = excluded.source_id,
                    title = excluded.title,
                    url = excluded.url,
                    country = excluded.country,
                    country_code = excluded.country_code,
                    date = excluded.date,
                    source = excluded.source",
                params![
                    r.remote_id,
                    r.source_id,
                    r.title,
                    r.url,
                    r.country,
                    r.country_code,
                    r.date.map(|d| d.to_rfc3339()),
                    r.source,
                ],
            )?,
            LocalRecord::Project(r) => tx.execute(
                "INSERT INTO projects (remote_id, name, acronym, description, logo_url, url, active)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(remote_id) DO UPDATE SET
                    name = excluded.name,
                    acronym = excluded.acronym,
                    description = excluded.description,
                    logo_url = excluded.logo_url,
                    url = excluded.url,
                    active = excluded.active",
                params![
                    r.remote_id,
                    r.name,
                    r.acronym,
                    r.description,
                    r.logo_url,
                    r.url,
                    r.active,
                ],
            )?,
        };

        tx.commit()?;
        Ok(if existed {
            UpsertOutcome::Updated
        } else {
            UpsertOutcome::Created
        })
    }

    fn find(
        &self,
        kind: LocalRecordKind,
        remote_id: i64,
    ) -> Result<Option<LocalRecord>, DatabaseError> {
        let record = match kind {
            LocalRecordKind::Alert => self
                .conn
                .query_row(
                    "SELECT remote_id, content, countries, date_received, ignored, subject, uuid, source_id
                     FROM alerts WHERE remote_id = ?1",
                    [remote_id],
                    |row| {
                        Ok(LocalRecord::Alert(AlertRecord {
                            remote_id: row.get(0)?,
                            content: row.get(1)?,
                            countries: row.get(2)?,
                            date_received: stored_date(row.get(3)?),
                            ignore: row.get(4)?,
                            subject: row.get(5)?,
                            uuid: row.get(6)?,
                            source_id: row.get(7)?,
                        }))
                    },
                )
                .optional()?,
            LocalRecordKind::Expert => self
                .conn
                .query_row(
                    "SELECT remote_id, name, title, country, country_code, email, ministry, country_id
                     FROM experts WHERE remote_id = ?1",
                    [remote_id],
                    |row| {
                        Ok(LocalRecord::Expert(ExpertRecord {
                            remote_id: row.get(0)?,
                            name: row.get(1)?,
                            title: row.get(2)?,
                            country: row.get(3)?,
                            country_code: row.get(4)?,
                            email: row.get(5)?,
                            ministry: row.get(6)?,
                            country_id: row.get(7)?,
                        }))
                    },
                )
                .optional()?,
            LocalRecordKind::News => self
                .conn
                .query_row(
                    "SELECT remote_id, source_id, title, url, country, country_code, date, source
                     FROM news WHERE remote_id = ?1",
                    [remote_id],
                    |row| {
                        Ok(LocalRecord::News(NewsRecord {
                            remote_id: row.get(0)?,
                            source_id: row.get(1)?,
                            title: row.get(2)?,
                            url: row.get(3)?,
                            country: row.get(4)?,
                            country_code: row.get(5)?,
                            date: stored_date(row.get(6)?),
                            source: row.get(7)?,
                        }))
                    },
                )
                .optional()?,
            LocalRecordKind::Project => self
                .conn
                .query_row(
                    "SELECT remote_id, name, acronym, description, logo_url, url, active
                     FROM projects WHERE remote_id = ?1",
                    [remote_id],
                    |row| {
                        Ok(LocalRecord::Project(ProjectRecord {
                            remote_id: row.get(0)?,
                            name: row.get(1)?,
                            acronym: row.get(2)?,
                            description: row.get(3)?,
                            logo_url: row.get(4)?,
                            url: row.get(5)?,
                            active: row.get(6)?,
                        }))
                    },
                )
                .optional()?,
        };
        Ok(record)
    }

    fn delete(&self, kind: LocalRecordKind, remote_id: i64) -> Result<bool, DatabaseError> {
        let removed = self.conn.execute(
            &format!("DELETE FROM {} WHERE remote_id = ?1", table(kind)),
            [remote_id],
        )?;
        Ok(removed > 0)
    }
}

impl DocumentCatalog for Database {
    fn find_uuid(&self, remote_id: i64) -> Result<Option<Uuid>, DatabaseError> {
        let uuid: Option<String> = self
            .conn
            .query_row(
                "SELECT uuid FROM document_catalog WHERE remote_id = ?1",
                [remote_id],
                |row| row.get(0),
            )
            .optional()?;
        uuid.map(|u| Uuid::parse_str(&u).map_err(|e| corrupt("uuid", remote_id, e)))
            .transpose()
    }

    fn save_descriptor(
        &self,
        remote_id: i64,
        descriptor: &DocumentDescriptor,
    ) -> Result<UpsertOutcome, DatabaseError> {
        let json = serde_json::to_string(descriptor)
            .map_err(|e| DatabaseError::QueryFailed(format!("cannot encode descriptor: {e}")))?;

        let tx = self.conn.unchecked_transaction()?;
        let existed = Self::exists(&tx, "document_catalog", remote_id)?;
        tx.execute(
            "INSERT INTO document_catalog (remote_id, uuid, title, thumbnail_url, original_format_url, descriptor, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(remote_id) DO UPDATE SET
                uuid = excluded.uuid,
                title = excluded.title,
                thumbnail_url = excluded.thumbnail_url,
                original_format_url = excluded.original_format_url,
                descriptor = excluded.descriptor,
                updated_at = excluded.updated_at",
            params![
                remote_id,
                descriptor.uuid.to_string(),
                descriptor.identification.title,
                descriptor.distribution.thumbnail_url,
                descriptor.distribution.original_format_url,
                json,
                Utc::now().to_rfc3339(),
            ],
        )?;
        tx.commit()?;

        Ok(if existed {
            UpsertOutcome::Updated
        } else {
            UpsertOutcome::Created
        })
    }

    fn catalog_entry(&self, remote_id: i64) -> Result<Option<CatalogEntry>, DatabaseError> {
        let row = self
            .conn
            .query_row(
                "SELECT uuid, title, thumbnail_url, original_format_url, descriptor, updated_at
                 FROM document_catalog WHERE remote_id = ?1",
                [remote_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, String>(5)?,
                    ))
                },
            )
            .optional()?;

        let Some((uuid, title, thumbnail_url, original_format_url, descriptor, updated_at)) = row
        else {
            return Ok(None);
        };

        Ok(Some(CatalogEntry {
            remote_id,
            uuid: Uuid::parse_str(&uuid).map_err(|e| corrupt("uuid", remote_id, e))?,
            title,
            thumbnail_url,
            original_format_url,
            descriptor: serde_json::from_str(&descriptor)
                .map_err(|e| corrupt("descriptor", remote_id, e))?,
            updated_at: stored_date(Some(updated_at.clone()))
                .ok_or_else(|| corrupt("timestamp", remote_id, updated_at))?,
        }))
    }

    fn remove_entry(&self, remote_id: i64) -> Result<bool, DatabaseError> {
        let removed = self.conn.execute(
            "DELETE FROM document_catalog WHERE remote_id = ?1",
            [remote_id],
        )?;
        Ok(removed > 0)
    }
}
