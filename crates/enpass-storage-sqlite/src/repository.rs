//! Data access layer

use crate::{models::RawRow, record::Record, Database, Result};
use enpass_params::FieldKind;
use rusqlite::named_params;

/// Item projection: one row per item with its first password and TOTP field
const ITEM_PROJECTION: &str = r#"
    SELECT i.title AS title,
           i.uuid AS uuid,
           i.key AS key,
           p.value AS password_value,
           p.hash AS password_value_hash,
           t.value AS totp_value,
           t.hash AS totp_value_hash
    FROM item i
    LEFT OUTER JOIN (
        SELECT item_uuid, value, hash, MIN(rowid)
        FROM itemfield
        WHERE type = :password
        GROUP BY item_uuid
    ) p ON p.item_uuid = i.uuid
    LEFT OUTER JOIN (
        SELECT item_uuid, value, hash, MIN(rowid)
        FROM itemfield
        WHERE type = :totp
        GROUP BY item_uuid
    ) t ON t.item_uuid = i.uuid
"#;

/// Title filter applied to projected rows
///
/// Titles are compared after Unicode lowercasing on both sides. SQLite's
/// `lower()` only folds ASCII, so matching happens here rather than in SQL
/// and caller names never reach the query text.
enum ItemFilter {
    All,
    TitleEquals(String),
    TitleContains(String),
}

impl ItemFilter {
    fn title_equals(name: &str) -> Self {
        ItemFilter::TitleEquals(name.to_lowercase())
    }

    fn title_contains(name: &str) -> Self {
        ItemFilter::TitleContains(name.to_lowercase())
    }

    fn matches(&self, title: &str) -> bool {
        match self {
            ItemFilter::All => true,
            ItemFilter::TitleEquals(name) => title.to_lowercase() == *name,
            ItemFilter::TitleContains(name) => title.to_lowercase().contains(name.as_str()),
        }
    }
}

/// Repository for vault queries
pub struct Repository<'a> {
    db: &'a Database,
}

impl<'a> Repository<'a> {
    /// Create repository
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// All live entries, in store order
    pub fn entries(&self) -> Result<Vec<Record>> {
        self.query(ItemFilter::All)
    }

    /// First live entry whose title equals `name`, ignoring case
    pub fn get_entry(&self, name: &str) -> Result<Option<Record>> {
        Ok(self.query(ItemFilter::title_equals(name))?.into_iter().next())
    }

    /// Live entries whose title contains `name`, ignoring case
    pub fn search_entries(&self, name: &str) -> Result<Vec<Record>> {
        self.query(ItemFilter::title_contains(name))
    }

    fn query(&self, filter: ItemFilter) -> Result<Vec<Record>> {
        let mut stmt = self.db.conn().prepare(ITEM_PROJECTION)?;
        let rows = stmt
            .query_map(
                named_params! {
                    ":password": FieldKind::Password.as_str(),
                    ":totp": FieldKind::Totp.as_str(),
                },
                RawRow::from_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let total = rows.len();
        let live: Vec<RawRow> = rows.into_iter().filter(RawRow::is_live).collect();
        tracing::debug!(
            "Loaded {} live items, skipped {} deleted",
            live.len(),
            total - live.len()
        );

        live.into_iter()
            .filter(|row| filter.matches(&row.title))
            .map(Record::from_raw)
            .collect()
    }
}
