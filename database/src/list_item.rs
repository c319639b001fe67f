use crate::{Database, DatabaseResult};
use rusqlite::{params, Row};
use std::convert::TryFrom;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct ListItem {
    pub id: i64,
    pub body: String,
    pub done: bool,
    pub list_id: i64,
}

impl ListItem {
    fn new(id: i64, body: String, done: bool, list_id: i64) -> Self {
        Self {
            id,
            body,
            done,
            list_id,
        }
    }
}

impl<'a> TryFrom<&Row<'a>> for ListItem {
    type Error = rusqlite::Error;
    fn try_from(row: &Row<'a>) -> Result<Self, Self::Error> {
        let id = row.get(0)?;
        let body: String = row.get(1)?;
        let done = row.get(2)?;
        let list_id = row.get(3)?;

        Ok(ListItem::new(id, body, done, list_id))
    }
}

impl Database<ListItem> {
    pub fn insert_list_item(&self, list_id: i64, body: &str) -> DatabaseResult<i64> {
        let db = self.get_connection()?;

        db.execute(
            "INSERT INTO list_items (body, done, list_id) VALUES (?1, 0, ?2)",
            params![body, list_id],
        )?;

        Ok(db.last_insert_rowid())
    }

    pub fn get_list_items(&self, list_id: i64) -> DatabaseResult<Vec<ListItem>> {
        let db = self.get_connection()?;

        let mut stmt = db.prepare(
            "SELECT id, body, done, list_id FROM list_items WHERE list_id = ?1 ORDER BY id",
        )?;

        let item_rows: Vec<_> = stmt
            .query_map(params![list_id], |row| crate::parse_from_row(row))?
            .collect::<Result<_, _>>()?;

        Ok(item_rows)
    }

    /// Looks up an item by id, scoped to the author of its parent list.
    /// Missing item and foreign item are indistinguishable to the caller.
    pub fn get_owned_list_item(
        &self,
        item_id: i64,
        author_id: i64,
    ) -> DatabaseResult<Option<ListItem>> {
        let db = self.get_connection()?;

        let mut stmt = db.prepare(
            "SELECT list_items.id, list_items.body, list_items.done, list_items.list_id \
             FROM list_items JOIN lists ON list_items.list_id = lists.id \
             WHERE list_items.id = ?1 AND lists.author_id = ?2",
        )?;

        let mut item_rows: Vec<_> = stmt
            .query_map(params![item_id, author_id], |row| {
                crate::parse_from_row(row)
            })?
            .collect::<Result<_, _>>()?;

        if item_rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(item_rows.swap_remove(0)))
        }
    }

    pub fn update_list_item_body(&self, item_id: i64, body: &str) -> DatabaseResult<bool> {
        let db = self.get_connection()?;

        let changed_rows = db.execute(
            "UPDATE list_items SET body = ?1 WHERE id = ?2",
            params![body, item_id],
        )?;

        Ok(changed_rows == 1)
    }

    pub fn set_list_item_done(&self, item_id: i64, done: bool) -> DatabaseResult<bool> {
        let db = self.get_connection()?;

        let changed_rows = db.execute(
            "UPDATE list_items SET done = ?1 WHERE id = ?2",
            params![done, item_id],
        )?;

        Ok(changed_rows == 1)
    }

    pub fn delete_list_item(&self, item_id: i64) -> DatabaseResult<bool> {
        let db = self.get_connection()?;

        let changed_rows =
            db.execute("DELETE FROM list_items WHERE id = ?1", params![item_id])?;

        Ok(changed_rows == 1)
    }
}
