use crate::{Database, DatabaseResult};
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Row};
use std::convert::TryFrom;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct List {
    pub id: i64,
    pub name: String,
    pub created_s: i64,
    pub done: bool,
    pub author_id: i64,
}

impl List {
    fn new(id: i64, name: String, created_s: i64, done: bool, author_id: i64) -> Self {
        Self {
            id,
            name,
            created_s,
            done,
            author_id,
        }
    }

    pub fn created_utc(&self) -> DateTime<Utc> {
        chrono::Utc.timestamp(self.created_s, 0)
    }
}

impl<'a> TryFrom<&Row<'a>> for List {
    type Error = rusqlite::Error;
    fn try_from(row: &Row<'a>) -> Result<Self, Self::Error> {
        let id = row.get(0)?;
        let name: String = row.get(1)?;
        let created_s = row.get(2)?;
        let done = row.get(3)?;
        let author_id = row.get(4)?;

        Ok(List::new(id, name, created_s, done, author_id))
    }
}

impl Database<List> {
    pub fn insert_list(&self, name: &str, author_id: i64, created_s: i64) -> DatabaseResult<i64> {
        let db = self.get_connection()?;

        db.execute(
            "INSERT INTO lists (name, created_s, done, author_id) VALUES (?1, ?2, 0, ?3)",
            params![name, created_s, author_id],
        )?;

        Ok(db.last_insert_rowid())
    }

    pub fn get_lists_by_author(&self, author_id: i64) -> DatabaseResult<Vec<List>> {
        let db = self.get_connection()?;

        let mut stmt = db.prepare(
            "SELECT id, name, created_s, done, author_id FROM lists WHERE author_id = ?1 ORDER BY id",
        )?;

        let list_rows: Vec<_> = stmt
            .query_map(params![author_id], |row| crate::parse_from_row(row))?
            .collect::<Result<_, _>>()?;

        Ok(list_rows)
    }

    /// Looks up a list by id, scoped to its author. A list that exists but
    /// belongs to someone else is indistinguishable from one that does not
    /// exist at all.
    pub fn get_owned_list(&self, list_id: i64, author_id: i64) -> DatabaseResult<Option<List>> {
        let db = self.get_connection()?;

        let mut stmt = db.prepare(
            "SELECT id, name, created_s, done, author_id FROM lists WHERE id = ?1 AND author_id = ?2",
        )?;

        let mut list_rows: Vec<_> = stmt
            .query_map(params![list_id, author_id], |row| {
                crate::parse_from_row(row)
            })?
            .collect::<Result<_, _>>()?;

        if list_rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(list_rows.swap_remove(0)))
        }
    }

    pub fn set_list_done(&self, list_id: i64, done: bool) -> DatabaseResult<bool> {
        let db = self.get_connection()?;

        let changed_rows = db.execute(
            "UPDATE lists SET done = ?1 WHERE id = ?2",
            params![done, list_id],
        )?;

        Ok(changed_rows == 1)
    }

    /// True iff every item of the list is done; a list with no items is
    /// vacuously complete. Persists the flag on the list row and returns it.
    pub fn recompute_list_done(&self, list_id: i64) -> DatabaseResult<bool> {
        let db = self.get_connection()?;

        let remaining: i64 = db.query_row(
            "SELECT COUNT(*) FROM list_items WHERE list_id = ?1 AND done = 0",
            params![list_id],
            |row| row.get(0),
        )?;
        let done = remaining == 0;

        db.execute(
            "UPDATE lists SET done = ?1 WHERE id = ?2",
            params![done, list_id],
        )?;

        Ok(done)
    }

    /// Deletes a list and all of its items in one transaction, so a
    /// partially deleted list is never observable.
    pub fn delete_list(&self, list_id: i64) -> DatabaseResult<bool> {
        let mut db = self.get_connection()?;

        let tx = db.transaction()?;
        tx.execute(
            "DELETE FROM list_items WHERE list_id = ?1",
            params![list_id],
        )?;
        let changed_rows = tx.execute("DELETE FROM lists WHERE id = ?1", params![list_id])?;
        tx.commit()?;

        Ok(changed_rows == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{test_util::TestDb, ListItem, User};

    fn add_user(test_db: &TestDb, email: &str) -> i64 {
        let users: Database<User> = test_db.database();
        users
            .insert_user("Ann", email, &[0; 64], &[0; 64], 0)
            .unwrap()
    }

    #[test]
    fn lists_are_scoped_to_their_author() {
        let test_db = TestDb::new();
        let db: Database<List> = test_db.database();
        let ann = add_user(&test_db, "ann@x.com");
        let ben = add_user(&test_db, "ben@x.com");

        let list_id = db.insert_list("Groceries", ann, 1613988164).unwrap();

        assert!(db.get_owned_list(list_id, ann).unwrap().is_some());
        assert!(db.get_owned_list(list_id, ben).unwrap().is_none());
        assert!(db.get_owned_list(list_id + 1, ann).unwrap().is_none());

        let anns_lists = db.get_lists_by_author(ann).unwrap();
        assert_eq!(anns_lists.len(), 1);
        assert_eq!(anns_lists[0].name, "Groceries");
        assert!(!anns_lists[0].done);
        assert!(db.get_lists_by_author(ben).unwrap().is_empty());
    }

    #[test]
    fn recompute_on_empty_list_is_vacuously_done() {
        let test_db = TestDb::new();
        let db: Database<List> = test_db.database();
        let ann = add_user(&test_db, "ann@x.com");

        let list_id = db.insert_list("Groceries", ann, 0).unwrap();

        assert!(db.recompute_list_done(list_id).unwrap());
        assert!(db.get_owned_list(list_id, ann).unwrap().unwrap().done);
    }

    #[test]
    fn recompute_follows_item_state() {
        let test_db = TestDb::new();
        let db: Database<List> = test_db.database();
        let items: Database<ListItem> = test_db.database();
        let ann = add_user(&test_db, "ann@x.com");

        let list_id = db.insert_list("Groceries", ann, 0).unwrap();
        let milk = items.insert_list_item(list_id, "Milk").unwrap();
        let eggs = items.insert_list_item(list_id, "Eggs").unwrap();

        assert!(!db.recompute_list_done(list_id).unwrap());

        items.set_list_item_done(milk, true).unwrap();
        assert!(!db.recompute_list_done(list_id).unwrap());

        items.set_list_item_done(eggs, true).unwrap();
        assert!(db.recompute_list_done(list_id).unwrap());
    }

    #[test]
    fn delete_list_removes_items() {
        let test_db = TestDb::new();
        let db: Database<List> = test_db.database();
        let items: Database<ListItem> = test_db.database();
        let ann = add_user(&test_db, "ann@x.com");

        let list_id = db.insert_list("Groceries", ann, 0).unwrap();
        let item_id = items.insert_list_item(list_id, "Milk").unwrap();

        assert!(db.delete_list(list_id).unwrap());
        assert!(db.get_owned_list(list_id, ann).unwrap().is_none());
        assert!(items
            .get_owned_list_item(item_id, ann)
            .unwrap()
            .is_none());
        assert!(items.get_list_items(list_id).unwrap().is_empty());
    }
}
