use crate::{Database, DatabaseResult};
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Row};
use std::convert::TryFrom;

pub const PASSWORD_BYTE_LEN: usize = 64;
pub const SALT_BYTE_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: Vec<u8>,
    pub salt: Vec<u8>,
    pub created_s: i64,
}

impl User {
    fn new(id: i64, name: String, email: String, password: Vec<u8>, salt: Vec<u8>, created_s: i64) -> Self {
        Self {
            id,
            name,
            email,
            password,
            salt,
            created_s,
        }
    }

    pub fn created_utc(&self) -> DateTime<Utc> {
        chrono::Utc.timestamp(self.created_s, 0)
    }
}

impl<'a> TryFrom<&Row<'a>> for User {
    type Error = rusqlite::Error;
    fn try_from(row: &Row<'a>) -> Result<Self, Self::Error> {
        let id = row.get(0)?;
        let name: String = row.get(1)?;
        let email: String = row.get(2)?;
        let password: Vec<u8> = row.get(3)?;
        let salt: Vec<u8> = row.get(4)?;
        let created_s = row.get(5)?;

        Ok(User::new(id, name, email, password, salt, created_s))
    }
}

impl Database<User> {
    pub fn email_exists(&self, email: &str) -> DatabaseResult<bool> {
        Ok(self.get_user_by_email(email)?.is_some())
    }

    pub fn insert_user(
        &self,
        name: &str,
        email: &str,
        password: &[u8],
        salt: &[u8],
        created_s: i64,
    ) -> DatabaseResult<i64> {
        let db = self.get_connection()?;

        db.execute(
            "INSERT INTO users (name, email, password, salt, created_s) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![name, email, password, salt, created_s],
        )?;

        Ok(db.last_insert_rowid())
    }

    pub fn get_user(&self, id: i64) -> DatabaseResult<Option<User>> {
        let db = self.get_connection()?;

        let mut stmt = db.prepare(
            "SELECT id, name, email, password, salt, created_s FROM users WHERE id = ?1",
        )?;

        let mut user_rows: Vec<_> = stmt
            .query_map(params![id], |row| crate::parse_from_row(row))?
            .collect::<Result<_, _>>()?;

        if user_rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(user_rows.swap_remove(0)))
        }
    }

    pub fn get_user_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        let db = self.get_connection()?;

        let mut stmt = db.prepare(
            "SELECT id, name, email, password, salt, created_s FROM users WHERE email = ?1",
        )?;

        let mut user_rows: Vec<_> = stmt
            .query_map(params![email], |row| crate::parse_from_row(row))?
            .collect::<Result<_, _>>()?;

        if user_rows.is_empty() {
            Ok(None)
        } else if user_rows.len() > 1 {
            error!(r#"more than 1 user with email: "{}""#, email);
            Ok(None)
        } else {
            Ok(Some(user_rows.swap_remove(0)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::TestDb;

    #[test]
    fn insert_and_fetch_by_email() {
        let test_db = TestDb::new();
        let db: Database<User> = test_db.database();

        let id = db
            .insert_user("Ann", "ann@x.com", &[1; 64], &[2; 64], 1613988164)
            .unwrap();

        let user = db.get_user_by_email("ann@x.com").unwrap().unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.name, "Ann");
        assert_eq!(user.password, vec![1; PASSWORD_BYTE_LEN]);
        assert_eq!(user.salt, vec![2; SALT_BYTE_LEN]);
        assert_eq!(
            user.created_utc(),
            DateTime::parse_from_rfc3339("2021-02-22T10:02:44-00:00").unwrap()
        );
    }

    #[test]
    fn email_lookup_is_exact_match() {
        let test_db = TestDb::new();
        let db: Database<User> = test_db.database();

        db.insert_user("Ann", "ann@x.com", &[0; 64], &[0; 64], 0)
            .unwrap();

        assert!(db.email_exists("ann@x.com").unwrap());
        assert!(!db.email_exists("Ann@x.com").unwrap());
    }

    #[test]
    fn email_check_surfaces_database_errors() {
        let db: Database<User> =
            Database::new("/nonexistent-dir/todo-lists/users.db".to_owned());

        assert!(db.email_exists("ann@x.com").is_err());
    }

    #[test]
    fn duplicate_email_violates_unique_constraint() {
        let test_db = TestDb::new();
        let db: Database<User> = test_db.database();

        db.insert_user("Ann", "ann@x.com", &[0; 64], &[0; 64], 0)
            .unwrap();

        assert!(db
            .insert_user("Other Ann", "ann@x.com", &[0; 64], &[0; 64], 1)
            .is_err());
    }
}
