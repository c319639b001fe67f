use rusqlite::{Connection, Error, Row};
use std::time;
use std::{
    convert::TryFrom,
    fmt::{Debug, Display},
    marker::PhantomData,
};

#[macro_use]
extern crate log;

mod list;
mod list_item;
mod user;

pub use list::*;
pub use list_item::*;
pub use user::*;

pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Handle to the SQLite database, typed by the entity it is used for.
///
/// Opens a fresh connection per call; every caller performs a handful of
/// statements and commits once.
pub struct Database<T> {
    path: String,
    _phantom: PhantomData<T>,
}

impl<T> Database<T> {
    pub fn new(path: String) -> Self {
        Self {
            path,
            _phantom: PhantomData,
        }
    }

    fn get_connection(&self) -> DatabaseResult<Connection> {
        trace!("connecting to database at '{}'", self.path);
        let timer = time::Instant::now();
        let conn = Connection::open(&self.path)?;
        trace!(
            "successfully connected to database at '{}' in {:?}",
            self.path,
            timer.elapsed()
        );
        Ok(conn)
    }
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password BLOB NOT NULL,
    salt BLOB NOT NULL,
    created_s INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS lists (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    created_s INTEGER NOT NULL,
    done INTEGER NOT NULL DEFAULT 0,
    author_id INTEGER NOT NULL REFERENCES users(id)
);

CREATE TABLE IF NOT EXISTS list_items (
    id INTEGER PRIMARY KEY,
    body TEXT NOT NULL,
    done INTEGER NOT NULL DEFAULT 0,
    list_id INTEGER NOT NULL REFERENCES lists(id)
);
";

/// Creates the three tables if they do not exist yet. Called once at startup.
pub fn apply_schema(path: &str) -> DatabaseResult<()> {
    let conn = Connection::open(path)?;
    conn.execute_batch(SCHEMA)?;

    Ok(())
}

#[derive(Debug)]
pub enum DatabaseError {
    RusqliteError(rusqlite::Error),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(rusqlite_error: rusqlite::Error) -> Self {
        DatabaseError::RusqliteError(rusqlite_error)
    }
}

impl Display for DatabaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let output = match self {
            DatabaseError::RusqliteError(e) => e.to_string(),
        };

        write!(f, "{}", output)
    }
}

impl std::error::Error for DatabaseError {}

fn parse_from_row<'a, T>(row: &'a Row) -> Result<T, Error>
where
    T: TryFrom<&'a Row<'a>, Error = Error> + Debug,
{
    let result = T::try_from(row);

    match result {
        Ok(ok) => {
            trace!("parsed '{:?}' from row", ok);
            Ok(ok)
        }
        Err(err) => {
            error!(
                "failed to parse object of type '{}' from row with error '{:?}'",
                std::any::type_name::<T>(),
                err
            );
            Err(err)
        }
    }
}
