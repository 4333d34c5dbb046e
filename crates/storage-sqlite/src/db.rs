//! Connection pool, embedded migrations, and the single-writer handle.
//!
//! Reads go through an r2d2 pool. Writes are serialized on one dedicated
//! writer thread; every job runs inside a single `BEGIN IMMEDIATE`
//! transaction, so a repository mutation (entity row + queue entry) commits
//! atomically or not at all.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::sync::{mpsc, Arc};

use vigil_core::errors::{DatabaseError, Error, Result};

use crate::errors::StorageError;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

const CONNECTION_PRAGMAS: &str =
    "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000; PRAGMA journal_mode = WAL;";

#[derive(Debug)]
struct ConnectionOptions;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(
        &self,
        conn: &mut SqliteConnection,
    ) -> std::result::Result<(), diesel::r2d2::Error> {
        conn.batch_execute(CONNECTION_PRAGMAS)
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Build the read pool for a database file.
pub fn create_pool(database_url: &str) -> Result<Arc<DbPool>> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = Pool::builder()
        .max_size(8)
        .connection_customizer(Box::new(ConnectionOptions))
        .build(manager)
        .map_err(|e| Error::Database(DatabaseError::Pool(e.to_string())))?;
    Ok(Arc::new(pool))
}

pub fn get_connection(pool: &Arc<DbPool>) -> Result<DbConnection> {
    pool.get()
        .map_err(|e| Error::Database(DatabaseError::Pool(e.to_string())))
}

pub fn run_migrations(conn: &mut SqliteConnection) -> Result<()> {
    conn.run_pending_migrations(MIGRATIONS)
        .map(|_| ())
        .map_err(|e| StorageError::Migration(e.to_string()).into())
}

/// Open the on-device database: migrated read pool plus writer handle.
pub fn open(database_url: &str) -> Result<(Arc<DbPool>, WriteHandle)> {
    let pool = create_pool(database_url)?;
    {
        let mut conn = get_connection(&pool)?;
        run_migrations(&mut conn)?;
    }
    let writer = WriteHandle::spawn(database_url)?;
    Ok((pool, writer))
}

/// Error shuttle for the transaction closure: lets `?` on diesel errors
/// coexist with application errors inside one job.
enum TxError {
    App(Error),
    Db(diesel::result::Error),
}

impl From<diesel::result::Error> for TxError {
    fn from(err: diesel::result::Error) -> Self {
        TxError::Db(err)
    }
}

type WriteJob = Box<dyn FnOnce(&mut SqliteConnection) + Send + 'static>;

/// Handle to the writer actor. Cloneable; all clones feed the same thread,
/// so writes are applied in submission order.
#[derive(Clone)]
pub struct WriteHandle {
    jobs: mpsc::Sender<WriteJob>,
}

impl WriteHandle {
    /// Start the writer thread with its own connection to `database_url`.
    pub fn spawn(database_url: &str) -> Result<Self> {
        let mut conn = SqliteConnection::establish(database_url)
            .map_err(|e| Error::from(StorageError::Connection(e)))?;
        conn.batch_execute(CONNECTION_PRAGMAS)
            .map_err(|e| Error::from(StorageError::Query(e)))?;

        let (jobs, inbox) = mpsc::channel::<WriteJob>();
        std::thread::Builder::new()
            .name("vigil-db-writer".to_string())
            .spawn(move || {
                while let Ok(job) = inbox.recv() {
                    job(&mut conn);
                }
            })
            .map_err(|e| {
                Error::Database(DatabaseError::Internal(format!(
                    "Failed to start writer thread: {}",
                    e
                )))
            })?;

        Ok(Self { jobs })
    }

    /// Run a write job on the writer thread inside one immediate
    /// transaction and await its result.
    pub async fn exec<T, F>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply, answer) = tokio::sync::oneshot::channel();
        self.jobs
            .send(Box::new(move |conn: &mut SqliteConnection| {
                let outcome = conn
                    .immediate_transaction::<T, TxError, _>(|tx_conn| {
                        job(tx_conn).map_err(TxError::App)
                    })
                    .map_err(|err| match err {
                        TxError::App(app) => app,
                        TxError::Db(db) => StorageError::Query(db).into(),
                    });
                let _ = reply.send(outcome);
            }))
            .map_err(|_| {
                Error::Database(DatabaseError::Internal(
                    "Writer thread is no longer running".to_string(),
                ))
            })?;

        answer.await.map_err(|_| {
            Error::Database(DatabaseError::Internal(
                "Writer thread dropped the reply".to_string(),
            ))
        })?
    }
}
