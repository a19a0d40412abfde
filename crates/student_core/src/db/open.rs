//! Connection bootstrap utilities and the pooled session factory.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure connection pragmas required by core behavior.
//! - Run the schema bootstrap once, when the factory is constructed.
//!
//! # Invariants
//! - Every pooled connection has `foreign_keys=ON` and a busy timeout.
//! - A factory never hands out sessions after `shutdown()`.
//! - In-memory factories pool exactly one connection that is never reaped:
//!   the shared database lives as long as that connection, and shared-cache
//!   table locks ignore the busy timeout, so access is serialized.

use super::migrations::apply_migrations;
use super::{StoreError, StoreResult};
use log::{debug, error, info};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use uuid::Uuid;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const FILE_POOL_SIZE: u32 = 8;

/// One pooled connection, returned to the pool on drop.
pub type Session = PooledConnection<SqliteConnectionManager>;

/// Opens a SQLite database file and applies the schema bootstrap.
///
/// # Side effects
/// - Creates the file when absent.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> StoreResult<Connection> {
    let path = path.as_ref();
    open_and_bootstrap("file", || Connection::open(path))
}

/// Opens a private in-memory SQLite database and applies the schema bootstrap.
pub fn open_db_in_memory() -> StoreResult<Connection> {
    open_and_bootstrap("memory", Connection::open_in_memory)
}

fn open_and_bootstrap(
    mode: &str,
    open: impl FnOnce() -> rusqlite::Result<Connection>,
) -> StoreResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let mut conn = match open() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&mut conn) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={} duration_ms={}",
                mode,
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_bootstrap_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection) -> StoreResult<()> {
    configure_connection(conn)?;
    apply_migrations(conn)?;
    Ok(())
}

fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(())
}

/// Process-wide source of store sessions.
///
/// Built once at startup and shared by reference (`Arc`) with every request.
/// Each call to [`SessionFactory::session`] checks a configured connection
/// out of an `r2d2` pool; dropping the session returns it.
pub struct SessionFactory {
    pool: Pool<SqliteConnectionManager>,
    path: Option<PathBuf>,
    closed: AtomicBool,
}

impl SessionFactory {
    /// Creates a factory over a database file, bootstrapping the schema.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        drop(open_db(&path)?);

        let manager =
            SqliteConnectionManager::file(&path).with_init(|conn| configure_connection(conn));
        let pool = Pool::builder().max_size(FILE_POOL_SIZE).build(manager)?;

        Ok(Self {
            pool,
            path: Some(path),
            closed: AtomicBool::new(false),
        })
    }

    /// Creates a factory over a fresh shared-cache in-memory database.
    ///
    /// Every factory gets its own database.
    pub fn open_in_memory() -> StoreResult<Self> {
        let uri = format!(
            "file:student-registry-{}?mode=memory&cache=shared",
            Uuid::new_v4().simple()
        );
        let manager = SqliteConnectionManager::file(uri)
            .with_flags(
                OpenFlags::SQLITE_OPEN_READ_WRITE
                    | OpenFlags::SQLITE_OPEN_CREATE
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .with_init(|conn| configure_connection(conn));
        let pool = Pool::builder()
            .max_size(1)
            .min_idle(Some(1))
            .idle_timeout(None)
            .max_lifetime(None)
            .build(manager)?;

        let started_at = Instant::now();
        let mut conn = pool.get()?;
        apply_migrations(&mut conn)?;
        info!(
            "event=db_open module=db status=ok mode=memory duration_ms={}",
            started_at.elapsed().as_millis()
        );
        drop(conn);

        Ok(Self {
            pool,
            path: None,
            closed: AtomicBool::new(false),
        })
    }

    /// Checks out a session for one unit of work.
    ///
    /// Blocks until a pooled connection is free or the pool timeout expires.
    ///
    /// # Errors
    /// - `StoreError::Closed` after `shutdown()`.
    /// - `StoreError::Pool` when no connection becomes available.
    pub fn session(&self) -> StoreResult<Session> {
        if self.is_closed() {
            return Err(StoreError::Closed);
        }

        let conn = self.pool.get()?;
        debug!("event=session_open module=db status=ok mode={}", self.mode());
        Ok(conn)
    }

    /// Stops handing out sessions.
    ///
    /// Sessions already handed out stay valid until their owners drop them;
    /// pooled connections close when the factory is dropped.
    /// Calling this more than once is a no-op.
    pub fn shutdown(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        let state = self.pool.state();
        info!(
            "event=session_factory_shutdown module=db status=ok mode={} connections={} idle={}",
            self.mode(),
            state.connections,
            state.idle_connections
        );
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Database file path, or `None` for in-memory factories.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn mode(&self) -> &'static str {
        if self.path.is_some() {
            "file"
        } else {
            "memory"
        }
    }
}

impl std::fmt::Debug for SessionFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionFactory")
            .field("mode", &self.mode())
            .field("path", &self.path)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
