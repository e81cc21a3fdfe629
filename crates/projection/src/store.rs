//! SQLite read model of fund requests

use crate::error::ProjectionError;
use ctas_core::{AccountId, Amount, RequestId, RequestStatus, Timestamp};
use ctas_events::LedgerEvent;
use rusqlite::{params, Connection, Row};
use serde::Serialize;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// One fund request as seen by queries
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestView {
    pub id: RequestId,
    pub requester: AccountId,
    pub amount: Amount,
    pub description: String,
    pub deadline: Timestamp,
    pub created_at: Timestamp,
    pub status: RequestStatus,
    /// Fund manager who approved or rejected
    pub decided_by: Option<AccountId>,
    pub released_by: Option<AccountId>,
}

/// Request counts per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestStats {
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
    pub released: u64,
}

impl RequestStats {
    pub fn total(&self) -> u64 {
        self.pending + self.approved + self.rejected + self.released
    }

    fn slot(&mut self, status: RequestStatus) -> &mut u64 {
        match status {
            RequestStatus::Pending => &mut self.pending,
            RequestStatus::Approved => &mut self.approved,
            RequestStatus::Rejected => &mut self.rejected,
            RequestStatus::Released => &mut self.released,
        }
    }
}

const SELECT_COLUMNS: &str = "SELECT id, requester, amount, description, deadline, created_at,
        status, decided_by, released_by
 FROM fund_requests";

/// SQLite projection of the request ledger
pub struct Projection {
    conn: Connection,
}

impl Projection {
    /// Open (or create) the projection database at `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ProjectionError> {
        let conn = Connection::open(path)?;
        let projection = Self { conn };
        projection.init_schema()?;
        Ok(projection)
    }

    /// Create an in-memory projection (for testing)
    pub fn in_memory() -> Result<Self, ProjectionError> {
        let conn = Connection::open_in_memory()?;
        let projection = Self { conn };
        projection.init_schema()?;
        Ok(projection)
    }

    fn init_schema(&self) -> Result<(), ProjectionError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS fund_requests (
                id INTEGER PRIMARY KEY,
                requester TEXT NOT NULL,
                amount TEXT NOT NULL,
                description TEXT NOT NULL,
                deadline INTEGER NOT NULL,
                created_at INTEGER NOT NULL,
                status TEXT NOT NULL,
                decided_by TEXT,
                released_by TEXT
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_fund_requests_status
             ON fund_requests(status)",
            [],
        )?;

        Ok(())
    }

    /// Apply one committed event. Events that do not touch requests are
    /// ignored.
    pub fn apply(&self, event: &LedgerEvent) -> Result<(), ProjectionError> {
        match event {
            LedgerEvent::FundRequested {
                request_id,
                requester,
                amount,
                description,
                deadline,
                created_at,
            } => {
                self.conn.execute(
                    "INSERT OR REPLACE INTO fund_requests
                     (id, requester, amount, description, deadline, created_at,
                      status, decided_by, released_by)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, NULL)",
                    params![
                        sql_id(*request_id)?,
                        requester.as_str(),
                        amount.to_string(),
                        description,
                        deadline,
                        created_at,
                        RequestStatus::Pending.to_string(),
                    ],
                )?;
            }
            LedgerEvent::RequestApproved { request_id, by } => {
                self.decide(*request_id, RequestStatus::Approved, by)?;
            }
            LedgerEvent::RequestRejected { request_id, by } => {
                self.decide(*request_id, RequestStatus::Rejected, by)?;
            }
            LedgerEvent::FundReleased { request_id, by, .. } => {
                let rows = self.conn.execute(
                    "UPDATE fund_requests SET status = ?1, released_by = ?2 WHERE id = ?3",
                    params![
                        RequestStatus::Released.to_string(),
                        by.as_str(),
                        sql_id(*request_id)?
                    ],
                )?;
                if rows == 0 {
                    return Err(ProjectionError::NotFound(*request_id));
                }
            }
            _ => return Ok(()),
        }

        debug!(event = event.name(), "projection updated");
        Ok(())
    }

    fn decide(
        &self,
        id: RequestId,
        status: RequestStatus,
        by: &AccountId,
    ) -> Result<(), ProjectionError> {
        let rows = self.conn.execute(
            "UPDATE fund_requests SET status = ?1, decided_by = ?2 WHERE id = ?3",
            params![status.to_string(), by.as_str(), sql_id(id)?],
        )?;
        if rows == 0 {
            return Err(ProjectionError::NotFound(id));
        }
        Ok(())
    }

    /// Drop every row and apply `events` in one transaction. Returns the
    /// number of events applied.
    pub fn rebuild<'a, I>(&self, events: I) -> Result<usize, ProjectionError>
    where
        I: IntoIterator<Item = &'a LedgerEvent>,
    {
        let tx = self.conn.unchecked_transaction()?;
        self.clear()?;

        let mut applied = 0;
        for event in events {
            self.apply(event)?;
            applied += 1;
        }

        tx.commit()?;
        debug!(events = applied, "projection rebuilt");
        Ok(applied)
    }

    pub fn get(&self, id: RequestId) -> Result<RequestView, ProjectionError> {
        let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);
        let raw = self
            .conn
            .query_row(&sql, params![sql_id(id)?], RawRow::read)
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => ProjectionError::NotFound(id),
                other => ProjectionError::Database(other),
            })?;
        raw.into_view()
    }

    /// Requests with `status`, lowest id first
    pub fn list_by_status(&self, status: RequestStatus) -> Result<Vec<RequestView>, ProjectionError> {
        let sql = format!("{} WHERE status = ?1 ORDER BY id ASC", SELECT_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![status.to_string()], RawRow::read)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(RawRow::into_view).collect()
    }

    /// All requests, lowest id first
    pub fn list_all(&self) -> Result<Vec<RequestView>, ProjectionError> {
        let sql = format!("{} ORDER BY id ASC", SELECT_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], RawRow::read)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(RawRow::into_view).collect()
    }

    pub fn stats(&self) -> Result<RequestStats, ProjectionError> {
        let mut stmt = self
            .conn
            .prepare("SELECT status, COUNT(*) FROM fund_requests GROUP BY status")?;
        let counts = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stats = RequestStats::default();
        for (status, count) in counts {
            let status = RequestStatus::from_str(&status).map_err(|_| ProjectionError::Corrupt {
                id: -1,
                reason: format!("unknown status '{}'", status),
            })?;
            *stats.slot(status) += count.max(0) as u64;
        }
        Ok(stats)
    }

    /// Delete every row
    pub fn clear(&self) -> Result<(), ProjectionError> {
        self.conn.execute("DELETE FROM fund_requests", [])?;
        Ok(())
    }
}

fn sql_id(id: RequestId) -> Result<i64, ProjectionError> {
    i64::try_from(id.value()).map_err(|_| ProjectionError::Corrupt {
        id: -1,
        reason: format!("request id {} exceeds the SQLite integer range", id),
    })
}

/// Row as stored, before domain validation
struct RawRow {
    id: i64,
    requester: String,
    amount: String,
    description: String,
    deadline: i64,
    created_at: i64,
    status: String,
    decided_by: Option<String>,
    released_by: Option<String>,
}

impl RawRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            requester: row.get(1)?,
            amount: row.get(2)?,
            description: row.get(3)?,
            deadline: row.get(4)?,
            created_at: row.get(5)?,
            status: row.get(6)?,
            decided_by: row.get(7)?,
            released_by: row.get(8)?,
        })
    }

    fn into_view(self) -> Result<RequestView, ProjectionError> {
        let id = self.id;
        let corrupt = |reason: String| ProjectionError::Corrupt { id, reason };

        let account = |raw: String| AccountId::new(raw).map_err(|e| corrupt(e.to_string()));
        let request_id = u64::try_from(id)
            .map(RequestId::new)
            .map_err(|_| corrupt("negative id".to_string()))?;

        Ok(RequestView {
            id: request_id,
            requester: account(self.requester)?,
            amount: Amount::from_str(&self.amount).map_err(|e| corrupt(e.to_string()))?,
            description: self.description,
            deadline: self.deadline,
            created_at: self.created_at,
            status: RequestStatus::from_str(&self.status).map_err(|e| corrupt(e.to_string()))?,
            decided_by: self.decided_by.map(account).transpose()?,
            released_by: self.released_by.map(account).transpose()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> AccountId {
        AccountId::new(s).unwrap()
    }

    fn requested(n: u64, units: u64) -> LedgerEvent {
        LedgerEvent::FundRequested {
            request_id: RequestId::new(n),
            requester: id("ip"),
            amount: Amount::from_units(units),
            description: format!("request {}", n),
            deadline: 2_000,
            created_at: 1_000,
        }
    }

    fn lifecycle() -> Vec<LedgerEvent> {
        vec![
            LedgerEvent::Deployed {
                owner: id("owner"),
                initial_funding: Amount::from_units(100),
                first_request_id: RequestId::new(1),
            },
            LedgerEvent::IpAdded { account: id("ip") },
            requested(1, 10),
            requested(2, 20),
            requested(3, 30),
            LedgerEvent::RequestApproved {
                request_id: RequestId::new(1),
                by: id("fm"),
            },
            LedgerEvent::FundReleased {
                request_id: RequestId::new(1),
                to: id("ip"),
                amount: Amount::from_units(10),
                by: id("fm"),
            },
            LedgerEvent::RequestRejected {
                request_id: RequestId::new(2),
                by: id("fm"),
            },
        ]
    }

    #[test]
    fn test_apply_lifecycle() {
        let projection = Projection::in_memory().unwrap();
        for event in &lifecycle() {
            projection.apply(event).unwrap();
        }

        let released = projection.get(RequestId::new(1)).unwrap();
        assert_eq!(released.status, RequestStatus::Released);
        assert_eq!(released.amount, Amount::from_units(10));
        assert_eq!(released.decided_by, Some(id("fm")));
        assert_eq!(released.released_by, Some(id("fm")));

        let rejected = projection.get(RequestId::new(2)).unwrap();
        assert_eq!(rejected.status, RequestStatus::Rejected);
        assert_eq!(rejected.released_by, None);

        let pending = projection.get(RequestId::new(3)).unwrap();
        assert_eq!(pending.status, RequestStatus::Pending);
        assert_eq!(pending.description, "request 3");
        assert_eq!(pending.decided_by, None);
    }

    #[test]
    fn test_stats() {
        let projection = Projection::in_memory().unwrap();
        projection.rebuild(&lifecycle()).unwrap();

        let stats = projection.stats().unwrap();
        assert_eq!(
            stats,
            RequestStats {
                pending: 1,
                approved: 0,
                rejected: 1,
                released: 1,
            }
        );
        assert_eq!(stats.total(), 3);
    }

    #[test]
    fn test_list_by_status_orders_by_id() {
        let projection = Projection::in_memory().unwrap();
        for n in [3, 1, 2] {
            projection.apply(&requested(n, n)).unwrap();
        }

        let pending: Vec<u64> = projection
            .list_by_status(RequestStatus::Pending)
            .unwrap()
            .iter()
            .map(|r| r.id.value())
            .collect();
        assert_eq!(pending, vec![1, 2, 3]);
        assert!(projection
            .list_by_status(RequestStatus::Released)
            .unwrap()
            .is_empty());
        assert_eq!(projection.list_all().unwrap().len(), 3);
    }

    #[test]
    fn test_unknown_request() {
        let projection = Projection::in_memory().unwrap();

        let err = projection.get(RequestId::new(7)).unwrap_err();
        assert!(matches!(err, ProjectionError::NotFound(rid) if rid == RequestId::new(7)));

        let err = projection
            .apply(&LedgerEvent::RequestApproved {
                request_id: RequestId::new(7),
                by: id("fm"),
            })
            .unwrap_err();
        assert!(matches!(err, ProjectionError::NotFound(_)));
    }

    #[test]
    fn test_rebuild_replaces_rows() {
        let projection = Projection::in_memory().unwrap();
        projection.apply(&requested(9, 1)).unwrap();

        let applied = projection.rebuild(&lifecycle()).unwrap();
        assert_eq!(applied, lifecycle().len());
        assert!(projection.get(RequestId::new(9)).is_err());
        assert_eq!(projection.stats().unwrap().total(), 3);

        projection.clear().unwrap();
        assert_eq!(projection.stats().unwrap(), RequestStats::default());
    }

    #[test]
    fn test_file_backed_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("projection.db");

        {
            let projection = Projection::new(&path).unwrap();
            projection.rebuild(&lifecycle()).unwrap();
        }

        let reopened = Projection::new(&path).unwrap();
        assert_eq!(reopened.stats().unwrap().released, 1);
    }
}
