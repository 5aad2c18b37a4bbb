// src/store/sqlite.rs

use std::collections::BTreeSet;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::{Type, ValueRef};
use rusqlite::{params, Connection, Row};
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::rules::parse::{parse_date, parse_flag};
use crate::rules::RawJobRule;
use crate::store::TimetableStore;
use crate::timetable::{PublicHoliday, ResolvedOccurrence};
use crate::types::{JobId, DATE_FORMAT, DATETIME_FORMAT};

/// Create the tables the engine reads and writes (idempotent).
///
/// Existing tables are left alone, so a database created by the import
/// tooling with extra columns works unchanged.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS OPERATING_SCHEDULE (
            series_id                TEXT,
            job_id                   TEXT,
            start_run_date           TEXT,
            end_run_date             TEXT,
            est_run_time             TEXT,
            days_of_week             TEXT,
            exclude_public_holidays  TEXT,
            start_time               TEXT,
            dependent_job_id         TEXT,
            minutes_dependent_job_id TEXT
        );

        CREATE TABLE IF NOT EXISTS JOB (
            job_id      TEXT PRIMARY KEY,
            series_id   TEXT,
            exclude_ph  TEXT
        );

        CREATE TABLE IF NOT EXISTS PUBLIC_HOLIDAY (
            year     TEXT,
            ph_date  TEXT,
            PRIMARY KEY (year, ph_date)
        );

        CREATE TABLE IF NOT EXISTS TIMETABLE_DATETIME (
            series_id           TEXT,
            job_id              TEXT,
            start_run_datetime  TEXT,
            end_run_datetime    TEXT,
            dependent_job_id    TEXT,
            PRIMARY KEY (series_id, job_id, start_run_datetime)
        );

        CREATE INDEX IF NOT EXISTS idx_JOB_exclude_ph ON JOB (exclude_ph);
        ",
    )?;
    Ok(())
}

/// [`TimetableStore`] backed by a SQLite database.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and make sure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        debug!(path = %path.display(), "opening timetable database");
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn insert_rule(&self, rule: &RawJobRule) -> Result<()> {
        self.conn.execute(
            "INSERT INTO OPERATING_SCHEDULE
             (series_id, job_id, start_run_date, end_run_date, est_run_time,
              days_of_week, exclude_public_holidays, start_time,
              dependent_job_id, minutes_dependent_job_id)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)",
            params![
                rule.series_id,
                rule.job_id,
                rule.start_run_date,
                rule.end_run_date,
                rule.est_run_time,
                rule.days_of_week,
                rule.exclude_public_holidays,
                rule.start_time,
                rule.dependent_job_id,
                rule.minutes_dependent_job_id,
            ],
        )?;
        Ok(())
    }

    pub fn insert_public_holiday(&self, holiday: &PublicHoliday) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO PUBLIC_HOLIDAY (year, ph_date) VALUES (?1, ?2)",
            params![holiday.year.to_string(), holiday.date_str()],
        )?;
        Ok(())
    }

    /// Upsert the job master flag used by the holiday pass.
    pub fn set_job_exclude_ph(&self, job_id: &str, exclude: bool) -> Result<()> {
        self.conn.execute(
            "INSERT INTO JOB (job_id, exclude_ph) VALUES (?1, ?2)
             ON CONFLICT(job_id) DO UPDATE SET exclude_ph = excluded.exclude_ph",
            params![job_id, if exclude { "1" } else { "0" }],
        )?;
        Ok(())
    }
}

impl TimetableStore for SqliteStore {
    fn load_rules(&self) -> Result<Vec<RawJobRule>> {
        let mut stmt = self.conn.prepare(
            "SELECT job_id, series_id, start_time, est_run_time, dependent_job_id,
                    minutes_dependent_job_id, start_run_date, end_run_date,
                    days_of_week, exclude_public_holidays
             FROM OPERATING_SCHEDULE ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(RawJobRule {
                row: 0,
                job_id: text_column(row, 0)?,
                series_id: text_column(row, 1)?,
                start_time: text_column(row, 2)?,
                est_run_time: text_column(row, 3)?,
                dependent_job_id: text_column(row, 4)?,
                minutes_dependent_job_id: text_column(row, 5)?,
                start_run_date: text_column(row, 6)?,
                end_run_date: text_column(row, 7)?,
                days_of_week: text_column(row, 8)?,
                exclude_public_holidays: text_column(row, 9)?,
            })
        })?;

        let mut rules = Vec::new();
        for (idx, rule) in rows.enumerate() {
            let mut rule = rule?;
            rule.row = idx + 1;
            rules.push(rule);
        }
        debug!(rows = rules.len(), "loaded rule rows");
        Ok(rules)
    }

    fn holiday_excluded_jobs(&self) -> Result<BTreeSet<JobId>> {
        let mut jobs = BTreeSet::new();
        for sql in [
            "SELECT job_id, exclude_ph FROM JOB",
            "SELECT job_id, exclude_public_holidays FROM OPERATING_SCHEDULE",
        ] {
            let mut stmt = self.conn.prepare(sql)?;
            let rows = stmt.query_map([], |row| Ok((text_column(row, 0)?, text_column(row, 1)?)))?;
            for row in rows {
                let (job_id, flag) = row?;
                if !job_id.trim().is_empty() && parse_flag(&flag) {
                    jobs.insert(job_id.trim().to_string());
                }
            }
        }
        Ok(jobs)
    }

    fn public_holidays(&self) -> Result<Vec<PublicHoliday>> {
        let mut stmt = self
            .conn
            .prepare("SELECT year, ph_date FROM PUBLIC_HOLIDAY ORDER BY ph_date")?;
        let rows = stmt.query_map([], |row| Ok((text_column(row, 0)?, text_column(row, 1)?)))?;

        let mut holidays = Vec::new();
        for row in rows {
            let (year, ph_date) = row?;
            match parse_date(&ph_date) {
                Ok(date) => holidays.push(PublicHoliday::new(date)),
                Err(e) => warn!(%year, %ph_date, "ignoring malformed public holiday: {e}"),
            }
        }
        Ok(holidays)
    }

    fn occurrences(&self) -> Result<Vec<ResolvedOccurrence>> {
        let mut stmt = self.conn.prepare(
            "SELECT series_id, job_id, start_run_datetime, end_run_datetime, dependent_job_id
             FROM TIMETABLE_DATETIME
             ORDER BY series_id, start_run_datetime, job_id",
        )?;
        let rows = stmt.query_map([], occurrence_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn clear_occurrences(&mut self) -> Result<usize> {
        let n = self.conn.execute("DELETE FROM TIMETABLE_DATETIME", [])?;
        info!(cleared = n, "cleared stored occurrences");
        Ok(n)
    }

    fn insert_occurrences(&mut self, occurrences: &[ResolvedOccurrence]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO TIMETABLE_DATETIME
                 (series_id, job_id, start_run_datetime, end_run_datetime, dependent_job_id)
                 VALUES (?1,?2,?3,?4,?5)",
            )?;
            for occ in occurrences {
                stmt.execute(params![
                    occ.series_id,
                    occ.job_id,
                    occ.start_str(),
                    occ.end_str(),
                    occ.dependent_job_id,
                ])?;
            }
        }
        tx.commit()?;
        Ok(occurrences.len())
    }

    fn delete_on_holidays(
        &mut self,
        jobs: &BTreeSet<JobId>,
        dates: &BTreeSet<NaiveDate>,
    ) -> Result<Vec<ResolvedOccurrence>> {
        let tx = self.conn.transaction()?;
        let mut deleted = Vec::new();
        {
            let mut select = tx.prepare(
                "SELECT series_id, job_id, start_run_datetime, end_run_datetime, dependent_job_id
                 FROM TIMETABLE_DATETIME
                 WHERE job_id = ?1 AND substr(start_run_datetime, 1, 8) = ?2
                 ORDER BY series_id, start_run_datetime",
            )?;
            let mut delete = tx.prepare(
                "DELETE FROM TIMETABLE_DATETIME
                 WHERE job_id = ?1 AND substr(start_run_datetime, 1, 8) = ?2",
            )?;

            for job in jobs {
                for date in dates {
                    let day = date.format(DATE_FORMAT).to_string();
                    let rows = select
                        .query_map(params![job, day], occurrence_from_row)?
                        .collect::<rusqlite::Result<Vec<_>>>()?;
                    if rows.is_empty() {
                        continue;
                    }
                    delete.execute(params![job, day])?;
                    deleted.extend(rows);
                }
            }
        }
        tx.commit()?;
        Ok(deleted)
    }
}

fn occurrence_from_row(row: &Row<'_>) -> rusqlite::Result<ResolvedOccurrence> {
    Ok(ResolvedOccurrence {
        series_id: text_column(row, 0)?,
        job_id: text_column(row, 1)?,
        start_run_datetime: datetime_column(row, 2)?,
        end_run_datetime: datetime_column(row, 3)?,
        dependent_job_id: text_column(row, 4)?,
    })
}

/// Read any column as text. The import tooling stores numbers in some
/// databases, and NULL means "absent".
fn text_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) if f.fract() == 0.0 => format!("{}", f as i64),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) | ValueRef::Blob(t) => String::from_utf8_lossy(t).trim().to_string(),
    })
}

fn datetime_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let s = text_column(row, idx)?;
    NaiveDateTime::parse_from_str(&s, DATETIME_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
