//! [`SqliteStore`] — the SQLite implementation of [`OpsStore`].

use std::collections::HashSet;
use std::path::Path;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use vigil_core::{
  plan::{BulkInsertOutcome, PlanFilter, PlanKey, PlannedAssignment},
  registry::{InspectorRecord, SiteRecord},
  shift::{Route, Shift},
  store::OpsStore,
  visit::RawEventRow,
};

use crate::{
  Error, Result,
  encode::{
    RawInspectorRow, RawPlanRow, RawSiteRow, RawVisitRow, encode_date,
    encode_dt, encode_route, encode_shift, encode_uuid,
  },
  schema::SCHEMA,
};

/// Matching order for plan reads: shift by operational code, then route,
/// site name, plan ID. Keeps the greedy matcher deterministic across runs.
const PLAN_ORDER: &str = "ORDER BY
  CASE shift WHEN 'morning' THEN 1 WHEN 'evening' THEN 2 ELSE 3 END,
  route, site_name, plan_id";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Vigil operations store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert fully-built plans in one transaction.
  async fn insert_plans(&self, plans: Vec<PlannedAssignment>) -> Result<()> {
    if plans.is_empty() {
      return Ok(());
    }
    let rows: Vec<RawPlanRow> = plans.iter().map(encode_plan).collect();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for row in &rows {
          tx.execute(
            "INSERT INTO plans (
               plan_id, date, shift, route, site_id, site_name,
               created_by, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
              row.plan_id,
              row.date,
              row.shift,
              row.route,
              row.site_id,
              row.site_name,
              row.created_by,
              row.created_at,
            ],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Keys of every plan currently stored for `date`. The dedup-before-write
  /// read; see the [`OpsStore`] concurrency caveat.
  async fn existing_keys(&self, date: NaiveDate) -> Result<HashSet<PlanKey>> {
    Ok(
      self
        .list_plans(date)
        .await?
        .iter()
        .map(PlannedAssignment::key)
        .collect(),
    )
  }

  // ── Ingest and seeding ────────────────────────────────────────────────────

  /// Append one raw event verbatim. The row's calendar date is salvaged from
  /// the leading `YYYY-MM-DD` of the timestamp for range reads; rows with no
  /// recoverable date are kept and returned by every range read.
  pub async fn append_event(&self, event: RawEventRow) -> Result<()> {
    let event_date = event
      .timestamp
      .trim()
      .get(..10)
      .filter(|p| NaiveDate::parse_from_str(p, "%Y-%m-%d").is_ok())
      .map(str::to_owned);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO visit_log (
             timestamp, inspector_name, route_text, site_name_text,
             guard_name, shift_code, score, gps_text, event_date
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            event.timestamp,
            event.inspector_name,
            event.route_text,
            event.site_name_text,
            event.guard_name,
            event.shift_code,
            event.score,
            event.gps_text,
            event_date,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn upsert_site(&self, site: SiteRecord) -> Result<()> {
    let route = site.route.map(encode_route);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO sites (site_id, code, name_en, name_th, route)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            site.site_id,
            site.code,
            site.name_en,
            site.name_th,
            route,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn upsert_inspector(&self, inspector: InspectorRecord) -> Result<()> {
    let declared = inspector.declared_shift.map(encode_shift);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO inspectors (name, declared_shift)
           VALUES (?1, ?2)",
          rusqlite::params![inspector.name, declared],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

fn encode_plan(plan: &PlannedAssignment) -> RawPlanRow {
  RawPlanRow {
    plan_id:    encode_uuid(plan.plan_id),
    date:       encode_date(plan.date),
    shift:      encode_shift(plan.shift),
    route:      encode_route(plan.route),
    site_id:    plan.site_id.clone(),
    site_name:  plan.site_name.clone(),
    created_by: plan.created_by.clone(),
    created_at: encode_dt(plan.created_at),
  }
}

// ─── OpsStore impl ───────────────────────────────────────────────────────────

impl OpsStore for SqliteStore {
  type Error = Error;

  // ── Plans ─────────────────────────────────────────────────────────────────

  async fn list_plans(&self, date: NaiveDate) -> Result<Vec<PlannedAssignment>> {
    let date_str = encode_date(date);

    let raws: Vec<RawPlanRow> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT plan_id, date, shift, route, site_id, site_name,
                  created_by, created_at
           FROM plans WHERE date = ?1 {PLAN_ORDER}"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![date_str], |row| {
            Ok(RawPlanRow {
              plan_id:    row.get(0)?,
              date:       row.get(1)?,
              shift:      row.get(2)?,
              route:      row.get(3)?,
              site_id:    row.get(4)?,
              site_name:  row.get(5)?,
              created_by: row.get(6)?,
              created_at: row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPlanRow::into_plan).collect()
  }

  async fn bulk_insert_plans(
    &self,
    date: NaiveDate,
    shift: Shift,
    route: Route,
    sites: Vec<(String, String)>,
    created_by: String,
  ) -> Result<BulkInsertOutcome> {
    let mut seen = self.existing_keys(date).await?;
    let now = Utc::now();

    let mut plans = Vec::new();
    let mut skipped = 0;
    for (site_id, site_name) in sites {
      let key = PlanKey { date, shift, route, site_id: site_id.clone() };
      if !seen.insert(key) {
        skipped += 1;
        continue;
      }
      plans.push(PlannedAssignment {
        plan_id: Uuid::new_v4(),
        date,
        shift,
        route,
        site_id,
        site_name,
        created_by: created_by.clone(),
        created_at: now,
      });
    }

    let added = plans.len();
    self.insert_plans(plans).await?;
    Ok(BulkInsertOutcome { added, skipped })
  }

  async fn clone_plans(
    &self,
    from_date: NaiveDate,
    to_dates: Vec<NaiveDate>,
    created_by: String,
  ) -> Result<BulkInsertOutcome> {
    let source = self.list_plans(from_date).await?;
    let now = Utc::now();

    let mut outcome = BulkInsertOutcome::default();
    for to_date in to_dates {
      let mut seen = self.existing_keys(to_date).await?;
      let mut plans = Vec::new();
      for plan in &source {
        let key = PlanKey {
          date:    to_date,
          shift:   plan.shift,
          route:   plan.route,
          site_id: plan.site_id.clone(),
        };
        if !seen.insert(key) {
          outcome.skipped += 1;
          continue;
        }
        plans.push(PlannedAssignment {
          plan_id: Uuid::new_v4(),
          date: to_date,
          shift: plan.shift,
          route: plan.route,
          site_id: plan.site_id.clone(),
          site_name: plan.site_name.clone(),
          created_by: created_by.clone(),
          created_at: now,
        });
      }
      outcome.added += plans.len();
      self.insert_plans(plans).await?;
    }

    Ok(outcome)
  }

  async fn delete_plan(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let deleted: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM plans WHERE plan_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(deleted > 0)
  }

  async fn delete_plans(&self, ids: Vec<Uuid>) -> Result<usize> {
    let id_strs: Vec<String> = ids.into_iter().map(encode_uuid).collect();
    let deleted: usize = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut deleted = 0;
        for id in &id_strs {
          deleted +=
            tx.execute("DELETE FROM plans WHERE plan_id = ?1", rusqlite::params![id])?;
        }
        tx.commit()?;
        Ok(deleted)
      })
      .await?;
    Ok(deleted)
  }

  async fn delete_plans_by_filter(&self, filter: PlanFilter) -> Result<usize> {
    let date_str = encode_date(filter.date);
    let shift_str = filter.shift.map(encode_shift);
    let route_str = filter.route.map(encode_route);

    let deleted: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM plans
           WHERE date = ?1
             AND (?2 IS NULL OR shift = ?2)
             AND (?3 IS NULL OR route = ?3)",
          rusqlite::params![date_str, shift_str, route_str],
        )?)
      })
      .await?;
    Ok(deleted)
  }

  // ── Visit log ─────────────────────────────────────────────────────────────

  async fn read_events(
    &self,
    from: NaiveDate,
    to: NaiveDate,
  ) -> Result<Vec<RawEventRow>> {
    let from_str = encode_date(from);
    let to_str = encode_date(to);

    let raws: Vec<RawVisitRow> = self
      .conn
      .call(move |conn| {
        // Rows with no salvageable date are returned for every range; the
        // normalization layer decides what to do with them. Append order is
        // preserved via the rowid.
        let mut stmt = conn.prepare(
          "SELECT timestamp, inspector_name, route_text, site_name_text,
                  guard_name, shift_code, score, gps_text
           FROM visit_log
           WHERE event_date IS NULL
              OR (event_date >= ?1 AND event_date <= ?2)
           ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![from_str, to_str], |row| {
            Ok(RawVisitRow {
              timestamp:      row.get(0)?,
              inspector_name: row.get(1)?,
              route_text:     row.get(2)?,
              site_name_text: row.get(3)?,
              guard_name:     row.get(4)?,
              shift_code:     row.get(5)?,
              score:          row.get(6)?,
              gps_text:       row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(raws.into_iter().map(RawVisitRow::into_event).collect())
  }

  // ── Registries ────────────────────────────────────────────────────────────

  async fn list_sites(&self) -> Result<Vec<SiteRecord>> {
    let raws: Vec<RawSiteRow> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT site_id, code, name_en, name_th, route
           FROM sites ORDER BY site_id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawSiteRow {
              site_id: row.get(0)?,
              code:    row.get(1)?,
              name_en: row.get(2)?,
              name_th: row.get(3)?,
              route:   row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSiteRow::into_site).collect()
  }

  async fn list_inspectors(&self) -> Result<Vec<InspectorRecord>> {
    let raws: Vec<RawInspectorRow> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT name, declared_shift FROM inspectors ORDER BY name",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawInspectorRow {
              name:           row.get(0)?,
              declared_shift: row.get(1)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(raws.into_iter().map(RawInspectorRow::into_inspector).collect())
  }
}
