//! Fixed-size coordinate zones for interval overlap joins.
//!
//! Every interval is written once per zone it touches, keyed by chromosome.
//! A shared zone only means two intervals *might* overlap: the zone join
//! always travels with an exact bounds check.
//!
//! Zone size is a single setting of the knowledge database. Changing it
//! invalidates every zone table; refresh them all afterwards.

use std::fmt;
use std::ops::RangeInclusive;

use crate::catalog::{Namespace, REGION_ZONE_TABLE};
use crate::config::ConfigError;
use crate::store::{KnowledgeStore, StoreError};

/// Bases per zone; always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ZoneSize(i64);

impl ZoneSize {
    pub fn new(size: i64) -> Result<Self, ConfigError> {
        if size > 0 {
            Ok(ZoneSize(size))
        } else {
            Err(ConfigError::InvalidZoneSize(size))
        }
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ZoneSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Zones touched by `[start, end]` widened by `margin` on both sides.
pub fn zone_range(start: i64, end: i64, margin: i64, zone_size: ZoneSize) -> RangeInclusive<i64> {
    let size = zone_size.get();
    (start - margin).div_euclid(size)..=(end + margin).div_euclid(size)
}

/// Rebuilds zone tables from the intervals they index.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZoneIndexer {
    margin: i64,
}

impl ZoneIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_margin(margin: i64) -> Self {
        ZoneIndexer { margin }
    }

    /// Rebuilds `<namespace>.region_zone` from `<namespace>.region`, first
    /// flipping any region stored with `posMin > posMax`. Returns the
    /// number of zone rows written.
    pub fn refresh_region_zones(
        &self,
        store: &mut KnowledgeStore,
        namespace: Namespace,
    ) -> Result<usize, StoreError> {
        if !matches!(namespace, Namespace::Main | Namespace::Alt) {
            return Err(StoreError::NoZoneTable { namespace });
        }
        let zone_size = store.zone_size()?;
        let schema = namespace.schema_name();
        log::info!("calculating {} region zone coverage ...", schema);

        let transaction = store.connection_mut().transaction()?;
        transaction.execute(
            &format!(
                "UPDATE `{}`.`region` SET posMin = posMax, posMax = posMin WHERE posMin > posMax",
                schema
            ),
            (),
        )?;
        transaction.execute(&format!("DELETE FROM `{}`.`{}`", schema, REGION_ZONE_TABLE), ())?;

        let regions: Vec<(i64, i64, i64, i64)> = {
            let mut select = transaction.prepare(&format!(
                "SELECT rowid, chr, posMin, posMax FROM `{}`.`region`",
                schema
            ))?;
            let rows = select.query_map((), |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })?;
            rows.collect::<Result<Vec<_>, _>>()?
        };

        let mut written = 0;
        {
            let mut insert = transaction.prepare(&format!(
                "INSERT OR IGNORE INTO `{}`.`{}` (region_rowid, chr, zone) VALUES (?1, ?2, ?3)",
                schema, REGION_ZONE_TABLE
            ))?;
            for (rowid, chr, pos_min, pos_max) in &regions {
                for zone in zone_range(*pos_min, *pos_max, self.margin, zone_size) {
                    written += insert.execute((rowid, chr, zone))?;
                }
            }
        }
        transaction.commit()?;

        log::info!(
            "{} region zone coverage: {} zones for {} regions",
            schema,
            written,
            regions.len()
        );
        Ok(written)
    }

    /// Rebuilds `db.biopolymer_zone` from the per-chromosome envelope of
    /// each biopolymer's regions.
    pub fn refresh_biopolymer_zones(&self, store: &mut KnowledgeStore) -> Result<usize, StoreError> {
        let zone_size = store.zone_size()?;
        log::info!("calculating zone coverage ...");

        let transaction = store.connection_mut().transaction()?;
        transaction.execute(
            "UPDATE `db`.`biopolymer_region` SET posMin = posMax, posMax = posMin WHERE posMin > posMax",
            (),
        )?;
        transaction.execute("DELETE FROM `db`.`biopolymer_zone`", ())?;

        let envelopes: Vec<(i64, i64, i64, i64)> = {
            let mut select = transaction.prepare(
                "SELECT biopolymer_id, chr, MIN(posMin), MAX(posMax) FROM `db`.`biopolymer_region` GROUP BY biopolymer_id, chr",
            )?;
            let rows = select.query_map((), |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })?;
            rows.collect::<Result<Vec<_>, _>>()?
        };

        let mut written = 0;
        {
            let mut insert = transaction.prepare(
                "INSERT OR IGNORE INTO `db`.`biopolymer_zone` (biopolymer_id, chr, zone) VALUES (?1, ?2, ?3)",
            )?;
            for (biopolymer_id, chr, pos_min, pos_max) in &envelopes {
                for zone in zone_range(*pos_min, *pos_max, self.margin, zone_size) {
                    written += insert.execute((biopolymer_id, chr, zone))?;
                }
            }
        }
        transaction.commit()?;

        log::info!(
            "calculating zone coverage completed: {} records ({} regions)",
            written,
            envelopes.len()
        );
        Ok(written)
    }
}
