//! Run-time values substituted into catalog templates.

use crate::catalog::{Placeholder, TemplateParams};
use crate::config::{AmbiguityReduction, ConfigError, QueryConfig};
use crate::errors::AnnographError;
use crate::store::KnowledgeStore;
use crate::zone_index::ZoneSize;

/// Configuration plus the store lookups it implies, resolved once per run.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParameters {
    pub config: QueryConfig,
    pub zone_size: ZoneSize,
    pub ld_profile_id: i64,
    /// `None` when the store has no `gene` type; gene sources then fail to
    /// render.
    pub gene_type_id: Option<i64>,
    pub symbol_namespace_id: Option<i64>,
}

impl QueryParameters {
    pub fn new(config: QueryConfig, zone_size: ZoneSize, ld_profile_id: i64) -> Self {
        QueryParameters {
            config,
            zone_size,
            ld_profile_id,
            gene_type_id: None,
            symbol_namespace_id: None,
        }
    }

    pub fn with_gene_type_id(mut self, type_id: i64) -> Self {
        self.gene_type_id = Some(type_id);
        self
    }

    pub fn with_symbol_namespace_id(mut self, namespace_id: i64) -> Self {
        self.symbol_namespace_id = Some(namespace_id);
        self
    }

    /// Look up everything the configuration names. An unknown LD profile or
    /// a missing zone size fails here, before any SQL is built.
    pub fn resolve(config: QueryConfig, store: &KnowledgeStore) -> Result<Self, AnnographError> {
        let zone_size = store.zone_size()?;
        let ld_profile_id = store
            .ld_profile_id(&config.ld_profile)?
            .ok_or_else(|| ConfigError::UnknownLdProfile {
                profile: config.ld_profile.clone(),
            })?;
        let gene_type_id = store.type_id("gene")?;
        let symbol_namespace_id = store.namespace_id("symbol")?;

        if gene_type_id.is_none() {
            log::warn!("No 'gene' type in the knowledge database; gene columns are unavailable");
        }

        Ok(QueryParameters {
            config,
            zone_size,
            ld_profile_id,
            gene_type_id,
            symbol_namespace_id,
        })
    }

    /// Template values for one compile. `apply_offset` shifts output
    /// positions into the configured coordinate base.
    pub fn template_params(&self, apply_offset: bool) -> TemplateParams {
        let config = &self.config;
        let mut params = TemplateParams::new();

        params
            .set(Placeholder::ZoneSize, self.zone_size.get())
            .set(Placeholder::LdProfileId, self.ld_profile_id)
            .set(Placeholder::RegionPositionMargin, config.region_position_margin)
            .set(
                Placeholder::RegionMatchPercent,
                config
                    .region_match_percent
                    .map_or_else(|| "NULL".to_string(), |p| p.to_string()),
            )
            .set(
                Placeholder::RegionMatchBases,
                config
                    .region_match_bases
                    .map_or_else(|| "NULL".to_string(), |b| b.to_string()),
            )
            .set(
                Placeholder::AllowUnvalidatedPositions,
                u8::from(config.allow_unvalidated_snp_positions),
            )
            .set(
                Placeholder::AmbiguityCondition,
                if config.allow_ambiguous_knowledge { "> 0" } else { ">= 100" },
            );

        let (column1, column2) = match config.reduce_ambiguous_knowledge {
            AmbiguityReduction::No => ("specificity", "specificity"),
            AmbiguityReduction::Implication => ("implication", "implication"),
            AmbiguityReduction::Quality => ("quality", "quality"),
            AmbiguityReduction::Any => ("implication", "quality"),
        };
        params
            .set(Placeholder::AmbiguityColumn1, column1)
            .set(Placeholder::AmbiguityColumn2, column2);

        let (min_offset, max_offset) = if apply_offset {
            coordinate_offsets(config.coordinate_base, config.regions_half_open)
        } else {
            (String::new(), String::new())
        };
        params
            .set(Placeholder::PositionMinOffset, min_offset)
            .set(Placeholder::PositionMaxOffset, max_offset);

        if let Some(type_id) = self.gene_type_id {
            params.set(Placeholder::GeneTypeId, type_id);
        }
        if let Some(namespace_id) = self.symbol_namespace_id {
            params.set(Placeholder::SymbolNamespaceId, namespace_id);
        }
        params
    }
}

/// Stored positions are 1-based closed intervals.
fn coordinate_offsets(base: u8, half_open: bool) -> (String, String) {
    let shift = i64::from(base) - 1;
    let min = if base != 1 {
        format!("+ {}", shift)
    } else {
        String::new()
    };
    let max = if base != 1 || half_open {
        format!("+ {}", shift + i64::from(half_open))
    } else {
        String::new()
    };
    (min, max)
}
