//! Two-stage schema mapping.
//!
//! - [`auto_map`]: fuzzy, similarity-driven (codelist values).
//! - [`override_map`]: curated (asset classes, attributes).
//!
//! Both work over anything implementing [`SchemaEntity`] and share the same
//! coverage guarantee: every source item yields exactly one row and every
//! distinct target item appears at least once.

use std::collections::HashSet;

use crate::correspondence::Correspondence;
use crate::overrides::OverrideMap;
use crate::similarity::best_match;

/// Auto-matches scoring at or below this are discarded.
pub const AUTO_MATCH_THRESHOLD: f64 = 0.1;

/// Anything with a comparable name.
pub trait SchemaEntity {
    fn entity_name(&self) -> &str;
}

impl SchemaEntity for str {
    fn entity_name(&self) -> &str {
        self
    }
}

impl SchemaEntity for String {
    fn entity_name(&self) -> &str {
        self
    }
}

impl<T: SchemaEntity + ?Sized> SchemaEntity for &T {
    fn entity_name(&self) -> &str {
        (**self).entity_name()
    }
}

/// Which mapping stage to run.
#[derive(Debug, Clone, Copy)]
pub enum Strategy<'a> {
    Auto,
    Override(&'a OverrideMap),
}

/// Run either stage.
pub fn compare<S: SchemaEntity, T: SchemaEntity>(
    sources: &[S],
    targets: &[T],
    strategy: Strategy<'_>,
) -> Vec<Correspondence> {
    match strategy {
        Strategy::Auto => auto_map(sources, targets),
        Strategy::Override(overrides) => override_map(sources, targets, overrides),
    }
}

/// Match each source against the target list case-insensitively and keep
/// matches scoring above [`AUTO_MATCH_THRESHOLD`]; then add every target
/// nobody matched as target-only.
pub fn auto_map<S: SchemaEntity, T: SchemaEntity>(
    sources: &[S],
    targets: &[T],
) -> Vec<Correspondence> {
    let upper_targets: Vec<String> = targets
        .iter()
        .map(|t| t.entity_name().to_uppercase())
        .collect();

    let mut rows = Vec::with_capacity(sources.len() + targets.len());
    let mut matched: HashSet<&str> = HashSet::new();

    for source in sources {
        let name = source.entity_name();
        let best = if upper_targets.is_empty() {
            None
        } else {
            best_match(&name.to_uppercase(), &upper_targets).ok()
        };

        match best {
            Some(best) if best.score > AUTO_MATCH_THRESHOLD => {
                let target = targets[best.index].entity_name();
                matched.insert(target);
                rows.push(Correspondence::paired(name, target).with_similarity(best.score));
            }
            _ => rows.push(Correspondence::source_only(name)),
        }
    }

    push_unclaimed_targets(&mut rows, targets, &matched);
    rows
}

/// Attach the curated target to each source. Override keys missing from the
/// source list are still reported (with their target) so every curated pair
/// shows up exactly once; targets no source claimed are added as
/// target-only.
pub fn override_map<S: SchemaEntity, T: SchemaEntity>(
    sources: &[S],
    targets: &[T],
    overrides: &OverrideMap,
) -> Vec<Correspondence> {
    let mut rows = Vec::with_capacity(sources.len() + targets.len());
    let mut claimed: HashSet<&str> = HashSet::new();
    let mut seen_sources: HashSet<&str> = HashSet::new();

    for source in sources {
        let name = source.entity_name();
        seen_sources.insert(name);
        match overrides.get(name) {
            Some(target) => {
                claimed.insert(target);
                rows.push(Correspondence::paired(name, target));
            }
            None => rows.push(Correspondence::source_only(name)),
        }
    }

    for (source, target) in overrides.iter() {
        if seen_sources.contains(source) {
            continue;
        }
        tracing::debug!(source, target, "override key not present in source list");
        claimed.insert(target);
        rows.push(Correspondence::paired(source, target));
    }

    push_unclaimed_targets(&mut rows, targets, &claimed);
    rows
}

fn push_unclaimed_targets<T: SchemaEntity>(
    rows: &mut Vec<Correspondence>,
    targets: &[T],
    claimed: &HashSet<&str>,
) {
    let mut emitted: HashSet<&str> = HashSet::new();
    for target in targets {
        let name = target.entity_name();
        if claimed.contains(name) || !emitted.insert(name) {
            continue;
        }
        rows.push(Correspondence::target_only(name));
    }
}
