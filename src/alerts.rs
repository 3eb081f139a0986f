//! Alert evaluation over the watchlist.
//!
//! A coin alerts when the absolute 24h change reaches its threshold; a
//! missing or zero change never alerts. Firing and acknowledgment happen in
//! one pass with a fixed ordering: collect alerting coins, take the ones not
//! yet acknowledged as new, union them into the acknowledged set, then prune
//! acknowledged coins that stopped alerting. After every pass the
//! acknowledged set is a subset of the alerting set, and a coin that stops
//! alerting becomes eligible to notify again on a future breach.

use std::collections::{HashMap, HashSet};

use crate::cache::price_cache::PriceSnapshot;
use crate::stores::watchlist::WatchlistEntry;

pub fn is_alerting(change_24h: Option<f64>, threshold: f64) -> bool {
    match change_24h {
        Some(change) if change != 0.0 => change.abs() >= threshold,
        _ => false,
    }
}

/// Result of one evaluation pass. Coin ids are sorted for stable output.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertPass {
    pub alerting: Vec<String>,
    pub new_alerts: Vec<String>,
}

impl AlertPass {
    pub fn has_new_alert(&self) -> bool {
        !self.new_alerts.is_empty()
    }
}

/// Holds the process-lifetime acknowledged set. Transient by design; a
/// restart re-notifies for everything still alerting.
#[derive(Debug, Default)]
pub struct AlertEvaluator {
    acknowledged: HashSet<String>,
}

impl AlertEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn evaluate(
        &mut self,
        watchlist: &HashMap<String, WatchlistEntry>,
        quotes: &HashMap<String, PriceSnapshot>,
    ) -> AlertPass {
        let alerting: HashSet<String> = watchlist
            .iter()
            .filter(|(coin_id, entry)| {
                quotes
                    .get(*coin_id)
                    .is_some_and(|quote| is_alerting(quote.change_24h, entry.threshold))
            })
            .map(|(coin_id, _)| coin_id.clone())
            .collect();

        let mut new_alerts: Vec<String> = alerting
            .difference(&self.acknowledged)
            .cloned()
            .collect();

        self.acknowledged.extend(new_alerts.iter().cloned());
        self.acknowledged.retain(|coin_id| alerting.contains(coin_id));

        let mut alerting: Vec<String> = alerting.into_iter().collect();
        alerting.sort();
        new_alerts.sort();

        AlertPass {
            alerting,
            new_alerts,
        }
    }

    #[cfg(test)]
    fn acknowledged(&self) -> &HashSet<String> {
        &self.acknowledged
    }
}
