//! Simulation report generation.

use crate::essence::{EssenceType, SessionOutcome};
use crate::error::SimResult;
use serde::Serialize;
use std::collections::BTreeMap;

/// Aggregated results from multiple sessions.
#[derive(Debug, Clone, Serialize)]
pub struct SimReport {
    pub num_sessions: u32,
    pub profitable_sessions: u32,

    // Profit distribution, in exalted orbs
    pub avg_profit: f64,
    pub median_profit: f64,
    pub min_profit: f64,
    pub max_profit: f64,

    // Averages per session
    pub avg_initial_cost: f64,
    pub avg_conversions: f64,
    pub avg_majors_obtained: f64,
    pub avg_major_value: f64,
    pub avg_protected_value: f64,
    pub avg_total_value: f64,

    /// Greater essences obtained across every session
    pub major_totals: BTreeMap<EssenceType, u64>,
}

fn mean(values: impl Iterator<Item = f64>, count: usize) -> f64 {
    values.sum::<f64>() / count.max(1) as f64
}

impl SimReport {
    /// Create a new report from finished sessions.
    pub fn from_outcomes(outcomes: &[SessionOutcome]) -> Self {
        let n = outcomes.len();
        let profitable_sessions = outcomes.iter().filter(|o| o.is_profitable()).count() as u32;

        let mut profits: Vec<f64> = outcomes.iter().map(|o| o.profit).collect();
        profits.sort_by(f64::total_cmp);
        let median_profit = match n {
            0 => 0.0,
            _ if n % 2 == 1 => profits[n / 2],
            _ => (profits[n / 2 - 1] + profits[n / 2]) / 2.0,
        };

        let mut major_totals = BTreeMap::new();
        for outcome in outcomes {
            for (essence, count) in &outcome.major_counts {
                *major_totals.entry(*essence).or_insert(0) += count;
            }
        }

        Self {
            num_sessions: n as u32,
            profitable_sessions,
            avg_profit: mean(profits.iter().copied(), n),
            median_profit,
            min_profit: profits.first().copied().unwrap_or(0.0),
            max_profit: profits.last().copied().unwrap_or(0.0),
            avg_initial_cost: mean(outcomes.iter().map(|o| o.initial_cost), n),
            avg_conversions: mean(outcomes.iter().map(|o| o.total_conversions as f64), n),
            avg_majors_obtained: mean(outcomes.iter().map(|o| o.majors_obtained() as f64), n),
            avg_major_value: mean(outcomes.iter().map(|o| o.major_value), n),
            avg_protected_value: mean(outcomes.iter().map(|o| o.protected_value), n),
            avg_total_value: mean(outcomes.iter().map(|o| o.total_value), n),
            major_totals,
        }
    }

    /// Share of sessions that ended with a positive profit, as a percentage.
    pub fn profitable_rate(&self) -> f64 {
        if self.num_sessions == 0 {
            0.0
        } else {
            self.profitable_sessions as f64 / self.num_sessions as f64 * 100.0
        }
    }

    /// Generate a text report.
    pub fn to_text(&self) -> String {
        let mut report = String::new();

        report.push_str("═══════════════════════════════════════════════════════════════\n");
        report.push_str("                 ESSENCE CONVERSION REPORT\n");
        report.push_str("═══════════════════════════════════════════════════════════════\n\n");

        report.push_str(&format!(
            "Sessions: {} total, {} profitable ({:.1}%)\n\n",
            self.num_sessions,
            self.profitable_sessions,
            self.profitable_rate()
        ));

        report.push_str("── PROFIT (exalted) ─────────────────────────────────────────────\n");
        report.push_str(&format!("  Average:   {:>10.2}\n", self.avg_profit));
        report.push_str(&format!("  Median:    {:>10.2}\n", self.median_profit));
        report.push_str(&format!("  Min:       {:>10.2}\n", self.min_profit));
        report.push_str(&format!("  Max:       {:>10.2}\n\n", self.max_profit));

        report.push_str("── PER SESSION ──────────────────────────────────────────────────\n");
        report.push_str(&format!("  Initial Cost:     {:>10.2}\n", self.avg_initial_cost));
        report.push_str(&format!("  Conversions:      {:>10.1}\n", self.avg_conversions));
        report.push_str(&format!("  Greater Obtained: {:>10.2}\n", self.avg_majors_obtained));
        report.push_str(&format!("  Greater Value:    {:>10.2}\n", self.avg_major_value));
        report.push_str(&format!("  Kept Lesser:      {:>10.2}\n", self.avg_protected_value));
        report.push_str(&format!("  Total Value:      {:>10.2}\n\n", self.avg_total_value));

        report.push_str("── GREATER ESSENCES ─────────────────────────────────────────────\n");
        let total_majors: u64 = self.major_totals.values().sum();
        for essence in EssenceType::ALL {
            let count = self.major_totals.get(&essence).copied().unwrap_or(0);
            let pct = if total_majors > 0 {
                count as f64 / total_majors as f64 * 100.0
            } else {
                0.0
            };
            let bar: String = "█".repeat((pct / 2.0) as usize);
            report.push_str(&format!(
                "  {:<12} {:>8} {:>5.1}% {}\n",
                essence.name(),
                count,
                pct,
                bar
            ));
        }

        report.push_str("\n═══════════════════════════════════════════════════════════════\n");

        report
    }

    /// Generate a JSON report for further analysis.
    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
