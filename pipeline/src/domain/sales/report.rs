//! KPI and per-channel summaries of the persisted fact table

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};

use crate::data::types::SalesFact;

/// Totals over a set of facts. `orders` counts distinct order ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricTotals {
    pub orders: usize,
    pub gross_revenue: f64,
    pub discounts: f64,
    pub net_revenue: f64,
}

impl MetricTotals {
    pub fn from_facts<'a>(facts: impl IntoIterator<Item = &'a SalesFact>) -> Self {
        let mut order_ids = HashSet::new();
        let mut totals = Self::default();
        for fact in facts {
            order_ids.insert(fact.order_id);
            totals.gross_revenue += fact.gross_revenue;
            totals.discounts += fact.discounts;
            totals.net_revenue += fact.net_revenue;
        }
        totals.orders = order_ids.len();
        totals
    }
}

/// Yesterday / month-to-date / year-to-date totals relative to `today`
#[derive(Debug, Clone, PartialEq)]
pub struct KpiSummary {
    pub today: NaiveDate,
    pub yesterday: MetricTotals,
    pub month_to_date: MetricTotals,
    pub year_to_date: MetricTotals,
}

pub fn kpi_summary(facts: &[SalesFact], today: NaiveDate) -> KpiSummary {
    let yesterday = today - Duration::days(1);
    let to_date = |f: &&SalesFact| f.date <= today && f.date.year() == today.year();

    KpiSummary {
        today,
        yesterday: MetricTotals::from_facts(facts.iter().filter(|f| f.date == yesterday)),
        month_to_date: MetricTotals::from_facts(
            facts
                .iter()
                .filter(to_date)
                .filter(|f| f.date.month() == today.month()),
        ),
        year_to_date: MetricTotals::from_facts(facts.iter().filter(to_date)),
    }
}

/// Cumulative totals per channel, sorted by channel name
pub fn channel_summary(facts: &[SalesFact]) -> Vec<(String, MetricTotals)> {
    let mut by_channel: BTreeMap<&str, Vec<&SalesFact>> = BTreeMap::new();
    for fact in facts {
        by_channel.entry(fact.channel.as_str()).or_default().push(fact);
    }
    by_channel
        .into_iter()
        .map(|(channel, facts)| (channel.to_string(), MetricTotals::from_facts(facts)))
        .collect()
}

impl fmt::Display for KpiSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Daily KPI summary ({})", self.today)?;
        writeln!(
            f,
            "{:<16}{:>16}{:>16}{:>16}",
            "Metric", "Yesterday", "Month-to-Date", "Year-to-Date"
        )?;
        let periods = [&self.yesterday, &self.month_to_date, &self.year_to_date];
        writeln!(
            f,
            "{:<16}{:>16}{:>16}{:>16}",
            "Orders", periods[0].orders, periods[1].orders, periods[2].orders
        )?;
        let money_rows: [(&str, fn(&MetricTotals) -> f64); 3] = [
            ("Gross Revenue", |t| t.gross_revenue),
            ("Discounts", |t| t.discounts),
            ("Net Revenue", |t| t.net_revenue),
        ];
        for (label, metric) in money_rows {
            writeln!(
                f,
                "{:<16}{:>16.2}{:>16.2}{:>16.2}",
                label,
                metric(periods[0]),
                metric(periods[1]),
                metric(periods[2])
            )?;
        }
        Ok(())
    }
}

/// Render a channel summary as a fixed-width table
pub fn format_channel_summary(rows: &[(String, MetricTotals)]) -> String {
    let mut out = format!(
        "{:<20}{:>10}{:>16}{:>16}{:>16}\n",
        "Channel", "Orders", "Gross Revenue", "Discounts", "Net Revenue"
    );
    for (channel, totals) in rows {
        out.push_str(&format!(
            "{:<20}{:>10}{:>16.2}{:>16.2}{:>16.2}\n",
            channel, totals.orders, totals.gross_revenue, totals.discounts, totals.net_revenue
        ));
    }
    out
}
