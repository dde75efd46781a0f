//! Summary statistics, rankings and engagement trends.
//!
//! Everything here is a pure function of a [`ConsolidatedResult`]: no I/O, no
//! clock reads. Empty input yields zeros and empty rankings.

use std::collections::BTreeMap;

use tikboard_core::{PostMetric, ScrapedAccount, User};

use crate::types::{
    ConsolidatedResult, EngagementTrend, Rankings, SummaryResult, SummaryStats, TopAccount,
    TopPost, TopUser, Trends,
};

/// Length of every ranked list.
pub const TOP_N: usize = 5;

const EMAIL_UNKNOWN: &str = "N/A";

/// Computes the summary of a consolidation.
#[must_use]
pub fn summarize(consolidated: &ConsolidatedResult) -> SummaryResult {
    let items = &consolidated.metrics.items;
    SummaryResult {
        summary: summary_stats(consolidated),
        rankings: Rankings {
            top_users: top_users(&consolidated.users, &consolidated.scraped_accounts),
            top_accounts: top_accounts(items),
            best_engagement: best_engagement(items),
        },
        trends: trends(items),
        timestamp: consolidated.metadata.timestamp,
    }
}

fn summary_stats(consolidated: &ConsolidatedResult) -> SummaryStats {
    let items = &consolidated.metrics.items;
    let reported: Vec<f64> = items.iter().filter_map(|p| p.engagement).collect();

    SummaryStats {
        total_users: consolidated.metadata.total_users,
        total_accounts: consolidated.metadata.total_accounts,
        average_engagement: round2(mean(&reported)),
        total_views: items.iter().map(|p| p.views).fold(0, u64::saturating_add),
        total_likes: items.iter().map(|p| p.likes).fold(0, u64::saturating_add),
        total_interactions: items
            .iter()
            .map(|p| p.total_interactions)
            .fold(0, u64::saturating_add),
    }
}

/// Owners ranked by number of scraped accounts.
fn top_users(users: &[User], accounts: &[ScrapedAccount]) -> Vec<TopUser> {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for owner in accounts.iter().filter_map(|a| a.user_id) {
        *counts.entry(owner).or_default() += 1;
    }

    let mut ranked: Vec<(i64, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    ranked
        .into_iter()
        .take(TOP_N)
        .map(|(user_id, accounts_count)| TopUser {
            user_id,
            accounts_count,
            email: users
                .iter()
                .find(|u| u.id == Some(user_id))
                .and_then(|u| u.email.clone())
                .unwrap_or_else(|| EMAIL_UNKNOWN.to_owned()),
        })
        .collect()
}

/// Accounts ranked by summed post engagement.
fn top_accounts(items: &[PostMetric]) -> Vec<TopAccount> {
    let mut by_account: BTreeMap<&str, TopAccount> = BTreeMap::new();
    for post in items {
        let Some(name) = post.account.as_deref() else {
            continue;
        };
        let entry = by_account.entry(name).or_insert_with(|| TopAccount {
            account: name.to_owned(),
            total_views: 0,
            total_likes: 0,
            total_engagement: 0.0,
            post_count: 0,
        });
        entry.total_views = entry.total_views.saturating_add(post.views);
        entry.total_likes = entry.total_likes.saturating_add(post.likes);
        entry.total_engagement += post.engagement.unwrap_or(0.0);
        entry.post_count += 1;
    }

    let mut ranked: Vec<TopAccount> = by_account.into_values().collect();
    ranked.sort_by(|a, b| {
        b.total_engagement
            .total_cmp(&a.total_engagement)
            .then_with(|| a.account.cmp(&b.account))
    });
    ranked.truncate(TOP_N);
    ranked
}

/// Individual posts ranked by engagement; a missing value ranks as zero.
fn best_engagement(items: &[PostMetric]) -> Vec<TopPost> {
    let mut ranked: Vec<&PostMetric> = items.iter().collect();
    ranked.sort_by(|a, b| {
        engagement_of(b)
            .total_cmp(&engagement_of(a))
            .then_with(|| a.post_id.cmp(&b.post_id))
            .then_with(|| a.account.cmp(&b.account))
    });

    ranked
        .into_iter()
        .take(TOP_N)
        .map(|post| TopPost {
            post_id: post.post_id.clone(),
            account: post.account.clone(),
            engagement: post.engagement,
            views: post.views,
            likes: post.likes,
        })
        .collect()
}

/// Compares mean engagement of the newer half of the posts against the older half.
fn trends(items: &[PostMetric]) -> Trends {
    if items.len() < 2 {
        return Trends {
            growth_rate: 0.0,
            engagement_trend: EngagementTrend::InsufficientData,
        };
    }

    let mut by_date: Vec<&PostMetric> = items.iter().collect();
    // Undated posts sort first.
    by_date.sort_by(|a, b| a.date_posted.cmp(&b.date_posted));

    let (older, newer) = by_date.split_at(by_date.len() / 2);
    let first = mean(&older.iter().map(|p| engagement_of(p)).collect::<Vec<_>>());
    let second = mean(&newer.iter().map(|p| engagement_of(p)).collect::<Vec<_>>());

    let engagement_trend = if second > first * 1.1 {
        EngagementTrend::Increasing
    } else if second < first * 0.9 {
        EngagementTrend::Decreasing
    } else {
        EngagementTrend::Stable
    };
    let growth_rate = if first.abs() < f64::EPSILON {
        0.0
    } else {
        round2((second - first) / first * 100.0)
    };

    Trends {
        growth_rate,
        engagement_trend,
    }
}

fn engagement_of(post: &PostMetric) -> f64 {
    post.engagement.unwrap_or(0.0)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let len = values.len() as f64;
    values.iter().sum::<f64>() / len
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
#[path = "aggregate_test.rs"]
mod tests;
