//! Human-readable reports printed to stdout

use repoman_core::{BatchPartition, FileUpsertOutcome, IssueStats, Owner, UpsertAction};

const SHORT_RULE: usize = 50;
const LONG_RULE: usize = 70;

fn rule(width: usize) -> String {
    "-".repeat(width)
}

fn banner(width: usize) -> String {
    "=".repeat(width + 1)
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

fn summary_heading(owner: &Owner, prefix: Option<&str>) -> String {
    match prefix.filter(|p| !p.is_empty()) {
        Some(prefix) => format!(
            "📊 SUMMARY for repositories with prefix '{}' for {}:",
            prefix, owner
        ),
        None => format!("📊 SUMMARY for all repositories for {}:", owner),
    }
}

/// Clean repositories first, then by total issues, most first
pub fn sort_issue_stats(stats: &mut [IssueStats]) {
    stats.sort_by(|a, b| {
        b.is_clean()
            .cmp(&a.is_clean())
            .then_with(|| b.total_issues.cmp(&a.total_issues))
    });
}

pub fn single_repo_issue_report(owner: &Owner, stats: &IssueStats) -> String {
    let (icon, status) = issue_status(stats);
    let mut lines = vec![
        String::new(),
        "📋 Repository Analysis:".to_string(),
        rule(SHORT_RULE),
        format!("{} Repository: {}/{} ({})", icon, owner.name, stats.repo_name, status),
        format!("📊 Total Issues: {}", stats.total_issues),
    ];
    if stats.is_clean() {
        lines.push("🎉 This repository has no issues!".to_string());
    } else {
        lines.push(format!("🔓 Open Issues: {}", stats.open_issues));
        lines.push(format!("✔️  Closed Issues: {}", stats.closed_issues));
    }
    lines.push(rule(SHORT_RULE));
    lines.join("\n")
}

fn issue_status(stats: &IssueStats) -> (&'static str, &'static str) {
    if stats.is_clean() {
        ("✅", "CLEAN")
    } else {
        ("❌", "HAS ISSUES")
    }
}

/// Per-repository lines followed by totals; sorts `stats` in place
pub fn issue_report(owner: &Owner, prefix: Option<&str>, stats: &mut [IssueStats]) -> String {
    sort_issue_stats(stats);

    let mut lines = vec![
        String::new(),
        "📋 Repository Analysis:".to_string(),
        rule(LONG_RULE),
    ];
    for entry in stats.iter() {
        let (icon, status) = issue_status(entry);
        lines.push(format!(
            "{} Repository: {}/{} ({})",
            icon, owner.name, entry.repo_name, status
        ));
        lines.push(format!("  📊 Total Issues: {}", entry.total_issues));
        if !entry.is_clean() {
            lines.push(format!("  🔓 Open Issues: {}", entry.open_issues));
            lines.push(format!("  ✔️  Closed Issues: {}", entry.closed_issues));
        }
        lines.push(String::new());
    }

    let clean = stats.iter().filter(|s| s.is_clean()).count();
    let with_issues = stats.len() - clean;
    let total: usize = stats.iter().map(|s| s.total_issues).sum();
    let open: usize = stats.iter().map(|s| s.open_issues).sum();
    let closed: usize = stats.iter().map(|s| s.closed_issues).sum();

    lines.push(banner(LONG_RULE));
    lines.push(summary_heading(owner, prefix));
    lines.push(rule(LONG_RULE));
    lines.push(format!("📁 Total Repositories: {}", stats.len()));
    lines.push(format!("✅ Clean Repositories (no issues): {}", clean));
    lines.push(format!("❌ Repositories with issues: {}", with_issues));
    if total > 0 {
        lines.push(rule(LONG_RULE));
        lines.push(format!("🐛 Total Issues across all repos: {}", total));
        lines.push(format!("🔓 Total Open Issues: {}", open));
        lines.push(format!("✔️  Total Closed Issues: {}", closed));
        lines.push(format!(
            "📈 Clean Repository Rate: {:.1}%",
            percent(clean, stats.len())
        ));
    }
    if with_issues == 0 {
        lines.push("🎉 Congratulations! All repositories are clean (no issues)!".to_string());
    }
    lines.push(banner(LONG_RULE));
    lines.join("\n")
}

pub fn single_repo_codeowners_report(owner: &Owner, outcome: &FileUpsertOutcome) -> String {
    let verb = match outcome.action {
        UpsertAction::Created => "added",
        UpsertAction::Updated => "updated",
    };
    let mut lines = vec![
        String::new(),
        "📋 CODEOWNERS Update Result:".to_string(),
        rule(SHORT_RULE),
        format!("✅ Repository: {}/{} (SUCCESS)", owner.name, outcome.repo_name),
        format!("📝 CODEOWNERS file successfully {}", verb),
        format!("📍 Location: {}", outcome.path),
    ];
    if let Some(sha) = &outcome.commit_sha {
        lines.push(format!("🔖 Commit: {}", sha));
    }
    lines.push(rule(SHORT_RULE));
    lines.join("\n")
}

/// Sorted success and failure lists followed by totals
pub fn codeowners_report(
    owner: &Owner,
    prefix: Option<&str>,
    partition: &BatchPartition,
    path: &str,
) -> String {
    let mut succeeded = partition.succeeded.clone();
    let mut failed = partition.failed.clone();
    succeeded.sort();
    failed.sort();

    let mut lines = vec![
        String::new(),
        "📋 CODEOWNERS Update Results:".to_string(),
        rule(LONG_RULE),
    ];
    if !succeeded.is_empty() {
        lines.push(format!(
            "✅ SUCCESSFUL UPDATES ({} repositories):",
            succeeded.len()
        ));
        lines.extend(succeeded.iter().map(|r| format!("  ✅ {}/{}", owner.name, r)));
        lines.push(String::new());
    }
    if !failed.is_empty() {
        lines.push(format!("❌ FAILED UPDATES ({} repositories):", failed.len()));
        lines.extend(failed.iter().map(|r| format!("  ❌ {}/{}", owner.name, r)));
        lines.push(String::new());
    }

    let total = partition.total();
    lines.push(banner(LONG_RULE));
    lines.push(summary_heading(owner, prefix));
    lines.push(rule(LONG_RULE));
    lines.push(format!("📁 Total Repositories: {}", total));
    lines.push(format!("✅ Successful Updates: {}", succeeded.len()));
    lines.push(format!("❌ Failed Updates: {}", failed.len()));
    if total > 0 {
        lines.push(format!(
            "📈 Success Rate: {:.1}%",
            percent(succeeded.len(), total)
        ));
    }
    if !succeeded.is_empty() {
        lines.push(format!("📍 CODEOWNERS files added/updated at: {}", path));
    }
    if failed.is_empty() && total > 0 {
        lines.push("🎉 All repositories successfully updated!".to_string());
    }
    lines.push(banner(LONG_RULE));
    lines.join("\n")
}
