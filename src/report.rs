//! Terminal rendering of analysis reports

use colored::Colorize;

use crate::analyzer::{BlameReport, BranchReport, CommitSummary, FullAnalysis, HotFilesReport, SuggestReport};
use crate::classify::{Classification, DiffReview, Severity};
use crate::insights::{
    CleanupReport, CommitSize, ConflictReport, DocsReport, ImpactReport, PerformanceReport,
    WorkflowReport,
};

fn header(icon: &str, title: &str) {
    println!("{} {}", icon, title.bold());
    println!("{}", "=".repeat(title.chars().count() + 3).dimmed());
}

fn truncation_note(truncated: bool) {
    if truncated {
        println!(
            "{} {}",
            "!".yellow(),
            "Results are incomplete: output was cut off or a record limit was reached".dimmed()
        );
    }
}

pub fn print_analysis(report: &FullAnalysis) {
    println!();
    header("🎯", "GitSmart Analysis Report");
    println!();

    print_commit_summary(&report.commits);
    print_branches(&report.branches);
    print_hot_files(&report.hot_files);
    print_cleanup(&report.cleanup);
}

pub fn print_commit_summary(summary: &CommitSummary) {
    header("📊", "Repository Analysis");
    println!("Total commits: {}", summary.total_commits.to_string().cyan());

    if summary.total_commits == 0 {
        println!("{}\n", "No commit history found.".dimmed());
        return;
    }

    println!(
        "Total changes: {} {} lines",
        format!("+{}", summary.totals.insertions).green(),
        format!("-{}", summary.totals.deletions).red()
    );

    if let Some(ref top) = summary.most_active {
        println!(
            "Most active author: {} ({} commits)",
            top.author.cyan(),
            top.commits
        );
    }

    if let Some(ref latest) = summary.latest {
        println!("Latest commit: {} {}", latest.subject, format!("({})", latest.author).dimmed());
    }

    if let Some(span) = summary.span {
        println!(
            "History sampled: {} to {} ({} days)",
            span.first,
            span.last,
            span.days()
        );
    }

    truncation_note(summary.truncated);
    println!();
}

pub fn print_branches(report: &BranchReport) {
    header("🌿", "Branch Analysis");

    if report.total == 0 {
        println!("{}\n", "No branches found.".dimmed());
        return;
    }

    println!("Total branches: {}", report.total);
    println!(
        "Current branch: {}",
        report.current.as_deref().unwrap_or("unknown").cyan()
    );
    println!("Active branches: {}", report.summary.active);
    println!(
        "Merged branches (can be deleted): {}",
        report.summary.merged.to_string().yellow()
    );

    if !report.deletable.is_empty() {
        println!("\n🚮 Branches that can be safely deleted:");
        for name in &report.deletable {
            println!("  {} {}", "•".yellow(), name);
        }
    }

    truncation_note(report.truncated);
    println!();
}

pub fn print_hot_files(report: &HotFilesReport) {
    header("🔥", "Frequently Changed Files");

    if report.files.is_empty() {
        println!("{}\n", "No files found in repository.".dimmed());
        return;
    }

    println!("Top {} most frequently changed files:", report.files.len());
    for file in &report.files {
        println!(
            "{:>3} changes: {} {}",
            file.changes.to_string().red(),
            file.path,
            format!("({})", file.last_author).dimmed()
        );
    }

    truncation_note(report.truncated);
    println!();
}

pub fn print_cleanup(report: &CleanupReport) {
    header("🧹", "Cleanup Suggestions");

    if report.is_clean() {
        println!("{} Working directory is clean", "✓".green().bold());
    } else {
        if report.modified > 0 {
            println!(
                "📝 Modified files: {} (consider committing changes)",
                report.modified
            );
        }
        if report.untracked > 0 {
            println!(
                "❓ Untracked files: {} (consider adding to .gitignore)",
                report.untracked
            );
        }
    }

    if report.stashes > 0 {
        println!(
            "💼 Stashed changes: {} (consider reviewing or applying)",
            report.stashes
        );
    }

    println!();
}

pub fn print_blame(report: &BlameReport) {
    header("🔍", &format!("Smart Blame: {}", report.path));

    if report.lines.is_empty() {
        println!("{}\n", "No blame information available.".dimmed());
        return;
    }

    for line in &report.lines {
        println!(
            "{:>3}: {} - {}",
            line.line_number,
            line.author.cyan(),
            line.subject.as_deref().unwrap_or("(subject unavailable)")
        );
    }

    if report.truncated {
        println!(
            "{}",
            format!("... (showing first {} lines)", report.lines.len()).dimmed()
        );
    }
    println!();
}

pub fn print_suggestions(report: &SuggestReport) {
    header("🤖", "Commit Message Suggestions");

    let result = match report.classification {
        Classification::Empty => {
            println!("No staged changes found. Use 'git add' to stage changes first.\n");
            return;
        }
        Classification::Classified(ref result) => result,
    };

    println!(
        "Based on your changes ({} files, {}):\n",
        result.files_changed, result.description
    );

    for (i, message) in report.messages.iter().enumerate() {
        println!("{}. {}", i + 1, message.green());
    }

    if !result.flags.is_empty() {
        let tags: Vec<_> = result.flags.iter().map(|f| f.tag()).collect();
        println!("\n{} {}", "Flags:".yellow(), tags.join(", "));
    }

    println!(
        "\n💡 Tip: Use conventional commit format: <type>[optional scope]: <description>\n"
    );
}

fn severity_marker(severity: Severity) -> colored::ColoredString {
    match severity {
        Severity::Critical => "✗".red().bold(),
        Severity::Warning => "!".yellow().bold(),
        Severity::Info => "i".blue().bold(),
    }
}

pub fn print_review(review: Option<&DiffReview>) {
    header("🔍", "Code Review Checklist");

    let Some(review) = review else {
        println!("No changes to review (or only one commit in repository).\n");
        return;
    };

    println!("Review the following for recent changes:\n");
    for concern in &review.concerns {
        println!("{} {}", severity_marker(concern.severity), concern.warning);
    }

    println!(
        "\n📊 Summary: {} files changed, {} potential issues to check",
        review.files_changed,
        review.issues()
    );
    if review.issues() == 0 {
        println!("{} No obvious issues detected in automated checks", "✓".green().bold());
    }
    println!();
}

pub fn print_security(audit: Option<&DiffReview>) {
    header("🛡️ ", "Security Audit");

    let Some(audit) = audit else {
        println!("No recent changes to audit.\n");
        return;
    };

    println!("Scanning for potential security issues...\n");
    for concern in &audit.concerns {
        println!("{} {}", severity_marker(concern.severity), concern.warning);
    }

    println!();
    if audit.issues() == 0 {
        println!("{} No obvious security issues detected", "✓".green().bold());
    } else {
        println!(
            "🔍 Found {} potential security considerations to review",
            audit.issues().to_string().red()
        );
    }
    println!();
}

pub fn print_impact(report: &ImpactReport) {
    header("📈", &format!("Change Impact Analysis: {}", report.target));

    if report.is_file {
        println!("Analyzing impact of changes to file: {}\n", report.target.cyan());
        if !report.recent_commits.is_empty() {
            println!("Recent changes to this file:");
            for line in &report.recent_commits {
                println!("  {} {}", "•".blue(), line);
            }
        }
    } else {
        println!("Analyzing impact of: {}", report.target.cyan());
        println!(
            "{}",
            "(Note: This is a simple analysis. For complex projects, consider specialized tools.)"
                .dimmed()
        );
    }

    println!("\n💡 Consider running tests after modifying this component\n");
}

pub fn print_conflicts(report: &ConflictReport) {
    header("🔄", "Conflict Resolver");

    if report.files.is_empty() {
        println!("No merge conflicts detected.");
        println!(
            "{}\n",
            "This helper assists when you have merge conflicts (files marked with 'UU').".dimmed()
        );
        return;
    }

    println!("Merge conflicts detected. Here's how to resolve them:\n");
    println!("1. Conflicted files:");
    for file in &report.files {
        println!("   {} {}", "•".red(), file);
    }

    println!("\n2. For each conflicted file:");
    println!("   - Open the file in your editor");
    println!("   - Look for <<<<<<<, =======, >>>>>>> markers");
    println!("   - Choose which changes to keep (ours/theirs/both)");
    println!("   - Remove the conflict markers and save the file");

    println!("\n3. After resolving all conflicts:");
    println!("   {}", "git add <files>".cyan());
    println!("   {}", "git commit".cyan());

    println!("\n4. Tools that can help:");
    println!("   - git mergetool (opens configured merge tool)");
    println!("   - git diff (see differences)");
    println!("   - git log --merge (see conflicting commits)");
    println!();
}

pub fn print_performance(report: &PerformanceReport) {
    header("⚡", "Performance Regression Detection");

    if !report.recent_commits.is_empty() {
        println!("Recent commits (watch for large changes):");
        for line in &report.recent_commits {
            println!("  {} {}", "•".blue(), line);
        }
    }

    if !report.largest_files.is_empty() {
        println!("\nFiles to monitor for size (potential performance concerns):");
        for entry in &report.largest_files {
            println!(
                "  {} {} {}",
                "•".yellow(),
                entry.path,
                format!("({} bytes)", entry.size).dimmed()
            );
        }
    }

    println!("\n🔍 Performance Monitoring Tips:");
    println!("• Monitor file size growth over time");
    println!("• Watch for large binary files in repo");
    println!("• Consider git-lfs for large assets");
    println!("• Use profilers for performance-critical code\n");
}

pub fn print_docs(report: &DocsReport) {
    header("📚", "Documentation Gap Analysis");

    match report.readme {
        Some(ref name) => println!("{} README file found: {}", "✓".green().bold(), name),
        None => println!(
            "{} No README file found - consider adding project documentation",
            "✗".red().bold()
        ),
    }

    if report.sampled_commits > 0 {
        println!(
            "\nDocumentation activity in last {} commits: {} doc-related commits",
            report.sampled_commits, report.doc_commits
        );
        if report.lagging {
            println!(
                "{} Documentation may be lagging behind code changes",
                "!".yellow().bold()
            );
        }
    }

    println!("\n💡 Documentation Tips:");
    println!("• Update README when adding features");
    println!("• Document API changes in commit messages");
    println!("• Consider adding inline comments for complex logic");
    println!("• Keep CHANGELOG.md for release notes\n");
}

pub fn print_workflow(report: Option<&WorkflowReport>) {
    header("🚀", "Git Workflow Optimizer");

    let Some(report) = report else {
        println!("Not enough commit history for workflow analysis.\n");
        return;
    };

    println!(
        "📊 Workflow Analysis ({} recent commits):\n",
        report.sampled_commits
    );

    if let (Some(average), Some(size)) = (report.average_changes, report.commit_size) {
        println!("• Average changes per commit: {} lines", average);
        match size {
            CommitSize::Large => println!("  {} Consider smaller, more focused commits", "!".yellow()),
            CommitSize::Small => println!(
                "  {} Very small commits - consider batching related changes",
                "!".yellow()
            ),
            CommitSize::Balanced => println!("  {} Good commit size balance", "✓".green()),
        }
    }

    if !report.recent_dates.is_empty() {
        println!("• Recent commit frequency: {}", report.recent_dates.join(" "));
    }

    println!("• Branch activity:");
    if report.stale_branches.is_empty() {
        println!("  {} No stale branches found", "✓".green());
    } else {
        println!("  ⏰ Old branches needing attention:");
        for branch in &report.stale_branches {
            println!("    - {} ({})", branch.name, branch.age.dimmed());
        }
    }

    if let Some(percentage) = report.merge_percentage {
        println!(
            "• Merge strategy: {}% merge commits in recent history",
            percentage
        );
        if percentage > 50 {
            println!("  💡 Consider using rebase for cleaner history");
        } else {
            println!("  {} Good merge/rebase balance", "✓".green());
        }
    }

    println!("\n🎯 Workflow Recommendations:");
    for (i, tip) in report.recommendations.iter().enumerate() {
        println!("{}. {}", i + 1, tip);
    }
    println!();
}
