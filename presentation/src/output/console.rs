//! Console output formatter for planning poker results

use colored::Colorize;
use poker_application::{
    RoundStatusView, SeedReport, StoryHistory, TaskOverview, TaskRoster, TaskSummary, VoteReceipt,
};
use poker_domain::{
    ConsensusValue, Estimate, Iteration, RoundStatus, Story, Task, User, UserEstimate, UserId,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Formats use case results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Turn ANSI colors on or off for everything formatted afterwards
    pub fn set_color(enabled: bool) {
        colored::control::set_override(enabled);
    }

    /// Format any result as pretty JSON
    pub fn format_json<T: Serialize + ?Sized>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn format_tasks(tasks: &[Task]) -> String {
        if tasks.is_empty() {
            return format!("{}\n", "No tasks yet.".dimmed());
        }
        let mut output = Self::header("Tasks");
        for task in tasks {
            output.push_str(&format!(
                "  {:>4}  {}  {}\n",
                task.id.to_string().bold(),
                task.name,
                Self::publication(task)
            ));
        }
        output
    }

    pub fn format_task(task: &Task) -> String {
        format!(
            "{} {} {}\n",
            format!("Task {}:", task.id).cyan().bold(),
            task.name,
            Self::publication(task)
        )
    }

    pub fn format_overview(overview: &TaskOverview) -> String {
        let mut output = Self::header(&format!("Task {}: {}", overview.task.id, overview.task.name));
        if !overview.task.description.is_empty() {
            output.push_str(&format!("{}\n", overview.task.description));
        }
        output.push_str(&format!(
            "{} {}   {} {}\n",
            "Status:".cyan().bold(),
            Self::publication(&overview.task),
            "Created:".cyan().bold(),
            overview.task.created_at.format("%Y-%m-%d %H:%M")
        ));

        output.push_str(&Self::section_header("Stories"));
        output.push_str(&Self::format_stories(&overview.stories));

        output.push_str(&Self::section_header("Team"));
        output.push_str(&Self::format_users(&overview.team));

        output.push_str(&Self::section_header("Deck"));
        output.push_str(&Self::format_deck(&overview.deck));
        output
    }

    pub fn format_stories(stories: &[Story]) -> String {
        if stories.is_empty() {
            return format!("  {}\n", "(none)".dimmed());
        }
        let mut output = String::new();
        for story in stories {
            let consensus = match story.consensus {
                Some(id) => format!("consensus #{}", id).green().to_string(),
                None => "no consensus".dimmed().to_string(),
            };
            output.push_str(&format!(
                "  {:>4}  {}  (round {}, {})\n",
                story.id.to_string().bold(),
                story.name,
                story.iteration,
                consensus
            ));
        }
        output
    }

    pub fn format_users(users: &[User]) -> String {
        if users.is_empty() {
            return format!("  {}\n", "(none)".dimmed());
        }
        users
            .iter()
            .map(|u| format!("  {:>4}  {}\n", u.id.to_string().bold(), u.name))
            .collect()
    }

    pub fn format_deck(deck: &[Estimate]) -> String {
        deck.iter()
            .map(|card| {
                let value = match card.numeric_value() {
                    Some(value) => format!("{} {}", value, card.unit),
                    None => "no value".dimmed().to_string(),
                };
                format!(
                    "  {:>4}  {:<7} {}\n",
                    card.id.to_string().bold(),
                    card.complexity_symbol.yellow(),
                    value
                )
            })
            .collect()
    }

    pub fn format_receipt(receipt: &VoteReceipt) -> String {
        let mut output = format!(
            "{} user {} voted on story {} in round {}\n",
            "Recorded:".green().bold(),
            receipt.vote.user_id,
            receipt.vote.story_id,
            receipt.vote.iteration
        );
        if receipt.duplicate {
            output.push_str(&format!(
                "{} user {} had already voted in this round\n",
                "Note:".yellow().bold(),
                receipt.vote.user_id
            ));
        }
        if let Some(next) = receipt.advanced_to {
            output.push_str(&format!(
                "{} story {} moves on to round {}\n",
                "Round complete:".cyan().bold(),
                receipt.vote.story_id,
                next
            ));
        }
        output
    }

    pub fn format_status(view: &RoundStatusView) -> String {
        let mut output = Self::header(&format!("Story {}: {}", view.story.id, view.story.name));
        output.push_str(&format!("{} {}\n", "Status:".cyan().bold(), Self::status(&view.status)));
        let can_vote = if view.can_vote {
            "yes".green()
        } else {
            "already voted".yellow()
        };
        output.push_str(&format!("{} {}\n", "Can vote:".cyan().bold(), can_vote));

        output.push_str(&Self::section_header(&format!(
            "Round {} votes",
            view.status.iteration()
        )));
        output.push_str(&Self::format_votes(&view.current_votes));

        if !view.story.iteration.is_first() {
            output.push_str(&Self::section_header(&format!(
                "Round {} votes",
                view.story.iteration.previous()
            )));
            output.push_str(&Self::format_votes(&view.previous_votes));
        }
        output
    }

    pub fn format_history(history: &StoryHistory) -> String {
        let story = &history.story;
        let mut output = Self::header(&format!("History of story {}: {}", story.id, story.name));
        for round in &history.rounds {
            output.push_str(&format!("\n{}\n", Self::status(&round.status)));
            output.push_str(&Self::format_votes(&round.votes));

            let dist = &round.distribution;
            if let (Some(min), Some(max), Some(avg)) = (dist.min, dist.max, dist.average) {
                output.push_str(&format!(
                    "  {} min {} / max {} / avg {:.2}",
                    "Spread:".dimmed(),
                    min,
                    max,
                    avg
                ));
                if dist.is_unanimous() {
                    output.push_str(&format!("  {}", "unanimous".green()));
                }
                output.push('\n');
            }
        }
        output
    }

    pub fn format_votes(votes: &[UserEstimate]) -> String {
        if votes.is_empty() {
            return format!("  {}\n", "(no votes)".dimmed());
        }
        votes
            .iter()
            .map(|v| {
                format!(
                    "  {:<16} {}\n",
                    v.user.name,
                    v.estimate.complexity_symbol.yellow()
                )
            })
            .collect()
    }

    /// Cards per member, with member names looked up in `team`
    pub fn format_breakdown(
        iteration: Iteration,
        breakdown: &BTreeMap<UserId, Vec<Estimate>>,
        team: &[User],
    ) -> String {
        let mut output = Self::section_header(&format!("Round {} cards", iteration));
        if breakdown.is_empty() {
            output.push_str(&format!("  {}\n", "(no votes)".dimmed()));
            return output;
        }
        for (user, cards) in breakdown {
            let name = team
                .iter()
                .find(|u| u.id == *user)
                .map(|u| u.name.clone())
                .unwrap_or_else(|| format!("user {}", user));
            let symbols: Vec<String> = cards
                .iter()
                .map(|c| format!("{} (#{})", c.complexity_symbol, c.id))
                .collect();
            output.push_str(&format!("  {:<16} {}\n", name, symbols.join(", ").yellow()));
        }
        output
    }

    pub fn format_consensus(story: &Story, value: &ConsensusValue) -> String {
        let rendered = if value.is_resolved() {
            value.to_string().green().bold()
        } else {
            value.to_string().dimmed()
        };
        format!(
            "{} {}\n",
            format!("Consensus of story {}:", story.id).cyan().bold(),
            rendered
        )
    }

    pub fn format_summary(summary: &TaskSummary) -> String {
        let mut output = Self::header(&format!("Summary of task {}: {}", summary.task.id, summary.task.name));
        for line in &summary.stories {
            output.push_str(&format!(
                "  {:<32} {:>8}  {}\n",
                line.story.name,
                line.value,
                line.consensus.to_string().dimmed()
            ));
        }
        output.push_str(&format!("{}\n", "-".repeat(40)));
        output.push_str(&format!("  {:<32} {:>8}\n", "Total".bold(), summary.total));
        if summary.unresolved > 0 {
            output.push_str(&format!(
                "{} {} stor{} without consensus\n",
                "Note:".yellow().bold(),
                summary.unresolved,
                if summary.unresolved == 1 { "y" } else { "ies" }
            ));
        }
        output
    }

    pub fn format_roster(roster: &TaskRoster) -> String {
        let mut output = Self::header(&format!("Roster of task {}: {}", roster.task.id, roster.task.name));
        for story in &roster.stories {
            output.push_str(&Self::section_header(&format!(
                "Story {}: {}",
                story.story.id, story.story.name
            )));
            for member in &story.members {
                let cards: Vec<String> = member
                    .cards
                    .iter()
                    .map(|c| format!("r{}:{}", c.iteration, c.estimate.complexity_symbol))
                    .collect();
                let cards = if cards.is_empty() {
                    "-".dimmed().to_string()
                } else {
                    cards.join(" ").yellow().to_string()
                };
                output.push_str(&format!("  {:<16} {}\n", member.user.name, cards));
            }
        }
        output
    }

    pub fn format_seed(report: &SeedReport) -> String {
        let mut output = format!(
            "{} {} users and {} tasks\n",
            "Seeded:".green().bold(),
            report.users.len(),
            report.tasks.len()
        );
        for overview in &report.tasks {
            output.push_str(&format!(
                "  {:>4}  {} ({} stories, team of {})\n",
                overview.task.id.to_string().bold(),
                overview.task.name,
                overview.stories.len(),
                overview.team.len()
            ));
        }
        output
    }

    pub fn format_done(message: &str) -> String {
        format!("{} {}\n", "Done:".green().bold(), message)
    }

    fn status(status: &RoundStatus) -> String {
        match status {
            RoundStatus::Voting { .. } => status.to_string().yellow().to_string(),
            RoundStatus::RoundComplete { .. } => status.to_string().green().to_string(),
        }
    }

    fn publication(task: &Task) -> String {
        match task.published_at {
            Some(at) => format!("published {}", at.format("%Y-%m-%d"))
                .green()
                .to_string(),
            None => "draft".dimmed().to_string(),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}\n", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }
}
