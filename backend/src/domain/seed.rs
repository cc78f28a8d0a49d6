//! Built-in ADMIN prompt set.
//!
//! Seeding is idempotent at the collection level: when any ADMIN prompt is
//! already stored, nothing is written.

use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::info;

use super::ports::{PromptRepository, PromptRepositoryError};
use super::{Level, Prompt, PromptDraft, PromptId, PromptOwner, PromptText};

/// `(level, text)` pairs for the built-in prompts.
pub const SEED_PROMPTS: &[(&str, &str)] = &[
    ("ice", "Are you more of a morning person or a night owl?"),
    ("ice", "What's one app on your phone you can't live without?"),
    ("ice", "What's the last movie or TV show you really enjoyed?"),
    ("ice", "What's your favorite season and why?"),
    ("ice", "Would you rather explore space or the deep ocean?"),
    ("ice", "Do you like working in teams or independently?"),
    ("ice", "What's your ideal way to spend a day off?"),
    ("ice", "What's a small thing that made you smile recently?"),
    ("ice", "What's a nostalgic food from your childhood?"),
    ("ice", "What's a skill you've always wanted to learn?"),
    ("ice", "What's a childhood tradition you still enjoy?"),
    ("ice", "What's a fun fact most people don't know about you?"),
    (
        "ice",
        "If you could visit anywhere in the world, where would you go and why?",
    ),
    (
        "ice",
        "If your life were a movie genre, what would it be and why?",
    ),
    ("ice", "What's the most spontaneous thing you've ever done?"),
    ("confess", "What's a hobby you could talk about for hours?"),
    ("confess", "What do you wish others understood about you?"),
    (
        "confess",
        "What's a part of your past you've forgiven yourself for?",
    ),
    ("confess", "What's something you wish you could apologize for?"),
    ("confess", "What's a lie you've told that still weighs on you?"),
    (
        "confess",
        "What's the hardest truth you've had to accept about yourself?",
    ),
    ("confess", "What's something you're still healing from?"),
    ("confess", "What's your biggest regret so far?"),
    (
        "confess",
        "What relationship in your life do you wish had turned out differently?",
    ),
    (
        "confess",
        "What part of yourself are you most afraid to show others?",
    ),
    (
        "confess",
        "When have you felt the most alone, and what helped you through it?",
    ),
    (
        "confess",
        "Have you ever lost someone you loved deeply? What did that teach you?",
    ),
    ("confess", "When was the last time you cried and why?"),
    ("confess", "What's something you've never told anyone before?"),
    ("deep", "How do you define success in your life?"),
    (
        "deep",
        "If you had to describe your personal growth in one word, what would it be?",
    ),
    ("deep", "What values are most important to you?"),
    ("deep", "How do you define meaningful relationships?"),
    (
        "deep",
        "How do you recharge when you're mentally or emotionally drained?",
    ),
    ("deep", "When do you feel most at peace?"),
    ("deep", "How do you handle disappointment?"),
    ("deep", "What does forgiveness mean to you?"),
    ("deep", "What lesson took you the longest to learn?"),
    ("deep", "What motivates you to keep going during tough times?"),
    ("deep", "What's a fear you've managed to overcome?"),
    ("deep", "Who has had the biggest impact on your life and why?"),
    ("deep", "What does home mean to you?"),
    ("deep", "If you could talk to your past self, what would you say?"),
    ("deep", "What's a moment in life you wish you could relive?"),
    ("deep", "What kind of legacy do you want to leave behind?"),
];

/// Result of a seeding run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// Prompts were written.
    Seeded { count: usize },
    /// ADMIN prompts already existed; nothing was written.
    AlreadySeeded { existing: usize },
}

/// Build the built-in prompts with fresh identifiers.
pub fn seed_prompts(created_at: DateTime<Utc>) -> Vec<Prompt> {
    SEED_PROMPTS
        .iter()
        .filter_map(|(level, text)| {
            let level = Level::new(*level).ok()?;
            let text = PromptText::new(*text).ok()?;
            Some(Prompt::new(PromptDraft {
                id: PromptId::random(),
                text,
                level,
                owner: PromptOwner::Admin,
                public: true,
                created_at,
            }))
        })
        .collect()
}

/// Insert the built-in prompts unless ADMIN prompts are already stored.
pub async fn seed_admin_prompts<R>(
    repo: &R,
    clock: &dyn Clock,
) -> Result<SeedOutcome, PromptRepositoryError>
where
    R: PromptRepository + ?Sized,
{
    let existing = repo.list_by_owner(&PromptOwner::Admin).await?.len();
    if existing > 0 {
        info!(existing, "admin prompts already present; skipping seed");
        return Ok(SeedOutcome::AlreadySeeded { existing });
    }

    let prompts = seed_prompts(clock.utc());
    for prompt in &prompts {
        repo.insert(prompt).await?;
    }
    info!(count = prompts.len(), "seeded admin prompts");
    Ok(SeedOutcome::Seeded {
        count: prompts.len(),
    })
}
