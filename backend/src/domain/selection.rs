//! Random selection over candidate prompts.
//!
//! Services take an `Arc<dyn PromptSelector>` so tests can substitute a
//! seeded generator and assert on exact orderings.

use std::sync::Mutex;

use rand::{Rng, SeedableRng};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use super::Prompt;

/// Source of uniform random choices over prompts.
pub trait PromptSelector: Send + Sync {
    /// Apply a uniform random permutation in place.
    fn shuffle(&self, prompts: &mut [Prompt]);

    /// Pick one prompt uniformly at random, or `None` when empty.
    fn choose(&self, prompts: Vec<Prompt>) -> Option<Prompt>;
}

/// Selector backed by the thread-local generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngSelector;

impl PromptSelector for ThreadRngSelector {
    fn shuffle(&self, prompts: &mut [Prompt]) {
        prompts.shuffle(&mut rand::thread_rng());
    }

    fn choose(&self, mut prompts: Vec<Prompt>) -> Option<Prompt> {
        if prompts.is_empty() {
            return None;
        }
        let picked = rand::thread_rng().gen_range(0..prompts.len());
        Some(prompts.swap_remove(picked))
    }
}

/// Deterministic selector seeded from a fixed value.
///
/// # Examples
/// ```
/// use promptdeck::domain::{PromptSelector, SeededSelector};
///
/// let selector = SeededSelector::new(7);
/// assert!(selector.choose(Vec::new()).is_none());
/// ```
#[derive(Debug)]
pub struct SeededSelector {
    rng: Mutex<SmallRng>,
}

impl SeededSelector {
    /// Build a selector whose sequence is fixed by `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut SmallRng) -> T) -> T {
        let mut guard = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }
}

impl PromptSelector for SeededSelector {
    fn shuffle(&self, prompts: &mut [Prompt]) {
        self.with_rng(|rng| prompts.shuffle(rng));
    }

    fn choose(&self, mut prompts: Vec<Prompt>) -> Option<Prompt> {
        if prompts.is_empty() {
            return None;
        }
        let len = prompts.len();
        let picked = self.with_rng(|rng| rng.gen_range(0..len));
        Some(prompts.swap_remove(picked))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::Utc;
    use rstest::rstest;

    use super::*;
    use crate::domain::{Level, PromptDraft, PromptId, PromptOwner, PromptText};

    fn prompts(count: usize) -> Vec<Prompt> {
        (0..count)
            .map(|i| {
                Prompt::new(PromptDraft {
                    id: PromptId::random(),
                    text: PromptText::new(format!("prompt {i}")).expect("valid text"),
                    level: Level::new("ice").expect("valid level"),
                    owner: PromptOwner::Admin,
                    public: true,
                    created_at: Utc::now(),
                })
            })
            .collect()
    }

    #[rstest]
    fn seeded_shuffles_repeat_for_same_seed() {
        let original = prompts(12);
        let mut left = original.clone();
        let mut right = original.clone();
        SeededSelector::new(42).shuffle(&mut left);
        SeededSelector::new(42).shuffle(&mut right);
        assert_eq!(left, right);
    }

    #[rstest]
    fn shuffle_is_a_permutation() {
        let original = prompts(12);
        let mut shuffled = original.clone();
        ThreadRngSelector.shuffle(&mut shuffled);
        let before: HashSet<PromptId> = original.iter().map(Prompt::id).collect();
        let after: HashSet<PromptId> = shuffled.iter().map(Prompt::id).collect();
        assert_eq!(before, after);
        assert_eq!(shuffled.len(), original.len());
    }

    #[rstest]
    #[case::thread(Box::new(ThreadRngSelector) as Box<dyn PromptSelector>)]
    #[case::seeded(Box::new(SeededSelector::new(1)) as Box<dyn PromptSelector>)]
    fn choose_returns_a_member(#[case] selector: Box<dyn PromptSelector>) {
        let candidates = prompts(5);
        let ids: HashSet<PromptId> = candidates.iter().map(Prompt::id).collect();
        let picked = selector.choose(candidates).expect("non-empty input");
        assert!(ids.contains(&picked.id()));
        assert!(selector.choose(Vec::new()).is_none());
    }
}
