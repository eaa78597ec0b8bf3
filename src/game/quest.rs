/// Quest tracker: acceptance, objective progress, deadlines.
///
/// The tracker owns quest state only. Rewards are handed back to the caller,
/// which decides how to apply them to the character.
use super::errors::ActionError;
use super::types::{offset_secs, Character, ObjectiveTrigger, Quest, QuestState, Rewards};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestLog {
    pub quests: Vec<Quest>,
}

/// A quest finished by a progress update, with the rewards it yields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedQuest {
    pub name: String,
    pub rewards: Rewards,
}

impl QuestLog {
    pub fn new(quests: Vec<Quest>) -> Self {
        Self { quests }
    }

    pub fn get(&self, name: &str) -> Option<&Quest> {
        self.quests.iter().find(|q| q.name.eq_ignore_ascii_case(name))
    }

    fn find_mut(&mut self, name: &str) -> Result<&mut Quest, ActionError> {
        self.quests
            .iter_mut()
            .find(|q| q.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| ActionError::UnknownQuest(name.to_string()))
    }

    /// NotStarted -> InProgress. A time limit replaces any fixed deadline; a limit
    /// too large to represent leaves the quest untimed.
    pub fn accept(
        &mut self,
        character: &Character,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<(), ActionError> {
        let quest = self.find_mut(name)?;
        if character.level < quest.level_req {
            return Err(ActionError::LevelTooLow {
                required: quest.level_req,
                actual: character.level,
            });
        }
        match quest.state {
            QuestState::NotStarted => {}
            QuestState::InProgress { .. } => {
                return Err(ActionError::AlreadyActive(quest.name.clone()));
            }
            QuestState::Completed { .. } | QuestState::Failed { .. } => {
                return Err(ActionError::AlreadyTerminal(quest.name.clone()));
            }
        }

        quest.state = QuestState::InProgress { started_at: now };
        if let Some(secs) = quest.time_limit_secs {
            match offset_secs(now, secs) {
                Some(deadline) => quest.deadline = Some(deadline),
                None => warn!("quest {}: time limit {}s out of range, ignored", quest.name, secs),
            }
        }
        info!("quest accepted: {}", quest.name);
        Ok(())
    }

    /// Add progress to one objective. Returns the rewards when this completes the quest.
    pub fn record_progress(
        &mut self,
        name: &str,
        objective_index: usize,
        amount: u32,
        now: DateTime<Utc>,
    ) -> Result<Option<Rewards>, ActionError> {
        let quest = self.find_mut(name)?;
        if !quest.is_in_progress() {
            return Err(ActionError::NotInProgress(quest.name.clone()));
        }
        let objective = quest
            .objectives
            .get_mut(objective_index)
            .ok_or_else(|| ActionError::NoSuchObjective {
                quest: name.to_string(),
                index: objective_index,
            })?;
        objective.add_progress(amount);
        debug!(
            "quest {} objective {}: {}/{}",
            quest.name, objective_index, objective.current_amount, objective.target_amount
        );

        Ok(complete_if_done(quest, now))
    }

    /// Record `amount` on every in-progress objective listening for `trigger`.
    pub fn record_event(
        &mut self,
        trigger: &ObjectiveTrigger,
        amount: u32,
        now: DateTime<Utc>,
    ) -> Vec<CompletedQuest> {
        let mut done = Vec::new();
        for quest in self.quests.iter_mut().filter(|q| q.is_in_progress()) {
            let mut touched = false;
            for objective in &mut quest.objectives {
                if objective
                    .trigger
                    .as_ref()
                    .is_some_and(|t| t.matches(trigger))
                {
                    objective.add_progress(amount);
                    touched = true;
                }
            }
            if touched {
                if let Some(rewards) = complete_if_done(quest, now) {
                    done.push(CompletedQuest {
                        name: quest.name.clone(),
                        rewards,
                    });
                }
            }
        }
        done
    }

    /// InProgress -> Failed at the player's request.
    pub fn abandon(&mut self, name: &str, now: DateTime<Utc>) -> Result<(), ActionError> {
        let quest = self.find_mut(name)?;
        if !quest.is_in_progress() {
            return Err(ActionError::NotInProgress(quest.name.clone()));
        }
        quest.state = QuestState::Failed { failed_at: now };
        info!("quest abandoned: {}", quest.name);
        Ok(())
    }

    /// Fail every in-progress quest whose deadline has passed. Idempotent.
    /// Returns the names of quests failed by this call.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<String> {
        let mut failed = Vec::new();
        for quest in self.quests.iter_mut().filter(|q| q.is_in_progress()) {
            if quest.deadline.is_some_and(|deadline| now > deadline) {
                quest.state = QuestState::Failed { failed_at: now };
                info!("quest failed (deadline passed): {}", quest.name);
                failed.push(quest.name.clone());
            }
        }
        failed
    }

    pub fn active(&self) -> impl Iterator<Item = &Quest> {
        self.quests.iter().filter(|q| q.is_in_progress())
    }

    /// Quests not yet started that the character meets the level for.
    pub fn available<'a>(&'a self, character: &'a Character) -> impl Iterator<Item = &'a Quest> {
        self.quests.iter().filter(move |q| {
            matches!(q.state, QuestState::NotStarted) && q.level_req <= character.level
        })
    }
}

fn complete_if_done(quest: &mut Quest, now: DateTime<Utc>) -> Option<Rewards> {
    if quest.is_in_progress() && quest.all_objectives_complete() {
        quest.state = QuestState::Completed { completed_at: now };
        info!("quest completed: {}", quest.name);
        Some(quest.rewards.clone())
    } else {
        None
    }
}

fn state_label(state: &QuestState) -> &'static str {
    match state {
        QuestState::NotStarted => "available",
        QuestState::InProgress { .. } => "active",
        QuestState::Completed { .. } => "done",
        QuestState::Failed { .. } => "failed",
    }
}

/// Multi-line status for a single quest.
pub fn format_quest_status(quest: &Quest, now: DateTime<Utc>) -> Vec<String> {
    let mut lines = vec![format!(
        "=== {} ({}) ===",
        quest.name,
        state_label(&quest.state)
    )];
    if !quest.description.is_empty() {
        lines.push(quest.description.clone());
    }
    for obj in &quest.objectives {
        let mark = if obj.completed { "x" } else { " " };
        lines.push(format!(
            "[{}] {} [{}/{}]",
            mark, obj.description, obj.current_amount, obj.target_amount
        ));
    }
    if let (true, Some(deadline)) = (quest.is_in_progress(), quest.deadline) {
        let left = (deadline - now).num_seconds().max(0);
        lines.push(format!("Time left: {}s", left));
    }
    lines
}

/// One line per quest in the log.
pub fn format_quest_list(log: &QuestLog) -> Vec<String> {
    if log.quests.is_empty() {
        return vec!["No quests known.".to_string()];
    }
    log.quests
        .iter()
        .enumerate()
        .map(|(idx, q)| {
            format!(
                "{}. {} (Lv{}) - {}",
                idx + 1,
                q.name,
                q.level_req,
                state_label(&q.state)
            )
        })
        .collect()
}
