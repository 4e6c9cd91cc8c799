//! Client Tag-Selection State Machine
//!
//! Sans-io session state driving the multi-stage tag-selection flow:
//! debounced topic input, staged reveal, capped selection, conflict
//! warnings, and final prompt assembly.
//!
//! Network and timers stay outside: callers receive `DebounceTicket`
//! and `LoadRequest` values and feed results back with the generation
//! they were issued for. A new input bumps the generation, so stale
//! timers and stale responses are discarded by a simple compare - no
//! cancellation token needed, last scheduled load wins.

pub mod assemble;
pub mod conflict;
mod driver;

pub use assemble::assemble;
pub use conflict::detect_conflict;
pub use driver::{SessionDriver, TagFetcher};

use tracing::debug;

use crate::config::SessionConfig;
use crate::constants::tags::MIN_TOPIC_CHARS;
use crate::tags::fallback::fallback_entries;
use crate::tags::{Intent, Persona, Stage, TagCategory, TagRequest, TagResponse};

// =============================================================================
// Session Types
// =============================================================================

/// Observable session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    TopicTooShort,
    Debouncing,
    Loading,
    Loaded,
    /// Static fallback content is showing (offline or failed load)
    Fallback,
}

/// One suggestion shown to the user
#[derive(Debug, Clone)]
pub struct TagItem {
    /// Locally generated, monotonic per session
    pub id: u64,
    pub text: String,
    pub category: TagCategory,
    pub selected: bool,
}

/// Handed out on a topic keystroke; fire it back after the debounce
/// window to learn whether the load should proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceTicket {
    generation: u64,
}

/// A network load the embedder should perform
#[derive(Debug, Clone)]
pub struct LoadRequest {
    /// Pass back to `apply_response`/`load_failed` for stale detection
    pub generation: u64,
    pub request: TagRequest,
}

/// Derived prompt quality label, recomputed on every selection change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStrength {
    Basic,
    Good,
    Strong,
}

// =============================================================================
// Tag Session
// =============================================================================

/// The tag-selection state machine
#[derive(Debug)]
pub struct TagSession {
    persona: Persona,
    intent: Option<Intent>,
    topic: String,
    phase: SessionPhase,
    items: Vec<TagItem>,
    /// Selected item ids in selection order
    selection_order: Vec<u64>,
    next_item_id: u64,
    /// Bumped on every input that supersedes in-flight work
    generation: u64,
    cap: usize,
    initial_reveal: usize,
    offline: bool,
    warning: Option<String>,
    conflict: Option<&'static str>,
    stage2_requested: bool,
}

impl TagSession {
    pub fn new(persona: Persona, config: &SessionConfig) -> Self {
        Self {
            persona,
            intent: None,
            topic: String::new(),
            phase: SessionPhase::Idle,
            items: Vec::new(),
            selection_order: Vec::new(),
            next_item_id: 0,
            generation: 0,
            cap: config.selection_cap,
            initial_reveal: config.initial_reveal,
            offline: false,
            warning: None,
            conflict: None,
            stage2_requested: false,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    fn topic_valid(&self) -> bool {
        self.topic.trim().chars().count() >= MIN_TOPIC_CHARS
    }

    // =========================================================================
    // Inputs
    // =========================================================================

    /// Record a topic keystroke.
    ///
    /// Every keystroke supersedes the previous debounce cycle. Returns
    /// a ticket only when a debounced load should be scheduled.
    pub fn topic_input(&mut self, topic: &str) -> Option<DebounceTicket> {
        self.topic = topic.to_string();
        self.generation += 1;

        if !self.topic_valid() {
            self.phase = SessionPhase::TopicTooShort;
            return None;
        }
        if self.intent.is_none() {
            self.phase = SessionPhase::Idle;
            return None;
        }
        if self.offline {
            self.enter_fallback();
            return None;
        }

        self.phase = SessionPhase::Debouncing;
        Some(DebounceTicket {
            generation: self.generation,
        })
    }

    /// The debounce timer for `ticket` elapsed. Returns the load to run
    /// if no newer input superseded the ticket.
    pub fn debounce_fired(&mut self, ticket: DebounceTicket) -> Option<LoadRequest> {
        if ticket.generation != self.generation || self.phase != SessionPhase::Debouncing {
            debug!("debounce ticket superseded, ignoring");
            return None;
        }
        self.phase = SessionPhase::Loading;
        self.load_request(Stage::Initial)
    }

    /// Select an intent. If the topic is already valid this triggers an
    /// immediate load, bypassing the debounce.
    pub fn set_intent(&mut self, intent: Intent) -> Option<LoadRequest> {
        self.intent = Some(intent);
        if !self.topic_valid() {
            return None;
        }

        self.generation += 1;
        if self.offline {
            self.enter_fallback();
            return None;
        }
        self.phase = SessionPhase::Loading;
        self.load_request(Stage::Initial)
    }

    /// Flip network availability. Going offline invalidates in-flight
    /// work and short-circuits straight to fallback content.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
        if offline {
            self.generation += 1;
            if self.topic_valid() && self.intent.is_some() {
                self.enter_fallback();
            }
        }
    }

    // =========================================================================
    // Load results
    // =========================================================================

    /// Apply a load result. Responses for a superseded generation are
    /// discarded.
    pub fn apply_response(&mut self, generation: u64, stage: Stage, response: &TagResponse) {
        if generation != self.generation {
            debug!(generation, "discarding stale tag response");
            return;
        }

        match stage {
            Stage::Initial => {
                self.items.clear();
                self.selection_order.clear();
                self.conflict = None;
                self.stage2_requested = false;
                self.append_items(response);
                self.phase = if response.fallback {
                    SessionPhase::Fallback
                } else {
                    SessionPhase::Loaded
                };
            }
            Stage::FollowUp => {
                self.append_items(response);
            }
        }
    }

    /// A load failed at the transport level (the server itself degrades
    /// gracefully, so this is reachability, not content, failure).
    pub fn load_failed(&mut self, generation: u64) {
        if generation != self.generation {
            return;
        }
        if self.phase == SessionPhase::Loading {
            self.enter_fallback();
        }
        // Follow-up failures are silent; the initial set stays usable
    }

    fn append_items(&mut self, response: &TagResponse) {
        let entries: Vec<(TagCategory, String)> = if response.groups.is_empty() {
            response
                .tags
                .iter()
                .map(|t| (TagCategory::Task, t.clone()))
                .collect()
        } else {
            response
                .groups
                .iter()
                .flat_map(|(category, tags)| tags.iter().map(|t| (*category, t.clone())))
                .collect()
        };

        for (category, text) in entries {
            if self.items.len() >= self.cap {
                break;
            }
            if self
                .items
                .iter()
                .any(|item| item.text.eq_ignore_ascii_case(&text))
            {
                continue;
            }
            self.items.push(TagItem {
                id: self.next_item_id,
                text,
                category,
                selected: false,
            });
            self.next_item_id += 1;
        }
    }

    fn enter_fallback(&mut self) {
        self.items.clear();
        self.selection_order.clear();
        self.conflict = None;
        self.stage2_requested = false;
        for (category, text) in fallback_entries(self.cap, &[]) {
            self.items.push(TagItem {
                id: self.next_item_id,
                text,
                category,
                selected: false,
            });
            self.next_item_id += 1;
        }
        self.phase = SessionPhase::Fallback;
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Toggle a tag. Selecting beyond the cap is a no-op with a
    /// user-visible warning, not an error. The first selection triggers
    /// the follow-up (stage 2) load.
    pub fn toggle_tag(&mut self, id: u64) -> Option<LoadRequest> {
        let item = self.items.iter_mut().find(|item| item.id == id)?;

        let mut follow_up = None;
        if item.selected {
            item.selected = false;
            self.selection_order.retain(|&selected| selected != id);
        } else {
            if self.selection_order.len() >= self.cap {
                self.warning = Some(format!("You can select up to {} tags", self.cap));
                return None;
            }
            item.selected = true;
            self.selection_order.push(id);

            if !self.stage2_requested && self.phase == SessionPhase::Loaded && !self.offline {
                self.stage2_requested = true;
                follow_up = self.load_request(Stage::FollowUp);
            }
        }

        self.conflict = detect_conflict(self.selected_texts().map(String::as_str));
        follow_up
    }

    fn load_request(&self, stage: Stage) -> Option<LoadRequest> {
        let intent = self.intent?;
        let existing_tags = match stage {
            Stage::Initial => Vec::new(),
            Stage::FollowUp => self.items.iter().map(|item| item.text.clone()).collect(),
        };
        Some(LoadRequest {
            generation: self.generation,
            request: TagRequest {
                topic: self.topic.trim().to_string(),
                intent,
                persona: self.persona,
                stage,
                existing_tags,
            },
        })
    }

    // =========================================================================
    // Derived state
    // =========================================================================

    /// Tags currently shown: the initial reveal subset until the first
    /// selection, everything afterwards.
    pub fn visible_tags(&self) -> &[TagItem] {
        if self.selection_order.is_empty() && !self.stage2_requested {
            let reveal = self.initial_reveal.min(self.items.len());
            &self.items[..reveal]
        } else {
            &self.items
        }
    }

    fn selected_texts(&self) -> impl Iterator<Item = &String> {
        self.selection_order.iter().filter_map(|id| {
            self.items
                .iter()
                .find(|item| item.id == *id)
                .map(|item| &item.text)
        })
    }

    /// Selected (category, text) pairs in selection order
    pub fn selection(&self) -> Vec<(TagCategory, String)> {
        self.selection_order
            .iter()
            .filter_map(|id| {
                self.items
                    .iter()
                    .find(|item| item.id == *id)
                    .map(|item| (item.category, item.text.clone()))
            })
            .collect()
    }

    /// Active conflict warning, if the selection contains incompatible
    /// tags
    pub fn conflict(&self) -> Option<&'static str> {
        self.conflict
    }

    /// Take the pending transient warning, if any
    pub fn take_warning(&mut self) -> Option<String> {
        self.warning.take()
    }

    /// Derived prompt quality from the selection size
    pub fn prompt_strength(&self) -> PromptStrength {
        match self.selection_order.len() {
            0..=1 => PromptStrength::Basic,
            2..=3 => PromptStrength::Good,
            _ => PromptStrength::Strong,
        }
    }

    /// Assemble the final prompt from the current state
    pub fn assembled_prompt(&self) -> String {
        assemble(
            &self.topic,
            self.persona,
            self.intent.unwrap_or(Intent::Learn),
            &self.selection(),
        )
    }
}
