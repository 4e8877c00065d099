//! The slates that make up the landing deck.

use crate::schedule::StepSchedule;

/// Position of a slate in the deck, counted from the top.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlateIndex(usize);

impl SlateIndex {
    pub fn new(index: usize) -> Self {
        SlateIndex(index)
    }

    pub fn value(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for SlateIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for SlateIndex {
    fn from(index: usize) -> Self {
        SlateIndex(index)
    }
}

const CHAT_PLAYGROUND_CUES: &[(u32, u64)] =
    &[(1, 1000), (2, 2000), (3, 3500), (4, 5000), (5, 6500)];

const AGENT_WORKFLOW_CUES: &[(u32, u64)] = &[
    (1, 1000),
    (2, 2500),
    (3, 4000),
    (4, 5000),
    (5, 6500),
    (6, 8000),
    (7, 9500),
    (8, 11000),
    (9, 12500),
];

/// The eight slates of the MCP360 page, in scroll order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum SlateId {
    Hero,
    HowItWorks,
    Problem,
    Features,
    WorkflowEditor,
    ChatPlayground,
    AgentWorkflow,
    Integrations,
}

impl SlateId {
    pub const ALL: [SlateId; 8] = [
        SlateId::Hero,
        SlateId::HowItWorks,
        SlateId::Problem,
        SlateId::Features,
        SlateId::WorkflowEditor,
        SlateId::ChatPlayground,
        SlateId::AgentWorkflow,
        SlateId::Integrations,
    ];

    pub fn index(&self) -> SlateIndex {
        let position = SlateId::ALL
            .iter()
            .position(|id| id == self)
            .unwrap_or_default();
        SlateIndex(position)
    }

    pub fn from_index(index: SlateIndex) -> Option<SlateId> {
        SlateId::ALL.get(index.value()).copied()
    }

    /// Label shown next to the navigation indicator.
    pub fn label(&self) -> &'static str {
        match self {
            SlateId::Hero => "Improvements",
            SlateId::HowItWorks => "How it Works",
            SlateId::Problem => "The Problem",
            SlateId::Features => "New Features",
            SlateId::WorkflowEditor => "Workflow Builder",
            SlateId::ChatPlayground => "Playground",
            SlateId::AgentWorkflow => "Run Workflows",
            SlateId::Integrations => "Integrations",
        }
    }

    fn cue_pairs(&self) -> &'static [(u32, u64)] {
        match self {
            SlateId::ChatPlayground => CHAT_PLAYGROUND_CUES,
            SlateId::AgentWorkflow => AGENT_WORKFLOW_CUES,
            _ => &[],
        }
    }

    /// Reveal timeline for this slate. Slates that only use entrance
    /// transitions get an empty schedule.
    pub fn schedule(&self) -> StepSchedule {
        // Built-in tables are ascending; a failure here is a typo above.
        StepSchedule::from_millis(self.cue_pairs()).unwrap_or_else(|err| {
            tracing::error!(slate = ?self, %err, "built-in schedule rejected");
            StepSchedule::empty()
        })
    }

    /// Human-readable names for each cue step, used in logs.
    pub fn cue_names(&self) -> &'static [&'static str] {
        match self {
            SlateId::ChatPlayground => &[
                "user message",
                "thinking",
                "tool call",
                "tool result",
                "final response",
            ],
            SlateId::AgentWorkflow => &[
                "attach workflow",
                "type message",
                "send message",
                "workflow start",
                "node 1 active",
                "node 2 active",
                "node 3 active",
                "node 4 active",
                "completed",
            ],
            _ => &[],
        }
    }

    /// Name of `step` for this slate, if the step is a named cue.
    pub fn cue_name(&self, step: u32) -> Option<&'static str> {
        let offset = usize::try_from(step.checked_sub(1)?).ok()?;
        self.cue_names().get(offset).copied()
    }
}

impl std::fmt::Display for SlateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
