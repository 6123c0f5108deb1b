use crate::api::TaskStatus;

/// A user-triggered move in the status pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    Start,
    Done,
    Back,
    Trash,
    Archive,
    Restore,
    Delete,
}

/// What a transition asks the server to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    SetStatus(TaskStatus),
    /// Permanent removal. Not a status; nothing comes back from it.
    Remove,
}

impl Transition {
    pub const ALL: [Transition; 7] = [
        Transition::Start,
        Transition::Done,
        Transition::Back,
        Transition::Trash,
        Transition::Archive,
        Transition::Restore,
        Transition::Delete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Transition::Start => "start",
            Transition::Done => "done",
            Transition::Back => "back",
            Transition::Trash => "trash",
            Transition::Archive => "archive",
            Transition::Restore => "restore",
            Transition::Delete => "delete",
        }
    }

    /// Button label for this transition when offered from `from`.
    pub fn label(self, from: TaskStatus) -> &'static str {
        match self {
            Transition::Start => "Start",
            Transition::Done => "Done",
            Transition::Back => "Back",
            Transition::Trash => "Trash",
            Transition::Archive => "Archive",
            Transition::Restore => "Restore",
            Transition::Delete if from == TaskStatus::Trash => "Delete Forever",
            Transition::Delete => "Delete",
        }
    }

    /// The effect of applying this transition to a task in `from`, or `None`
    /// when the pipeline has no such edge.
    pub fn effect(self, from: TaskStatus) -> Option<Effect> {
        use Effect::{Remove, SetStatus};
        use TaskStatus::{Archive, Done, InProgress, Todo, Trash};

        let effect = match (from, self) {
            (Todo, Transition::Start) => SetStatus(InProgress),
            (Todo | InProgress, Transition::Trash) => SetStatus(Trash),
            (InProgress, Transition::Done) => SetStatus(Done),
            (InProgress, Transition::Back) => SetStatus(Todo),
            (Done, Transition::Archive) => SetStatus(Archive),
            (Done, Transition::Back) => SetStatus(InProgress),
            (Trash, Transition::Restore) => SetStatus(Todo),
            (Archive, Transition::Restore) => SetStatus(Done),
            (Trash | Archive, Transition::Delete) => Remove,
            _ => return None,
        };
        Some(effect)
    }
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Transition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Transition::ALL
            .into_iter()
            .find(|t| t.as_str() == lower)
            .ok_or_else(|| {
                let names: Vec<&str> = Transition::ALL.iter().map(|t| t.as_str()).collect();
                format!("unknown action '{s}' (expected one of: {})", names.join(", "))
            })
    }
}

impl TaskStatus {
    /// Transitions offered for a task in this status, in display order.
    pub fn transitions(self) -> &'static [Transition] {
        match self {
            TaskStatus::Todo => &[Transition::Start, Transition::Trash],
            TaskStatus::InProgress => &[Transition::Done, Transition::Back, Transition::Trash],
            TaskStatus::Done => &[Transition::Archive, Transition::Back],
            TaskStatus::Trash => &[Transition::Restore, Transition::Delete],
            TaskStatus::Archive => &[Transition::Restore, Transition::Delete],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_pipeline() {
        use Effect::{Remove, SetStatus};
        use TaskStatus::*;

        let expected = [
            (Todo, Transition::Start, SetStatus(InProgress)),
            (Todo, Transition::Trash, SetStatus(Trash)),
            (InProgress, Transition::Done, SetStatus(Done)),
            (InProgress, Transition::Back, SetStatus(Todo)),
            (InProgress, Transition::Trash, SetStatus(Trash)),
            (Done, Transition::Archive, SetStatus(Archive)),
            (Done, Transition::Back, SetStatus(InProgress)),
            (Trash, Transition::Restore, SetStatus(Todo)),
            (Trash, Transition::Delete, Remove),
            (Archive, Transition::Restore, SetStatus(Done)),
            (Archive, Transition::Delete, Remove),
        ];
        for (from, transition, effect) in expected {
            assert_eq!(transition.effect(from), Some(effect), "{from} --{transition}-->");
        }

        let total: usize = TaskStatus::ALL.iter().map(|s| s.transitions().len()).sum();
        assert_eq!(total, expected.len());
    }

    #[test]
    fn offered_transitions_are_exactly_the_valid_ones() {
        for from in TaskStatus::ALL {
            for transition in Transition::ALL {
                assert_eq!(
                    from.transitions().contains(&transition),
                    transition.effect(from).is_some(),
                    "{from} / {transition}"
                );
            }
        }
    }

    #[test]
    fn invalid_edges_are_rejected() {
        assert_eq!(Transition::Delete.effect(TaskStatus::Todo), None);
        assert_eq!(Transition::Archive.effect(TaskStatus::InProgress), None);
        assert_eq!(Transition::Trash.effect(TaskStatus::Done), None);
        assert_eq!(Transition::Start.effect(TaskStatus::Trash), None);
        assert_eq!(Transition::Back.effect(TaskStatus::Archive), None);
    }

    #[test]
    fn any_walk_stays_inside_the_five_statuses() {
        // Exhaustive walk over every reachable path of bounded length.
        let mut frontier = vec![TaskStatus::Todo];
        for _ in 0..6 {
            let mut next = Vec::new();
            for status in frontier {
                for t in status.transitions() {
                    if let Some(Effect::SetStatus(s)) = t.effect(status) {
                        assert!(TaskStatus::ALL.contains(&s));
                        next.push(s);
                    }
                }
            }
            frontier = next;
        }
    }

    #[test]
    fn delete_label_depends_on_origin() {
        assert_eq!(Transition::Delete.label(TaskStatus::Trash), "Delete Forever");
        assert_eq!(Transition::Delete.label(TaskStatus::Archive), "Delete");
    }

    #[test]
    fn parses_action_names() {
        assert_eq!("Start".parse::<Transition>(), Ok(Transition::Start));
        assert_eq!(" restore ".parse::<Transition>(), Ok(Transition::Restore));
        assert!("rename".parse::<Transition>().is_err());
    }
}
