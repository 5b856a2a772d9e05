//! View-state machine for the diary front-end.
//!
//! Every screen is one `ViewState` variant carrying exactly the selections
//! it needs. `transition` is a pure function; an event that makes no sense
//! for the current screen leaves it unchanged.

use super::letter::Participant;

/// Which screen the diary is on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    /// Who is visiting?
    SelectVisitor,
    /// Whose diary to open?
    SelectProfile { visitor: Participant },
    /// Read or write?
    SelectAction {
        visitor: Participant,
        profile: Participant,
    },
    /// Composing a letter into `profile`'s diary.
    Write {
        visitor: Participant,
        profile: Participant,
    },
    /// Letter list of `profile`'s diary.
    Letters {
        visitor: Participant,
        profile: Participant,
    },
    /// Sealed letter, ribbon not yet pulled.
    RibbonPull {
        visitor: Participant,
        profile: Participant,
        letter_id: String,
    },
    /// Tapping the heart.
    Game {
        visitor: Participant,
        profile: Participant,
        letter_id: String,
    },
    /// Letter content shown.
    Reveal {
        visitor: Participant,
        profile: Participant,
        letter_id: String,
    },
}

/// Something the user did, or something that finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    ChooseVisitor(Participant),
    ChooseProfile(Participant),
    ChooseWrite,
    ChooseRead,
    /// The letter being written was saved.
    LetterSaved,
    OpenLetter(String),
    RibbonPulled,
    GameFinished,
    PlayAgain,
    /// A letter was deleted from the list.
    LetterDeleted(String),
    Back,
    Reset,
}

impl ViewState {
    /// Visitor and profile, once both are chosen.
    #[must_use]
    pub const fn selection(&self) -> Option<(Participant, Participant)> {
        match self {
            Self::SelectVisitor | Self::SelectProfile { .. } => None,
            Self::SelectAction { visitor, profile }
            | Self::Write { visitor, profile }
            | Self::Letters { visitor, profile }
            | Self::RibbonPull {
                visitor, profile, ..
            }
            | Self::Game {
                visitor, profile, ..
            }
            | Self::Reveal {
                visitor, profile, ..
            } => Some((*visitor, *profile)),
        }
    }

    /// Letter currently opened, if any.
    #[must_use]
    pub fn open_letter(&self) -> Option<&str> {
        match self {
            Self::RibbonPull { letter_id, .. }
            | Self::Game { letter_id, .. }
            | Self::Reveal { letter_id, .. } => Some(letter_id),
            _ => None,
        }
    }
}

/// Compute the next screen.
#[must_use]
pub fn transition(state: &ViewState, event: ViewEvent) -> ViewState {
    use ViewEvent as E;
    use ViewState as S;

    match (state, event) {
        (_, E::Reset) => S::SelectVisitor,

        (S::SelectVisitor, E::ChooseVisitor(visitor)) => S::SelectProfile { visitor },

        (S::SelectProfile { visitor }, E::ChooseProfile(profile)) => S::SelectAction {
            visitor: *visitor,
            profile,
        },
        (S::SelectProfile { .. }, E::Back) => S::SelectVisitor,

        (S::SelectAction { visitor, profile }, E::ChooseWrite) => S::Write {
            visitor: *visitor,
            profile: *profile,
        },
        (S::SelectAction { visitor, profile }, E::ChooseRead) => S::Letters {
            visitor: *visitor,
            profile: *profile,
        },
        (S::SelectAction { visitor, .. }, E::Back) => S::SelectProfile { visitor: *visitor },

        (S::Write { visitor, profile }, E::LetterSaved) => S::SelectAction {
            visitor: *visitor,
            profile: *profile,
        },
        (S::Write { visitor, profile } | S::Letters { visitor, profile }, E::Back) => {
            S::SelectAction {
                visitor: *visitor,
                profile: *profile,
            }
        }

        (S::Letters { visitor, profile }, E::ChooseWrite) => S::Write {
            visitor: *visitor,
            profile: *profile,
        },
        (S::Letters { visitor, profile }, E::OpenLetter(letter_id)) => S::RibbonPull {
            visitor: *visitor,
            profile: *profile,
            letter_id,
        },

        (
            S::RibbonPull {
                visitor,
                profile,
                letter_id,
            },
            E::RibbonPulled,
        ) => S::Game {
            visitor: *visitor,
            profile: *profile,
            letter_id: letter_id.clone(),
        },
        (
            S::Game {
                visitor,
                profile,
                letter_id,
            },
            E::GameFinished,
        ) => S::Reveal {
            visitor: *visitor,
            profile: *profile,
            letter_id: letter_id.clone(),
        },
        (
            S::Reveal {
                visitor,
                profile,
                letter_id,
            },
            E::PlayAgain,
        ) => S::RibbonPull {
            visitor: *visitor,
            profile: *profile,
            letter_id: letter_id.clone(),
        },
        (
            S::RibbonPull {
                visitor, profile, ..
            }
            | S::Game {
                visitor, profile, ..
            }
            | S::Reveal {
                visitor, profile, ..
            },
            E::Back,
        ) => S::Letters {
            visitor: *visitor,
            profile: *profile,
        },
        (
            S::RibbonPull {
                visitor,
                profile,
                letter_id,
            }
            | S::Game {
                visitor,
                profile,
                letter_id,
            }
            | S::Reveal {
                visitor,
                profile,
                letter_id,
            },
            E::LetterDeleted(deleted),
        ) if *letter_id == deleted => S::Letters {
            visitor: *visitor,
            profile: *profile,
        },

        (current, _) => current.clone(),
    }
}

/// Time-of-day greeting for a 0-23 hour.
#[must_use]
pub const fn greeting(hour: u32) -> &'static str {
    if hour < 12 {
        "Good Morning"
    } else if hour < 18 {
        "Good Afternoon"
    } else {
        "Good Evening"
    }
}

/// Pet name the visitor is greeted with.
#[must_use]
pub const fn pet_name(visitor: Participant) -> &'static str {
    match visitor {
        Participant::Boyfriend => "Handsome",
        Participant::Girlfriend => "Beautiful",
    }
}
