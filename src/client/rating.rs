use crate::schedule::{Schedule, ScheduleStatus};

/// What the session view offers for rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingControl {
    Hidden,
    Editable,
    ReadOnly(u8),
}

impl RatingControl {
    pub fn for_schedule(schedule: &Schedule) -> Self {
        if schedule.can_be_rated() {
            return RatingControl::Editable;
        }
        match (schedule.status, schedule.rating) {
            (ScheduleStatus::Completed, Some(stars)) => {
                RatingControl::ReadOnly(stars.clamp(0, 5) as u8)
            }
            _ => RatingControl::Hidden,
        }
    }
}

/// Five-star picker: hovering previews, clicking commits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StarSelector {
    selected: u8,
    hovered: Option<u8>,
}

impl StarSelector {
    pub const MAX: u8 = 5;

    pub fn hover(&mut self, star: u8) {
        self.hovered = Some(star.min(Self::MAX));
    }

    pub fn leave(&mut self) {
        self.hovered = None;
    }

    pub fn click(&mut self, star: u8) {
        self.selected = star.min(Self::MAX);
    }

    pub fn selected(&self) -> u8 {
        self.selected
    }

    /// Stars drawn filled right now.
    pub fn displayed(&self) -> u8 {
        self.hovered.unwrap_or(self.selected)
    }
}
