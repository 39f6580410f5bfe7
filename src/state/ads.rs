// Ads tab state.
// Second instance of the cache/pager design, for the ad collection.

use std::collections::HashMap;

use ratatui::widgets::ListState;

use crate::api::types::Ad;

use super::cache::{Record, RecordCache};
use super::expiry::Countdown;
use super::pager::{PAGE_SIZE, Pager};
use super::{Alert, EXPIRY_CHOICES};

impl Record for Ad {
    type Key = i64;

    fn key(&self) -> &i64 {
        &self.id
    }

    fn expiry_time(&self) -> i64 {
        self.expiry_time
    }

    // An expired ad just stops being served; it can still be edited or
    // deleted from the console.
    const LOCK_ON_EXPIRY: bool = false;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdFormMode {
    Create,
    Edit { id: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdField {
    Name,
    ImageUrl,
    AdLink,
    Expiry,
    Countdown,
}

const AD_FIELDS: [AdField; 5] = [
    AdField::Name,
    AdField::ImageUrl,
    AdField::AdLink,
    AdField::Expiry,
    AdField::Countdown,
];

/// Modal form state for creating or editing an ad.
#[derive(Debug, Clone)]
pub struct AdForm {
    pub mode: AdFormMode,
    pub name: String,
    pub image_url: String,
    pub ad_link: String,
    /// Index into [`EXPIRY_CHOICES`].
    pub expiry_choice: usize,
    pub countdown: String,
    pub field: AdField,
}

impl AdForm {
    pub fn create() -> Self {
        Self {
            mode: AdFormMode::Create,
            name: String::new(),
            image_url: String::new(),
            ad_link: String::new(),
            expiry_choice: 0,
            countdown: "5".to_string(),
            field: AdField::Name,
        }
    }

    pub fn edit(ad: &Ad) -> Self {
        Self {
            mode: AdFormMode::Edit { id: ad.id },
            name: ad.name.clone(),
            image_url: ad.image_url.clone(),
            ad_link: ad.ad_link.clone(),
            expiry_choice: 0,
            countdown: ad.countdown_seconds.to_string(),
            field: AdField::Name,
        }
    }

    pub fn next_field(&mut self) {
        let i = AD_FIELDS.iter().position(|f| *f == self.field).unwrap_or(0);
        self.field = AD_FIELDS[(i + 1) % AD_FIELDS.len()];
    }

    pub fn prev_field(&mut self) {
        let i = AD_FIELDS.iter().position(|f| *f == self.field).unwrap_or(0);
        self.field = AD_FIELDS[(i + AD_FIELDS.len() - 1) % AD_FIELDS.len()];
    }

    pub fn expiry_delay(&self) -> i64 {
        EXPIRY_CHOICES[self.expiry_choice.min(EXPIRY_CHOICES.len() - 1)].1
    }

    /// Countdown seconds as entered, defaulting to 5 when left empty. The
    /// server enforces the 0..=30 range.
    pub fn countdown_seconds(&self) -> i64 {
        let trimmed = self.countdown.trim();
        if trimmed.is_empty() {
            5
        } else {
            trimmed.parse().unwrap_or(-1)
        }
    }

    pub fn cycle(&mut self, forward: bool) {
        if self.field == AdField::Expiry {
            let len = EXPIRY_CHOICES.len();
            self.expiry_choice = if forward {
                (self.expiry_choice + 1) % len
            } else {
                (self.expiry_choice + len - 1) % len
            };
        }
    }

    pub fn push_char(&mut self, c: char) {
        match self.field {
            AdField::Name => self.name.push(c),
            AdField::ImageUrl => self.image_url.push(c),
            AdField::AdLink => self.ad_link.push(c),
            AdField::Countdown => {
                if c.is_ascii_digit() {
                    self.countdown.push(c);
                }
            }
            AdField::Expiry => {}
        }
    }

    pub fn pop_char(&mut self) {
        match self.field {
            AdField::Name => {
                self.name.pop();
            }
            AdField::ImageUrl => {
                self.image_url.pop();
            }
            AdField::AdLink => {
                self.ad_link.pop();
            }
            AdField::Countdown => {
                self.countdown.pop();
            }
            AdField::Expiry => {}
        }
    }
}

/// Complete state for the ads tab. Same lifetime rules as the links tab.
#[derive(Debug, Default)]
pub struct AdsTab {
    pub cache: RecordCache<Ad>,
    pub pager: Pager,
    pub rows: HashMap<i64, Countdown>,
    pub list_state: ListState,
    pub form: Option<AdForm>,
    pub confirm_delete: Option<i64>,
    pub alert: Option<Alert>,
}

impl AdsTab {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visible(&self) -> &[Ad] {
        self.cache.window(self.pager.page(), PAGE_SIZE)
    }

    pub fn selected_ad(&self) -> Option<&Ad> {
        let index = self.list_state.selected()?;
        self.visible().get(index)
    }

    pub fn select_next(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i >= len - 1 => i,
            Some(i) => i + 1,
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_prev(&mut self) {
        if self.visible().is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => 0,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    pub fn reset_selection(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            self.list_state.select(None);
        } else {
            let i = self.list_state.selected().unwrap_or(0).min(len - 1);
            self.list_state.select(Some(i));
        }
    }

    pub fn clear(&mut self) {
        self.cache.clear();
        self.pager.reset();
        self.rows.clear();
        self.list_state.select(None);
        self.form = None;
        self.confirm_delete = None;
        self.alert = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_parsing() {
        let mut form = AdForm::create();
        assert_eq!(form.countdown_seconds(), 5);

        form.countdown.clear();
        assert_eq!(form.countdown_seconds(), 5);

        form.field = AdField::Countdown;
        form.push_char('1');
        form.push_char('2');
        form.push_char('x');
        assert_eq!(form.countdown, "12");
        assert_eq!(form.countdown_seconds(), 12);
    }

    #[test]
    fn test_edit_form_prefills() {
        let ad = Ad {
            id: 4,
            name: "spring sale".into(),
            image_url: "https://cdn.example.com/sale.png".into(),
            ad_link: "https://example.com/sale".into(),
            expiry_time: 0,
            countdown_seconds: 8,
        };
        let form = AdForm::edit(&ad);

        assert_eq!(form.mode, AdFormMode::Edit { id: 4 });
        assert_eq!(form.name, "spring sale");
        assert_eq!(form.countdown, "8");
    }
}
