// Links tab state.
// Owns the link cache, its pager, the countdown rows, and the link forms.

use std::collections::HashMap;

use ratatui::widgets::ListState;

use crate::api::types::{AdSummary, Link};

use super::cache::{Record, RecordCache};
use super::expiry::Countdown;
use super::pager::{PAGE_SIZE, Pager};
use super::{Alert, EXPIRY_CHOICES};

impl Record for Link {
    type Key = String;

    fn key(&self) -> &String {
        &self.shortlink
    }

    fn expiry_time(&self) -> i64 {
        self.expiry_time
    }

    // An expired link no longer resolves; its actions are locked.
    const LOCK_ON_EXPIRY: bool = true;
}

/// Label for a link's ad association: `"{name} (#{id})"` when the selectable
/// projection knows the name, the raw id as a degraded fallback, `-` when
/// there is no association.
pub fn ad_label(ad_id: Option<i64>, summaries: &[AdSummary]) -> String {
    let Some(id) = ad_id else {
        return "-".to_string();
    };
    match summaries.iter().find(|ad| ad.id == id) {
        Some(ad) => format!("{} (#{})", ad.name, id),
        None => format!("Ad #{id}"),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkFormMode {
    Create,
    Edit { shortlink: String },
}

/// Fields reachable in the link form; the create and edit variants cycle
/// through different subsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkField {
    LongUrl,
    ShortCode,
    Expiry,
    Ad,
    ResetHits,
}

const CREATE_FIELDS: [LinkField; 4] = [
    LinkField::LongUrl,
    LinkField::ShortCode,
    LinkField::Expiry,
    LinkField::Ad,
];
const EDIT_FIELDS: [LinkField; 3] = [LinkField::LongUrl, LinkField::Ad, LinkField::ResetHits];

/// Modal form state for creating or editing a link.
#[derive(Debug, Clone)]
pub struct LinkForm {
    pub mode: LinkFormMode,
    pub long_url: String,
    pub short_code: String,
    /// Index into [`EXPIRY_CHOICES`].
    pub expiry_choice: usize,
    /// Zero means no association, `n` means the n-1th selectable ad.
    pub ad_choice: usize,
    pub reset_hits: bool,
    pub field: LinkField,
}

impl LinkForm {
    pub fn create() -> Self {
        Self {
            mode: LinkFormMode::Create,
            long_url: String::new(),
            short_code: String::new(),
            expiry_choice: 0,
            ad_choice: 0,
            reset_hits: false,
            field: LinkField::LongUrl,
        }
    }

    pub fn edit(link: &Link, summaries: &[AdSummary]) -> Self {
        let ad_choice = link
            .ad_id
            .and_then(|id| summaries.iter().position(|ad| ad.id == id))
            .map(|i| i + 1)
            .unwrap_or(0);
        Self {
            mode: LinkFormMode::Edit {
                shortlink: link.shortlink.clone(),
            },
            long_url: link.longlink.clone(),
            short_code: String::new(),
            expiry_choice: 0,
            ad_choice,
            reset_hits: false,
            field: LinkField::LongUrl,
        }
    }

    fn fields(&self) -> &'static [LinkField] {
        match self.mode {
            LinkFormMode::Create => &CREATE_FIELDS,
            LinkFormMode::Edit { .. } => &EDIT_FIELDS,
        }
    }

    pub fn next_field(&mut self) {
        let fields = self.fields();
        let i = fields.iter().position(|f| *f == self.field).unwrap_or(0);
        self.field = fields[(i + 1) % fields.len()];
    }

    pub fn prev_field(&mut self) {
        let fields = self.fields();
        let i = fields.iter().position(|f| *f == self.field).unwrap_or(0);
        self.field = fields[(i + fields.len() - 1) % fields.len()];
    }

    pub fn expiry_delay(&self) -> i64 {
        EXPIRY_CHOICES[self.expiry_choice.min(EXPIRY_CHOICES.len() - 1)].1
    }

    pub fn ad_id(&self, summaries: &[AdSummary]) -> Option<i64> {
        match self.ad_choice {
            0 => None,
            n => summaries.get(n - 1).map(|ad| ad.id),
        }
    }

    /// Step a choice field left or right; toggle the reset-hits flag.
    pub fn cycle(&mut self, forward: bool, summary_count: usize) {
        match self.field {
            LinkField::Expiry => {
                let len = EXPIRY_CHOICES.len();
                self.expiry_choice = if forward {
                    (self.expiry_choice + 1) % len
                } else {
                    (self.expiry_choice + len - 1) % len
                };
            }
            LinkField::Ad => {
                let len = summary_count + 1;
                self.ad_choice = if forward {
                    (self.ad_choice + 1) % len
                } else {
                    (self.ad_choice + len - 1) % len
                };
            }
            LinkField::ResetHits => self.reset_hits = !self.reset_hits,
            _ => {}
        }
    }

    pub fn push_char(&mut self, c: char) {
        match self.field {
            LinkField::LongUrl => self.long_url.push(c),
            LinkField::ShortCode => self.short_code.push(c),
            _ => {}
        }
    }

    pub fn pop_char(&mut self) {
        match self.field {
            LinkField::LongUrl => {
                self.long_url.pop();
            }
            LinkField::ShortCode => {
                self.short_code.pop();
            }
            _ => {}
        }
    }
}

/// Complete state for the links tab. Lives for one authenticated session;
/// cleared entirely on logout or when the user switches away.
#[derive(Debug, Default)]
pub struct LinksTab {
    pub cache: RecordCache<Link>,
    pub pager: Pager,
    pub rows: HashMap<String, Countdown>,
    pub selectable_ads: Vec<AdSummary>,
    pub list_state: ListState,
    pub form: Option<LinkForm>,
    pub confirm_delete: Option<String>,
    pub alert: Option<Alert>,
}

impl LinksTab {
    pub fn new() -> Self {
        Self::default()
    }

    /// The slice backing the current page.
    pub fn visible(&self) -> &[Link] {
        self.cache.window(self.pager.page(), PAGE_SIZE)
    }

    pub fn selected_link(&self) -> Option<&Link> {
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

    /// Clamp the selection after the window content changed.
    pub fn reset_selection(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            self.list_state.select(None);
        } else {
            let i = self.list_state.selected().unwrap_or(0).min(len - 1);
            self.list_state.select(Some(i));
        }
    }

    pub fn controls_locked(&self, link: &Link) -> bool {
        self.rows
            .get(&link.shortlink)
            .is_some_and(|row| row.controls_locked)
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

    fn summaries() -> Vec<AdSummary> {
        vec![
            AdSummary {
                id: 3,
                name: "spring sale".into(),
            },
            AdSummary {
                id: 7,
                name: "newsletter".into(),
            },
        ]
    }

    #[test]
    fn test_ad_label_variants() {
        let ads = summaries();
        assert_eq!(ad_label(None, &ads), "-");
        assert_eq!(ad_label(Some(3), &ads), "spring sale (#3)");
        // Unknown id degrades to the raw identifier.
        assert_eq!(ad_label(Some(9), &ads), "Ad #9");
    }

    #[test]
    fn test_edit_form_prefills_association() {
        let link = Link {
            shortlink: "docs".into(),
            longlink: "https://example.com/docs".into(),
            hits: 12,
            expiry_time: 0,
            ad_id: Some(7),
        };
        let form = LinkForm::edit(&link, &summaries());

        assert_eq!(form.long_url, "https://example.com/docs");
        assert_eq!(form.ad_choice, 2);
        assert_eq!(form.ad_id(&summaries()), Some(7));
    }

    #[test]
    fn test_form_field_cycle_depends_on_mode() {
        let mut form = LinkForm::create();
        form.next_field();
        assert_eq!(form.field, LinkField::ShortCode);
        form.prev_field();
        form.prev_field();
        assert_eq!(form.field, LinkField::Ad);

        let link = Link {
            shortlink: "docs".into(),
            longlink: "x".into(),
            hits: 0,
            expiry_time: 0,
            ad_id: None,
        };
        let mut form = LinkForm::edit(&link, &[]);
        form.next_field();
        assert_eq!(form.field, LinkField::Ad);
        form.next_field();
        assert_eq!(form.field, LinkField::ResetHits);
        form.next_field();
        assert_eq!(form.field, LinkField::LongUrl);
    }

    #[test]
    fn test_ad_choice_wraps_around_none() {
        let mut form = LinkForm::create();
        form.field = LinkField::Ad;
        form.cycle(true, 2);
        form.cycle(true, 2);
        assert_eq!(form.ad_choice, 2);
        form.cycle(true, 2);
        assert_eq!(form.ad_choice, 0);
        form.cycle(false, 2);
        assert_eq!(form.ad_choice, 2);
    }
}
