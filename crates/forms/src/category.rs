//! Category and subcategory pickers of the add-goods wizard.
//!
//! The subcategory depends on the category; the dependency is expressed as
//! an explicit table of reset rules that fire on category and locale
//! changes.

use client_core::{ClientError, MarketplaceApi};
use shared::domain::{Category, CategoryId, Locale, SubcategoryId};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    i18n::{keys, Message},
    notice::{Notice, NoticeSink},
    store::AppSnapshot,
    validation::FieldErrors,
};

pub const CATEGORY_FIELD: &str = "categoryId";
pub const SUBCATEGORY_FIELD: &str = "subcategoryId";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    CategoryChanged,
    LocaleChanged,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub category: Option<CategoryId>,
    pub subcategory: Option<SubcategoryId>,
}

#[derive(Clone, Copy)]
pub struct ResetRule {
    pub trigger: Trigger,
    pub condition: fn(&Selection) -> bool,
    pub reset: fn(&mut Selection),
}

fn always(_: &Selection) -> bool {
    true
}

fn has_category(selection: &Selection) -> bool {
    selection.category.is_some()
}

fn clear_subcategory(selection: &mut Selection) {
    selection.subcategory = None;
}

pub const RESET_RULES: &[ResetRule] = &[
    ResetRule {
        trigger: Trigger::CategoryChanged,
        condition: always,
        reset: clear_subcategory,
    },
    ResetRule {
        trigger: Trigger::LocaleChanged,
        condition: has_category,
        reset: clear_subcategory,
    },
];

/// Runs every rule registered for `trigger` whose condition holds. Returns
/// how many fired.
pub fn apply_rules(rules: &[ResetRule], trigger: Trigger, selection: &mut Selection) -> usize {
    let mut fired = 0;
    for rule in rules.iter().filter(|rule| rule.trigger == trigger) {
        if (rule.condition)(selection) {
            (rule.reset)(selection);
            fired += 1;
        }
    }
    fired
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption<Id> {
    pub id: Id,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SelectError {
    #[error("category {0} is not in the loaded tree")]
    UnknownCategory(CategoryId),
    #[error("subcategory {0} does not belong to the selected category")]
    UnknownSubcategory(SubcategoryId),
    #[error("choose a category first")]
    NoCategory,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    NotLoaded,
    Loading,
    Loaded,
    Failed,
}

#[derive(Debug)]
pub struct CategorySelector {
    categories: Vec<Category>,
    load_state: LoadState,
    selection: Selection,
    locale: Locale,
}

impl CategorySelector {
    pub fn new(locale: Locale) -> Self {
        Self {
            categories: Vec::new(),
            load_state: LoadState::NotLoaded,
            selection: Selection::default(),
            locale,
        }
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Claims the single fetch this selector is allowed. `false` once a
    /// fetch has been started, whatever its outcome.
    pub fn begin_load(&mut self) -> bool {
        if self.load_state != LoadState::NotLoaded {
            return false;
        }
        self.load_state = LoadState::Loading;
        true
    }

    pub fn finish_load(
        &mut self,
        result: Result<Vec<Category>, ClientError>,
        notices: &dyn NoticeSink,
    ) {
        match result {
            Ok(categories) => {
                debug!(count = categories.len(), "category tree loaded");
                self.categories = categories;
                self.load_state = LoadState::Loaded;
            }
            Err(err) => {
                warn!("loading categories failed: {err}");
                notices.push(Notice::error_text(err.detail()));
                self.load_state = LoadState::Failed;
            }
        }
    }

    pub async fn load(&mut self, api: &dyn MarketplaceApi, notices: &dyn NoticeSink) -> bool {
        if !self.begin_load() {
            return false;
        }
        let result = api.fetch_categories().await;
        self.finish_load(result, notices);
        self.load_state == LoadState::Loaded
    }

    pub fn category_options(&self) -> Vec<SelectOption<CategoryId>> {
        self.categories
            .iter()
            .map(|category| SelectOption {
                id: category.id,
                name: category.name.clone(),
            })
            .collect()
    }

    pub fn subcategory_options(&self) -> Vec<SelectOption<SubcategoryId>> {
        self.selected_category()
            .map(|category| {
                category
                    .subcategories
                    .iter()
                    .map(|sub| SelectOption {
                        id: sub.id,
                        name: sub.name.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn selected_category(&self) -> Option<&Category> {
        let id = self.selection.category?;
        self.categories.iter().find(|category| category.id == id)
    }

    pub fn select_category(&mut self, id: CategoryId) -> Result<(), SelectError> {
        if !self.categories.iter().any(|category| category.id == id) {
            return Err(SelectError::UnknownCategory(id));
        }
        if self.selection.category == Some(id) {
            return Ok(());
        }
        self.selection.category = Some(id);
        apply_rules(RESET_RULES, Trigger::CategoryChanged, &mut self.selection);
        Ok(())
    }

    pub fn select_subcategory(&mut self, id: SubcategoryId) -> Result<(), SelectError> {
        let category = self.selected_category().ok_or(SelectError::NoCategory)?;
        if !category.subcategories.iter().any(|sub| sub.id == id) {
            return Err(SelectError::UnknownSubcategory(id));
        }
        self.selection.subcategory = Some(id);
        Ok(())
    }

    pub fn change_locale(&mut self, locale: Locale) {
        if self.locale == locale {
            return;
        }
        self.locale = locale;
        let fired = apply_rules(RESET_RULES, Trigger::LocaleChanged, &mut self.selection);
        debug!(%locale, fired, "locale changed");
    }

    pub fn sync(&mut self, snapshot: &AppSnapshot) {
        self.change_locale(snapshot.locale);
    }

    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.selection.category.is_none() {
            errors.insert(CATEGORY_FIELD, Message::Key(keys::REQUIRE_FIELD));
        }
        if self.selection.subcategory.is_none() {
            errors.insert(SUBCATEGORY_FIELD, Message::Key(keys::REQUIRE_FIELD));
        }
        errors
    }
}

#[cfg(test)]
#[path = "tests/category_tests.rs"]
mod tests;
