//! Which screen is shown, which category is open, what the user typed.
//!
//! ```text
//!             select_category(known id)
//!   Overview ─────────────────────────────▶ CategoryDetail
//!      ▲  │ navigate_to(Glossary | Contacts | Directories)
//!      │  ▼
//!   go_home / select_category(unknown id)
//! ```
//!
//! Every transition returns a [`Transition`]; the presentation layer resets
//! its scroll position whenever it receives one. Typing is not a transition.

use crate::ContentStore;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum View {
    #[default]
    Overview,
    CategoryDetail,
    Glossary,
    Contacts,
    Directories,
}

impl View {
    pub fn as_str(&self) -> &'static str {
        match self {
            View::Overview => "overview",
            View::CategoryDetail => "category-detail",
            View::Glossary => "glossary",
            View::Contacts => "contacts",
            View::Directories => "directories",
        }
    }

    /// Dutch heading used by the front ends.
    pub fn title_nl(&self) -> &'static str {
        match self {
            View::Overview => "Dashboard",
            View::CategoryDetail => "Onderwerp",
            View::Glossary => "Begrippen",
            View::Contacts => "Nuttige nummers",
            View::Directories => "Annuaires",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a state change; always asks for a scroll reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[must_use]
pub struct Transition {
    pub from: View,
    pub to: View,
}

impl Transition {
    pub fn resets_scroll(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NavigationState {
    view: View,
    selected_category: Option<String>,
    search_text: String,
}

impl NavigationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn selected_category_id(&self) -> Option<&str> {
        self.selected_category.as_deref()
    }

    /// The open category, resolved against `store`.
    pub fn selected_category<'s>(&self, store: &'s ContentStore) -> Option<&'s crate::Category> {
        self.selected_category
            .as_deref()
            .and_then(|id| store.category(id))
    }

    /// Opens the category `id`. Unknown ids behave exactly like [`go_home`].
    ///
    /// [`go_home`]: NavigationState::go_home
    pub fn select_category(&mut self, store: &ContentStore, id: &str) -> Transition {
        if store.category(id).is_none() {
            tracing::debug!(category = id, "unknown category selected, returning home");
            return self.go_home();
        }
        let from = self.view;
        self.selected_category = Some(id.to_string());
        self.view = View::CategoryDetail;
        Transition {
            from,
            to: self.view,
        }
    }

    pub fn go_home(&mut self) -> Transition {
        let from = self.view;
        self.selected_category = None;
        self.search_text.clear();
        self.view = View::Overview;
        Transition {
            from,
            to: self.view,
        }
    }

    /// Moves to `view`, optionally replacing the search text.
    ///
    /// `CategoryDetail` is only entered through [`select_category`]; asking
    /// for it here keeps an existing selection or falls back home.
    ///
    /// [`select_category`]: NavigationState::select_category
    pub fn navigate_to(&mut self, view: View, preset_query: Option<&str>) -> Transition {
        if view == View::CategoryDetail {
            if self.selected_category.is_none() {
                return self.go_home();
            }
        } else {
            self.selected_category = None;
        }
        if let Some(query) = preset_query {
            self.search_text = query.to_string();
        }
        let from = self.view;
        self.view = view;
        Transition { from, to: view }
    }

    /// Replaces the search text; the view stays where it is.
    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
    }
}
