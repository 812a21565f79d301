use std::fmt;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Dashboard,
    TicketDetail(String),
    Analytics,
}

impl Route {
    pub fn parse(path: &str) -> AppResult<Self> {
        let trimmed = path.trim();
        let without_query = trimmed.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = without_query
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();

        match segments.as_slice() {
            [] => Ok(Route::Home),
            ["login"] => Ok(Route::Login),
            ["dashboard"] => Ok(Route::Dashboard),
            ["analytics"] => Ok(Route::Analytics),
            ["ticket", id] => Ok(Route::TicketDetail((*id).to_string())),
            _ => Err(AppError::InvalidInput(format!("unknown route '{trimmed}'"))),
        }
    }

    pub fn requires_user(&self) -> bool {
        matches!(
            self,
            Route::Dashboard | Route::TicketDetail(_) | Route::Analytics
        )
    }

    /// Where the guard sends a visitor asking for this route.
    pub fn resolve(self, signed_in: bool) -> Self {
        match (self, signed_in) {
            (Route::Home | Route::Login, true) => Route::Dashboard,
            (route, false) if route.requires_user() => Route::Login,
            (route, _) => route,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home => f.write_str("/"),
            Route::Login => f.write_str("/login"),
            Route::Dashboard => f.write_str("/dashboard"),
            Route::TicketDetail(id) => write!(f, "/ticket/{id}"),
            Route::Analytics => f.write_str("/analytics"),
        }
    }
}
