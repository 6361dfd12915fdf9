//! Paged result sets
//!
//! A [`PageRequest`] selects a zero-based page of a listing and an
//! optional sort key. Sort keys are checked against a per-listing allow
//! list before they reach SQL, so ORDER BY clauses are only ever built
//! from fixed column names.

use crate::config::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Id,
    Name,
    Title,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    fn column(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Name => "name",
            SortField::Title => "title",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
        }
    }
}

impl FromStr for SortField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "id" => Ok(SortField::Id),
            "name" => Ok(SortField::Name),
            "title" => Ok(SortField::Title),
            "createdAt" | "created_at" => Ok(SortField::CreatedAt),
            "updatedAt" | "updated_at" => Ok(SortField::UpdatedAt),
            other => Err(AppError::Validation(format!("Unknown sort field: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: SortField,
    #[serde(default)]
    pub direction: Direction,
}

impl Sort {
    pub fn asc(field: SortField) -> Self {
        Self {
            field,
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: SortField) -> Self {
        Self {
            field,
            direction: Direction::Desc,
        }
    }

    /// Parse a `field[,asc|desc]` sort string, e.g. `"title,desc"`.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut parts = raw.splitn(2, ',');
        let field = parts.next().unwrap_or_default().parse::<SortField>()?;

        let direction = match parts.next().map(|d| d.trim().to_ascii_lowercase()) {
            None => Direction::Asc,
            Some(d) if d == "asc" => Direction::Asc,
            Some(d) if d == "desc" => Direction::Desc,
            Some(d) => {
                return Err(AppError::Validation(format!("Unknown sort direction: {}", d)))
            }
        };

        Ok(Self { field, direction })
    }
}

/// Which page of a listing to return
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub size: u32,
    #[serde(default)]
    pub sort: Option<Sort>,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort: None,
        }
    }
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            sort: None,
        }
    }

    pub fn sorted_by(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }

    /// Build the ORDER BY clause for a listing aliased as `alias`.
    ///
    /// Storage order (id ascending) applies when no sort key was given,
    /// and breaks ties otherwise.
    pub fn order_clause(&self, alias: &str, allowed: &[SortField]) -> Result<String> {
        if self.size == 0 || self.size > MAX_PAGE_SIZE {
            return Err(AppError::Validation(format!(
                "Page size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        let Some(sort) = self.sort else {
            return Ok(format!("{}.id ASC", alias));
        };

        if !allowed.contains(&sort.field) {
            return Err(AppError::Validation(format!(
                "Cannot sort by {:?} here",
                sort.field
            )));
        }

        let direction = match sort.direction {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        };

        if sort.field == SortField::Id {
            Ok(format!("{}.id {}", alias, direction))
        } else {
            Ok(format!(
                "{alias}.{} {direction}, {alias}.id ASC",
                sort.field.column()
            ))
        }
    }
}

/// One page of results plus total-count metadata
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: i64,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: &PageRequest, total_elements: i64) -> Self {
        let size = i64::from(request.size.max(1));
        let total_pages = (total_elements.max(0) + size - 1) / size;

        Self {
            items,
            page: request.page,
            size: request.size,
            total_elements,
            total_pages: u32::try_from(total_pages).unwrap_or(u32::MAX),
        }
    }

    /// Same page metadata around different items.
    pub fn with_items<U>(self, items: Vec<U>) -> Page<U> {
        Page {
            items,
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        let items = self.items.into_iter().map(f).collect();
        Page {
            items,
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}
