//! Filtering, sorting and pagination of the intervention table.

use serde::{Deserialize, Serialize};

use crate::{
  ids::{SiteId, TechnicianId},
  intervention::{Intervention, Status},
};

pub const DEFAULT_PER_PAGE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
  #[default]
  Id,
  DeclaredAt,
  ScheduledAt,
  Status,
  Priority,
}

/// Parameters for [`EntityStore::query_interventions`](crate::EntityStore::query_interventions).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterventionQuery {
  pub status:     Option<Status>,
  pub technician: Option<TechnicianId>,
  pub site:       Option<SiteId>,
  /// Case-insensitive match over site name, fault type and description.
  pub text:       Option<String>,
  #[serde(default)]
  pub sort:       SortKey,
  #[serde(default)]
  pub descending: bool,
  /// 1-based; `None` or `0` means the first page.
  pub page:       Option<usize>,
  pub per_page:   Option<usize>,
}

impl InterventionQuery {
  pub fn matches(&self, i: &Intervention) -> bool {
    if self.status.is_some_and(|s| s != i.status) {
      return false;
    }
    if self.technician.is_some_and(|t| i.technician != Some(t)) {
      return false;
    }
    if self.site.is_some_and(|s| s != i.site.site_id) {
      return false;
    }
    match self.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
      None => true,
      Some(text) => {
        let needle = text.to_lowercase();
        [
          i.site.name.as_str(),
          i.fault_type.label(),
          i.details.description.as_str(),
        ]
        .iter()
        .any(|hay| hay.to_lowercase().contains(&needle))
      }
    }
  }

  fn compare(&self, a: &Intervention, b: &Intervention) -> std::cmp::Ordering {
    let primary = match self.sort {
      SortKey::Id => a.id.cmp(&b.id),
      SortKey::DeclaredAt => a.declared_at.cmp(&b.declared_at),
      SortKey::ScheduledAt => a.scheduled_at.cmp(&b.scheduled_at),
      SortKey::Status => a.status.cmp(&b.status),
      SortKey::Priority => a.priority.cmp(&b.priority),
    };
    // Ties always fall back to ascending id so pages are stable.
    let primary = if self.descending { primary.reverse() } else { primary };
    primary.then_with(|| a.id.cmp(&b.id))
  }

  /// Filter, sort and cut one page out of `items`.
  pub fn run<'a>(&self, items: impl IntoIterator<Item = &'a Intervention>) -> Page<&'a Intervention> {
    let mut hits: Vec<&Intervention> = items.into_iter().filter(|i| self.matches(i)).collect();
    hits.sort_by(|a, b| self.compare(a, b));
    Page::slice(hits, self.page, self.per_page)
  }
}

/// One page of results plus what a pager needs to render itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
  pub items:      Vec<T>,
  pub total:      usize,
  pub page:       usize,
  pub per_page:   usize,
  pub page_count: usize,
}

impl<T> Page<T> {
  pub fn slice(all: Vec<T>, page: Option<usize>, per_page: Option<usize>) -> Self {
    let per_page = per_page.filter(|n| *n > 0).unwrap_or(DEFAULT_PER_PAGE);
    let page = page.filter(|n| *n > 0).unwrap_or(1);
    let total = all.len();
    let page_count = total.div_ceil(per_page);
    let items = all
      .into_iter()
      .skip((page - 1).saturating_mul(per_page))
      .take(per_page)
      .collect();
    Self { items, total, page, per_page, page_count }
  }

  pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
    Page {
      items:      self.items.into_iter().map(f).collect(),
      total:      self.total,
      page:       self.page,
      per_page:   self.per_page,
      page_count: self.page_count,
    }
  }
}
