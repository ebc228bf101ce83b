//! List query options shared by the remote adapter and the local mirror.
//!
//! Both paths honor the same filter, ordering and limit so a caller cannot
//! tell from the shape of a list which store answered it.

use crate::cache::Record;

/// Column a list can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderColumn {
  #[default]
  CreatedAt,
  UpdatedAt,
}

impl OrderColumn {
  pub fn as_str(self) -> &'static str {
    match self {
      OrderColumn::CreatedAt => "created_at",
      OrderColumn::UpdatedAt => "updated_at",
    }
  }
}

/// Single-column ordering. Defaults to newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Order {
  pub column: OrderColumn,
  pub ascending: bool,
}

impl Order {
  pub fn newest_first() -> Self {
    Self::default()
  }

  /// PostgREST `order` parameter value, e.g. `created_at.desc`
  pub fn to_param(self) -> String {
    let direction = if self.ascending { "asc" } else { "desc" };
    format!("{}.{}", self.column.as_str(), direction)
  }

  /// Stable in-memory sort: records comparing equal keep their relative order.
  pub fn sort<T: Record>(self, records: &mut [T]) {
    let key = |r: &T| match self.column {
      OrderColumn::CreatedAt => r.created_at(),
      OrderColumn::UpdatedAt => r.updated_at(),
    };
    if self.ascending {
      records.sort_by(|a, b| key(a).cmp(&key(b)));
    } else {
      records.sort_by(|a, b| key(b).cmp(&key(a)));
    }
  }
}

/// Options for a list call.
#[derive(Debug, Clone)]
pub struct ListQuery<F> {
  pub filter: F,
  pub order: Order,
  pub limit: Option<usize>,
}

impl<F: Default> Default for ListQuery<F> {
  fn default() -> Self {
    Self {
      filter: F::default(),
      order: Order::newest_first(),
      limit: None,
    }
  }
}

impl<F> ListQuery<F> {
  pub fn filtered(filter: F) -> Self {
    Self {
      filter,
      order: Order::newest_first(),
      limit: None,
    }
  }

  pub fn with_order(mut self, order: Order) -> Self {
    self.order = order;
    self
  }

  pub fn with_limit(mut self, limit: usize) -> Self {
    self.limit = Some(limit);
    self
  }
}

impl<F> ListQuery<F> {
  /// Apply filter, order and limit to an in-memory collection.
  pub fn apply<T>(&self, records: Vec<T>) -> Vec<T>
  where
    T: Record<Filter = F>,
  {
    let mut selected: Vec<T> = records
      .into_iter()
      .filter(|r| r.matches(&self.filter))
      .collect();
    self.order.sort(&mut selected);
    if let Some(limit) = self.limit {
      selected.truncate(limit);
    }
    selected
  }
}
