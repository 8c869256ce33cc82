use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Navigation targets. The string form is what a link resolves to, e.g. `/detail/1`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
  #[default]
  Heroes,
  Detail(i64),
}

impl fmt::Display for Route {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Route::Heroes => write!(f, "/heroes"),
      Route::Detail(id) => write!(f, "/detail/{id}"),
    }
  }
}

impl FromStr for Route {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let path = s.trim_end_matches('/');
    match path.split('/').collect::<Vec<_>>().as_slice() {
      ["", "heroes"] | [""] => Ok(Route::Heroes),
      ["", "detail", id] => id.parse().map(Route::Detail).map_err(|_| format!("Invalid hero id in route: {s}")),
      _ => Err(format!("Unknown route: {s}")),
    }
  }
}
