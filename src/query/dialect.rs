//! Placeholder dialects.

use serde::{Deserialize, Serialize};

/// How positional placeholders are written for a backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// `?, ?, ?` (MySQL, SQLite)
    #[default]
    Question,
    /// `$1, $2, $3` (Postgres)
    Dollar,
}

impl Dialect {
    /// Rewrite the compiler's `?` markers into this dialect.
    ///
    /// `??` is an escaped literal question mark and renders as `?`.
    pub fn render(&self, sql: &str) -> String {
        match self {
            Dialect::Question => sql.replace("??", "?"),
            Dialect::Dollar => {
                let mut out = String::with_capacity(sql.len() + 8);
                let mut chars = sql.chars().peekable();
                let mut n = 0;
                while let Some(c) = chars.next() {
                    if c != '?' {
                        out.push(c);
                    } else if chars.peek() == Some(&'?') {
                        chars.next();
                        out.push('?');
                    } else {
                        n += 1;
                        out.push('$');
                        out.push_str(&n.to_string());
                    }
                }
                out
            }
        }
    }
}
