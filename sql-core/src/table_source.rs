//! Table source model: what a `FROM`/`JOIN` clause refers to.

use crate::dialect::Dialect;
use crate::expr::BoundParam;

/// The source of rows for a `FROM` or `JOIN` clause.
#[derive(Debug, Clone, PartialEq)]
pub enum TableSource {
    Table { schema: Option<String>, name: String, alias: Option<String> },
    Subquery { builder: Box<crate::builder::Builder>, alias: String },
}

impl TableSource {
    #[must_use]
    pub fn table(name: impl Into<String>) -> Self {
        Self::Table { schema: None, name: name.into(), alias: None }
    }

    #[must_use]
    pub fn table_with_alias(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self::Table { schema: None, name: name.into(), alias: Some(alias.into()) }
    }

    #[must_use]
    pub fn schema_qualified(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Table { schema: Some(schema.into()), name: name.into(), alias: None }
    }

    pub fn render(&self, dialect: &dyn Dialect, next_param_index: &mut usize) -> (String, Vec<BoundParam>) {
        match self {
            Self::Table { schema, name, alias } => {
                let escaped_name = dialect.escape_table_name(name);
                let mut sql = match schema {
                    Some(schema) => format!("{}.{escaped_name}", dialect.escape_table_name(schema)),
                    None => escaped_name,
                };
                if let Some(alias) = alias {
                    sql.push_str(&format!(" {alias}"));
                }
                (sql, Vec::new())
            }
            Self::Subquery { builder, alias } => {
                let rendered = builder.build(dialect).unwrap_or_default();
                let mut params = rendered.params;
                let mut idx = *next_param_index;
                idx += params.len();
                *next_param_index = idx;
                for param in &mut params {
                    param.name = format!("{}_{}", alias, param.name);
                }
                (format!("({}) AS {alias}", rendered.sql), params)
            }
        }
    }
}
