//! Clause formatters: WHERE/HAVING conditions, ORDER BY, column lists and SET.
//!
//! These are pure functions over their inputs. An input that resolves to
//! nothing yields an empty clause (`""`) so chained calls can be no-ops.

use crate::error::{SqlError, SqlResult};
use crate::values::{Record, SqlValue};
use indexmap::IndexMap;

/// Joiner between condition list entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Joiner {
    #[default]
    And,
    Or,
}

impl Joiner {
    fn as_sql(self) -> &'static str {
        match self {
            Joiner::And => " AND ",
            Joiner::Or => " OR ",
        }
    }
}

/// Condition input: nothing, a raw expression, or a list of expressions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Conditions {
    #[default]
    None,
    Raw(String),
    List(Vec<String>),
}

impl From<&str> for Conditions {
    fn from(s: &str) -> Self {
        Conditions::Raw(s.to_string())
    }
}

impl From<String> for Conditions {
    fn from(s: String) -> Self {
        Conditions::Raw(s)
    }
}

impl From<Vec<String>> for Conditions {
    fn from(list: Vec<String>) -> Self {
        Conditions::List(list)
    }
}

impl From<Vec<&str>> for Conditions {
    fn from(list: Vec<&str>) -> Self {
        Conditions::List(list.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Conditions {
    fn from(list: [&str; N]) -> Self {
        Conditions::List(list.iter().map(|s| s.to_string()).collect())
    }
}

impl<T: Into<Conditions>> From<Option<T>> for Conditions {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Conditions::None, Into::into)
    }
}

/// Join a condition list, or pass a raw condition through.
///
/// Returns `None` when the clause should be omitted.
pub fn condition(conditions: &Conditions, joiner: Joiner) -> Option<String> {
    match conditions {
        Conditions::None => None,
        Conditions::Raw(s) if s.is_empty() => None,
        Conditions::Raw(s) => Some(s.clone()),
        Conditions::List(list) if list.is_empty() => None,
        Conditions::List(list) => Some(list.join(joiner.as_sql())),
    }
}

/// `\nWHERE <cond>`, or `""` when there is no condition.
pub fn where_clause(conditions: &Conditions, joiner: Joiner) -> String {
    prefixed("\nWHERE ", condition(conditions, joiner))
}

/// `\nHAVING <cond>`, or `""` when there is no condition.
pub fn having_clause(conditions: &Conditions, joiner: Joiner) -> String {
    prefixed("\nHAVING ", condition(conditions, joiner))
}

fn prefixed(keyword: &str, body: Option<String>) -> String {
    match body {
        Some(body) => format!("{keyword}{body}"),
        None => String::new(),
    }
}

/// Sort direction for the map form of [`OrderBy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Asc,
    Desc,
    AscNullsFirst,
    AscNullsLast,
    DescNullsFirst,
    DescNullsLast,
}

impl OrderDirection {
    fn as_sql(self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
            OrderDirection::AscNullsFirst => "ASC NULLS FIRST",
            OrderDirection::AscNullsLast => "ASC NULLS LAST",
            OrderDirection::DescNullsFirst => "DESC NULLS FIRST",
            OrderDirection::DescNullsLast => "DESC NULLS LAST",
        }
    }
}

/// One ORDER BY key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    pub key: String,
    pub asc: bool,
    /// `Some(true)` renders `NULLS LAST`, `Some(false)` renders `NULLS FIRST`.
    pub nulls_last: Option<bool>,
}

impl OrderItem {
    pub fn asc(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            asc: true,
            nulls_last: None,
        }
    }

    pub fn desc(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            asc: false,
            nulls_last: None,
        }
    }

    pub fn nulls_last(mut self) -> Self {
        self.nulls_last = Some(true);
        self
    }

    pub fn nulls_first(mut self) -> Self {
        self.nulls_last = Some(false);
        self
    }

    fn render(&self) -> String {
        let dir = if self.asc { "ASC" } else { "DESC" };
        match self.nulls_last {
            Some(true) => format!("{} {dir} NULLS LAST", self.key),
            Some(false) => format!("{} {dir} NULLS FIRST", self.key),
            None => format!("{} {dir}", self.key),
        }
    }
}

/// An entry of an ORDER BY list: a structured key or a raw expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderByEntry {
    Raw(String),
    Item(OrderItem),
}

impl From<&str> for OrderByEntry {
    fn from(s: &str) -> Self {
        OrderByEntry::Raw(s.to_string())
    }
}

impl From<OrderItem> for OrderByEntry {
    fn from(item: OrderItem) -> Self {
        OrderByEntry::Item(item)
    }
}

/// ORDER BY input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OrderBy {
    #[default]
    None,
    Raw(String),
    List(Vec<OrderByEntry>),
    Map(IndexMap<String, OrderDirection>),
}

impl From<&str> for OrderBy {
    fn from(s: &str) -> Self {
        OrderBy::Raw(s.to_string())
    }
}

impl From<String> for OrderBy {
    fn from(s: String) -> Self {
        OrderBy::Raw(s)
    }
}

impl From<OrderItem> for OrderBy {
    fn from(item: OrderItem) -> Self {
        OrderBy::List(vec![OrderByEntry::Item(item)])
    }
}

impl From<Vec<OrderByEntry>> for OrderBy {
    fn from(list: Vec<OrderByEntry>) -> Self {
        OrderBy::List(list)
    }
}

impl From<Vec<OrderItem>> for OrderBy {
    fn from(list: Vec<OrderItem>) -> Self {
        OrderBy::List(list.into_iter().map(OrderByEntry::Item).collect())
    }
}

impl From<IndexMap<String, OrderDirection>> for OrderBy {
    fn from(map: IndexMap<String, OrderDirection>) -> Self {
        OrderBy::Map(map)
    }
}

impl<T: Into<OrderBy>> From<Option<T>> for OrderBy {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(OrderBy::None, Into::into)
    }
}

/// `\nORDER BY k1 ASC,k2 DESC NULLS LAST`, or `""` for empty input.
pub fn order_by_clause(order: &OrderBy) -> String {
    let body = match order {
        OrderBy::None => return String::new(),
        OrderBy::Raw(s) => s.clone(),
        OrderBy::List(list) => list
            .iter()
            .map(|entry| match entry {
                OrderByEntry::Raw(s) => s.clone(),
                OrderByEntry::Item(item) => item.render(),
            })
            .collect::<Vec<_>>()
            .join(","),
        OrderBy::Map(map) => map
            .iter()
            .map(|(key, dir)| format!("{key} {}", dir.as_sql()))
            .collect::<Vec<_>>()
            .join(","),
    };
    prefixed("\nORDER BY ", (!body.is_empty()).then_some(body))
}

/// Value side of the map form of [`SelectColumns`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectAs {
    /// Render the alias alone.
    Bare,
    /// Render `<expr> AS <alias>`.
    Expr(String),
    /// Skip this entry.
    Omit,
}

impl From<bool> for SelectAs {
    fn from(b: bool) -> Self {
        if b { SelectAs::Bare } else { SelectAs::Omit }
    }
}

impl From<&str> for SelectAs {
    fn from(s: &str) -> Self {
        SelectAs::Expr(s.to_string())
    }
}

impl From<String> for SelectAs {
    fn from(s: String) -> Self {
        SelectAs::Expr(s)
    }
}

/// Column selection input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectColumns {
    Raw(String),
    List(Vec<String>),
    Map(IndexMap<String, SelectAs>),
}

impl From<&str> for SelectColumns {
    fn from(s: &str) -> Self {
        SelectColumns::Raw(s.to_string())
    }
}

impl From<String> for SelectColumns {
    fn from(s: String) -> Self {
        SelectColumns::Raw(s)
    }
}

impl From<Vec<String>> for SelectColumns {
    fn from(list: Vec<String>) -> Self {
        SelectColumns::List(list)
    }
}

impl From<Vec<&str>> for SelectColumns {
    fn from(list: Vec<&str>) -> Self {
        SelectColumns::List(list.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for SelectColumns {
    fn from(list: &[&str]) -> Self {
        SelectColumns::List(list.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for SelectColumns {
    fn from(list: [&str; N]) -> Self {
        SelectColumns::List(list.iter().map(|s| s.to_string()).collect())
    }
}

impl From<IndexMap<String, SelectAs>> for SelectColumns {
    fn from(map: IndexMap<String, SelectAs>) -> Self {
        SelectColumns::Map(map)
    }
}

impl<const N: usize> From<[(&str, SelectAs); N]> for SelectColumns {
    fn from(pairs: [(&str, SelectAs); N]) -> Self {
        SelectColumns::Map(pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }
}

/// Render a column selection.
///
/// A raw string passes through; a list is comma-joined; a map renders
/// `expr AS alias` (or the bare alias). Lists and maps that resolve to zero
/// columns fail with [`SqlError::EmptyColumns`].
pub fn select_columns(columns: &SelectColumns) -> SqlResult<String> {
    match columns {
        SelectColumns::Raw(s) => Ok(s.clone()),
        SelectColumns::List(list) => {
            if list.is_empty() {
                return Err(SqlError::EmptyColumns);
            }
            Ok(list.join(","))
        }
        SelectColumns::Map(map) => {
            let parts: Vec<String> = map
                .iter()
                .filter_map(|(alias, source)| match source {
                    SelectAs::Bare => Some(alias.clone()),
                    SelectAs::Expr(expr) => Some(format!("{expr} AS {alias}")),
                    SelectAs::Omit => None,
                })
                .collect();
            if parts.is_empty() {
                return Err(SqlError::EmptyColumns);
            }
            Ok(parts.join(","))
        }
    }
}

/// A plain comma-joined name list (tables, GROUP BY keys, conflict targets).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnList {
    Raw(String),
    List(Vec<String>),
}

impl ColumnList {
    /// Comma-joined text, or `None` if empty.
    pub fn render(&self) -> Option<String> {
        let text = match self {
            ColumnList::Raw(s) => s.clone(),
            ColumnList::List(list) => list.join(","),
        };
        (!text.is_empty()).then_some(text)
    }
}

impl From<&str> for ColumnList {
    fn from(s: &str) -> Self {
        ColumnList::Raw(s.to_string())
    }
}

impl From<String> for ColumnList {
    fn from(s: String) -> Self {
        ColumnList::Raw(s)
    }
}

impl From<Vec<String>> for ColumnList {
    fn from(list: Vec<String>) -> Self {
        ColumnList::List(list)
    }
}

impl From<Vec<&str>> for ColumnList {
    fn from(list: Vec<&str>) -> Self {
        ColumnList::List(list.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for ColumnList {
    fn from(list: &[&str]) -> Self {
        ColumnList::List(list.iter().map(|s| s.to_string()).collect())
    }
}

impl From<&[String]> for ColumnList {
    fn from(list: &[String]) -> Self {
        ColumnList::List(list.to_vec())
    }
}

impl<const N: usize> From<[&str; N]> for ColumnList {
    fn from(list: [&str; N]) -> Self {
        ColumnList::List(list.iter().map(|s| s.to_string()).collect())
    }
}

/// SET clause input: a raw clause or a column map.
#[derive(Debug, Clone)]
pub enum UpdateSet {
    /// `"SET a = 1"`, or just the assignments (`"a = 1"`), which get the
    /// `SET ` keyword prepended.
    Raw(String),
    Map(Record),
}

impl From<&str> for UpdateSet {
    fn from(s: &str) -> Self {
        UpdateSet::Raw(s.to_string())
    }
}

impl From<String> for UpdateSet {
    fn from(s: String) -> Self {
        UpdateSet::Raw(s)
    }
}

impl From<Record> for UpdateSet {
    fn from(map: Record) -> Self {
        UpdateSet::Map(map)
    }
}

impl UpdateSet {
    /// Render the clause; the map form goes through [`create_update_set_from_object`].
    ///
    /// A blank raw clause fails with [`SqlError::EmptyAssignment`].
    pub fn render(&self) -> SqlResult<String> {
        match self {
            UpdateSet::Raw(s) if s.trim().is_empty() => Err(SqlError::EmptyAssignment),
            UpdateSet::Raw(s) if starts_with_set(s) => Ok(s.clone()),
            UpdateSet::Raw(s) => Ok(format!("SET {s}")),
            UpdateSet::Map(map) => create_update_set_from_object(map, None),
        }
    }
}

/// `SET` keyword followed by whitespace, in any case.
fn starts_with_set(clause: &str) -> bool {
    let clause = clause.trim_start();
    clause.get(..3).is_some_and(|kw| kw.eq_ignore_ascii_case("SET"))
        && clause[3..].starts_with(char::is_whitespace)
}

/// Build `SET\nk1= v1,k2= v2` from pre-rendered SQL expressions.
///
/// `DEFAULT` (absent) values are skipped. Any other non-text value fails
/// with [`SqlError::InvalidSetValue`]; text is inserted verbatim, not
/// quoted. `prefix` replaces the leading `"SET\n"`.
pub fn create_update_set_from_object(set: &Record, prefix: Option<&str>) -> SqlResult<String> {
    let mut assignments = Vec::with_capacity(set.len());
    for (column, value) in set.iter() {
        match value {
            SqlValue::Default => continue,
            SqlValue::Text(expr) => assignments.push(format!("{column}= {expr}")),
            other => {
                return Err(SqlError::InvalidSetValue {
                    column: column.to_string(),
                    actual: other.kind().to_string(),
                });
            }
        }
    }
    if assignments.is_empty() {
        return Err(SqlError::EmptyAssignment);
    }
    Ok(format!("{}{}", prefix.unwrap_or("SET\n"), assignments.join(",")))
}
