//! Scripted edit-session operations for `fgrid edit`.

use fieldgrid_core::models::post::PostId;
use fieldgrid_core::EditSession;
use std::str::FromStr;

/// One session action given on the command line.
///
/// Syntax: `name` or `name:argument`; `set` takes `set:POST:FIELD=VALUE`
/// where `VALUE` follows cell-input rules (a JSON array becomes a list).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SessionOp {
    Set {
        post_id: PostId,
        field: String,
        raw: String,
    },
    ClearColumn(String),
    RestoreColumn(String),
    ToggleColumn(String),
    ClearRow(PostId),
    RestoreRow(PostId),
    ToggleRow(PostId),
    ClearAll,
    RestoreAll,
    ToggleAll,
    Select(PostId),
    ClearSelected,
    RestoreSelected,
    FilterTitle(Option<String>),
    FilterField(Option<String>),
}

fn post_id(raw: &str) -> Result<PostId, String> {
    raw.trim()
        .parse::<PostId>()
        .map_err(|_| format!("'{}' is not a post id", raw))
}

fn required<'a>(name: &str, arg: Option<&'a str>) -> Result<&'a str, String> {
    match arg {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(format!("'{}' needs an argument ({}:...)", name, name)),
    }
}

fn optional(arg: Option<&str>) -> Option<String> {
    arg.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

impl FromStr for SessionOp {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (name, arg) = match input.split_once(':') {
            Some((name, arg)) => (name.trim(), Some(arg)),
            None => (input.trim(), None),
        };
        let op = match name {
            "set" => {
                let rest = required(name, arg)?;
                let (id, assignment) = rest
                    .split_once(':')
                    .ok_or_else(|| "set expects set:POST:FIELD=VALUE".to_string())?;
                let (field, raw) = assignment
                    .split_once('=')
                    .ok_or_else(|| "set expects set:POST:FIELD=VALUE".to_string())?;
                let field = field.trim();
                if field.is_empty() {
                    return Err("set needs a field name".to_string());
                }
                SessionOp::Set {
                    post_id: post_id(id)?,
                    field: field.to_string(),
                    raw: raw.to_string(),
                }
            }
            "clear-column" => SessionOp::ClearColumn(required(name, arg)?.trim().to_string()),
            "restore-column" => SessionOp::RestoreColumn(required(name, arg)?.trim().to_string()),
            "toggle-column" => SessionOp::ToggleColumn(required(name, arg)?.trim().to_string()),
            "clear-row" => SessionOp::ClearRow(post_id(required(name, arg)?)?),
            "restore-row" => SessionOp::RestoreRow(post_id(required(name, arg)?)?),
            "toggle-row" => SessionOp::ToggleRow(post_id(required(name, arg)?)?),
            "clear-all" => SessionOp::ClearAll,
            "restore-all" => SessionOp::RestoreAll,
            "toggle-all" => SessionOp::ToggleAll,
            "select" => SessionOp::Select(post_id(required(name, arg)?)?),
            "clear-selected" => SessionOp::ClearSelected,
            "restore-selected" => SessionOp::RestoreSelected,
            "filter-title" => SessionOp::FilterTitle(optional(arg)),
            "filter-field" => SessionOp::FilterField(optional(arg)),
            other => return Err(format!("Unknown operation '{}'", other)),
        };
        Ok(op)
    }
}

impl SessionOp {
    /// Apply to `session`; `false` when the operation changed nothing.
    pub(crate) fn apply(&self, session: &mut EditSession) -> bool {
        match self {
            SessionOp::Set {
                post_id,
                field,
                raw,
            } => session.set_cell_input(*post_id, field, raw),
            SessionOp::ClearColumn(field) => session.clear_column(field),
            SessionOp::RestoreColumn(field) => session.restore_column(field),
            SessionOp::ToggleColumn(field) => session.toggle_column(field),
            SessionOp::ClearRow(id) => session.clear_row(*id),
            SessionOp::RestoreRow(id) => session.restore_row(*id),
            SessionOp::ToggleRow(id) => session.toggle_row(*id),
            SessionOp::ClearAll => session.clear_all(),
            SessionOp::RestoreAll => session.restore_all(),
            SessionOp::ToggleAll => session.toggle_all(),
            SessionOp::Select(id) => session.select_row(*id, true),
            SessionOp::ClearSelected => session.clear_selected_rows() > 0,
            SessionOp::RestoreSelected => session.restore_selected_rows() > 0,
            SessionOp::FilterTitle(query) => {
                session.set_title_filter(query.as_deref());
                true
            }
            SessionOp::FilterField(field) => session.set_field_filter(field.as_deref()),
        }
    }
}
