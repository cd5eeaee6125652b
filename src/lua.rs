//! Lua bindings, loaded from Neovim via `require("linediff_nvim")`.
//!
//! Every function returns plain tables so the Lua side can paint them without
//! calling back into Rust. Line numbers are `nil` for fillers and for changed
//! lines in the unified view; `hunk_starts` are 0-indexed row indices.

use crate::config::Config;
use crate::export;
use crate::hunk::{self, HunkRecord};
use crate::provider::{DiffProvider, LineDiff};
use crate::session::Session;
use crate::stats::Stats;
use crate::view::{self, LineRecord, SplitView, UnifiedLine, UnifiedView, ViewMode, ViewModel};
use chrono::Local;
use mlua::prelude::*;

impl IntoLua for LineRecord {
    fn into_lua(self, lua: &Lua) -> LuaResult<LuaValue> {
        let table = lua.create_table()?;
        table.set("kind", self.kind.as_str())?;
        table.set("text", self.text)?;
        table.set("number", self.number)?;
        Ok(LuaValue::Table(table))
    }
}

impl IntoLua for UnifiedLine {
    fn into_lua(self, lua: &Lua) -> LuaResult<LuaValue> {
        let table = lua.create_table()?;
        table.set("kind", self.kind.as_str())?;
        table.set("marker", self.marker().to_string())?;
        table.set("text", self.text)?;
        table.set("number", self.number)?;
        Ok(LuaValue::Table(table))
    }
}

fn sequence<T: IntoLua>(lua: &Lua, items: Vec<T>) -> LuaResult<LuaTable> {
    let values: Vec<LuaValue> = items
        .into_iter()
        .map(|item| item.into_lua(lua))
        .collect::<LuaResult<_>>()?;
    lua.create_sequence_from(values)
}

impl IntoLua for SplitView {
    fn into_lua(self, lua: &Lua) -> LuaResult<LuaValue> {
        let table = lua.create_table()?;
        table.set("mode", ViewMode::Split.as_str())?;
        table.set("left", sequence(lua, self.left)?)?;
        table.set("right", sequence(lua, self.right)?)?;
        table.set("hunk_starts", lua.create_sequence_from(self.hunk_starts)?)?;
        Ok(LuaValue::Table(table))
    }
}

impl IntoLua for UnifiedView {
    fn into_lua(self, lua: &Lua) -> LuaResult<LuaValue> {
        let table = lua.create_table()?;
        table.set("mode", ViewMode::Unified.as_str())?;
        table.set("lines", sequence(lua, self.lines)?)?;
        table.set("hunk_starts", lua.create_sequence_from(self.hunk_starts)?)?;
        Ok(LuaValue::Table(table))
    }
}

impl IntoLua for ViewModel {
    fn into_lua(self, lua: &Lua) -> LuaResult<LuaValue> {
        match self {
            ViewModel::Split(view) => view.into_lua(lua),
            ViewModel::Unified(view) => view.into_lua(lua),
        }
    }
}

impl IntoLua for Stats {
    fn into_lua(self, lua: &Lua) -> LuaResult<LuaValue> {
        let table = lua.create_table()?;
        table.set("added", self.added)?;
        table.set("removed", self.removed)?;
        Ok(LuaValue::Table(table))
    }
}

/// Reads an optional options table; `nil` means defaults.
fn config_from(lua: &Lua, opts: Option<LuaValue>) -> LuaResult<Config> {
    match opts {
        None | Some(LuaValue::Nil) => Ok(Config::default()),
        Some(value) => lua.from_value(value),
    }
}

fn parse_mode(mode: Option<String>) -> LuaResult<ViewMode> {
    mode.map_or(Ok(ViewMode::default()), |m| {
        m.parse().map_err(LuaError::RuntimeError)
    })
}

/// Compares two texts. Returns `nil` when both are empty.
fn compare(
    lua: &Lua,
    (original, modified, opts): (String, String, Option<LuaValue>),
) -> LuaResult<LuaValue> {
    let config = config_from(lua, opts)?;
    let mut session = Session::builder()
        .diff_provider(LineDiff::default())
        .config(config)
        .build()
        .map_err(LuaError::external)?;

    let Some(view) = session.compare(original, modified) else {
        return Ok(LuaValue::Nil);
    };

    let result = lua.create_table()?;
    result.set("mode", view.mode().as_str())?;
    result.set("view", view.into_lua(lua)?)?;
    if let Some(stats) = session.stats() {
        result.set("stats", stats.into_lua(lua)?)?;
    }
    if let Some(hunks) = session.hunks() {
        result.set("hunks", lua.to_value(hunks)?)?;
    }
    Ok(LuaValue::Table(result))
}

/// Builds a view from hunks computed elsewhere: a JSON string or a list of
/// `{ kind, text }` / `{ value, added, removed }` tables.
fn from_hunks(lua: &Lua, (hunks, mode): (LuaValue, Option<String>)) -> LuaResult<LuaValue> {
    let mode = parse_mode(mode)?;
    let hunks = match hunks {
        LuaValue::String(json) => hunk::parse(&json.to_str()?).map_err(LuaError::external)?,
        other => hunk::from_records(lua.from_value::<Vec<HunkRecord>>(other)?),
    };

    let result = lua.create_table()?;
    result.set("view", view::build(&hunks, mode).into_lua(lua)?)?;
    result.set("stats", Stats::from_hunks(&hunks).into_lua(lua)?)?;
    Ok(LuaValue::Table(result))
}

/// Returns the fenced Markdown diff of two texts.
fn markdown(_: &Lua, (original, modified): (String, String)) -> LuaResult<String> {
    let hunks = LineDiff::default().diff_lines(&original, &modified);
    Ok(export::markdown(&hunks))
}

/// Returns a standalone HTML report of two texts.
fn html_report(
    lua: &Lua,
    (original, modified, opts): (String, String, Option<LuaValue>),
) -> LuaResult<String> {
    let config = config_from(lua, opts)?;
    let hunks = LineDiff::default().diff_lines(&original, &modified);
    let view = view::build(&hunks, config.view_mode);
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    Ok(export::html_report(
        &view,
        Stats::from_hunks(&hunks),
        &config.report_title,
        &timestamp,
    ))
}

/// Creates the Lua module exports. Called by mlua when loaded via `require("linediff_nvim")`.
#[mlua::lua_module]
fn linediff_nvim(lua: &Lua) -> LuaResult<LuaTable> {
    let exports = lua.create_table()?;
    exports.set("compare", lua.create_function(compare)?)?;
    exports.set("from_hunks", lua.create_function(from_hunks)?)?;
    exports.set("markdown", lua.create_function(markdown)?)?;
    exports.set("html_report", lua.create_function(html_report)?)?;
    Ok(exports)
}
